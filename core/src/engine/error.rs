// Copyright (c) 2022-2023 The MobileCoin Foundation

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

use tandem_wire::Error as WireError;

/// Negotiation engine errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum Error {
    /// Malformed inbound message or parameter
    #[error("decode error: {0}")]
    Decode(#[from] WireError),

    /// Message arrived out of order or in the wrong role
    #[error("unexpected message")]
    UnexpectedMessage,

    /// Commitment or signature verification failed
    #[error("invalid transaction")]
    InvalidTransaction,

    /// Scalar outside the valid range (or the additive identity)
    #[error("invalid scalar")]
    InvalidScalar,

    /// Invalid point encoding (decompression failed)
    #[error("invalid ristretto key")]
    InvalidKey,

    /// Operation not valid in the current engine state
    #[error("invalid engine state")]
    InvalidState,

    /// Registration rejected by the network
    #[error("registration rejected")]
    RegistrationFailed,
}

/// Failure reason recorded in the `FailureReason` parameter slot and
/// reported upward on terminal failures
#[derive(Copy, Clone, PartialEq, Debug, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum FailureReason {
    Unknown = 0,
    Cancelled = 1,
    InvalidTransaction = 2,
    InvalidSignature = 3,
    UnexpectedMessage = 4,
    ChainRejected = 5,
}
