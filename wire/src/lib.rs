// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / wire definitions for tandem wallet negotiation
//!
//! This crate provides the protocol specification and reference codec for
//! the interactive construction of confidential transactions between two
//! wallets, see [msgs] for message objects and wire encodings and [params]
//! for the per-transaction parameter store the envelope encoding builds on.
//!
//! Messages use a primitive binary encoding to simplify implementation with
//! other languages and platforms. Encodings are intended to be _roughly_
//! equivalent to packed c structures while maintaining 32-bit field
//! alignment, with variable-length fields carrying a 32-bit length prefix.
//! All field encodings are little-endian.

use core::fmt::Debug;

pub mod error;
pub use error::Error;

pub mod helpers;
pub mod msgs;
pub mod params;
pub mod prelude;
pub mod tx;
pub mod types;

/// Protocol version, bumped on incompatible layout changes
pub const WIRE_VERSION: u8 = 0x01;

/// Message identifiers for negotiation traffic
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum MsgId {
    /// Transaction proposal from the initiating party
    Invite = 0x01,

    /// Receiver's public excess and partial signature
    ConfirmInvitation = 0x02,

    /// Inviter's final signature share
    ConfirmTransaction = 0x03,

    /// Outcome of submitting the finished transaction to the chain
    TxRegistered = 0x04,

    /// Abort notice, correlated by transaction id
    TxFailed = 0x05,

    /// Generic parameter envelope, the wire form of all non-legacy traffic
    SetTxParameter = 0x06,
}

/// Binds a message type to its wire [MsgId]
pub trait Message {
    const ID: MsgId;
}

#[cfg(test)]
pub(crate) mod test {
    use encdec::{DecodeOwned, Encode};

    use super::*;

    /// Helper for message encode / decode tests
    pub fn encode_decode_msg<M>(buff: &mut [u8], msg: &M) -> usize
    where
        M: Encode<Error = Error> + DecodeOwned<Output = M, Error = Error> + PartialEq + Debug,
    {
        // Encode message
        let n = msg.encode(buff).expect("encode failed");

        // Check encoded length matches expected length
        let expected_n = msg.encode_len().expect("get length failed");
        assert_eq!(n, expected_n, "encode length mismatch");

        // Decode message
        let (decoded, decoded_n) = M::decode_owned(&buff[..n]).expect("decode failed");

        // Check decoded object and length match
        assert_eq!(msg, &decoded);
        assert_eq!(expected_n, decoded_n);

        n
    }
}
