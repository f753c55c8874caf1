// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Wire / codec errors

/// Errors arising while encoding or decoding negotiation traffic
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
#[repr(u8)]
pub enum Error {
    /// Buffer too short or trailing bytes on a fixed-field message
    #[error("invalid message length")]
    InvalidLength = 0x00,

    /// Malformed field encoding
    #[error("invalid field encoding")]
    InvalidEncoding = 0x01,

    /// Unrecognised message identifier
    #[error("unknown message id")]
    UnknownMessage = 0x02,

    /// Parameter envelope exceeds the per-message cap
    #[error("too many parameters in envelope")]
    TooManyParameters = 0x03,

    /// Private-range parameter id at the wire boundary
    #[error("private parameter id on the wire")]
    PrivateParameter = 0x04,

    /// Stored parameter does not decode as the requested type
    #[error("parameter type mismatch")]
    TypeMismatch = 0x05,
}

impl From<encdec::Error> for Error {
    fn from(e: encdec::Error) -> Self {
        match e {
            encdec::Error::Length => Error::InvalidLength,
            _ => Error::InvalidEncoding,
        }
    }
}
