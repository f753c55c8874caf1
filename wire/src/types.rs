// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Common protocol types and boundary rendering

use curve25519_dalek::ristretto::CompressedRistretto;
use encdec::{DecodeOwned, Encode};
use rand_core::{CryptoRng, RngCore};

use crate::Error;

/// Value amount in base units
pub type Amount = u64;

/// Block height
pub type Height = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Base units per whole coin, used for display only
pub const COIN: Amount = 100_000_000;

/// Transaction identifier, chosen by the initiator and immutable for the
/// transaction's lifetime; the join key across messages and stores.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TxId([u8; 16]);

impl TxId {
    pub const SIZE: usize = 16;

    pub const fn new(b: [u8; 16]) -> Self {
        Self(b)
    }

    /// Generate a fresh random transaction id
    pub fn from_random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut b = [0u8; 16];
        rng.fill_bytes(&mut b);
        Self(b)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Display [TxId] as hex
impl core::fmt::Display for TxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in &self.0[..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Debug format [TxId] as hex
impl core::fmt::Debug for TxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

impl Encode for TxId {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(Self::SIZE)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }

        buff[..Self::SIZE].copy_from_slice(&self.0);

        Ok(Self::SIZE)
    }
}

impl DecodeOwned for TxId {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        if buff.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }

        let mut b = [0u8; 16];
        b.copy_from_slice(&buff[..Self::SIZE]);

        Ok((Self(b), Self::SIZE))
    }
}

/// Public wallet endpoint identity (a compressed curve point), opaque to the
/// protocol core beyond equality and serialization.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct WalletId([u8; 32]);

impl WalletId {
    pub const SIZE: usize = 32;

    pub const fn new(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<CompressedRistretto> for WalletId {
    fn from(p: CompressedRistretto) -> Self {
        Self(p.to_bytes())
    }
}

/// Display [WalletId] as hex
impl core::fmt::Display for WalletId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in &self.0[..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Debug format [WalletId] as hex
impl core::fmt::Debug for WalletId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

impl Encode for WalletId {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(Self::SIZE)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }

        buff[..Self::SIZE].copy_from_slice(&self.0);

        Ok(Self::SIZE)
    }
}

impl DecodeOwned for WalletId {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        if buff.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }

        let mut b = [0u8; 32];
        b.copy_from_slice(&buff[..Self::SIZE]);

        Ok((Self(b), Self::SIZE))
    }
}

/// Fixed-point decimal rendering of an [Amount] for logs and UIs,
/// carries no protocol semantics.
pub struct PrintableAmount(pub Amount);

impl core::fmt::Display for PrintableAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let whole = self.0 / COIN;
        let frac = self.0 % COIN;

        if frac == 0 {
            return write!(f, "{whole}");
        }

        // Trim trailing zeroes from the fractional part
        let mut frac = frac;
        let mut width = 8;
        while frac % 10 == 0 {
            frac /= 10;
            width -= 1;
        }

        write!(f, "{whole}.{frac:0width$}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn txid_hex_render() {
        let id = TxId::new([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0xff,
        ]);
        assert_eq!(id.to_string(), "000102030405060708090a0b0c0d0eff");
    }

    #[test]
    fn amount_render() {
        let tests = &[
            (0u64, "0"),
            (COIN, "1"),
            (COIN * 150, "150"),
            (COIN + COIN / 2, "1.5"),
            (1, "0.00000001"),
            (123_456_789, "1.23456789"),
            (100_000_010, "1.0000001"),
        ];

        for (v, s) in tests {
            assert_eq!(PrintableAmount(*v).to_string(), *s, "amount {v}");
        }
    }
}
