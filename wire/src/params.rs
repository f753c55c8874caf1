// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Per-transaction parameter identifiers and the generic parameter store
//!
//! Parameter ids partition into a _public_ range, exchanged over the wire
//! inside [SetTxParameter][crate::msgs::SetTxParameter] envelopes, and a
//! _private_ range starting at [`PRIVATE_PARAMS_FROM`] that must never be
//! serialized onto the wire. The store itself is indifferent to the
//! partition; the envelope codec enforces it in both directions.

use std::collections::BTreeMap;

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroize;

use crate::{
    helpers::{list, pt, scalar},
    Error,
};

/// First identifier of the private (never-on-the-wire) parameter range
pub const PRIVATE_PARAMS_FROM: u32 = 1 << 16;

/// Stable, versioned parameter identifier space
///
/// Values are wire-stable; new public parameters append before
/// [`PRIVATE_PARAMS_FROM`], new private parameters append after.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, EnumString, EnumIter,
    TryFromPrimitive,
)]
#[repr(u32)]
pub enum TxParameterID {
    // public parameters
    TransactionType = 0,
    IsSender = 1,
    Amount = 2,
    Fee = 3,
    MinHeight = 4,
    Message = 5,
    MyId = 6,
    PeerId = 7,
    Inputs = 8,
    Outputs = 9,

    PeerPublicNonce = 10,
    PeerPublicExcess = 11,
    PeerSignature = 12,
    PeerOffset = 13,
    PeerInputs = 14,
    PeerOutputs = 15,

    TransactionRegistered = 16,
    KernelProof = 17,
    FailureReason = 18,

    // private parameters
    Timestamp = 0x0001_0001,
    BlindingExcess = 0x0001_0002,
    Offset = 0x0001_0003,
    Change = 0x0001_0004,
}

impl TxParameterID {
    /// Check whether this id may appear on the wire
    pub fn is_public(&self) -> bool {
        id_is_public(*self as u32)
    }
}

/// Check whether a raw parameter id falls in the public range
pub const fn id_is_public(raw: u32) -> bool {
    raw < PRIVATE_PARAMS_FROM
}

/// Typed, ordered mapping from parameter id to opaque encoded value
///
/// The last write for a given id wins. Iteration order is stable (ascending
/// id). Unknown raw ids are storable so unrecognised public wire parameters
/// survive a round-trip untouched.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct ParameterStore {
    values: BTreeMap<u32, Vec<u8>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an encodable value under `id`, overwriting any prior value
    pub fn set<T>(&mut self, id: TxParameterID, value: &T) -> Result<(), Error>
    where
        T: Encode,
        Error: From<<T as Encode>::Error>,
    {
        let n = value.encode_len()?;
        let mut buff = vec![0u8; n];
        value.encode(&mut buff)?;

        self.values.insert(id as u32, buff);

        Ok(())
    }

    /// Decode the value stored under `id`
    ///
    /// Returns `Ok(None)` when unset (absence is not an error). A stored
    /// value that does not decode exactly as `T` is a [`Error::TypeMismatch`]
    /// and the raw bytes are left untouched.
    pub fn get<T>(&self, id: TxParameterID) -> Result<Option<T>, Error>
    where
        T: DecodeOwned<Output = T>,
    {
        let raw = match self.values.get(&(id as u32)) {
            Some(v) => v,
            None => return Ok(None),
        };

        let (value, n) = T::decode_owned(raw).map_err(|_| Error::TypeMismatch)?;
        if n != raw.len() {
            return Err(Error::TypeMismatch);
        }

        Ok(Some(value))
    }

    /// Store a scalar value under `id`
    pub fn set_scalar(&mut self, id: TxParameterID, value: &Scalar) -> Result<(), Error> {
        let mut buff = [0u8; 32];
        scalar::enc(value, &mut buff)?;
        self.values.insert(id as u32, buff.to_vec());
        Ok(())
    }

    /// Decode a scalar value stored under `id`
    pub fn get_scalar(&self, id: TxParameterID) -> Result<Option<Scalar>, Error> {
        self.get_with(id, scalar::dec)
    }

    /// Store a compressed point under `id`
    pub fn set_point(&mut self, id: TxParameterID, value: &CompressedRistretto) -> Result<(), Error> {
        let mut buff = [0u8; 32];
        pt::enc(value, &mut buff)?;
        self.values.insert(id as u32, buff.to_vec());
        Ok(())
    }

    /// Decode a compressed point stored under `id`
    pub fn get_point(&self, id: TxParameterID) -> Result<Option<CompressedRistretto>, Error> {
        self.get_with(id, pt::dec)
    }

    /// Store a list of encodable objects under `id`
    pub fn set_list<T>(&mut self, id: TxParameterID, values: &[T]) -> Result<(), Error>
    where
        T: Encode<Error = Error>,
    {
        let n = list::enc_len(values)?;
        let mut buff = vec![0u8; n];
        list::enc(values, &mut buff)?;
        self.values.insert(id as u32, buff);
        Ok(())
    }

    /// Decode a list of objects stored under `id`
    pub fn get_list<T>(&self, id: TxParameterID) -> Result<Option<Vec<T>>, Error>
    where
        T: DecodeOwned<Output = T, Error = Error>,
    {
        self.get_with(id, list::dec)
    }

    /// Store an opaque byte string under `id`
    pub fn set_bytes(&mut self, id: TxParameterID, value: &[u8]) {
        self.values.insert(id as u32, value.to_vec());
    }

    /// Fetch the byte string stored under `id`
    pub fn get_bytes(&self, id: TxParameterID) -> Option<&[u8]> {
        self.get_raw(id as u32)
    }

    /// Store raw bytes under a raw id (unknown ids allowed)
    pub fn set_raw(&mut self, raw_id: u32, value: Vec<u8>) {
        self.values.insert(raw_id, value);
    }

    /// Fetch the raw bytes stored under a raw id
    pub fn get_raw(&self, raw_id: u32) -> Option<&[u8]> {
        self.values.get(&raw_id).map(|v| v.as_slice())
    }

    /// Clear the value stored under `id`, scrubbing the removed bytes
    pub fn remove(&mut self, id: TxParameterID) {
        if let Some(mut v) = self.values.remove(&(id as u32)) {
            v.zeroize();
        }
    }

    /// Iterate stored (raw id, bytes) pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.values.iter().map(|(id, v)| (*id, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scrub all stored values, then clear the store
    pub fn clear(&mut self) {
        for v in self.values.values_mut() {
            v.zeroize();
        }
        self.values.clear();
    }

    fn get_with<T, F>(&self, id: TxParameterID, dec: F) -> Result<Option<T>, Error>
    where
        F: Fn(&[u8]) -> Result<(T, usize), Error>,
    {
        let raw = match self.values.get(&(id as u32)) {
            Some(v) => v,
            None => return Ok(None),
        };

        let (value, n) = dec(raw).map_err(|_| Error::TypeMismatch)?;
        if n != raw.len() {
            return Err(Error::TypeMismatch);
        }

        Ok(Some(value))
    }
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::types::TxId;

    #[test]
    fn public_private_partition() {
        for id in TxParameterID::iter() {
            let expected = (id as u32) < PRIVATE_PARAMS_FROM;
            assert_eq!(id.is_public(), expected, "partition mismatch for {id}");
        }

        assert!(!TxParameterID::Timestamp.is_public());
        assert!(!TxParameterID::BlindingExcess.is_public());
        assert!(!TxParameterID::Offset.is_public());
        assert!(!TxParameterID::Change.is_public());
    }

    #[test]
    fn id_values_stable() {
        // wire-stable discriminants, do not renumber
        assert_eq!(TxParameterID::TransactionType as u32, 0);
        assert_eq!(TxParameterID::FailureReason as u32, 18);
        assert_eq!(TxParameterID::Timestamp as u32, PRIVATE_PARAMS_FROM + 1);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut store = ParameterStore::new();

        store.set(TxParameterID::Amount, &100u64).unwrap();
        store.set(TxParameterID::Fee, &10u64).unwrap();
        store
            .set(TxParameterID::MyId, &TxId::from_random(&mut OsRng {}))
            .unwrap();

        assert_eq!(store.get::<u64>(TxParameterID::Amount).unwrap(), Some(100));
        assert_eq!(store.get::<u64>(TxParameterID::Fee).unwrap(), Some(10));
        assert_eq!(store.get::<u64>(TxParameterID::MinHeight).unwrap(), None);
    }

    #[test]
    fn last_write_wins() {
        let mut store = ParameterStore::new();

        store.set(TxParameterID::Amount, &1u64).unwrap();
        store.set(TxParameterID::Amount, &2u64).unwrap();

        assert_eq!(store.get::<u64>(TxParameterID::Amount).unwrap(), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn type_mismatch_leaves_bytes() {
        let mut store = ParameterStore::new();
        store.set(TxParameterID::Message, &0xab_u8).unwrap();

        // A single byte does not decode as u64
        assert_eq!(
            store.get::<u64>(TxParameterID::Message),
            Err(Error::TypeMismatch)
        );

        // Raw bytes untouched by the failed decode
        assert_eq!(store.get_raw(TxParameterID::Message as u32), Some(&[0xab][..]));
    }

    #[test]
    fn remove_clears() {
        let mut store = ParameterStore::new();
        store.set(TxParameterID::Amount, &1u64).unwrap();
        store.remove(TxParameterID::Amount);

        assert_eq!(store.get::<u64>(TxParameterID::Amount).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn iteration_order_stable() {
        let mut store = ParameterStore::new();
        store.set(TxParameterID::Fee, &10u64).unwrap();
        store.set(TxParameterID::Amount, &100u64).unwrap();
        store.set_raw(0x42, vec![1, 2, 3]);

        let ids: Vec<u32> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                TxParameterID::Amount as u32,
                TxParameterID::Fee as u32,
                0x42
            ]
        );
    }
}
