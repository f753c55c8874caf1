// Copyright (c) 2022-2023 The MobileCoin Foundation

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;

use crate::{
    params::{id_is_public, ParameterStore, TxParameterID},
    types::{TxId, WalletId},
    Error, Message, MsgId,
};

/// Maximum parameter count per envelope, bounds message size against
/// resource exhaustion by a malicious peer
pub const MAX_PARAMS: usize = 10;

/// Transaction type discriminator carried by every envelope
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum TxType {
    Simple = 0x00,
    AtomicSwap = 0x01,
}

/// Generic parameter envelope, the wire form of all non-legacy negotiation
/// traffic
///
/// Carries an ordered list of (parameter id, bytes) pairs. Unknown ids in
/// the public range are retained as opaque bytes for forward compatibility;
/// a private-range id on the wire is a protocol violation and rejected in
/// both encode and decode directions.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             FROM                              |
/// |                       (32-byte wallet id)                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            TX_ID                              |
/// |                          (16-byte)                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      TYPE     |     COUNT     |            RESERVED           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /           COUNT * (ID u32 + LEN u32 + LEN bytes)              /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SetTxParameter {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id the parameters apply to
    pub tx_id: TxId,

    /// Transaction type discriminator
    pub tx_type: TxType,

    params: ParameterStore,
}

impl Message for SetTxParameter {
    const ID: MsgId = MsgId::SetTxParameter;
}

impl SetTxParameter {
    pub fn new(from: WalletId, tx_id: TxId, tx_type: TxType) -> Self {
        Self {
            from,
            tx_id,
            tx_type,
            params: ParameterStore::new(),
        }
    }

    /// Add an encodable parameter, enforcing the public range and the
    /// per-envelope cap
    pub fn set<T>(&mut self, id: TxParameterID, value: &T) -> Result<&mut Self, Error>
    where
        T: Encode,
        Error: From<<T as Encode>::Error>,
    {
        self.check_slot(id)?;
        self.params.set(id, value)?;
        Ok(self)
    }

    /// Add a scalar parameter
    pub fn set_scalar(&mut self, id: TxParameterID, value: &Scalar) -> Result<&mut Self, Error> {
        self.check_slot(id)?;
        self.params.set_scalar(id, value)?;
        Ok(self)
    }

    /// Add a compressed point parameter
    pub fn set_point(
        &mut self,
        id: TxParameterID,
        value: &CompressedRistretto,
    ) -> Result<&mut Self, Error> {
        self.check_slot(id)?;
        self.params.set_point(id, value)?;
        Ok(self)
    }

    /// Add a list parameter
    pub fn set_list<T>(&mut self, id: TxParameterID, values: &[T]) -> Result<&mut Self, Error>
    where
        T: Encode<Error = Error>,
    {
        self.check_slot(id)?;
        self.params.set_list(id, values)?;
        Ok(self)
    }

    /// Add an opaque byte-string parameter
    pub fn set_bytes(&mut self, id: TxParameterID, value: &[u8]) -> Result<&mut Self, Error> {
        self.check_slot(id)?;
        self.params.set_bytes(id, value);
        Ok(self)
    }

    /// Carried parameters
    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Consume the envelope, yielding the carried parameters
    pub fn into_params(self) -> ParameterStore {
        self.params
    }

    fn check_slot(&self, id: TxParameterID) -> Result<(), Error> {
        if !id.is_public() {
            return Err(Error::PrivateParameter);
        }

        if self.params.get_raw(id as u32).is_none() && self.params.len() >= MAX_PARAMS {
            return Err(Error::TooManyParameters);
        }

        Ok(())
    }
}

impl Encode for SetTxParameter {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        let mut n = 32 + 16 + 4;
        for (_id, v) in self.params.iter() {
            n += 8 + v.len();
        }
        Ok(n)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if self.params.len() > MAX_PARAMS {
            return Err(Error::TooManyParameters);
        }

        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;

        buff[index] = self.tx_type as u8;
        buff[index + 1] = self.params.len() as u8;
        buff[index + 2..][..2].copy_from_slice(&[0u8; 2]);
        index += 4;

        for (id, v) in self.params.iter() {
            // Private-range ids never leave the process
            if !id_is_public(id) {
                return Err(Error::PrivateParameter);
            }

            buff[index..][..4].copy_from_slice(&id.to_le_bytes());
            index += 4;

            buff[index..][..4].copy_from_slice(&(v.len() as u32).to_le_bytes());
            index += 4;

            buff[index..][..v.len()].copy_from_slice(v);
            index += v.len();
        }

        Ok(index)
    }
}

impl DecodeOwned for SetTxParameter {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        if buff.len() < index + 4 {
            return Err(Error::InvalidLength);
        }

        let tx_type =
            TxType::try_from_primitive(buff[index]).map_err(|_| Error::InvalidEncoding)?;
        let count = buff[index + 1] as usize;
        index += 4;

        // Reject oversized envelopes before decoding any entries
        if count > MAX_PARAMS {
            return Err(Error::TooManyParameters);
        }

        let mut params = ParameterStore::new();
        for _ in 0..count {
            if buff.len() < index + 8 {
                return Err(Error::InvalidLength);
            }

            let mut v = [0u8; 4];
            v.copy_from_slice(&buff[index..][..4]);
            let id = u32::from_le_bytes(v);
            index += 4;

            v.copy_from_slice(&buff[index..][..4]);
            let len = u32::from_le_bytes(v) as usize;
            index += 4;

            // Receipt of a private-range id is itself a protocol violation
            if !id_is_public(id) {
                return Err(Error::PrivateParameter);
            }

            if buff.len() < index + len {
                return Err(Error::InvalidLength);
            }

            params.set_raw(id, buff[index..][..len].to_vec());
            index += len;
        }

        if index != buff.len() {
            return Err(Error::InvalidLength);
        }

        Ok((
            Self {
                from,
                tx_id,
                tx_type,
                params,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use rand::random;
    use rand_core::OsRng;

    use super::*;
    use crate::test::encode_decode_msg;

    fn build_envelope() -> SetTxParameter {
        let mut msg = SetTxParameter::new(
            WalletId::new(random()),
            TxId::from_random(&mut OsRng {}),
            TxType::Simple,
        );

        msg.set(TxParameterID::Amount, &100u64).unwrap();
        msg.set(TxParameterID::Fee, &10u64).unwrap();
        msg.set_scalar(TxParameterID::PeerOffset, &Scalar::random(&mut OsRng {}))
            .unwrap();

        msg
    }

    #[test]
    fn encode_decode_envelope() {
        let msg = build_envelope();

        let mut buff = [0u8; 512];
        let _n = encode_decode_msg(&mut buff, &msg);
    }

    #[test]
    fn reject_private_set() {
        let mut msg = build_envelope();

        assert_eq!(
            msg.set(TxParameterID::BlindingExcess, &1u64).err(),
            Some(Error::PrivateParameter)
        );
        assert_eq!(
            msg.set(TxParameterID::Timestamp, &1u64).err(),
            Some(Error::PrivateParameter)
        );
    }

    #[test]
    fn reject_private_decode() {
        let mut msg = build_envelope();

        // Force a private id past the setter guard
        msg.params.set_raw(TxParameterID::Offset as u32, vec![0u8; 32]);

        // Rejected before serialization
        let mut buff = [0u8; 512];
        assert_eq!(msg.encode(&mut buff), Err(Error::PrivateParameter));

        // And rejected on receipt: clear the guard and patch an encoded id
        msg.params = build_envelope().into_params();
        let n = msg.encode(&mut buff).unwrap();

        // First entry id sits after from + tx_id + type word
        buff[52..56].copy_from_slice(&(TxParameterID::Offset as u32).to_le_bytes());
        assert_eq!(
            SetTxParameter::decode_owned(&buff[..n]),
            Err(Error::PrivateParameter)
        );
    }

    #[test]
    fn enforce_param_cap() {
        let mut msg = SetTxParameter::new(
            WalletId::new(random()),
            TxId::from_random(&mut OsRng {}),
            TxType::Simple,
        );

        // Ten distinct raw ids fit
        for i in 0..MAX_PARAMS as u32 {
            msg.params.set_raw(i + 0x20, vec![0xaa]);
        }

        // The eleventh is rejected by the setter
        assert_eq!(
            msg.set(TxParameterID::Amount, &1u64).err(),
            Some(Error::TooManyParameters)
        );

        // Overwriting an existing id is not a new slot
        msg.params.set_raw(0x20, vec![0xbb]);
        assert_eq!(msg.params.len(), MAX_PARAMS);

        // An oversized count on the wire is rejected before any entry decode
        let mut buff = [0u8; 512];
        let n = msg.encode(&mut buff).unwrap();
        buff[49] = MAX_PARAMS as u8 + 1;
        assert_eq!(
            SetTxParameter::decode_owned(&buff[..n]),
            Err(Error::TooManyParameters)
        );
    }

    #[test]
    fn every_public_id_roundtrips() {
        use strum::IntoEnumIterator;

        let public: Vec<TxParameterID> =
            TxParameterID::iter().filter(|id| id.is_public()).collect();

        // The full public range does not fit one envelope, chunk it
        for chunk in public.chunks(MAX_PARAMS) {
            let mut msg = SetTxParameter::new(
                WalletId::new(random()),
                TxId::from_random(&mut OsRng {}),
                TxType::Simple,
            );

            for id in chunk {
                msg.set_bytes(*id, &(*id as u32).to_le_bytes()).unwrap();
            }

            let mut buff = [0u8; 512];
            let n = msg.encode(&mut buff).unwrap();
            let (decoded, _) = SetTxParameter::decode_owned(&buff[..n]).unwrap();

            for id in chunk {
                let want = (*id as u32).to_le_bytes();
                assert_eq!(
                    decoded.params().get_bytes(*id),
                    Some(&want[..]),
                    "round-trip for {id}"
                );
            }
        }
    }

    #[test]
    fn unknown_public_id_retained() {
        let mut msg = build_envelope();
        msg.params.set_raw(0x7fff, vec![1, 2, 3, 4]);

        let mut buff = [0u8; 512];
        let n = msg.encode(&mut buff).unwrap();

        let (decoded, _) = SetTxParameter::decode_owned(&buff[..n]).unwrap();
        assert_eq!(decoded.params().get_raw(0x7fff), Some(&[1, 2, 3, 4][..]));
    }
}
