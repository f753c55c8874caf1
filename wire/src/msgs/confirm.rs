// Copyright (c) 2022-2023 The MobileCoin Foundation

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::{DecodeOwned, Encode};

use crate::{
    helpers::{pt, scalar},
    tx::Signature,
    types::{TxId, WalletId},
    Error, Message, MsgId,
};

/// Receiver's reply to an [Invite][super::Invite]: its public excess and a
/// partial signature over the transaction kernel
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ConfirmInvitation {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id this confirmation correlates with
    pub tx_id: TxId,

    /// Receiver's public blinding excess
    pub public_excess: CompressedRistretto,

    /// Receiver's partial signature (public nonce + response scalar)
    pub signature: Signature,
}

impl Message for ConfirmInvitation {
    const ID: MsgId = MsgId::ConfirmInvitation;
}

impl Encode for ConfirmInvitation {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 16 + 32 + 64)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;
        index += pt::enc(&self.public_excess, &mut buff[index..])?;
        index += self.signature.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for ConfirmInvitation {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        let (public_excess, n) = pt::dec(&buff[index..])?;
        index += n;

        let (signature, n) = Signature::decode_owned(&buff[index..])?;
        index += n;

        if index != buff.len() {
            return Err(Error::InvalidLength);
        }

        Ok((
            Self {
                from,
                tx_id,
                public_excess,
                signature,
            },
            index,
        ))
    }
}

/// Inviter's final signature share, completing the aggregate signature on
/// the receiver's side
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ConfirmTransaction {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id this confirmation correlates with
    pub tx_id: TxId,

    /// Inviter's response scalar
    pub signature: Scalar,
}

impl Message for ConfirmTransaction {
    const ID: MsgId = MsgId::ConfirmTransaction;
}

impl Encode for ConfirmTransaction {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 16 + 32)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;
        index += scalar::enc(&self.signature, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for ConfirmTransaction {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        let (signature, n) = scalar::dec(&buff[index..])?;
        index += n;

        if index != buff.len() {
            return Err(Error::InvalidLength);
        }

        Ok((
            Self {
                from,
                tx_id,
                signature,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
    use rand::random;
    use rand_core::OsRng;

    use super::*;
    use crate::test::encode_decode_msg;

    #[test]
    fn encode_decode_confirm_invitation() {
        let msg = ConfirmInvitation {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            public_excess: (RISTRETTO_BASEPOINT_POINT * Scalar::random(&mut OsRng {})).compress(),
            signature: Signature {
                nonce: (RISTRETTO_BASEPOINT_POINT * Scalar::random(&mut OsRng {})).compress(),
                s: Scalar::random(&mut OsRng {}),
            },
        };

        let mut buff = [0u8; 256];
        let n = encode_decode_msg(&mut buff, &msg);

        assert_eq!(n, 144);
    }

    #[test]
    fn encode_decode_confirm_transaction() {
        let msg = ConfirmTransaction {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            signature: Scalar::random(&mut OsRng {}),
        };

        let mut buff = [0u8; 256];
        let n = encode_decode_msg(&mut buff, &msg);

        assert_eq!(n, 80);
    }

    #[test]
    fn reject_truncated() {
        let msg = ConfirmTransaction {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            signature: Scalar::random(&mut OsRng {}),
        };

        let mut buff = [0u8; 256];
        let n = msg.encode(&mut buff).unwrap();

        assert_eq!(
            ConfirmTransaction::decode_owned(&buff[..n - 1]),
            Err(Error::InvalidLength)
        );
    }
}
