// Copyright (c) 2022-2023 The MobileCoin Foundation

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::{DecodeOwned, Encode};

use crate::{
    helpers::{bytes, list, pt, scalar},
    tx::{Input, Output},
    types::{Amount, Height, TxId, WalletId},
    Error, Message, MsgId,
};

/// Transaction proposal, opening a negotiation
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
/// |                            AMOUNT                             |
/// |                        (u64, 8-byte)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             FEE                               |
/// |                        (u64, 8-byte)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          MIN_HEIGHT                           |
/// |                        (u64, 8-byte)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      SEND     |                    RESERVED                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         PUBLIC_EXCESS                         |
/// |                        (32-byte point)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            OFFSET                             |
/// |                        (32-byte scalar)                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          PUBLIC_NONCE                         |
/// |                        (32-byte point)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     INPUTS (u32 count + n*32)                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    OUTPUTS (u32 count + n*32)                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    MESSAGE (u32 len + bytes)                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Invite {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id, chosen by the initiator
    pub tx_id: TxId,

    /// Value to be transferred
    pub amount: Amount,

    /// Fee paid to the chain
    pub fee: Amount,

    /// Minimum height for inclusion
    pub min_height: Height,

    /// Role flag, set when the initiator is the value sender
    pub send: bool,

    /// Initiator's public blinding excess
    pub public_excess: CompressedRistretto,

    /// Initiator's declared kernel offset
    pub offset: Scalar,

    /// Initiator's public nonce
    pub public_nonce: CompressedRistretto,

    /// Input commitments the initiator contributes
    pub inputs: Vec<Input>,

    /// Output commitments the initiator contributes
    pub outputs: Vec<Output>,

    /// Optional free-form message bytes
    pub message: Vec<u8>,
}

impl Message for Invite {
    const ID: MsgId = MsgId::Invite;
}

impl Encode for Invite {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 16
            + 8 * 3
            + 4
            + 32 * 3
            + list::enc_len(&self.inputs)?
            + list::enc_len(&self.outputs)?
            + bytes::enc_len(&self.message)?)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;

        buff[index..][..8].copy_from_slice(&self.amount.to_le_bytes());
        index += 8;
        buff[index..][..8].copy_from_slice(&self.fee.to_le_bytes());
        index += 8;
        buff[index..][..8].copy_from_slice(&self.min_height.to_le_bytes());
        index += 8;

        buff[index] = self.send as u8;
        buff[index + 1..][..3].copy_from_slice(&[0u8; 3]);
        index += 4;

        index += pt::enc(&self.public_excess, &mut buff[index..])?;
        index += scalar::enc(&self.offset, &mut buff[index..])?;
        index += pt::enc(&self.public_nonce, &mut buff[index..])?;

        index += list::enc(&self.inputs, &mut buff[index..])?;
        index += list::enc(&self.outputs, &mut buff[index..])?;
        index += bytes::enc(&self.message, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for Invite {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        if buff.len() < index + 8 * 3 + 4 {
            return Err(Error::InvalidLength);
        }

        let mut v = [0u8; 8];
        v.copy_from_slice(&buff[index..][..8]);
        let amount = u64::from_le_bytes(v);
        index += 8;

        v.copy_from_slice(&buff[index..][..8]);
        let fee = u64::from_le_bytes(v);
        index += 8;

        v.copy_from_slice(&buff[index..][..8]);
        let min_height = u64::from_le_bytes(v);
        index += 8;

        let send = match buff[index] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidEncoding),
        };
        index += 4;

        let (public_excess, n) = pt::dec(&buff[index..])?;
        index += n;

        let (offset, n) = scalar::dec(&buff[index..])?;
        index += n;

        let (public_nonce, n) = pt::dec(&buff[index..])?;
        index += n;

        let (inputs, n) = list::dec(&buff[index..])?;
        index += n;

        let (outputs, n) = list::dec(&buff[index..])?;
        index += n;

        let (message, n) = bytes::dec(&buff[index..])?;
        index += n;

        // Strict positional message, trailing bytes are a hard failure
        if index != buff.len() {
            return Err(Error::InvalidLength);
        }

        Ok((
            Self {
                from,
                tx_id,
                amount,
                fee,
                min_height,
                send,
                public_excess,
                offset,
                public_nonce,
                inputs,
                outputs,
                message,
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

    fn build_invite() -> Invite {
        let p = |s: &Scalar| (RISTRETTO_BASEPOINT_POINT * s).compress();

        Invite {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            amount: random(),
            fee: random(),
            min_height: random(),
            send: true,
            public_excess: p(&Scalar::random(&mut OsRng {})),
            offset: Scalar::random(&mut OsRng {}),
            public_nonce: p(&Scalar::random(&mut OsRng {})),
            inputs: vec![Input {
                commitment: p(&Scalar::random(&mut OsRng {})),
            }],
            outputs: vec![Output {
                commitment: p(&Scalar::random(&mut OsRng {})),
            }],
            message: b"for lunch".to_vec(),
        }
    }

    #[test]
    fn encode_decode_invite() {
        let msg = build_invite();

        let mut buff = [0u8; 512];
        let _n = encode_decode_msg(&mut buff, &msg);
    }

    #[test]
    fn reject_length_mismatch() {
        let msg = build_invite();

        let mut buff = [0u8; 512];
        let n = msg.encode(&mut buff).unwrap();

        // Truncated
        assert_eq!(
            Invite::decode_owned(&buff[..n - 1]),
            Err(Error::InvalidLength)
        );

        // Trailing bytes
        assert_eq!(
            Invite::decode_owned(&buff[..n + 1]),
            Err(Error::InvalidLength)
        );
    }
}
