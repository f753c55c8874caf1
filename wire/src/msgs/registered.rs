// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::{DecodeOwned, Encode};

use crate::{
    types::{TxId, WalletId},
    Error, Message, MsgId,
};

/// Outcome of submitting the finished transaction to the chain
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
/// |     VALUE     |                    RESERVED                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TxRegistered {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id this outcome correlates with
    pub tx_id: TxId,

    /// Registration outcome
    pub value: bool,
}

impl Message for TxRegistered {
    const ID: MsgId = MsgId::TxRegistered;
}

impl Encode for TxRegistered {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 16 + 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;

        buff[index] = self.value as u8;
        buff[index + 1..][..3].copy_from_slice(&[0u8; 3]);
        index += 4;

        Ok(index)
    }
}

impl DecodeOwned for TxRegistered {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        if buff.len() != 32 + 16 + 4 {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        let value = match buff[index] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidEncoding),
        };
        index += 4;

        Ok((Self { from, tx_id, value }, index))
    }
}

/// Abort notice, correlated by transaction id
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TxFailed {
    /// Sending wallet endpoint
    pub from: WalletId,

    /// Transaction id this abort correlates with
    pub tx_id: TxId,
}

impl Message for TxFailed {
    const ID: MsgId = MsgId::TxFailed;
}

impl Encode for TxFailed {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 16)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += self.from.encode(&mut buff[index..])?;
        index += self.tx_id.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for TxFailed {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        if buff.len() != 32 + 16 {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        let (from, n) = WalletId::decode_owned(buff)?;
        index += n;

        let (tx_id, n) = TxId::decode_owned(&buff[index..])?;
        index += n;

        Ok((Self { from, tx_id }, index))
    }
}

#[cfg(test)]
mod test {
    use rand::random;
    use rand_core::OsRng;

    use super::*;
    use crate::test::encode_decode_msg;

    #[test]
    fn encode_decode_registered() {
        let msg = TxRegistered {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            value: true,
        };

        let mut buff = [0u8; 64];
        let n = encode_decode_msg(&mut buff, &msg);

        assert_eq!(n, 52);
    }

    #[test]
    fn encode_decode_failed() {
        let msg = TxFailed {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
        };

        let mut buff = [0u8; 64];
        let n = encode_decode_msg(&mut buff, &msg);

        assert_eq!(n, 48);
    }

    #[test]
    fn reject_bad_flag() {
        let msg = TxRegistered {
            from: WalletId::new(random()),
            tx_id: TxId::from_random(&mut OsRng {}),
            value: true,
        };

        let mut buff = [0u8; 64];
        let n = msg.encode(&mut buff).unwrap();

        buff[48] = 0x02;
        assert_eq!(
            TxRegistered::decode_owned(&buff[..n]),
            Err(Error::InvalidEncoding)
        );
    }
}
