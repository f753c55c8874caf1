// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction body types as they appear on the wire
//!
//! Inputs and outputs are bare Pedersen commitments, the kernel carries the
//! aggregate excess, fee, minimum height and the aggregate Schnorr
//! signature. Group arithmetic over these lives in the engine crate; here
//! they are opaque compressed points with exact layouts.

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::{DecodeOwned, Encode};

use crate::{
    helpers::{list, pt, scalar},
    types::{Amount, Height},
    Error,
};

/// Transaction input, a commitment to a previously created coin
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Input {
    pub commitment: CompressedRistretto,
}

impl Encode for Input {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        pt::enc_len(&self.commitment)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        pt::enc(&self.commitment, buff)
    }
}

impl DecodeOwned for Input {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let (commitment, n) = pt::dec(buff)?;
        Ok((Self { commitment }, n))
    }
}

/// Transaction output, a commitment to a newly created coin
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Output {
    pub commitment: CompressedRistretto,
}

impl Encode for Output {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        pt::enc_len(&self.commitment)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        pt::enc(&self.commitment, buff)
    }
}

impl DecodeOwned for Output {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let (commitment, n) = pt::dec(buff)?;
        Ok((Self { commitment }, n))
    }
}

/// Schnorr signature, public nonce plus response scalar
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             NONCE                             |
/// |                        (32-byte point)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               S                               |
/// |                       (32-byte scalar)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Signature {
    /// Public nonce `R`
    pub nonce: CompressedRistretto,

    /// Response scalar `s`
    pub s: Scalar,
}

impl Encode for Signature {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(64)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        let mut index = 0;

        index += pt::enc(&self.nonce, &mut buff[index..])?;
        index += scalar::enc(&self.s, &mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for Signature {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (nonce, n) = pt::dec(&buff[index..])?;
        index += n;

        let (s, n) = scalar::dec(&buff[index..])?;
        index += n;

        Ok((Self { nonce, s }, index))
    }
}

/// Transaction kernel, the on-chain record proving the transaction valid
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TxKernel {
    /// Aggregate public excess `E`
    pub excess: CompressedRistretto,

    /// Fee paid to the chain
    pub fee: Amount,

    /// Minimum height for inclusion
    pub min_height: Height,

    /// Aggregate signature over the kernel message
    pub signature: Signature,
}

impl Encode for TxKernel {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32 + 8 + 8 + 64)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += pt::enc(&self.excess, &mut buff[index..])?;

        buff[index..][..8].copy_from_slice(&self.fee.to_le_bytes());
        index += 8;

        buff[index..][..8].copy_from_slice(&self.min_height.to_le_bytes());
        index += 8;

        index += self.signature.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for TxKernel {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        if buff.len() < 32 + 8 + 8 + 64 {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        let (excess, n) = pt::dec(&buff[index..])?;
        index += n;

        let mut v = [0u8; 8];
        v.copy_from_slice(&buff[index..][..8]);
        let fee = u64::from_le_bytes(v);
        index += 8;

        v.copy_from_slice(&buff[index..][..8]);
        let min_height = u64::from_le_bytes(v);
        index += 8;

        let (signature, n) = Signature::decode_owned(&buff[index..])?;
        index += n;

        Ok((
            Self {
                excess,
                fee,
                min_height,
                signature,
            },
            index,
        ))
    }
}

/// A complete transaction as submitted for registration
#[derive(Clone, PartialEq, Debug)]
pub struct Transaction {
    /// Kernel offset, subtracted from the aggregate excess
    pub offset: Scalar,

    /// Spent inputs
    pub inputs: Vec<Input>,

    /// Created outputs
    pub outputs: Vec<Output>,

    /// Transaction kernel
    pub kernel: TxKernel,
}

impl Encode for Transaction {
    type Error = Error;

    fn encode_len(&self) -> Result<usize, Error> {
        Ok(32
            + list::enc_len(&self.inputs)?
            + list::enc_len(&self.outputs)?
            + self.kernel.encode_len()?)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < self.encode_len()? {
            return Err(Error::InvalidLength);
        }

        let mut index = 0;

        index += scalar::enc(&self.offset, &mut buff[index..])?;
        index += list::enc(&self.inputs, &mut buff[index..])?;
        index += list::enc(&self.outputs, &mut buff[index..])?;
        index += self.kernel.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl DecodeOwned for Transaction {
    type Output = Self;
    type Error = Error;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Error> {
        let mut index = 0;

        let (offset, n) = scalar::dec(&buff[index..])?;
        index += n;

        let (inputs, n) = list::dec(&buff[index..])?;
        index += n;

        let (outputs, n) = list::dec(&buff[index..])?;
        index += n;

        let (kernel, n) = TxKernel::decode_owned(&buff[index..])?;
        index += n;

        Ok((
            Self {
                offset,
                inputs,
                outputs,
                kernel,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT, scalar::Scalar};
    use rand::random;
    use rand_core::OsRng;

    use super::*;
    use crate::test::encode_decode_msg;

    fn random_point() -> CompressedRistretto {
        (RISTRETTO_BASEPOINT_POINT * Scalar::random(&mut OsRng {})).compress()
    }

    #[test]
    fn encode_decode_kernel() {
        let kernel = TxKernel {
            excess: random_point(),
            fee: random(),
            min_height: random(),
            signature: Signature {
                nonce: random_point(),
                s: Scalar::random(&mut OsRng {}),
            },
        };

        let mut buff = [0u8; 256];
        let n = encode_decode_msg(&mut buff, &kernel);

        assert_eq!(n, 112);
    }

    #[test]
    fn encode_decode_transaction() {
        let tx = Transaction {
            offset: Scalar::random(&mut OsRng {}),
            inputs: vec![
                Input {
                    commitment: random_point(),
                },
                Input {
                    commitment: random_point(),
                },
            ],
            outputs: vec![Output {
                commitment: random_point(),
            }],
            kernel: TxKernel {
                excess: random_point(),
                fee: 10,
                min_height: 25,
                signature: Signature {
                    nonce: random_point(),
                    s: Scalar::random(&mut OsRng {}),
                },
            },
        };

        let mut buff = [0u8; 512];
        let _n = encode_decode_msg(&mut buff, &tx);
    }

    #[test]
    fn reject_truncated_kernel() {
        let kernel = TxKernel {
            excess: random_point(),
            fee: 1,
            min_height: 2,
            signature: Signature {
                nonce: random_point(),
                s: Scalar::random(&mut OsRng {}),
            },
        };

        let mut buff = [0u8; 256];
        let n = kernel.encode(&mut buff).unwrap();

        assert_eq!(
            TxKernel::decode_owned(&buff[..n - 1]),
            Err(Error::InvalidLength)
        );
    }
}
