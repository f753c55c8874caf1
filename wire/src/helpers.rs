// Copyright (c) 2022-2023 The MobileCoin Foundation

//! encdec field helpers shared by message and parameter codecs

/// encdec helper module for scalars
pub mod scalar {
    use curve25519_dalek::scalar::Scalar;

    use crate::Error;

    pub fn enc(s: &Scalar, buff: &mut [u8]) -> Result<usize, Error> {
        let d = s.to_bytes();

        if buff.len() < d.len() {
            return Err(Error::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(&d);

        Ok(d.len())
    }

    pub fn enc_len(_s: &Scalar) -> Result<usize, Error> {
        Ok(32)
    }

    pub fn dec(buff: &[u8]) -> Result<(Scalar, usize), Error> {
        let mut d = [0u8; 32];

        if buff.len() < d.len() {
            return Err(Error::InvalidLength);
        }

        d.copy_from_slice(&buff[..32]);

        let s = Scalar::from_bytes_mod_order(d);

        Ok((s, d.len()))
    }
}

/// encdec helper module for compressed points
pub mod pt {
    use curve25519_dalek::ristretto::CompressedRistretto;

    use crate::Error;

    pub fn enc(p: &CompressedRistretto, buff: &mut [u8]) -> Result<usize, Error> {
        let d = p.as_bytes();

        if buff.len() < d.len() {
            return Err(Error::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn enc_len(_p: &CompressedRistretto) -> Result<usize, Error> {
        Ok(32)
    }

    pub fn dec(buff: &[u8]) -> Result<(CompressedRistretto, usize), Error> {
        let mut d = [0u8; 32];

        if buff.len() < d.len() {
            return Err(Error::InvalidLength);
        }

        d.copy_from_slice(&buff[..32]);

        Ok((CompressedRistretto(d), 32))
    }
}

/// Encoding helper for fixed arrays (reserved / padding fields)
pub mod arr {
    use crate::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < d.len() {
            return Err(Error::InvalidLength);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn enc_len<const N: usize>(d: &[u8; N]) -> Result<usize, Error> {
        Ok(d.len())
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        if buff.len() < N {
            return Err(Error::InvalidLength);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}

/// Encoding helper for variable-length byte strings (u32 length prefix)
pub mod bytes {
    use crate::Error;

    pub fn enc(d: &[u8], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < 4 + d.len() {
            return Err(Error::InvalidLength);
        }

        buff[..4].copy_from_slice(&(d.len() as u32).to_le_bytes());
        buff[4..][..d.len()].copy_from_slice(d);

        Ok(4 + d.len())
    }

    pub fn enc_len(d: &[u8]) -> Result<usize, Error> {
        Ok(4 + d.len())
    }

    pub fn dec(buff: &[u8]) -> Result<(Vec<u8>, usize), Error> {
        if buff.len() < 4 {
            return Err(Error::InvalidLength);
        }

        let mut l = [0u8; 4];
        l.copy_from_slice(&buff[..4]);
        let l = u32::from_le_bytes(l) as usize;

        if buff.len() < 4 + l {
            return Err(Error::InvalidLength);
        }

        Ok((buff[4..][..l].to_vec(), 4 + l))
    }
}

/// Encoding helper for lists of encodable objects (u32 count prefix)
pub mod list {
    use encdec::{DecodeOwned, Encode};

    use crate::Error;

    pub fn enc<T>(items: &[T], buff: &mut [u8]) -> Result<usize, Error>
    where
        T: Encode<Error = Error>,
    {
        if buff.len() < enc_len(items)? {
            return Err(Error::InvalidLength);
        }

        buff[..4].copy_from_slice(&(items.len() as u32).to_le_bytes());

        let mut index = 4;
        for i in items {
            index += i.encode(&mut buff[index..])?;
        }

        Ok(index)
    }

    pub fn enc_len<T>(items: &[T]) -> Result<usize, Error>
    where
        T: Encode<Error = Error>,
    {
        let mut n = 4;
        for i in items {
            n += i.encode_len()?;
        }
        Ok(n)
    }

    pub fn dec<T>(buff: &[u8]) -> Result<(Vec<T>, usize), Error>
    where
        T: DecodeOwned<Output = T, Error = Error>,
    {
        if buff.len() < 4 {
            return Err(Error::InvalidLength);
        }

        let mut l = [0u8; 4];
        l.copy_from_slice(&buff[..4]);
        let count = u32::from_le_bytes(l) as usize;

        let mut index = 4;
        let mut items = Vec::new();
        for _ in 0..count {
            let (v, n) = T::decode_owned(&buff[index..])?;
            items.push(v);
            index += n;
        }

        Ok((items, index))
    }
}
