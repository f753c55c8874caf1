// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Key splitting, two cooperating partial scalars from one blinding key
//!
//! Lets a single logical signing key be shared between two cooperating
//! roles without either ever holding the whole key. The split mixes in
//! fresh randomness so repeated calls differ; the summation invariant
//! `a + b == secret` always holds.

use curve25519_dalek::scalar::Scalar;
use hkdf::Hkdf;
use rand_core::{CryptoRng, OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::engine::Error;

/// Domain separation for the partial derivation
const SPLIT_INFO: &[u8] = b"tandem.v1.split";

/// Split `secret` into two partial scalars summing to it (mod the group
/// order), using the default [OsRng]
pub fn split_key(secret: &Scalar, index: u64) -> Result<(Scalar, Scalar), Error> {
    split_key_with_rng(secret, index, &mut OsRng {})
}

/// Split `secret` into two partial scalars summing to it (mod the group
/// order)
///
/// The first partial is derived via HKDF-SHA256 over the secret with a
/// fresh random salt and the public `index` as context, the second is the
/// remainder. Fails with [Error::InvalidScalar] when the input is the
/// additive identity.
pub fn split_key_with_rng<R: RngCore + CryptoRng>(
    secret: &Scalar,
    index: u64,
    rng: &mut R,
) -> Result<(Scalar, Scalar), Error> {
    if secret == &Scalar::ZERO {
        return Err(Error::InvalidScalar);
    }

    let mut salt = [0u8; 32];
    rng.fill_bytes(&mut salt);

    let hk = Hkdf::<Sha256>::new(Some(&salt), secret.as_bytes());

    let mut okm = [0u8; 64];
    hk.expand_multi_info(&[SPLIT_INFO, &index.to_le_bytes()], &mut okm)
        .map_err(|_| Error::InvalidScalar)?;

    let part_a = Scalar::from_bytes_mod_order_wide(&okm);
    okm.zeroize();

    Ok((part_a, secret - part_a))
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;

    use super::*;

    #[test]
    fn split_sums_to_secret() {
        for index in 0..16u64 {
            let secret = Scalar::random(&mut OsRng {});

            let (a, b) = split_key(&secret, index).expect("split failed");

            assert_eq!(a + b, secret);
        }
    }

    #[test]
    fn split_is_randomised() {
        let secret = Scalar::random(&mut OsRng {});

        let (a1, b1) = split_key(&secret, 0).unwrap();
        let (a2, b2) = split_key(&secret, 0).unwrap();

        // Fresh randomness per call, both splits satisfy the invariant
        assert_ne!(a1, a2);
        assert_eq!(a1 + b1, secret);
        assert_eq!(a2 + b2, secret);
    }

    #[test]
    fn reject_zero_scalar() {
        assert_eq!(split_key(&Scalar::ZERO, 0), Err(Error::InvalidScalar));
    }
}
