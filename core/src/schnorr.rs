// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Aggregate Schnorr signing over the transaction kernel
//!
//! Both parties contribute a partial signature over the same challenge and
//! the shares add to a single kernel signature. The challenge construction
//! is fixed here and must be byte-identical for both roles:
//!
//! - kernel message `m = SHA-512/256("tandem.v1.kernel" ‖ fee ‖ min_height)`
//! - challenge `c = H_s(SHA-512, "tandem.v1.challenge" ‖ R_agg ‖ E_agg ‖ m)`
//! - partial signature `s_i = r_i + c·x_i`
//! - aggregate `s = Σ s_i`, kernel signature `(R_agg, s)`

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use sha2::{Digest, Sha512, Sha512_256};

use tandem_wire::{
    tx::TxKernel,
    types::{Amount, Height},
};

use crate::{commitment::decompress, engine::Error};

/// Domain separation for the kernel message
const KERNEL_DOMAIN: &[u8] = b"tandem.v1.kernel";

/// Domain separation for the signature challenge
const CHALLENGE_DOMAIN: &[u8] = b"tandem.v1.challenge";

/// Message committed to by the kernel signature, shared between parties
pub fn kernel_message(fee: Amount, min_height: Height) -> [u8; 32] {
    let mut m = [0u8; 32];

    let d = Sha512_256::new()
        .chain_update(KERNEL_DOMAIN)
        .chain_update(fee.to_le_bytes())
        .chain_update(min_height.to_le_bytes())
        .finalize();

    m.copy_from_slice(d.as_ref());
    m
}

/// Signature challenge over the aggregate nonce, aggregate excess and
/// kernel message
pub fn challenge(
    public_nonce: &CompressedRistretto,
    public_excess: &CompressedRistretto,
    message: &[u8; 32],
) -> Scalar {
    Scalar::from_hash(
        Sha512::new()
            .chain_update(CHALLENGE_DOMAIN)
            .chain_update(public_nonce.as_bytes())
            .chain_update(public_excess.as_bytes())
            .chain_update(message),
    )
}

/// Produce a partial signature share over `challenge`
pub fn partial_sign(nonce: &Scalar, excess: &Scalar, challenge: &Scalar) -> Scalar {
    nonce + challenge * excess
}

/// Verify a partial signature against the signer's public nonce and excess
///
/// `s_i·G == R_i + c·E_i`
pub fn verify_partial(
    sig: &Scalar,
    public_nonce: &RistrettoPoint,
    public_excess: &RistrettoPoint,
    challenge: &Scalar,
) -> Result<(), Error> {
    let lhs = sig * RISTRETTO_BASEPOINT_POINT;
    let rhs = public_nonce + challenge * public_excess;

    if lhs != rhs {
        return Err(Error::InvalidTransaction);
    }

    Ok(())
}

/// Verify a completed kernel's aggregate signature
pub fn verify_kernel(kernel: &TxKernel) -> Result<(), Error> {
    let excess = decompress(&kernel.excess)?;
    let nonce = decompress(&kernel.signature.nonce)?;

    let m = kernel_message(kernel.fee, kernel.min_height);
    let c = challenge(&kernel.signature.nonce, &kernel.excess, &m);

    verify_partial(&kernel.signature.s, &nonce, &excess, &c)
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;

    use tandem_wire::tx::Signature;

    use super::*;

    /// Run a two-party signing round over a kernel message
    fn sign_two_party(fee: Amount, min_height: Height) -> TxKernel {
        let g = RISTRETTO_BASEPOINT_POINT;

        let (x_a, x_b) = (Scalar::random(&mut OsRng {}), Scalar::random(&mut OsRng {}));
        let (r_a, r_b) = (Scalar::random(&mut OsRng {}), Scalar::random(&mut OsRng {}));

        let r_agg = ((r_a + r_b) * g).compress();
        let e_agg = ((x_a + x_b) * g).compress();

        let m = kernel_message(fee, min_height);
        let c = challenge(&r_agg, &e_agg, &m);

        // Each party verifies the other's share before aggregation
        let s_a = partial_sign(&r_a, &x_a, &c);
        verify_partial(&s_a, &(r_a * g), &(x_a * g), &c).expect("partial a");

        let s_b = partial_sign(&r_b, &x_b, &c);
        verify_partial(&s_b, &(r_b * g), &(x_b * g), &c).expect("partial b");

        TxKernel {
            excess: e_agg,
            fee,
            min_height,
            signature: Signature {
                nonce: r_agg,
                s: s_a + s_b,
            },
        }
    }

    #[test]
    fn aggregate_sign_verify() {
        let kernel = sign_two_party(10, 25);
        verify_kernel(&kernel).expect("kernel signature must verify");
    }

    #[test]
    fn reject_wrong_share() {
        let g = RISTRETTO_BASEPOINT_POINT;

        let x = Scalar::random(&mut OsRng {});
        let r = Scalar::random(&mut OsRng {});

        let m = kernel_message(10, 25);
        let c = challenge(&(r * g).compress(), &(x * g).compress(), &m);

        // Signed with a key that does not match the claimed excess
        let s = partial_sign(&r, &Scalar::random(&mut OsRng {}), &c);

        assert_eq!(
            verify_partial(&s, &(r * g), &(x * g), &c).err(),
            Some(Error::InvalidTransaction)
        );
    }

    #[test]
    fn reject_tampered_kernel() {
        let mut kernel = sign_two_party(10, 25);

        // Fee tampering changes the kernel message and breaks the signature
        kernel.fee += 1;

        assert_eq!(verify_kernel(&kernel).err(), Some(Error::InvalidTransaction));
    }

    #[test]
    fn message_role_independent() {
        // Both roles must derive identical messages from the same kernel
        assert_eq!(kernel_message(10, 25), kernel_message(10, 25));
        assert_ne!(kernel_message(10, 25), kernel_message(10, 26));
    }
}
