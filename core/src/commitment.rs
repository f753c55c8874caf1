// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Pedersen commitment substrate and balance verification
//!
//! Commitments bind an amount and a blinding factor to a single curve
//! point, `C(v, r) = v·H + r·G`, additively homomorphic so sums of
//! commitments can be checked without revealing amounts. `G` is the
//! Ristretto basepoint, `H` a hash-derived generator with unknown discrete
//! log relative to `G`.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use sha2::Sha512;

use tandem_wire::{
    tx::{Input, Output, Transaction},
    types::Amount,
};

use crate::engine::Error;

/// Domain separation for the value generator derivation
const VALUE_GENERATOR_DOMAIN: &[u8] = b"tandem.v1.value-generator";

/// Blinding generator `G`
pub fn blinding_generator() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// Value generator `H`, hash-derived so its discrete log relative to `G`
/// is unknown
pub fn value_generator() -> RistrettoPoint {
    RistrettoPoint::hash_from_bytes::<Sha512>(VALUE_GENERATOR_DOMAIN)
}

/// Commit to `value` under `blinding`
pub fn commit(value: Amount, blinding: &Scalar) -> RistrettoPoint {
    Scalar::from(value) * value_generator() + blinding * RISTRETTO_BASEPOINT_POINT
}

/// Decompress a wire point, rejecting invalid encodings
pub fn decompress(p: &CompressedRistretto) -> Result<RistrettoPoint, Error> {
    p.decompress().ok_or(Error::InvalidKey)
}

/// Sum a set of input commitments
pub fn sum_inputs(inputs: &[Input]) -> Result<RistrettoPoint, Error> {
    let mut sum = RistrettoPoint::identity();
    for i in inputs {
        sum += decompress(&i.commitment)?;
    }
    Ok(sum)
}

/// Sum a set of output commitments
pub fn sum_outputs(outputs: &[Output]) -> Result<RistrettoPoint, Error> {
    let mut sum = RistrettoPoint::identity();
    for o in outputs {
        sum += decompress(&o.commitment)?;
    }
    Ok(sum)
}

/// Verify one party's declared balance over its contributed commitments
///
/// Checks `Σ C_out − Σ C_in + carried·H == E + offset·G` where `carried` is
/// the value leaving the party's commitments (amount + fee for the value
/// sender). Tampering with any single commitment breaks the equation.
pub fn verify_partial_balance(
    inputs: &[Input],
    outputs: &[Output],
    carried: Amount,
    public_excess: &RistrettoPoint,
    offset: &Scalar,
) -> Result<(), Error> {
    let lhs = sum_outputs(outputs)? - sum_inputs(inputs)? + Scalar::from(carried) * value_generator();
    let rhs = public_excess + offset * RISTRETTO_BASEPOINT_POINT;

    if lhs != rhs {
        return Err(Error::InvalidTransaction);
    }

    Ok(())
}

/// Verify the full transaction balance
///
/// Checks `Σ C_out − Σ C_in + fee·H == excess + offset·G`, the fundamental
/// confidential-transaction invariant: commitments must balance to zero
/// once the kernel excess and offset are accounted for.
pub fn verify_balance(tx: &Transaction) -> Result<(), Error> {
    let excess = decompress(&tx.kernel.excess)?;

    let lhs = sum_outputs(&tx.outputs)? - sum_inputs(&tx.inputs)?
        + Scalar::from(tx.kernel.fee) * value_generator();
    let rhs = excess + tx.offset * RISTRETTO_BASEPOINT_POINT;

    if lhs != rhs {
        return Err(Error::InvalidTransaction);
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;

    use super::*;

    #[test]
    fn generators_independent() {
        assert_ne!(value_generator(), blinding_generator());
        assert_ne!(value_generator(), RistrettoPoint::identity());
    }

    #[test]
    fn commitments_homomorphic() {
        let r1 = Scalar::random(&mut OsRng {});
        let r2 = Scalar::random(&mut OsRng {});

        let sum = commit(30, &r1) + commit(12, &r2);

        assert_eq!(sum, commit(42, &(r1 + r2)));
    }

    #[test]
    fn partial_balance_holds() {
        // Sender spends 120, keeps 10 change, carries 110 (amount + fee)
        let r_in = Scalar::random(&mut OsRng {});
        let r_change = Scalar::random(&mut OsRng {});

        let inputs = [Input {
            commitment: commit(120, &r_in).compress(),
        }];
        let outputs = [Output {
            commitment: commit(10, &r_change).compress(),
        }];

        // Total blinding sum, published as excess + offset
        let k = r_change - r_in;
        let offset = Scalar::random(&mut OsRng {});
        let excess = (k - offset) * RISTRETTO_BASEPOINT_POINT;

        verify_partial_balance(&inputs, &outputs, 110, &excess, &offset)
            .expect("balance must hold");
    }

    #[test]
    fn tampered_commitment_detected() {
        let r_in = Scalar::random(&mut OsRng {});
        let r_change = Scalar::random(&mut OsRng {});

        let inputs = [Input {
            commitment: commit(120, &r_in).compress(),
        }];

        // Output claims one unit more than it should
        let outputs = [Output {
            commitment: commit(11, &r_change).compress(),
        }];

        let k = r_change - r_in;
        let offset = Scalar::random(&mut OsRng {});
        let excess = (k - offset) * RISTRETTO_BASEPOINT_POINT;

        assert_eq!(
            verify_partial_balance(&inputs, &outputs, 110, &excess, &offset).err(),
            Some(Error::InvalidTransaction)
        );
    }
}
