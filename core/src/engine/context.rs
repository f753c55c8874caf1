// Copyright (c) 2022-2023 The MobileCoin Foundation

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use zeroize::Zeroize;

use tandem_wire::tx::{Input, Output, TxKernel};

/// Accumulated negotiation values for one transaction
///
/// Exclusively owned by the machine for the transaction's lifetime. The
/// private scalars are scrubbed once signing is complete and on drop.
pub struct Context {
    /// Own partial blinding excess `x_i`
    pub blinding_excess: Scalar,

    /// Kernel offset contribution (zero for the receiving role)
    pub offset: Scalar,

    /// Own signing nonce `r_i`
    pub nonce: Scalar,

    /// Own public excess `E_i = x_i·G`
    pub public_excess: RistrettoPoint,

    /// Own public nonce `R_i = r_i·G`
    pub public_nonce: RistrettoPoint,

    /// Peer's public excess, once exchanged
    pub peer_public_excess: Option<RistrettoPoint>,

    /// Peer's public nonce, once exchanged
    pub peer_public_nonce: Option<RistrettoPoint>,

    /// Input commitments contributed locally
    pub inputs: Vec<Input>,

    /// Output commitments contributed locally
    pub outputs: Vec<Output>,

    /// Input commitments contributed by the peer
    pub peer_inputs: Vec<Input>,

    /// Output commitments contributed by the peer
    pub peer_outputs: Vec<Output>,

    /// Completed kernel, once both signature shares are combined
    pub kernel: Option<TxKernel>,
}

impl Context {
    /// Scrub private scalar material, keeping the public artifacts needed
    /// to observe chain confirmation
    pub fn scrub_secrets(&mut self) {
        self.blinding_excess.zeroize();
        self.offset.zeroize();
        self.nonce.zeroize();
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.scrub_secrets();
    }
}
