// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Gateway capability, the boundary contract toward networking and
//! chain-sync collaborators
//!
//! The engine never implements networking, chain queries or coin storage;
//! it calls this contract and reacts to events injected by its owner. All
//! sends are fire-and-forget from the engine's perspective.

use tandem_wire::{
    msgs::{ConfirmInvitation, ConfirmTransaction, Invite, SetTxParameter},
    tx::{Output, Transaction, TxKernel},
    types::{Height, TxId, WalletId},
};

use crate::description::TxDescription;

/// Capability set consumed by the negotiation engine, one conforming
/// adapter per transport
pub trait Gateway {
    /// Transaction reached its terminal success state
    fn on_tx_completed(&mut self, tx_id: &TxId);

    /// Notify the peer of a terminal failure or cancellation
    fn send_tx_failed(&mut self, tx: &TxDescription);

    /// Send a transaction proposal to the peer
    fn send_tx_invitation(&mut self, tx: &TxDescription, msg: Invite);

    /// Send the receiver's invitation confirmation to the inviter
    fn send_invite_confirm(&mut self, tx: &TxDescription, msg: ConfirmInvitation);

    /// Send the inviter's final signature share to the receiver
    fn send_tx_confirmation(&mut self, tx: &TxDescription, msg: ConfirmTransaction);

    /// Submit a finished transaction to the chain
    fn register_tx(&mut self, tx_id: &TxId, tx: Transaction);

    /// Relay the registration outcome to the peer
    fn send_tx_registered(&mut self, tx: &TxDescription);

    /// Ask the chain-sync collaborator to watch for these outputs
    fn confirm_outputs(&mut self, outputs: &[Output]);

    /// Ask the chain-sync collaborator to watch for this kernel
    fn confirm_kernel(&mut self, tx_id: &TxId, kernel: &TxKernel);

    /// Current chain tip height, if known
    fn get_tip(&self) -> Option<Height>;

    /// Test harnesses short-circuit chain confirmation
    fn is_test_mode(&self) -> bool;

    /// Send a parameter envelope to a peer endpoint
    fn send_tx_params(&mut self, peer_id: &WalletId, msg: SetTxParameter);
}

impl<T: Gateway> Gateway for &mut T {
    fn on_tx_completed(&mut self, tx_id: &TxId) {
        T::on_tx_completed(self, tx_id)
    }

    fn send_tx_failed(&mut self, tx: &TxDescription) {
        T::send_tx_failed(self, tx)
    }

    fn send_tx_invitation(&mut self, tx: &TxDescription, msg: Invite) {
        T::send_tx_invitation(self, tx, msg)
    }

    fn send_invite_confirm(&mut self, tx: &TxDescription, msg: ConfirmInvitation) {
        T::send_invite_confirm(self, tx, msg)
    }

    fn send_tx_confirmation(&mut self, tx: &TxDescription, msg: ConfirmTransaction) {
        T::send_tx_confirmation(self, tx, msg)
    }

    fn register_tx(&mut self, tx_id: &TxId, tx: Transaction) {
        T::register_tx(self, tx_id, tx)
    }

    fn send_tx_registered(&mut self, tx: &TxDescription) {
        T::send_tx_registered(self, tx)
    }

    fn confirm_outputs(&mut self, outputs: &[Output]) {
        T::confirm_outputs(self, outputs)
    }

    fn confirm_kernel(&mut self, tx_id: &TxId, kernel: &TxKernel) {
        T::confirm_kernel(self, tx_id, kernel)
    }

    fn get_tip(&self) -> Option<Height> {
        T::get_tip(self)
    }

    fn is_test_mode(&self) -> bool {
        T::is_test_mode(self)
    }

    fn send_tx_params(&mut self, peer_id: &WalletId, msg: SetTxParameter) {
        T::send_tx_params(self, peer_id, msg)
    }
}
