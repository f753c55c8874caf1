// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Negotiator] drives one confidential transaction from proposal to
//! on-chain registration.
//!
//! This handles [Event] inputs, mutates the owned
//! [TxDescription][crate::description::TxDescription] and emits messages
//! through the [Gateway] capability, see [msgs][tandem_wire::msgs] for wire
//! encodings.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT, ristretto::CompressedRistretto, scalar::Scalar,
};
use rand_core::{CryptoRngCore, OsRng};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use tandem_wire::{
    msgs::{ConfirmTransaction, Invite, SetTxParameter, TxType},
    params::{ParameterStore, TxParameterID},
    tx::{Input, Output, Signature, Transaction, TxKernel},
    types::{Amount, TxId},
};

use crate::{
    commitment, keys,
    description::{timestamp_now, Coin, TxDescription, TxStatus},
    schnorr,
};

mod context;
pub use context::Context;

mod event;
pub use event::Event;

mod error;
pub use error::{Error, FailureReason};

mod gateway;
pub use gateway::Gateway;

mod router;
pub use router::Negotiations;

mod snapshot;
pub use snapshot::SNAPSHOT_VERSION;

/// Negotiation sub-states of an active session
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum Round {
    /// Public excesses exchanged, awaiting the final signature share
    ExcessExchanged,
    /// Final signature share produced, transaction submitted
    SignatureExchanged,
}

impl Default for Round {
    fn default() -> Self {
        Self::ExcessExchanged
    }
}

/// Engine state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Created, nothing sent yet
    Created,

    /// Proposal sent, awaiting the peer's confirmation
    Invited,

    /// Active signing session
    Negotiating(Round),

    /// Awaiting the chain registration outcome
    Registering,

    /// Accepted by the chain, awaiting kernel confirmation
    Registered,

    /// Kernel observed on-chain, transaction complete
    Completed,

    /// Cancelled before registration
    Cancelled,

    /// Negotiation failed
    Failed,
}

/// [`Keychain`] trait provides blinding-key derivation for [`Negotiator`]
/// instances
pub trait Keychain {
    /// Derive the blinding factor for output `index` of transaction `tx_id`
    fn derive_blinding(&self, tx_id: &TxId, index: u64) -> Scalar;
}

impl<T: Keychain> Keychain for &T {
    fn derive_blinding(&self, tx_id: &TxId, index: u64) -> Scalar {
        T::derive_blinding(self, tx_id, index)
    }
}

/// [`Negotiator`] drives the transaction lifecycle for a single txId
///
/// One instance exists per active transaction and exclusively owns its
/// mutable negotiation context; concurrent transactions use independent
/// instances.
pub struct Negotiator<K: Keychain, RNG: CryptoRngCore = OsRng> {
    state: State,

    desc: TxDescription,

    params: ParameterStore,

    ctx: Option<Context>,

    keychain: K,
    rng: RNG,
}

impl<K: Keychain> Negotiator<K> {
    /// Create a new negotiation instance with the provided keychain, using
    /// the default [OsRng]
    pub fn new(desc: TxDescription, keychain: K) -> Self {
        Self::new_with_rng(desc, keychain, OsRng {})
    }

    /// Reconstruct a negotiation instance from a persisted description
    pub fn resume(desc: TxDescription, keychain: K) -> Result<Self, Error> {
        Self::resume_with_rng(desc, keychain, OsRng {})
    }
}

impl<K: Keychain, RNG: CryptoRngCore> Negotiator<K, RNG> {
    /// Create a new negotiation instance with the provided keychain and rng
    pub fn new_with_rng(desc: TxDescription, keychain: K, rng: RNG) -> Self {
        Self {
            state: State::Created,
            desc,
            params: ParameterStore::new(),
            ctx: None,
            keychain,
            rng,
        }
    }

    /// Reconstruct a negotiation instance from a persisted description,
    /// re-entering at the persisted sub-state
    ///
    /// Fails with [Error::InvalidState] when the description is not
    /// resumable (terminal status).
    pub fn resume_with_rng(desc: TxDescription, keychain: K, rng: RNG) -> Result<Self, Error> {
        if !desc.can_resume() {
            return Err(Error::InvalidState);
        }

        let (state, ctx) = match desc.fsm_state.is_empty() {
            true => (State::Created, None),
            false => snapshot::decode(&desc.fsm_state)?,
        };

        Ok(Self {
            state,
            desc,
            params: ParameterStore::new(),
            ctx,
            keychain,
            rng,
        })
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch the owned transaction description
    pub fn description(&self) -> &TxDescription {
        &self.desc
    }

    /// Fetch the negotiation parameter store
    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Encode the current negotiation snapshot
    pub fn snapshot(&self) -> Result<Vec<u8>, Error> {
        snapshot::encode(self.state, self.ctx.as_ref())
    }

    /// Write the current snapshot into the owned description so an external
    /// store can persist it
    pub fn checkpoint(&mut self) -> Result<&TxDescription, Error> {
        self.desc.fsm_state = self.snapshot()?;
        self.desc.modify_time = timestamp_now();
        Ok(&self.desc)
    }

    /// Open the negotiation in the sending role
    ///
    /// `coins` is the external coin selection; the only validation applied
    /// here is the arithmetic identity against amount + fee. Computes the
    /// local excess/offset contribution, emits the proposal and moves to
    /// [State::Invited].
    pub fn start<G: Gateway + ?Sized>(&mut self, gw: &mut G, coins: &[Coin]) -> Result<State, Error> {
        if self.state != State::Created || !self.desc.sender {
            return Err(Error::InvalidState);
        }

        let total: Amount = coins.iter().map(|c| c.value).sum();
        let needed = self
            .desc
            .amount
            .checked_add(self.desc.fee)
            .ok_or(Error::InvalidTransaction)?;
        if total < needed {
            return Err(Error::InvalidTransaction);
        }
        let change = total - needed;

        if self.desc.min_height == 0 {
            if let Some(h) = gw.get_tip() {
                self.desc.min_height = h;
            }
        }

        let inputs: Vec<Input> = coins
            .iter()
            .map(|c| Input {
                commitment: c.commitment().compress(),
            })
            .collect();

        // Sum of output blindings minus input blindings
        let mut blinding_sum = -coins.iter().map(|c| c.blinding).sum::<Scalar>();

        let mut outputs = Vec::new();
        if change > 0 {
            let r = self.keychain.derive_blinding(&self.desc.tx_id, 0);
            outputs.push(Output {
                commitment: commitment::commit(change, &r).compress(),
            });
            blinding_sum += r;
        }

        // Declared offset and partial excess recombine to the blinding sum
        let (offset, excess) = keys::split_key_with_rng(&blinding_sum, 0, &mut self.rng)?;

        let nonce = Scalar::random(&mut self.rng);
        let public_excess = excess * RISTRETTO_BASEPOINT_POINT;
        let public_nonce = nonce * RISTRETTO_BASEPOINT_POINT;

        self.desc.change = change;

        self.params
            .set(TxParameterID::TransactionType, &(TxType::Simple as u8))?;
        self.params.set(TxParameterID::IsSender, &1u8)?;
        self.params.set(TxParameterID::Amount, &self.desc.amount)?;
        self.params.set(TxParameterID::Fee, &self.desc.fee)?;
        self.params
            .set(TxParameterID::MinHeight, &self.desc.min_height)?;
        self.params.set(TxParameterID::MyId, &self.desc.my_id)?;
        self.params.set(TxParameterID::PeerId, &self.desc.peer_id)?;
        self.params
            .set_bytes(TxParameterID::Message, &self.desc.message);
        self.params.set_list(TxParameterID::Inputs, &inputs)?;
        self.params.set_list(TxParameterID::Outputs, &outputs)?;
        self.params
            .set(TxParameterID::Timestamp, &self.desc.create_time)?;
        self.params
            .set_scalar(TxParameterID::BlindingExcess, &excess)?;
        self.params.set_scalar(TxParameterID::Offset, &offset)?;
        self.params.set(TxParameterID::Change, &change)?;

        let invite = Invite {
            from: self.desc.my_id,
            tx_id: self.desc.tx_id,
            amount: self.desc.amount,
            fee: self.desc.fee,
            min_height: self.desc.min_height,
            send: true,
            public_excess: public_excess.compress(),
            offset,
            public_nonce: public_nonce.compress(),
            inputs: inputs.clone(),
            outputs: outputs.clone(),
            message: self.desc.message.clone(),
        };

        self.ctx = Some(Context {
            blinding_excess: excess,
            offset,
            nonce,
            public_excess,
            public_nonce,
            peer_public_excess: None,
            peer_public_nonce: None,
            inputs,
            outputs,
            peer_inputs: Vec::new(),
            peer_outputs: Vec::new(),
            kernel: None,
        });

        self.set_status(TxStatus::InProgress);
        self.state = State::Invited;

        #[cfg(feature = "log")]
        log::debug!("tx {}: invitation sent", self.desc.tx_id);

        gw.send_tx_invitation(&self.desc, invite);

        Ok(self.state)
    }

    /// Handle an incoming negotiation event
    pub fn update<G: Gateway + ?Sized>(&mut self, gw: &mut G, evt: &Event) -> Result<State, Error> {
        #[cfg(feature = "log")]
        log::debug!("tx {}: event {:?} in state {}", self.desc.tx_id, evt, self.state);

        match (self.state, evt) {
            // Proposal opens the negotiation (receiving role)
            (State::Created, Event::Invite(m)) if !self.desc.sender => self.handle_invite(gw, m),

            // Re-delivered proposal after progress: at-least-once transport,
            // no-op
            (
                State::Negotiating(_) | State::Registering | State::Registered | State::Completed,
                Event::Invite(_),
            ) if !self.desc.sender => Ok(self.state),

            // Peer confirmed the invitation (sending role)
            (
                State::Invited,
                Event::ConfirmInvitation {
                    public_excess,
                    signature,
                    outputs,
                },
            ) => self.handle_confirm_invitation(gw, public_excess, signature, outputs),

            // Re-delivered confirmation once our share is out: no-op
            (
                State::Negotiating(_) | State::Registering | State::Registered | State::Completed,
                Event::ConfirmInvitation { .. },
            ) if self.desc.sender => Ok(self.state),

            // Peer's final signature share (receiving role)
            (State::Negotiating(Round::ExcessExchanged), Event::ConfirmTransaction { signature }) => {
                self.handle_confirm_transaction(gw, signature)
            }

            // Re-delivered final share: no-op
            (
                State::Registering | State::Registered | State::Completed,
                Event::ConfirmTransaction { .. },
            ) if !self.desc.sender => Ok(self.state),

            // Chain registration outcome, from the local submission
            // callback or relayed by the peer
            (
                State::Negotiating(Round::SignatureExchanged) | State::Registering,
                Event::Registered { value },
            ) => self.handle_registered(gw, *value),

            (State::Registered | State::Completed, Event::Registered { .. }) => Ok(self.state),

            // Kernel observed on-chain
            (State::Registered, Event::KernelConfirmed) => {
                self.complete(gw);
                Ok(self.state)
            }
            (State::Completed, Event::KernelConfirmed) => Ok(self.state),

            // Peer abort; meaningless once the transaction is on-chain
            (
                State::Registered | State::Completed | State::Cancelled | State::Failed,
                Event::Failed,
            ) => Ok(self.state),
            (_, Event::Failed) => {
                #[cfg(feature = "log")]
                log::warn!("tx {}: aborted by peer", self.desc.tx_id);

                self.ctx = None;
                self.set_status(TxStatus::Failed);
                self.state = State::Failed;

                Ok(self.state)
            }

            // Locally injected cancellation
            (_, Event::Cancel) => self.cancel(gw),

            // Out-of-order or wrong-role messages never mutate state
            (_state, _evt) => {
                #[cfg(feature = "log")]
                log::error!(
                    "tx {}: unexpected event in state {:?}: {:?}",
                    self.desc.tx_id,
                    _state,
                    _evt
                );

                Err(Error::UnexpectedMessage)
            }
        }
    }

    /// Cancel the negotiation
    ///
    /// Allowed strictly before registration has been submitted; a broadcast
    /// transaction cannot be retracted.
    pub fn cancel<G: Gateway + ?Sized>(&mut self, gw: &mut G) -> Result<State, Error> {
        match self.state {
            State::Created | State::Invited | State::Negotiating(Round::ExcessExchanged) => {
                self.ctx = None;
                self.scrub_private_params();
                self.params
                    .set(TxParameterID::FailureReason, &u32::from(FailureReason::Cancelled))?;
                self.set_status(TxStatus::Cancelled);
                self.state = State::Cancelled;

                gw.send_tx_failed(&self.desc);

                Ok(self.state)
            }
            State::Cancelled => Ok(self.state),
            _ => Err(Error::InvalidState),
        }
    }

    /// Handle an incoming proposal (receiving role)
    fn handle_invite<G: Gateway + ?Sized>(&mut self, gw: &mut G, m: &Invite) -> Result<State, Error> {
        // Adopt the proposal into the local record
        self.desc.amount = m.amount;
        self.desc.fee = m.fee;
        self.desc.min_height = m.min_height;
        self.desc.peer_id = m.from;
        self.desc.message = m.message.clone();

        let carried = match m.amount.checked_add(m.fee) {
            Some(v) => v,
            None => {
                self.fail_tx(gw, FailureReason::InvalidTransaction);
                return Err(Error::InvalidTransaction);
            }
        };

        let (peer_excess, peer_nonce) = match (m.public_excess.decompress(), m.public_nonce.decompress())
        {
            (Some(e), Some(n)) => (e, n),
            _ => {
                self.fail_tx(gw, FailureReason::InvalidTransaction);
                return Err(Error::InvalidKey);
            }
        };

        // The confidential-transaction invariant: the peer's commitments
        // must balance against its declared excess and offset
        if commitment::verify_partial_balance(&m.inputs, &m.outputs, carried, &peer_excess, &m.offset)
            .is_err()
        {
            self.fail_tx(gw, FailureReason::InvalidTransaction);
            return Err(Error::InvalidTransaction);
        }

        // Own excess over the received value
        let excess = self.keychain.derive_blinding(&self.desc.tx_id, 0);
        let output = Output {
            commitment: commitment::commit(m.amount, &excess).compress(),
        };

        let nonce = Scalar::random(&mut self.rng);
        let public_excess = excess * RISTRETTO_BASEPOINT_POINT;
        let public_nonce = nonce * RISTRETTO_BASEPOINT_POINT;

        // Challenge over the aggregates, then our signature share
        let r_agg = (peer_nonce + public_nonce).compress();
        let e_agg = (peer_excess + public_excess).compress();
        let c = schnorr::challenge(&r_agg, &e_agg, &schnorr::kernel_message(m.fee, m.min_height));
        let s = schnorr::partial_sign(&nonce, &excess, &c);

        let outputs = vec![output];

        self.params
            .set(TxParameterID::TransactionType, &(TxType::Simple as u8))?;
        self.params.set(TxParameterID::IsSender, &0u8)?;
        self.params.set(TxParameterID::Amount, &m.amount)?;
        self.params.set(TxParameterID::Fee, &m.fee)?;
        self.params.set(TxParameterID::MinHeight, &m.min_height)?;
        self.params.set(TxParameterID::MyId, &self.desc.my_id)?;
        self.params.set(TxParameterID::PeerId, &self.desc.peer_id)?;
        self.params
            .set_bytes(TxParameterID::Message, &self.desc.message);
        self.params.set_list(TxParameterID::Outputs, &outputs)?;
        self.params
            .set(TxParameterID::Timestamp, &self.desc.create_time)?;
        self.params
            .set_scalar(TxParameterID::BlindingExcess, &excess)?;
        self.params.set(TxParameterID::Change, &0u64)?;

        // Reply with the envelope form, carrying our output set so the
        // inviter can assemble the full transaction
        let mut env = SetTxParameter::new(self.desc.my_id, self.desc.tx_id, TxType::Simple);
        env.set_point(TxParameterID::PeerPublicExcess, &public_excess.compress())?;
        env.set(
            TxParameterID::PeerSignature,
            &Signature {
                nonce: public_nonce.compress(),
                s,
            },
        )?;
        env.set_list(TxParameterID::PeerOutputs, &outputs)?;

        self.ctx = Some(Context {
            blinding_excess: excess,
            offset: Scalar::ZERO,
            nonce,
            public_excess,
            public_nonce,
            peer_public_excess: Some(peer_excess),
            peer_public_nonce: Some(peer_nonce),
            inputs: Vec::new(),
            outputs,
            peer_inputs: m.inputs.clone(),
            peer_outputs: m.outputs.clone(),
            kernel: None,
        });

        self.set_status(TxStatus::InProgress);
        self.state = State::Negotiating(Round::ExcessExchanged);

        #[cfg(feature = "log")]
        log::debug!("tx {}: invitation confirmed", self.desc.tx_id);

        gw.send_tx_params(&self.desc.peer_id, env);

        Ok(self.state)
    }

    /// Handle the peer's invitation confirmation (sending role)
    fn handle_confirm_invitation<G: Gateway + ?Sized>(
        &mut self,
        gw: &mut G,
        public_excess: &CompressedRistretto,
        signature: &Signature,
        peer_outputs: &[Output],
    ) -> Result<State, Error> {
        let (nonce, excess_scalar, offset, own_nonce_pub, own_excess_pub, own_inputs, own_outputs) =
            match self.ctx.as_ref() {
                Some(c) => (
                    c.nonce,
                    c.blinding_excess,
                    c.offset,
                    c.public_nonce,
                    c.public_excess,
                    c.inputs.clone(),
                    c.outputs.clone(),
                ),
                None => return Err(Error::InvalidState),
            };

        let (peer_excess, peer_nonce) = match (public_excess.decompress(), signature.nonce.decompress())
        {
            (Some(e), Some(n)) => (e, n),
            _ => {
                self.fail_tx(gw, FailureReason::InvalidTransaction);
                return Err(Error::InvalidKey);
            }
        };

        let r_agg = (own_nonce_pub + peer_nonce).compress();
        let e_agg = (own_excess_pub + peer_excess).compress();
        let m = schnorr::kernel_message(self.desc.fee, self.desc.min_height);
        let c = schnorr::challenge(&r_agg, &e_agg, &m);

        // The peer's share must verify against its declared artifacts
        if schnorr::verify_partial(&signature.s, &peer_nonce, &peer_excess, &c).is_err() {
            self.fail_tx(gw, FailureReason::InvalidSignature);
            return Err(Error::InvalidTransaction);
        }

        let s_own = schnorr::partial_sign(&nonce, &excess_scalar, &c);
        let s = s_own + signature.s;

        let kernel = TxKernel {
            excess: e_agg,
            fee: self.desc.fee,
            min_height: self.desc.min_height,
            signature: Signature { nonce: r_agg, s },
        };

        let mut outputs = own_outputs;
        outputs.extend_from_slice(peer_outputs);

        let tx = Transaction {
            offset,
            inputs: own_inputs,
            outputs,
            kernel,
        };

        // Full verification before anything irreversible happens
        if schnorr::verify_kernel(&kernel).is_err() || commitment::verify_balance(&tx).is_err() {
            self.fail_tx(gw, FailureReason::InvalidTransaction);
            return Err(Error::InvalidTransaction);
        }

        // Verified; commit the accumulated peer values
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.peer_public_excess = Some(peer_excess);
            ctx.peer_public_nonce = Some(peer_nonce);
            ctx.peer_outputs = peer_outputs.to_vec();
            ctx.kernel = Some(kernel);
        }

        self.set_status(TxStatus::InProgress);
        self.state = State::Negotiating(Round::SignatureExchanged);

        #[cfg(feature = "log")]
        log::debug!("tx {}: registering", self.desc.tx_id);

        gw.send_tx_confirmation(
            &self.desc,
            ConfirmTransaction {
                from: self.desc.my_id,
                tx_id: self.desc.tx_id,
                signature: s_own,
            },
        );
        gw.register_tx(&self.desc.tx_id, tx);

        Ok(self.state)
    }

    /// Handle the peer's final signature share (receiving role)
    fn handle_confirm_transaction<G: Gateway + ?Sized>(
        &mut self,
        gw: &mut G,
        peer_sig: &Scalar,
    ) -> Result<State, Error> {
        let (nonce, excess_scalar, own_nonce_pub, own_excess_pub, peer_nonce, peer_excess) =
            match self.ctx.as_ref() {
                Some(c) => match (c.peer_public_nonce, c.peer_public_excess) {
                    (Some(rn), Some(re)) => (
                        c.nonce,
                        c.blinding_excess,
                        c.public_nonce,
                        c.public_excess,
                        rn,
                        re,
                    ),
                    _ => return Err(Error::InvalidState),
                },
                None => return Err(Error::InvalidState),
            };

        let r_agg = (own_nonce_pub + peer_nonce).compress();
        let e_agg = (own_excess_pub + peer_excess).compress();
        let m = schnorr::kernel_message(self.desc.fee, self.desc.min_height);
        let c = schnorr::challenge(&r_agg, &e_agg, &m);

        // The peer's share must verify against its declared artifacts
        if schnorr::verify_partial(peer_sig, &peer_nonce, &peer_excess, &c).is_err() {
            self.fail_tx(gw, FailureReason::InvalidSignature);
            return Err(Error::InvalidTransaction);
        }

        // Aggregate and check the finished kernel
        let s = schnorr::partial_sign(&nonce, &excess_scalar, &c) + peer_sig;
        let kernel = TxKernel {
            excess: e_agg,
            fee: self.desc.fee,
            min_height: self.desc.min_height,
            signature: Signature { nonce: r_agg, s },
        };

        if schnorr::verify_kernel(&kernel).is_err() {
            self.fail_tx(gw, FailureReason::InvalidSignature);
            return Err(Error::InvalidTransaction);
        }

        if let Some(ctx) = self.ctx.as_mut() {
            ctx.kernel = Some(kernel);
        }

        self.set_status(TxStatus::InProgress);
        self.state = State::Registering;

        #[cfg(feature = "log")]
        log::debug!("tx {}: awaiting registration", self.desc.tx_id);

        Ok(self.state)
    }

    /// Handle the chain registration outcome
    fn handle_registered<G: Gateway + ?Sized>(&mut self, gw: &mut G, value: bool) -> Result<State, Error> {
        if !value {
            self.fail_tx(gw, FailureReason::ChainRejected);
            return Ok(self.state);
        }

        self.set_status(TxStatus::Registered);
        self.state = State::Registered;

        self.params
            .set(TxParameterID::TransactionRegistered, &1u8)?;

        // The sender relays its chain submission outcome to the peer
        if self.desc.sender {
            gw.send_tx_registered(&self.desc);
        }

        let (outputs, kernel) = match self.ctx.as_ref() {
            Some(c) => (c.outputs.clone(), c.kernel),
            None => return Err(Error::InvalidState),
        };

        if let Some(k) = &kernel {
            self.params.set(TxParameterID::KernelProof, k)?;
        }

        // Watch for our outputs to appear on-chain
        gw.confirm_outputs(&outputs);

        // Harnesses without a chain-sync collaborator finish here
        if gw.is_test_mode() {
            self.complete(gw);
            return Ok(self.state);
        }

        match kernel {
            Some(k) => gw.confirm_kernel(&self.desc.tx_id, &k),
            None => return Err(Error::InvalidState),
        }

        // Signing is done, scrub private scalar material
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.scrub_secrets();
        }

        Ok(self.state)
    }

    /// Terminal success: report completion and drop the signing context
    fn complete<G: Gateway + ?Sized>(&mut self, gw: &mut G) {
        self.ctx = None;
        self.scrub_private_params();
        self.set_status(TxStatus::Completed);
        self.state = State::Completed;

        #[cfg(feature = "log")]
        log::info!("tx {}: completed", self.desc.tx_id);

        gw.on_tx_completed(&self.desc.tx_id);
    }

    /// Terminal failure: record the reason, notify the peer and drop the
    /// signing context
    fn fail_tx<G: Gateway + ?Sized>(&mut self, gw: &mut G, reason: FailureReason) {
        #[cfg(feature = "log")]
        log::warn!("tx {}: failed, {}", self.desc.tx_id, reason);

        let _ = self
            .params
            .set(TxParameterID::FailureReason, &u32::from(reason));

        self.ctx = None;
        self.scrub_private_params();
        self.set_status(TxStatus::Failed);
        self.state = State::Failed;

        gw.send_tx_failed(&self.desc);
    }

    /// Scrub private scalar slots once they can no longer be needed
    fn scrub_private_params(&mut self) {
        self.params.remove(TxParameterID::BlindingExcess);
        self.params.remove(TxParameterID::Offset);
    }

    fn set_status(&mut self, status: TxStatus) {
        self.desc.status = status;
        self.desc.modify_time = timestamp_now();
    }
}

#[cfg(test)]
mod test {
    use rand_core::OsRng;
    use sha2::{Digest, Sha512};

    use tandem_wire::types::{Height, WalletId};

    use super::*;
    use crate::description::timestamp_now;

    /// Keychain implementation for state tests
    #[derive(Clone)]
    pub struct TestKeychain {
        seed: [u8; 32],
    }

    impl Keychain for TestKeychain {
        fn derive_blinding(&self, tx_id: &TxId, index: u64) -> Scalar {
            Scalar::from_hash(
                Sha512::new()
                    .chain_update(self.seed)
                    .chain_update(tx_id.as_bytes())
                    .chain_update(index.to_le_bytes()),
            )
        }
    }

    /// Gateway implementation counting emissions, for state tests
    #[derive(Default)]
    struct CountingGateway {
        sent: usize,
        registered: usize,
    }

    impl Gateway for CountingGateway {
        fn on_tx_completed(&mut self, _tx_id: &TxId) {}

        fn send_tx_failed(&mut self, _tx: &TxDescription) {
            self.sent += 1;
        }

        fn send_tx_invitation(&mut self, _tx: &TxDescription, _msg: Invite) {
            self.sent += 1;
        }

        fn send_invite_confirm(
            &mut self,
            _tx: &TxDescription,
            _msg: tandem_wire::msgs::ConfirmInvitation,
        ) {
            self.sent += 1;
        }

        fn send_tx_confirmation(&mut self, _tx: &TxDescription, _msg: ConfirmTransaction) {
            self.sent += 1;
        }

        fn register_tx(&mut self, _tx_id: &TxId, _tx: Transaction) {
            self.registered += 1;
        }

        fn send_tx_registered(&mut self, _tx: &TxDescription) {
            self.sent += 1;
        }

        fn confirm_outputs(&mut self, _outputs: &[Output]) {}

        fn confirm_kernel(&mut self, _tx_id: &TxId, _kernel: &TxKernel) {}

        fn get_tip(&self) -> Option<Height> {
            None
        }

        fn is_test_mode(&self) -> bool {
            false
        }

        fn send_tx_params(&mut self, _peer_id: &WalletId, _msg: SetTxParameter) {
            self.sent += 1;
        }
    }

    fn build_negotiator(sender: bool) -> Negotiator<TestKeychain> {
        let desc = TxDescription::new(
            TxId::from_random(&mut OsRng {}),
            100,
            10,
            25,
            WalletId::new([0xb2; 32]),
            WalletId::new([0xa1; 32]),
            Vec::new(),
            timestamp_now(),
            sender,
        );

        Negotiator::new(desc, TestKeychain { seed: [0x01; 32] })
    }

    #[test]
    fn start_requires_sending_role() {
        let mut n = build_negotiator(false);
        let mut gw = CountingGateway::default();

        let coins = [Coin::new(120, Scalar::random(&mut OsRng {}))];

        assert_eq!(n.start(&mut gw, &coins), Err(Error::InvalidState));
        assert_eq!(n.state(), State::Created);
        assert_eq!(gw.sent, 0);
    }

    #[test]
    fn start_is_not_repeatable() {
        let mut n = build_negotiator(true);
        let mut gw = CountingGateway::default();

        let coins = [Coin::new(120, Scalar::random(&mut OsRng {}))];

        n.start(&mut gw, &coins).unwrap();
        assert_eq!(n.state(), State::Invited);

        assert_eq!(n.start(&mut gw, &coins), Err(Error::InvalidState));
        assert_eq!(gw.sent, 1);
    }

    /// Ensure we're rejecting unexpected events without mutating state
    #[test]
    fn invalid_events() {
        let mut n = build_negotiator(true);
        let mut gw = CountingGateway::default();

        let coins = [Coin::new(120, Scalar::random(&mut OsRng {}))];
        n.start(&mut gw, &coins).unwrap();

        let events = [
            Event::ConfirmTransaction {
                signature: Scalar::random(&mut OsRng {}),
            },
            Event::Registered { value: true },
            Event::KernelConfirmed,
        ];

        for evt in &events {
            let r = n.update(&mut gw, evt);
            assert_eq!(r, Err(Error::UnexpectedMessage), "event {evt:?} accepted");
            assert_eq!(n.state(), State::Invited);
        }

        assert_eq!(gw.sent, 1);
        assert_eq!(gw.registered, 0);
    }

    #[test]
    fn cancel_windows() {
        // Fresh machine, cancellable
        let mut n = build_negotiator(true);
        let mut gw = CountingGateway::default();
        assert_eq!(n.cancel(&mut gw), Ok(State::Cancelled));

        // Repeated cancellation is idempotent
        assert_eq!(n.cancel(&mut gw), Ok(State::Cancelled));
        assert_eq!(gw.sent, 1);

        // Invited machine, cancellable
        let mut n = build_negotiator(true);
        let mut gw = CountingGateway::default();
        let coins = [Coin::new(120, Scalar::random(&mut OsRng {}))];
        n.start(&mut gw, &coins).unwrap();

        assert_eq!(n.cancel(&mut gw), Ok(State::Cancelled));
        assert_eq!(n.description().status, TxStatus::Cancelled);
    }

    #[test]
    fn peer_abort_before_start() {
        let mut n = build_negotiator(false);
        let mut gw = CountingGateway::default();

        n.update(&mut gw, &Event::Failed).unwrap();

        assert_eq!(n.state(), State::Failed);

        // No abort echoed back toward the peer
        assert_eq!(gw.sent, 0);
    }
}
