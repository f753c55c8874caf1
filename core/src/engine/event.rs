// Copyright (c) 2022-2023 The MobileCoin Foundation

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use encdec::DecodeOwned;

use tandem_wire::{
    msgs::{ConfirmInvitation, ConfirmTransaction, Invite, SetTxParameter, TxFailed, TxRegistered},
    params::TxParameterID,
    tx::{Input, Output, Signature},
    types::{TxId, WalletId},
    Error as WireError, MsgId,
};

use super::Error;

/// [`Negotiator`][super::Negotiator] input events, decoded from inbound
/// negotiation messages or injected by the owning event loop
#[derive(Clone, Debug)]
pub enum Event {
    /// Transaction proposal (receiver role)
    Invite(Invite),

    /// Peer's public excess, partial signature and contributed outputs
    /// (sender role)
    ConfirmInvitation {
        public_excess: CompressedRistretto,
        signature: Signature,
        outputs: Vec<Output>,
    },

    /// Peer's final signature share (receiver role)
    ConfirmTransaction { signature: Scalar },

    /// Chain registration outcome, from the local chain submission or
    /// relayed by the peer
    Registered { value: bool },

    /// Kernel observed on-chain by the chain-sync collaborator
    KernelConfirmed,

    /// Peer aborted the negotiation
    Failed,

    /// Locally injected cancellation
    Cancel,
}

impl Event {
    /// Parse an inbound message to a routable event
    ///
    /// Returns the originating endpoint and transaction id alongside the
    /// event so a caller can correlate before dispatch.
    pub fn parse(msg_id: u8, buff: &[u8]) -> Result<(WalletId, TxId, Event), Error> {
        let msg_id = MsgId::try_from(msg_id).map_err(|_| WireError::UnknownMessage)?;

        match msg_id {
            MsgId::Invite => {
                let (m, _n) = Invite::decode_owned(buff)?;
                Ok((m.from, m.tx_id, Event::from(m)))
            }
            MsgId::ConfirmInvitation => {
                let (m, _n) = ConfirmInvitation::decode_owned(buff)?;
                Ok((m.from, m.tx_id, Event::from(m)))
            }
            MsgId::ConfirmTransaction => {
                let (m, _n) = ConfirmTransaction::decode_owned(buff)?;
                Ok((m.from, m.tx_id, Event::from(m)))
            }
            MsgId::TxRegistered => {
                let (m, _n) = TxRegistered::decode_owned(buff)?;
                Ok((m.from, m.tx_id, Event::from(m)))
            }
            MsgId::TxFailed => {
                let (m, _n) = TxFailed::decode_owned(buff)?;
                Ok((m.from, m.tx_id, Event::from(m)))
            }
            MsgId::SetTxParameter => {
                let (m, _n) = SetTxParameter::decode_owned(buff)?;
                Self::from_envelope(m)
            }
        }
    }

    /// Interpret a parameter envelope as one of the pre-agreed negotiation
    /// steps
    ///
    /// An envelope carrying `Amount` is a proposal; one carrying
    /// `PeerPublicExcess` (without `Amount`) an invitation confirmation;
    /// `PeerSignature` alone the final signature share. `PeerSignature`
    /// holds a 64-byte signature in the confirmation form and a 32-byte
    /// response scalar in the final form.
    pub fn from_envelope(env: SetTxParameter) -> Result<(WalletId, TxId, Event), Error> {
        let (from, tx_id) = (env.from, env.tx_id);
        let p = env.params();

        if let Some(amount) = p.get::<u64>(TxParameterID::Amount)? {
            let public_excess = p
                .get_point(TxParameterID::PeerPublicExcess)?
                .ok_or(WireError::InvalidEncoding)?;
            let offset = p
                .get_scalar(TxParameterID::PeerOffset)?
                .ok_or(WireError::InvalidEncoding)?;
            let public_nonce = p
                .get_point(TxParameterID::PeerPublicNonce)?
                .ok_or(WireError::InvalidEncoding)?;

            let m = Invite {
                from,
                tx_id,
                amount,
                fee: p.get::<u64>(TxParameterID::Fee)?.unwrap_or(0),
                min_height: p.get::<u64>(TxParameterID::MinHeight)?.unwrap_or(0),
                send: p.get::<u8>(TxParameterID::IsSender)?.unwrap_or(1) != 0,
                public_excess,
                offset,
                public_nonce,
                inputs: p
                    .get_list::<Input>(TxParameterID::PeerInputs)?
                    .unwrap_or_default(),
                outputs: p
                    .get_list::<Output>(TxParameterID::PeerOutputs)?
                    .unwrap_or_default(),
                message: p
                    .get_bytes(TxParameterID::Message)
                    .map(|b| b.to_vec())
                    .unwrap_or_default(),
            };

            return Ok((from, tx_id, Event::Invite(m)));
        }

        if let Some(public_excess) = p.get_point(TxParameterID::PeerPublicExcess)? {
            let signature = p
                .get::<Signature>(TxParameterID::PeerSignature)?
                .ok_or(WireError::InvalidEncoding)?;
            let outputs = p
                .get_list::<Output>(TxParameterID::PeerOutputs)?
                .unwrap_or_default();

            return Ok((
                from,
                tx_id,
                Event::ConfirmInvitation {
                    public_excess,
                    signature,
                    outputs,
                },
            ));
        }

        if let Some(signature) = p.get_scalar(TxParameterID::PeerSignature)? {
            return Ok((from, tx_id, Event::ConfirmTransaction { signature }));
        }

        if let Some(value) = p.get::<u8>(TxParameterID::TransactionRegistered)? {
            return Ok((from, tx_id, Event::Registered { value: value != 0 }));
        }

        if p.get_bytes(TxParameterID::FailureReason).is_some() {
            return Ok((from, tx_id, Event::Failed));
        }

        Err(Error::Decode(WireError::UnknownMessage))
    }
}

impl From<Invite> for Event {
    fn from(m: Invite) -> Self {
        Event::Invite(m)
    }
}

impl From<ConfirmInvitation> for Event {
    fn from(m: ConfirmInvitation) -> Self {
        Event::ConfirmInvitation {
            public_excess: m.public_excess,
            signature: m.signature,
            outputs: Vec::new(),
        }
    }
}

impl From<ConfirmTransaction> for Event {
    fn from(m: ConfirmTransaction) -> Self {
        Event::ConfirmTransaction {
            signature: m.signature,
        }
    }
}

impl From<TxRegistered> for Event {
    fn from(m: TxRegistered) -> Self {
        Event::Registered { value: m.value }
    }
}

impl From<TxFailed> for Event {
    fn from(_m: TxFailed) -> Self {
        Event::Failed
    }
}
