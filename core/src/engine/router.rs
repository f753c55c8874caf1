// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::collections::HashMap;

use rand_core::{CryptoRngCore, OsRng};

use tandem_wire::types::{TxId, WalletId};

use crate::description::{timestamp_now, TxDescription, TxStatus};

use super::{Error, Event, Gateway, Keychain, Negotiator};

/// Registry of live negotiation machines, one per transaction id
///
/// Routes inbound events to the owning machine, opens receiving-role
/// machines for fresh proposals and answers messages addressed to unknown
/// transaction ids with a failure notice instead of crashing.
pub struct Negotiations<K: Keychain + Clone, RNG: CryptoRngCore + Default = OsRng> {
    my_id: WalletId,
    keychain: K,

    machines: HashMap<TxId, Negotiator<K, RNG>>,
}

impl<K: Keychain + Clone, RNG: CryptoRngCore + Default> Negotiations<K, RNG> {
    pub fn new(my_id: WalletId, keychain: K) -> Self {
        Self {
            my_id,
            keychain,
            machines: HashMap::new(),
        }
    }

    /// Own wallet endpoint
    pub fn my_id(&self) -> &WalletId {
        &self.my_id
    }

    /// Track a machine created elsewhere (outgoing or resumed)
    pub fn insert(&mut self, machine: Negotiator<K, RNG>) {
        self.machines.insert(machine.description().tx_id, machine);
    }

    /// Fetch the machine for a transaction id
    pub fn get(&self, tx_id: &TxId) -> Option<&Negotiator<K, RNG>> {
        self.machines.get(tx_id)
    }

    /// Fetch the machine for a transaction id, mutably
    pub fn get_mut(&mut self, tx_id: &TxId) -> Option<&mut Negotiator<K, RNG>> {
        self.machines.get_mut(tx_id)
    }

    /// Drop the machine for a transaction id (archival is external)
    pub fn remove(&mut self, tx_id: &TxId) -> Option<Negotiator<K, RNG>> {
        self.machines.remove(tx_id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Parse and dispatch a raw inbound message
    pub fn handle_message<G: Gateway + ?Sized>(
        &mut self,
        gw: &mut G,
        msg_id: u8,
        buff: &[u8],
    ) -> Result<(), Error> {
        let (from, tx_id, evt) = Event::parse(msg_id, buff)?;
        self.handle_event(gw, from, tx_id, evt)
    }

    /// Dispatch a decoded event to the owning machine
    pub fn handle_event<G: Gateway + ?Sized>(
        &mut self,
        gw: &mut G,
        from: WalletId,
        tx_id: TxId,
        evt: Event,
    ) -> Result<(), Error> {
        if let Some(machine) = self.machines.get_mut(&tx_id) {
            machine.update(gw, &evt)?;
            return Ok(());
        }

        match evt {
            // Fresh proposal, open a machine in the receiving role
            Event::Invite(m) => {
                let desc = TxDescription::new(
                    tx_id,
                    m.amount,
                    m.fee,
                    m.min_height,
                    from,
                    self.my_id,
                    m.message.clone(),
                    timestamp_now(),
                    false,
                );

                let mut machine =
                    Negotiator::new_with_rng(desc, self.keychain.clone(), RNG::default());
                let r = machine.update(gw, &Event::Invite(m));

                self.machines.insert(tx_id, machine);

                r.map(|_| ())
            }

            // Stale abort or local cancellation for an unknown id, dropped
            Event::Failed | Event::Cancel => Ok(()),

            // Anything else addressed to an unknown id is stale; answer
            // with a failure notice so the peer can clean up
            _evt => {
                #[cfg(feature = "log")]
                log::warn!("tx {tx_id}: stale message {_evt:?}, no resumable context");

                let mut desc = TxDescription::new(
                    tx_id,
                    0,
                    0,
                    0,
                    from,
                    self.my_id,
                    Vec::new(),
                    timestamp_now(),
                    false,
                );
                desc.status = TxStatus::Failed;

                gw.send_tx_failed(&desc);

                Ok(())
            }
        }
    }
}
