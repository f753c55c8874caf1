// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction description, the authoritative local record of one
//! transaction attempt

use std::time::{SystemTime, UNIX_EPOCH};

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroize;

use tandem_wire::types::{Amount, Height, Timestamp, TxId, WalletId};

use crate::commitment;

/// Transaction lifecycle status as persisted alongside the description
#[derive(
    Copy, Clone, PartialEq, Debug, Display, EnumString, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum TxStatus {
    Pending = 0,
    InProgress = 1,
    Cancelled = 2,
    Completed = 3,
    Failed = 4,
    Registered = 5,
}

/// The authoritative local record of one transaction attempt
///
/// Created by the initiating party when a transfer is requested, mutated
/// exclusively by the negotiation engine, archived externally once terminal.
#[derive(Clone, PartialEq, Debug)]
pub struct TxDescription {
    pub tx_id: TxId,
    pub amount: Amount,
    pub fee: Amount,
    pub change: Amount,
    pub min_height: Height,
    pub peer_id: WalletId,
    pub my_id: WalletId,
    pub message: Vec<u8>,
    pub create_time: Timestamp,
    pub modify_time: Timestamp,
    pub sender: bool,
    pub status: TxStatus,

    /// Opaque negotiation snapshot, see [engine::snapshot][crate::engine]
    pub fsm_state: Vec<u8>,
}

impl TxDescription {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_id: TxId,
        amount: Amount,
        fee: Amount,
        min_height: Height,
        peer_id: WalletId,
        my_id: WalletId,
        message: Vec<u8>,
        create_time: Timestamp,
        sender: bool,
    ) -> Self {
        Self {
            tx_id,
            amount,
            fee,
            change: 0,
            min_height,
            peer_id,
            my_id,
            message,
            create_time,
            modify_time: create_time,
            sender,
            status: TxStatus::Pending,
            fsm_state: Vec::new(),
        }
    }

    /// Whether a restarted process may safely re-enter the negotiation
    pub fn can_resume(&self) -> bool {
        matches!(
            self.status,
            TxStatus::Pending | TxStatus::InProgress | TxStatus::Registered
        )
    }
}

/// A spendable coin supplied by external coin selection
///
/// Holds the coin's blinding factor; instances are consumed by the engine
/// and scrubbed on drop.
#[derive(Clone)]
pub struct Coin {
    pub value: Amount,
    pub blinding: Scalar,
}

impl Coin {
    pub fn new(value: Amount, blinding: Scalar) -> Self {
        Self { value, blinding }
    }

    /// Pedersen commitment to this coin
    pub fn commitment(&self) -> RistrettoPoint {
        commitment::commit(self.value, &self.blinding)
    }
}

impl Drop for Coin {
    fn drop(&mut self) {
        self.blinding.zeroize();
    }
}

/// Debug format [Coin] without exposing the blinding factor
impl core::fmt::Debug for Coin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Coin").field("value", &self.value).finish()
    }
}

/// Current unix timestamp in seconds
pub fn timestamp_now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resume_statuses() {
        let mut desc = TxDescription::new(
            TxId::default(),
            100,
            10,
            0,
            WalletId::default(),
            WalletId::default(),
            Vec::new(),
            0,
            true,
        );

        let tests = &[
            (TxStatus::Pending, true),
            (TxStatus::InProgress, true),
            (TxStatus::Registered, true),
            (TxStatus::Cancelled, false),
            (TxStatus::Completed, false),
            (TxStatus::Failed, false),
        ];

        for (status, expected) in tests {
            desc.status = *status;
            assert_eq!(desc.can_resume(), *expected, "can_resume for {status}");
        }
    }
}
