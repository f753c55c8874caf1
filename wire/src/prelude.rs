// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude containing common types for messaging

pub use crate::{
    msgs::{
        ConfirmInvitation, ConfirmTransaction, Invite, SetTxParameter, TxFailed, TxRegistered,
        TxType, MAX_PARAMS,
    },
    params::{id_is_public, ParameterStore, TxParameterID, PRIVATE_PARAMS_FROM},
    tx::{Input, Output, Signature, Transaction, TxKernel},
    types::{Amount, Height, PrintableAmount, Timestamp, TxId, WalletId, COIN},
    Error as WireError, Message, MsgId, WIRE_VERSION,
};
