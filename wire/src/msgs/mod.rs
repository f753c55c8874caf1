// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Negotiation message objects and wire encodings
//!
//! The fixed-field messages ([Invite], [ConfirmInvitation],
//! [ConfirmTransaction], [TxRegistered], [TxFailed]) use strict positional
//! encoding; a length mismatch is a hard decode failure. [SetTxParameter]
//! carries a length-prefixed field list and tolerates unknown public
//! parameter ids for forward compatibility.

mod invite;
pub use invite::Invite;

mod confirm;
pub use confirm::{ConfirmInvitation, ConfirmTransaction};

mod registered;
pub use registered::{TxFailed, TxRegistered};

mod set_param;
pub use set_param::{SetTxParameter, TxType, MAX_PARAMS};
