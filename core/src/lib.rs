// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tandem confidential wallet negotiation core
//!
//! This provides the [Negotiator][engine::Negotiator] engine driving
//! Mimblewimble-style transactions through an interactive, message-driven
//! negotiation between two parties whose private key material never leaves
//! their own process.
//!
//! Interactions with the engine are performed via
//! [Event][engine::Event]s and the [Gateway][engine::Gateway] capability;
//! see [tandem_wire] for message objects and wire encodings.
//!
//! ## Operations
//!
//! A transfer runs through a fixed sequence of exchanged commitments and
//! signatures:
//!
//! 1. The sender creates a [TxDescription][description::TxDescription] and
//!    calls [start][engine::Negotiator::start] with its coin selection,
//!    emitting an [Invite][tandem_wire::msgs::Invite] carrying its public
//!    excess, declared offset, nonce and commitment sets.
//! 2. The receiver verifies the commitment balance equation, contributes
//!    its own output and excess, partial-signs the kernel and replies with
//!    a confirmation envelope.
//! 3. The sender verifies the peer's signature share, produces its own,
//!    replies with [ConfirmTransaction][tandem_wire::msgs::ConfirmTransaction]
//!    and submits the assembled transaction for registration.
//! 4. Both sides observe the registration outcome and, once the kernel is
//!    confirmed on-chain, reach `Completed`.
//!
//! Negotiations survive process restarts: the engine encodes its sub-state
//! and accumulated values into the description's opaque `fsm_state` blob
//! and [resume][engine::Negotiator::resume] reconstructs a machine that
//! accepts exactly the next expected message.

pub use tandem_wire as wire;

pub mod commitment;

pub mod description;

pub mod engine;

pub mod keys;

pub mod schnorr;
