// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

//! Core library for anonymous ephemeral Diffie-Hellman key exchange in TLS.
//!
//! Client and server agree on a premaster secret without certificates: the
//! server sends a group and its public value, the client answers with its own
//! public value, and both compute `peer_public ^ own_private mod p`.
//!
//! # Crate layout
//!
//! * [`types`] -- constants, error taxonomy, and zeroizing secret containers.
//! * [`crypto`] -- big-integer arithmetic: parsing, modular exponentiation, key pairs.
//! * [`params`] -- Diffie-Hellman groups and the parameter providers.
//! * [`protocol`] -- the length-prefixed integer field and the two message shapes.
//! * [`session`] -- per-handshake session state, credentials, and the auth-info slot.
//! * [`step`] -- the capability every per-role key-exchange operation implements.

/// Big-integer arithmetic for Diffie-Hellman.
pub mod crypto;
/// Diffie-Hellman groups and parameter providers.
pub mod params;
/// Wire-format encoding and parsing for key-exchange messages.
pub mod protocol;
/// Session state, credentials, and auth-info recording.
pub mod session;
/// The per-role key-exchange step capability.
pub mod step;
/// Shared constants, error types, and secure containers.
pub mod types;
