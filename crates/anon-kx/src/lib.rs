// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange Mechanism
// Licensed under the MIT License

//! Anonymous ephemeral Diffie-Hellman as a pluggable key-exchange mechanism.
//!
//! The handshake orchestrator looks a step up by negotiated authentication
//! type and step kind, then runs it against the session. The server sends
//! `p ∥ g ∥ Ys`, the client answers with `Yc`, and both sides end with the
//! same premaster secret `g^(xy) mod p` stored on their session. No party is
//! authenticated.

/// Step table and lookup.
mod dispatch;

pub use anon_kx_core::params::{DhParamsProvider, FixedGroups, GeneratedGroup, StaticGroup};
pub use anon_kx_core::session::{AuthType, KxPhase, Role, Session};
pub use anon_kx_core::step::{KeyExchangeStep, StepKind};
pub use anon_kx_core::types::{AlertDescription, KxError, KxResult};
pub use dispatch::{lookup, AnonKxStep, MECHANISM_NAME};
