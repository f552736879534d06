// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange Server
// Licensed under the MIT License

//! Server role of anonymous ephemeral Diffie-Hellman.
//!
//! The server picks a group of its configured size, sends `p ∥ g ∥ Ys` and
//! keeps its private exponent until the client's `Yc` arrives, at which point
//! it derives the premaster secret and releases every secret it held.

/// Server key-exchange generation and client key-exchange processing.
mod exchange;

pub use exchange::{generate_server_kx, generate_server_kx_with_keypair, process_client_kx};
