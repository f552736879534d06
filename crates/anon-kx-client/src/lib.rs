// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange Client
// Licensed under the MIT License

//! Client role of anonymous ephemeral Diffie-Hellman.
//!
//! The client accepts the server's group and public value, answers with its
//! own public value and derives the premaster secret in the same step.

/// Server key-exchange processing and client key-exchange generation.
mod exchange;

pub use exchange::{generate_client_kx, generate_client_kx_with_keypair, process_server_kx};
