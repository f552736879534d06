// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use anon_kx_core::crypto::{self, EphemeralKeyPair};
use anon_kx_core::params::DhParameters;
use anon_kx_core::protocol::{self, ServerKx};
use anon_kx_core::session::{record_anon_dh_bits, KxPhase, Role, ServerContribution, Session};
use anon_kx_core::step::{finish_step, StepKind};
use anon_kx_core::types::KxResult;

/// Processes the server key-exchange message `p ∥ g ∥ Ys`.
///
/// Validates the group and the server's public value, checks the prime size
/// against the session's client credentials, stores the contribution for
/// [`generate_client_kx`] and records the prime size in the auth-info slot.
/// Nothing is authenticated: this is the anonymous mechanism.
///
/// # Errors
///
/// Returns a decode error for a truncated or malformed message, an arithmetic
/// error for an unusable group or an out-of-range public value, an
/// unsupported error for a prime outside the accepted window, and a state
/// error if the session is not a fresh client session.
pub fn process_server_kx(session: &mut Session, data: &[u8]) -> KxResult<()> {
    let result = consume_server_kx(session, data);
    finish_step(session, StepKind::ProcessServer, result)
}

fn consume_server_kx(session: &mut Session, data: &[u8]) -> KxResult<()> {
    session.require_role(Role::Client)?;
    session.require_phase(KxPhase::Init)?;

    let ServerKx {
        prime,
        generator,
        public_value,
    } = protocol::parse_server_kx(data)?;

    let params = DhParameters::new(prime, generator)?;
    let dh_bits = params.bit_length();
    session.client_credentials().check_prime_bits(dh_bits)?;
    crypto::validate_public_value(&public_value, params.prime())?;

    record_anon_dh_bits(session, &params)?;
    tracing::debug!(dh_bits, "server group accepted");
    session.set_peer_contribution(ServerContribution {
        params,
        public_value,
    })
}

/// Generates the client key-exchange message `Yc` and derives the premaster
/// secret `Ys ^ y mod p`.
///
/// The message carries only the client's public value; the group is the one
/// the server sent. The private exponent, the server value and the group are
/// released as soon as the shared secret is computed, and the shared secret
/// once its bytes reach the session.
///
/// # Errors
///
/// Returns a state error if [`process_server_kx`] has not succeeded on this
/// session, an arithmetic error if the stored server value is outside
/// `[2, p-2]` or key generation fails, and an unsupported error if the stored
/// group is outside the client's accepted prime sizes.
pub fn generate_client_kx(session: &mut Session) -> KxResult<Vec<u8>> {
    generate_client_kx_with_keypair(session, crypto::generate_keypair)
}

/// [`generate_client_kx`] with a caller-supplied key-pair source.
pub fn generate_client_kx_with_keypair<F>(session: &mut Session, keygen: F) -> KxResult<Vec<u8>>
where
    F: FnOnce(&DhParameters) -> KxResult<EphemeralKeyPair>,
{
    let result = produce_client_kx(session, keygen);
    finish_step(session, StepKind::GenerateClient, result)
}

fn produce_client_kx<F>(session: &mut Session, keygen: F) -> KxResult<Vec<u8>>
where
    F: FnOnce(&DhParameters) -> KxResult<EphemeralKeyPair>,
{
    session.require_role(Role::Client)?;
    session.require_phase(KxPhase::ParamsConsumed)?;

    let contribution = session.take_peer_contribution()?;
    let prime = contribution.params.prime();
    session
        .client_credentials()
        .check_prime_bits(contribution.params.bit_length())?;
    crypto::validate_public_value(&contribution.public_value, prime)?;

    let keypair = keygen(&contribution.params)?;
    let shared_secret = crypto::compute_shared_secret(
        &contribution.public_value,
        keypair.private_exponent(),
        prime,
    )?;

    let message = protocol::write_client_kx(keypair.public_value())?;
    drop(keypair);
    drop(contribution);
    session.mark_secret_derived()?;

    let premaster = crypto::premaster_bytes(&shared_secret)?;
    drop(shared_secret);
    session.derive_master_secret(premaster)?;
    Ok(message)
}
