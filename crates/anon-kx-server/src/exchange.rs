// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use anon_kx_core::crypto::{self, EphemeralKeyPair};
use anon_kx_core::params::{DhParameters, DhParamsProvider};
use anon_kx_core::protocol;
use anon_kx_core::session::{record_anon_dh_bits, KxPhase, Role, ServerEphemeral, Session};
use anon_kx_core::step::{finish_step, StepKind};
use anon_kx_core::types::KxResult;
use zeroize::Zeroizing;

/// Generates the server key-exchange message `p ∥ g ∥ Ys`.
///
/// Requests a group of the configured size from `provider` (the default size
/// when the session has no server credentials), records its bit length in the
/// session's auth-info slot, draws a fresh ephemeral key pair and retains the
/// private exponent for [`process_client_kx`].
///
/// # Errors
///
/// Returns a state error if the session is not a fresh server session or its
/// auth-info slot belongs to another mechanism, an unsupported error if the
/// provider has no group of the requested size, and an arithmetic error if
/// key generation fails.
pub fn generate_server_kx(
    session: &mut Session,
    provider: &dyn DhParamsProvider,
) -> KxResult<Vec<u8>> {
    generate_server_kx_with_keypair(session, provider, crypto::generate_keypair)
}

/// [`generate_server_kx`] with a caller-supplied key-pair source.
pub fn generate_server_kx_with_keypair<F>(
    session: &mut Session,
    provider: &dyn DhParamsProvider,
    keygen: F,
) -> KxResult<Vec<u8>>
where
    F: FnOnce(&DhParameters) -> KxResult<EphemeralKeyPair>,
{
    let result = produce_server_kx(session, provider, keygen);
    finish_step(session, StepKind::GenerateServer, result)
}

fn produce_server_kx<F>(
    session: &mut Session,
    provider: &dyn DhParamsProvider,
    keygen: F,
) -> KxResult<Vec<u8>>
where
    F: FnOnce(&DhParameters) -> KxResult<EphemeralKeyPair>,
{
    session.require_role(Role::Server)?;
    session.require_phase(KxPhase::Init)?;

    let bits = session.configured_dh_bits();
    let params = provider.get_params(bits)?;
    record_anon_dh_bits(session, &params)?;
    tracing::debug!(requested = bits, dh_bits = params.bit_length(), "server group selected");

    let keypair = keygen(&params)?;
    let message =
        protocol::write_server_kx(params.prime(), params.generator(), keypair.public_value())?;

    let (private_exponent, _) = keypair.into_parts();
    session.set_server_ephemeral(ServerEphemeral {
        params,
        private_exponent,
    })?;
    Ok(message)
}

/// Processes the client key-exchange message `Yc` and derives the premaster
/// secret `Yc ^ x mod p` from the exponent retained by [`generate_server_kx`].
///
/// The retained exponent, the group and the client value are released before
/// this function returns, whatever the outcome.
///
/// # Errors
///
/// Returns [`StateError::OutOfOrder`] if no server message was generated on
/// this session or the exchange already failed, a decode error for a
/// malformed message, and an arithmetic error if the client value is outside
/// `[2, p-2]`.
///
/// [`StateError::OutOfOrder`]: anon_kx_core::types::StateError::OutOfOrder
pub fn process_client_kx(session: &mut Session, data: &[u8]) -> KxResult<()> {
    let result = consume_client_kx(session, data);
    finish_step(session, StepKind::ProcessClient, result)
}

fn consume_client_kx(session: &mut Session, data: &[u8]) -> KxResult<()> {
    session.require_role(Role::Server)?;
    session.require_phase(KxPhase::ParamsProduced)?;

    let ephemeral = session.take_server_ephemeral()?;
    let client_public = Zeroizing::new(protocol::parse_client_kx(data)?.public_value);
    crypto::validate_public_value(&client_public, ephemeral.params.prime())?;

    let shared_secret = crypto::compute_shared_secret(
        &client_public,
        &ephemeral.private_exponent,
        ephemeral.params.prime(),
    )?;
    drop(ephemeral);
    drop(client_public);
    session.mark_secret_derived()?;

    let premaster = crypto::premaster_bytes(&shared_secret)?;
    drop(shared_secret);
    session.derive_master_secret(premaster)
}
