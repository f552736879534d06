// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use num_bigint::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::params::DhParameters;
use crate::types::{
    KxError, KxResult, SecretUint, SecureBytes, StateError, UnsupportedError, DEFAULT_DH_BITS,
    MAX_DH_BITS, MIN_DH_BITS,
};

/// Which side of the handshake a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Server,
}

/// Key-exchange mechanism negotiated for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    Anon,
    Certificate,
    Srp,
}

/// Progress of the key exchange on one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KxPhase {
    Init,
    /// Server sent its group and public value and retains its exponent.
    ParamsProduced,
    /// Client stored the server's group and public value.
    ParamsConsumed,
    SecretDerived,
    Done,
    Failed,
}

/// Parameters recorded by the anonymous mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonAuthInfo {
    pub dh_bits: u32,
}

/// The session's authentication-info slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthInfo {
    Anon(AnonAuthInfo),
    Certificate,
    Srp,
}

impl AuthInfo {
    pub fn auth_type(&self) -> AuthType {
        match self {
            AuthInfo::Anon(_) => AuthType::Anon,
            AuthInfo::Certificate => AuthType::Certificate,
            AuthInfo::Srp => AuthType::Srp,
        }
    }
}

/// Server-side anonymous credentials: the prime size to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonServerCredentials {
    dh_bits: u32,
}

impl AnonServerCredentials {
    /// # Errors
    ///
    /// Returns [`UnsupportedError::UnsupportedBits`] outside
    /// `MIN_DH_BITS..=MAX_DH_BITS`.
    pub fn new(dh_bits: u32) -> KxResult<Self> {
        if !(MIN_DH_BITS..=MAX_DH_BITS).contains(&dh_bits) {
            return Err(UnsupportedError::UnsupportedBits(dh_bits).into());
        }
        Ok(Self { dh_bits })
    }

    pub fn dh_bits(&self) -> u32 {
        self.dh_bits
    }
}

impl Default for AnonServerCredentials {
    fn default() -> Self {
        Self {
            dh_bits: DEFAULT_DH_BITS,
        }
    }
}

/// Client-side anonymous credentials: the prime sizes it will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonClientCredentials {
    pub min_prime_bits: u32,
    pub max_prime_bits: u32,
}

impl AnonClientCredentials {
    /// Checks a server prime size against this window.
    pub fn check_prime_bits(&self, bits: u32) -> KxResult<()> {
        if bits < self.min_prime_bits {
            return Err(UnsupportedError::PrimeTooSmall {
                bits,
                min: self.min_prime_bits,
            }
            .into());
        }
        if bits > self.max_prime_bits {
            return Err(UnsupportedError::PrimeTooLarge {
                bits,
                max: self.max_prime_bits,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for AnonClientCredentials {
    fn default() -> Self {
        Self {
            min_prime_bits: MIN_DH_BITS,
            max_prime_bits: MAX_DH_BITS,
        }
    }
}

/// What the client learned from the server key-exchange message.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServerContribution {
    pub params: DhParameters,
    pub public_value: BigUint,
}

impl std::fmt::Debug for ServerContribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContribution")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What the server keeps between sending its message and receiving the client's.
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct ServerEphemeral {
    pub params: DhParameters,
    pub private_exponent: SecretUint,
}

/// Per-connection handshake state consumed by the key-exchange steps.
///
/// Holds the negotiated mechanism, the credentials, the auth-info slot, the
/// peer contribution or retained exponent, and the derived premaster secret.
#[derive(Debug)]
pub struct Session {
    role: Role,
    negotiated: AuthType,
    phase: KxPhase,
    server_credentials: Option<AnonServerCredentials>,
    client_credentials: AnonClientCredentials,
    auth_info: Option<AuthInfo>,
    peer_contribution: Option<ServerContribution>,
    server_ephemeral: Option<ServerEphemeral>,
    premaster_secret: Option<SecureBytes>,
}

impl Session {
    /// A session that negotiated the anonymous mechanism.
    pub fn new(role: Role) -> Self {
        Self::with_auth_type(role, AuthType::Anon)
    }

    pub fn with_auth_type(role: Role, negotiated: AuthType) -> Self {
        Self {
            role,
            negotiated,
            phase: KxPhase::Init,
            server_credentials: None,
            client_credentials: AnonClientCredentials::default(),
            auth_info: None,
            peer_contribution: None,
            server_ephemeral: None,
            premaster_secret: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn negotiated_auth_type(&self) -> AuthType {
        self.negotiated
    }

    pub fn phase(&self) -> KxPhase {
        self.phase
    }

    fn advance(&mut self, from: &[KxPhase], to: KxPhase) -> KxResult<()> {
        if !from.contains(&self.phase) {
            return Err(StateError::OutOfOrder(self.phase).into());
        }
        self.phase = to;
        Ok(())
    }

    /// Marks the exchange as failed and drops every secret the session holds.
    pub fn fail(&mut self) {
        self.phase = KxPhase::Failed;
        self.peer_contribution = None;
        self.server_ephemeral = None;
        self.premaster_secret = None;
    }

    /// Fails with [`StateError::WrongRole`] unless the session plays `role`.
    pub fn require_role(&self, role: Role) -> KxResult<()> {
        if self.role != role {
            return Err(StateError::WrongRole(self.role).into());
        }
        Ok(())
    }

    /// Fails with [`StateError::OutOfOrder`] unless the session is in `phase`.
    pub fn require_phase(&self, phase: KxPhase) -> KxResult<()> {
        if self.phase != phase {
            return Err(StateError::OutOfOrder(self.phase).into());
        }
        Ok(())
    }

    pub fn set_server_credentials(&mut self, credentials: AnonServerCredentials) {
        self.server_credentials = Some(credentials);
    }

    pub fn set_client_credentials(&mut self, credentials: AnonClientCredentials) {
        self.client_credentials = credentials;
    }

    pub fn client_credentials(&self) -> &AnonClientCredentials {
        &self.client_credentials
    }

    /// Prime size the server offers: the configured value, or [`DEFAULT_DH_BITS`].
    pub fn configured_dh_bits(&self) -> u32 {
        self.server_credentials
            .map(|c| c.dh_bits())
            .unwrap_or(DEFAULT_DH_BITS)
    }

    pub fn auth_info(&self) -> Option<&AuthInfo> {
        self.auth_info.as_ref()
    }

    /// Populates the auth-info slot.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::AuthTypeMismatch`] if the slot already holds a
    /// different auth type, and [`StateError::ReservedAuthInfo`] for anonymous
    /// auth info, which only the key exchange records. A value of the same
    /// type replaces the old one.
    pub fn set_auth_info(&mut self, info: AuthInfo) -> KxResult<()> {
        if info.auth_type() == AuthType::Anon {
            return Err(StateError::ReservedAuthInfo.into());
        }
        self.store_auth_info(info)
    }

    fn store_auth_info(&mut self, info: AuthInfo) -> KxResult<()> {
        if let Some(stored) = &self.auth_info {
            if stored.auth_type() != info.auth_type() {
                return Err(StateError::AuthTypeMismatch {
                    stored: stored.auth_type(),
                    requested: info.auth_type(),
                }
                .into());
            }
        }
        self.auth_info = Some(info);
        Ok(())
    }

    /// Stores the server's group and public value and moves a fresh session to
    /// [`KxPhase::ParamsConsumed`].
    pub fn set_peer_contribution(&mut self, contribution: ServerContribution) -> KxResult<()> {
        self.advance(&[KxPhase::Init], KxPhase::ParamsConsumed)?;
        self.peer_contribution = Some(contribution);
        Ok(())
    }

    pub fn peer_contribution(&self) -> Option<&ServerContribution> {
        self.peer_contribution.as_ref()
    }

    /// Moves the peer contribution out; it is released when the caller drops it.
    pub fn take_peer_contribution(&mut self) -> KxResult<ServerContribution> {
        self.peer_contribution
            .take()
            .ok_or_else(|| StateError::MissingPeerContribution.into())
    }

    /// Retains the server's exponent and moves a fresh session to
    /// [`KxPhase::ParamsProduced`].
    pub fn set_server_ephemeral(&mut self, ephemeral: ServerEphemeral) -> KxResult<()> {
        self.advance(&[KxPhase::Init], KxPhase::ParamsProduced)?;
        self.server_ephemeral = Some(ephemeral);
        Ok(())
    }

    pub fn has_server_ephemeral(&self) -> bool {
        self.server_ephemeral.is_some()
    }

    /// Moves the retained exponent out; it is released when the caller drops it.
    pub fn take_server_ephemeral(&mut self) -> KxResult<ServerEphemeral> {
        self.server_ephemeral
            .take()
            .ok_or_else(|| StateError::MissingEphemeralSecret.into())
    }

    /// Hands the canonical shared-secret bytes to master-secret derivation.
    ///
    /// The session keeps the premaster secret until the record layer takes it
    /// with [`Session::take_premaster_secret`].
    pub fn derive_master_secret(&mut self, premaster: SecureBytes) -> KxResult<()> {
        self.advance(&[KxPhase::SecretDerived], KxPhase::Done)?;
        self.premaster_secret = Some(premaster);
        Ok(())
    }

    /// Records that the shared secret exists and the inputs it came from are gone.
    pub fn mark_secret_derived(&mut self) -> KxResult<()> {
        self.advance(
            &[KxPhase::ParamsProduced, KxPhase::ParamsConsumed],
            KxPhase::SecretDerived,
        )
    }

    pub fn premaster_secret(&self) -> Option<&SecureBytes> {
        self.premaster_secret.as_ref()
    }

    pub fn take_premaster_secret(&mut self) -> Option<SecureBytes> {
        self.premaster_secret.take()
    }
}

/// Negotiated Diffie-Hellman prime size, once the anonymous exchange recorded one.
pub fn get_dh_bits(session: &Session) -> Option<u32> {
    match session.auth_info() {
        Some(AuthInfo::Anon(info)) => Some(info.dh_bits),
        _ => None,
    }
}

/// Records the bit length of `params`' prime in the anonymous auth-info slot,
/// creating it on first use. Called by the role engines only.
///
/// # Errors
///
/// Returns [`StateError::AuthTypeMismatch`] if the session negotiated another
/// mechanism or the slot belongs to one.
#[doc(hidden)]
pub fn record_anon_dh_bits(session: &mut Session, params: &DhParameters) -> KxResult<()> {
    if session.negotiated_auth_type() != AuthType::Anon {
        return Err(KxError::State(StateError::AuthTypeMismatch {
            stored: session.negotiated_auth_type(),
            requested: AuthType::Anon,
        }));
    }
    session.store_auth_info(AuthInfo::Anon(AnonAuthInfo {
        dh_bits: params.bit_length(),
    }))
}
