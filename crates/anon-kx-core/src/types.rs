// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use num_bigint::BigUint;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the big-endian length prefix in front of every integer field.
pub const LENGTH_PREFIX_SIZE: usize = 2;
/// Largest magnitude a single length-prefixed field can carry, in bytes.
pub const MAX_FIELD_LENGTH: usize = u16::MAX as usize;

/// Prime size used by the server when its credentials configure none.
pub const DEFAULT_DH_BITS: u32 = 1024;
/// Smallest prime size accepted in configuration and, by default, from a peer.
pub const MIN_DH_BITS: u32 = 512;
/// Largest prime size accepted in configuration and, by default, from a peer.
pub const MAX_DH_BITS: u32 = 8192;
/// Upper bound on any integer field inside a key-exchange message, in bytes.
pub const MAX_FIELD_LENGTH_BYTES: usize = (MAX_DH_BITS / 8) as usize;

/// Attempts made to draw an ephemeral key pair whose public value is in range.
pub const KEYGEN_MAX_ATTEMPTS: usize = 32;

const _: () = assert!(LENGTH_PREFIX_SIZE == 2);
const _: () = assert!(MIN_DH_BITS <= DEFAULT_DH_BITS && DEFAULT_DH_BITS <= MAX_DH_BITS);
const _: () = assert!(MAX_FIELD_LENGTH_BYTES <= MAX_FIELD_LENGTH);

/// TLS alert descriptions an orchestrator sends when a key-exchange step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertDescription {
    HandshakeFailure = 40,
    IllegalParameter = 47,
    DecodeError = 50,
    InsufficientSecurity = 71,
    InternalError = 80,
}

/// Malformed or adversarial bytes on the wire.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes remain than the length prefix (or the prefix itself) needs.
    #[error("message truncated")]
    Truncated,
    /// A field does not hold an acceptable unsigned integer.
    #[error("malformed integer field")]
    MalformedInteger,
    /// Bytes remain after the last field of the message.
    #[error("{0} trailing bytes after key-exchange message")]
    TrailingBytes(usize),
}

/// A big-integer operation could not produce a usable result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    /// The prime or generator cannot define a Diffie-Hellman group.
    #[error("invalid Diffie-Hellman group")]
    InvalidGroup,
    /// No ephemeral key pair with an in-range public value could be drawn.
    #[error("ephemeral key generation failed")]
    KeyGeneration,
    /// A public value lies outside `[2, p-2]`.
    #[error("public value out of range")]
    PublicValueOutOfRange,
}

/// The caller drove the exchange out of order or against the session's configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// The auth-info slot already belongs to a different mechanism.
    #[error("auth-info slot holds {stored:?}, cannot record {requested:?}")]
    AuthTypeMismatch {
        stored: crate::session::AuthType,
        requested: crate::session::AuthType,
    },
    /// Anonymous auth info is recorded by the key exchange, never set directly.
    #[error("anonymous auth info is recorded only by the key exchange")]
    ReservedAuthInfo,
    /// The step belongs to the other side of the exchange.
    #[error("step not valid for the {0:?} role")]
    WrongRole(crate::session::Role),
    /// The step was invoked while the exchange was in the given phase.
    #[error("step invoked out of order in phase {0:?}")]
    OutOfOrder(crate::session::KxPhase),
    /// The server has no retained ephemeral secret for this session.
    #[error("no ephemeral secret retained for this session")]
    MissingEphemeralSecret,
    /// The client has not stored the server's contribution yet.
    #[error("no peer contribution stored for this session")]
    MissingPeerContribution,
}

/// The requested group size is not available or not acceptable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedError {
    /// The parameter provider has no group of this size.
    #[error("no Diffie-Hellman group of {0} bits")]
    UnsupportedBits(u32),
    /// The peer's prime is smaller than the configured minimum.
    #[error("prime of {bits} bits is below the minimum of {min}")]
    PrimeTooSmall { bits: u32, min: u32 },
    /// The peer's prime is larger than the configured maximum.
    #[error("prime of {bits} bits exceeds the maximum of {max}")]
    PrimeTooLarge { bits: u32, max: u32 },
}

/// Every failure a key-exchange step can report. None of them are recovered internally.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KxError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
    /// Allocation of an output or secret buffer failed.
    #[error("resource allocation failed")]
    Resource,
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("unsupported: {0}")]
    Unsupported(#[from] UnsupportedError),
}

impl KxError {
    /// Maps this failure onto the alert the orchestrator should send to the peer.
    pub fn alert(self) -> AlertDescription {
        match self {
            KxError::Decode(_) => AlertDescription::DecodeError,
            KxError::Arithmetic(ArithmeticError::KeyGeneration) => AlertDescription::InternalError,
            KxError::Arithmetic(_) => AlertDescription::IllegalParameter,
            KxError::Resource | KxError::State(_) => AlertDescription::InternalError,
            KxError::Unsupported(UnsupportedError::UnsupportedBits(_)) => {
                AlertDescription::HandshakeFailure
            }
            KxError::Unsupported(_) => AlertDescription::InsufficientSecurity,
        }
    }

    /// Returns `true` for errors raised by the peer's message rather than local misuse.
    pub fn is_peer_fault(self) -> bool {
        matches!(
            self,
            KxError::Decode(_)
                | KxError::Arithmetic(ArithmeticError::InvalidGroup)
                | KxError::Arithmetic(ArithmeticError::PublicValueOutOfRange)
                | KxError::Unsupported(UnsupportedError::PrimeTooSmall { .. })
                | KxError::Unsupported(UnsupportedError::PrimeTooLarge { .. })
        )
    }
}

impl From<std::collections::TryReserveError> for KxError {
    fn from(_: std::collections::TryReserveError) -> Self {
        KxError::Resource
    }
}

/// Convenience alias for `Result<T, KxError>`.
pub type KxResult<T> = Result<T, KxError>;

/// A heap-allocated byte buffer that is zeroized on drop.
///
/// Holds the premaster secret and any other secret byte string. The `Debug`
/// implementation redacts the contents.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Creates a buffer by copying the given slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self(data.to_vec())
    }

    /// Returns an immutable reference to the underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Deref for SecureBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBytes([REDACTED; {}])", self.0.len())
    }
}

/// A secret big integer (private exponent or shared secret), zeroized on drop.
///
/// Dropping the value is the secure release: every exit path of a step that
/// owns one, `?` returns included, scrubs its limbs.
#[derive(Clone, Default)]
pub struct SecretUint(BigUint);

impl SecretUint {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Borrows the secret value for arithmetic.
    pub fn expose(&self) -> &BigUint {
        &self.0
    }
}

impl Zeroize for SecretUint {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for SecretUint {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for SecretUint {}

impl std::fmt::Debug for SecretUint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretUint([REDACTED])")
    }
}
