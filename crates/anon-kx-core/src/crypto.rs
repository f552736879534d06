// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::params::DhParameters;
use crate::types::{
    ArithmeticError, DecodeError, KxResult, SecretUint, SecureBytes, KEYGEN_MAX_ATTEMPTS,
    MAX_FIELD_LENGTH,
};

/// Parses a big-endian unsigned magnitude. An empty slice is zero.
///
/// Leading zero bytes are accepted and ignored.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedInteger`] if `bytes` is longer than a
/// length-prefixed field can describe.
pub fn parse_uint(bytes: &[u8]) -> KxResult<BigUint> {
    if bytes.len() > MAX_FIELD_LENGTH {
        return Err(DecodeError::MalformedInteger.into());
    }
    Ok(BigUint::from_bytes_be(bytes))
}

/// Serializes `value` as a minimal big-endian magnitude: no leading zero byte,
/// and an empty vector for zero.
pub fn to_minimal_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    value.to_bytes_be()
}

/// Returns the minimal byte length of `value`'s magnitude.
pub fn byte_length(value: &BigUint) -> usize {
    (value.bits() + 7) / 8
}

/// Returns the number of significant bits in `value`.
pub fn bit_length(value: &BigUint) -> u32 {
    value.bits() as u32
}

/// Computes `base ^ exponent mod modulus`.
///
/// # Errors
///
/// Returns [`ArithmeticError::InvalidGroup`] if `modulus` is zero or one.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> KxResult<BigUint> {
    if modulus <= &BigUint::one() {
        return Err(ArithmeticError::InvalidGroup.into());
    }
    Ok(base.modpow(exponent, modulus))
}

/// Checks that `public_value` lies in `[2, p-2]`.
///
/// Zero, one and `p-1` confine the shared secret to a subgroup of order at
/// most two, so they are never accepted from a peer.
///
/// # Errors
///
/// Returns [`ArithmeticError::PublicValueOutOfRange`] otherwise.
pub fn validate_public_value(public_value: &BigUint, prime: &BigUint) -> KxResult<()> {
    let two = BigUint::from(2u32);
    if prime <= &two {
        return Err(ArithmeticError::InvalidGroup.into());
    }
    let upper = prime - &two;
    if public_value < &two || public_value > &upper {
        return Err(ArithmeticError::PublicValueOutOfRange.into());
    }
    Ok(())
}

/// A private exponent and its public value, drawn fresh for one handshake.
///
/// The private exponent is scrubbed when the pair is dropped.
#[derive(Debug)]
pub struct EphemeralKeyPair {
    private_exponent: SecretUint,
    public_value: BigUint,
}

impl EphemeralKeyPair {
    /// Draws `x` uniformly from `[2, p-2]` and computes `X = g^x mod p`,
    /// redrawing while `X` falls outside `[2, p-2]`.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::KeyGeneration`] if no acceptable pair is
    /// found within [`KEYGEN_MAX_ATTEMPTS`] draws.
    pub fn generate<R: RngCore + CryptoRng>(params: &DhParameters, rng: &mut R) -> KxResult<Self> {
        let prime = params.prime();
        let low = BigUint::from(2u32);
        let high = prime - BigUint::one();
        if low >= high {
            return Err(ArithmeticError::InvalidGroup.into());
        }

        for _ in 0..KEYGEN_MAX_ATTEMPTS {
            let private_exponent = SecretUint::new(rng.gen_biguint_range(&low, &high));
            let public_value = mod_pow(params.generator(), private_exponent.expose(), prime)?;
            if validate_public_value(&public_value, prime).is_ok() {
                return Ok(Self {
                    private_exponent,
                    public_value,
                });
            }
        }
        Err(ArithmeticError::KeyGeneration.into())
    }

    /// Builds a pair from a caller-chosen exponent.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::KeyGeneration`] if the exponent is zero.
    pub fn from_private_exponent(params: &DhParameters, private_exponent: BigUint) -> KxResult<Self> {
        let private_exponent = SecretUint::new(private_exponent);
        if private_exponent.expose().is_zero() {
            return Err(ArithmeticError::KeyGeneration.into());
        }
        let public_value = mod_pow(params.generator(), private_exponent.expose(), params.prime())?;
        Ok(Self {
            private_exponent,
            public_value,
        })
    }

    pub fn public_value(&self) -> &BigUint {
        &self.public_value
    }

    pub fn private_exponent(&self) -> &SecretUint {
        &self.private_exponent
    }

    /// Splits the pair, handing ownership of the secret half to the caller.
    pub fn into_parts(mut self) -> (SecretUint, BigUint) {
        let private_exponent = std::mem::take(&mut self.private_exponent);
        let public_value = std::mem::take(&mut self.public_value);
        (private_exponent, public_value)
    }
}

impl Zeroize for EphemeralKeyPair {
    fn zeroize(&mut self) {
        self.private_exponent.zeroize();
    }
}

impl Drop for EphemeralKeyPair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for EphemeralKeyPair {}

/// Draws an ephemeral key pair from the operating system RNG.
pub fn generate_keypair(params: &DhParameters) -> KxResult<EphemeralKeyPair> {
    let mut rng = rand::rngs::OsRng;
    EphemeralKeyPair::generate(params, &mut rng)
}

/// Computes the shared secret `peer_public ^ private_exponent mod prime`.
///
/// # Errors
///
/// Returns [`ArithmeticError::InvalidGroup`] if `prime` cannot be a modulus.
pub fn compute_shared_secret(
    peer_public: &BigUint,
    private_exponent: &SecretUint,
    prime: &BigUint,
) -> KxResult<SecretUint> {
    mod_pow(peer_public, private_exponent.expose(), prime).map(SecretUint::new)
}

/// Converts a shared secret into its canonical byte string: the minimal
/// big-endian magnitude, as used for the TLS premaster secret.
///
/// # Errors
///
/// Returns [`crate::types::KxError::Resource`] if the buffer cannot be allocated.
pub fn premaster_bytes(shared_secret: &SecretUint) -> KxResult<SecureBytes> {
    let mut magnitude = to_minimal_bytes(shared_secret.expose());
    let mut out = Vec::new();
    let reserved = out.try_reserve_exact(magnitude.len());
    if let Err(e) = reserved {
        magnitude.zeroize();
        return Err(e.into());
    }
    out.extend_from_slice(&magnitude);
    magnitude.zeroize();
    Ok(SecureBytes::from(out))
}
