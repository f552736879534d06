// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use std::collections::HashMap;
use std::sync::Mutex;

use num_bigint::{BigUint, RandPrime};
use num_traits::{One, Zero};
use zeroize::Zeroize;

use crate::crypto::bit_length;
use crate::types::{ArithmeticError, KxResult, UnsupportedError, MAX_DH_BITS};

/// RFC 2409 Oakley group 1.
const MODP_768: &str = "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A63A3620FFFFFFFFFFFFFFFF";

/// RFC 2409 Oakley group 2.
const MODP_1024: &str = "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF";

/// RFC 3526 group 5.
const MODP_1536: &str = "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";

/// RFC 3526 group 14.
const MODP_2048: &str = "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
    3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

const FIXED_GROUPS: &[(u32, &str)] = &[
    (768, MODP_768),
    (1024, MODP_1024),
    (1536, MODP_1536),
    (2048, MODP_2048),
];

/// Generator shared by every well-known MODP group.
const MODP_GENERATOR: u32 = 2;

/// Smallest prime [`GeneratedGroup`] will produce.
const MIN_GENERATED_BITS: u32 = 16;

/// A Diffie-Hellman group: prime modulus `p` and generator `g`.
///
/// The bit length is always derived from the prime.
#[derive(Clone, PartialEq, Eq)]
pub struct DhParameters {
    prime: BigUint,
    generator: BigUint,
}

impl DhParameters {
    /// Validates and wraps a group.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::InvalidGroup`] unless `p > 3`, `p` is odd and
    /// `1 < g < p - 1`.
    pub fn new(prime: BigUint, generator: BigUint) -> KxResult<Self> {
        let three = BigUint::from(3u32);
        if prime <= three || (&prime % BigUint::from(2u32)).is_zero() {
            return Err(ArithmeticError::InvalidGroup.into());
        }
        let p_minus_one = &prime - BigUint::one();
        if generator <= BigUint::one() || generator >= p_minus_one {
            return Err(ArithmeticError::InvalidGroup.into());
        }
        Ok(Self { prime, generator })
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Number of significant bits in the prime.
    pub fn bit_length(&self) -> u32 {
        bit_length(&self.prime)
    }
}

impl Zeroize for DhParameters {
    fn zeroize(&mut self) {
        self.prime.zeroize();
        self.generator.zeroize();
    }
}

impl std::fmt::Debug for DhParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhParameters")
            .field("bits", &self.bit_length())
            .field("generator", &self.generator)
            .finish()
    }
}

/// Supplies the Diffie-Hellman group for a requested prime size.
///
/// Implementations are shared read-only across handshakes.
pub trait DhParamsProvider: Send + Sync {
    /// Returns a group whose prime has `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedError::UnsupportedBits`] when no such group is available.
    fn get_params(&self, bits: u32) -> KxResult<DhParameters>;
}

/// The well-known MODP groups of RFC 2409 and RFC 3526, generator 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGroups;

impl FixedGroups {
    /// Prime sizes this table can serve.
    pub fn supported_bits() -> impl Iterator<Item = u32> {
        FIXED_GROUPS.iter().map(|(bits, _)| *bits)
    }
}

impl DhParamsProvider for FixedGroups {
    fn get_params(&self, bits: u32) -> KxResult<DhParameters> {
        let (_, hex) = FIXED_GROUPS
            .iter()
            .find(|(size, _)| *size == bits)
            .ok_or(UnsupportedError::UnsupportedBits(bits))?;
        let prime = BigUint::parse_bytes(hex.as_bytes(), 16).ok_or(ArithmeticError::InvalidGroup)?;
        DhParameters::new(prime, BigUint::from(MODP_GENERATOR))
    }
}

/// A single group returned for every request, whatever size is asked for.
#[derive(Debug, Clone)]
pub struct StaticGroup {
    params: DhParameters,
}

impl StaticGroup {
    pub fn new(params: DhParameters) -> Self {
        Self { params }
    }
}

impl DhParamsProvider for StaticGroup {
    fn get_params(&self, _bits: u32) -> KxResult<DhParameters> {
        Ok(self.params.clone())
    }
}

/// Generates a random prime of the requested size (generator 2) on first use
/// and serves it from a cache afterwards.
///
/// Generation is expensive and blocks the caller. The primes are not safe
/// primes; prefer [`FixedGroups`] where interoperability matters.
#[derive(Debug, Default)]
pub struct GeneratedGroup {
    cache: Mutex<HashMap<u32, DhParameters>>,
}

impl GeneratedGroup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DhParamsProvider for GeneratedGroup {
    fn get_params(&self, bits: u32) -> KxResult<DhParameters> {
        if !(MIN_GENERATED_BITS..=MAX_DH_BITS).contains(&bits) {
            return Err(UnsupportedError::UnsupportedBits(bits).into());
        }
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(params) = cache.get(&bits) {
            return Ok(params.clone());
        }

        let mut rng = rand::rngs::OsRng;
        let prime = rng.gen_prime(bits as usize);
        let params = DhParameters::new(prime, BigUint::from(MODP_GENERATOR))?;
        tracing::debug!(bits, "generated Diffie-Hellman group");
        cache.insert(bits, params.clone());
        Ok(params)
    }
}
