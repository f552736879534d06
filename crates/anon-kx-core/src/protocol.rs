// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use num_bigint::BigUint;

use crate::crypto::{byte_length, parse_uint, to_minimal_bytes};
use crate::types::{
    DecodeError, KxResult, LENGTH_PREFIX_SIZE, MAX_FIELD_LENGTH, MAX_FIELD_LENGTH_BYTES,
};

/// A read position over a byte slice. Every read is bounds-checked and leaves
/// the position untouched on failure.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(LENGTH_PREFIX_SIZE)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads one length-prefixed integer field and returns it together with
    /// the number of bytes consumed (`2 + N`).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the prefix or the magnitude is
    /// cut short, or [`DecodeError::MalformedInteger`] if the magnitude is
    /// rejected by the arithmetic layer.
    pub fn read_uint(&mut self) -> KxResult<(BigUint, usize)> {
        self.read_uint_bounded(MAX_FIELD_LENGTH)
    }

    /// Like [`Cursor::read_uint`], additionally rejecting magnitudes longer
    /// than `max_len` bytes as [`DecodeError::MalformedInteger`].
    pub fn read_uint_bounded(&mut self, max_len: usize) -> KxResult<(BigUint, usize)> {
        let start = self.pos;
        let len = self.read_u16()? as usize;
        let magnitude = match self.take(len) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.pos = start;
                return Err(e.into());
            }
        };
        if len > max_len {
            self.pos = start;
            return Err(DecodeError::MalformedInteger.into());
        }
        match parse_uint(magnitude) {
            Ok(value) => Ok((value, LENGTH_PREFIX_SIZE + len)),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Succeeds only if every byte has been consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Number of bytes [`write_uint`] produces for `value`.
pub fn encoded_len(value: &BigUint) -> usize {
    LENGTH_PREFIX_SIZE + byte_length(value)
}

/// Appends `value` as a length-prefixed field: `u16` big-endian length, then
/// the minimal big-endian magnitude.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedInteger`] if the magnitude does not fit a
/// 16-bit length, or [`crate::types::KxError::Resource`] if `out` cannot grow.
pub fn write_uint(value: &BigUint, out: &mut Vec<u8>) -> KxResult<()> {
    let magnitude = to_minimal_bytes(value);
    if magnitude.len() > MAX_FIELD_LENGTH {
        return Err(DecodeError::MalformedInteger.into());
    }
    out.try_reserve(LENGTH_PREFIX_SIZE + magnitude.len())?;
    out.extend_from_slice(&(magnitude.len() as u16).to_be_bytes());
    out.extend_from_slice(&magnitude);
    Ok(())
}

/// Encodes a single value as a standalone field.
pub fn encode_uint(value: &BigUint) -> KxResult<Vec<u8>> {
    let mut out = Vec::new();
    write_uint(value, &mut out)?;
    Ok(out)
}

/// Decodes a single standalone field, rejecting trailing bytes.
pub fn decode_uint(data: &[u8]) -> KxResult<BigUint> {
    let mut cursor = Cursor::new(data);
    let (value, _) = cursor.read_uint()?;
    cursor.finish()?;
    Ok(value)
}

/// Decoded server key-exchange message: `field(p) ∥ field(g) ∥ field(Ys)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerKx {
    pub prime: BigUint,
    pub generator: BigUint,
    pub public_value: BigUint,
}

/// Decoded client key-exchange message: `field(Yc)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKx {
    pub public_value: BigUint,
}

pub fn parse_server_kx(data: &[u8]) -> KxResult<ServerKx> {
    let mut cursor = Cursor::new(data);
    let (prime, _) = cursor.read_uint_bounded(MAX_FIELD_LENGTH_BYTES)?;
    let (generator, _) = cursor.read_uint_bounded(MAX_FIELD_LENGTH_BYTES)?;
    let (public_value, _) = cursor.read_uint_bounded(MAX_FIELD_LENGTH_BYTES)?;
    cursor.finish()?;
    Ok(ServerKx {
        prime,
        generator,
        public_value,
    })
}

pub fn parse_client_kx(data: &[u8]) -> KxResult<ClientKx> {
    let mut cursor = Cursor::new(data);
    let (public_value, _) = cursor.read_uint_bounded(MAX_FIELD_LENGTH_BYTES)?;
    cursor.finish()?;
    Ok(ClientKx { public_value })
}

/// Encodes the server key-exchange message into a freshly allocated buffer.
///
/// Nothing is returned on failure, so a caller never sees a partial message.
pub fn write_server_kx(
    prime: &BigUint,
    generator: &BigUint,
    public_value: &BigUint,
) -> KxResult<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(encoded_len(prime) + encoded_len(generator) + encoded_len(public_value))?;
    write_uint(prime, &mut out)?;
    write_uint(generator, &mut out)?;
    write_uint(public_value, &mut out)?;
    Ok(out)
}

/// Encodes the client key-exchange message. It carries no group parameters.
pub fn write_client_kx(public_value: &BigUint) -> KxResult<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(encoded_len(public_value))?;
    write_uint(public_value, &mut out)?;
    Ok(out)
}
