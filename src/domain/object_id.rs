//! Store-generated document identifiers.
//!
//! An [`ObjectId`] is 12 bytes: a 4-byte big-endian timestamp (seconds since
//! the Unix epoch), a 5-byte value fixed for the lifetime of the process, and
//! a 3-byte big-endian counter. Its text form is 24 hexadecimal characters.
//!
//! Identifiers generated by one process sort in generation order, which the
//! in-memory store relies on to return documents in insertion order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const OBJECT_ID_LENGTH: usize = 12;
const HEX_LENGTH: usize = OBJECT_ID_LENGTH * 2;
const COUNTER_MASK: u32 = 0x00FF_FFFF;
// Seeds stay below 2^20: at least 15_728_640 ids fit before the counter wraps.
const COUNTER_SEED_MASK: u32 = 0x000F_FFFF;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(rand::random);
static COUNTER: LazyLock<AtomicU32> =
    LazyLock::new(|| AtomicU32::new(counter_seed(rand::random::<u32>())));

const fn counter_seed(random: u32) -> u32 {
    random & COUNTER_SEED_MASK
}

// =============================================================================
// ObjectIdError
// =============================================================================

/// Errors produced when parsing an identifier from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// The input is not exactly 24 characters long.
    #[error("invalid identifier length {length} for '{value}', expected 24 hex characters")]
    InvalidLength { value: String, length: usize },

    /// The input contains a non-hexadecimal character.
    #[error("invalid character '{character}' in identifier '{value}'")]
    InvalidCharacter { value: String, character: char },
}

// =============================================================================
// ObjectId
// =============================================================================

/// A 12-byte document identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LENGTH]);

impl ObjectId {
    /// Creates an identifier from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LENGTH] {
        self.0
    }

    /// Generates a fresh identifier.
    ///
    /// **Note**: This is an impure function (side effects: clock, counter).
    #[must_use]
    pub fn generate() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs() as u32);
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Returns the creation time embedded in the identifier, in seconds.
    #[must_use]
    pub const fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Parses a 24-character hexadecimal string.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectIdError`] if the input has the wrong length or
    /// contains a non-hexadecimal character.
    pub fn parse_str(value: &str) -> Result<Self, ObjectIdError> {
        if value.len() != HEX_LENGTH {
            return Err(ObjectIdError::InvalidLength {
                value: value.to_string(),
                length: value.chars().count(),
            });
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        let digits = value.as_bytes();
        for (index, byte) in bytes.iter_mut().enumerate() {
            let high = hex_value(value, digits[index * 2])?;
            let low = hex_value(value, digits[index * 2 + 1])?;
            *byte = (high << 4) | low;
        }
        Ok(Self(bytes))
    }

    /// Returns true if `value` has the shape of an identifier.
    ///
    /// This is the check every by-id route performs before touching the store.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        value.len() == HEX_LENGTH && value.bytes().all(|byte| byte.is_ascii_hexdigit())
    }

    /// Returns the lowercase hexadecimal form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut output = String::with_capacity(HEX_LENGTH);
        for byte in self.0 {
            output.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            output.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
        }
        output
    }
}

fn hex_value(value: &str, digit: u8) -> Result<u8, ObjectIdError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(ObjectIdError::InvalidCharacter {
            value: value.to_string(),
            character: char::from(digit),
        }),
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_str(value)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse_str(&value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
