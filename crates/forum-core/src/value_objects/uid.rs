//! UID - sequential numeric user identifier
//!
//! UIDs come from a single durable counter in the store (`global.nextUid`), so the first
//! account ever created receives `1` and values only grow. A UID whose creation failed
//! after allocation is never handed out again.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sequential user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(u64);

/// UID of the first account created on a fresh store
pub const BOOTSTRAP_UID: Uid = Uid(1);

impl Uid {
    /// Create a UID from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Check whether this is the bootstrap account
    #[inline]
    pub const fn is_bootstrap(&self) -> bool {
        self.0 == BOOTSTRAP_UID.0
    }

    /// Build a UID from a counter value returned by the store.
    ///
    /// Counters are signed in Redis; anything below 1 means the counter was tampered with.
    pub fn from_counter(value: i64) -> Result<Self, UidParseError> {
        u64::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .map(Uid)
            .ok_or(UidParseError::OutOfRange(value))
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, UidParseError> {
        s.trim()
            .parse::<u64>()
            .map(Uid)
            .map_err(|_| UidParseError::InvalidFormat)
    }
}

/// Error when parsing a UID
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UidParseError {
    #[error("invalid uid format")]
    InvalidFormat,

    #[error("uid counter out of range: {0}")]
    OutOfRange(i64),
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Uid {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Uid> for u64 {
    fn from(id: Uid) -> Self {
        id.0
    }
}

impl std::str::FromStr for Uid {
    type Err = UidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uid::parse(s)
    }
}

impl Serialize for Uid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

// Accept both `7` and `"7"`; store hashes hand UIDs back as strings
impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct UidVisitor;

        impl Visitor<'_> for UidVisitor {
            type Value = Uid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer or numeric string uid")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Uid, E>
            where
                E: de::Error,
            {
                Ok(Uid(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Uid, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Uid)
                    .map_err(|_| de::Error::custom("uid must not be negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Uid, E>
            where
                E: de::Error,
            {
                Uid::parse(value).map_err(|_| de::Error::custom("invalid uid string"))
            }
        }

        deserializer.deserialize_any(UidVisitor)
    }
}
