//! Serializer configuration.

use std::error::Error;
use std::fmt;

/// Tunables for one serializer session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Whether [`collect_garbage`](crate::Serializer::collect_garbage)
    /// actually collects.
    ///
    /// Default: `false`. Collection is always explicit; this only arms it.
    pub gc_enabled: bool,

    /// Re-check every link against its field's declared class during Save.
    ///
    /// Default: `true`. A mismatching link is written as null and reported
    /// as [`ErrorKind::WrongObjectType`](hdm_core::ErrorKind::WrongObjectType).
    pub verify_kinds_on_save: bool,

    /// Capacity of the buffered reader/writer used by the path-based
    /// [`save`](crate::Serializer::save) and
    /// [`restore`](crate::Serializer::restore).
    ///
    /// Default: 64 KiB. Must be non-zero.
    pub buffer_capacity: usize,
}

impl SerializerConfig {
    /// Default I/O buffer capacity in bytes.
    pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

    /// Check the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroBufferCapacity);
        }
        Ok(())
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            gc_enabled: false,
            verify_kinds_on_save: true,
            buffer_capacity: Self::DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Errors detected by [`SerializerConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `buffer_capacity` is zero.
    ZeroBufferCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBufferCapacity => write!(f, "buffer capacity must be non-zero"),
        }
    }
}

impl Error for ConfigError {}
