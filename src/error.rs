//! Custom error types for the driver core.
//!
//! This module defines the primary error type, `SdrError`, for the whole
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to report failures from the property tree, the converter
//! registry, and the configuration layer.
//!
//! None of these errors are retried internally; every variant is surfaced
//! to the caller as a typed failure. Retrying `set()` on a tree path is
//! only safe when all subscribers on that path are idempotent, which is a
//! caller responsibility.

use thiserror::Error;

use crate::convert::{ConverterId, SampleFormat};
use crate::tree::PropPath;

/// Convenience alias for results using the crate error type.
pub type SdrResult<T> = std::result::Result<T, SdrError>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum SdrError {
    /// `create()` was called on an existing path with a different type.
    #[error("property '{path}' already exists with type {existing} (requested {requested})")]
    AlreadyExists {
        /// Path of the conflicting node.
        path: PropPath,
        /// Type the node was created with.
        existing: &'static str,
        /// Type the caller asked for.
        requested: &'static str,
    },

    /// The requested path has no node.
    #[error("property '{path}' not found")]
    NotFound {
        /// The missing path.
        path: PropPath,
    },

    /// Typed access with a declared type that differs from the stored one.
    #[error("property '{path}' holds type {found}, not {expected}")]
    TypeMismatch {
        /// Path of the node.
        path: PropPath,
        /// Type the caller asked for.
        expected: &'static str,
        /// Type actually stored.
        found: &'static str,
    },

    /// `get()` on a node that has neither a value nor a publisher.
    #[error("property '{path}' has not been initialized")]
    NotInitialized {
        /// Path of the node.
        path: PropPath,
    },

    /// A second `publish()` on a node that already has a publisher.
    #[error("property '{path}' already has a publisher")]
    AlreadyPublished {
        /// Path of the node.
        path: PropPath,
    },

    /// A subscriber callback failed during `set()`. Subscribers invoked
    /// before the failing one are not rolled back.
    #[error("hardware write failed for property '{path}'")]
    HardwareWrite {
        /// Path of the node whose subscriber failed.
        path: PropPath,
        /// Underlying callback error.
        #[source]
        source: anyhow::Error,
    },

    /// A publisher callback failed during `get()`.
    #[error("hardware read failed for property '{path}'")]
    HardwareRead {
        /// Path of the node whose publisher failed.
        path: PropPath,
        /// Underlying callback error.
        #[source]
        source: anyhow::Error,
    },

    /// No converter is registered for the requested format pair. Fatal for
    /// the streaming session; the caller must renegotiate the format.
    #[error("no converter registered for {id}")]
    ConverterNotFound {
        /// The requested format pair.
        id: ConverterId,
    },

    /// Two converter registrations share a name. Detected while building
    /// the registry, before any streaming starts.
    #[error("converter name '{name}' registered twice")]
    DuplicateName {
        /// The conflicting converter name.
        name: String,
    },

    /// A sample buffer does not carry the format the converter expects.
    #[error("sample buffer holds {found} data, expected {expected}")]
    BufferFormat {
        /// Format the converter expects.
        expected: SampleFormat,
        /// Format the buffer actually holds.
        found: SampleFormat,
    },

    /// A sample buffer is shorter than the requested sample count.
    #[error("{format} buffer holds {got} samples, conversion needs {needed}")]
    BufferTooShort {
        /// Format of the offending buffer.
        format: SampleFormat,
        /// Samples requested.
        needed: usize,
        /// Samples available.
        got: usize,
    },

    /// An unrecognized sample format name.
    #[error("unknown sample format '{0}'")]
    UnknownFormat(String),

    /// Configuration load or parse failure.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_path() {
        let err = SdrError::NotFound {
            path: PropPath::from("/mboards/0/tick_rate"),
        };
        assert_eq!(err.to_string(), "property '/mboards/0/tick_rate' not found");
    }

    #[test]
    fn hardware_write_preserves_source() {
        let err = SdrError::HardwareWrite {
            path: PropPath::from("/mboards/0/load_eeprom"),
            source: anyhow::anyhow!("usb stall"),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("usb stall"));
    }
}
