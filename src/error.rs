//! Error taxonomy for the sound-change core.
//!
//! Only the fatal conditions of the design (`ParseError`, `UnknownSystem`,
//! `EmitError`) are represented here. `UnknownGrapheme` and `UnknownFeature`
//! are non-fatal by design and are carried through as documented (empty
//! `FeatureSet`, verbatim feature insertion) rather than surfaced as errors.

use thiserror::Error;

/// Errors raised by rule parsing, sequence parsing, and rule application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A rule or sequence string could not be parsed.
    #[error("cannot parse rule {source:?}: {reason}")]
    Parse {
        /// The original source text.
        source: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A feature-system name was not found in the registry.
    #[error("unknown feature system {name:?}")]
    UnknownSystem {
        /// The requested system name.
        name: String,
    },

    /// `post` (forward) contained a token illegal at emission time.
    #[error("rule cannot be applied forward: {reason}")]
    Emit {
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl Error {
    pub(crate) fn parse(source: impl Into<String>, reason: impl Into<String>) -> Error {
        Error::Parse {
            source: source.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn emit(reason: impl Into<String>) -> Error {
        Error::Emit {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
