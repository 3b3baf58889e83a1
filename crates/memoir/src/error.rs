// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for memoization.

use std::borrow::Cow;

/// A specialized [`Result`] type for memoizers whose computations cannot fail on their own.
pub type Result<T> = std::result::Result<T, Error>;

/// The computation produced no value for the requested key.
///
/// Nothing is stored when this happens, so the next call for the same key runs the
/// computation again.
///
/// Memoizers built over a caller's own error type require that type to implement
/// `From<ComputedNull>`; conversions into [`Error`] and [`std::io::Error`] are provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("computation produced no value")]
pub struct ComputedNull;

/// An error originating in the memoization engine itself.
///
/// Failures raised by a wrapped computation are never converted into this type; they reach
/// the caller as the computation's own error value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required collaborator (computation, key function or store) was not supplied when
    /// the memoizer was built.
    #[error("memoizer is misconfigured: {0}")]
    Configuration(Cow<'static, str>),

    /// The computation produced no value.
    #[error(transparent)]
    ComputedNull(#[from] ComputedNull),
}

impl Error {
    pub(crate) fn missing(collaborator: &'static str) -> Self {
        Self::Configuration(Cow::Owned(format!("no {collaborator} was supplied")))
    }

    /// Returns `true` if this error reports a computation that produced no value.
    #[must_use]
    pub fn is_computed_null(&self) -> bool {
        matches!(self, Self::ComputedNull(_))
    }

    /// Returns `true` if this error reports a missing collaborator at build time.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<ComputedNull> for std::io::Error {
    fn from(error: ComputedNull) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, error)
    }
}
