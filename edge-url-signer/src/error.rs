/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    InvalidKey,
    InvalidInput,
    Serialization,
    SigningFailure,
}

/// Error returned when a signed URL, token, or integrity signature could not be produced.
#[derive(Debug)]
pub struct SigningError {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
    message: Option<Cow<'static, str>>,
}

impl SigningError {
    pub(crate) fn new(
        kind: ErrorKind,
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            source,
            message,
        }
    }

    pub(crate) fn invalid_key(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidKey, None, Some(message.into()))
    }

    pub(crate) fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, None, Some(message.into()))
    }

    pub(crate) fn serialization(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::Serialization, Some(source.into()), None)
    }

    /// Creates an error for a [`Signer`](crate::signer::Signer) that could not produce a
    /// signature. `source` is reported through [`Error::source`](StdError::source).
    pub fn signing_failure(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::SigningFailure, Some(source.into()), None)
    }

    /// Returns true if the key was empty, unknown, or otherwise unusable.
    pub fn is_invalid_key(&self) -> bool {
        self.kind == ErrorKind::InvalidKey
    }

    /// Returns true if a caller-supplied input (such as a destination URL) was rejected.
    pub fn is_invalid_input(&self) -> bool {
        self.kind == ErrorKind::InvalidInput
    }

    /// Returns true if the claim set could not be serialized.
    pub fn is_serialization(&self) -> bool {
        self.kind == ErrorKind::Serialization
    }

    /// Returns true if the signer failed to produce a signature.
    pub fn is_signing_failure(&self) -> bool {
        self.kind == ErrorKind::SigningFailure
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::InvalidKey => write!(f, "invalid signing key")?,
            ErrorKind::InvalidInput => write!(f, "invalid input")?,
            ErrorKind::Serialization => write!(f, "failed to serialize claims")?,
            ErrorKind::SigningFailure => write!(f, "signing operation failed")?,
        }
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl StdError for SigningError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}
