/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::SigningError;
use std::collections::HashMap;
use std::fmt;

/// Shared secret used to sign tokens and integrity signatures.
///
/// The secret is never printed; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    /// Creates a key from raw secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Returns true if the secret has no bytes.
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl From<&str> for SigningKey {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }
}

impl From<String> for SigningKey {
    fn from(secret: String) -> Self {
        Self::new(secret.into_bytes())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"** redacted **")
            .finish()
    }
}

/// Set of signing keys addressed by key identifier.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: HashMap<String, SigningKey>,
}

impl KeyRing {
    /// Creates a new builder for a key ring.
    pub fn builder() -> KeyRingBuilder {
        KeyRingBuilder::default()
    }

    /// Creates a key ring holding exactly one key.
    pub fn single(key_id: impl Into<String>, key: impl Into<SigningKey>) -> Self {
        Self::builder().key(key_id, key).build()
    }

    /// Returns the number of keys in the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the ring holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, SigningKey)> {
        self.keys.into_iter()
    }

    /// Looks up the key for `key_id`, rejecting unknown ids and empty secrets.
    pub(crate) fn resolve(&self, key_id: &str) -> Result<&SigningKey, SigningError> {
        let key = self
            .keys
            .get(key_id)
            .ok_or_else(|| SigningError::invalid_key(format!("no key with id `{key_id}`")))?;
        if key.is_empty() {
            return Err(SigningError::invalid_key(format!(
                "key with id `{key_id}` is empty"
            )));
        }
        Ok(key)
    }
}

/// Builder for [`KeyRing`].
#[derive(Debug, Default)]
pub struct KeyRingBuilder {
    keys: HashMap<String, SigningKey>,
}

impl KeyRingBuilder {
    /// Adds a key. A later key with the same id replaces the earlier one.
    pub fn key(mut self, key_id: impl Into<String>, key: impl Into<SigningKey>) -> Self {
        self.keys.insert(key_id.into(), key.into());
        self
    }

    /// Builds the key ring.
    pub fn build(self) -> KeyRing {
        KeyRing { keys: self.keys }
    }
}
