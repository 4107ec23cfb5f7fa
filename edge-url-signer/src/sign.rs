/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::canonical::CanonicalInput;
use crate::claims::{Claims, ExpiryClaims};
use crate::destination::Destination;
use crate::error::SigningError;
use crate::key::{KeyRing, SigningKey};
use crate::policy::TokenPolicy;
use crate::session::{IdGenerator, SharedIdGenerator};
use crate::signer::{encode_token, SharedSigner, Signer};
use crate::time::{SharedTimeSource, TimeSource};
use crate::viewer::ViewerAttributes;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Issues signed URLs and tokens.
///
/// A `UrlSigner` holds no per-request state; one instance can be shared between threads
/// and used for any number of issuances.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    keys: KeyRing,
    signer: SharedSigner,
    id_generator: SharedIdGenerator,
    time_source: SharedTimeSource,
}

impl UrlSigner {
    /// Creates a new builder for constructing a signer.
    pub fn builder() -> UrlSignerBuilder {
        UrlSignerBuilder::default()
    }

    /// Signs a URL for `destination` that binds the attributes of `viewer` selected by
    /// `policy`, using the key `key_id`.
    ///
    /// When the policy enables sessions the URL has the form
    /// `scheme://host/{session_id}.{token}{path}`, otherwise `scheme://host/{token}{path}`.
    pub fn sign_url(
        &self,
        destination: &Destination,
        key_id: &str,
        policy: &TokenPolicy,
        viewer: &ViewerAttributes,
    ) -> Result<SignedUrl, SigningError> {
        let key = self.keys.resolve(key_id)?;

        let canonical = CanonicalInput::build(policy, viewer, &self.id_generator);
        let intsig = if canonical.is_empty() {
            None
        } else {
            Some(self.signer.sign(canonical.as_str().as_bytes(), key)?)
        };

        let claims = Claims::assemble(policy, self.time_source.now(), intsig);
        let token = self.encode(key_id, key, &claims)?;
        let session_id = canonical
            .session_id()
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        let url = destination.compose(&token, session_id.as_deref());

        tracing::trace!(
            key_id,
            session = session_id.is_some(),
            intsig = claims.intsig().is_some(),
            exp = claims.exp(),
            "issued signed URL"
        );
        Ok(SignedUrl::new(url, token, session_id))
    }

    /// Signs a URL for `destination` carrying caller-provided `claims`, in the session-less
    /// form `scheme://host/{token}{path}`.
    pub fn sign_url_with_claims<C>(
        &self,
        destination: &Destination,
        key_id: &str,
        claims: &C,
    ) -> Result<SignedUrl, SigningError>
    where
        C: Serialize + ?Sized,
    {
        let token = self.sign_token(key_id, claims)?;
        let url = destination.compose(&token, None);
        Ok(SignedUrl::new(url, token, None))
    }

    /// Signs a URL for `destination` whose only claim is an expiry `expires_in` from now.
    pub fn sign_expiring_url(
        &self,
        destination: &Destination,
        key_id: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl, SigningError> {
        let claims = ExpiryClaims::new(self.time_source.now(), expires_in);
        self.sign_url_with_claims(destination, key_id, &claims)
    }

    /// Signs `claims` with the key `key_id`, returning the compact token.
    pub fn sign_token<C>(&self, key_id: &str, claims: &C) -> Result<String, SigningError>
    where
        C: Serialize + ?Sized,
    {
        let key = self.keys.resolve(key_id)?;
        self.encode(key_id, key, claims)
    }

    fn encode<C>(&self, key_id: &str, key: &SigningKey, claims: &C) -> Result<String, SigningError>
    where
        C: Serialize + ?Sized,
    {
        encode_token(&self.signer, key_id, key, claims)
    }
}

/// Builder for [`UrlSigner`].
#[derive(Default, Debug)]
pub struct UrlSignerBuilder {
    keys: Option<KeyRing>,
    extra_keys: Vec<(String, SigningKey)>,
    signer: Option<SharedSigner>,
    id_generator: Option<SharedIdGenerator>,
    time_source: Option<SharedTimeSource>,
}

impl UrlSignerBuilder {
    /// Sets the key ring, replacing any previously set ring.
    pub fn keys(mut self, keys: KeyRing) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Adds a single key on top of the key ring.
    pub fn key(mut self, key_id: impl Into<String>, key: impl Into<SigningKey>) -> Self {
        self.extra_keys.push((key_id.into(), key.into()));
        self
    }

    /// Sets the signing primitive. Defaults to HMAC-SHA256.
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(SharedSigner::new(signer));
        self
    }

    /// Sets the session id generator. Defaults to time-ordered UUIDs.
    pub fn id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Some(SharedIdGenerator::new(id_generator));
        self
    }

    /// Sets the time source used as issuance time. Defaults to the system clock.
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = Some(SharedTimeSource::new(time_source));
        self
    }

    /// Builds the signer.
    pub fn build(self) -> Result<UrlSigner, SigningError> {
        let mut keys = KeyRing::builder();
        if let Some(ring) = self.keys {
            for (key_id, key) in ring.into_entries() {
                keys = keys.key(key_id, key);
            }
        }
        for (key_id, key) in self.extra_keys {
            keys = keys.key(key_id, key);
        }
        let keys = keys.build();
        if keys.is_empty() {
            return Err(SigningError::invalid_input(
                "at least one signing key is required (use keys or key)",
            ));
        }

        Ok(UrlSigner {
            keys,
            signer: self.signer.unwrap_or_default(),
            id_generator: self.id_generator.unwrap_or_default(),
            time_source: self.time_source.unwrap_or_default(),
        })
    }
}

/// A signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
    token: String,
    session_id: Option<String>,
}

impl SignedUrl {
    pub(crate) fn new(url: String, token: String, session_id: Option<String>) -> Self {
        Self {
            url,
            token,
            session_id,
        }
    }

    /// Returns the complete signed URL as a string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the signed token embedded in the URL.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the session id embedded in the URL, if any.
    ///
    /// This is the generated id when the policy enabled sessions and the viewer supplied
    /// none.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Consumes the signed URL, returning the URL string.
    pub fn into_url(self) -> String {
        self.url
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
