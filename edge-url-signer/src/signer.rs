/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Signing primitive and compact token encoding.

use crate::error::SigningError;
use crate::key::SigningKey;
use hmac::{digest::FixedOutput, Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::fmt::Debug;
use std::sync::Arc;

const TOKEN_TYPE: &str = "JWT";
const HS256: &str = "HS256";

/// Produces a signature over a message with a shared key.
pub trait Signer: Debug + Send + Sync {
    /// Name of the signing algorithm, as written to the token header (`alg`).
    fn algorithm(&self) -> &'static str;

    /// Signs `message` with `key`, returning the unpadded base64url encoded signature.
    fn sign(&self, message: &[u8], key: &SigningKey) -> Result<String, SigningError>;
}

/// HMAC-SHA256 signer.
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct Hs256Signer;

impl Hs256Signer {
    /// Creates a new `Hs256Signer`.
    pub fn new() -> Self {
        Hs256Signer
    }
}

impl Signer for Hs256Signer {
    fn algorithm(&self) -> &'static str {
        HS256
    }

    fn sign(&self, message: &[u8], key: &SigningKey) -> Result<String, SigningError> {
        if key.is_empty() {
            return Err(SigningError::invalid_key("signing key is empty"));
        }
        let mut mac =
            Hmac::<Sha256>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
        mac.update(message);
        Ok(base64_simd::URL_SAFE_NO_PAD.encode_to_string(mac.finalize_fixed().as_slice()))
    }
}

/// Signer that can be shared across threads
#[derive(Debug, Clone)]
pub struct SharedSigner(Arc<dyn Signer>);

impl SharedSigner {
    /// Creates a new shared signer
    pub fn new(signer: impl Signer + 'static) -> Self {
        Self(Arc::new(signer))
    }
}

impl Default for SharedSigner {
    fn default() -> Self {
        Self::new(Hs256Signer)
    }
}

impl Signer for SharedSigner {
    fn algorithm(&self) -> &'static str {
        self.0.algorithm()
    }

    fn sign(&self, message: &[u8], key: &SigningKey) -> Result<String, SigningError> {
        self.0.sign(message, key)
    }
}

// Field order is the serialized key order.
#[derive(Serialize)]
struct TokenHeader<'a> {
    alg: &'a str,
    kid: &'a str,
    typ: &'a str,
}

/// Encodes `claims` as a compact signed token: `header.payload.signature`.
pub(crate) fn encode_token<C>(
    signer: &dyn Signer,
    key_id: &str,
    key: &SigningKey,
    claims: &C,
) -> Result<String, SigningError>
where
    C: Serialize + ?Sized,
{
    let header = serde_json::to_vec(&TokenHeader {
        alg: signer.algorithm(),
        kid: key_id,
        typ: TOKEN_TYPE,
    })
    .map_err(SigningError::serialization)?;
    let payload = serde_json::to_vec(claims).map_err(SigningError::serialization)?;

    let mut token = base64_simd::URL_SAFE_NO_PAD.encode_to_string(&header);
    token.push('.');
    token.push_str(&base64_simd::URL_SAFE_NO_PAD.encode_to_string(&payload));

    let signature = signer.sign(token.as_bytes(), key)?;
    token.push('.');
    token.push_str(&signature);
    Ok(token)
}
