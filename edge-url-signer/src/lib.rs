/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

#![cfg_attr(docsrs, feature(doc_cfg))]
//! Signed, time-limited edge access URLs bound to viewer attributes.
//!
//! A [`TokenPolicy`] selects which [`ViewerAttributes`] (country, region, session id,
//! request headers, query parameters) are bound into a token. The selected values are
//! concatenated into a [`CanonicalInput`] whose HMAC is embedded in the token's
//! [`Claims`] as `intsig`, the claims are signed as a compact token, and the token is
//! placed in the first path segment of the [`Destination`] URL.
//!
//! ```no_run
//! use edge_url_signer::{Destination, TokenPolicy, UrlSigner, ViewerAttributes};
//!
//! # fn main() -> Result<(), edge_url_signer::error::SigningError> {
//! let signer = UrlSigner::builder().key("key-1", "secret").build()?;
//! let policy = TokenPolicy::builder().country_enabled(true).build();
//! let viewer = ViewerAttributes::builder()
//!     .country("US")
//!     .header("user-agent", "curl/8.0")
//!     .build();
//! let destination = Destination::parse("https://cdn.example.com/video.mp4")?;
//!
//! let signed = signer.sign_url(&destination, "key-1", &policy, &viewer)?;
//! println!("{signed}");
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

/// Error types for signing operations.
pub mod error;
pub mod session;
pub mod signer;
pub mod time;

mod canonical;
mod claims;
mod destination;
mod key;
mod policy;
mod sign;
mod viewer;

pub use canonical::CanonicalInput;
pub use claims::Claims;
pub use destination::Destination;
pub use key::{KeyRing, KeyRingBuilder, SigningKey};
pub use policy::{TokenPolicy, TokenPolicyBuilder};
pub use sign::{SignedUrl, UrlSigner, UrlSignerBuilder};
pub use viewer::{ViewerAttributes, ViewerAttributesBuilder};

/// Sign a URL with a single key, using the default signer, session id generator, and
/// system clock.
pub fn sign_url(
    destination: &Destination,
    key_id: &str,
    key: impl Into<SigningKey>,
    policy: &TokenPolicy,
    viewer: &ViewerAttributes,
) -> Result<SignedUrl, error::SigningError> {
    UrlSigner::builder()
        .key(key_id, key)
        .build()?
        .sign_url(destination, key_id, policy, viewer)
}
