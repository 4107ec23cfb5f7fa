/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_FIRST_ACCESS_EXPIRY: Duration = Duration::from_secs(5 * 60);
const DEFAULT_HEADER_NAMES: [&str; 2] = ["user-agent", "referer"];

/// Declares which viewer attributes are bound into a token, and for how long it is valid.
///
/// A policy is immutable once built. Use [`TokenPolicy::builder`] to construct one, or
/// [`TokenPolicy::default`] for the default policy: session binding on, `user-agent` and
/// `referer` headers bound, valid for 24 hours with a 5 minute first-access window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    country_enabled: bool,
    region_enabled: bool,
    session_enabled: bool,
    expiry: Duration,
    first_access_expiry: Duration,
    header_names: Vec<String>,
    query_param_names: Vec<String>,
}

impl TokenPolicy {
    /// Creates a new builder. Unset fields take the default policy's values.
    pub fn builder() -> TokenPolicyBuilder {
        TokenPolicyBuilder::default()
    }

    /// Whether the viewer's country is bound into the token.
    pub fn country_enabled(&self) -> bool {
        self.country_enabled
    }

    /// Whether the viewer's region is bound into the token.
    pub fn region_enabled(&self) -> bool {
        self.region_enabled
    }

    /// Whether a session identifier is bound into the token and the URL.
    pub fn session_enabled(&self) -> bool {
        self.session_enabled
    }

    /// Validity window, measured from issuance.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// First-access validity window, measured from issuance.
    pub fn first_access_expiry(&self) -> Duration {
        self.first_access_expiry
    }

    /// Header names, in signing order.
    pub fn header_names(&self) -> &[String] {
        &self.header_names
    }

    /// Query parameter names, in signing order.
    pub fn query_param_names(&self) -> &[String] {
        &self.query_param_names
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        TokenPolicyBuilder::default().build()
    }
}

/// Builder for [`TokenPolicy`].
#[derive(Debug, Default, Clone)]
pub struct TokenPolicyBuilder {
    country_enabled: Option<bool>,
    region_enabled: Option<bool>,
    session_enabled: Option<bool>,
    expiry: Option<Duration>,
    first_access_expiry: Option<Duration>,
    header_names: Option<Vec<String>>,
    query_param_names: Option<Vec<String>>,
}

impl TokenPolicyBuilder {
    /// Binds the viewer's country into the token. Defaults to `false`.
    pub fn country_enabled(mut self, enabled: bool) -> Self {
        self.country_enabled = Some(enabled);
        self
    }

    /// Binds the viewer's region into the token. Defaults to `false`.
    pub fn region_enabled(mut self, enabled: bool) -> Self {
        self.region_enabled = Some(enabled);
        self
    }

    /// Binds a session identifier into the token and URL. Defaults to `true`.
    pub fn session_enabled(mut self, enabled: bool) -> Self {
        self.session_enabled = Some(enabled);
        self
    }

    /// Sets the validity window. Defaults to 24 hours.
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the first-access validity window. Defaults to 5 minutes.
    pub fn first_access_expiry(mut self, expiry: Duration) -> Self {
        self.first_access_expiry = Some(expiry);
        self
    }

    /// Sets the bound header names, replacing the default `user-agent` and `referer`.
    ///
    /// Order matters: it is the order of the names in the token and of the header values
    /// in the integrity signature.
    pub fn header_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the bound query parameter names. Defaults to none.
    pub fn query_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_param_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the policy.
    pub fn build(self) -> TokenPolicy {
        TokenPolicy {
            country_enabled: self.country_enabled.unwrap_or(false),
            region_enabled: self.region_enabled.unwrap_or(false),
            session_enabled: self.session_enabled.unwrap_or(true),
            expiry: self.expiry.unwrap_or(DEFAULT_EXPIRY),
            first_access_expiry: self
                .first_access_expiry
                .unwrap_or(DEFAULT_FIRST_ACCESS_EXPIRY),
            header_names: self.header_names.unwrap_or_else(|| {
                DEFAULT_HEADER_NAMES
                    .iter()
                    .map(|name| name.to_string())
                    .collect()
            }),
            query_param_names: self.query_param_names.unwrap_or_default(),
        }
    }
}
