/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

/// Attribute values of the viewer a URL is issued for.
///
/// Empty `country`, `region`, and `session_id` mean "not supplied". An empty session id
/// makes the signer generate one when the policy enables sessions. Header and query
/// parameter names are matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerAttributes {
    pub(crate) country: String,
    pub(crate) region: String,
    pub(crate) session_id: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) query_params: HashMap<String, String>,
}

impl ViewerAttributes {
    /// Creates a new builder.
    pub fn builder() -> ViewerAttributesBuilder {
        ViewerAttributesBuilder::default()
    }

    /// Viewer country.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Viewer region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Caller-supplied session id, empty if none.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Value of the header `name`, if the viewer sent it.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Value of the query parameter `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }
}

/// Builder for [`ViewerAttributes`].
#[derive(Debug, Default)]
pub struct ViewerAttributesBuilder {
    inner: ViewerAttributes,
}

impl ViewerAttributesBuilder {
    /// Sets the viewer country.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.inner.country = country.into();
        self
    }

    /// Sets the viewer region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.inner.region = region.into();
        self
    }

    /// Sets the session id to bind instead of generating one.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.inner.session_id = session_id.into();
        self
    }

    /// Adds a header value. An empty value is still a present header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter value.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.query_params.insert(name.into(), value.into());
        self
    }

    /// Builds the viewer attributes.
    pub fn build(self) -> ViewerAttributes {
        self.inner
    }
}
