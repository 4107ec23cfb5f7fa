/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Environment variable access that can be replaced by an in-memory map in tests.

use std::collections::HashMap;
use std::env::VarError;
use std::sync::Arc;

/// Environment variable abstraction
///
/// Construct an environment which delegates to `std::env`:
/// ```ignore
/// let env = Env::real();
/// ```
///
/// Construct a mock environment:
/// ```ignore
/// let env = Env::from_slice(&[("KEY_ID", "key-1")]);
/// ```
#[derive(Clone, Debug)]
pub(crate) struct Env(Arc<Inner>);

impl Env {
    pub(crate) fn get(&self, k: &str) -> Result<String, VarError> {
        match self.0.as_ref() {
            Inner::Real => std::env::var(k),
            Inner::Fake(map) => map.get(k).cloned().ok_or(VarError::NotPresent),
        }
    }

    /// Returns the value of `k`, treating an unset variable as empty.
    pub(crate) fn get_or_empty(&self, k: &str) -> String {
        self.get(k).unwrap_or_default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn from_slice<'a>(vars: &[(&'a str, &'a str)]) -> Self {
        Self(Arc::new(Inner::Fake(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )))
    }

    pub(crate) fn real() -> Self {
        Self(Arc::new(Inner::Real))
    }
}

#[derive(Debug)]
enum Inner {
    Real,
    Fake(HashMap<String, String>),
}
