/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{ErrorKind, SigningError};
use std::fmt;
use std::str::FromStr;

/// The URL a signed URL grants access to, split into the parts the signed URL reuses.
///
/// Components are used verbatim: the path is appended after the token as given, so it
/// should be empty or start with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    scheme: String,
    host: String,
    path: String,
}

impl Destination {
    /// Creates a destination from its components.
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Parses an absolute URL such as `https://cdn.example.com/video.mp4`.
    ///
    /// The host keeps its port, the query string is dropped, and a URL without a path
    /// yields an empty path.
    ///
    /// The path is kept exactly as written, percent-encoding included: `/a%20b` is
    /// composed as `/a%20b`, not decoded to `/a b`. Use [`Destination::new`] to supply an
    /// already decoded path.
    pub fn parse(url: &str) -> Result<Self, SigningError> {
        let uri = url.parse::<http::Uri>().map_err(|err| {
            SigningError::new(
                ErrorKind::InvalidInput,
                Some(err.into()),
                Some(format!("`{url}` is not a valid URL").into()),
            )
        })?;
        let scheme = uri.scheme_str().ok_or_else(|| {
            SigningError::invalid_input(format!("destination URL `{url}` has no scheme"))
        })?;
        let authority = uri.authority().ok_or_else(|| {
            SigningError::invalid_input(format!("destination URL `{url}` has no host"))
        })?;
        let host = authority
            .as_str()
            .rsplit('@')
            .next()
            .unwrap_or_default();

        // `http::Uri` reports a missing path as `/`.
        let rest = &url[scheme.len() + "://".len()..];
        let has_path = rest
            .find(|c: char| matches!(c, '/' | '?' | '#'))
            .map_or(false, |idx| rest[idx..].starts_with('/'));
        let path = if has_path { uri.path() } else { "" };

        Ok(Self::new(scheme, host, path))
    }

    /// URL scheme, such as `https`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host, including the port when one was given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path, empty or starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Composes the signed URL for `token`.
    ///
    /// With a session id: `scheme://host/{session_id}.{token}{path}`, otherwise
    /// `scheme://host/{token}{path}`.
    pub(crate) fn compose(&self, token: &str, session_id: Option<&str>) -> String {
        match session_id.filter(|id| !id.is_empty()) {
            Some(session_id) => format!(
                "{}://{}/{}.{}{}",
                self.scheme, self.host, session_id, token, self.path
            ),
            None => format!("{}://{}/{}{}", self.scheme, self.host, token, self.path),
        }
    }
}

impl FromStr for Destination {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Destination::parse(s)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}
