/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::policy::TokenPolicy;
use crate::time::epoch_secs;
use serde::Serialize;
use std::time::{Duration, SystemTime};

/// Claim set of an issued token.
///
/// Serializes to a JSON object with the keys `co`, `exp`, `faExp`, `headers`, `intsig`,
/// `qs`, `reg` and `ssn`, in that order. `intsig` is omitted entirely when the policy bound
/// no attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    // Declaration order is the serialized key order.
    co: bool,
    exp: i64,
    #[serde(rename = "faExp")]
    first_access_exp: i64,
    headers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intsig: Option<String>,
    qs: Vec<String>,
    reg: bool,
    ssn: bool,
}

impl Claims {
    /// Assembles the claims for a token issued at `issued_at` under `policy`.
    ///
    /// `headers` and `qs` carry the full configured name lists, whether or not the viewer
    /// sent those values; the edge re-derives presence when validating.
    pub fn assemble(policy: &TokenPolicy, issued_at: SystemTime, intsig: Option<String>) -> Self {
        Claims {
            co: policy.country_enabled(),
            exp: expires_at(issued_at, policy.expiry()),
            first_access_exp: expires_at(issued_at, policy.first_access_expiry()),
            headers: policy.header_names().to_vec(),
            intsig,
            qs: policy.query_param_names().to_vec(),
            reg: policy.region_enabled(),
            ssn: policy.session_enabled(),
        }
    }

    /// Whether the country is bound (`co`).
    pub fn country_active(&self) -> bool {
        self.co
    }

    /// Whether the region is bound (`reg`).
    pub fn region_active(&self) -> bool {
        self.reg
    }

    /// Whether a session id is bound (`ssn`).
    pub fn session_active(&self) -> bool {
        self.ssn
    }

    /// Bound header names (`headers`).
    pub fn header_names(&self) -> &[String] {
        &self.headers
    }

    /// Bound query parameter names (`qs`).
    pub fn query_param_names(&self) -> &[String] {
        &self.qs
    }

    /// Expiry, in seconds since the UNIX epoch (`exp`).
    pub fn exp(&self) -> i64 {
        self.exp
    }

    /// First-access expiry, in seconds since the UNIX epoch (`faExp`).
    pub fn first_access_exp(&self) -> i64 {
        self.first_access_exp
    }

    /// Integrity signature over the canonical input (`intsig`).
    pub fn intsig(&self) -> Option<&str> {
        self.intsig.as_deref()
    }
}

/// Claim set holding only an expiry, for URLs not bound to any viewer attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ExpiryClaims {
    exp: i64,
}

impl ExpiryClaims {
    pub(crate) fn new(issued_at: SystemTime, expires_in: Duration) -> Self {
        Self {
            exp: expires_at(issued_at, expires_in),
        }
    }
}

fn expires_at(issued_at: SystemTime, window: Duration) -> i64 {
    issued_at
        .checked_add(window)
        .map(epoch_secs)
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::UNIX_EPOCH;

    const ISSUED_AT: u64 = 1_767_290_400;

    fn issued_at() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(ISSUED_AT)
    }

    #[test]
    fn test_claims_without_intsig() {
        let policy = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(Vec::<String>::new())
            .expiry(Duration::from_secs(3600))
            .first_access_expiry(Duration::from_secs(60))
            .build();
        let claims = Claims::assemble(&policy, issued_at(), None);

        assert_eq!(
            serde_json::to_string(&claims).unwrap(),
            r#"{"co":false,"exp":1767294000,"faExp":1767290460,"headers":[],"qs":[],"reg":false,"ssn":false}"#
        );
        assert_eq!(claims.intsig(), None);
    }

    #[test]
    fn test_claims_with_every_field() {
        let policy = TokenPolicy::builder()
            .country_enabled(true)
            .region_enabled(true)
            .header_names(["user-agent", "referer"])
            .query_param_names(["lang"])
            .build();
        let claims = Claims::assemble(&policy, issued_at(), Some("c2ln".to_string()));

        assert_eq!(
            serde_json::to_string(&claims).unwrap(),
            r#"{"co":true,"exp":1767376800,"faExp":1767290700,"headers":["user-agent","referer"],"intsig":"c2ln","qs":["lang"],"reg":true,"ssn":true}"#
        );
        assert!(claims.country_active());
        assert!(claims.region_active());
        assert!(claims.session_active());
    }

    #[test]
    fn test_expiry_uses_sub_second_issuance_time() {
        let policy = TokenPolicy::builder()
            .expiry(Duration::from_millis(500))
            .first_access_expiry(Duration::ZERO)
            .build();
        let claims = Claims::assemble(&policy, issued_at() + Duration::from_millis(700), None);
        assert_eq!(claims.exp(), ISSUED_AT as i64 + 1);
        assert_eq!(claims.first_access_exp(), ISSUED_AT as i64);
    }

    #[test]
    fn test_expiry_only_claims() {
        let claims = ExpiryClaims::new(issued_at(), Duration::from_secs(10));
        assert_eq!(serde_json::to_string(&claims).unwrap(), r#"{"exp":1767290410}"#);
    }
}
