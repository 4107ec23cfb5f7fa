/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Builds the input string for the embedded integrity signature (`intsig`).

use crate::policy::TokenPolicy;
use crate::session::IdGenerator;
use crate::viewer::ViewerAttributes;

const SEPARATOR: char = ':';

/// The canonical signing input for one issuance, plus the session id it bound.
///
/// Segments are concatenated in a fixed order, each followed by `:`, and the final
/// separator is stripped:
///
/// 1. country, if the policy enables it
/// 2. region, if the policy enables it
/// 3. session id, if the policy enables it (generated when the viewer supplied none)
/// 4. the value of each policy header the viewer sent, in policy order
/// 5. the value of each policy query parameter present, in policy order
///
/// An enabled attribute with an empty value still contributes an empty segment, while a
/// header or query parameter the viewer did not send contributes nothing. A single empty
/// segment therefore yields an empty string that is still signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalInput {
    value: String,
    segments: usize,
    session_id: Option<String>,
}

impl CanonicalInput {
    /// Builds the canonical input for `viewer` under `policy`.
    pub fn build(
        policy: &TokenPolicy,
        viewer: &ViewerAttributes,
        id_generator: &dyn IdGenerator,
    ) -> Self {
        let mut value = String::new();
        let mut segments = 0;

        if policy.country_enabled() {
            push_segment(&mut value, &mut segments, &viewer.country);
        }
        if policy.region_enabled() {
            push_segment(&mut value, &mut segments, &viewer.region);
        }

        let session_id = if policy.session_enabled() {
            let session_id = if viewer.session_id.is_empty() {
                let generated = id_generator.new_session_id();
                tracing::debug!(session_id = %generated, "generated session id");
                generated
            } else {
                viewer.session_id.clone()
            };
            push_segment(&mut value, &mut segments, &session_id);
            Some(session_id)
        } else {
            None
        };

        for name in policy.header_names() {
            if let Some(header) = viewer.header(name) {
                push_segment(&mut value, &mut segments, header);
            }
        }
        for name in policy.query_param_names() {
            if let Some(param) = viewer.query_param(name) {
                push_segment(&mut value, &mut segments, param);
            }
        }

        // every segment ends with a separator; drop the last one
        if segments > 0 {
            value.pop();
            tracing::debug!(canonical = %value, segments, "built integrity signature input");
        }

        CanonicalInput {
            value,
            segments,
            session_id,
        }
    }

    /// The canonical string. Empty when no attribute contributed a segment, or when the
    /// only segment was an empty value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns true if no attribute contributed a segment.
    ///
    /// This is distinct from an empty [`as_str`](Self::as_str): one empty segment still
    /// has to be signed.
    pub fn is_empty(&self) -> bool {
        self.segments == 0
    }

    /// The session id bound into the input, when the policy enables sessions.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

fn push_segment(out: &mut String, segments: &mut usize, segment: &str) {
    out.push_str(segment);
    out.push(SEPARATOR);
    *segments += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    #[derive(Debug, Default)]
    struct CountingIds(AtomicUsize);

    impl IdGenerator for CountingIds {
        fn new_session_id(&self) -> String {
            format!("ssn{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn no_extras() -> TokenPolicy {
        TokenPolicy::builder()
            .session_enabled(false)
            .header_names(Vec::<String>::new())
            .build()
    }

    #[test]
    fn nothing_enabled_is_empty() {
        let viewer = ViewerAttributes::builder()
            .country("US")
            .header("user-agent", "curl")
            .build();
        let input = CanonicalInput::build(&no_extras(), &viewer, &CountingIds::default());
        assert!(input.is_empty());
        assert_eq!(input.session_id(), None);
    }

    #[test]
    fn enabled_empty_region_keeps_its_segment() {
        let policy = TokenPolicy::builder()
            .country_enabled(true)
            .region_enabled(true)
            .session_enabled(false)
            .header_names(Vec::<String>::new())
            .build();
        let viewer = ViewerAttributes::builder().country("US").region("").build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(input.as_str(), "US:");
    }

    #[test]
    fn fields_follow_fixed_order() {
        let policy = TokenPolicy::builder()
            .country_enabled(true)
            .region_enabled(true)
            .header_names(["user-agent", "referer"])
            .query_param_names(["lang"])
            .build();
        let viewer = ViewerAttributes::builder()
            .query_param("lang", "en")
            .header("referer", "https://example.com/")
            .header("user-agent", "curl/8.0")
            .session_id("abc")
            .region("WA")
            .country("US")
            .build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(
            input.as_str(),
            "US:WA:abc:curl/8.0:https://example.com/:en"
        );
        assert_eq!(input.session_id(), Some("abc"));
    }

    #[test]
    fn lone_empty_country_is_still_bound() {
        let policy = TokenPolicy::builder()
            .country_enabled(true)
            .session_enabled(false)
            .header_names(Vec::<String>::new())
            .build();
        let viewer = ViewerAttributes::builder().country("").build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(input.as_str(), "");
        assert!(!input.is_empty());
    }

    #[test]
    fn lone_empty_header_is_still_bound() {
        let policy = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(["user-agent"])
            .build();
        let viewer = ViewerAttributes::builder().header("user-agent", "").build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(input.as_str(), "");
        assert!(!input.is_empty());
    }

    #[test]
    fn absent_header_contributes_nothing() {
        let policy = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(["user-agent", "referer"])
            .build();
        let viewer = ViewerAttributes::builder()
            .header("referer", "https://example.com/")
            .build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(input.as_str(), "https://example.com/");
    }

    #[test]
    fn present_empty_header_contributes_empty_segment() {
        let policy = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(["user-agent", "referer"])
            .build();
        let viewer = ViewerAttributes::builder()
            .header("user-agent", "")
            .header("referer", "r")
            .build();
        let input = CanonicalInput::build(&policy, &viewer, &CountingIds::default());
        assert_eq!(input.as_str(), ":r");
    }

    #[test]
    fn header_order_follows_policy() {
        let viewer = ViewerAttributes::builder()
            .header("a", "1")
            .header("b", "2")
            .build();
        let ab = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(["a", "b"])
            .build();
        let ba = TokenPolicy::builder()
            .session_enabled(false)
            .header_names(["b", "a"])
            .build();
        let ids = CountingIds::default();
        assert_eq!(CanonicalInput::build(&ab, &viewer, &ids).as_str(), "1:2");
        assert_eq!(CanonicalInput::build(&ba, &viewer, &ids).as_str(), "2:1");
    }

    #[test]
    #[traced_test]
    fn missing_session_id_is_generated() {
        let policy = TokenPolicy::builder()
            .header_names(Vec::<String>::new())
            .build();
        let ids = CountingIds::default();
        let first = CanonicalInput::build(&policy, &ViewerAttributes::default(), &ids);
        let second = CanonicalInput::build(&policy, &ViewerAttributes::default(), &ids);

        assert_eq!(first.as_str(), "ssn0");
        assert_eq!(first.session_id(), Some("ssn0"));
        assert_eq!(second.session_id(), Some("ssn1"));
        assert!(logs_contain("generated session id"));
    }

    #[test]
    fn supplied_session_id_is_not_regenerated() {
        let policy = TokenPolicy::builder()
            .header_names(Vec::<String>::new())
            .build();
        let viewer = ViewerAttributes::builder().session_id("abc").build();
        let ids = CountingIds::default();
        let input = CanonicalInput::build(&policy, &viewer, &ids);
        assert_eq!(input.as_str(), "abc");
        assert_eq!(ids.0.load(Ordering::SeqCst), 0);
    }

    proptest! {
        #[test]
        fn present_headers_join_in_policy_order(
            values in proptest::collection::vec(proptest::option::of("[a-zA-Z0-9/ .-]{0,12}"), 0..8)
        ) {
            let names: Vec<String> = (0..values.len()).map(|i| format!("h{i}")).collect();
            let policy = TokenPolicy::builder()
                .session_enabled(false)
                .header_names(names.clone())
                .build();
            let mut viewer = ViewerAttributes::builder();
            for (name, value) in names.iter().zip(&values) {
                if let Some(value) = value {
                    viewer = viewer.header(name.as_str(), value.as_str());
                }
            }
            let input = CanonicalInput::build(&policy, &viewer.build(), &CountingIds::default());

            let present: Vec<_> = values.iter().flatten().cloned().collect();
            let expected = present.join(":");
            prop_assert_eq!(input.as_str(), expected.as_str());
            prop_assert_eq!(input.is_empty(), present.is_empty());
        }
    }
}
