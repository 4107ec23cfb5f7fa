/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Load issuance settings from environment variables, with command line overrides.

use crate::env::Env;
use crate::Args;
use edge_url_signer::error::SigningError;
use edge_url_signer::{Destination, SigningKey, TokenPolicy, ViewerAttributes};
use std::time::Duration;

const ENV_VAR_URL: &str = "URL";
const ENV_VAR_KEY: &str = "KEY";
const ENV_VAR_KEY_ID: &str = "KEY_ID";
const ENV_VAR_EXPIRY: &str = "EXP";
const ENV_VAR_FIRST_ACCESS_EXPIRY: &str = "FIRST_EXP";
const ENV_VAR_COUNTRY: &str = "CO";
const ENV_VAR_REGION: &str = "REG";
const ENV_VAR_NO_SESSION: &str = "NO_SSN";
const ENV_VAR_SESSION_ID: &str = "SSN";
const ENV_VAR_USER_AGENT: &str = "UA";
const ENV_VAR_REFERER: &str = "REF";
const ENV_VAR_QUERY_PARAMS: &str = "QS";

const DEFAULT_EXPIRY: &str = "24h";
const DEFAULT_FIRST_ACCESS_EXPIRY: &str = "5m";

const HEADER_USER_AGENT: &str = "user-agent";
const HEADER_REFERER: &str = "referer";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("`{var}` is required (set the environment variable or pass `--{flag}`)")]
    Missing {
        var: &'static str,
        flag: &'static str,
    },
    #[error("invalid duration `{value}` for `{var}`")]
    InvalidDuration {
        var: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid boolean `{value}` for `{var}` (expected true, false, 1, or 0)")]
    InvalidBool { var: &'static str, value: String },
    #[error("invalid query parameter `{value}` (expected NAME=VALUE)")]
    InvalidQueryParam { value: String },
    #[error("invalid destination URL")]
    InvalidUrl(#[source] SigningError),
}

/// Everything needed to issue one signed URL.
#[derive(Debug)]
pub(crate) struct Config {
    destination: Destination,
    key: SigningKey,
    key_id: String,
    expiry: Duration,
    first_access_expiry: Duration,
    country: String,
    region: String,
    no_session: bool,
    session_id: String,
    user_agent: String,
    referer: String,
    query_params: Vec<(String, String)>,
}

impl Config {
    /// Reads settings from `env`; values given in `args` take precedence.
    pub(crate) fn load(env: &Env, args: &Args) -> Result<Self, ConfigError> {
        let url = required(env, ENV_VAR_URL, "url", args.url.as_deref())?;
        let destination = Destination::parse(&url).map_err(ConfigError::InvalidUrl)?;
        let key = required(env, ENV_VAR_KEY, "key", args.key.as_deref())?;
        let key_id = required(env, ENV_VAR_KEY_ID, "key-id", args.key_id.as_deref())?;

        let expiry = duration(
            env,
            ENV_VAR_EXPIRY,
            args.expires_in.as_deref(),
            DEFAULT_EXPIRY,
        )?;
        let first_access_expiry = duration(
            env,
            ENV_VAR_FIRST_ACCESS_EXPIRY,
            args.first_access_expires_in.as_deref(),
            DEFAULT_FIRST_ACCESS_EXPIRY,
        )?;

        let no_session = args.no_session || boolean(env, ENV_VAR_NO_SESSION)?;

        let query_params = if args.query.is_empty() {
            env.get_or_empty(ENV_VAR_QUERY_PARAMS)
                .split(',')
                .filter(|pair| !pair.is_empty())
                .map(query_param)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            args.query
                .iter()
                .map(|pair| query_param(pair))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Config {
            destination,
            key: SigningKey::from(key),
            key_id,
            expiry,
            first_access_expiry,
            country: optional(env, ENV_VAR_COUNTRY, args.country.as_deref()),
            region: optional(env, ENV_VAR_REGION, args.region.as_deref()),
            no_session,
            session_id: optional(env, ENV_VAR_SESSION_ID, args.session_id.as_deref()),
            user_agent: optional(env, ENV_VAR_USER_AGENT, args.user_agent.as_deref()),
            referer: optional(env, ENV_VAR_REFERER, args.referer.as_deref()),
            query_params,
        })
    }

    pub(crate) fn destination(&self) -> &Destination {
        &self.destination
    }

    pub(crate) fn key(&self) -> &SigningKey {
        &self.key
    }

    pub(crate) fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Derives the policy from which attribute values were supplied.
    ///
    /// Country and region are bound when non-empty, the session unless disabled, and the
    /// `user-agent` and `referer` headers (in that order) when their values are non-empty.
    pub(crate) fn policy(&self) -> TokenPolicy {
        let mut header_names = Vec::new();
        if !self.user_agent.is_empty() {
            header_names.push(HEADER_USER_AGENT);
        }
        if !self.referer.is_empty() {
            header_names.push(HEADER_REFERER);
        }

        TokenPolicy::builder()
            .country_enabled(!self.country.is_empty())
            .region_enabled(!self.region.is_empty())
            .session_enabled(!self.no_session)
            .expiry(self.expiry)
            .first_access_expiry(self.first_access_expiry)
            .header_names(header_names)
            .query_param_names(self.query_params.iter().map(|(name, _)| name.as_str()))
            .build()
    }

    pub(crate) fn viewer(&self) -> ViewerAttributes {
        let mut viewer = ViewerAttributes::builder()
            .country(self.country.as_str())
            .region(self.region.as_str())
            .session_id(self.session_id.as_str())
            .header(HEADER_USER_AGENT, self.user_agent.as_str())
            .header(HEADER_REFERER, self.referer.as_str());
        for (name, value) in &self.query_params {
            viewer = viewer.query_param(name.as_str(), value.as_str());
        }
        viewer.build()
    }
}

fn required(
    env: &Env,
    var: &'static str,
    flag: &'static str,
    arg: Option<&str>,
) -> Result<String, ConfigError> {
    let value = optional(env, var, arg);
    if value.is_empty() {
        return Err(ConfigError::Missing { var, flag });
    }
    Ok(value)
}

fn optional(env: &Env, var: &'static str, arg: Option<&str>) -> String {
    match arg {
        Some(value) => value.to_string(),
        None => env.get_or_empty(var),
    }
}

fn duration(
    env: &Env,
    var: &'static str,
    arg: Option<&str>,
    default: &str,
) -> Result<Duration, ConfigError> {
    let value = match optional(env, var, arg) {
        value if value.is_empty() => default.to_string(),
        value => value,
    };
    humantime::parse_duration(&value).map_err(|source| ConfigError::InvalidDuration {
        var,
        value,
        source,
    })
}

fn boolean(env: &Env, var: &'static str) -> Result<bool, ConfigError> {
    let value = env.get_or_empty(var);
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "0" => Ok(false),
        "true" | "1" => Ok(true),
        _ => {
            tracing::warn!(var, value = %value, "rejecting invalid boolean setting");
            Err(ConfigError::InvalidBool { var, value })
        }
    }
}

fn query_param(pair: &str) -> Result<(String, String), ConfigError> {
    match pair.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(ConfigError::InvalidQueryParam {
            value: pair.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_env<'a>(extra: &[(&'a str, &'a str)]) -> Env {
        let mut vars = vec![
            (ENV_VAR_URL, "https://cdn.example.com/video.mp4"),
            (ENV_VAR_KEY, "secret"),
            (ENV_VAR_KEY_ID, "key-1"),
        ];
        vars.extend_from_slice(extra);
        Env::from_slice(&vars)
    }

    #[test]
    fn defaults() {
        let config = Config::load(&base_env(&[]), &Args::default()).unwrap();
        assert_eq!(
            config.destination(),
            &Destination::new("https", "cdn.example.com", "/video.mp4")
        );
        assert_eq!(config.key_id(), "key-1");
        assert_eq!(config.key(), &SigningKey::from("secret"));

        let policy = config.policy();
        assert!(!policy.country_enabled());
        assert!(!policy.region_enabled());
        assert!(policy.session_enabled());
        assert_eq!(policy.expiry(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(policy.first_access_expiry(), Duration::from_secs(5 * 60));
        assert!(policy.header_names().is_empty());
        assert!(policy.query_param_names().is_empty());
    }

    #[test]
    fn supplied_values_enable_attributes() {
        let env = base_env(&[
            (ENV_VAR_COUNTRY, "US"),
            (ENV_VAR_REGION, "WA"),
            (ENV_VAR_REFERER, "https://example.com/"),
            (ENV_VAR_EXPIRY, "1h30m"),
            (ENV_VAR_FIRST_ACCESS_EXPIRY, "90s"),
            (ENV_VAR_QUERY_PARAMS, "lang=en,quality=hd"),
        ]);
        let config = Config::load(&env, &Args::default()).unwrap();

        let policy = config.policy();
        assert!(policy.country_enabled());
        assert!(policy.region_enabled());
        assert_eq!(policy.header_names(), ["referer"]);
        assert_eq!(policy.query_param_names(), ["lang", "quality"]);
        assert_eq!(policy.expiry(), Duration::from_secs(90 * 60));
        assert_eq!(policy.first_access_expiry(), Duration::from_secs(90));

        let viewer = config.viewer();
        assert_eq!(viewer.country(), "US");
        assert_eq!(viewer.header("referer"), Some("https://example.com/"));
        assert_eq!(viewer.query_param("quality"), Some("hd"));
    }

    #[test]
    fn user_agent_precedes_referer() {
        let env = base_env(&[
            (ENV_VAR_REFERER, "https://example.com/"),
            (ENV_VAR_USER_AGENT, "curl/8.0"),
        ]);
        let config = Config::load(&env, &Args::default()).unwrap();
        assert_eq!(config.policy().header_names(), ["user-agent", "referer"]);
    }

    #[test]
    fn no_session_disables_session() {
        let env = base_env(&[(ENV_VAR_NO_SESSION, "TRUE")]);
        let config = Config::load(&env, &Args::default()).unwrap();
        assert!(!config.policy().session_enabled());

        let args = Args {
            no_session: true,
            ..Args::default()
        };
        let config = Config::load(&base_env(&[]), &args).unwrap();
        assert!(!config.policy().session_enabled());
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            url: Some("http://localhost:8080/live.m3u8".to_string()),
            key_id: Some("key-2".to_string()),
            country: Some("DE".to_string()),
            session_id: Some("abc".to_string()),
            query: vec!["lang=de".to_string()],
            ..Args::default()
        };
        let env = base_env(&[(ENV_VAR_COUNTRY, "US"), (ENV_VAR_QUERY_PARAMS, "lang=en")]);
        let config = Config::load(&env, &args).unwrap();

        assert_eq!(config.destination().host(), "localhost:8080");
        assert_eq!(config.key_id(), "key-2");
        let viewer = config.viewer();
        assert_eq!(viewer.country(), "DE");
        assert_eq!(viewer.session_id(), "abc");
        assert_eq!(viewer.query_param("lang"), Some("de"));
    }

    #[test]
    fn missing_required_value() {
        let env = Env::from_slice(&[(ENV_VAR_URL, "https://cdn.example.com/")]);
        let err = Config::load(&env, &Args::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var: "KEY", .. }));
        assert_eq!(
            err.to_string(),
            "`KEY` is required (set the environment variable or pass `--key`)"
        );
    }

    #[test]
    fn invalid_values() {
        let err = Config::load(&base_env(&[(ENV_VAR_EXPIRY, "tomorrow")]), &Args::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { var: "EXP", .. }));

        let err = Config::load(&base_env(&[(ENV_VAR_NO_SESSION, "maybe")]), &Args::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));

        let err = Config::load(&base_env(&[(ENV_VAR_QUERY_PARAMS, "lang")]), &Args::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidQueryParam { .. }));

        let err = Config::load(&base_env(&[(ENV_VAR_URL, "/video.mp4")]), &Args::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }
}
