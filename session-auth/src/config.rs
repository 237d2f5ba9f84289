use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use session_model::{JweAlgorithm, JwsAlgorithm, SessionAlgorithm};
use tap::prelude::*;
use uuid::Uuid;

const DEFAULT_EXPIRATION: Duration = Duration::from_secs(8 * 3600);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 3600);
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Source of truth for process configuration, deserialized from a JSON file; mirrors it as
/// closely as possible rather than trying to be clever. Every field is optional so a minimal
/// file still resolves to sane defaults in [`Config::from_conf_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfFile {
    pub id: Option<Uuid>,
    pub hostname: Option<String>,
    /// Postgres connection string. Absent means run against the in-memory store (dev/test only).
    pub database_url: Option<String>,
    /// `BROWSER_ALGORITHM`/`SERVICE_ALGORITHM`: `OPAQUE`, a `JwsAlgorithm` tag (`RS256`, ...),
    /// or a `JweAlgorithm` tag (`dir+A256GCM`, `A256GCMKW+A256GCM`).
    pub browser_algorithm: Option<String>,
    pub service_algorithm: Option<String>,
    #[serde(default, with = "humantime_serde::option")]
    pub browser_expiration: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub service_expiration: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub idle_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    pub cleanup_interval: Option<Duration>,
    pub verbosity_profile: Option<String>,
}

impl ConfFile {
    pub fn generate_new() -> Self {
        Self {
            id: Some(Uuid::now_v7()),
            hostname: None,
            database_url: None,
            browser_algorithm: Some("OPAQUE".to_owned()),
            service_algorithm: Some("RS256".to_owned()),
            browser_expiration: None,
            service_expiration: None,
            idle_timeout: None,
            cleanup_interval: None,
            verbosity_profile: Some("info".to_owned()),
        }
    }
}

/// Resolved configuration: every default has already been applied, and the algorithm tags have
/// already been parsed into the closed dispatch type.
#[derive(Debug, Clone)]
pub struct Config {
    pub id: Uuid,
    pub hostname: String,
    pub database_url: Option<String>,
    pub browser_algorithm: SessionAlgorithm,
    pub service_algorithm: SessionAlgorithm,
    pub browser_expiration: Duration,
    pub service_expiration: Duration,
    pub idle_timeout: Duration,
    pub cleanup_interval: Duration,
    pub verbosity_profile: String,
}

impl Config {
    pub fn from_conf_file(conf_file: &ConfFile) -> anyhow::Result<Self> {
        let browser_algorithm = conf_file
            .browser_algorithm
            .as_deref()
            .unwrap_or("OPAQUE")
            .pipe(parse_session_algorithm)
            .context("BrowserAlgorithm")?;

        let service_algorithm = conf_file
            .service_algorithm
            .as_deref()
            .unwrap_or("OPAQUE")
            .pipe(parse_session_algorithm)
            .context("ServiceAlgorithm")?;

        Ok(Self {
            id: conf_file.id.unwrap_or_else(Uuid::now_v7),
            hostname: conf_file.hostname.clone().unwrap_or_else(|| "localhost".to_owned()),
            database_url: conf_file.database_url.clone(),
            browser_algorithm,
            service_algorithm,
            browser_expiration: conf_file.browser_expiration.unwrap_or(DEFAULT_EXPIRATION),
            service_expiration: conf_file.service_expiration.unwrap_or(DEFAULT_EXPIRATION),
            idle_timeout: conf_file.idle_timeout.unwrap_or(DEFAULT_IDLE_TIMEOUT),
            cleanup_interval: conf_file.cleanup_interval.unwrap_or(DEFAULT_CLEANUP_INTERVAL),
            verbosity_profile: conf_file.verbosity_profile.clone().unwrap_or_else(|| "info".to_owned()),
        })
    }
}

/// `OPAQUE`, or a JWS/JWE algorithm tag as rendered by `SessionAlgorithm`'s `Display` minus the
/// wrapper (e.g. `RS256`, `dir+A256GCM`) — tried in that order since the tag spaces don't
/// overlap.
fn parse_session_algorithm(tag: &str) -> anyhow::Result<SessionAlgorithm> {
    if tag.eq_ignore_ascii_case("OPAQUE") {
        return Ok(SessionAlgorithm::Opaque);
    }

    if let Ok(alg) = JwsAlgorithm::from_str(tag) {
        return Ok(SessionAlgorithm::Jws(alg));
    }

    if let Ok(alg) = JweAlgorithm::from_str(tag) {
        return Ok(SessionAlgorithm::Jwe(alg));
    }

    anyhow::bail!("unrecognized session algorithm tag: {tag}")
}
