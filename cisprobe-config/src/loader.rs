use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use cisprobe_core::config::ProbeConfig;
use tracing::{info, warn};

use crate::validation::{ConfigWarning, validate};

pub const CONFIG_PATH_VAR: &str = "CISPROBE_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "CISPROBE_CONFIG_JSON";
pub const POLL_INTERVAL_VAR: &str = "CISPROBE_POLL_INTERVAL";
pub const MAX_POLL_DURATION_VAR: &str = "CISPROBE_MAX_POLL_DURATION";
pub const MAX_POLL_ATTEMPTS_VAR: &str = "CISPROBE_MAX_POLL_ATTEMPTS";
pub const RESOURCE_TYPE_VAR: &str = "CISPROBE_RESOURCE_TYPE";

const DEFAULT_CANDIDATES: &[&str] = &[
    "cisprobe.toml",
    "cisprobe.json",
    "config/cisprobe.toml",
    "config/cisprobe.json",
];

/// Source that produced the base configuration, before overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProbeConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// A validated configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ProbeConfig,
    pub source: ProbeConfigSource,
    pub warnings: Vec<ConfigWarning>,
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves configuration in this order:
/// 1) `$CISPROBE_CONFIG_PATH` (TOML or JSON file),
/// 2) `$CISPROBE_CONFIG_JSON` (inline JSON),
/// 3) the first default file found under the search root,
/// 4) built-in defaults,
///
/// then applies the single-value `CISPROBE_*` overrides and validates.
pub struct ConfigLoader {
    lookup: Lookup,
    search_root: PathBuf,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("lookup", &"Fn(&str) -> Option<String>")
            .field("search_root", &self.search_root)
            .finish()
    }
}

impl ConfigLoader {
    pub fn from_env() -> Self {
        Self::with_lookup(|key| env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
            search_root: PathBuf::from("."),
        }
    }

    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = root.into();
        self
    }

    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let (mut config, source) = self.load_base()?;
        self.apply_overrides(&mut config)?;

        let warnings = validate(&config).with_context(|| {
            format!("configuration from {source:?} failed validation")
        })?;

        info!(
            source = ?source,
            resource_type = %config.resource_type,
            document = %config.benchmark.name,
            interval_ms = config.poll.interval_ms,
            max_attempts = config.poll.max_attempts,
            max_duration_ms = config.poll.max_duration_ms,
            "configuration loaded"
        );
        for warning in &warnings {
            warn!(%warning, "configuration warning");
        }

        Ok(ConfigLoad {
            config,
            source,
            warnings,
        })
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn load_base(&self) -> anyhow::Result<(ProbeConfig, ProbeConfigSource)> {
        if let Some(path_str) = self.var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path_str.trim());
            let config = load_from_file(&path)?;
            return Ok((config, ProbeConfigSource::EnvPath(path)));
        }

        if let Some(raw) = self.var(CONFIG_JSON_VAR) {
            let parsed = parse_json(&raw).with_context(|| {
                format!("failed to parse {CONFIG_JSON_VAR}")
            })?;
            return Ok((parsed, ProbeConfigSource::EnvInline));
        }

        if let Some(path) = self.find_default_file() {
            let config = load_from_file(&path)?;
            return Ok((config, ProbeConfigSource::File(path)));
        }

        Ok((ProbeConfig::default(), ProbeConfigSource::Default))
    }

    fn apply_overrides(&self, config: &mut ProbeConfig) -> anyhow::Result<()> {
        if let Some(raw) = self.var(POLL_INTERVAL_VAR) {
            config.poll.interval_ms =
                parse_duration_ms(POLL_INTERVAL_VAR, &raw)?;
        }
        if let Some(raw) = self.var(MAX_POLL_DURATION_VAR) {
            config.poll.max_duration_ms =
                parse_duration_ms(MAX_POLL_DURATION_VAR, &raw)?;
        }
        if let Some(raw) = self.var(MAX_POLL_ATTEMPTS_VAR) {
            config.poll.max_attempts = raw.trim().parse().with_context(|| {
                format!(
                    "{MAX_POLL_ATTEMPTS_VAR} must be a whole number, got {raw:?}"
                )
            })?;
        }
        if let Some(raw) = self.var(RESOURCE_TYPE_VAR) {
            config.resource_type = raw.trim().to_string();
        }
        Ok(())
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| self.search_root.join(candidate))
            .find(|path| path.exists())
    }
}

fn parse_duration_ms(key: &str, raw: &str) -> anyhow::Result<u64> {
    let duration = humantime::parse_duration(raw.trim())
        .with_context(|| format!("{key} is not a duration: {raw:?}"))?;
    u64::try_from(duration.as_millis())
        .map_err(|_| anyhow!("{key} is too large: {raw:?}"))
}

pub fn load_from_file(path: &Path) -> anyhow::Result<ProbeConfig> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read cisprobe config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents).with_context(|| {
            format!("invalid cisprobe config {}", path.display())
        }),
        Some("toml") | Some("tml") => {
            toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid cisprobe config {}: {}", path.display(), err)
            })
        }
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

pub fn parse_from_str(
    contents: &str,
    origin: &str,
) -> anyhow::Result<ProbeConfig> {
    // Try TOML first, then JSON.
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse cisprobe config {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

pub fn parse_json(raw: &str) -> anyhow::Result<ProbeConfig> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid cisprobe config json: {err}"))
}
