//! fairgroup.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::GradeRange;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_MAX_ROUNDS: usize = 100;
/// Largest magnitude accepted for either bound of `[roster]`.
pub const MAX_GRADE_MAGNITUDE: f64 = 1e6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FairGroupConfig {
    pub server: Option<ServerConfig>,
    pub roster: Option<RosterConfig>,
    pub balance: Option<BalanceConfig>,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub min_grade: Option<f64>,
    pub max_grade: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Upper bound on swap rounds per merged range.
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty means mirror the request origin.
    pub allowed_origins: Option<Vec<String>>,
}

impl FairGroupConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FairGroupConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let range = self.grade_range();
        if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
            anyhow::bail!(
                "invalid grade range [{}, {}] in [roster]",
                range.min,
                range.max
            );
        }
        if range.min.abs() > MAX_GRADE_MAGNITUDE || range.max.abs() > MAX_GRADE_MAGNITUDE {
            anyhow::bail!(
                "grade range [{}, {}] in [roster] exceeds ±{MAX_GRADE_MAGNITUDE}",
                range.min,
                range.max
            );
        }
        if self.max_rounds() == 0 {
            anyhow::bail!("[balance] max_rounds must be at least 1");
        }
        Ok(())
    }

    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn grade_range(&self) -> GradeRange {
        let default = GradeRange::default();
        match &self.roster {
            Some(r) => GradeRange::new(
                r.min_grade.unwrap_or(default.min),
                r.max_grade.unwrap_or(default.max),
            ),
            None => default,
        }
    }

    pub fn max_rounds(&self) -> usize {
        self.balance
            .as_ref()
            .and_then(|b| b.max_rounds)
            .unwrap_or(DEFAULT_MAX_ROUNDS)
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors
            .as_ref()
            .and_then(|c| c.allowed_origins.clone())
            .unwrap_or_default()
    }
}
