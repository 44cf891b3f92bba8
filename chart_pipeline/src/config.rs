//! Pipeline configuration: TOML parsing, defaults and validation.
//!
//! Every key is optional; an empty document yields [`ChartConfig::default`].
//!
//! ```toml
//! [pivots]
//! threshold = 0.10
//!
//! [volume]
//! window = 10
//! threshold = 1.5
//!
//! [layout]
//! headroom = 0.4
//!
//! [fundamentals]
//! enabled = true
//! base_url = "https://finviz.com/quote.ashx"
//! request_timeout_secs = 5
//! backoff_secs = 10
//! max_attempts = 5      # 0 retries until cancelled
//! ```

use std::{num::NonZeroU32, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use shared_utils::env::{get_env_var_opt, parse_env_var};

use crate::{
    assembler::DEFAULT_HEADROOM,
    errors::Error,
    fundamentals::{
        RetryPolicy,
        source::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FinvizOptions},
    },
    pivots::ZigZag,
    volume::VolumeSpikes,
};

/// Path of the TOML file read by [`ChartConfig::from_env`].
pub const CONFIG_PATH_ENV: &str = "CHART_PIPELINE_CONFIG";
/// Overrides `[pivots] threshold`.
pub const PIVOT_THRESHOLD_ENV: &str = "CHART_PIPELINE_PIVOT_THRESHOLD";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub pivots: PivotsCfg,
    pub volume: VolumeCfg,
    pub layout: LayoutCfg,
    pub fundamentals: FundamentalsCfg,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PivotsCfg {
    /// Relative reversal that confirms a pivot (0.10 = 10%).
    pub threshold: f64,
}

impl Default for PivotsCfg {
    fn default() -> Self {
        Self {
            threshold: ZigZag::DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeCfg {
    pub window: usize,
    pub threshold: f64,
}

impl Default for VolumeCfg {
    fn default() -> Self {
        let spikes = VolumeSpikes::default();
        Self {
            window: spikes.window,
            threshold: spikes.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutCfg {
    /// Share of the price range added above the highest high.
    pub headroom: f64,
}

impl Default for LayoutCfg {
    fn default() -> Self {
        Self {
            headroom: DEFAULT_HEADROOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FundamentalsCfg {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub backoff_secs: u64,
    /// `0` means no limit.
    pub max_attempts: u32,
}

impl Default for FundamentalsCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 5,
            backoff_secs: RetryPolicy::DEFAULT_BACKOFF.as_secs(),
            max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ChartConfig {
    /// Loads the file named by `CHART_PIPELINE_CONFIG` (defaults when unset),
    /// then applies `CHART_PIPELINE_PIVOT_THRESHOLD` if present.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = match get_env_var_opt(CONFIG_PATH_ENV) {
            Some(path) => load_config_path(path)?,
            None => Self::default(),
        };
        if let Some(threshold) =
            parse_env_var::<f64>(PIVOT_THRESHOLD_ENV).map_err(|e| Error::Config(e.to_string()))?
        {
            config.pivots.threshold = threshold;
            config.validate()?;
        }
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        let t = self.pivots.threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(Error::Config(format!("pivots.threshold must be in (0, 1), got {t}")));
        }
        if self.volume.window == 0 {
            return Err(Error::Config("volume.window must be positive".into()));
        }
        if !self.volume.threshold.is_finite() {
            return Err(Error::Config("volume.threshold must be finite".into()));
        }
        if !(self.layout.headroom.is_finite() && self.layout.headroom >= 0.0) {
            return Err(Error::Config(format!(
                "layout.headroom must be a non-negative number, got {}",
                self.layout.headroom
            )));
        }
        if self.fundamentals.request_timeout_secs == 0 {
            return Err(Error::Config("fundamentals.request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn zigzag(&self) -> ZigZag {
        ZigZag::new(self.pivots.threshold)
    }

    pub fn volume_spikes(&self) -> VolumeSpikes {
        VolumeSpikes {
            window: self.volume.window,
            threshold: self.volume.threshold,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff: Duration::from_secs(self.fundamentals.backoff_secs),
            max_attempts: NonZeroU32::new(self.fundamentals.max_attempts),
        }
    }

    pub fn finviz_options(&self) -> FinvizOptions {
        FinvizOptions {
            base_url: self.fundamentals.base_url.clone(),
            user_agent: self.fundamentals.user_agent.clone(),
            request_timeout: Duration::from_secs(self.fundamentals.request_timeout_secs),
        }
    }
}

/// Parses and validates a TOML config document.
pub fn load_config_str(toml_str: &str) -> Result<ChartConfig, Error> {
    let config: ChartConfig = toml::from_str(toml_str)
        .map_err(|e| Error::Config(format!("failed to parse config TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Reads a TOML config file from disk. See [`load_config_str`].
pub fn load_config_path(path: impl AsRef<Path>) -> Result<ChartConfig, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read config file {}: {e}", path.display())))?;
    load_config_str(&text)
}
