use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::chart_spec::ChartSpec;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination refused the write (e.g. a path with no file name).
    #[error("Failed to write chart spec: {message}")]
    Write { message: String },

    /// Converting the chart spec into the destination format failed.
    #[error("Chart spec serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hands a finished [`ChartSpec`] to whatever renders it.
#[async_trait]
pub trait SpecSink {
    /// What a successful write produces, e.g. the path written for a file
    /// sink.
    type Output;

    async fn write(&self, spec: &ChartSpec) -> Result<Self::Output, SinkError>;
}

/// Writes the chart spec as pretty-printed JSON. The file is written next to its
/// destination first and renamed into place, so readers never see a partial
/// document.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SpecSink for JsonFileSink {
    type Output = PathBuf;

    async fn write(&self, spec: &ChartSpec) -> Result<PathBuf, SinkError> {
        let Some(file_name) = self.path.file_name() else {
            return Err(SinkError::Write {
                message: format!("{} has no file name", self.path.display()),
            });
        };
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let json = serde_json::to_vec_pretty(spec)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        log::info!("wrote {} chart spec to {}", spec.ticker, self.path.display());
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        assembler::{AssemblyInput, DEFAULT_HEADROOM, assemble},
        indicators::enrich,
        models::{bar::Bar, bar_series::BarSeries, cadence::Cadence},
        theme::LIGHT,
    };

    fn spec() -> ChartSpec {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..5)
            .map(|i| Bar {
                timestamp: start + Duration::days(i),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                volume: 1_000.0,
            })
            .collect();
        let enriched = enrich(BarSeries::new("ACME", Cadence::Daily, bars)).unwrap();
        assemble(AssemblyInput {
            enriched: &enriched,
            pivots: vec![],
            volume_labels: vec![],
            fundamentals: None,
            meta: None,
            theme: &LIGHT,
            headroom: DEFAULT_HEADROOM,
        })
    }

    #[tokio::test]
    async fn writes_json_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("charts").join("acme.json");
        let sink = JsonFileSink::new(&target);

        let written = sink.write(&spec()).await.unwrap();

        assert_eq!(written, target);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(value["ticker"], "ACME");
        assert_eq!(value["bars"].as_array().unwrap().len(), 5);
        assert!(!dir.path().join("charts").join("acme.json.tmp").exists());
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("acme.json");
        std::fs::write(&target, "stale").unwrap();

        JsonFileSink::new(&target).write(&spec()).await.unwrap();

        let body = std::fs::read_to_string(&target).unwrap();
        assert!(body.contains("\"ticker\": \"ACME\""));
    }
}
