//! Persistence of extracted records.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use listwalk_config::OutputConfig;
use listwalk_core::ExtractedRecord;
use tracing::info;

/// Destination for a finished traversal's records.
#[async_trait]
pub(crate) trait RecordSink: Send + Sync {
    async fn write(&self, records: &[ExtractedRecord]) -> anyhow::Result<()>;
}

fn render(records: &[ExtractedRecord], pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

/// Writes a JSON array to a file, replacing it atomically.
pub(crate) struct JsonFileSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "records.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    async fn write(&self, records: &[ExtractedRecord]) -> anyhow::Result<()> {
        let json = render(records, self.pretty)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("renaming {} to {}", tmp.display(), self.path.display()))?;

        info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Prints a JSON array to stdout.
pub(crate) struct StdoutSink {
    pretty: bool,
}

impl StdoutSink {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

#[async_trait]
impl RecordSink for StdoutSink {
    async fn write(&self, records: &[ExtractedRecord]) -> anyhow::Result<()> {
        println!("{}", render(records, self.pretty)?);
        Ok(())
    }
}

/// Sink selected by `[output]`.
pub(crate) fn sink_for(output: &OutputConfig) -> Box<dyn RecordSink> {
    match output.path.as_deref() {
        Some(path) => Box::new(JsonFileSink::new(expand(path), output.pretty)),
        None => Box::new(StdoutSink::new(output.pretty)),
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(listwalk_config::ConfigLoader::expand_path(&path.to_string_lossy()))
}
