//! The `run` command: open the list page, traverse it, persist the records.

use std::time::Duration;

use anyhow::Context;
use listwalk_cdp::{BrowserManager, CdpScanner, CdpSurface};
use listwalk_config::Config;
use listwalk_core::{
    default_locators, ExtractionProbe, ScrollDriver, Traversal, TraversalResult, TraversalStatus,
};
use tracing::{error, info, warn};

use crate::adapters;
use crate::sink::sink_for;

/// Run one traversal and write its records. Failed runs still write what
/// they collected before returning the error.
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let url = config
        .target
        .url
        .clone()
        .context("target.url is not set; pass --url or set it in the config file")?;

    info!("Starting listwalk v{}", env!("CARGO_PKG_VERSION"));

    let manager = BrowserManager::new(adapters::browser_config(&config.browser));
    let outcome = traverse(&manager, &config, &url).await;
    if let Err(e) = manager.shutdown_chrome().await {
        warn!("Browser shutdown failed: {}", e);
    }
    let result = outcome?;

    sink_for(&config.output).write(&result.records).await?;

    match result.status {
        TraversalStatus::Complete => Ok(()),
        TraversalStatus::Truncated => {
            warn!("Traversal truncated after {} records", result.len());
            Ok(())
        }
        TraversalStatus::Failed => {
            let detail = result.error.unwrap_or_else(|| "unknown error".to_string());
            error!("Traversal failed after {} records: {}", result.records.len(), detail);
            anyhow::bail!("traversal failed: {}", detail)
        }
    }
}

async fn traverse(
    manager: &BrowserManager,
    config: &Config,
    url: &str,
) -> anyhow::Result<TraversalResult> {
    let target = &config.target;

    let session = manager
        .open_page(url)
        .await
        .with_context(|| format!("opening {}", url))?;
    manager
        .wait_for_list(
            &session,
            &target.item_selector,
            Duration::from_millis(target.wait_for_list_ms),
        )
        .await?;

    let scanner = CdpScanner::new(
        session.clone(),
        target.item_selector.clone(),
        adapters::item_selectors(target),
    );
    let scroller = ScrollDriver::new(
        CdpSurface::new(session.clone()),
        default_locators(&adapters::container_selectors(target), &target.item_selector),
        adapters::scroll_options(config),
    );

    let probe_opts = adapters::probe_options(config);
    let probe = if config.batch.enabled {
        ExtractionProbe::inline(probe_opts)?
    } else {
        ExtractionProbe::reveal(probe_opts)?
    };

    let opts = adapters::traversal_options(config);
    let mut traversal = Traversal::new(scanner, probe, scroller, opts);
    Ok(traversal.run().await)
}
