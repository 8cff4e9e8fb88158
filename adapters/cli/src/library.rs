//! Loading chart files from disk into playable note sources.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use keyfall_core::ThinningConfig;
use keyfall_system_chart::{prepare, ChartDocument, LaneStrategy, PreparedChart};

/// Reads, lane-assigns and thins one chart file.
pub(crate) fn load_chart(
    path: &Path,
    strategy: LaneStrategy,
    thinning: &ThinningConfig,
) -> Result<PreparedChart> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chart {}", path.display()))?;
    let document = ChartDocument::from_json(&text)
        .with_context(|| format!("failed to decode chart {}", path.display()))?;
    let chart = prepare(&document, strategy, thinning)
        .with_context(|| format!("failed to prepare chart {}", path.display()))?;

    log::info!(
        "loaded '{}' from {}: {} notes, {}",
        chart.entry.name,
        path.display(),
        chart.entry.total_notes,
        chart.entry.difficulty
    );
    Ok(chart)
}

/// Loads every chart, skipping the ones that fail with a warning.
pub(crate) fn load_library(
    paths: &[impl AsRef<Path>],
    strategy: LaneStrategy,
    thinning: &ThinningConfig,
) -> Vec<PreparedChart> {
    paths
        .iter()
        .filter_map(
            |path| match load_chart(path.as_ref(), strategy, thinning) {
                Ok(chart) => Some(chart),
                Err(error) => {
                    log::warn!("skipping chart: {error:#}");
                    None
                }
            },
        )
        .collect()
}
