use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::summary::DatasetSummary;

/// Full summary as pretty-printed JSON.
pub fn write(path: &Path, summary: &DatasetSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {} failed", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, summary)
        .with_context(|| format!("serializing summary to {}", path.display()))?;
    writeln!(w)?;
    w.flush()?;
    log::info!("wrote JSON summary to {}", path.display());
    Ok(())
}
