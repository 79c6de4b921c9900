use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use ranktab_types::table::RankTable;

/// Write the descriptor pretty-printed. Called only after a successful
/// build — a failed build writes nothing.
pub fn write_rank_table(path: &Path, table: &RankTable) -> Result<()> {
    let json =
        serde_json::to_string_pretty(table).context("failed to serialize rank table")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), ranks = table.total_ranks(), "descriptor written");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
