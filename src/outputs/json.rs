//! JSON rendering of the news mapping.
//!
//! Keys are source identities in sorted order; items keep the camelCase wire
//! shape of [`NewsItem`](crate::models::NewsItem). An empty mapping renders as
//! `{}`, the "no data" signal.

use crate::models::NewsMap;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `map`, indented when `pretty` is set.
pub fn to_json(map: &NewsMap, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(map)
    } else {
        serde_json::to_string(map)
    }
}

/// Write `map` to `path`, creating parent directories as needed.
///
/// The document is written to a sibling temporary file first and renamed into
/// place, so a reader never sees a half-written file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_news(map: &NewsMap, path: &Path, pretty: bool) -> io::Result<()> {
    let json = to_json(map, pretty)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e);
        }
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).await?;
    fs::rename(&tmp, path).await?;
    info!(
        bytes = json.len(),
        sources = map.len(),
        "Wrote news JSON"
    );
    Ok(())
}
