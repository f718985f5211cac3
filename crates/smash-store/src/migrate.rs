//! In-place migration of persisted documents
//!
//! Documents written before the version field existed are version 1. They
//! may carry `monthlyProgress: {"YYYY-MM": count}` instead of
//! `monthlyStats`; each count becomes a month with that many smashes, no
//! misses and empty item lists.

use serde_json::{Map, Value};
use smash_api::{Document, MonthlyStats, DOCUMENT_VERSION};
use tracing::{info, warn};

use crate::{StoreError, StoreResult};

const LEGACY_PROGRESS_KEY: &str = "monthlyProgress";
const STATS_KEY: &str = "monthlyStats";

/// Result of reading a raw document
#[derive(Debug)]
pub struct Migrated {
    pub document: Document,
    /// Version found on disk
    pub from_version: u32,
}

impl Migrated {
    pub fn was_migrated(&self) -> bool {
        self.from_version < DOCUMENT_VERSION
    }
}

/// Upconvert a raw JSON document to the current layout
pub fn migrate_document(mut raw: Value) -> StoreResult<Migrated> {
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| StoreError::UnsupportedDocument("document is not a JSON object".into()))?;

    let from_version = match obj.get("version") {
        None => 1,
        Some(v) => v
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| StoreError::UnsupportedDocument(format!("invalid version {}", v)))?,
    };

    if from_version > DOCUMENT_VERSION {
        return Err(StoreError::UnsupportedDocument(format!(
            "version {} is newer than supported version {}",
            from_version, DOCUMENT_VERSION
        )));
    }

    if let Some(progress) = obj.remove(LEGACY_PROGRESS_KEY) {
        upconvert_progress(obj, progress)?;
    }

    let mut document: Document = serde_json::from_value(raw)?;
    document.normalize();

    if from_version < DOCUMENT_VERSION {
        info!(
            from_version,
            to_version = DOCUMENT_VERSION,
            "Migrated legacy document"
        );
    }

    Ok(Migrated {
        document,
        from_version,
    })
}

fn upconvert_progress(obj: &mut Map<String, Value>, progress: Value) -> StoreResult<()> {
    let Value::Object(progress) = progress else {
        warn!("Ignoring malformed legacy monthly progress");
        return Ok(());
    };

    let stats = obj
        .entry(STATS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(stats) = stats else {
        return Err(StoreError::UnsupportedDocument(
            "monthlyStats is not an object".into(),
        ));
    };

    for (month, count) in progress {
        // Months already present in the new layout win.
        if stats.contains_key(&month) {
            continue;
        }
        let Some(count) = count.as_u64() else {
            warn!(month = %month, "Ignoring non-numeric legacy progress count");
            continue;
        };
        let month_stats = MonthlyStats {
            smashed_count: count.min(u32::MAX as u64) as u32,
            ..Default::default()
        };
        stats.insert(month, serde_json::to_value(month_stats)?);
    }

    Ok(())
}
