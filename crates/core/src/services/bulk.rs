//! Apply one action to many items of a collection.

use super::{ContentOps, Fields};
use crate::error::Error;
use crate::result::RequestResult;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Move to the trash
    Trash,
    /// Delete permanently
    Delete,
    Publish,
    Draft,
}

impl BulkAction {
    pub fn as_str(&self) -> &str {
        match self {
            BulkAction::Trash => "trash",
            BulkAction::Delete => "delete",
            BulkAction::Publish => "publish",
            BulkAction::Draft => "draft",
        }
    }

    /// Label used when reporting results ("3 item(s) trashed").
    pub fn past_tense(&self) -> &str {
        match self {
            BulkAction::Trash => "trashed",
            BulkAction::Delete => "deleted",
            BulkAction::Publish => "published",
            BulkAction::Draft => "drafted",
        }
    }

    async fn apply<O: ContentOps + ?Sized>(&self, ops: &O, id: u64) -> RequestResult {
        match self {
            BulkAction::Trash => ops.delete(id, false).await,
            BulkAction::Delete => ops.delete(id, true).await,
            BulkAction::Publish | BulkAction::Draft => {
                let mut data = Fields::new();
                data.insert("status".to_string(), Value::from(self.as_str()));
                ops.update(id, &data).await
            }
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trash" => Ok(BulkAction::Trash),
            "delete" => Ok(BulkAction::Delete),
            "publish" => Ok(BulkAction::Publish),
            "draft" => Ok(BulkAction::Draft),
            other => Err(Error::InvalidInput(format!(
                "Unknown bulk action '{}' (expected trash, delete, publish or draft)",
                other
            ))),
        }
    }
}

/// Successful and failed calls of one bulk run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkTally {
    pub success: usize,
    pub failed: usize,
}

impl BulkTally {
    pub fn attempted(&self) -> usize {
        self.success + self.failed
    }
}

pub async fn run_bulk<O: ContentOps + ?Sized>(ops: &O, action: BulkAction, ids: &[u64]) -> BulkTally {
    run_bulk_with(ops, action, ids, |_, _| {}).await
}

/// Like [`run_bulk`], reporting every attempted ID with its outcome.
///
/// IDs are processed one at a time and a failure never stops the run. Zero
/// IDs are skipped without a call.
pub async fn run_bulk_with<O, F>(ops: &O, action: BulkAction, ids: &[u64], mut on_item: F) -> BulkTally
where
    O: ContentOps + ?Sized,
    F: FnMut(u64, &RequestResult),
{
    let mut tally = BulkTally::default();

    for &id in ids {
        if id == 0 {
            continue;
        }

        let result = action.apply(ops, id).await;
        match &result {
            Ok(_) => {
                debug!(id, action = %action, "bulk item done");
                tally.success += 1;
            }
            Err(err) => {
                warn!(id, action = %action, error = %err, "bulk item failed");
                tally.failed += 1;
            }
        }
        on_item(id, &result);
    }

    tally
}
