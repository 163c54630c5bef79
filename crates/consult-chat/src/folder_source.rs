//! Listings of connected external folders.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use consult_shared::{FolderItemId, RemoteError};
use consult_store::{ExternalFolder, FolderItem, FolderItemKind};

use crate::runtime::Delay;

const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub trait FolderSource: Send + Sync + 'static {
    /// Items directly under `parent`, or under the folder root when `None`.
    fn list(
        &self,
        folder: &ExternalFolder,
        parent: Option<&FolderItemId>,
        now: DateTime<Utc>,
    ) -> BoxFuture<'static, Result<Vec<FolderItem>, RemoteError>>;
}

/// Fixed demo tree: three entries at the root and a `finance-data`
/// sub-folder with two spreadsheets.  Item ids are `<folder id>:<path>`,
/// so listing the same folder twice yields the same ids.
pub struct DemoFolderSource {
    delay: Arc<dyn Delay>,
    latency: Duration,
}

impl DemoFolderSource {
    pub fn new(delay: Arc<dyn Delay>, latency: Duration) -> Self {
        Self { delay, latency }
    }
}

struct Entry {
    path: &'static str,
    kind: FolderItemKind,
    size: Option<u64>,
    mime: Option<&'static str>,
    age_hours: i64,
}

const ROOT: &[Entry] = &[
    Entry {
        path: "presentation.pptx",
        kind: FolderItemKind::File,
        size: Some(2_048_576),
        mime: Some(PPTX_MIME),
        age_hours: 24,
    },
    Entry {
        path: "finance-data",
        kind: FolderItemKind::Folder,
        size: None,
        mime: None,
        age_hours: 48,
    },
    Entry {
        path: "meeting-minutes.docx",
        kind: FolderItemKind::File,
        size: Some(512_000),
        mime: Some(DOCX_MIME),
        age_hours: 72,
    },
];

const FINANCE_DATA: &[Entry] = &[
    Entry {
        path: "finance-data/budget-2024.xlsx",
        kind: FolderItemKind::File,
        size: Some(184_320),
        mime: Some(XLSX_MIME),
        age_hours: 50,
    },
    Entry {
        path: "finance-data/cashflow.csv",
        kind: FolderItemKind::File,
        size: Some(20_480),
        mime: Some("text/csv"),
        age_hours: 60,
    },
];

fn entries_under(folder: &ExternalFolder, parent: Option<&FolderItemId>) -> &'static [Entry] {
    match parent {
        None => ROOT,
        Some(id) if id.as_str() == format!("{}:finance-data", folder.id) => FINANCE_DATA,
        Some(_) => &[],
    }
}

fn to_item(
    folder: &ExternalFolder,
    parent: Option<&FolderItemId>,
    entry: &Entry,
    now: DateTime<Utc>,
) -> FolderItem {
    let name = entry.path.rsplit('/').next().unwrap_or(entry.path);
    let download_url = match entry.kind {
        FolderItemKind::File => Some(format!(
            "{}://{}/{}",
            folder.provider,
            folder.path.trim_end_matches('/'),
            entry.path
        )),
        FolderItemKind::Folder => None,
    };
    FolderItem {
        id: FolderItemId::from(format!("{}:{}", folder.id, entry.path)),
        name: name.to_string(),
        kind: entry.kind,
        size: entry.size,
        mime_type: entry.mime.map(str::to_string),
        modified_at: now - chrono::Duration::hours(entry.age_hours),
        parent_folder_id: parent.cloned(),
        download_url,
    }
}

impl FolderSource for DemoFolderSource {
    fn list(
        &self,
        folder: &ExternalFolder,
        parent: Option<&FolderItemId>,
        now: DateTime<Utc>,
    ) -> BoxFuture<'static, Result<Vec<FolderItem>, RemoteError>> {
        let items: Vec<FolderItem> = entries_under(folder, parent)
            .iter()
            .map(|entry| to_item(folder, parent, entry, now))
            .collect();
        let sleep = self.delay.sleep(self.latency);

        Box::pin(async move {
            sleep.await;
            Ok(items)
        })
    }
}
