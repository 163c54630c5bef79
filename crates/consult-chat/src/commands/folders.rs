//! External folder connection, listing and re-sync.

use tracing::{info, warn};

use consult_shared::{require_user, ChatError, FolderId, FolderItemId, ProviderType, UserContext};
use consult_store::{Activity, ExternalFolder, FolderItem};

use super::non_blank;
use crate::events::ChatEvent;
use crate::remote::RemoteCall;
use crate::service::{ActivityGuard, ChatService};

impl ChatService {
    /// Link a folder from `provider` (`drive`, `dropbox`, `onedrive` or
    /// `local`).  `is_connecting()` reports `true` until it settles.
    pub async fn connect_folder(
        &self,
        user: Option<&UserContext>,
        provider: &str,
        name: &str,
        path: &str,
    ) -> Result<ExternalFolder, ChatError> {
        let user = require_user(user)?;
        let provider: ProviderType = provider.parse()?;
        let name = non_blank(name, "folder name")?;

        let _connecting = ActivityGuard::begin(&self.inner.store, Activity::Connecting);

        self.inner
            .remote
            .call(RemoteCall::ConnectFolder { provider })
            .await
            .map_err(|e| {
                warn!(%provider, name, error = %e, "Folder connection failed");
                ChatError::operation_failed(e)
            })?;

        let now = self.inner.clock.now();
        let folder = ExternalFolder {
            id: FolderId::from(self.inner.ids.permanent_id()),
            name: name.to_string(),
            path: path.trim().to_string(),
            provider,
            connected_by: user.id.clone(),
            connected_at: now,
            last_sync_at: Some(now),
        };

        self.inner.store.apply(|s| s.push_folder(folder.clone()));
        info!(folder_id = %folder.id, %provider, name, "Folder connected");
        self.emit(ChatEvent::FolderConnected {
            folder_id: folder.id.clone(),
        });
        Ok(folder)
    }

    /// Items directly under `parent` in the folder, or its root when
    /// `parent` is `None`.  Every call asks the provider again.
    pub async fn get_folder_items(
        &self,
        folder_id: &FolderId,
        parent: Option<&FolderItemId>,
    ) -> Result<Vec<FolderItem>, ChatError> {
        let folder = self.folder(folder_id)?;
        let now = self.inner.clock.now();

        self.inner
            .folder_source
            .list(&folder, parent, now)
            .await
            .map_err(|e| {
                warn!(folder_id = %folder_id, error = %e, "Folder listing failed");
                ChatError::operation_failed(e)
            })
    }

    /// Re-contact the provider and move the folder's last-sync time.
    pub async fn sync_folder(&self, folder_id: &FolderId) -> Result<ExternalFolder, ChatError> {
        self.folder(folder_id)?;

        self.inner
            .remote
            .call(RemoteCall::SyncFolder {
                folder_id: folder_id.clone(),
            })
            .await
            .map_err(|e| {
                warn!(folder_id = %folder_id, error = %e, "Folder sync failed");
                ChatError::operation_failed(e)
            })?;

        let now = self.inner.clock.now();
        self.inner.store.apply(|s| s.mark_synced(folder_id, now));
        info!(folder_id = %folder_id, "Folder synced");
        self.emit(ChatEvent::FolderSynced {
            folder_id: folder_id.clone(),
        });
        // Gone if it was removed while the sync was in flight.
        self.folder(folder_id)
    }

    fn folder(&self, folder_id: &FolderId) -> Result<ExternalFolder, ChatError> {
        self.inner
            .store
            .snapshot()
            .folder(folder_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(format!("folder {folder_id}")))
    }
}
