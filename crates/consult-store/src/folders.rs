use std::sync::Arc;

use chrono::{DateTime, Utc};

use consult_shared::FolderId;

use crate::models::ExternalFolder;
use crate::store::ChatState;

impl ChatState {
    pub fn folder(&self, id: &FolderId) -> Option<&ExternalFolder> {
        self.folders.iter().find(|f| &f.id == id)
    }

    pub fn push_folder(&mut self, folder: ExternalFolder) {
        Arc::make_mut(&mut self.folders).push(folder);
    }

    pub fn mark_synced(&mut self, id: &FolderId, at: DateTime<Utc>) -> bool {
        let Some(idx) = self.folders.iter().position(|f| &f.id == id) else {
            return false;
        };
        Arc::make_mut(&mut self.folders)[idx].last_sync_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, folder};

    #[test]
    fn test_mark_synced() {
        let mut state = ChatState::default();
        state.push_folder(folder("f-1"));

        assert!(state.mark_synced(&"f-1".into(), at(30)));
        assert_eq!(state.folder(&"f-1".into()).unwrap().last_sync_at, Some(at(30)));
        assert!(!state.mark_synced(&"f-2".into(), at(31)));
    }
}
