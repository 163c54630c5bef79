//! Attachment uploads.
//!
//! An upload is not optimistic: nothing appears in the group until the
//! remote has accepted the file, after which a single transition appends a
//! confirmed message carrying the attachment.

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use consult_shared::{
    require_user, AttachmentId, ChatError, GroupId, MessageId, ThreadId, UserContext,
};
use consult_store::{Activity, Attachment, Message};

use super::{ensure_group, ensure_thread, non_blank};
use crate::events::ChatEvent;
use crate::remote::RemoteCall;
use crate::service::{ActivityGuard, ChatService};

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Content reference derived from the file bytes.
    pub fn content_ref(&self) -> String {
        format!("blob:{}", hex::encode(blake3::hash(&self.data).as_bytes()))
    }
}

/// Outcome of a multi-file upload.  Files are listed in selection order.
#[derive(Debug, Default, Serialize)]
pub struct UploadBatch {
    pub uploaded: Vec<Attachment>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Serialize)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

impl ChatService {
    /// Upload one file and post it to the group as a confirmed message.
    pub async fn upload_file(
        &self,
        user: Option<&UserContext>,
        file: &UploadFile,
        group_id: &GroupId,
        thread_id: Option<&ThreadId>,
    ) -> Result<Attachment, ChatError> {
        let user = require_user(user)?;
        let file_name = non_blank(&file.name, "file name")?;
        {
            let state = self.inner.store.snapshot();
            ensure_group(&state, group_id)?;
            ensure_thread(&state, group_id, thread_id)?;
        }
        let max = self.inner.config.max_upload_size;
        if file.data.len() > max {
            return Err(ChatError::Validation(format!(
                "File too large: {} bytes (max {max})",
                file.data.len()
            )));
        }

        let _loading = ActivityGuard::begin(&self.inner.store, Activity::Loading);
        let mut turn = self.inner.confirmations.enqueue(group_id);

        self.inner
            .remote
            .call(RemoteCall::UploadFile {
                group_id: group_id.clone(),
                file_name: file_name.to_string(),
                size: file.size(),
            })
            .await
            .map_err(|e| {
                warn!(file_name, group_id = %group_id, error = %e, "Upload failed");
                ChatError::operation_failed(e)
            })?;
        turn.wait().await;

        let now = self.inner.clock.now();
        let attachment = Attachment {
            id: AttachmentId::from(self.inner.ids.permanent_id()),
            file_name: file_name.to_string(),
            file_size: file.size(),
            mime_type: file.mime_type.clone(),
            url: file.content_ref(),
            uploaded_at: now,
        };
        let message = Message {
            id: MessageId::from(self.inner.ids.permanent_id()),
            content: format!("Uploaded file: {file_name}"),
            author_id: user.id.clone(),
            author_name: user.name.clone(),
            author_picture: user.picture.clone(),
            timestamp: now,
            group_id: group_id.clone(),
            thread_id: thread_id.cloned(),
            attachments: vec![attachment.clone()],
            meeting_url: None,
            optimistic: false,
            edited: false,
            edited_at: None,
        };
        let message_id = message.id.clone();

        self.inner.store.apply(|s| {
            s.push_message(message);
            s.touch_group(group_id, now);
            if let Some(thread) = thread_id {
                s.record_thread_message(thread, now);
            }
        });

        info!(
            attachment_id = %attachment.id,
            file_name,
            size = attachment.file_size,
            group_id = %group_id,
            "File uploaded"
        );
        self.emit(ChatEvent::AttachmentUploaded {
            group_id: group_id.clone(),
            attachment_id: attachment.id.clone(),
            message_id,
        });
        Ok(attachment)
    }

    /// Upload several files one after another.  A failed file does not stop
    /// the rest.
    pub async fn upload_files(
        &self,
        user: Option<&UserContext>,
        files: &[UploadFile],
        group_id: &GroupId,
        thread_id: Option<&ThreadId>,
    ) -> Result<UploadBatch, ChatError> {
        require_user(user)?;

        let mut batch = UploadBatch::default();
        for file in files {
            match self.upload_file(user, file, group_id, thread_id).await {
                Ok(attachment) => batch.uploaded.push(attachment),
                Err(e) => batch.failed.push(FailedUpload {
                    file_name: file.name.clone(),
                    error: e.to_string(),
                }),
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatConfig;
    use crate::test_support::{harness, harness_with};
    use consult_shared::RemoteError;
    use futures::poll;

    fn g1() -> GroupId {
        "g-1".into()
    }

    #[tokio::test]
    async fn test_upload_appends_confirmed_message() {
        let h = harness();
        let file = UploadFile::new("report.pdf", "application/pdf", &b"%PDF-1.7"[..]);

        let attachment = h
            .service
            .upload_file(Some(&h.user), &file, &g1(), None)
            .await
            .unwrap();

        assert_eq!(attachment.file_size, 8);
        assert_eq!(attachment.url, file.content_ref());
        assert!(attachment.url.starts_with("blob:"));
        assert_eq!(attachment.url.len(), "blob:".len() + 64);

        let messages = h.service.messages(Some(&g1()));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Uploaded file: report.pdf");
        assert_eq!(messages[0].attachments, vec![attachment]);
        assert!(!messages[0].optimistic);
        assert!(!h.service.is_loading());
    }

    #[tokio::test]
    async fn test_loading_flag_spans_upload() {
        let h = harness();
        h.remote.hold(true);
        let file = UploadFile::new("a.txt", "text/plain", "abc");

        let g1 = g1();
        let upload = h.service.upload_file(Some(&h.user), &file, &g1, None);
        futures::pin_mut!(upload);
        assert!(poll!(upload.as_mut()).is_pending());
        assert!(h.service.is_loading());
        assert!(h.service.messages(None).is_empty());

        h.remote.release_all();
        upload.await.unwrap();
        assert!(!h.service.is_loading());
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_mutation() {
        let h = harness_with(ChatConfig {
            max_upload_size: 4,
            ..ChatConfig::default()
        });
        let before = h.service.snapshot();

        let file = UploadFile::new("big.bin", "application/octet-stream", "12345");
        let err = h
            .service
            .upload_file(Some(&h.user), &file, &g1(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(h.service.snapshot(), before);
        assert!(h.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_upload_appends_nothing() {
        let h = harness();
        h.remote.fail_next(RemoteError::Unavailable);
        let file = UploadFile::new("a.txt", "text/plain", "abc");

        let err = h
            .service
            .upload_file(Some(&h.user), &file, &g1(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::OperationFailed(_)));
        assert!(h.service.messages(None).is_empty());
        assert!(!h.service.is_loading());
    }

    #[tokio::test]
    async fn test_batch_keeps_selection_order() {
        let h = harness();
        let files = [
            UploadFile::new("one.txt", "text/plain", "1"),
            UploadFile::new("two.txt", "text/plain", "2"),
            UploadFile::new("three.txt", "text/plain", "3"),
        ];
        h.remote.succeed_next();
        h.remote.fail_next(RemoteError::Rejected("quota".into()));

        let batch = h
            .service
            .upload_files(Some(&h.user), &files, &g1(), None)
            .await
            .unwrap();

        let uploaded: Vec<_> = batch.uploaded.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(uploaded, ["one.txt", "three.txt"]);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].file_name, "two.txt");

        let contents: Vec<_> = h
            .service
            .messages(Some(&g1()))
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["Uploaded file: one.txt", "Uploaded file: three.txt"]);
    }

    #[tokio::test]
    async fn test_upload_requires_user() {
        let h = harness();
        let file = UploadFile::new("a.txt", "text/plain", "abc");
        assert_eq!(
            h.service.upload_file(None, &file, &g1(), None).await,
            Err(ChatError::Unauthenticated)
        );
        assert!(matches!(
            h.service.upload_files(None, &[file], &g1(), None).await,
            Err(ChatError::Unauthenticated)
        ));
    }
}
