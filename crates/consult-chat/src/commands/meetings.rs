//! Video meeting issuance.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use consult_shared::constants::{MEETING_JOIN_BASE, MEETING_START_BASE};
use consult_shared::{require_user, ChatError, GroupId, MeetingDuration, MessageId, UserContext};
use consult_store::{MeetingRecord, Message};

use super::{ensure_group, non_blank};
use crate::events::ChatEvent;
use crate::remote::RemoteCall;
use crate::service::ChatService;

/// Message body announcing a meeting to the group.
fn announcement(record: &MeetingRecord, description: Option<&str>) -> String {
    let mut out = String::from("Video meeting created\n\n");
    let _ = writeln!(out, "Topic: {}", record.topic);
    if let Some(description) = description {
        let _ = writeln!(out, "Description: {description}");
    }
    let _ = writeln!(out, "Duration: {} minutes", record.duration_minutes);
    if let Some(at) = record.scheduled_for {
        let _ = writeln!(out, "Scheduled for: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Join details:");
    let _ = writeln!(out, "- Meeting ID: {}", record.meeting_id);
    let _ = writeln!(out, "- Password: {}", record.password);
    let _ = write!(out, "- Join URL: {}", record.join_url);
    out
}

impl ChatService {
    /// Schedule a meeting and post its join details to the group.  The
    /// record and its message appear together or not at all.
    pub async fn create_meeting(
        &self,
        user: Option<&UserContext>,
        topic: &str,
        duration_minutes: u32,
        group_id: &GroupId,
        scheduled_for: Option<DateTime<Utc>>,
        description: Option<&str>,
    ) -> Result<MeetingRecord, ChatError> {
        let user = require_user(user)?;
        let topic = non_blank(topic, "meeting topic")?;
        let duration = MeetingDuration::try_from(duration_minutes)?;
        ensure_group(&self.inner.store.snapshot(), group_id)?;

        let mut turn = self.inner.confirmations.enqueue(group_id);
        self.inner
            .remote
            .call(RemoteCall::CreateMeeting {
                group_id: group_id.clone(),
            })
            .await
            .map_err(|e| {
                warn!(group_id = %group_id, error = %e, "Meeting creation failed");
                ChatError::operation_failed(e)
            })?;
        turn.wait().await;

        let meeting_id = self.inner.ids.meeting_id();
        let password = self.inner.ids.meeting_password();
        let now = self.inner.clock.now();
        let record = MeetingRecord {
            id: self.inner.ids.permanent_id(),
            join_url: format!("{MEETING_JOIN_BASE}{meeting_id}?pwd={password}"),
            start_url: format!("{MEETING_START_BASE}{meeting_id}?pwd={password}"),
            meeting_id,
            password,
            created_by: user.id.clone(),
            created_at: now,
            topic: topic.to_string(),
            duration_minutes: duration.minutes(),
            scheduled_for,
        };

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let message = Message {
            id: MessageId::from(self.inner.ids.permanent_id()),
            content: announcement(&record, description),
            author_id: user.id.clone(),
            author_name: user.name.clone(),
            author_picture: user.picture.clone(),
            timestamp: now,
            group_id: group_id.clone(),
            thread_id: None,
            attachments: Vec::new(),
            meeting_url: Some(record.join_url.clone()),
            optimistic: false,
            edited: false,
            edited_at: None,
        };
        let message_id = message.id.clone();

        self.inner.store.apply(|s| {
            s.push_message(message);
            s.touch_group(group_id, now);
        });

        info!(
            meeting_id = %record.meeting_id,
            group_id = %group_id,
            duration = record.duration_minutes,
            "Meeting created"
        );
        self.emit(ChatEvent::MeetingCreated {
            group_id: group_id.clone(),
            meeting_id: record.meeting_id.clone(),
            message_id,
        });
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{harness, start};
    use crate::commands::files::UploadFile;
    use consult_shared::RemoteError;
    use futures::poll;

    fn g1() -> GroupId {
        "g-1".into()
    }

    #[tokio::test]
    async fn test_meeting_and_message_together() {
        let h = harness();
        let record = h
            .service
            .create_meeting(Some(&h.user), "Budget review", 30, &g1(), None, Some("  Q3 numbers "))
            .await
            .unwrap();

        assert_eq!(record.meeting_id, "0000000001");
        assert_eq!(record.password, "PW0002");
        assert_eq!(record.join_url, "https://zoom.us/j/0000000001?pwd=PW0002");
        assert_eq!(record.start_url, "https://zoom.us/s/0000000001?pwd=PW0002");
        assert_eq!(record.duration_minutes, 30);
        assert_eq!(record.created_at, start());

        let messages = h.service.messages(Some(&g1()));
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.meeting_url.as_deref(), Some(record.join_url.as_str()));
        for needle in [
            "Topic: Budget review",
            "Description: Q3 numbers",
            "Duration: 30 minutes",
            "Meeting ID: 0000000001",
            "Password: PW0002",
            record.join_url.as_str(),
        ] {
            assert!(message.content.contains(needle), "missing {needle:?}");
        }
    }

    #[tokio::test]
    async fn test_blank_description_is_omitted() {
        let h = harness();
        h.service
            .create_meeting(Some(&h.user), "Sync", 15, &g1(), None, Some("   "))
            .await
            .unwrap();
        let content = &h.service.messages(None)[0].content;
        assert!(!content.contains("Description:"));
    }

    #[tokio::test]
    async fn test_meeting_validation() {
        let h = harness();
        let before = h.service.snapshot();

        assert_eq!(
            h.service.create_meeting(None, "Sync", 30, &g1(), None, None).await,
            Err(ChatError::Unauthenticated)
        );
        for (topic, minutes) in [("", 30), ("Sync", 20), ("Sync", 90)] {
            let result = h
                .service
                .create_meeting(Some(&h.user), topic, minutes, &g1(), None, None)
                .await;
            assert!(matches!(result, Err(ChatError::Validation(_))));
        }
        assert_eq!(h.service.snapshot(), before);
        assert!(h.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_meeting_posts_nothing() {
        let h = harness();
        h.remote.fail_next(RemoteError::Unavailable);
        let result = h
            .service
            .create_meeting(Some(&h.user), "Sync", 45, &g1(), None, None)
            .await;
        assert!(matches!(result, Err(ChatError::OperationFailed(_))));
        assert!(h.service.messages(None).is_empty());
    }

    #[tokio::test]
    async fn test_meeting_waits_for_earlier_upload() {
        let h = harness();
        h.remote.hold(true);
        let g1 = g1();
        let file = UploadFile::new("a.txt", "text/plain", "abc");

        let upload = h.service.upload_file(Some(&h.user), &file, &g1, None);
        let meeting = h
            .service
            .create_meeting(Some(&h.user), "Sync", 30, &g1, None, None);
        futures::pin_mut!(upload, meeting);
        assert!(poll!(upload.as_mut()).is_pending());
        assert!(poll!(meeting.as_mut()).is_pending());

        // The remote accepts the meeting first; it still lands second.
        assert!(h.remote.release_newest());
        assert!(poll!(meeting.as_mut()).is_pending());
        assert!(h.service.messages(None).is_empty());

        h.remote.release_all();
        upload.await.unwrap();
        meeting.await.unwrap();

        let contents: Vec<String> = h
            .service
            .messages(Some(&g1))
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0], "Uploaded file: a.txt");
        assert!(contents[1].starts_with("Video meeting created"));
    }

    #[tokio::test]
    async fn test_failed_meeting_releases_the_group() {
        let h = harness();
        h.remote.fail_next(RemoteError::Unavailable);
        let g1 = g1();

        assert!(h
            .service
            .create_meeting(Some(&h.user), "Sync", 30, &g1, None, None)
            .await
            .is_err());
        h.service
            .send_message(Some(&h.user), &g1, "still here", None)
            .await
            .unwrap();
        assert_eq!(h.service.messages(Some(&g1)).len(), 1);
    }
}
