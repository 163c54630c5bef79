//! Scripted session exercising every chat workflow once.

use anyhow::Context;
use tracing::{info, warn};

use consult_chat::{ChatService, UploadFile};
use consult_shared::{GroupId, UserContext};

/// What the session produced, for the final report.
#[derive(Debug, Default)]
pub struct Outcome {
    pub confirmed: usize,
    pub rolled_back: usize,
    pub uploaded: usize,
    pub folder_items: usize,
}

pub async fn run(service: &ChatService, user: &UserContext) -> anyhow::Result<Outcome> {
    let mut outcome = Outcome::default();

    let group_id: GroupId = match service.current_group() {
        Some(group) => group.id,
        None => {
            let group = service.create_group(Some(user), "Demo consultation", None, false)?;
            service.select_group(Some(&group.id))?;
            group.id
        }
    };
    service.join_group(Some(user), &group_id)?;
    info!(group_id = %group_id, "Session started");

    // Three sends in flight at once; they confirm in submission order.
    let (a, b, c) = tokio::join!(
        service.send_message(Some(user), &group_id, "Our VPN drops every few minutes.", None),
        service.send_message(Some(user), &group_id, "It started after yesterday's update.", None),
        service.send_message(Some(user), &group_id, "Is anyone else affected?", None),
    );
    let mut parent = None;
    for result in [a, b, c] {
        match result {
            Ok(id) => {
                outcome.confirmed += 1;
                parent.get_or_insert(id);
            }
            Err(e) => {
                outcome.rolled_back += 1;
                warn!(error = %e, "Send rolled back");
            }
        }
    }

    if let Some(parent) = parent {
        let thread = service.create_thread(&parent, &group_id, Some("VPN drops"))?;
        service.select_thread(Some(&thread.id))?;
        match service
            .send_message(Some(user), &group_id, "Attaching the client log.", Some(&thread.id))
            .await
        {
            Ok(_) => outcome.confirmed += 1,
            Err(e) => {
                outcome.rolled_back += 1;
                warn!(error = %e, "Thread reply rolled back");
            }
        }
    }

    let files = [
        UploadFile::new("vpn-client.log", "text/plain", "12:01 tunnel reset\n12:04 tunnel reset\n"),
        UploadFile::new("network.png", "image/png", &b"\x89PNG\r\n\x1a\n"[..]),
    ];
    let batch = service
        .upload_files(Some(user), &files, &group_id, None)
        .await?;
    for failed in &batch.failed {
        warn!(file_name = %failed.file_name, error = %failed.error, "Upload failed");
    }
    outcome.uploaded = batch.uploaded.len();

    match service
        .create_meeting(
            Some(user),
            "VPN troubleshooting",
            30,
            &group_id,
            None,
            Some("Walk through the client settings together"),
        )
        .await
    {
        Ok(meeting) => info!(join_url = %meeting.join_url, "Meeting scheduled"),
        Err(e) => warn!(error = %e, "Meeting could not be scheduled"),
    }

    match service
        .connect_folder(Some(user), "drive", "IT handbook", "/it/handbook")
        .await
    {
        Ok(folder) => {
            let root = service
                .get_folder_items(&folder.id, None)
                .await
                .context("listing folder root")?;
            outcome.folder_items += root.len();
            for item in root.iter().filter(|i| i.size.is_none()) {
                let children = service
                    .get_folder_items(&folder.id, Some(&item.id))
                    .await
                    .with_context(|| format!("listing {}", item.name))?;
                outcome.folder_items += children.len();
            }
        }
        Err(e) => warn!(error = %e, "Folder connection failed"),
    }

    service.mark_read(Some(user), &group_id)?;
    info!(?outcome, "Session finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_chat::{ChatConfig, Latencies};
    use consult_store::EntityStore;

    fn instant_config() -> ChatConfig {
        ChatConfig {
            latencies: Latencies::zero(),
            ..ChatConfig::default()
        }
    }

    #[tokio::test]
    async fn test_scenario_on_seeded_state() {
        let user = UserContext::new("u-1", "Aiko");
        let state = consult_chat::seed::demo_state(&user, chrono::Utc::now());
        let service = ChatService::builder(instant_config())
            .store(EntityStore::with_state(state))
            .build();

        let outcome = run(&service, &user).await.unwrap();
        assert_eq!(outcome.confirmed, 4);
        assert_eq!(outcome.rolled_back, 0);
        assert_eq!(outcome.uploaded, 2);
        assert_eq!(outcome.folder_items, 5);

        let snapshot = service.snapshot();
        assert!(snapshot.messages.iter().all(|m| !m.optimistic));
        assert_eq!(snapshot.threads.len(), 1);
        assert_eq!(snapshot.threads[0].message_count, 1);
        assert!(!service.is_loading());
        assert!(!service.is_connecting());
    }

    #[tokio::test]
    async fn test_scenario_on_empty_state() {
        let user = UserContext::new("u-1", "Aiko");
        let service = ChatService::new(instant_config());

        run(&service, &user).await.unwrap();
        assert_eq!(service.groups().len(), 1);
        assert_eq!(
            service.current_group().map(|g| g.name),
            Some("Demo consultation".to_string())
        );
    }

    #[tokio::test]
    async fn test_scenario_survives_failures() {
        let user = UserContext::new("u-1", "Aiko");
        let config = ChatConfig {
            failure_rate: 1.0,
            ..instant_config()
        };
        let service = ChatService::new(config);

        let outcome = run(&service, &user).await.unwrap();
        assert_eq!(outcome.confirmed, 0);
        assert_eq!(outcome.rolled_back, 3);
        assert_eq!(outcome.uploaded, 0);
        assert!(service
            .snapshot()
            .messages
            .is_empty());
    }
}
