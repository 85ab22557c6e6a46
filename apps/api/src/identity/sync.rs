//! Applies identity-provider user events to the `users` table.
//!
//! Every event is idempotent: creates and updates are upserts, and deleting
//! an unknown user is a no-op, so redelivered webhooks are harmless.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::UserProfileSync;
use crate::store::Store;

/// Envelope of a provider webhook.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: Option<String>,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedPayload {
    id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    Created(UserProfileSync),
    Updated(UserProfileSync),
    Deleted(Option<String>),
    Ignored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Upserted(String),
    Deleted(String),
    Unchanged,
}

impl IdentityEvent {
    pub fn parse(event: WebhookEvent) -> Result<Self, AppError> {
        match event.event_type.as_str() {
            "user.created" => Ok(IdentityEvent::Created(profile_from(event.data)?)),
            "user.updated" => Ok(IdentityEvent::Updated(profile_from(event.data)?)),
            "user.deleted" => {
                let payload: DeletedPayload = serde_json::from_value(event.data)
                    .map_err(|e| AppError::Validation(format!("Invalid user.deleted payload: {e}")))?;
                Ok(IdentityEvent::Deleted(payload.id))
            }
            _ => Ok(IdentityEvent::Ignored(event.event_type)),
        }
    }
}

fn profile_from(data: serde_json::Value) -> Result<UserProfileSync, AppError> {
    let payload: UserPayload = serde_json::from_value(data)
        .map_err(|e| AppError::Validation(format!("Invalid user payload: {e}")))?;

    let primary = payload.primary_email_address_id.as_deref();
    let email = payload
        .email_addresses
        .iter()
        .find(|e| primary.is_some() && e.id.as_deref() == primary)
        .or_else(|| payload.email_addresses.first())
        .map(|e| e.email_address.clone())
        .ok_or_else(|| AppError::Validation(format!("User {} has no email address", payload.id)))?;

    let name = format!(
        "{} {}",
        payload.first_name.unwrap_or_default(),
        payload.last_name.unwrap_or_default()
    )
    .trim()
    .to_string();

    Ok(UserProfileSync {
        id: payload.id,
        name,
        email,
        image: payload.image_url.unwrap_or_default(),
    })
}

pub async fn apply_event(store: &dyn Store, event: IdentityEvent) -> Result<SyncOutcome, AppError> {
    match event {
        IdentityEvent::Created(profile) | IdentityEvent::Updated(profile) => {
            let user = store.upsert_user(profile).await?;
            info!("User synced: {}", user.id);
            Ok(SyncOutcome::Upserted(user.id))
        }
        IdentityEvent::Deleted(Some(id)) => {
            if store.delete_user(&id).await? {
                info!("User deleted: {id}");
                Ok(SyncOutcome::Deleted(id))
            } else {
                info!("User delete for unknown id {id} ignored");
                Ok(SyncOutcome::Unchanged)
            }
        }
        IdentityEvent::Deleted(None) => Ok(SyncOutcome::Unchanged),
        IdentityEvent::Ignored(event_type) => {
            info!("Received unhandled webhook event: {event_type}");
            Ok(SyncOutcome::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn event(event_type: &str, data: serde_json::Value) -> IdentityEvent {
        IdentityEvent::parse(WebhookEvent {
            event_type: event_type.to_string(),
            data,
        })
        .unwrap()
    }

    fn created(id: &str, email: &str) -> IdentityEvent {
        event(
            "user.created",
            json!({
                "id": id,
                "email_addresses": [{ "id": "idn_1", "email_address": email }],
                "first_name": "Ada",
                "last_name": "Lovelace",
                "image_url": "https://img.example/ada.png"
            }),
        )
    }

    #[test]
    fn test_parse_builds_trimmed_name() {
        let parsed = event(
            "user.updated",
            json!({
                "id": "user_1",
                "email_addresses": [{ "email_address": "a@example.com" }],
                "first_name": "Ada",
                "last_name": null
            }),
        );
        let IdentityEvent::Updated(profile) = parsed else {
            panic!("expected an update");
        };
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.image, "");
    }

    #[test]
    fn test_parse_prefers_primary_email() {
        let parsed = event(
            "user.created",
            json!({
                "id": "user_1",
                "primary_email_address_id": "idn_2",
                "email_addresses": [
                    { "id": "idn_1", "email_address": "old@example.com" },
                    { "id": "idn_2", "email_address": "main@example.com" }
                ]
            }),
        );
        let IdentityEvent::Created(profile) = parsed else {
            panic!("expected a create");
        };
        assert_eq!(profile.email, "main@example.com");
    }

    #[test]
    fn test_user_without_email_is_invalid() {
        let result = IdentityEvent::parse(WebhookEvent {
            event_type: "user.created".to_string(),
            data: json!({ "id": "user_1", "email_addresses": [] }),
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert_eq!(
            event("session.created", json!({})),
            IdentityEvent::Ignored("session.created".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = MemoryStore::new();
        apply_event(&store, created("user_1", "ada@example.com"))
            .await
            .unwrap();
        apply_event(&store, created("user_1", "ada@example.com"))
            .await
            .unwrap();

        let user = store.find_user("user_1").await.unwrap().unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.resume, None);
    }

    #[tokio::test]
    async fn test_update_keeps_resume() {
        let store = MemoryStore::new();
        apply_event(&store, created("user_1", "ada@example.com"))
            .await
            .unwrap();
        store
            .set_user_resume("user_1", "https://cdn.example/cv.pdf")
            .await
            .unwrap();

        let update = event(
            "user.updated",
            json!({
                "id": "user_1",
                "email_addresses": [{ "email_address": "ada@new.example" }],
                "first_name": "Ada",
                "last_name": "King"
            }),
        );
        apply_event(&store, update).await.unwrap();

        let user = store.find_user("user_1").await.unwrap().unwrap();
        assert_eq!(user.email, "ada@new.example");
        assert_eq!(user.name, "Ada King");
        assert_eq!(user.resume.as_deref(), Some("https://cdn.example/cv.pdf"));
    }

    #[tokio::test]
    async fn test_delete_twice_is_harmless() {
        let store = MemoryStore::new();
        apply_event(&store, created("user_1", "ada@example.com"))
            .await
            .unwrap();

        let delete = || event("user.deleted", json!({ "id": "user_1", "deleted": true }));
        assert_eq!(
            apply_event(&store, delete()).await.unwrap(),
            SyncOutcome::Deleted("user_1".to_string())
        );
        assert_eq!(
            apply_event(&store, delete()).await.unwrap(),
            SyncOutcome::Unchanged
        );
        assert!(store.find_user("user_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_without_id_is_noop() {
        let store = MemoryStore::new();
        let outcome = apply_event(&store, event("user.deleted", json!({})))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
    }
}
