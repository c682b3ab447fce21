//! Ticket model and related functionality

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys the backend owns; callers cannot set them through free-form fields
const RESERVED_KEYS: [&str; 5] = ["id", "title", "status", "createdAt", "updatedAt"];

/// Shallow JSON patch applied by `update`
pub type TicketPatch = Map<String, Value>;

/// Ticket entity
///
/// Besides the fixed fields a ticket carries whatever extra fields the caller
/// supplied, e.g. `description` or `priority`; they are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub status: String,
    /// Creation time as epoch milliseconds
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ticket {
    /// Merge `patch` into a copy of this ticket and stamp `updatedAt`
    ///
    /// `id` and `createdAt` cannot be patched. `title` and `status` must stay
    /// non-empty strings.
    pub fn patched(&self, patch: &TicketPatch, now_millis: i64) -> Result<Ticket, String> {
        let mut merged = self.clone();

        for (key, value) in patch {
            match key.as_str() {
                "id" | "createdAt" | "updatedAt" => {}
                "title" => merged.title = required_text(value)?,
                "status" => merged.status = required_text(value)?,
                _ => {
                    merged.extra.insert(key.clone(), value.clone());
                }
            }
        }

        merged.updated_at = Some(now_millis);
        Ok(merged)
    }
}

fn required_text(value: &Value) -> Result<String, String> {
    match value.as_str() {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err("Validation error".to_string()),
    }
}

/// Ticket creation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewTicket {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            status: Some(status.into()),
            extra: Map::new(),
        }
    }

    /// Attach a free-form field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Title and status must both be present and non-empty
    pub fn validate(&self) -> Result<(), String> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

        if !present(&self.title) || !present(&self.status) {
            return Err("Validation error".to_string());
        }

        Ok(())
    }

    /// Build the stored ticket; call `validate` first
    pub fn into_ticket(self, id: String, created_at: i64) -> Ticket {
        let mut extra = self.extra;
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

        Ticket {
            id,
            title: self.title.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            created_at,
            updated_at: None,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket() -> Ticket {
        NewTicket::new("Printer broken", "open")
            .with_field("priority", "high")
            .into_ticket("t_1".to_string(), 1)
    }

    #[test]
    fn test_wire_format_is_flat_camel_case() {
        let value = serde_json::to_value(ticket()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "t_1",
                "title": "Printer broken",
                "status": "open",
                "createdAt": 1,
                "priority": "high"
            })
        );

        let back: Ticket = serde_json::from_value(value).unwrap();
        assert_eq!(back, ticket());
    }

    #[test]
    fn test_new_ticket_drops_reserved_extra_fields() {
        let t = NewTicket::new("a", "open")
            .with_field("id", "forged")
            .with_field("createdAt", 0)
            .into_ticket("t_9".to_string(), 9);
        assert_eq!(t.id, "t_9");
        assert_eq!(t.created_at, 9);
        assert!(t.extra.is_empty());
    }

    #[test]
    fn test_validate_requires_title_and_status() {
        assert!(NewTicket::new("a", "open").validate().is_ok());
        assert!(NewTicket::new("", "open").validate().is_err());
        assert!(NewTicket::new("a", "").validate().is_err());
        assert!(NewTicket::default().validate().is_err());

        let parsed: NewTicket = serde_json::from_value(json!({ "title": "only title" })).unwrap();
        assert_eq!(parsed.validate(), Err("Validation error".to_string()));
    }

    #[test]
    fn test_patch_merges_shallowly() {
        let mut patch = TicketPatch::new();
        patch.insert("status".into(), json!("closed"));
        patch.insert("assignee".into(), json!({ "name": "Bo" }));
        patch.insert("id".into(), json!("t_other"));

        let updated = ticket().patched(&patch, 50).unwrap();
        assert_eq!(updated.id, "t_1");
        assert_eq!(updated.title, "Printer broken");
        assert_eq!(updated.status, "closed");
        assert_eq!(updated.extra["priority"], json!("high"));
        assert_eq!(updated.extra["assignee"], json!({ "name": "Bo" }));
        assert_eq!(updated.updated_at, Some(50));
    }

    #[test]
    fn test_patch_rejects_blank_title() {
        let mut patch = TicketPatch::new();
        patch.insert("title".into(), json!(""));
        assert!(ticket().patched(&patch, 2).is_err());

        patch.insert("title".into(), json!(3));
        assert!(ticket().patched(&patch, 2).is_err());
    }
}
