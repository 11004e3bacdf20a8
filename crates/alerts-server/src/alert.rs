//! Alert model, request validation, and the three store-backed operations.

use crate::error::{AlertError, Result};
use crate::store::{Item, ItemKey, KvStore, PARTITION_KEY, SORT_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USER_PREFIX: &str = "USER#";
pub const ALERT_PREFIX: &str = "ALERT#";

pub const MSG_CREATE_REQUIRED: &str = "userId, type, and message are required";
pub const MSG_INVALID_TYPE: &str = "type must be INFO, WARNING, or CRITICAL";
pub const MSG_USER_ID_REQUIRED: &str = "userId query parameter is required";
pub const MSG_READ_REQUIRED: &str = "read field is required";
pub const MSG_READ_NOT_BOOL: &str = "read must be a boolean";
pub const MSG_NOT_FOUND: &str = "Alert not found";
pub const MSG_INVALID_JSON: &str = "request body must be valid JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Info,
    Warning,
    Critical,
}

impl std::str::FromStr for AlertType {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(AlertError::Validation(MSG_INVALID_TYPE.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub message: String,
    pub created_at: String,
    pub read: bool,
}

impl Alert {
    pub fn new(user_id: String, kind: AlertType, message: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            kind,
            message,
            created_at: chrono::Utc::now().to_rfc3339(),
            read: false,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(user_pk(&self.user_id), alert_sk(&self.id))
    }

    /// The stored form: the public fields plus `PK`/`SK`.
    pub fn to_item(&self) -> Result<Item> {
        let mut item = match serde_json::to_value(self)? {
            Value::Object(item) => item,
            _ => Item::new(),
        };
        let key = self.key();
        item.insert(PARTITION_KEY.to_string(), Value::String(key.pk));
        item.insert(SORT_KEY.to_string(), Value::String(key.sk));
        Ok(item)
    }
}

pub fn user_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

pub fn alert_sk(alert_id: &str) -> String {
    format!("{ALERT_PREFIX}{alert_id}")
}

/// Drop the store key attributes from an item.
pub fn public_view(mut item: Item) -> Value {
    item.remove(PARTITION_KEY);
    item.remove(SORT_KEY);
    Value::Object(item)
}

/// Parse a raw request body. An empty body is treated as `{}`.
pub fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|_| AlertError::Validation(MSG_INVALID_JSON.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub user_id: String,
    pub kind: AlertType,
    pub message: String,
}

impl NewAlert {
    /// `userId`, `type` and `message` must be non-empty strings; `type` must
    /// be one of the known alert types.
    pub fn from_json(body: &Value) -> Result<Self> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (Some(user_id), Some(kind), Some(message)) =
            (field("userId"), field("type"), field("message"))
        else {
            return Err(AlertError::Validation(MSG_CREATE_REQUIRED.to_string()));
        };
        Ok(Self {
            user_id,
            kind: kind.parse()?,
            message,
        })
    }
}

pub fn read_flag(body: &Value) -> Result<bool> {
    match body.get("read") {
        None => Err(AlertError::Validation(MSG_READ_REQUIRED.to_string())),
        Some(Value::Bool(read)) => Ok(*read),
        Some(_) => Err(AlertError::Validation(MSG_READ_NOT_BOOL.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub fn create(store: &dyn KvStore, body: &Value) -> Result<Value> {
    let new = NewAlert::from_json(body)?;
    let alert = Alert::new(new.user_id, new.kind, new.message);
    store.put(alert.to_item()?)?;
    tracing::info!(id = %alert.id, user = %alert.user_id, "alert created");
    Ok(serde_json::to_value(&alert)?)
}

pub fn list(store: &dyn KvStore, user_id: Option<&str>) -> Result<Vec<Value>> {
    let user_id = user_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AlertError::Validation(MSG_USER_ID_REQUIRED.to_string()))?;
    Ok(store
        .query(&user_pk(user_id), ALERT_PREFIX)?
        .into_iter()
        .map(public_view)
        .collect())
}

/// Find the alert by id (a scan over sort keys, since the owning user is not
/// part of the request), set `read`, and return the stored result.
pub fn mark_read(store: &dyn KvStore, alert_id: &str, body: &Value) -> Result<Value> {
    let read = read_flag(body)?;
    let not_found = || AlertError::NotFound(MSG_NOT_FOUND.to_string());

    let found = store.scan_sort_key(&alert_sk(alert_id))?;
    let item = found.first().ok_or_else(not_found)?;
    let key = ItemKey::of(item)?;

    if !store.update(&key, "read", Value::Bool(read))? {
        return Err(not_found());
    }
    let updated = store.get(&key)?.ok_or_else(not_found)?;
    tracing::info!(id = %alert_id, read, "alert updated");
    Ok(public_view(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn create_one(store: &MemoryStore, user: &str) -> Value {
        create(
            store,
            &json!({"userId": user, "type": "INFO", "message": "hello"}),
        )
        .unwrap()
    }

    #[test]
    fn create_returns_public_alert() {
        let store = MemoryStore::new();
        let alert = create_one(&store, "u1");
        assert_eq!(alert["userId"], "u1");
        assert_eq!(alert["type"], "INFO");
        assert_eq!(alert["read"], false);
        assert!(alert.get("PK").is_none());
        assert!(alert.get("SK").is_none());
        assert!(!alert["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn create_stores_keyed_item() {
        let store = MemoryStore::new();
        let alert = create_one(&store, "u1");
        let id = alert["id"].as_str().unwrap();
        let key = ItemKey::new("USER#u1", format!("ALERT#{id}"));
        let item = store.get(&key).unwrap().unwrap();
        assert_eq!(item["message"], "hello");
    }

    #[test]
    fn ids_are_fresh() {
        let store = MemoryStore::new();
        let a = create_one(&store, "u1");
        let b = create_one(&store, "u1");
        assert_ne!(a["id"], b["id"]);
    }

    #[test]
    fn missing_or_empty_fields_rejected() {
        for body in [
            json!({"userId": "u1"}),
            json!({"userId": "", "type": "INFO", "message": "m"}),
            json!({"userId": "u1", "type": "INFO", "message": null}),
            json!([1, 2]),
        ] {
            let err = NewAlert::from_json(&body).unwrap_err();
            assert_eq!(err.to_string(), MSG_CREATE_REQUIRED);
        }
    }

    #[test]
    fn unknown_type_rejected() {
        let err =
            NewAlert::from_json(&json!({"userId": "u", "type": "BOGUS", "message": "m"}))
                .unwrap_err();
        assert!(matches!(err, AlertError::Validation(_)));
        assert!(err.to_string().contains("type must be"));
    }

    #[test]
    fn list_requires_user_id() {
        let store = MemoryStore::new();
        for user in [None, Some("")] {
            let err = list(&store, user).unwrap_err();
            assert_eq!(err.to_string(), MSG_USER_ID_REQUIRED);
        }
    }

    #[test]
    fn list_is_scoped_to_user() {
        let store = MemoryStore::new();
        create_one(&store, "u1");
        create_one(&store, "u1");
        create_one(&store, "u2");
        let alerts = list(&store, Some("u1")).unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a["userId"] == "u1" && a.get("PK").is_none()));
    }

    #[test]
    fn mark_read_updates_flag() {
        let store = MemoryStore::new();
        let alert = create_one(&store, "u1");
        let id = alert["id"].as_str().unwrap();
        let updated = mark_read(&store, id, &json!({"read": true})).unwrap();
        assert_eq!(updated["read"], true);
        assert_eq!(updated["id"], alert["id"]);
        assert!(updated.get("SK").is_none());
    }

    #[test]
    fn mark_read_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = mark_read(&store, "missing", &json!({"read": true})).unwrap_err();
        assert!(matches!(err, AlertError::NotFound(_)));
    }

    #[test]
    fn read_flag_validation() {
        assert_eq!(
            read_flag(&json!({})).unwrap_err().to_string(),
            MSG_READ_REQUIRED
        );
        assert_eq!(
            read_flag(&json!({"read": "yes"})).unwrap_err().to_string(),
            MSG_READ_NOT_BOOL
        );
        assert!(!read_flag(&json!({"read": false})).unwrap());
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"{\"a\":1}").unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_body(b"{not json").unwrap_err().to_string(),
            MSG_INVALID_JSON
        );
    }
}
