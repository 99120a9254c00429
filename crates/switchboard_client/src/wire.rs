//! Request and response types for the agent API.
//!
//! The remote payloads are loosely typed (ids arrive as strings or numbers,
//! results may or may not be wrapped in a `data` envelope), so responses are
//! decoded into `serde_json::Value` first and normalized here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Remote project identifier.
pub type ProjectId = u64;

/// A freshly opened conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Remote conversation id, when the service reports one.
    pub id: Option<String>,
    /// Session identifier used in subsequent message calls.
    pub session_id: String,
    pub name: Option<String>,
}

/// A generated agent reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Option<String>,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub conversation_id: Option<String>,
}

/// A prompt to post into a project session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub project_id: ProjectId,
    pub session_id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_persona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatbot_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_context: Option<String>,
}

impl SendMessage {
    pub fn new(
        project_id: ProjectId,
        session_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            session_id: session_id.into(),
            prompt: prompt.into(),
            custom_persona: None,
            chatbot_model: None,
            response_source: None,
            custom_context: None,
        }
    }

    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.custom_persona = Some(persona.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.chatbot_model = Some(model.into());
        self
    }

    pub fn response_source(mut self, source: impl Into<String>) -> Self {
        self.response_source = Some(source.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.custom_context = Some(context.into());
        self
    }

    /// Form fields for the multipart encoding, in a stable order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("prompt", self.prompt.clone())];
        let optional = [
            ("custom_persona", &self.custom_persona),
            ("chatbot_model", &self.chatbot_model),
            ("response_source", &self.response_source),
            ("custom_context", &self.custom_context),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                fields.push((name, v.clone()));
            }
        }
        fields
    }

    /// JSON body for the JSON encoding.
    pub fn json_body(&self) -> Value {
        let mut body = serde_json::Map::new();
        for (name, value) in self.form_fields() {
            body.insert(name.to_string(), Value::String(value));
        }
        Value::Object(body)
    }
}

/// How prompts are encoded on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageEncoding {
    #[default]
    Json,
    Multipart,
}

/// Sort order for paginated listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> ClientResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ClientError::InvalidArgument(format!(
                "order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// Query parameters for listing conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConversations {
    pub page: u32,
    pub order: SortOrder,
    pub order_by: String,
    pub user_filter: String,
    pub name: Option<String>,
}

impl Default for ListConversations {
    fn default() -> Self {
        Self {
            page: 1,
            order: SortOrder::Desc,
            order_by: "id".to_string(),
            user_filter: "all".to_string(),
            name: None,
        }
    }
}

impl ListConversations {
    /// Query string pairs in the order the service documents them.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("order", self.order.to_string()),
            ("order_by", self.order_by.clone()),
            ("user_filter", self.user_filter.clone()),
        ];
        if let Some(name) = &self.name {
            query.push(("name", name.clone()));
        }
        query
    }

    /// Reject parameters the service would refuse anyway.
    pub fn validate(&self) -> ClientResult<()> {
        if self.page == 0 {
            return Err(ClientError::InvalidArgument("page must be at least 1".to_string()));
        }
        if self.order_by.trim().is_empty() {
            return Err(ClientError::InvalidArgument("order_by must not be empty".to_string()));
        }
        if self.user_filter.trim().is_empty() {
            return Err(ClientError::InvalidArgument("user_filter must not be empty".to_string()));
        }
        if matches!(&self.name, Some(n) if n.is_empty()) {
            return Err(ClientError::InvalidArgument("name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// A single page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: Option<u64>,
    pub last_page: Option<u64>,
    pub total: Option<u64>,
}

/// A stored prompt/reply pair inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub id: Option<String>,
    pub user_query: Option<String>,
    pub reply: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Strip the `{"status": ..., "data": ...}` envelope if present.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").map_or(false, Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode the payload of a create-conversation call.
pub fn parse_conversation(value: Value) -> ClientResult<Conversation> {
    let data = unwrap_data(value);
    let session_id = field_string(&data, &["session_id", "sessionId"]).ok_or_else(|| {
        ClientError::ResponseShape("conversation payload has no session_id".to_string())
    })?;

    Ok(Conversation {
        id: field_string(&data, &["id"]),
        session_id,
        name: field_string(&data, &["name"]),
    })
}

/// Decode the payload of a send-message call.
pub fn parse_reply(value: Value) -> ClientResult<Reply> {
    let data = unwrap_data(value);
    let message = field_string(&data, &["openai_response", "message", "response"])
        .ok_or_else(|| {
            ClientError::ResponseShape("message payload has no openai_response".to_string())
        })?;

    Ok(Reply {
        id: field_string(&data, &["id"]),
        message,
        created_at: data.get("created_at").and_then(parse_timestamp),
        conversation_id: field_string(&data, &["conversation_id", "session_id"]),
    })
}

/// Decode a conversation listing. Entries without a session id are skipped.
pub fn parse_conversation_page(value: Value) -> ClientResult<Page<Conversation>> {
    let data = unwrap_data(value);
    if !data.is_object() {
        return Err(ClientError::ResponseShape(
            "conversation listing is not a JSON object".to_string(),
        ));
    }

    let items = page_items(&data)
        .iter()
        .filter_map(|item| parse_conversation(item.clone()).ok())
        .collect();

    Ok(page_of(&data, items))
}

/// Decode a message listing for one conversation.
pub fn parse_message_page(value: Value) -> ClientResult<Page<MessageRecord>> {
    let data = unwrap_data(value);
    if !data.is_object() {
        return Err(ClientError::ResponseShape(
            "message listing is not a JSON object".to_string(),
        ));
    }

    // Messages are nested under `messages`, either bare or paginated.
    let container = data.get("messages").cloned().unwrap_or(Value::Null);
    let source = if container.is_object() { &container } else { &data };
    let list = match &container {
        Value::Array(items) => items.clone(),
        _ => page_items(source).to_vec(),
    };

    let items = list
        .iter()
        .map(|item| MessageRecord {
            id: field_string(item, &["id"]),
            user_query: field_string(item, &["user_query", "prompt"]),
            reply: field_string(item, &["openai_response", "response"]),
            created_at: item.get("created_at").and_then(parse_timestamp),
        })
        .collect();

    Ok(page_of(source, items))
}

fn page_items(data: &Value) -> &[Value] {
    data.get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn page_of<T>(data: &Value, items: Vec<T>) -> Page<T> {
    Page {
        items,
        current_page: data.get("current_page").and_then(Value::as_u64),
        last_page: data.get("last_page").and_then(Value::as_u64),
        total: data.get("total").and_then(Value::as_u64),
    }
}

/// First present field among `keys`, rendered as a string. Numbers are accepted.
fn field_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts RFC 3339 and the service's `YYYY-MM-DD HH:MM:SS` (UTC) format.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_conversation_with_envelope() {
        let payload = json!({
            "status": "success",
            "data": {"id": 991, "session_id": "abc-123", "name": "Support"}
        });
        let conversation = parse_conversation(payload).unwrap();
        assert_eq!(conversation.session_id, "abc-123");
        assert_eq!(conversation.id.as_deref(), Some("991"));
        assert_eq!(conversation.name.as_deref(), Some("Support"));
    }

    #[test]
    fn test_parse_conversation_missing_session() {
        let err = parse_conversation(json!({"data": {"id": 1}})).unwrap_err();
        assert!(matches!(err, ClientError::ResponseShape(_)));
    }

    #[test]
    fn test_parse_reply() {
        let payload = json!({
            "data": {
                "id": 42,
                "conversation_id": 7,
                "openai_response": "The office opens at 9.",
                "created_at": "2024-03-01 08:30:00"
            }
        });
        let reply = parse_reply(payload).unwrap();
        assert_eq!(reply.message, "The office opens at 9.");
        assert_eq!(reply.id.as_deref(), Some("42"));
        assert_eq!(reply.conversation_id.as_deref(), Some("7"));
        assert_eq!(
            reply.created_at.unwrap().to_rfc3339(),
            "2024-03-01T08:30:00+00:00"
        );
    }

    #[test]
    fn test_parse_reply_accepts_message_alias() {
        let payload = json!({"message": "hi", "created_at": "2024-03-01T08:30:00Z"});
        let reply = parse_reply(payload).unwrap();
        assert_eq!(reply.message, "hi");
        assert!(reply.created_at.is_some());
        assert!(reply.id.is_none());
    }

    #[test]
    fn test_parse_reply_missing_text() {
        let err = parse_reply(json!({"data": {"id": 1}})).unwrap_err();
        assert!(matches!(err, ClientError::ResponseShape(_)));
    }

    #[test]
    fn test_parse_conversation_page() {
        let payload = json!({
            "status": "success",
            "data": {
                "current_page": 2,
                "last_page": 5,
                "total": 48,
                "data": [
                    {"id": 1, "session_id": "s-1", "name": "weekly"},
                    {"id": 2, "name": "broken"}
                ]
            }
        });
        let page = parse_conversation_page(payload).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].session_id, "s-1");
        assert_eq!(page.current_page, Some(2));
        assert_eq!(page.last_page, Some(5));
        assert_eq!(page.total, Some(48));
    }

    #[test]
    fn test_parse_message_page_shapes() {
        let bare = parse_message_page(json!({"messages": []})).unwrap();
        assert!(bare.items.is_empty());

        let nested = parse_message_page(json!({
            "data": {
                "conversation": {"id": 3},
                "messages": {
                    "current_page": 1,
                    "data": [{"id": 5, "user_query": "hi", "openai_response": "hello"}]
                }
            }
        }))
        .unwrap();
        assert_eq!(nested.items.len(), 1);
        assert_eq!(nested.items[0].reply.as_deref(), Some("hello"));
        assert_eq!(nested.current_page, Some(1));
    }

    #[test]
    fn test_parse_message_page_rejects_non_object() {
        let err = parse_message_page(json!(["unexpected"])).unwrap_err();
        assert!(matches!(err, ClientError::ResponseShape(_)));
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!(matches!(
            "invalid".parse::<SortOrder>(),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_list_query_and_validation() {
        let params = ListConversations {
            page: 3,
            order: SortOrder::Asc,
            order_by: "updated_at".to_string(),
            user_filter: "mine".to_string(),
            name: Some("weekly".to_string()),
        };
        assert!(params.validate().is_ok());
        let query = params.query();
        assert_eq!(query[0], ("page", "3".to_string()));
        assert_eq!(query[1], ("order", "asc".to_string()));
        assert_eq!(query[4], ("name", "weekly".to_string()));

        let zero = ListConversations {
            page: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_send_message_body() {
        let request = SendMessage::new(7, "s", "hello").persona("terse");
        let body = request.json_body();
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["custom_persona"], "terse");
        assert!(body.get("chatbot_model").is_none());
        assert_eq!(request.form_fields().len(), 2);
    }
}
