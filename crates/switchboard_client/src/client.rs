//! Agent API client.
//!
//! [`AgentClient`] is the seam the router talks through; [`CustomGptClient`]
//! implements it over HTTP against the hosted CustomGPT service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE,
};
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ClientSettings;
use crate::error::{ClientError, ClientResult};
use crate::wire::{
    self, Conversation, ListConversations, MessageEncoding, MessageRecord, Page, ProjectId, Reply,
    SendMessage, SortOrder,
};

/// Secondary header carrying the credential for deployments that ignore `Authorization`.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Operations the router needs from a conversational-agent backend.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Open a new session in a project.
    async fn create_conversation(
        &self,
        project_id: ProjectId,
        name: Option<String>,
    ) -> ClientResult<Conversation>;

    /// Post a prompt to a project session and return the generated reply.
    async fn send_message(&self, request: &SendMessage) -> ClientResult<Reply>;
}

/// Body kinds an outbound request can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    Json,
    Multipart,
}

enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

impl RequestBody {
    fn kind(&self) -> BodyKind {
        match self {
            Self::Empty => BodyKind::Empty,
            Self::Json(_) => BodyKind::Json,
            Self::Multipart(_) => BodyKind::Multipart,
        }
    }
}

/// Build the headers attached to every request.
///
/// Multipart bodies get no content type here so the transport can add one
/// with the generated boundary.
pub fn build_headers(api_key: &str, body: BodyKind) -> ClientResult<HeaderMap> {
    let invalid = |_: InvalidHeaderValue| {
        ClientError::Configuration("API key contains invalid characters".to_string())
    };
    let key = HeaderValue::from_str(api_key).map_err(invalid)?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid)?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(API_KEY_HEADER, key);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if body != BodyKind::Multipart {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(headers)
}

/// HTTP client for the hosted agent API.
pub struct CustomGptClient {
    api_key: String,
    base_url: String,
    encoding: MessageEncoding,
    http: reqwest::Client,
}

impl std::fmt::Debug for CustomGptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomGptClient")
            .field("base_url", &self.base_url)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl CustomGptClient {
    /// Create a client from explicit settings. Fails fast without a credential.
    pub fn new(settings: &ClientSettings) -> ClientResult<Self> {
        if !settings.has_api_key() {
            return Err(ClientError::Configuration(
                "an API key is required to talk to the agent service".to_string(),
            ));
        }
        let url = reqwest::Url::parse(&settings.api_base).map_err(|e| {
            ClientError::Configuration(format!("invalid API base '{}': {}", settings.api_base, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "API base must use http or https, got '{}'",
                settings.api_base
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            api_key: settings.api_key.clone(),
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            encoding: MessageEncoding::Json,
            http,
        })
    }

    /// Create a client from `CUSTOMGPT_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(&ClientSettings::from_env())
    }

    /// Select how prompts are encoded when sending messages.
    pub fn with_encoding(mut self, encoding: MessageEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn encoding(&self) -> MessageEncoding {
        self.encoding
    }

    /// Absolute URL for an API path such as `/projects/1/conversations`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// List conversations in a project, one page at a time.
    pub async fn list_conversations(
        &self,
        project_id: ProjectId,
        params: &ListConversations,
    ) -> ClientResult<Page<Conversation>> {
        params.validate()?;
        let path = format!("/projects/{}/conversations", project_id);
        let value = self
            .execute(Method::GET, &path, &params.query(), RequestBody::Empty)
            .await?;
        wire::parse_conversation_page(value)
    }

    /// Fetch the stored messages of one conversation.
    ///
    /// `order` must be `asc` or `desc`; anything else is rejected before a
    /// request is made.
    pub async fn get_conversation_messages(
        &self,
        project_id: ProjectId,
        session_id: &str,
        page: u32,
        order: &str,
    ) -> ClientResult<Page<MessageRecord>> {
        let order: SortOrder = order.parse()?;
        if page == 0 {
            return Err(ClientError::InvalidArgument("page must be at least 1".to_string()));
        }
        let path = format!("/projects/{}/conversations/{}/messages", project_id, session_id);
        let query = [("page", page.to_string()), ("order", order.to_string())];
        let value = self
            .execute(Method::GET, &path, &query, RequestBody::Empty)
            .await?;
        wire::parse_message_page(value)
    }

    /// Rename a conversation. Returns the decoded response as-is.
    pub async fn update_conversation(
        &self,
        project_id: ProjectId,
        session_id: &str,
        name: Option<&str>,
    ) -> ClientResult<Value> {
        let path = format!("/projects/{}/conversations/{}", project_id, session_id);
        self.execute(Method::PUT, &path, &[], RequestBody::Json(json!({ "name": name })))
            .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
    ) -> ClientResult<Value> {
        let url = self.endpoint(path);
        let headers = build_headers(&self.api_key, body.kind())?;
        debug!(method = %method, url = %url, "Calling agent API");

        let mut request = self.http.request(method, &url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ClientError::ResponseShape(format!("response is not JSON: {}", e)))
    }
}

#[async_trait]
impl AgentClient for CustomGptClient {
    async fn create_conversation(
        &self,
        project_id: ProjectId,
        name: Option<String>,
    ) -> ClientResult<Conversation> {
        let path = format!("/projects/{}/conversations", project_id);
        let body = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        let value = self
            .execute(Method::POST, &path, &[], RequestBody::Json(body))
            .await?;
        let conversation = wire::parse_conversation(value)?;
        debug!(project_id, session_id = %conversation.session_id, "Conversation created");
        Ok(conversation)
    }

    async fn send_message(&self, request: &SendMessage) -> ClientResult<Reply> {
        let path = format!(
            "/projects/{}/conversations/{}/messages",
            request.project_id, request.session_id
        );
        let body = match self.encoding {
            MessageEncoding::Json => RequestBody::Json(request.json_body()),
            MessageEncoding::Multipart => {
                let form = request
                    .form_fields()
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                RequestBody::Multipart(form)
            }
        };
        let value = self.execute(Method::POST, &path, &[], body).await?;
        wire::parse_reply(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CustomGptClient {
        // Port 9 (discard) so any accidental request fails fast.
        CustomGptClient::new(&ClientSettings::new("secret").api_base("http://127.0.0.1:9/api/v1/"))
            .unwrap()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = CustomGptClient::new(&ClientSettings::new("")).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));

        let err = CustomGptClient::new(&ClientSettings::new("   ")).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_invalid_base_rejected() {
        let settings = ClientSettings::new("k").api_base("not a url");
        let err = CustomGptClient::new(&settings).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = client();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api/v1");
        assert_eq!(
            client.endpoint("/projects/42/conversations/session-1/messages"),
            "http://127.0.0.1:9/api/v1/projects/42/conversations/session-1/messages"
        );
    }

    #[test]
    fn test_json_headers() {
        let headers = build_headers("secret", BodyKind::Json).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[API_KEY_HEADER], "secret");
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_multipart_headers_leave_content_type_to_transport() {
        let headers = build_headers("secret", BodyKind::Multipart).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_key_characters() {
        let err = build_headers("bad\nkey", BodyKind::Empty).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_encoding_selection() {
        let client = client().with_encoding(MessageEncoding::Multipart);
        assert_eq!(client.encoding(), MessageEncoding::Multipart);
    }

    #[tokio::test]
    async fn test_invalid_order_rejected_before_request() {
        let err = client()
            .get_conversation_messages(1, "abc", 1, "invalid")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_invalid_listing_rejected_before_request() {
        let params = ListConversations {
            page: 0,
            ..Default::default()
        };
        let err = client().list_conversations(1, &params).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_network_error_surfaces_as_transport() {
        let err = client().create_conversation(1, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
