//! Integration tests for the scripted agent client.

use std::time::Duration;

use switchboard_client::{AgentClient, ClientError, MockAgentClient, SendMessage};

/// Test scripted replies are returned in order and the last one repeats.
#[tokio::test]
async fn test_mock_client_sequential_replies() {
    let client = MockAgentClient::new()
        .with_reply(7, "first")
        .with_reply(7, "second");

    let conversation = client.create_conversation(7, Some("demo".to_string())).await.unwrap();
    assert_eq!(conversation.name.as_deref(), Some("demo"));

    let request = SendMessage::new(7, conversation.session_id.clone(), "hi");
    assert_eq!(client.send_message(&request).await.unwrap().message, "first");
    assert_eq!(client.send_message(&request).await.unwrap().message, "second");
    assert_eq!(client.send_message(&request).await.unwrap().message, "second");
}

/// Test unscripted projects answer with a default reply.
#[tokio::test]
async fn test_mock_client_default_reply() {
    let client = MockAgentClient::new();
    let reply = client
        .send_message(&SendMessage::new(11, "s", "hello"))
        .await
        .unwrap();

    assert_eq!(reply.message, "reply from project 11");
    assert_eq!(reply.conversation_id.as_deref(), Some("s"));
    assert!(reply.created_at.is_some());
}

/// Test the mock captures every call detail.
#[tokio::test]
async fn test_mock_client_captures_calls() {
    let client = MockAgentClient::new();
    let conversation = client.create_conversation(3, None).await.unwrap();
    client
        .send_message(&SendMessage::new(3, conversation.session_id.clone(), "where is the park?"))
        .await
        .unwrap();

    assert_eq!(client.conversation_count(3), 1);
    let sent = client.messages_to(3);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].prompt.as_deref(), Some("where is the park?"));
    assert_eq!(sent[0].session_id.as_deref(), Some(conversation.session_id.as_str()));

    client.clear_calls();
    assert!(client.get_calls().is_empty());
}

/// Test simulated failures.
#[tokio::test]
async fn test_mock_client_failures() {
    let client = MockAgentClient::new()
        .with_failure(5, "agent offline")
        .with_conversation_failure(6, "project archived");

    let err = client
        .send_message(&SendMessage::new(5, "s", "hi"))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert!(err.to_string().contains("agent offline"));

    let err = client.create_conversation(6, None).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 503, .. }));
}

/// Test latency is applied before replying.
#[tokio::test]
async fn test_mock_client_latency() {
    let client = MockAgentClient::new().with_latency(9, Duration::from_millis(50));
    let started = std::time::Instant::now();

    client
        .send_message(&SendMessage::new(9, "s", "slow"))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
}
