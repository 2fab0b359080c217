//! Unchained Engine client
//!
//! Logs in through the GraphQL API and submits events to the bulk-import
//! endpoint. Submissions are not retried: a failed batch is retried by
//! re-running the sync.

use super::target::{EventAck, SubmissionReceipt, TargetApi};
use crate::config::UnchainedConfig;
use crate::domain::errors::TargetError;
use crate::domain::event::Event;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const LOGIN_MUTATION: &str = "mutation login($email: String!, $password: String) {\n  loginWithPassword(email: $email, plainPassword: $password) {\n    token\n  }\n}\n";

/// Unchained Engine API client
pub struct UnchainedClient {
    client: Client,
    token: String,
    config: UnchainedConfig,
}

#[derive(Debug, Deserialize)]
struct BulkImportResponse {
    #[serde(rename = "_id", default)]
    work_id: Option<String>,
    #[serde(default)]
    events: Option<Vec<EventAck>>,
}

impl UnchainedClient {
    /// Build the HTTP client and log in
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is unreachable or the login is refused.
    pub async fn connect(config: UnchainedConfig) -> Result<Self, TargetError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TargetError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        let token = login(&client, &config).await?;
        tracing::info!(endpoint = %config.endpoint, "Logged in to Unchained");

        Ok(Self {
            client,
            token,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TargetApi for UnchainedClient {
    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn submit_events(&self, events: &[Event]) -> Result<SubmissionReceipt, TargetError> {
        let resp = self
            .client
            .post(self.url("/bulk-import"))
            .header("Accept", "application/json")
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "events": events }))
            .send()
            .await
            .map_err(|e| TargetError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TargetError::RequestFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TargetError::InvalidResponse(e.to_string()))?;

        if let Some(message) = body.get("error").and_then(error_message) {
            return Err(TargetError::Rejected(message));
        }

        let parsed: BulkImportResponse = serde_json::from_value(body)
            .map_err(|e| TargetError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            count = events.len(),
            work_id = parsed.work_id.as_deref().unwrap_or("-"),
            "Submitted events to Unchained"
        );

        Ok(SubmissionReceipt {
            work_id: parsed.work_id,
            results: parsed.events,
        })
    }
}

/// Exchange e-mail and password for a login token
async fn login(client: &Client, config: &UnchainedConfig) -> Result<String, TargetError> {
    let url = format!("{}/graphql", config.endpoint.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .json(&serde_json::json!({
            "operationName": "login",
            "variables": {
                "email": config.email,
                "password": config.password.expose_secret().as_str(),
            },
            "query": LOGIN_MUTATION,
        }))
        .send()
        .await
        .map_err(|e| TargetError::ConnectionFailed(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(TargetError::AuthenticationFailed(format!(
            "Login failed with status {status}: {body}"
        )));
    }

    let body: Value = resp
        .json()
        .await
        .map_err(|e| TargetError::InvalidResponse(e.to_string()))?;

    body.pointer("/data/loginWithPassword/token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            let reason = body
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .unwrap_or("no token in response");
            TargetError::AuthenticationFailed(reason.to_string())
        })
}

fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(
            other
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::event::{Entity, Operation};
    use mockito::Matcher;
    use serde_json::json;

    fn config(endpoint: String) -> UnchainedConfig {
        UnchainedConfig {
            endpoint,
            email: "admin@example.com".to_string(),
            password: secret_string("pass".to_string()),
            timeout_seconds: 5,
        }
    }

    async fn mock_login(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "login",
                "variables": {"email": "admin@example.com", "password": "pass"}
            })))
            .with_status(200)
            .with_body(r#"{"data": {"loginWithPassword": {"token": "tok"}}}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_submit_events() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let bulk = server
            .mock("POST", "/bulk-import")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::PartialJson(json!({
                "events": [{"entity": "PRODUCT", "operation": "CREATE", "payload": {"_id": "p1"}}]
            })))
            .with_status(200)
            .with_body(r#"{"_id": "work-42", "type": "BULK_IMPORT"}"#)
            .create_async()
            .await;

        let client = UnchainedClient::connect(config(server.url())).await.unwrap();
        let events = vec![Event::new(Entity::Product, Operation::Create, json!({"_id": "p1"}))];
        let receipt = client.submit_events(&events).await.unwrap();

        bulk.assert_async().await;
        assert_eq!(receipt.work_id.as_deref(), Some("work-42"));
        assert_eq!(receipt.acknowledged(1), 1);
    }

    #[tokio::test]
    async fn test_submit_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _bulk = server
            .mock("POST", "/bulk-import")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = UnchainedClient::connect(config(server.url())).await.unwrap();
        let err = client.submit_events(&[]).await.unwrap_err();
        assert!(matches!(err, TargetError::RequestFailed { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_rejected_batch() {
        let mut server = mockito::Server::new_async().await;
        let _login = mock_login(&mut server).await;
        let _bulk = server
            .mock("POST", "/bulk-import")
            .with_status(200)
            .with_body(r#"{"error": {"message": "Invalid entity"}}"#)
            .create_async()
            .await;

        let client = UnchainedClient::connect(config(server.url())).await.unwrap();
        let err = client.submit_events(&[]).await.unwrap_err();
        assert!(matches!(err, TargetError::Rejected(ref m) if m == "Invalid entity"));
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data": {"loginWithPassword": null}, "errors": [{"message": "Invalid credentials"}]}"#)
            .create_async()
            .await;

        let result = UnchainedClient::connect(config(server.url())).await;
        match result {
            Err(TargetError::AuthenticationFailed(reason)) => {
                assert_eq!(reason, "Invalid credentials")
            }
            _ => panic!("expected authentication failure"),
        }
    }
}
