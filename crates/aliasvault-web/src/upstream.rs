//! Thin client for the addy.io REST API.
//!
//! Every call authenticates with the stored API key and unwraps the
//! upstream `{ "data": … }` envelope. Failures are turned into [`AppError`]s
//! so handlers can return them directly.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};

use crate::config::UpstreamConfig;
use crate::dto::CreateAliasRequest;
use crate::error::AppError;

#[derive(Clone)]
pub struct AddyClient {
    client: reqwest::Client,
    base_url: String,
}

struct Reply {
    status: StatusCode,
    body: Value,
}

impl Reply {
    fn data(self) -> Value {
        match self.body {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn details(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string()
    }
}

impl AddyClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        api_key: &str,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        action: &str,
    ) -> Result<Reply, AppError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("Upstream {method} {endpoint}");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("{action}: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("{action}: {e}")))?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::debug!("Upstream returned non-JSON body for {endpoint}: {e}");
                Value::Null
            })
        };

        if !status.is_success() {
            tracing::warn!("Upstream {endpoint} failed with {status}");
        }

        Ok(Reply { status, body })
    }

    /// GET a collection. Upstream failures are reported as `502 Bad Gateway`.
    async fn list(&self, api_key: &str, endpoint: &str, what: &str) -> Result<Value, AppError> {
        let action = format!("Failed to fetch {what}");
        let reply = self.send(api_key, Method::GET, endpoint, None, &action).await?;

        if !reply.status.is_success() {
            return Err(AppError::Upstream {
                status: StatusCode::BAD_GATEWAY,
                details: reply.details(),
                message: action,
            });
        }
        Ok(reply.data())
    }

    /// Sends a mutation. Upstream failures keep the upstream status code.
    async fn mutate(
        &self,
        api_key: &str,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        action: &str,
    ) -> Result<Value, AppError> {
        let reply = self.send(api_key, method, endpoint, body, action).await?;

        if !reply.status.is_success() {
            return Err(AppError::Upstream {
                status: reply.status,
                details: reply.details(),
                message: action.to_string(),
            });
        }
        Ok(reply.data())
    }

    pub async fn list_aliases(&self, api_key: &str) -> Result<Value, AppError> {
        self.list(api_key, "/aliases", "aliases").await
    }

    pub async fn list_recipients(&self, api_key: &str) -> Result<Value, AppError> {
        self.list(api_key, "/recipients", "recipients").await
    }

    pub async fn list_domains(&self, api_key: &str) -> Result<Value, AppError> {
        self.list(api_key, "/domains", "domains").await
    }

    pub async fn create_alias(
        &self,
        api_key: &str,
        request: &CreateAliasRequest,
    ) -> Result<Value, AppError> {
        let payload = request.to_upstream_payload();
        self.mutate(api_key, Method::POST, "/aliases", Some(&payload), "Failed to create alias")
            .await
    }

    pub async fn update_alias(
        &self,
        api_key: &str,
        alias_id: &str,
        changes: &Value,
    ) -> Result<Value, AppError> {
        let endpoint = format!("/aliases/{alias_id}");
        self.mutate(api_key, Method::PATCH, &endpoint, Some(changes), "Failed to update alias")
            .await
    }

    pub async fn delete_alias(&self, api_key: &str, alias_id: &str) -> Result<(), AppError> {
        let endpoint = format!("/aliases/{alias_id}");
        self.mutate(api_key, Method::DELETE, &endpoint, None, "Failed to delete alias")
            .await
            .map(|_| ())
    }

    /// Enables (`POST /active-aliases`) or disables (`DELETE /active-aliases/{id}`) an alias.
    pub async fn set_alias_active(
        &self,
        api_key: &str,
        alias_id: &str,
        active: bool,
    ) -> Result<Value, AppError> {
        if active {
            let body = json!({ "id": alias_id });
            self.mutate(
                api_key,
                Method::POST,
                "/active-aliases",
                Some(&body),
                "Failed to enable alias",
            )
            .await
        } else {
            let endpoint = format!("/active-aliases/{alias_id}");
            self.mutate(api_key, Method::DELETE, &endpoint, None, "Failed to disable alias")
                .await
        }
    }
}
