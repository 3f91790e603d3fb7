use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ErrorBody, TokenPair, TokenResponse};
use crate::token_store::TokenStore;
use crate::traits::SessionExpiryHandler;
use reqwest::{Method, Response, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const REFRESH_ENDPOINT: &str = "/auth/token/refresh/";

/// Authenticated JSON client for the backend API.
///
/// Every request reads the current token pair from the injected store and
/// attaches `Authorization: Bearer <access>` when a pair is present. A 401
/// response triggers one transparent refresh-and-retry; if the retry fails its
/// error is surfaced as-is, never retried again. When the refresh itself is
/// rejected the store is cleared, the expiry handler is invoked, and the call
/// fails with `ApiError::SessionExpired`.
///
/// Cloning is cheap; clones share the HTTP connection pool, the token store
/// and the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    expiry: Arc<dyn SessionExpiryHandler>,
    // Serializes refresh attempts so concurrent 401s produce one refresh call
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        store: Arc<dyn TokenStore>,
        expiry: Arc<dyn SessionExpiryHandler>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("cv-desk/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.api.request_timeout_sec))
            .build()?;

        Ok(ApiClient {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            store,
            expiry,
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request_json(Method::GET, endpoint, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_json(Method::POST, endpoint, Some(encode(body)?))
            .await
    }

    /// POST with an empty body, for action endpoints like `analyze`.
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request_json(Method::POST, endpoint, None).await
    }

    /// POST where the response body, if any, is ignored.
    pub async fn post_discard<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.request_raw(Method::POST, endpoint, Some(encode(body)?))
            .await?;
        Ok(())
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_json(Method::PUT, endpoint, Some(encode(body)?))
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_json(Method::PATCH, endpoint, Some(encode(body)?))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request_raw(Method::DELETE, endpoint, None).await?;
        Ok(())
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.request_raw(method, endpoint, body).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse { source: e })
    }

    /// Sends one request, recovering from an expired access token at most once.
    async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url_for(endpoint);
        let tokens = self.store.tokens();

        let response = self
            .send(method.clone(), &url, body.as_ref(), tokens.as_ref().map(|t| &t.access))
            .await?;

        // A 401 without a stored pair has nothing to refresh with and falls
        // through to normal error handling below.
        if response.status() == StatusCode::UNAUTHORIZED
            && let Some(tokens) = tokens
        {
            tracing::debug!(%url, "access token rejected, attempting refresh");
            let access = self.refresh_access(&tokens).await?;
            let retry = self.send(method, &url, body.as_ref(), Some(&access)).await?;
            return Self::check_status(retry).await;
        }

        Self::check_status(response).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        access: Option<&SecretString>,
    ) -> Result<Response, ApiError> {
        let mut builder = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(access) = access {
            builder = builder.bearer_auth(access.expose_secret());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .map_err(|e| ApiError::Network { source: e })
    }

    /// Maps a non-2xx response to `ApiError::Server`, using the server's
    /// `detail` message when the body carries one.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.detail)
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| format!("HTTP error: status {}", status.as_u16()));

        Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        })
    }

    /// Exchanges the refresh token for a new pair and returns the new access
    /// token. Callers that lose the race to an in-flight refresh reuse its
    /// result instead of issuing a second refresh request.
    async fn refresh_access(&self, used: &TokenPair) -> Result<SecretString, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let current = match self.store.tokens() {
            Some(current) => current,
            // Another caller already failed the refresh and cleared the store
            None => return Err(ApiError::SessionExpired),
        };
        if current.access.expose_secret() != used.access.expose_secret() {
            return Ok(current.access);
        }

        let body = serde_json::json!({ "refresh": current.refresh.expose_secret() });
        let result = self
            .http
            .post(self.url_for(REFRESH_ENDPOINT))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<TokenResponse>().await {
                    Ok(tokens) => {
                        let pair = TokenPair::new(tokens.access, tokens.refresh);
                        let access = pair.access.clone();
                        self.store.set_tokens(pair);
                        tracing::debug!("access token refreshed");
                        Ok(access)
                    }
                    Err(e) => {
                        tracing::warn!("Token refresh response was unreadable: {}", e);
                        Err(self.expire_session())
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Token refresh rejected");
                Err(self.expire_session())
            }
            Err(e) => {
                tracing::warn!("Token refresh request failed: {}", e);
                Err(self.expire_session())
            }
        }
    }

    /// Point of no return: credentials are gone and the caller's flow ends here.
    fn expire_session(&self) -> ApiError {
        self.store.clear();
        self.expiry.on_session_expired();
        ApiError::SessionExpired
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode { source: e })
}
