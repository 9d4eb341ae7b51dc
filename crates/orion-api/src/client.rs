//! HTTP client for the Orion REST backend.

use std::sync::Arc;
use std::time::Duration;

use orion_core::{
    CreateLocation, DashboardRequest, DashboardRequestDetails, Location, PredictionCreated,
    PredictionRequest, UserProfile, UserUpdate,
};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::TokenSource;
use crate::error::ApiError;
use crate::retry::{is_retriable_for, retry_with_backoff};

/// Client for the `/users`, `/locations`, `/dashboard` and `/prediction`
/// endpoints.
///
/// Every request carries `Authorization: Bearer <token>` when a
/// [`TokenSource`] is attached. A 401 triggers one forced refresh and one
/// resend. Transient failures (connect/timeout, 5xx, 429) of idempotent
/// requests are retried with back-off up to `max_retries` additional
/// attempts; a `POST` is only resent when it never reached the backend.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
            tokens: None,
        })
    }

    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// `GET /users`: the account behind the current token.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; see the type-level docs for retry behaviour.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let text = self.execute(Method::GET, "users", &[], None).await?;
        decode("current_user", &text)
    }

    /// `PATCH /users`, optionally scoped with `?id_user=`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn update_user(
        &self,
        id_user: Option<&str>,
        update: &UserUpdate,
    ) -> Result<UserProfile, ApiError> {
        let body = encode("update_user", update)?;
        let query: Vec<(&str, &str)> = id_user.map(|id| ("id_user", id)).into_iter().collect();
        let text = self
            .execute(Method::PATCH, "users", &query, Some(body))
            .await?;
        decode("update_user", &text)
    }

    /// `GET /locations?id_user=`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn list_locations(&self, id_user: &str) -> Result<Vec<Location>, ApiError> {
        let text = self
            .execute(Method::GET, "locations", &[("id_user", id_user)], None)
            .await?;
        decode(&format!("list_locations(id_user={id_user})"), &text)
    }

    /// `POST /locations`. The response body is not used.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn create_location(&self, location: &CreateLocation) -> Result<(), ApiError> {
        let body = encode("create_location", location)?;
        self.execute(Method::POST, "locations", &[], Some(body))
            .await?;
        tracing::info!(
            id_user = %location.id_user,
            display_name = %location.display_name,
            "location created"
        );
        Ok(())
    }

    /// `DELETE /locations?id_location=&id_user=`; returns the remaining locations.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn delete_location(
        &self,
        id_user: &str,
        id_location: &str,
    ) -> Result<Vec<Location>, ApiError> {
        let text = self
            .execute(
                Method::DELETE,
                "locations",
                &[("id_location", id_location), ("id_user", id_user)],
                None,
            )
            .await?;
        decode(&format!("delete_location(id_location={id_location})"), &text)
    }

    /// `GET /dashboard?id_user=`: prediction history, newest first as the
    /// backend orders it.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn list_requests(&self, id_user: &str) -> Result<Vec<DashboardRequest>, ApiError> {
        let text = self
            .execute(Method::GET, "dashboard", &[("id_user", id_user)], None)
            .await?;
        decode(&format!("list_requests(id_user={id_user})"), &text)
    }

    /// `GET /dashboard?id_user=&history_id=`. The backend answers with an
    /// array; only the first element is meaningful.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn request_details(
        &self,
        id_user: &str,
        history_id: &str,
    ) -> Result<Option<DashboardRequestDetails>, ApiError> {
        let text = self
            .execute(
                Method::GET,
                "dashboard",
                &[("id_user", id_user), ("history_id", history_id)],
                None,
            )
            .await?;
        let details: Vec<DashboardRequestDetails> =
            decode(&format!("request_details(history_id={history_id})"), &text)?;
        Ok(details.into_iter().next())
    }

    /// `POST /prediction`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    pub async fn create_prediction(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionCreated, ApiError> {
        let body = encode("create_prediction", request)?;
        let text = self
            .execute(Method::POST, "prediction", &[], Some(body))
            .await?;
        decode("create_prediction", &text)
    }

    fn build_url(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| ApiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let url = self.build_url(endpoint, query)?;
        let should_retry = |err: &ApiError| is_retriable_for(&method, err);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, should_retry, || {
            let method = method.clone();
            let url = url.clone();
            let body = body.clone();
            async move { self.send_authorized(method, url, body.as_ref()).await }
        })
        .await
    }

    /// One logical attempt: send, and on 401 refresh the token and resend once.
    async fn send_authorized(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<String, ApiError> {
        let token = self.token(false).await;
        let mut response = self
            .send_once(method.clone(), &url, body, token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.tokens.is_some() {
            tracing::debug!(%url, "backend answered 401, refreshing token");
            let fresh = self.token(true).await;
            response = self
                .send_once(method, &url, body, fresh.as_deref())
                .await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                url: url.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response.text().await?)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.client.request(method, url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn token(&self, force_refresh: bool) -> Option<String> {
        match &self.tokens {
            Some(tokens) => tokens.token(force_refresh).await,
            None => None,
        }
    }
}

fn encode<T: Serialize>(context: &str, value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Serialize {
        context: context.to_owned(),
        source: e,
    })
}

fn decode<T: DeserializeOwned>(context: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
