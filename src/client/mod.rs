//! Typed HTTP client for the Moneybook API.
//!
//! Authenticated requests carry the stored access token. A 401 triggers one
//! refresh through `/api/token/refresh/` followed by a single replay of the
//! original request; if either step fails the stored session is cleared and
//! [`ClientError::SessionExpired`] is returned.

mod error;
mod store;

pub use error::ClientError;
pub use store::{MemoryTokenStore, StoredTokens, TokenStore};

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::admin::models::{AdminCreateUserDto, AdminUpdateUserDto, AdminUserResponse};
use crate::auth::models::{
    ChangePasswordDto, CreateUserDto, LoginDto, LogoutDto, RefreshTokenDto, TokenPairResponse,
    UpdateProfileDto, UserResponseDto,
};
use crate::category::models::{CategoryResponse, CreateCategoryDto};
use crate::errors::ErrorResponse;
use crate::summary::models::{MonthlySummary, Period};
use crate::transaction::models::{CreateTransactionDto, TransactionKind, TransactionResponse};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Client with an in-memory token store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_store(base_url, Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_store(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn tokens(&self) -> StoredTokens {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.load().access.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Request without credentials and without the refresh cycle
    async fn send_public(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        self.dispatch(method, path, body, None).await
    }

    /// Authenticated request with one refresh and one replay on 401
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        self.send_with(method, path, |_| Ok(body.cloned())).await
    }

    /// Like [`send`](Self::send), but the body is rebuilt from the stored tokens
    /// before each attempt, so a replay sees tokens rotated by the refresh
    async fn send_with<F>(
        &self,
        method: Method,
        path: &str,
        build_body: F,
    ) -> Result<Response, ClientError>
    where
        F: Fn(&StoredTokens) -> Result<Option<Value>, ClientError>,
    {
        let tokens = self.store.load();
        let body = build_body(&tokens)?;
        let response = self
            .dispatch(method.clone(), path, body.as_ref(), tokens.access.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path, "Access token rejected, refreshing");
        let access = match self.refresh_session().await? {
            Some(access) => access,
            None => return Err(self.expire_session()),
        };

        let body = build_body(&self.store.load())?;
        let replay = self
            .dispatch(method, path, body.as_ref(), Some(&access))
            .await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            return Err(self.expire_session());
        }

        Ok(replay)
    }

    /// Exchange the stored refresh token; returns the new access token, or None when refused
    async fn refresh_session(&self) -> Result<Option<String>, ClientError> {
        let current = self.store.load();
        let Some(refresh) = current.refresh else {
            return Ok(None);
        };

        let body = to_body(&RefreshTokenDto { refresh })?;
        let response = self
            .send_public(Method::POST, "/api/token/refresh/", Some(&body))
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let pair: TokenPairResponse = decode(response).await?;
        self.store.save(StoredTokens {
            access: Some(pair.access.clone()),
            refresh: Some(pair.refresh),
            is_superuser: current.is_superuser,
        });

        Ok(Some(pair.access))
    }

    fn expire_session(&self) -> ClientError {
        warn!("Session expired, clearing stored tokens");
        self.store.clear();
        ClientError::SessionExpired
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        decode(self.send(Method::GET, path, None).await?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        decode(self.send(Method::POST, path, Some(&body)).await?).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        decode(self.send(Method::PATCH, path, Some(&body)).await?).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        expect_success(self.send(Method::DELETE, path, None).await?).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Log in, store the token pair and cache the superuser flag
    pub async fn login(&self, username: &str, password: &str) -> Result<UserResponseDto, ClientError> {
        let body = to_body(&LoginDto {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let response = self
            .send_public(Method::POST, "/api/token/", Some(&body))
            .await?;
        let pair: TokenPairResponse = decode(response).await?;

        self.store.save(StoredTokens {
            access: Some(pair.access),
            refresh: Some(pair.refresh),
            is_superuser: false,
        });

        self.user_info().await
    }

    pub async fn register(&self, dto: &CreateUserDto) -> Result<UserResponseDto, ClientError> {
        let body = to_body(dto)?;
        decode(
            self.send_public(Method::POST, "/api/user/register/", Some(&body))
                .await?,
        )
        .await
    }

    pub async fn user_info(&self) -> Result<UserResponseDto, ClientError> {
        let user: UserResponseDto = self.get("/api/user-info/").await?;

        let mut tokens = self.store.load();
        tokens.is_superuser = user.is_superuser;
        self.store.save(tokens);

        Ok(user)
    }

    pub async fn update_user_info(
        &self,
        dto: &UpdateProfileDto,
    ) -> Result<UserResponseDto, ClientError> {
        self.patch("/api/user-info/", dto).await
    }

    /// Change the password; the server revokes every session so the stored tokens are dropped
    pub async fn change_password(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ClientError> {
        let body = to_body(&ChangePasswordDto {
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        })?;
        expect_success(
            self.send(Method::POST, "/api/user/change-password/", Some(&body))
                .await?,
        )
        .await?;

        self.store.clear();
        Ok(())
    }

    /// Revoke the stored refresh token on the server and forget the session
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = match self
            .send_with(Method::POST, "/api/token/logout/", |tokens| {
                to_body(&LogoutDto {
                    refresh: tokens.refresh.clone(),
                })
                .map(Some)
            })
            .await
        {
            Ok(response) => expect_success(response).await,
            Err(e) => Err(e),
        };

        self.store.clear();
        result
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn categories(&self, kind: TransactionKind) -> Result<Vec<CategoryResponse>, ClientError> {
        self.get(&format!("/api/{}/categories/", kind.segment()))
            .await
    }

    pub async fn create_category(
        &self,
        kind: TransactionKind,
        name: &str,
    ) -> Result<CategoryResponse, ClientError> {
        self.post(
            &format!("/api/{}/categories/", kind.segment()),
            &CreateCategoryDto::new(name),
        )
        .await
    }

    pub async fn delete_category(&self, kind: TransactionKind, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/{}/categories/delete/{id}/", kind.segment()))
            .await
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Transactions of one kind in a period; a 404 reads as an empty period
    pub async fn transactions(
        &self,
        kind: TransactionKind,
        period: Period,
    ) -> Result<Vec<TransactionResponse>, ClientError> {
        let path = format!(
            "/api/{}/{}/{}/",
            kind.segment(),
            period.year(),
            period.month()
        );
        empty_on_not_found(self.get(&path).await, Vec::new)
    }

    pub async fn create_transaction(
        &self,
        kind: TransactionKind,
        dto: &CreateTransactionDto,
    ) -> Result<TransactionResponse, ClientError> {
        self.post(&format!("/api/{}/", kind.segment()), dto).await
    }

    pub async fn delete_transaction(&self, kind: TransactionKind, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/{}/delete/{id}/", kind.segment()))
            .await
    }

    // ------------------------------------------------------------------
    // Summary
    // ------------------------------------------------------------------

    /// Monthly summary; a 404 reads as an empty period
    pub async fn summary(&self, period: Period) -> Result<MonthlySummary, ClientError> {
        let path = format!(
            "/api/categories/summary/{}/{}/",
            period.year(),
            period.month()
        );
        empty_on_not_found(self.get(&path).await, MonthlySummary::empty)
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn admin_users(&self) -> Result<Vec<AdminUserResponse>, ClientError> {
        self.get("/api/admin/users/").await
    }

    pub async fn admin_create_user(
        &self,
        dto: &AdminCreateUserDto,
    ) -> Result<AdminUserResponse, ClientError> {
        self.post("/api/admin/users/", dto).await
    }

    pub async fn admin_update_user(
        &self,
        id: Uuid,
        dto: &AdminUpdateUserDto,
    ) -> Result<AdminUserResponse, ClientError> {
        self.patch(&format!("/api/admin/users/{id}/"), dto).await
    }

    pub async fn admin_delete_user(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/admin/users/{id}/")).await
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn empty_on_not_found<T>(
    result: Result<T, ClientError>,
    empty: impl FnOnce() -> T,
) -> Result<T, ClientError> {
    match result {
        Err(e) if e.is_not_found() => Ok(empty()),
        other => other,
    }
}

/// Turn a non-success response into [`ClientError::Api`]
async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            error: envelope.error,
            message: envelope.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("HTTP_ERROR")
                .to_uppercase()
                .replace(' ', "_"),
            message: text,
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

async fn expect_success(response: Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(api_error(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/").expect("Should build client");
        assert_eq!(client.url("/api/token/"), "http://localhost:8080/api/token/");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_empty_on_not_found() {
        let not_found: Result<Vec<u8>, ClientError> = Err(ClientError::Api {
            status: 404,
            error: "NOT_FOUND".to_string(),
            message: String::new(),
        });
        assert_eq!(empty_on_not_found(not_found, Vec::new).expect("empty"), Vec::<u8>::new());

        let other: Result<Vec<u8>, ClientError> = Err(ClientError::SessionExpired);
        assert!(matches!(
            empty_on_not_found(other, Vec::new),
            Err(ClientError::SessionExpired)
        ));
    }
}
