//! lockservice::lfs
//!
//! Client for the Git LFS file locking API.
//!
//! # Protocol
//!
//! One `POST <endpoint>/locks` per path:
//!
//! ```text
//! POST /locks
//! Accept: application/vnd.git-lfs+json
//! Content-Type: application/vnd.git-lfs+json
//!
//! {"path": "art/hero.psd", "ref": {"name": "refs/heads/main"}}
//! ```
//!
//! | Status | Meaning                                                  |
//! |--------|----------------------------------------------------------|
//! | 201    | `{"lock": {...}}` with the new lock                      |
//! | 409    | `{"lock": {...}, "message": ...}` with the existing lock |
//! | 401    | credentials missing or rejected                          |
//! | 403    | no push access                                           |
//! | 404    | no lock service at this endpoint                         |
//! | 429    | rate limited                                             |
//!
//! The API has no batch endpoint, so a batch is sent path by path in
//! request order. A failing path does not stop the ones after it.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{LockClient, LockError, LockOutcome, PathFailure};
use crate::core::types::{CanonicalPath, LockRecord, RefName};

/// Media type of every LFS API request and response.
pub const LFS_MEDIA_TYPE: &str = "application/vnd.git-lfs+json";

const USER_AGENT_VALUE: &str = concat!("locksmith/", env!("CARGO_PKG_VERSION"));

/// HTTP lock client for one endpoint and ref.
pub struct LfsLockClient {
    client: Client,
    endpoint: String,
    remote_ref: Option<RefName>,
    token: Option<String>,
    closed: AtomicBool,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for LfsLockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfsLockClient")
            .field("endpoint", &self.endpoint)
            .field("remote_ref", &self.remote_ref)
            .field("has_token", &self.token.is_some())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

#[derive(Serialize)]
struct CreateLockBody<'a> {
    path: &'a str,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    remote_ref: Option<RefBody<'a>>,
}

#[derive(Serialize)]
struct RefBody<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct LockResponse {
    lock: Option<LockRecord>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl LfsLockClient {
    /// Create a client for `endpoint` (without the trailing `/locks`).
    pub fn new(
        endpoint: impl Into<String>,
        remote_ref: Option<RefName>,
        token: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            remote_ref,
            token,
            closed: AtomicBool::new(false),
        }
    }

    /// Base endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn locks_url(&self) -> String {
        format!("{}/locks", self.endpoint)
    }

    fn headers(&self) -> Result<HeaderMap, LockError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(LFS_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(LFS_MEDIA_TYPE));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| LockError::AuthFailed("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn lock_one(&self, path: &CanonicalPath) -> Result<LockRecord, LockError> {
        let body = CreateLockBody {
            path: path.as_str(),
            remote_ref: self
                .remote_ref
                .as_ref()
                .map(|r| RefBody { name: r.as_str() }),
        };
        let payload = serde_json::to_vec(&body).map_err(|e| LockError::ApiError {
            status: 0,
            message: format!("cannot encode request: {}", e),
        })?;

        let response = self
            .client
            .post(self.locks_url())
            .headers(self.headers()?)
            .body(payload)
            .send()
            .await
            .map_err(|e| LockError::NetworkError(e.to_string()))?;

        self.handle_response(path, response).await
    }

    async fn handle_response(
        &self,
        path: &CanonicalPath,
        response: Response,
    ) -> Result<LockRecord, LockError> {
        let status = response.status();

        if status.is_success() || status == StatusCode::CONFLICT {
            let parsed: LockResponse = response.json().await.map_err(|e| LockError::ApiError {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })?;

            return match (status, parsed.lock) {
                (StatusCode::CONFLICT, lock) => Err(LockError::AlreadyLocked {
                    path: path.to_string(),
                    owner: lock
                        .as_ref()
                        .map(|l| l.owner_name().to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                }),
                (_, Some(lock)) => Ok(lock),
                (_, None) => Err(LockError::ApiError {
                    status: status.as_u16(),
                    message: parsed
                        .message
                        .unwrap_or_else(|| "response did not include a lock".to_string()),
                }),
            };
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                message: Some(message),
            }) => message,
            _ => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED if self.token.is_none() => LockError::AuthRequired,
            StatusCode::UNAUTHORIZED => LockError::AuthFailed("invalid or expired token".into()),
            StatusCode::FORBIDDEN => LockError::AuthFailed(format!("permission denied: {}", message)),
            StatusCode::NOT_FOUND => LockError::NotFound(format!("{} ({})", self.locks_url(), message)),
            StatusCode::TOO_MANY_REQUESTS => LockError::RateLimited,
            _ if status.is_server_error() => LockError::ApiError {
                status: status.as_u16(),
                message: format!("lock service error: {}", message),
            },
            _ => LockError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl LockClient for LfsLockClient {
    fn name(&self) -> &'static str {
        "lfs"
    }

    async fn lock_batch(&self, paths: &[CanonicalPath]) -> LockOutcome {
        if self.is_closed() {
            return LockOutcome::failure(LockError::Closed);
        }

        let mut records = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();

        for path in paths {
            match self.lock_one(path).await {
                Ok(record) => records.push(record),
                Err(error) => failures.push(PathFailure {
                    path: path.clone(),
                    error,
                }),
            }
        }

        LockOutcome {
            records,
            error: LockError::from_failures(failures),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
