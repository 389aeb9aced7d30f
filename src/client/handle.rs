use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::error::ApiError;
use crate::auth::session_store::SessionStore;

/// Shared by every handle: one HTTP client, the backend base address and
/// the session the bearer token is read from.
pub struct ApiContext {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiContext {
    pub fn new(http: Client, base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// What the owning view can show: the last committed result, whether a
/// call is pending, and the last error message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandleState {
    pub data: Option<Value>,
    pub loading: bool,
    pub error: Option<String>,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Request handle owned by a single view.
///
/// At most one call is in flight per handle: issuing a new call cancels
/// the pending one, and only the newest call ever commits to [`HandleState`].
/// Handles are independent of each other.
pub struct ApiHandle {
    ctx: Arc<ApiContext>,
    base_url: String,
    generation: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    state: Mutex<HandleState>,
}

impl ApiHandle {
    /// `prefix` is appended to the backend base address, e.g. `/api/admin/staff`.
    pub fn new(ctx: Arc<ApiContext>, prefix: &str) -> Self {
        let base_url = format!("{}{}", ctx.base_url, prefix);
        Self {
            ctx,
            base_url,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            state: Mutex::new(HandleState::default()),
        }
    }

    pub fn snapshot(&self) -> HandleState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn post<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<Value, ApiError> {
        let body = serde_json::to_value(payload)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<Value, ApiError> {
        let body = serde_json::to_value(payload)?;
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let value = self.get(endpoint).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Cancels the pending call, if any. Called when the owning view goes away.
    pub fn teardown(&self) {
        if let Ok(slot) = self.in_flight.lock() {
            if let Some(current) = slot.as_ref() {
                current.token.cancel();
            }
        }
    }

    /// Drops the committed data and error so the next operator starts clean.
    pub fn reset(&self) {
        self.update_state(|s| *s = HandleState::default());
    }

    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut slot = self
                .in_flight
                .lock()
                .map_err(|_| ApiError::Transport("request handle poisoned".into()))?;
            if let Some(previous) = slot.replace(InFlight {
                generation,
                token: token.clone(),
            }) {
                previous.token.cancel();
            }
        }

        self.update_state(|s| {
            s.loading = true;
            s.error = None;
        });

        let mut builder = self.ctx.http.request(method.clone(), &url);
        if let Some(bearer) = self.ctx.session.token() {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = payload.as_ref() {
            builder = builder.json(body);
        }

        debug!(%method, %url, generation, "Issuing request");

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = execute(builder) => result,
        };

        // A call that lost the race is discarded even if it finished first.
        let is_current = match self.in_flight.lock() {
            Ok(mut slot) => {
                let current = slot.as_ref().is_some_and(|f| f.generation == generation);
                if current {
                    *slot = None;
                }
                current
            }
            Err(_) => false,
        };

        if !is_current {
            warn!(%method, %url, "Request canceled due to a new request.");
            return Err(ApiError::Cancelled);
        }

        match outcome {
            Ok(value) => {
                self.update_state(|s| {
                    s.data = Some(value.clone());
                    s.loading = false;
                });
                Ok(value)
            }
            Err(ApiError::Cancelled) => {
                warn!(%method, %url, "Request canceled.");
                self.update_state(|s| s.loading = false);
                Err(ApiError::Cancelled)
            }
            Err(e) => {
                error!(error = %e, "ERROR IN {} REQUEST TO {}", method, url);
                let message = e.to_string();
                self.update_state(|s| {
                    s.error = Some(message);
                    s.loading = false;
                });
                Err(e)
            }
        }
    }

    fn update_state(&self, apply: impl FnOnce(&mut HandleState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
    }
}

impl Drop for ApiHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn execute(builder: RequestBuilder) -> Result<Value, ApiError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let parsed = if body.trim().is_empty() {
        Value::Null
    } else if status.is_success() {
        serde_json::from_str(&body)?
    } else {
        serde_json::from_str(&body).unwrap_or(Value::Null)
    };

    if status.is_success() {
        return Ok(parsed);
    }

    let message = parsed
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    Err(ApiError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::storage::MemoryStorage;
    use crate::testing::spawn_backend;
    use actix_web::{HttpRequest, HttpResponse, web};
    use serde_json::json;
    use std::time::Duration;

    fn backend(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/slow",
            web::get().to(|| async {
                actix_web::rt::time::sleep(Duration::from_millis(400)).await;
                HttpResponse::Ok().json(json!({"n": 1}))
            }),
        )
        .route(
            "/fast",
            web::get().to(|| async { HttpResponse::Ok().json(json!({"n": 2})) }),
        )
        .route(
            "/whoami",
            web::get().to(|req: HttpRequest| async move {
                let auth = req
                    .headers()
                    .get("Authorization")
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                HttpResponse::Ok().json(json!({ "authorization": auth }))
            }),
        )
        .route(
            "/boom",
            web::post().to(|| async {
                HttpResponse::BadRequest().json(json!({"message": "Salary already generated"}))
            }),
        )
        .route(
            "/empty",
            web::delete().to(|| async { HttpResponse::Ok().finish() }),
        );
    }

    fn context(base_url: &str) -> (Arc<ApiContext>, Arc<SessionStore>) {
        let session = Arc::new(SessionStore::hydrate(Arc::new(MemoryStorage::default())));
        let ctx = Arc::new(ApiContext::new(Client::new(), base_url, session.clone()));
        (ctx, session)
    }

    #[actix_web::test]
    async fn newer_request_supersedes_pending_one() {
        let (base, server) = spawn_backend(backend);
        let (ctx, _) = context(&base);
        let handle = Arc::new(ApiHandle::new(ctx, ""));

        let first = {
            let handle = handle.clone();
            actix_web::rt::spawn(async move { handle.get("/slow").await })
        };
        actix_web::rt::time::sleep(Duration::from_millis(50)).await;

        let second = handle.get("/fast").await;
        let first = first.await.unwrap();

        assert_eq!(first, Err(ApiError::Cancelled));
        assert_eq!(second, Ok(json!({"n": 2})));

        let state = handle.snapshot();
        assert_eq!(state.data, Some(json!({"n": 2})));
        assert_eq!(state.error, None);
        assert!(!state.loading);

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn bearer_header_is_attached_only_with_a_session() {
        let (base, server) = spawn_backend(backend);
        let (ctx, session) = context(&base);
        let handle = ApiHandle::new(ctx, "");

        let anonymous = handle.get("/whoami").await.unwrap();
        assert_eq!(anonymous["authorization"], "");

        session
            .login(3, "abc.def".into(), "asha".into(), Role::Staff)
            .unwrap();
        let signed_in = handle.get("/whoami").await.unwrap();
        assert_eq!(signed_in["authorization"], "Bearer abc.def");

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn backend_message_is_recorded_and_returned() {
        let (base, server) = spawn_backend(backend);
        let (ctx, _) = context(&base);
        let handle = ApiHandle::new(ctx, "");

        let err = handle.post("/boom", &json!({})).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Backend {
                status: 400,
                message: "Salary already generated".into()
            }
        );
        assert_eq!(handle.snapshot().error.as_deref(), Some("Salary already generated"));

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn teardown_cancels_without_recording_an_error() {
        let (base, server) = spawn_backend(backend);
        let (ctx, _) = context(&base);
        let handle = Arc::new(ApiHandle::new(ctx, ""));

        let pending = {
            let handle = handle.clone();
            actix_web::rt::spawn(async move { handle.get("/slow").await })
        };
        actix_web::rt::time::sleep(Duration::from_millis(50)).await;
        handle.teardown();

        assert_eq!(pending.await.unwrap(), Err(ApiError::Cancelled));
        let state = handle.snapshot();
        assert_eq!(state.error, None);
        assert_eq!(state.data, None);
        assert!(!state.loading);

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn reset_forgets_committed_data() {
        let (base, server) = spawn_backend(backend);
        let (ctx, _) = context(&base);
        let handle = ApiHandle::new(ctx, "");

        handle.get("/fast").await.unwrap();
        assert_eq!(handle.snapshot().data, Some(json!({"n": 2})));

        handle.reset();
        assert_eq!(handle.snapshot(), HandleState::default());
        assert_eq!(handle.get("/fast").await, Ok(json!({"n": 2})));

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn empty_body_is_null() {
        let (base, server) = spawn_backend(backend);
        let (ctx, _) = context(&base);
        let handle = ApiHandle::new(ctx, "");

        assert_eq!(handle.delete("/empty").await, Ok(Value::Null));

        server.stop(false).await;
    }

    #[actix_web::test]
    async fn unreachable_backend_is_a_transport_error() {
        let (ctx, _) = context("http://127.0.0.1:1");
        let handle = ApiHandle::new(ctx, "/api");

        let err = handle.get("/staff").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(handle.snapshot().error.is_some());
    }
}
