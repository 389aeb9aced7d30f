//! Test fixtures: an in-process fake backend and ready-made app state.

use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};

use crate::config::Config;
use crate::model::role::Role;
use crate::state::AppState;
use crate::storage::MemoryStorage;

/// Starts a backend on an ephemeral port; returns its base URL and a stop handle.
pub fn spawn_backend<F>(configure: F) -> (String, ServerHandle)
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake backend");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{}", addr), handle)
}

pub fn test_state(base_url: &str) -> web::Data<AppState> {
    let config = Config::from_lookup(|key| match key {
        "API_BASE_URL" => Some(base_url.to_string()),
        _ => None,
    })
    .expect("test config");
    let state = AppState::new(config, Arc::new(MemoryStorage::default()), reqwest::Client::new())
        .expect("test state");
    web::Data::new(state)
}

pub fn sign_in(state: &AppState, user_id: u64, role: Role) {
    state
        .session
        .login(user_id, "test-token".into(), "tester".into(), role)
        .expect("sign in");
}
