use std::sync::{Arc, RwLock};

use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::ViewError;
use crate::state::AppState;
use crate::storage::LocalStorage;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Dark/light preference; dark unless storage says otherwise.
pub struct ThemeStore {
    storage: Arc<dyn LocalStorage>,
    current: RwLock<Theme>,
}

impl ThemeStore {
    pub fn hydrate(storage: Arc<dyn LocalStorage>) -> Result<Self> {
        let theme = match storage.get_item(THEME_KEY).as_deref() {
            Some("dark") | None => Theme::Dark,
            Some(_) => Theme::Light,
        };
        // the preference is written back even when it was only defaulted
        storage.set_item(THEME_KEY, theme.as_str())?;
        Ok(Self {
            storage,
            current: RwLock::new(theme),
        })
    }

    pub fn current(&self) -> Theme {
        self.current.read().map(|t| *t).unwrap_or(Theme::Dark)
    }

    pub fn toggle(&self) -> Result<Theme> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| anyhow::anyhow!("theme lock poisoned"))?;
        let next = match *guard {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.storage.set_item(THEME_KEY, next.as_str())?;
        *guard = next;
        Ok(next)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ThemeResponse {
    pub theme: Theme,
    pub is_dark_mode: bool,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            is_dark_mode: theme == Theme::Dark,
        }
    }
}

#[utoipa::path(
    get,
    path = "/theme",
    responses((status = 200, body = ThemeResponse)),
    tag = "Theme"
)]
pub async fn get_theme(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ThemeResponse::from(state.theme.current()))
}

#[utoipa::path(
    post,
    path = "/theme/toggle",
    responses((status = 200, body = ThemeResponse)),
    tag = "Theme"
)]
pub async fn toggle_theme(state: web::Data<AppState>) -> Result<HttpResponse, ViewError> {
    let theme = state
        .theme
        .toggle()
        .map_err(|e| ViewError::Render(e.to_string()))?;
    Ok(HttpResponse::Ok().json(ThemeResponse::from(theme)))
}
