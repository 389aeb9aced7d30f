use crate::{model::role::Role, model::session::Session, state::AppState};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

/// The signed-in operator, as seen by a handler.
///
/// Guard middleware stores it in the request extensions; outside guarded
/// scopes it is read straight from the session store.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl From<Session> for AuthUser {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            role: session.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let session = req
            .app_data::<Data<AppState>>()
            .and_then(|state| state.session.current())
            .filter(|s| !s.token.is_empty());

        match session {
            Some(s) => ready(Ok(AuthUser::from(s))),
            None => ready(Err(ErrorUnauthorized("Not signed in"))),
        }
    }
}

impl AuthUser {
    /// Staff id used in `/staff/{id}` backend paths.
    pub fn staff_id(&self) -> u64 {
        self.user_id
    }
}
