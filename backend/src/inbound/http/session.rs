//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal in user ids and flash messages
//! rather than raw keys.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

use super::flash::Flash;

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FLASHES_KEY: &str = "_flashes";

#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Rotate the session and record `user_id` as signed in.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The signed-in user, if any. A tampered id is treated as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Drop every key and rotate the session.
    ///
    /// Unlike `Session::purge` the session stays writable, so a flash can be
    /// queued for the page after logout.
    pub fn reset(&self) {
        self.0.clear();
        self.0.renew();
    }

    /// Queue `flash` for the next rendered page.
    pub fn push_flash(&self, flash: Flash) -> Result<(), Error> {
        let mut queued = self.queued_flashes()?;
        queued.push(flash);
        self.0
            .insert(FLASHES_KEY, queued)
            .map_err(|error| Error::internal(format!("failed to store flash: {error}")))
    }

    /// Remove and return queued flashes, oldest first.
    pub fn take_flashes(&self) -> Result<Vec<Flash>, Error> {
        let queued = self.queued_flashes()?;
        if !queued.is_empty() {
            self.0.remove(FLASHES_KEY);
        }
        Ok(queued)
    }

    fn queued_flashes(&self) -> Result<Vec<Flash>, Error> {
        self.0
            .get::<Vec<Flash>>(FLASHES_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|error| Error::internal(format!("failed to read flashes: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
