//! Per-request database lifecycle.
//!
//! Every request gets its own [`RequestDb`]. Handlers open the tree lazily
//! through [`RequestDb::get_db`]; the [`db_lifecycle`] middleware closes
//! whatever was opened once the response has been produced. Teardown runs
//! from a drop guard, so it also fires when a handler panics or the request
//! future is dropped.
//!
//! Teardown happens once the handler has returned its response, before the
//! body is sent. Handlers must build their body in full; a streaming body
//! cannot read from the tree.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::db::{DbError, DbManager, DbResult, DbState};
use crate::error::ApiError;

/// Request-scoped access to the configured family tree.
///
/// Holds at most one handle; cloning shares the same slot. Once released the
/// context stays released, so a clone that outlives the request cannot open
/// another handle.
#[derive(Clone)]
pub struct RequestDb {
    inner: Arc<RequestDbInner>,
}

struct RequestDbInner {
    manager: Arc<dyn DbManager>,
    tree: String,
    slot: Mutex<Slot>,
}

/// Handle status within one request: `Absent -> Open -> Released`.
enum Slot {
    Absent,
    Open(Arc<DbState>),
    Released,
}

impl RequestDb {
    pub fn new(manager: Arc<dyn DbManager>, tree: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RequestDbInner {
                manager,
                tree: tree.into(),
                slot: Mutex::new(Slot::Absent),
            }),
        }
    }

    /// Open the database for this request, or return the handle opened earlier.
    ///
    /// The slot stays locked while opening, so one request never opens twice.
    /// On failure nothing is stored. Fails with [`DbError::Closed`] after the
    /// context has been released.
    pub fn get_db(&self) -> DbResult<Arc<DbState>> {
        let mut slot = self.slot();
        match &*slot {
            Slot::Open(state) => return Ok(Arc::clone(state)),
            Slot::Released => return Err(DbError::Closed(self.inner.tree.clone())),
            Slot::Absent => {}
        }

        let state = Arc::new(self.inner.manager.get_db(&self.inner.tree)?);
        *slot = Slot::Open(Arc::clone(&state));
        Ok(state)
    }

    /// Whether a handle has been opened and not yet released.
    #[cfg(test)]
    pub fn is_acquired(&self) -> bool {
        matches!(*self.slot(), Slot::Open(_))
    }

    /// Release the handle, closing it if it is still open.
    ///
    /// Returns whether a close happened. Safe to call any number of times;
    /// afterwards the context refuses to open a new handle.
    pub fn close(&self) -> bool {
        let previous = std::mem::replace(&mut *self.slot(), Slot::Released);
        let Slot::Open(state) = previous else {
            return false;
        };
        if !state.is_open() {
            return false;
        }
        if let Err(e) = state.close() {
            tracing::warn!(tree = %self.inner.tree, "Error closing database: {}", e);
        }
        true
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestDb {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("database lifecycle layer not installed".to_string()))
    }
}

/// Closes the request's database when dropped.
struct Teardown(RequestDb);

impl Drop for Teardown {
    fn drop(&mut self) {
        if self.0.close() {
            tracing::debug!("Released request database");
        }
    }
}

/// Middleware bracketing each request with a fresh [`RequestDb`].
pub async fn db_lifecycle(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let db = RequestDb::new(state.manager(), state.config().tree.clone());
    let _teardown = Teardown(db.clone());
    request.extensions_mut().insert(db);
    next.run(request).await
}
