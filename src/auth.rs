//! Authentication gate in front of the entry store.
//!
//! The store and query engine never authenticate anything themselves. A
//! driver builds a [`RequestContext`] for each request and asks an
//! [`Authenticator`] to admit it before touching entries.

use crate::constants::ENV_VARS_USER;
use crate::errors::{AppError, AppResult};
use std::env;
use tracing::{debug, warn};

/// Per-request state handed to an [`Authenticator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<String>,
}

impl RequestContext {
    /// A context with no identified user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        let user = user.into();
        if user.trim().is_empty() {
            return Self::anonymous();
        }
        RequestContext { user: Some(user) }
    }

    /// Builds the context for the OS user running this process.
    pub fn from_env() -> Self {
        match local_user() {
            Some(user) => Self::for_user(user),
            None => Self::anonymous(),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Decides whether a request may use the journal.
pub trait Authenticator {
    fn is_authenticated(&self, ctx: &RequestContext) -> bool;

    /// Fails with [`AppError::Unauthorized`] unless `ctx` is authenticated.
    fn require_authenticated(&self, ctx: &RequestContext) -> AppResult<()> {
        if self.is_authenticated(ctx) {
            debug!("Request authenticated");
            Ok(())
        } else {
            warn!("Rejected unauthenticated request");
            Err(AppError::Unauthorized)
        }
    }
}

/// Admits requests made by the local user who owns the journal.
///
/// # Examples
///
/// ```
/// use daybook::auth::{Authenticator, LocalSession, RequestContext};
///
/// let session = LocalSession::new("alice");
/// assert!(session.is_authenticated(&RequestContext::for_user("alice")));
/// assert!(session.require_authenticated(&RequestContext::anonymous()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LocalSession {
    owner: Option<String>,
}

impl LocalSession {
    pub fn new(owner: impl Into<String>) -> Self {
        LocalSession {
            owner: Some(owner.into()),
        }
    }

    /// Owner is the OS user running this process, if one can be determined.
    pub fn from_env() -> Self {
        LocalSession { owner: local_user() }
    }
}

impl Authenticator for LocalSession {
    fn is_authenticated(&self, ctx: &RequestContext) -> bool {
        match (&self.owner, ctx.user()) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }
}

fn local_user() -> Option<String> {
    ENV_VARS_USER
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
