//! Session/auth collaborator.
//!
//! The portal consults this before granting organizer or admin access.
//! Credential verification against the fixture user collection stands
//! in for the hosted auth service, which implements the same trait.

use crate::constants::{ADMIN_SESSION_KEY, SECURITY_LOG_KEY, USERS_KEY};
use crate::domain::{SecurityAction, SecurityLogEntry, UserAccount};
use crate::error::{Result, StoreError};
use crate::identity::IdGenerator;
use crate::store::{read_json, write_json, StorageBackend};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// An authenticated portal session with explicit expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserAccount,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
    async fn sign_out(&self) -> Result<()>;
    /// Expiry-checked accessor: an expired or corrupt session is
    /// cleared and reported as absent, never returned.
    async fn current_session(&self) -> Result<Option<Session>>;
}

/// Verifies against the fixture user collection in durable storage.
pub struct LocalAuthService {
    backend: Arc<dyn StorageBackend>,
    ids: Arc<dyn IdGenerator>,
    ttl: Duration,
}

impl LocalAuthService {
    pub fn new(backend: Arc<dyn StorageBackend>, ids: Arc<dyn IdGenerator>, ttl_minutes: i64) -> Self {
        Self {
            backend,
            ids,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn append_security_log(&self, email: &str, action: SecurityAction, detail: Option<String>) {
        let mut entries: Vec<SecurityLogEntry> = read_json(self.backend.as_ref(), SECURITY_LOG_KEY);
        entries.push(SecurityLogEntry {
            at: Utc::now(),
            email: email.to_string(),
            action,
            detail,
        });
        if let Err(e) = write_json(self.backend.as_ref(), SECURITY_LOG_KEY, &entries) {
            warn!("Security log append failed: {}", e);
        }
    }

    fn clear_stored_session(&self) {
        if let Err(e) = self.backend.remove(ADMIN_SESSION_KEY) {
            warn!("Failed to clear stored session: {}", e);
        }
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let users: Vec<UserAccount> = read_json(self.backend.as_ref(), USERS_KEY);
        let user = users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email));
        let user = match user {
            Some(user) if user.password == password => user,
            _ => {
                self.append_security_log(email, SecurityAction::SignInFailed, None);
                return Err(StoreError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let session = Session {
            token: self.ids.next_id("ses"),
            user,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let raw = serde_json::to_string(&session)?;
        self.backend.store(ADMIN_SESSION_KEY, &raw)?;
        self.append_security_log(email, SecurityAction::SignInSucceeded, None);

        debug!("Signed in {}", email);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Ok(Some(raw)) = self.backend.load(ADMIN_SESSION_KEY) {
            if let Ok(session) = serde_json::from_str::<Session>(&raw) {
                self.append_security_log(&session.user.email, SecurityAction::SignedOut, None);
            }
        }
        self.backend.remove(ADMIN_SESSION_KEY)?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        let raw = match self.backend.load(ADMIN_SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Session read failed, treating as signed out: {}", e);
                return Ok(None);
            }
        };
        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!("Corrupt session record, clearing: {}", e);
                self.clear_stored_session();
                return Ok(None);
            }
        };
        if session.is_expired_at(Utc::now()) {
            self.clear_stored_session();
            self.append_security_log(&session.user.email, SecurityAction::SessionExpired, None);
            return Ok(None);
        }
        Ok(Some(session))
    }
}
