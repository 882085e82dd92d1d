//! Access gate and per-viewer session state.
//!
//! The gate is a fixed shared secret compared in-process. It keeps casual
//! viewers out of the report and nothing more.

use crate::error::{Result, SurveyError};

#[derive(Debug, Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn check(&self, attempt: &str) -> bool {
        attempt == self.secret
    }
}

/// One viewer's session. Passed explicitly to whatever renders the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to unlock the session. A wrong secret leaves it locked.
    pub fn login(&mut self, gate: &AccessGate, attempt: &str) -> Result<()> {
        if gate.check(attempt) {
            self.authenticated = true;
            tracing::info!("Session unlocked");
            Ok(())
        } else {
            tracing::warn!("Rejected access attempt");
            Err(SurveyError::AccessDenied)
        }
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// `Ok` only for an unlocked session.
    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SurveyError::AccessDenied)
        }
    }
}
