//! Session context
//!
//! The authentication status is passed explicitly to the stores. Every
//! transition advances the epoch; a fetch started under an older epoch is
//! stale and its result is discarded.

use std::fmt;

/// Who is using the workstation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Not determined yet; nothing is fetched
    #[default]
    Unknown,
    SignedOut,
    Guest,
    Authenticated {
        username: String,
        access_token: String,
    },
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { access_token, .. } => Some(access_token),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { username, .. } => Some(username),
            _ => None,
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Unknown => write!(f, "unknown"),
            AuthStatus::SignedOut => write!(f, "signed out"),
            AuthStatus::Guest => write!(f, "guest"),
            AuthStatus::Authenticated { username, .. } => write!(f, "signed in as {username}"),
        }
    }
}

/// Epoch stamp captured when a fetch is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

impl LoadTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    status: AuthStatus,
    epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: AuthStatus) -> Self {
        let mut session = Self::new();
        session.transition(status);
        session
    }

    /// Switch status and advance the epoch; returns the new epoch
    pub fn transition(&mut self, status: AuthStatus) -> u64 {
        self.status = status;
        self.epoch += 1;
        self.epoch
    }

    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ticket(&self) -> LoadTicket {
        LoadTicket { epoch: self.epoch }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.epoch == self.epoch
    }
}
