// 🔐 Session - who is logged in right now
//
// Two states: LoggedOut (initial) and LoggedIn(slot). The session never
// owns an account; it remembers the registry slot of the active one and
// borrows it from the registry on demand.

use tracing::{info, warn};

use crate::entities::{Account, AccountRegistry};
use crate::error::AtmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    /// Registry slot of the authenticated account
    LoggedIn(usize),
}

/// Runtime record of which account, if any, is authenticated
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::LoggedOut,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Look `id` up in the registry and make it the active account.
    ///
    /// On a miss the session ends up logged out, even if another account
    /// was active before.
    pub fn login<'r>(
        &mut self,
        registry: &'r AccountRegistry,
        id: &str,
    ) -> Result<&'r Account, AtmError> {
        let id = login_token(id);
        match registry
            .position(id)
            .and_then(|slot| registry.get(slot).map(|account| (slot, account)))
        {
            Some((slot, account)) => {
                self.state = SessionState::LoggedIn(slot);
                info!(account = %account.id(), holder = %account.holder_name(), "login succeeded");
                Ok(account)
            }
            None => {
                self.state = SessionState::LoggedOut;
                warn!(account = id, "login failed: unknown account");
                Err(AtmError::AccountNotFound(id.to_string()))
            }
        }
    }

    /// Always ends logged out; calling it twice is harmless
    pub fn logout(&mut self) {
        if let SessionState::LoggedIn(slot) = self.state {
            info!(slot, "logout");
        }
        self.state = SessionState::LoggedOut;
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    /// Active account, or None when logged out
    pub fn current_account<'r>(&self, registry: &'r AccountRegistry) -> Option<&'r Account> {
        match self.state {
            SessionState::LoggedIn(slot) => registry.get(slot),
            SessionState::LoggedOut => None,
        }
    }

    /// Mutable access to the active account
    pub fn current_account_mut<'r>(
        &self,
        registry: &'r mut AccountRegistry,
    ) -> Option<&'r mut Account> {
        match self.state {
            SessionState::LoggedIn(slot) => registry.get_mut(slot),
            SessionState::LoggedOut => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The identifier a login line names: its first whitespace-separated word.
/// Anything typed after it is ignored.
pub fn login_token(input: &str) -> &str {
    input.split_whitespace().next().unwrap_or("")
}

// ============================================================================
// TESTS
// ============================================================================
