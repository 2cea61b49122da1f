// ⚠️ ATM Errors - every failure the core can report
//
// All of these are recoverable: the caller renders the message and the
// session carries on in a well-defined state.

use thiserror::Error;

/// Domain errors for accounts, sessions and menu dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtmError {
    /// Login lookup miss
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Deposit or withdrawal of zero or a negative amount
    #[error("Invalid amount: {0} (must be a positive whole number)")]
    InvalidAmount(i64),

    /// Withdrawal larger than the current balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    /// Menu action attempted while logged out
    #[error("No active session: please log in first")]
    NoActiveSession,

    /// Non-numeric text where a number was expected
    #[error("Malformed input: {0:?} is not a whole number")]
    MalformedInput(String),

    // ========================================================================
    // STARTUP
    // ========================================================================
    /// Registry came up with no accounts
    #[error("No accounts are registered")]
    EmptyRegistry,

    /// Seed account with a negative opening balance
    #[error("Invalid seed account {holder}: opening balance {balance} is negative")]
    InvalidSeed { holder: String, balance: i64 },

    /// Counter was rewound onto an identifier that is already issued
    #[error("Account id already issued: {0}")]
    DuplicateAccountId(String),

    /// Every u32 identifier number has been issued
    #[error("No account identifiers left to issue")]
    IdSpaceExhausted,

    /// Zero-padding width outside what the registry accepts
    #[error("Invalid identifier width {width} (maximum {max})")]
    InvalidIdWidth { width: usize, max: usize },
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AtmError::AccountNotFound("ACC999".to_string()).to_string(),
            "Account not found: ACC999"
        );
        assert_eq!(
            AtmError::InsufficientFunds { requested: 1100, available: 1000 }.to_string(),
            "Insufficient funds: requested 1100, available 1000"
        );
        assert!(AtmError::MalformedInput("abc".to_string())
            .to_string()
            .contains("\"abc\""));
    }
}
