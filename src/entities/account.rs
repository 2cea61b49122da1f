// 💳 Account Entity + Registry
//
// An account is a holder name, a whole-unit balance and an identifier that
// the registry hands out in creation order ("ACC001", "ACC002", ...).
//
// Invariants:
// - balance >= 0, always (deposit/withdraw are the only mutators)
// - identifiers are unique for the registry's lifetime
// - accounts are never removed, so registry slots are stable

use tracing::{debug, info, warn};

use crate::error::AtmError;

/// Default identifier prefix
pub const DEFAULT_ID_PREFIX: &str = "ACC";

/// Default zero-padding width of the identifier counter
pub const DEFAULT_ID_WIDTH: usize = 3;

/// Widest zero-padding a registry accepts
pub const MAX_ID_WIDTH: usize = 32;

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// A named balance record with a unique identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Registry-assigned identifier (e.g., "ACC001") - never changes
    id: String,

    /// Account holder (e.g., "John Doe") - never changes
    holder_name: String,

    /// Whole currency units, never negative
    balance: i64,
}

impl Account {
    /// Only the registry mints accounts, so ids stay unique
    pub(crate) fn new(id: String, holder_name: String, balance: i64) -> Self {
        Account {
            id,
            holder_name,
            balance,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Current balance
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Human-readable balance line for display
    pub fn show_balance(&self) -> String {
        balance_line(self.balance)
    }

    /// Add `amount` to the balance and return the new balance.
    ///
    /// Fails with `InvalidAmount` when `amount <= 0`; the balance is left
    /// untouched on failure.
    pub fn deposit(&mut self, amount: i64) -> Result<i64, AtmError> {
        if amount <= 0 {
            warn!(account = %self.id, amount, "deposit rejected: non-positive amount");
            return Err(AtmError::InvalidAmount(amount));
        }

        let Some(new_balance) = self.balance.checked_add(amount) else {
            warn!(account = %self.id, amount, balance = self.balance, "deposit rejected: balance overflow");
            return Err(AtmError::InvalidAmount(amount));
        };
        self.balance = new_balance;

        info!(account = %self.id, amount, balance = self.balance, "deposit accepted");
        Ok(self.balance)
    }

    /// Take `amount` from the balance and return the new balance.
    ///
    /// `InvalidAmount` is checked first (`amount <= 0`), then
    /// `InsufficientFunds` (`amount > balance`).
    pub fn withdraw(&mut self, amount: i64) -> Result<i64, AtmError> {
        if amount <= 0 {
            warn!(account = %self.id, amount, "withdrawal rejected: non-positive amount");
            return Err(AtmError::InvalidAmount(amount));
        }

        if amount > self.balance {
            warn!(
                account = %self.id,
                amount,
                balance = self.balance,
                "withdrawal rejected: insufficient funds"
            );
            return Err(AtmError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;

        info!(account = %self.id, amount, balance = self.balance, "withdrawal accepted");
        Ok(self.balance)
    }
}

pub(crate) fn balance_line(balance: i64) -> String {
    format!("Current balance: {}", balance)
}

// ============================================================================
// ACCOUNT REGISTRY
// ============================================================================

/// Owning collection of all accounts plus the identifier counter
///
/// Accounts are kept in creation order. The counter lives here (not in a
/// global), so two registries never share numbering.
///
/// Identifier numbers are `u32`. The counter is held one step wider so
/// that `u32::MAX` can still be issued; after that the registry is full.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    next_number: u64,
    id_prefix: String,
    id_width: usize,
}

impl AccountRegistry {
    /// Empty registry issuing "ACC001", "ACC002", ...
    pub fn new() -> Self {
        Self::with_counter(1)
    }

    /// Empty registry whose first identifier uses `first_number`
    pub fn with_counter(first_number: u32) -> Self {
        AccountRegistry {
            accounts: Vec::new(),
            next_number: u64::from(first_number),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            id_width: DEFAULT_ID_WIDTH,
        }
    }

    /// Empty registry with a custom identifier format.
    ///
    /// Fails with `InvalidIdWidth` when `id_width > MAX_ID_WIDTH`.
    pub fn with_format(
        id_prefix: &str,
        id_width: usize,
        first_number: u32,
    ) -> Result<Self, AtmError> {
        if id_width > MAX_ID_WIDTH {
            return Err(AtmError::InvalidIdWidth {
                width: id_width,
                max: MAX_ID_WIDTH,
            });
        }

        Ok(AccountRegistry {
            id_prefix: id_prefix.to_string(),
            id_width,
            ..Self::with_counter(first_number)
        })
    }

    /// Rewind or advance the identifier counter (test setup)
    pub fn reset_counter(&mut self, next_number: u32) {
        self.next_number = u64::from(next_number);
    }

    /// Number the next created account will receive, or None once
    /// `u32::MAX` has been issued
    pub fn next_number(&self) -> Option<u32> {
        u32::try_from(self.next_number).ok()
    }

    /// Create an account with the next sequential identifier.
    ///
    /// A negative `initial_balance` is refused with `InvalidSeed`, an
    /// identifier already in use with `DuplicateAccountId`, and a full
    /// counter with `IdSpaceExhausted`. The counter only advances when an
    /// account is actually created.
    pub fn create_account(
        &mut self,
        holder_name: &str,
        initial_balance: i64,
    ) -> Result<&Account, AtmError> {
        if initial_balance < 0 {
            return Err(AtmError::InvalidSeed {
                holder: holder_name.to_string(),
                balance: initial_balance,
            });
        }

        let Some(number) = self.next_number() else {
            warn!(holder = holder_name, "account rejected: identifier space exhausted");
            return Err(AtmError::IdSpaceExhausted);
        };

        let id = self.format_id(number);
        if self.find_by_id(&id).is_some() {
            // Only reachable after reset_counter rewinds into used numbers
            return Err(AtmError::DuplicateAccountId(id));
        }
        self.next_number = u64::from(number) + 1;

        debug!(account = %id, holder = holder_name, balance = initial_balance, "account created");

        let index = self.accounts.len();
        self.accounts
            .push(Account::new(id, holder_name.to_string(), initial_balance));
        Ok(&self.accounts[index])
    }

    fn format_id(&self, number: u32) -> String {
        format!("{}{:0width$}", self.id_prefix, number, width = self.id_width)
    }

    /// Linear scan in creation order; first match wins
    pub fn find_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.id == id)
    }

    /// Slot of an account, stable for the registry's lifetime
    pub fn position(&self, id: &str) -> Option<usize> {
        self.accounts.iter().position(|acc| acc.id == id)
    }

    pub fn get(&self, slot: usize) -> Option<&Account> {
        self.accounts.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Account> {
        self.accounts.get_mut(slot)
    }

    /// All accounts in creation order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
