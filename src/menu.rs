// 🏧 Menu Controller - turn a menu selection into account/session operations
//
// The controller takes already-parsed values (account id, menu code,
// amount). Reading and re-prompting belong to the drivers (console.rs and
// the TUI); they only call `Atm::login` and `Atm::dispatch`.

use serde_json::json;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::AtmConfig;
use crate::entities::account::balance_line;
use crate::entities::{Account, AccountRegistry};
use crate::error::AtmError;
use crate::journal::{EventKind, Journal};
use crate::session::{login_token, Session};

// ============================================================================
// MENU CODES
// ============================================================================

/// A menu selection as typed by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCode {
    ShowBalance,
    Deposit,
    Withdraw,
    Logout,
    Exit,
    /// Any number outside 1..=5
    Other(i64),
}

impl MenuCode {
    /// The five real entries, in menu order
    pub const MENU: [MenuCode; 5] = [
        MenuCode::ShowBalance,
        MenuCode::Deposit,
        MenuCode::Withdraw,
        MenuCode::Logout,
        MenuCode::Exit,
    ];

    pub fn from_number(n: i64) -> Self {
        match n {
            1 => MenuCode::ShowBalance,
            2 => MenuCode::Deposit,
            3 => MenuCode::Withdraw,
            4 => MenuCode::Logout,
            5 => MenuCode::Exit,
            other => MenuCode::Other(other),
        }
    }

    /// Parse a typed selection; non-numbers are `MalformedInput`
    pub fn parse(input: &str) -> Result<Self, AtmError> {
        parse_number(input).map(Self::from_number)
    }

    pub fn number(&self) -> i64 {
        match self {
            MenuCode::ShowBalance => 1,
            MenuCode::Deposit => 2,
            MenuCode::Withdraw => 3,
            MenuCode::Logout => 4,
            MenuCode::Exit => 5,
            MenuCode::Other(n) => *n,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuCode::ShowBalance => "Balance inquiry",
            MenuCode::Deposit => "Deposit",
            MenuCode::Withdraw => "Withdraw",
            MenuCode::Logout => "Log out",
            MenuCode::Exit => "Exit ATM",
            MenuCode::Other(_) => "Invalid",
        }
    }

    /// Deposit and withdraw need an amount before they can be dispatched
    pub fn needs_amount(&self) -> bool {
        matches!(self, MenuCode::Deposit | MenuCode::Withdraw)
    }
}

/// Parse a monetary amount; non-numbers are `MalformedInput`.
///
/// Sign is not checked here: `-100` parses and is rejected later by the
/// account as `InvalidAmount`.
pub fn parse_amount(input: &str) -> Result<i64, AtmError> {
    parse_number(input)
}

fn parse_number(input: &str) -> Result<i64, AtmError> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| AtmError::MalformedInput(trimmed.to_string()))
}

// ============================================================================
// ACTIONS, STATUS, NOTICES
// ============================================================================

/// One round of operator input, fully parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    ShowBalance,
    Deposit(i64),
    Withdraw(i64),
    Logout,
    Exit,
    /// A number that is not on the menu
    Unknown(i64),
    /// Text that should have been a number (menu code or amount)
    Malformed(String),
}

impl MenuAction {
    /// Build the action for `code`. `amount` is only read for deposit and
    /// withdraw; a missing or non-numeric amount becomes `Malformed`.
    pub fn build(code: MenuCode, amount: Option<&str>) -> Self {
        match code {
            MenuCode::ShowBalance => MenuAction::ShowBalance,
            MenuCode::Deposit | MenuCode::Withdraw => {
                let raw = amount.unwrap_or("");
                match parse_amount(raw) {
                    Ok(value) if code == MenuCode::Deposit => MenuAction::Deposit(value),
                    Ok(value) => MenuAction::Withdraw(value),
                    Err(_) => MenuAction::Malformed(raw.trim().to_string()),
                }
            }
            MenuCode::Logout => MenuAction::Logout,
            MenuCode::Exit => MenuAction::Exit,
            MenuCode::Other(n) => MenuAction::Unknown(n),
        }
    }
}

/// What the driver should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStatus {
    /// Show the menu again
    Continue,
    /// Session ended; go back to the login prompt
    LoggedOut,
    /// Terminate the program
    ExitRequested,
}

/// Message for the operator describing what just happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Balance { balance: i64 },
    Deposited { amount: i64, balance: i64 },
    Withdrawn { amount: i64, balance: i64 },
    Rejected(AtmError),
    LoggedOut { holder: String },
    Goodbye,
    InvalidSelection(i64),
    Malformed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Balance { balance } => write!(f, "{}", balance_line(*balance)),
            Notice::Deposited { amount, balance } => {
                write!(f, "Deposited {}. {}", amount, balance_line(*balance))
            }
            Notice::Withdrawn { amount, balance } => {
                write!(f, "Withdrew {}. {}", amount, balance_line(*balance))
            }
            Notice::Rejected(err) => write!(f, "Rejected: {}", err),
            Notice::LoggedOut { holder } => write!(f, "Logging out {}...", holder),
            Notice::Goodbye => write!(f, "Shutting down the ATM. Thank you for banking with us."),
            Notice::InvalidSelection(code) => {
                write!(f, "Invalid selection: {}. Please choose 1-5.", code)
            }
            Notice::Malformed(raw) => write!(f, "Invalid input {:?}: please enter a number.", raw),
        }
    }
}

/// Result of one dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: MenuStatus,
    pub notice: Notice,
}

impl Outcome {
    fn proceed(notice: Notice) -> Self {
        Outcome {
            status: MenuStatus::Continue,
            notice,
        }
    }
}

// ============================================================================
// ATM
// ============================================================================

/// Registry + session + journal: everything one ATM run needs
#[derive(Debug, Clone)]
pub struct Atm {
    registry: AccountRegistry,
    session: Session,
    journal: Journal,
}

impl Atm {
    pub fn new(registry: AccountRegistry) -> Self {
        Atm {
            registry,
            session: Session::new(),
            journal: Journal::new(),
        }
    }

    /// Seed a registry from `config`; an empty registry is refused
    pub fn from_config(config: &AtmConfig) -> Result<Self, AtmError> {
        let registry = config.build_registry()?;
        if registry.is_empty() {
            return Err(AtmError::EmptyRegistry);
        }
        info!(accounts = registry.len(), "registry seeded");
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.session.current_account(&self.registry)
    }

    /// Authenticate by account identifier
    pub fn login(&mut self, id: &str) -> Result<&Account, AtmError> {
        match self.session.login(&self.registry, id) {
            Ok(account) => {
                self.journal.record(
                    EventKind::Login,
                    account.id(),
                    json!({ "holder": account.holder_name() }),
                );
                Ok(account)
            }
            Err(err) => {
                self.journal.record(EventKind::LoginFailed, login_token(id), json!({}));
                Err(err)
            }
        }
    }

    /// Execute one menu action against the active account.
    ///
    /// Fails with `NoActiveSession` (and touches nothing) when logged out.
    /// Every other case, rejected amounts and bad input included, comes
    /// back as an `Outcome`.
    pub fn dispatch(&mut self, action: MenuAction) -> Result<Outcome, AtmError> {
        let Some(account) = self.session.current_account_mut(&mut self.registry) else {
            warn!(?action, "menu action without an active session");
            return Err(AtmError::NoActiveSession);
        };

        debug!(account = %account.id(), ?action, "dispatch");
        let account_id = account.id().to_string();

        let outcome = match action {
            MenuAction::ShowBalance => {
                let balance = account.balance();
                self.journal.record(
                    EventKind::BalanceViewed,
                    &account_id,
                    json!({ "balance": balance }),
                );
                Outcome::proceed(Notice::Balance { balance })
            }
            MenuAction::Deposit(amount) => match account.deposit(amount) {
                Ok(balance) => {
                    self.journal.record(
                        EventKind::Deposit,
                        &account_id,
                        json!({ "amount": amount, "balance": balance }),
                    );
                    Outcome::proceed(Notice::Deposited { amount, balance })
                }
                Err(err) => {
                    self.journal.record(
                        EventKind::DepositRejected,
                        &account_id,
                        json!({ "amount": amount, "reason": err.to_string() }),
                    );
                    Outcome::proceed(Notice::Rejected(err))
                }
            },
            MenuAction::Withdraw(amount) => match account.withdraw(amount) {
                Ok(balance) => {
                    self.journal.record(
                        EventKind::Withdrawal,
                        &account_id,
                        json!({ "amount": amount, "balance": balance }),
                    );
                    Outcome::proceed(Notice::Withdrawn { amount, balance })
                }
                Err(err) => {
                    self.journal.record(
                        EventKind::WithdrawalRejected,
                        &account_id,
                        json!({ "amount": amount, "reason": err.to_string() }),
                    );
                    Outcome::proceed(Notice::Rejected(err))
                }
            },
            MenuAction::Logout => {
                let holder = account.holder_name().to_string();
                self.journal.record(EventKind::Logout, &account_id, json!({}));
                self.session.logout();
                Outcome {
                    status: MenuStatus::LoggedOut,
                    notice: Notice::LoggedOut { holder },
                }
            }
            MenuAction::Exit => {
                info!(account = %account_id, "exit requested");
                self.journal.record(EventKind::Exit, &account_id, json!({}));
                Outcome {
                    status: MenuStatus::ExitRequested,
                    notice: Notice::Goodbye,
                }
            }
            MenuAction::Unknown(code) => {
                debug!(code, "invalid menu selection");
                Outcome::proceed(Notice::InvalidSelection(code))
            }
            MenuAction::Malformed(raw) => {
                debug!(input = %raw, "malformed input");
                Outcome::proceed(Notice::Malformed(raw))
            }
        };

        Ok(outcome)
    }
}

// ============================================================================
// TESTS
// ============================================================================
