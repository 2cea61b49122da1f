// ATM Simulator - Core Library
// Exposes the account model, session, menu controller and console driver
// for the CLI binary and tests

pub mod config;
pub mod console;
pub mod entities;
pub mod error;
pub mod journal;
pub mod menu;
pub mod session;

// Re-export commonly used types
pub use config::{load_seed_csv, read_seed_csv, AtmConfig, SeedAccount};
pub use console::Console;
pub use entities::{Account, AccountRegistry};
pub use error::AtmError;
pub use journal::{Event, EventKind, Journal};
pub use menu::{parse_amount, Atm, MenuAction, MenuCode, MenuStatus, Notice, Outcome};
pub use session::{login_token, Session, SessionState};
