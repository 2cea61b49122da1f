// Entity Models
//
// The account is the only entity: a holder name, a balance that never
// goes negative, and a registry-assigned identifier that never changes.
// The registry owns every account for the life of the process.

pub mod account;

pub use account::{Account, AccountRegistry, DEFAULT_ID_PREFIX, DEFAULT_ID_WIDTH, MAX_ID_WIDTH};
