// ⚙️ Configuration - identifier format and seed accounts
//
// Defaults reproduce the stock ATM: three test accounts numbered
// ACC001..ACC003. A JSON file can override any field; a CSV file
// (holder_name,balance) can replace the seed list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::entities::{AccountRegistry, DEFAULT_ID_PREFIX, DEFAULT_ID_WIDTH};
use crate::error::AtmError;

/// One account to create at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    pub holder_name: String,
    pub balance: i64,
}

impl SeedAccount {
    pub fn new(holder_name: &str, balance: i64) -> Self {
        SeedAccount {
            holder_name: holder_name.to_string(),
            balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmConfig {
    /// Identifier prefix ("ACC")
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Minimum digits of the identifier counter (3 → "ACC001")
    #[serde(default = "default_id_width")]
    pub id_width: usize,

    /// Counter value of the first account
    #[serde(default = "default_first_number")]
    pub first_number: u32,

    /// Accounts created at startup, in order
    #[serde(default = "default_accounts")]
    pub accounts: Vec<SeedAccount>,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

fn default_id_width() -> usize {
    DEFAULT_ID_WIDTH
}

fn default_first_number() -> u32 {
    1
}

fn default_accounts() -> Vec<SeedAccount> {
    vec![
        SeedAccount::new("John Doe", 1000),
        SeedAccount::new("Jane Smith", 500),
        SeedAccount::new("Peter Jones", 1500),
    ]
}

impl Default for AtmConfig {
    fn default() -> Self {
        AtmConfig {
            id_prefix: default_id_prefix(),
            id_width: default_id_width(),
            first_number: default_first_number(),
            accounts: default_accounts(),
        }
    }
}

impl AtmConfig {
    /// Load config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config JSON")
    }

    /// Replace the seed list with the rows of a CSV file
    pub fn with_seed_csv<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.accounts = load_seed_csv(path)?;
        Ok(self)
    }

    /// Create a registry holding every seed account, in order.
    ///
    /// An out-of-range `id_width` or a counter that runs out while seeding
    /// is reported as an error.
    pub fn build_registry(&self) -> Result<AccountRegistry, AtmError> {
        let mut registry =
            AccountRegistry::with_format(&self.id_prefix, self.id_width, self.first_number)?;

        for seed in &self.accounts {
            registry.create_account(&seed.holder_name, seed.balance)?;
        }

        Ok(registry)
    }
}

/// Load seed accounts from a CSV file with a `holder_name,balance` header
pub fn load_seed_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SeedAccount>> {
    let file = fs::File::open(path.as_ref())
        .with_context(|| format!("Failed to open seed CSV: {:?}", path.as_ref()))?;
    read_seed_csv(file)
}

pub fn read_seed_csv<R: Read>(reader: R) -> Result<Vec<SeedAccount>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut seeds = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let seed: SeedAccount =
            result.with_context(|| format!("Failed to parse seed account on line {}", index + 2))?;
        seeds.push(seed);
    }

    Ok(seeds)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::MAX_ID_WIDTH;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AtmConfig::default();

        assert_eq!(config.id_prefix, "ACC");
        assert_eq!(config.id_width, 3);
        assert_eq!(config.first_number, 1);
        assert_eq!(config.accounts.len(), 3);
        assert_eq!(config.accounts[0], SeedAccount::new("John Doe", 1000));
    }

    #[test]
    fn test_default_registry() {
        let registry = AtmConfig::default().build_registry().unwrap();

        let summary: Vec<(&str, &str, i64)> = registry
            .accounts()
            .iter()
            .map(|a| (a.id(), a.holder_name(), a.balance()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("ACC001", "John Doe", 1000),
                ("ACC002", "Jane Smith", 500),
                ("ACC003", "Peter Jones", 1500),
            ]
        );
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = AtmConfig::from_json(r#"{"id_prefix": "ATM", "first_number": 10}"#).unwrap();

        assert_eq!(config.id_prefix, "ATM");
        assert_eq!(config.id_width, 3);
        assert_eq!(config.accounts.len(), 3);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.accounts()[0].id(), "ATM010");
        assert_eq!(registry.accounts()[2].id(), "ATM012");
    }

    #[test]
    fn test_empty_account_list() {
        let config = AtmConfig::from_json(r#"{"accounts": []}"#).unwrap();
        assert!(config.build_registry().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_id_width_fails() {
        let config = AtmConfig::from_json(r#"{"id_width": 70000}"#).unwrap();
        assert_eq!(
            config.build_registry().unwrap_err(),
            AtmError::InvalidIdWidth {
                width: 70000,
                max: MAX_ID_WIDTH
            }
        );
    }

    #[test]
    fn test_counter_at_u32_max_fails_cleanly() {
        let config = AtmConfig::from_json(r#"{"first_number": 4294967295}"#).unwrap();
        assert_eq!(config.build_registry().unwrap_err(), AtmError::IdSpaceExhausted);

        let single = AtmConfig {
            accounts: vec![SeedAccount::new("Solo", 1)],
            ..config
        };
        let registry = single.build_registry().unwrap();
        assert_eq!(registry.accounts()[0].id(), "ACC4294967295");
    }

    #[test]
    fn test_invalid_json_fails() {
        let err = AtmConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_negative_seed_fails() {
        let config = AtmConfig {
            accounts: vec![SeedAccount::new("Broke", -10)],
            ..AtmConfig::default()
        };
        assert!(matches!(
            config.build_registry(),
            Err(AtmError::InvalidSeed { balance: -10, .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"id_width": 5, "accounts": [{{"holder_name": "Ada", "balance": 42}}]}}"#
        )
        .unwrap();

        let config = AtmConfig::from_file(file.path()).unwrap();
        let registry = config.build_registry().unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.accounts()[0].id(), "ACC00001");
        assert_eq!(registry.accounts()[0].balance(), 42);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let err = AtmConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_read_seed_csv() {
        let data = "holder_name,balance\nAlice, 300\nBob,0\n";
        let seeds = read_seed_csv(data.as_bytes()).unwrap();

        assert_eq!(
            seeds,
            vec![SeedAccount::new("Alice", 300), SeedAccount::new("Bob", 0)]
        );
    }

    #[test]
    fn test_read_seed_csv_bad_row() {
        let data = "holder_name,balance\nAlice,lots\n";
        let err = read_seed_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_with_seed_csv_replaces_accounts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "holder_name,balance").unwrap();
        writeln!(file, "Carol,750").unwrap();

        let config = AtmConfig::default().with_seed_csv(file.path()).unwrap();
        assert_eq!(config.accounts, vec![SeedAccount::new("Carol", 750)]);
        assert_eq!(config.id_prefix, "ACC");
    }
}
