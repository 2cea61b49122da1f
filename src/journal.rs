// 📜 Journal - in-memory audit trail of everything the ATM did
//
// "Every change is an event": logins, money movements (accepted or
// rejected), logout and exit each append one Event. Nothing is written to
// disk; the journal lives and dies with the process.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Login,
    LoginFailed,
    BalanceViewed,
    Deposit,
    DepositRejected,
    Withdrawal,
    WithdrawalRejected,
    Logout,
    Exit,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Login => "login",
            EventKind::LoginFailed => "login_failed",
            EventKind::BalanceViewed => "balance_viewed",
            EventKind::Deposit => "deposit",
            EventKind::DepositRejected => "deposit_rejected",
            EventKind::Withdrawal => "withdrawal",
            EventKind::WithdrawalRejected => "withdrawal_rejected",
            EventKind::Logout => "logout",
            EventKind::Exit => "exit",
        }
    }
}

/// One journal entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Account the event concerns; for failed logins, the id that was typed
    pub account_id: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(kind: EventKind, account_id: &str, data: serde_json::Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            account_id: account_id.to_string(),
            data,
        }
    }
}

/// Append-only list of events in the order they happened
#[derive(Debug, Default, Clone)]
pub struct Journal {
    events: Vec<Event>,
}

impl Journal {
    pub fn new() -> Self {
        Journal { events: Vec::new() }
    }

    /// Append an event
    pub fn record(&mut self, kind: EventKind, account_id: &str, data: serde_json::Value) {
        self.events.push(Event::new(kind, account_id, data));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events for one account, oldest first
    pub fn for_account(&self, account_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.account_id == account_id)
            .collect()
    }

    /// Events of one kind, oldest first
    pub fn by_kind(&self, kind: EventKind) -> Vec<&Event> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Write one JSON object per line
    pub fn write_json_lines<W: Write>(&self, out: &mut W) -> Result<()> {
        for event in &self.events {
            let line = serde_json::to_string(event)
                .with_context(|| format!("Failed to serialize event {}", event.event_id))?;
            writeln!(out, "{}", line).context("Failed to write journal")?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
