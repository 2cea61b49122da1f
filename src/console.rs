// 🖥️ Console Driver - line-oriented prompt loop
//
// Owns all interactive parsing: reads an account id, then menu codes and
// amounts, hands parsed values to the Atm and prints the notices it gets
// back. Generic over BufRead/Write so scripted sessions can be tested.
//
// End of input at any prompt is treated as "exit".

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::menu::{Atm, MenuAction, MenuCode, MenuStatus};

const SEPARATOR: &str = "------------------------------------";

/// What happened at the login prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginRound {
    LoggedIn,
    Retry,
    Quit,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `text`, then read one line. None means end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            debug!("end of input");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")
    }

    /// Startup listing of every registered account
    pub fn print_accounts(&mut self, atm: &Atm) -> Result<()> {
        self.say("Available test accounts:")?;
        for account in atm.registry().accounts() {
            let line = format!(
                "Holder: {}, Account number: {}, Balance: {}",
                account.holder_name(),
                account.id(),
                account.balance()
            );
            self.say(&line)?;
        }
        self.say(SEPARATOR)
    }

    /// Run login/menu rounds until exit is selected or input ends
    pub fn run(&mut self, atm: &mut Atm) -> Result<()> {
        self.print_accounts(atm)?;

        loop {
            if !atm.is_logged_in() {
                match self.login_round(atm)? {
                    LoginRound::LoggedIn | LoginRound::Retry => continue,
                    LoginRound::Quit => break,
                }
            }

            match self.menu_round(atm)? {
                MenuStatus::Continue => {}
                MenuStatus::LoggedOut => self.say("You have been logged out.")?,
                MenuStatus::ExitRequested => break,
            }
        }

        self.say("ATM application closed.")
    }

    fn login_round(&mut self, atm: &mut Atm) -> Result<LoginRound> {
        self.say("")?;
        self.say("Welcome to the ATM. Please log in.")?;

        let Some(id) = self.prompt("Enter your account number: ")? else {
            self.say("Shutting down the ATM. Thank you for banking with us.")?;
            return Ok(LoginRound::Quit);
        };

        let result = atm
            .login(&id)
            .map(|account| account.holder_name().to_string());
        match result {
            Ok(holder) => {
                self.say(&format!("Login successful! Welcome, {}.", holder))?;
                Ok(LoginRound::LoggedIn)
            }
            Err(err) => {
                self.say(&format!("Login failed: {}", err))?;
                let answer = self.prompt("Try again? (yes/no): ")?;
                let retry = answer
                    .map(|a| a.to_lowercase() == "yes")
                    .unwrap_or(false);
                if retry {
                    Ok(LoginRound::Retry)
                } else {
                    self.say("Shutting down the ATM. Thank you for banking with us.")?;
                    Ok(LoginRound::Quit)
                }
            }
        }
    }

    fn print_menu(&mut self, atm: &Atm) -> Result<()> {
        if let Some(account) = atm.current_account() {
            let header = format!(
                "\n[ATM MENU] (Account: {} | Holder: {})",
                account.id(),
                account.holder_name()
            );
            self.say(&header)?;
        }
        for code in MenuCode::MENU {
            self.say(&format!("{}: {}", code.number(), code.label()))?;
        }
        Ok(())
    }

    fn menu_round(&mut self, atm: &mut Atm) -> Result<MenuStatus> {
        self.print_menu(atm)?;

        let action = match self.prompt("Choose an option (1-5): ")? {
            None => MenuAction::Exit,
            Some(line) => match MenuCode::parse(&line) {
                Err(_) => MenuAction::Malformed(line),
                Ok(code) if code.needs_amount() => match self.prompt("Enter the amount: ")? {
                    None => MenuAction::Exit,
                    Some(amount) => MenuAction::build(code, Some(&amount)),
                },
                Ok(code) => MenuAction::build(code, None),
            },
        };

        let outcome = atm.dispatch(action)?;
        self.say(&outcome.notice.to_string())?;
        Ok(outcome.status)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtmConfig;
    use crate::journal::EventKind;
    use std::io::Cursor;

    fn run_script(script: &str) -> (Atm, String) {
        let mut atm = Atm::from_config(&AtmConfig::default()).unwrap();
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        console.run(&mut atm).unwrap();
        let output = String::from_utf8(console.into_output()).unwrap();
        (atm, output)
    }

    fn balance(atm: &Atm, id: &str) -> i64 {
        atm.registry().find_by_id(id).unwrap().balance()
    }

    #[test]
    fn test_startup_lists_accounts() {
        let (_, output) = run_script("");

        assert!(output.contains("Holder: John Doe, Account number: ACC001, Balance: 1000"));
        assert!(output.contains("Holder: Jane Smith, Account number: ACC002, Balance: 500"));
        assert!(output.contains("Holder: Peter Jones, Account number: ACC003, Balance: 1500"));
        assert!(output.contains(SEPARATOR));
        assert!(output.trim_end().ends_with("ATM application closed."));
    }

    #[test]
    fn test_login_and_show_balance() {
        let (atm, output) = run_script("ACC001\n1\n5\n");

        assert!(output.contains("Login successful! Welcome, John Doe."));
        assert!(output.contains("[ATM MENU] (Account: ACC001 | Holder: John Doe)"));
        assert!(output.contains("Current balance: 1000"));
        assert!(output.contains("Thank you for banking with us."));
        // Exit leaves the session in place
        assert!(atm.is_logged_in());
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let (atm, output) = run_script("ACC001\n2\n50\n3\n30\n5\n");

        assert!(output.contains("Deposited 50. Current balance: 1050"));
        assert!(output.contains("Withdrew 30. Current balance: 1020"));
        assert_eq!(balance(&atm, "ACC001"), 1020);
    }

    #[test]
    fn test_rejected_amounts_keep_balance() {
        let (atm, output) = run_script("ACC001\n2\n-100\n3\n1100\n3\nxyz\n2\nabc\n5\n");

        assert!(output.contains("Rejected: Invalid amount: -100"));
        assert!(output.contains("Rejected: Insufficient funds"));
        assert!(output.contains("Invalid input \"xyz\""));
        assert!(output.contains("Invalid input \"abc\""));
        assert_eq!(balance(&atm, "ACC001"), 1000);
    }

    #[test]
    fn test_invalid_and_malformed_selection() {
        let (atm, output) = run_script("ACC001\n9\nxyz\n5\n");

        assert!(output.contains("Invalid selection: 9"));
        assert!(output.contains("Invalid input \"xyz\""));
        assert_eq!(atm.journal().by_kind(EventKind::Exit).len(), 1);
    }

    #[test]
    fn test_logout_returns_to_login() {
        let (atm, output) = run_script("ACC001\n4\nACC002\n1\n5\n");

        assert!(output.contains("Logging out John Doe..."));
        assert!(output.contains("You have been logged out."));
        assert!(output.contains("Login successful! Welcome, Jane Smith."));
        assert!(output.contains("Current balance: 500"));
        assert_eq!(atm.current_account().unwrap().id(), "ACC002");
    }

    #[test]
    fn test_failed_login_without_retry_exits() {
        let (atm, output) = run_script("ACC999\nno\n");

        assert!(output.contains("Login failed: Account not found: ACC999"));
        assert!(output.contains("Try again? (yes/no)"));
        assert!(!atm.is_logged_in());
        assert!(!output.contains("[ATM MENU]"));
    }

    #[test]
    fn test_failed_login_with_retry() {
        let (atm, output) = run_script("ACC999\n YES \nACC003\n1\n5\n");

        assert!(output.contains("Login failed"));
        assert!(output.contains("Welcome, Peter Jones."));
        assert!(output.contains("Current balance: 1500"));
        assert_eq!(atm.journal().by_kind(EventKind::LoginFailed).len(), 1);
    }

    #[test]
    fn test_end_of_input_at_menu_exits() {
        let (atm, output) = run_script("ACC001\n2\n");

        assert!(output.contains("Enter the amount: "));
        assert!(output.trim_end().ends_with("ATM application closed."));
        assert_eq!(balance(&atm, "ACC001"), 1000);
    }
}
