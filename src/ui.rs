use anyhow::Result;
use atm_sim::{Atm, MenuAction, MenuCode, MenuStatus, Notice};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

/// Longest account id / amount the input field accepts
const MAX_INPUT: usize = 24;

/// Notices kept in the log panel
const MAX_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Menu,
    /// Waiting for the amount of a deposit or withdrawal
    Amount(MenuCode),
}

impl Screen {
    pub fn title(&self) -> &str {
        match self {
            Screen::Login => "Log in",
            Screen::Menu => "Menu",
            Screen::Amount(MenuCode::Deposit) => "Deposit amount",
            Screen::Amount(_) => "Withdrawal amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

pub struct App<'a> {
    pub atm: &'a mut Atm,
    pub screen: Screen,
    pub input: String,
    pub menu_state: ListState,
    pub log: Vec<(LogLevel, String)>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(atm: &'a mut Atm) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        let mut app = Self {
            atm,
            screen: Screen::Login,
            input: String::new(),
            menu_state,
            log: Vec::new(),
            should_quit: false,
        };

        let listing: Vec<String> = app
            .atm
            .registry()
            .accounts()
            .iter()
            .map(|a| format!("{}  {}  {}", a.id(), a.holder_name(), a.balance()))
            .collect();
        app.push_log(LogLevel::Info, "Available test accounts:".to_string());
        for line in listing {
            app.push_log(LogLevel::Info, line);
        }
        app
    }

    /// Journal size plus the kind of the latest event, for the status bar
    fn journal_summary(&self) -> String {
        let journal = self.atm.journal();
        match journal.events().last() {
            Some(event) => format!("events: {} (last: {})", journal.len(), event.kind.as_str()),
            None => "events: 0".to_string(),
        }
    }

    fn push_log(&mut self, level: LogLevel, message: String) {
        self.log.push((level, message));
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    fn push_notice(&mut self, notice: &Notice) {
        let level = match notice {
            Notice::Deposited { .. } | Notice::Withdrawn { .. } | Notice::Balance { .. } => {
                LogLevel::Success
            }
            Notice::Rejected(_) | Notice::InvalidSelection(_) | Notice::Malformed(_) => {
                LogLevel::Error
            }
            Notice::LoggedOut { .. } | Notice::Goodbye => LogLevel::Info,
        };
        self.push_log(level, notice.to_string());
    }

    /// Route one key press to the active screen
    pub fn handle_key(&mut self, key: KeyCode) {
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Menu => self.handle_menu_key(key),
            Screen::Amount(code) => self.handle_amount_key(code, key),
        }
    }

    fn edit_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if self.input.len() < MAX_INPUT => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                let id = std::mem::take(&mut self.input);
                let result = self
                    .atm
                    .login(&id)
                    .map(|account| account.holder_name().to_string());
                match result {
                    Ok(holder) => {
                        self.push_log(LogLevel::Success, format!("Welcome, {}.", holder));
                        self.menu_state.select(Some(0));
                        self.screen = Screen::Menu;
                    }
                    Err(err) => self.push_log(LogLevel::Error, format!("Login failed: {}", err)),
                }
            }
            other => self.edit_input(other),
        }
    }

    fn handle_menu_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.select(MenuCode::Exit),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => {
                let index = self.menu_state.selected().unwrap_or(0);
                if let Some(code) = MenuCode::MENU.get(index).copied() {
                    self.select(code);
                }
            }
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(d) => self.select(MenuCode::from_number(i64::from(d))),
                None => self.dispatch(MenuAction::Malformed(c.to_string())),
            },
            _ => {}
        }
    }

    fn handle_amount_key(&mut self, code: MenuCode, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.input.clear();
                self.screen = Screen::Menu;
            }
            KeyCode::Enter => {
                let raw = std::mem::take(&mut self.input);
                self.screen = Screen::Menu;
                self.dispatch(MenuAction::build(code, Some(&raw)));
            }
            other => self.edit_input(other),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = MenuCode::MENU.len() as isize;
        let current = self.menu_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.menu_state.select(Some(next as usize));
    }

    fn select(&mut self, code: MenuCode) {
        if code.needs_amount() {
            self.input.clear();
            self.screen = Screen::Amount(code);
        } else {
            self.dispatch(MenuAction::build(code, None));
        }
    }

    fn dispatch(&mut self, action: MenuAction) {
        match self.atm.dispatch(action) {
            Ok(outcome) => {
                self.push_notice(&outcome.notice);
                match outcome.status {
                    MenuStatus::Continue => {}
                    MenuStatus::LoggedOut => self.screen = Screen::Login,
                    MenuStatus::ExitRequested => self.should_quit = true,
                }
            }
            Err(err) => {
                self.push_log(LogLevel::Error, err.to_string());
                self.screen = Screen::Login;
            }
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code);
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with account info
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Menu or input
            Constraint::Percentage(60), // Notice log
        ])
        .split(chunks[1]);

    match app.screen {
        Screen::Menu => render_menu(f, content_chunks[0], app),
        Screen::Login | Screen::Amount(_) => render_input(f, content_chunks[0], app),
    }
    render_log(f, content_chunks[1], app);

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let spans = match app.atm.current_account() {
        Some(account) => vec![
            Span::styled("ATM", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled("Account: ", label),
            Span::raw(account.id().to_string()),
            Span::raw("  |  "),
            Span::styled("Holder: ", label),
            Span::raw(account.holder_name().to_string()),
            Span::raw("  |  "),
            Span::styled(account.show_balance(), Style::default().fg(Color::Green)),
        ],
        None => vec![
            Span::styled("ATM", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled("Not logged in", Style::default().fg(Color::DarkGray)),
        ],
    };

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_menu(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = MenuCode::MENU
        .iter()
        .map(|code| ListItem::new(format!(" {}: {}", code.number(), code.label())))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} ", app.screen.title())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut app.menu_state);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let prompt = match app.screen {
        Screen::Login => "Account number:",
        _ => "Amount:",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", prompt),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  > "),
            Span::styled(app.input.clone(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
    ];

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", app.screen.title())),
    );

    f.render_widget(input, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    // Newest at the bottom; keep what fits
    let visible = area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(visible);

    let lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|(level, message)| {
            let color = match level {
                LogLevel::Info => Color::White,
                LogLevel::Success => Color::Green,
                LogLevel::Error => Color::Red,
            };
            Line::from(Span::styled(format!(" {}", message), Style::default().fg(color)))
        })
        .collect();

    let log = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Messages "),
    );

    f.render_widget(log, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hints = match app.screen {
        Screen::Login => "Enter: log in | Esc: quit",
        Screen::Menu => "1-5 / ↑↓ + Enter: choose | q: exit",
        Screen::Amount(_) => "Enter: confirm | Esc: back to menu",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" Keys: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(hints),
        Span::raw(format!("  |  {}", app.journal_summary())),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use atm_sim::AtmConfig;

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    fn create_test_atm() -> Atm {
        Atm::from_config(&AtmConfig::default()).unwrap()
    }

    #[test]
    fn test_login_then_deposit() {
        let mut atm = create_test_atm();
        let mut app = App::new(&mut atm);

        type_text(&mut app, "ACC001");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.screen, Screen::Menu);

        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.screen, Screen::Amount(MenuCode::Deposit));

        type_text(&mut app, "500");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.atm.current_account().unwrap().balance(), 1500);
        assert_eq!(app.journal_summary(), "events: 2 (last: deposit)");
    }

    #[test]
    fn test_failed_login_stays_on_login() {
        let mut atm = create_test_atm();
        let mut app = App::new(&mut atm);

        type_text(&mut app, "ACC999");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.screen, Screen::Login);
        assert!(app.input.is_empty());
        assert_eq!(app.log.last().unwrap().0, LogLevel::Error);
        assert_eq!(app.journal_summary(), "events: 1 (last: login_failed)");
    }

    #[test]
    fn test_amount_escape_cancels() {
        let mut atm = create_test_atm();
        let mut app = App::new(&mut atm);
        type_text(&mut app, "ACC001");
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Char('3'));
        type_text(&mut app, "100");
        app.handle_key(KeyCode::Esc);

        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.atm.current_account().unwrap().balance(), 1000);
    }

    #[test]
    fn test_menu_navigation_and_logout() {
        let mut atm = create_test_atm();
        let mut app = App::new(&mut atm);
        type_text(&mut app, "ACC002");
        app.handle_key(KeyCode::Enter);

        // Wraps from the first entry to "Exit ATM", then back up to "Log out"
        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.menu_state.selected(), Some(3));

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.screen, Screen::Login);
        assert!(!app.atm.is_logged_in());
    }

    #[test]
    fn test_exit_and_invalid_keys() {
        let mut atm = create_test_atm();
        let mut app = App::new(&mut atm);
        type_text(&mut app, "ACC001");
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Char('9'));
        app.handle_key(KeyCode::Char('x'));
        assert!(!app.should_quit);
        assert_eq!(app.screen, Screen::Menu);

        app.handle_key(KeyCode::Char('5'));
        assert!(app.should_quit);
        assert!(app.atm.is_logged_in());
    }
}
