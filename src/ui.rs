use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finance_tracker::{compute_totals, form, format_amount, Kind, Ledger, LedgerError, Totals, Transaction};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Kind,
    Category,
    Amount,
    Add,
    Export,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Kind => Field::Category,
            Field::Category => Field::Amount,
            Field::Amount => Field::Add,
            Field::Add => Field::Export,
            Field::Export => Field::Kind,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Kind => Field::Export,
            Field::Category => Field::Kind,
            Field::Amount => Field::Category,
            Field::Add => Field::Amount,
            Field::Export => Field::Add,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Field::Kind => "Type",
            Field::Category => "Category",
            Field::Amount => "Amount",
            Field::Add => "",
            Field::Export => "",
        }
    }
}

/// Last message shown in the status bar, displayed verbatim
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Screen state. The ledger is the only source of truth: `transactions` and
/// `totals` are replaced wholesale from a fresh snapshot after every write.
pub struct App {
    ledger: Ledger,
    export_path: PathBuf,
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
    pub kind: Kind,
    pub category: String,
    pub amount: String,
    pub focus: Field,
    pub state: TableState,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    pub fn new(ledger: Ledger, export_path: PathBuf) -> Self {
        let mut app = Self {
            ledger,
            export_path,
            transactions: Vec::new(),
            totals: Totals::default(),
            kind: Kind::Income,
            category: String::new(),
            amount: String::new(),
            focus: Field::Category,
            state: TableState::default(),
            status: None,
            should_quit: false,
        };

        match app.ledger.ensure_schema() {
            Ok(()) => app.reload(),
            Err(err) => app.fail("Error initializing database", &err),
        }

        app
    }

    pub fn reload(&mut self) {
        match self.ledger.list_all() {
            Ok(snapshot) => self.show(snapshot),
            Err(err) => self.fail("Error loading transactions", &err),
        }
    }

    fn show(&mut self, snapshot: Vec<Transaction>) {
        self.totals = compute_totals(&snapshot);
        self.transactions = snapshot;

        if self.transactions.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(self.transactions.len() - 1));
        }
    }

    fn fail(&mut self, context: &str, err: &LedgerError) {
        tracing::warn!(error = %err, "{}", context);
        self.status = Some(Status::Error(format!("{}: {}", context, err)));
    }

    /// Validate the form, append, and refresh from the store
    pub fn submit(&mut self) {
        let new = match form::validate(self.kind.as_str(), &self.category, &self.amount) {
            Ok(new) => new,
            Err(err) => {
                tracing::warn!(error = %err, "rejected form input");
                self.status = Some(Status::Error(err.to_string()));
                return;
            }
        };

        match self.ledger.record(&new) {
            Ok(snapshot) => {
                self.show(snapshot);
                self.category.clear();
                self.amount.clear();
                self.status = Some(Status::Info(format!(
                    "Added {} {} {}",
                    new.kind,
                    new.category,
                    format_amount(new.amount)
                )));
            }
            Err(err) => self.fail("Error adding transaction", &err),
        }
    }

    pub fn export(&mut self) {
        match self.ledger.export_to(&self.export_path) {
            Ok(_) => {
                self.status = Some(Status::Info(format!(
                    "Exported transactions to {}",
                    self.export_path.display()
                )));
            }
            Err(err) => self.fail("Error exporting CSV", &err),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('e') => self.export(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => match self.focus {
                Field::Export => self.export(),
                _ => self.submit(),
            },
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if self.focus == Field::Kind => {
                self.kind = self.kind.toggle();
            }
            KeyCode::Char(c) => match self.focus {
                Field::Category => self.category.push(c),
                Field::Amount => self.amount.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.focus {
                Field::Category => {
                    self.category.pop();
                }
                Field::Amount => {
                    self.amount.pop();
                }
                _ => {}
            },
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home if !self.transactions.is_empty() => self.state.select(Some(0)),
            KeyCode::End if !self.transactions.is_empty() => {
                self.state.select(Some(self.transactions.len() - 1));
            }
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.transactions.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(20)).unwrap_or(0);
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Entry form
            Constraint::Min(0),    // Transactions
            Constraint::Length(3), // Totals
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_form(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_totals(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn field_block(app: &App, field: Field) -> Block<'static> {
    let border = if app.focus == field {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(field.title().to_string())
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(17),
        ])
        .split(area);

    let kind_color = match app.kind {
        Kind::Income => Color::Green,
        Kind::Expense => Color::Red,
    };
    let kind = Paragraph::new(Line::from(vec![
        Span::raw("◂ "),
        Span::styled(app.kind.as_str(), Style::default().fg(kind_color)),
        Span::raw(" ▸"),
    ]))
    .block(field_block(app, Field::Kind));
    f.render_widget(kind, cells[0]);

    let category = Paragraph::new(app.category.as_str()).block(field_block(app, Field::Category));
    f.render_widget(category, cells[1]);

    let amount = Paragraph::new(app.amount.as_str()).block(field_block(app, Field::Amount));
    f.render_widget(amount, cells[2]);

    let add = Paragraph::new(Span::styled(" Add", Style::default().fg(Color::Cyan)))
        .block(field_block(app, Field::Add));
    f.render_widget(add, cells[3]);

    let export = Paragraph::new(Span::styled(" Export to CSV", Style::default().fg(Color::Cyan)))
        .block(field_block(app, Field::Export));
    f.render_widget(export, cells[4]);

    // Cursor at the end of the text being edited
    let editing = match app.focus {
        Field::Category => Some((cells[1], app.category.chars().count())),
        Field::Amount => Some((cells[2], app.amount.chars().count())),
        _ => None,
    };
    if let Some((cell, len)) = editing {
        let max = cell.width.saturating_sub(2);
        f.set_cursor(cell.x + 1 + (len as u16).min(max), cell.y + 1);
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Type", "Category", "Amount"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.transactions.iter().map(|tx| {
        let color = match tx.kind() {
            Some(Kind::Income) => Color::Green,
            Some(Kind::Expense) => Color::Red,
            None => Color::White,
        };

        let cells = vec![
            Cell::from(tx.kind.clone()).style(Style::default().fg(color)),
            Cell::from(truncate(&tx.category, 40)),
            Cell::from(format!("{:>12}", format_amount(tx.amount))).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Transactions ({}) ", app.transactions.len())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let balance_color = if app.totals.balance < 0.0 {
        Color::Red
    } else {
        Color::Green
    };

    let totals = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Total Income: {}", format_amount(app.totals.income)),
            Style::default().fg(Color::Green),
        ),
        Span::raw("    "),
        Span::styled(
            format!("Total Expense: {}", format_amount(app.totals.expense)),
            Style::default().fg(Color::Red),
        ),
        Span::raw("    "),
        Span::styled(
            format!("Balance: {}", format_amount(app.totals.balance)),
            Style::default().fg(balance_color).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(totals, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = match &app.status {
        Some(Status::Error(message)) => vec![
            Span::styled(format!(" {} ", message), Style::default().fg(Color::Red)),
            Span::raw(" | "),
        ],
        Some(Status::Info(message)) => vec![
            Span::styled(format!(" {} ", message), Style::default().fg(Color::Green)),
            Span::raw(" | "),
        ],
        None => vec![Span::raw(" ")],
    };

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Field | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Type | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Add | "));
    status_spans.push(Span::styled("Ctrl-E", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Export | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Scroll | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
