use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use squad_terminal::config::Config;
use squad_terminal::predict_fetch::PredictClient;
use squad_terminal::provider::{spawn_predict_provider, submit_current_page};
use squad_terminal::squad::{CardRow, PlayerCard, SquadShape};
use squad_terminal::state::{
    AppState, Delta, FormField, PageKind, PageState, ProviderCommand, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab | KeyCode::BackTab => {
                self.state.toggle_page();
                let title = self.state.screen.title();
                self.state.push_log(format!("[INFO] Opened {title}"));
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.state.current_page_mut().backspace(),
            KeyCode::Char(ch) => self.state.current_page_mut().insert_char(ch),
            _ if self.state.screen == PageKind::Custom => self.on_form_key(key),
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.state.form.select_prev(),
            KeyCode::Down => self.state.form.select_next(),
            KeyCode::Left => self.state.form.decrement(),
            KeyCode::Right => self.state.form.increment(),
            KeyCode::F(2) => {
                let text = self.state.form.to_input_text();
                self.state.custom.set_input(text);
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if submit_current_page(&mut self.state, self.cmd_tx.as_ref()).is_some() {
            self.state.push_log("[INFO] Prediction request sent");
        }
    }
}

/// Raw mode plus alternate screen; dropping it puts the terminal back, also
/// when setup fails halfway.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    let client = PredictClient::from_config(&config)?;

    let guard = TerminalGuard::enter()?;
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal = ratatui::Terminal::new(backend).context("failed to open terminal")?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_predict_provider(client, tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    drop(guard);
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        PageKind::Predict => render_predict_page(frame, chunks[1], &app.state),
        PageKind::Custom => render_custom_page(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(app.state.screen))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = format!("  .-.  {}", state.screen.title());
    let line2 = " (   )".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(screen: PageKind) -> String {
    match screen {
        PageKind::Predict => {
            "Tab Custom | Type input | Enter Predict | F1 Help | Esc Quit".to_string()
        }
        PageKind::Custom => {
            "Tab Predict | ↑/↓ Field | ←/→ Adjust | F2 Form→Input | Enter Predict | F1 Help | Esc Quit"
                .to_string()
        }
    }
}

fn render_predict_page(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
        ])
        .split(area);

    render_input(frame, rows[0], &state.predict);
    render_result(frame, rows[1], &state.predict);

    render_card_grid(frame, rows[2], &state.squad, &state.predict.card_rows(&state.squad));
}

fn render_custom_page(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(area);

    render_customization_form(frame, columns[0], state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
        ])
        .split(columns[1]);
    render_input(frame, rows[0], &state.custom);
    render_result(frame, rows[1], &state.custom);

    let results = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(30)])
        .split(rows[2]);
    let shape = state.custom.result_shape;
    render_card_grid(frame, results[0], &shape, &state.custom.card_rows(&shape));

    let team = Paragraph::new(optimized_team_text(&state.custom))
        .block(Block::default().title("Optimized Team").borders(Borders::ALL));
    frame.render_widget(team, results[1]);
}

fn optimized_team_text(page: &PageState) -> String {
    let Some(summary) = page.optimized_team() else {
        return "No optimized team yet".to_string();
    };
    let mut lines: Vec<String> = summary
        .players
        .iter()
        .map(|p| format!("{:<20} {:>5.1}", p.name, p.predicted_points))
        .collect();
    lines.push(format!("{:<20} {:>5.1}", "Total", summary.total_points));
    lines.join("\n")
}

fn render_input(frame: &mut Frame, area: Rect, page: &PageState) {
    let title = if page.in_flight > 0 {
        "Input (sending...)"
    } else {
        "Input"
    };
    let input = Paragraph::new(format!("{}_", page.input))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

fn render_result(frame: &mut Frame, area: Rect, page: &PageState) {
    let block = Block::default().title("Prediction").borders(Borders::ALL);
    if let Some(err) = &page.error {
        let paragraph = Paragraph::new(err.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let (text, style) = match &page.prediction {
        Some(result) => (result.display_text(), Style::default()),
        None => (
            "No prediction yet".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_customization_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let form = &state.form;
    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::Goalkeepers => form.shape.goalkeepers.to_string(),
                FormField::Defenders => form.shape.defenders.to_string(),
                FormField::Midfielders => form.shape.midfielders.to_string(),
                FormField::Forwards => form.shape.forwards.to_string(),
                FormField::Budget => format!("{:.1}", form.budget),
            };
            let selected = *field == form.selected;
            let prefix = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(
                format!("{prefix}{:<12} {value:>6}", form_field_label(*field)),
                style,
            )
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Team Customization").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn form_field_label(field: FormField) -> &'static str {
    match field {
        FormField::Goalkeepers => "Goalkeepers",
        FormField::Defenders => "Defenders",
        FormField::Midfielders => "Midfielders",
        FormField::Forwards => "Forwards",
        FormField::Budget => "Budget",
    }
}

fn render_card_grid(frame: &mut Frame, area: Rect, shape: &SquadShape, rows: &[CardRow]) {
    const ROW_HEIGHT: u16 = 4;
    let block = Block::default()
        .title(format!("Players ({})", shape.total()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < ROW_HEIGHT || inner.width == 0 {
        let empty = Paragraph::new("Player cards need more room")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = (inner.height / ROW_HEIGHT) as usize;
    for (i, row) in rows.iter().take(visible).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + (i as u16) * ROW_HEIGHT,
            width: inner.width,
            height: ROW_HEIGHT,
        };
        if row.cards.is_empty() {
            let empty = Paragraph::new(format!("No {}", row.position.label().to_lowercase()))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, row_area);
            continue;
        }

        let constraints = vec![Constraint::Ratio(1, row.cards.len() as u32); row.cards.len()];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(row_area);
        for (card, col) in row.cards.iter().zip(cols.iter()) {
            render_card(frame, *col, card);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &PlayerCard) {
    let block = Block::default()
        .title(card.position.code())
        .borders(Borders::ALL);
    let paragraph = match &card.player {
        Some(player) => Paragraph::new(format!(
            "{}\n{:.1} pts",
            player.name, player.predicted_points
        ))
        .style(Style::default().add_modifier(Modifier::BOLD)),
        None => Paragraph::new("--").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(paragraph.block(block), area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Squad Terminal - Help",
        "",
        "Global:",
        "  Tab          Switch page",
        "  (type)       Edit input",
        "  Backspace    Delete character",
        "  Enter        Send prediction request",
        "  F1           Toggle help",
        "  Esc / Ctrl-C Quit",
        "",
        "Custom page:",
        "  ↑/↓          Select form field",
        "  ←/→          Adjust value",
        "  F2           Copy form into input",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
