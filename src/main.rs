use std::io;
use std::time::{Duration, Instant};

use chrono::DateTime;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pickem_terminal::clipboard::ClipboardFile;
use pickem_terminal::data::{self, OddsPayload};
use pickem_terminal::odds::displayed_odds;
use pickem_terminal::persist::{LoadOutcome, PickStore};
use pickem_terminal::state::{
    apply_command, resolve_drop_index, AppState, DropHalf, NoticeKind, UiCommand,
};

const ROW_HEIGHT: u16 = 2;
const MAX_WEEK: u32 = 18;
const DEFAULT_DATA_PATH: &str = "data/nfl-odds.json";

/// An in-flight pointer drag: the row it started on and whether the pointer
/// actually moved (a press-release in place is a pick click, not a reorder).
struct DragState {
    from: usize,
    moved: bool,
}

struct App {
    state: AppState,
    should_quit: bool,
    store: Option<PickStore>,
    clip: Option<ClipboardFile>,
    drag: Option<DragState>,
}

impl App {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            store: PickStore::from_env(),
            clip: ClipboardFile::from_env(),
            drag: None,
        }
    }

    fn load_initial(&mut self) {
        let path = std::env::var("PICKEM_DATA").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        match data::load_payload(path.as_ref()) {
            Ok(payload) => {
                self.state
                    .push_log(format!("[INFO] Loaded odds payload from {path}"));
                self.state.payload = payload;
            }
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] {err:#}; using fallback slate"));
                self.state.payload = OddsPayload {
                    games: data::fallback_games(),
                    ..OddsPayload::default()
                };
            }
        }

        let week = std::env::var("PICKEM_WEEK")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(self.state.payload.current_week)
            .clamp(1, MAX_WEEK);
        self.state.current_week = week;
        let slate = self.state.payload.week_games(week);
        self.state.initialize(slate);
        self.restore_saved();
    }

    /// Overlays persisted state for the current week when it still matches
    /// the live slate. Stale data is ignored silently; data that failed to
    /// decode is ignored with a warning.
    fn restore_saved(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.load(self.state.current_week, &self.state.games) {
            LoadOutcome::Restored { games, picks } => {
                self.state.restore(games, picks);
                self.state.push_log(format!(
                    "[INFO] Restored saved board for week {}",
                    self.state.current_week
                ));
            }
            LoadOutcome::Absent => {}
            LoadOutcome::Malformed => {
                self.state.push_log(format!(
                    "[WARN] Failed to restore saved data for week {}; keeping defaults",
                    self.state.current_week
                ));
            }
        }
    }

    fn save_current(&mut self) {
        if let Some(store) = &self.store {
            store.save(self.state.current_week, &self.state.games, &self.state.picks);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('J') => self.move_selected(1),
            KeyCode::Char('K') => self.move_selected(-1),
            KeyCode::Char('a') => self.pick_selected(Side::Away),
            KeyCode::Char('h') => self.pick_selected(Side::Home),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('i') => self.import(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char(']') => self.change_week(1),
            KeyCode::Char('[') => self.change_week(-1),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn move_selected(&mut self, dir: i64) {
        let from = self.state.selected;
        let to = from as i64 + dir;
        if to < 0 || to as usize >= self.state.games.len() {
            return;
        }
        self.state.move_game(from, to as usize);
        self.state.selected = to as usize;
        self.save_current();
    }

    fn pick_selected(&mut self, side: Side) {
        let Some(game) = self.state.games.get(self.state.selected) else {
            return;
        };
        let team = match side {
            Side::Away => game.away(),
            Side::Home => game.home(),
        };
        let cmd = UiCommand::Pick {
            game_id: game.id.clone(),
            team: team.to_string(),
        };
        apply_command(&mut self.state, cmd);
        self.save_current();
    }

    fn export(&mut self) {
        let Some(text) = apply_command(&mut self.state, UiCommand::Export) else {
            return;
        };
        match &self.clip {
            Some(clip) => match clip.write(&text) {
                Ok(()) => {
                    self.state
                        .push_log(format!("[INFO] Exported to {}", clip.path().display()));
                    self.state.notify("Exported to clipboard!", NoticeKind::Success);
                }
                Err(err) => {
                    self.state.push_log(format!("[WARN] Export failed: {err:#}"));
                    self.state
                        .notify("Export failed. Please try again.", NoticeKind::Error);
                }
            },
            None => {
                self.state.push_log("[WARN] No clipboard location available");
                self.state
                    .notify("Export failed. Please try again.", NoticeKind::Error);
            }
        }
    }

    fn import(&mut self) {
        let text = match &self.clip {
            Some(clip) => match clip.read() {
                Ok(text) => text,
                Err(err) => {
                    self.state.push_log(format!("[WARN] Import failed: {err:#}"));
                    self.state
                        .notify("Failed to parse clipboard data.", NoticeKind::Error);
                    return;
                }
            },
            None => {
                self.state.push_log("[WARN] No clipboard location available");
                self.state
                    .notify("Failed to parse clipboard data.", NoticeKind::Error);
                return;
            }
        };
        apply_command(&mut self.state, UiCommand::Import(text));
        let imported_ok = self
            .state
            .notice
            .as_ref()
            .is_some_and(|n| n.kind == NoticeKind::Success);
        if imported_ok {
            self.save_current();
        }
    }

    fn reset(&mut self) {
        apply_command(&mut self.state, UiCommand::Reset);
        if let Some(store) = &self.store {
            store.clear(self.state.current_week);
        }
    }

    fn change_week(&mut self, dir: i64) {
        let week = self.state.current_week as i64 + dir;
        if week < 1 || week > MAX_WEEK as i64 {
            return;
        }
        apply_command(&mut self.state, UiCommand::WeekChange(week as u32));
        self.restore_saved();
    }

    fn on_mouse(&mut self, mouse: MouseEvent, full: Rect) {
        if self.state.help_overlay {
            return;
        }
        let rows_area = board_rows_area(full);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((idx, _)) = self.row_at(rows_area, mouse.column, mouse.row) {
                    self.state.selected = idx;
                    self.drag = Some(DragState {
                        from: idx,
                        moved: false,
                    });
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(drag) = &mut self.drag {
                    drag.moved = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                let hit = self.row_at(rows_area, mouse.column, mouse.row);
                if drag.moved {
                    // Release outside the list, or on the origin row, leaves
                    // the board untouched.
                    if let Some((target, half)) = hit {
                        if target != drag.from {
                            apply_command(
                                &mut self.state,
                                UiCommand::Reorder {
                                    from: drag.from,
                                    to: target,
                                    half,
                                },
                            );
                            self.state.selected = resolve_drop_index(drag.from, target, half);
                            self.state.clamp_selection();
                            self.save_current();
                        }
                    }
                } else if let Some((idx, _)) = hit {
                    if let Some(side) = self.side_at(rows_area, mouse.column) {
                        self.state.selected = idx;
                        self.pick_selected(side);
                    }
                }
            }
            _ => {}
        }
    }

    /// Maps a terminal coordinate to (row index, vertical half). Rows are two
    /// lines tall, so the first line of a row is its upper half.
    fn row_at(&self, rows_area: Rect, x: u16, y: u16) -> Option<(usize, DropHalf)> {
        if x < rows_area.x
            || x >= rows_area.x + rows_area.width
            || y < rows_area.y
            || y >= rows_area.y + rows_area.height
        {
            return None;
        }
        let rel = y - rows_area.y;
        let visible = (rows_area.height / ROW_HEIGHT) as usize;
        let (start, end) = visible_range(self.state.selected, self.state.games.len(), visible);
        let idx = start + (rel / ROW_HEIGHT) as usize;
        if idx >= end {
            return None;
        }
        let half = if rel % ROW_HEIGHT == 0 {
            DropHalf::Upper
        } else {
            DropHalf::Lower
        };
        Some((idx, half))
    }

    fn side_at(&self, rows_area: Rect, x: u16) -> Option<Side> {
        let row = Rect {
            height: ROW_HEIGHT,
            ..rows_area
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(board_columns())
            .split(row);
        if x >= cols[1].x && x < cols[1].x + cols[1].width {
            Some(Side::Away)
        } else if x >= cols[2].x && x < cols[2].x + cols[2].width {
            Some(Side::Home)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Away,
    Home,
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new();
    app.load_initial();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.maybe_clear_notice(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => {
                    let full = terminal.size()?;
                    app.on_mouse(mouse, full);
                }
                _ => {}
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

fn layout_chunks(size: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(size)
}

/// The rect holding the game rows (board minus its column header line); the
/// mouse handler and the renderer must agree on this.
fn board_rows_area(size: Rect) -> Rect {
    let board = layout_chunks(size)[1];
    Rect {
        y: board.y + 1,
        height: board.height.saturating_sub(1),
        ..board
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = layout_chunks(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_board(frame, chunks[1], app);

    let logs = Paragraph::new(log_text(&app.state))
        .block(Block::default().borders(Borders::ALL).title("Log"));
    frame.render_widget(logs, chunks[2]);

    render_footer(frame, chunks[3], app);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let changed = if state.has_changed_from_defaults() {
        "  * changed from defaults"
    } else {
        ""
    };
    let line1 = format!("PICK'EM BOARD | Week {}{changed}", state.current_week);
    let line2 = format!(
        "{} games | odds updated {}",
        state.games.len(),
        format_updated(&state.payload.last_updated)
    );
    format!("{line1}\n{line2}")
}

fn render_board(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = board_columns();
    render_board_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let state = &app.state;
    if state.games.is_empty() {
        let empty = Paragraph::new("No games for this week")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height < ROW_HEIGHT {
        let empty = Paragraph::new("Board needs more height")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = (list_area.height / ROW_HEIGHT) as usize;
    let (start, end) = visible_range(state.selected, state.games.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + (i as u16) * ROW_HEIGHT,
            width: list_area.width,
            height: ROW_HEIGHT,
        };

        let selected = idx == state.selected;
        let dragging = app.drag.as_ref().is_some_and(|d| d.moved && d.from == idx);
        let row_style = if dragging {
            Style::default().fg(Color::Yellow)
        } else if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected || dragging {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let game = &state.games[idx];
        let (away, home) = game.sides();
        let (away_odds, home_odds) = displayed_odds(&game.odds, away, home);
        let pick = state.picks.get(&game.id).map(String::as_str);

        render_cell_lines(
            frame,
            cols[0],
            &state.confidence_rank(idx).to_string(),
            "",
            row_style,
        );
        render_team_cell(frame, cols[1], away, &away_odds, pick == Some(away), row_style);
        render_team_cell(frame, cols[2], home, &home_odds, pick == Some(home), row_style);

        let over_under = game
            .over_under
            .map(|v| v.to_string())
            .unwrap_or_else(|| "—".to_string());
        let implied = match (game.implied_away, game.implied_home) {
            (Some(a), Some(h)) => format!("A:{a:.0} H:{h:.0}"),
            _ => "—".to_string(),
        };
        render_cell_lines(frame, cols[3], &over_under, "", row_style);
        render_cell_lines(frame, cols[4], &implied, "", row_style);
        render_cell_lines(frame, cols[5], &game.info, "", row_style);
    }
}

fn board_columns() -> [Constraint; 6] {
    [
        Constraint::Length(6),
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Min(0),
    ]
}

fn render_board_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    let titles = ["Conf", "Away", "Home", "O/U", "Implied", "Info"];
    for (i, title) in titles.iter().enumerate() {
        frame.render_widget(Paragraph::new(*title).style(style), cols[i]);
    }
}

fn render_team_cell(
    frame: &mut Frame,
    area: Rect,
    team: &str,
    odds: &str,
    picked: bool,
    base: Style,
) {
    let style = if picked {
        base.fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        base
    };
    render_cell_lines(frame, area, team, odds, style);
}

fn render_cell_lines(frame: &mut Frame, area: Rect, line1: &str, line2: &str, style: Style) {
    let text = format!("{line1}\n{line2}");
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let footer = match &app.state.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Paragraph::new(notice.text.clone()).style(Style::default().fg(color))
        }
        None => Paragraph::new(
            "drag rows to rank | click a side to pick | J/K move | a/h pick | e Export | i Import | r Reset | [/] Week | ? Help | q Quit",
        ),
    };
    frame.render_widget(footer, area);
}

fn log_text(state: &AppState) -> String {
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if visible == 0 || total == 0 {
        return (0, 0);
    }
    let mut start = selected.saturating_sub(visible / 2);
    start = start.min(total.saturating_sub(visible));
    let end = (start + visible).min(total);
    (start, end)
}

fn format_updated(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%a %b %e %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay = centered_rect(60, 60, area);
    frame.render_widget(Clear, overlay);
    let text = [
        "Confidence board",
        "",
        "Drag a row with the mouse to rank it; release on the",
        "upper half of a row to land above it, lower half below.",
        "Click a team cell to pick that side.",
        "",
        "j/k or arrows  select row",
        "J/K            move selected row",
        "a/h            pick away/home for selected row",
        "e              export board to clipboard file",
        "i              import board from clipboard file",
        "r              reset to default order and picks",
        "[/]            previous/next week",
        "q              quit",
    ]
    .join("\n");
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(help, overlay);
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
