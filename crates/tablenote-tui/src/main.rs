//! Tablenote terminal front end
//!
//! A terminal table editor built with crossterm and ratatui on top of `tablenote-core`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tablenote-tui -- --config tablenote.toml --export-dir ~/reports
//! ```
//!
//! Logs go to `--log-file` (default `tablenote.log`), filtered by `RUST_LOG`.
//!
//! # Shortcuts
//!
//! - Arrows: move the active cell
//! - Enter: edit the active cell (Enter commits, Esc cancels)
//! - h: edit the header
//! - r / c: add a row / column
//! - t: insert the Daily Breakage block
//! - u / U: undo / redo
//! - b: toggle bold
//! - f / g: cycle text / background color
//! - y: copy the active cell's format; p: apply it to the active cell
//! - < / >: narrow / widen the active column
//! - Mouse: click selects (or applies a copied format), drag a column edge to resize
//! - e: export `table.png`
//! - q: quit

use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color as TermColor, Modifier, Style},
    widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table},
};
use std::{
    fs,
    io::{self, stdout},
    path::{Path, PathBuf},
    time::Duration,
};
use tablenote_core::{
    CellAddress, Color, ColumnResize, Command, CommandExecutor, CommandResult, EditCommand,
    FormatCommand, GridConfig, GridStateManager, SelectionCommand, SystemClock, ViewCommand,
};
use tablenote_render::PngRenderer;

/// Pixels represented by one terminal column.
const PX_PER_COLUMN: u32 = 10;
/// Pixels represented by one terminal line.
const PX_PER_LINE: u32 = 40;
/// Width step of the `<` / `>` keys.
const WIDTH_STEP: u32 = 10;

/// Text colors offered by `f`, in cycling order.
const TEXT_PALETTE: [Color; 5] = [
    Color::SLATE,
    Color::rgb(0xdc, 0x26, 0x26),
    Color::rgb(0x16, 0xa3, 0x4a),
    Color::BLUE,
    Color::WHITE,
];
/// Background colors offered by `g`, in cycling order.
const BG_PALETTE: [Color; 5] = [
    Color::WHITE,
    Color::rgb(0xfe, 0xf0, 0x8a),
    Color::rgb(0xbb, 0xf7, 0xd0),
    Color::rgb(0xfe, 0xca, 0xca),
    Color::BLUE,
];

#[derive(Parser, Debug)]
#[command(name = "tablenote", version, about = "Edit report tables and export them as PNG.")]
struct Cli {
    /// Grid configuration file (TOML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where log output is written.
    #[arg(long, value_name = "PATH", default_value = "tablenote.log")]
    log_file: PathBuf,

    /// Directory receiving exported images.
    #[arg(long, value_name = "DIR", default_value = ".")]
    export_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    EditCell(CellAddress),
    EditHeader,
}

/// Screen position of one grid row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u16,
    len: u16,
}

impl Span {
    fn contains(&self, pos: u16) -> bool {
        pos >= self.start && pos < self.start + self.len
    }

    fn end(&self) -> u16 {
        self.start + self.len
    }
}

struct App {
    /// State manager
    state_manager: GridStateManager,
    /// Export destination
    export_dir: PathBuf,
    /// Whether the app should exit
    should_quit: bool,
    /// Confirm-quit mode (unexported changes)
    confirm_quit: bool,
    /// Status message
    status_message: String,
    /// Current input mode
    input_mode: InputMode,
    /// Input buffer for cell/header editing
    input_buffer: String,
    /// Column drag in progress
    resize: Option<ColumnResize>,
    /// Column positions from the last frame, for mouse hit testing
    column_spans: Vec<Span>,
    /// Row positions from the last frame
    row_spans: Vec<Span>,
}

impl App {
    fn new(config: GridConfig, export_dir: PathBuf) -> Result<Self, tablenote_core::CommandError> {
        let executor = CommandExecutor::new(config, &SystemClock)?;
        let mut state_manager = GridStateManager::new(executor);
        state_manager.subscribe(|change| {
            log::trace!(
                "state {:?}: {} -> {}",
                change.change_type,
                change.old_version,
                change.new_version
            );
        });

        Ok(Self {
            state_manager,
            export_dir,
            should_quit: false,
            confirm_quit: false,
            status_message: String::new(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            resize: None,
            column_spans: Vec::new(),
            row_spans: Vec::new(),
        })
    }

    fn execute(&mut self, command: Command) -> Option<CommandResult> {
        match self.state_manager.execute(command) {
            Ok(result) => Some(result),
            Err(err) => {
                self.status_message = err.to_string();
                None
            }
        }
    }

    fn active_cell(&self) -> Option<CellAddress> {
        self.state_manager.executor().active_cell()
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.should_quit = true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_input_key(key);
            return;
        }

        if key.code == KeyCode::Esc
            && let Some(session) = self.resize.take()
        {
            self.state_manager.cancel_column_resize(session);
            self.status_message = "Resize cancelled".to_string();
            return;
        }

        self.status_message.clear();
        match key.code {
            KeyCode::Up => self.move_selection(-1, 0),
            KeyCode::Down => self.move_selection(1, 0),
            KeyCode::Left => self.move_selection(0, -1),
            KeyCode::Right => self.move_selection(0, 1),
            KeyCode::Enter => self.start_cell_edit(),
            KeyCode::Char('h') => {
                self.finish_drag();
                self.input_buffer = self.state_manager.snapshot().header().to_string();
                self.input_mode = InputMode::EditHeader;
            }
            KeyCode::Char('r') => {
                self.execute(Command::Edit(EditCommand::InsertRow));
            }
            KeyCode::Char('c') => {
                self.execute(Command::Edit(EditCommand::InsertColumn));
            }
            KeyCode::Char('t') => {
                self.execute(Command::Edit(EditCommand::InsertTemplatedBlock));
            }
            KeyCode::Char('u') => {
                if let Some(CommandResult::Noop(_)) = self.execute(Command::Edit(EditCommand::Undo)) {
                    self.status_message = "Nothing to undo".to_string();
                }
            }
            KeyCode::Char('U') => {
                if let Some(CommandResult::Noop(_)) = self.execute(Command::Edit(EditCommand::Redo)) {
                    self.status_message = "Nothing to redo".to_string();
                }
            }
            KeyCode::Char('b') => {
                self.execute(Command::Format(FormatCommand::ToggleBold));
            }
            KeyCode::Char('f') => self.cycle_text_color(),
            KeyCode::Char('g') => self.cycle_bg_color(),
            KeyCode::Char('y') => {
                if let Some(CommandResult::Success) =
                    self.execute(Command::Format(FormatCommand::CopyFormat))
                {
                    self.status_message = "Format copied; click a cell or press p".to_string();
                }
            }
            KeyCode::Char('p') => {
                if let Some(active) = self.active_cell() {
                    self.execute(Command::Selection(SelectionCommand::Click {
                        row: active.row,
                        col: active.col,
                    }));
                }
            }
            KeyCode::Char('<') => self.step_column_width(false),
            KeyCode::Char('>') => self.step_column_width(true),
            KeyCode::Char('e') => self.start_export(),
            KeyCode::Char('q') => {
                if self.state_manager.is_modified() {
                    self.confirm_quit = true;
                    self.status_message = "Changes were not exported. Quit anyway? (y/n)".to_string();
                } else {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                let command = match self.input_mode {
                    InputMode::EditCell(address) => Command::Edit(EditCommand::SetText {
                        row: address.row,
                        col: address.col,
                        text,
                    }),
                    InputMode::EditHeader => Command::Edit(EditCommand::SetHeader { text }),
                    InputMode::Normal => return,
                };
                self.input_mode = InputMode::Normal;
                self.execute(command);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: String) {
        if self.input_mode != InputMode::Normal {
            self.input_buffer.push_str(&text.replace(['\r', '\n'], " "));
        }
    }

    fn move_selection(&mut self, d_row: isize, d_col: isize) {
        let snapshot = self.state_manager.snapshot();
        let (rows, cols) = (snapshot.row_count(), snapshot.col_count());
        if rows == 0 || cols == 0 {
            return;
        }

        let target = match self.active_cell() {
            Some(active) => CellAddress::new(
                active.row.saturating_add_signed(d_row).min(rows - 1),
                active.col.saturating_add_signed(d_col).min(cols - 1),
            ),
            None => CellAddress::new(0, 0),
        };
        self.execute(Command::Selection(SelectionCommand::Select {
            row: target.row,
            col: target.col,
        }));
    }

    fn start_cell_edit(&mut self) {
        let Some(active) = self.active_cell() else {
            self.status_message = "Select a cell first".to_string();
            return;
        };
        self.finish_drag();
        self.input_buffer = self
            .state_manager
            .snapshot()
            .cell(active.row, active.col)
            .map(|cell| cell.text.clone())
            .unwrap_or_default();
        self.input_mode = InputMode::EditCell(active);
    }

    /// Input modes swallow mouse events, so a drag cannot outlive the switch.
    fn finish_drag(&mut self) {
        if let Some(session) = self.resize.take() {
            self.state_manager.finish_column_resize(session);
        }
    }

    fn cycle_text_color(&mut self) {
        let Some(cell) = self
            .active_cell()
            .and_then(|a| self.state_manager.snapshot().cell(a.row, a.col))
        else {
            return;
        };
        let color = next_in_palette(&TEXT_PALETTE, cell.text_color);
        self.execute(Command::Format(FormatCommand::SetTextColor { color }));
    }

    fn cycle_bg_color(&mut self) {
        let Some(cell) = self
            .active_cell()
            .and_then(|a| self.state_manager.snapshot().cell(a.row, a.col))
        else {
            return;
        };
        let color = next_in_palette(&BG_PALETTE, cell.bg_color);
        self.execute(Command::Format(FormatCommand::SetBackgroundColor { color }));
    }

    fn step_column_width(&mut self, wider: bool) {
        let Some(active) = self.active_cell() else {
            return;
        };
        let Some(current) = self.state_manager.snapshot().grid().col_width(active.col) else {
            return;
        };
        let width = if wider {
            current.saturating_add(WIDTH_STEP)
        } else {
            current.saturating_sub(WIDTH_STEP).max(1)
        };
        self.execute(Command::View(ViewCommand::SetColumnWidth {
            col: active.col,
            width,
        }));
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.input_mode != InputMode::Normal || self.confirm_quit {
            return;
        }
        let pointer_x = (u32::from(mouse.column) * PX_PER_COLUMN) as i32;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(col) = self.edge_at(mouse.column, mouse.row) {
                    self.begin_resize(col, pointer_x);
                } else if let Some(address) = self.cell_at(mouse.column, mouse.row) {
                    self.state_manager.click(address.row, address.col).ok();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(session) = &self.resize {
                    self.state_manager.drag_column_resize(session, pointer_x);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(session) = self.resize.take() {
                    self.state_manager.finish_column_resize(session);
                }
            }
            _ => {}
        }
    }

    fn begin_resize(&mut self, col: usize, pointer_x: i32) {
        let Some(session) = self.state_manager.begin_column_resize(col, pointer_x) else {
            return;
        };
        log::debug!("drag started on column {col}");
        self.resize = Some(session.on_release(move || {
            log::debug!("drag on column {col} released");
        }));
    }

    /// Column whose right edge (the gap after it) is at the given position.
    fn edge_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.row_spans.iter().any(|span| span.contains(y)) {
            return None;
        }
        self.column_spans.iter().position(|span| span.end() == x)
    }

    fn cell_at(&self, x: u16, y: u16) -> Option<CellAddress> {
        let row = self.row_spans.iter().position(|span| span.contains(y))?;
        let col = self.column_spans.iter().position(|span| span.contains(x))?;
        Some(CellAddress::new(row, col))
    }

    fn start_export(&mut self) {
        if self.state_manager.is_exporting() {
            self.status_message = "Export already running".to_string();
            return;
        }
        if let Err(err) = fs::create_dir_all(&self.export_dir) {
            self.status_message = format!("Cannot create {}: {err}", self.export_dir.display());
            return;
        }
        self.state_manager.start_export(PngRenderer::new());
        self.status_message = "Exporting...".to_string();
    }

    fn poll_export(&mut self) {
        let Some(result) = self.state_manager.poll_export() else {
            return;
        };
        self.status_message = match result.and_then(|image| image.save_to(&self.export_dir)) {
            Ok(path) => {
                log::info!("exported {}", path.display());
                format!("Exported {}", path.display())
            }
            Err(err) => {
                log::error!("export failed: {err}");
                format!("Export failed: {err}")
            }
        };
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(3),    // grid
                Constraint::Length(1), // status line
                Constraint::Length(1), // shortcuts
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_grid(frame, chunks[1]);
        self.render_status_line(frame, chunks[2]);
        self.render_shortcuts(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let text = if self.input_mode == InputMode::EditHeader {
            format!("{}▏", self.input_buffer)
        } else {
            self.state_manager.snapshot().header().to_string()
        };
        let header = Paragraph::new(text).style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(header, area);
    }

    fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
        let snapshot = self.state_manager.snapshot();
        let active = self.active_cell();
        let grid = snapshot.grid();

        let widths: Vec<u16> = grid.col_widths().iter().map(|&w| px_to_columns(w)).collect();
        let heights: Vec<u16> = grid.row_heights().iter().map(|&h| px_to_lines(h)).collect();

        let rows: Vec<Row> = grid
            .rows()
            .enumerate()
            .map(|(r, cells)| {
                let cells = cells.iter().enumerate().map(|(c, cell)| {
                    let address = CellAddress::new(r, c);
                    let text = match self.input_mode {
                        InputMode::EditCell(editing) if editing == address => {
                            format!("{}▏", self.input_buffer)
                        }
                        _ => cell.text.clone(),
                    };
                    let mut style = Style::default()
                        .fg(term_color(cell.text_color))
                        .bg(term_color(cell.bg_color));
                    if cell.bold {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    if active == Some(address) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    TableCell::from(text).style(style)
                });
                Row::new(cells).height(heights[r])
            })
            .collect();

        let title = format!(" {} x {} ", snapshot.row_count(), snapshot.col_count());
        let table = Table::new(rows, widths.iter().map(|&w| Constraint::Length(w)))
            .column_spacing(1)
            .flex(Flex::Start)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(table, area);

        let inner = area.inner(ratatui::layout::Margin::new(1, 1));
        self.column_spans = spans(inner.x, inner.right(), &widths, 1);
        self.row_spans = spans(inner.y, inner.bottom(), &heights, 0);
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let state = self.state_manager.get_full_state();
        let status_text = match self.input_mode {
            InputMode::EditCell(address) => {
                format!("Edit {address} > {}  (Enter=Commit, Esc=Cancel)", self.input_buffer)
            }
            InputMode::EditHeader => "Edit header  (Enter=Commit, Esc=Cancel)".to_string(),
            InputMode::Normal if !self.status_message.is_empty() => self.status_message.clone(),
            InputMode::Normal => {
                let active = state
                    .selection
                    .active_cell
                    .map_or_else(|| "-".to_string(), |a| a.to_string());
                let pending = if state.clipboard.pending.is_some() {
                    " | format copied"
                } else {
                    ""
                };
                let resizing = if state.selection.resizing { " | resizing" } else { "" };
                format!(
                    "Cell:{active} | Undo:{} Redo:{}{pending}{resizing} | {}Version:{}",
                    state.undo_redo.undo_depth,
                    state.undo_redo.redo_depth,
                    if state.grid.is_modified { "Unexported | " } else { "" },
                    state.grid.version
                )
            }
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(TermColor::DarkGray)
                .fg(TermColor::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm_quit {
            "Y:Quit without exporting  N/Esc:Cancel"
        } else {
            "Enter:Edit  h:Header  r/c:Row/Col  t:Daily Breakage  u/U:Undo/Redo  b:Bold  f/g:Colors  y/p:Copy/Apply format  </>:Width  e:Export  q:Quit"
        };
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(TermColor::Blue).fg(TermColor::White));
        frame.render_widget(shortcuts_line, area);
    }
}

fn px_to_columns(px: u32) -> u16 {
    (px / PX_PER_COLUMN).clamp(1, u32::from(u16::MAX)) as u16
}

fn px_to_lines(px: u32) -> u16 {
    (px / PX_PER_LINE).clamp(1, u32::from(u16::MAX)) as u16
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

fn next_in_palette(palette: &[Color], current: Color) -> Color {
    let next = palette
        .iter()
        .position(|&c| c == current)
        .map_or(0, |i| (i + 1) % palette.len());
    palette[next]
}

/// Lay out consecutive spans from `start`, separated by `gap`, dropping those past `limit`.
fn spans(start: u16, limit: u16, lengths: &[u16], gap: u16) -> Vec<Span> {
    let mut out = Vec::with_capacity(lengths.len());
    let mut pos = start;
    for &len in lengths {
        if pos >= limit {
            break;
        }
        let len = len.min(limit - pos);
        out.push(Span { start: pos, len });
        pos = pos.saturating_add(len).saturating_add(gap);
    }
    out
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = match &cli.config {
        Some(path) => match GridConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        None => GridConfig::default(),
    };
    log::info!("starting with {config:?}");

    let mut app = match App::new(config, cli.export_dir) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    // Set up the terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("terminal error: {err}");
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.poll_export();
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                Event::Paste(text) => app.handle_paste(text),
                _ => {}
            }
        }
    }

    Ok(())
}
