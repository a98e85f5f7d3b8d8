use chrono::NaiveDate;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Alignment;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use futures::{Stream, StreamExt};
use std::error::Error;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::WhaleScopeError;
use crate::ui::core::charts::{day_ordinal, CandleData, ChartHandle, ChartSeries, LineSeries, ShareSlice};
use crate::ui::core::dates::DateRange;
use crate::ui::core::debounce::{Debouncer, RESIZE_WINDOW};
use crate::ui::core::export::{ExportFormat, ExportSink};
use crate::ui::core::format::currency;
use crate::ui::core::orchestrator::{BoardState, SectionOrchestrator, SectionPhase};
use crate::ui::core::registry::{bindings_for, ChartBinding, SectionBindings, TableBinding};
use crate::ui::core::section::Section;
use crate::ui::core::widgets::TableRow;

type DynError = Box<dyn Error + Send + Sync>;

const PALETTE: [Color; 6] = [
    Color::LightBlue,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

impl DateField {
    fn label(&self) -> &'static str {
        match self {
            DateField::Start => "Start date",
            DateField::End => "End date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Editing,
    Commit(DateField, String),
    Cancel,
}

/// In-progress edit of one of the range inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEdit {
    pub field: DateField,
    pub buffer: String,
}

impl DateEdit {
    pub fn new(field: DateField, current: &str) -> Self {
        Self {
            field,
            buffer: current.to_string(),
        }
    }

    pub fn handle(&mut self, code: KeyCode) -> EditOutcome {
        match code {
            KeyCode::Char(c) if (c.is_ascii_digit() || c == '-') && self.buffer.len() < 10 => {
                self.buffer.push(c);
                EditOutcome::Editing
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                EditOutcome::Editing
            }
            KeyCode::Enter => EditOutcome::Commit(self.field, self.buffer.clone()),
            KeyCode::Esc => EditOutcome::Cancel,
            _ => EditOutcome::Editing,
        }
    }
}

/// Section selected by a number key, `1` being the first tab.
pub fn section_for_key(c: char) -> Option<Section> {
    let n = c.to_digit(10)? as usize;
    n.checked_sub(1).and_then(|i| Section::ALL.get(i).copied())
}

struct Regions {
    header: Rect,
    tables: Rect,
    charts: Rect,
    texts: Rect,
    footer: Rect,
}

fn regions(area: Rect, bindings: &SectionBindings) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    let right = columns[1];
    let text_height = if bindings.text_slots.is_empty() {
        0
    } else if bindings.charts.is_empty() {
        right.height
    } else {
        (bindings.text_slots.len() as u16 * 3 + 2).min(right.height / 2)
    };
    let right_split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(text_height)])
        .split(right);

    Regions {
        header: rows[0],
        tables: columns[0],
        charts: right_split[0],
        texts: right_split[1],
        footer: rows[2],
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Leaves raw mode and the alternate screen when dropped.
struct TerminalGuard {
    restore: fn() -> io::Result<()>,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = (self.restore)() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

#[derive(Clone)]
pub struct Dashboard {
    pub orchestrator: SectionOrchestrator,
    pub sink: Arc<dyn ExportSink>,
    pub current_section: Arc<Mutex<Section>>,
    pub start_date: Arc<Mutex<String>>,
    pub end_date: Arc<Mutex<String>>,
    pub editing: Arc<Mutex<Option<DateEdit>>>,
    pub running: Arc<Mutex<bool>>,
}

impl Dashboard {
    pub fn new(
        orchestrator: SectionOrchestrator,
        sink: Arc<dyn ExportSink>,
        section: Section,
        range: DateRange,
    ) -> Self {
        Self {
            orchestrator,
            sink,
            current_section: Arc::new(Mutex::new(section)),
            start_date: Arc::new(Mutex::new(range.start_iso())),
            end_date: Arc::new(Mutex::new(range.end_iso())),
            editing: Arc::new(Mutex::new(None)),
            running: Arc::new(Mutex::new(true)),
        }
    }

    pub fn current_section(&self) -> Section {
        *locked(&self.current_section)
    }

    /// Fire-and-forget refresh of the current section with the entered dates.
    pub fn load_current(&self) {
        let section = self.current_section();
        let start = locked(&self.start_date).clone();
        let end = locked(&self.end_date).clone();
        if self.orchestrator.phase(section) == SectionPhase::Loading {
            log::debug!("Superseding in-flight {} load", section);
        }
        log::debug!("Refreshing {} for {} .. {}", section, start, end);
        self.orchestrator.spawn_refresh(section, &start, &end);
    }

    pub async fn run(&self) -> Result<(), DynError> {
        let terminal_err = |e: io::Error| WhaleScopeError::TerminalError(e.to_string());
        enable_raw_mode().map_err(terminal_err)?;
        let _guard = TerminalGuard {
            restore: restore_terminal,
        };
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(terminal_err)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(terminal_err)?;
        terminal.clear()?;

        let size = terminal.size()?;
        self.resize_charts(size.width, size.height);

        self.drive(EventStream::new(), |dashboard| {
            terminal.draw(|f| dashboard.render(f)).map(|_| ())
        })
        .await
    }

    /// Event loop: draws a frame, then waits for input, a settled resize or
    /// the next tick. Returns when `q` is pressed or the events run out.
    pub async fn drive<S, D>(&self, mut events: S, mut draw: D) -> Result<(), DynError>
    where
        S: Stream<Item = io::Result<Event>> + Unpin,
        D: FnMut(&Self) -> io::Result<()>,
    {
        let (resize_tx, mut resize_rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(RESIZE_WINDOW, resize_tx);
        let mut tick = tokio::time::interval(Duration::from_millis(100));

        self.load_current();

        let result: Result<(), DynError> = loop {
            if !*locked(&self.running) {
                break Ok(());
            }
            if let Err(e) = draw(self) {
                break Err(e.into());
            }

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key_input(key),
                    Some(Ok(Event::Resize(width, height))) => debouncer.trigger((width, height)),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                },
                Some((width, height)) = resize_rx.recv() => self.resize_charts(width, height),
                _ = tick.tick() => {}
            }
        };

        debouncer.cancel();
        result
    }

    fn render(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>) {
        let section = self.current_section();
        let bindings = bindings_for(section);
        let regions = regions(f.size(), bindings);
        let board = self.orchestrator.board();

        self.render_header(f, regions.header, &board);
        self.render_tables(f, regions.tables, &board, bindings);
        self.render_charts(f, regions.charts, &board, bindings);
        self.render_texts(f, regions.texts, &board, bindings);
        self.render_footer(f, regions.footer);
    }

    /// Settled terminal size in, chart column size out.
    fn resize_charts(&self, width: u16, height: u16) {
        let bindings = bindings_for(self.current_section());
        let charts = regions(Rect::new(0, 0, width, height), bindings).charts;
        self.orchestrator.on_resize_settled(charts.width, charts.height);
    }

    fn handle_key_input(&self, key: KeyEvent) {
        let edit = locked(&self.editing).as_mut().map(|edit| edit.handle(key.code));
        if let Some(outcome) = edit {
            match outcome {
                EditOutcome::Editing => {}
                EditOutcome::Cancel => *locked(&self.editing) = None,
                EditOutcome::Commit(field, value) => {
                    *locked(&self.editing) = None;
                    match field {
                        DateField::Start => *locked(&self.start_date) = value,
                        DateField::End => *locked(&self.end_date) = value,
                    }
                    self.load_current();
                }
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => *locked(&self.running) = false,
            KeyCode::Char('r') => self.load_current(),
            KeyCode::Char('s') => {
                let current = locked(&self.start_date).clone();
                *locked(&self.editing) = Some(DateEdit::new(DateField::Start, &current));
            }
            KeyCode::Char('e') => {
                let current = locked(&self.end_date).clone();
                *locked(&self.editing) = Some(DateEdit::new(DateField::End, &current));
            }
            KeyCode::Char('c') => self.export(ExportFormat::Csv),
            KeyCode::Char('p') => self.export(ExportFormat::Pdf),
            KeyCode::Char(c) => {
                if let Some(section) = section_for_key(c) {
                    *locked(&self.current_section) = section;
                    self.load_current();
                }
            }
            _ => {}
        }
    }

    fn export(&self, format: ExportFormat) {
        let section = self.current_section();
        if let Some(path) = self
            .orchestrator
            .export_section(section, format, self.sink.as_ref())
        {
            log::info!("Exported {} to {}", section, path.display());
        }
    }

    fn render_header(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, board: &BoardState) {
        let current = self.current_section();
        let bindings = bindings_for(current);

        let mut tabs = vec![Span::styled(
            "WHALESCOPE ",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )];
        for section in Section::ALL {
            let style = if section == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            tabs.push(Span::styled(
                format!(" {} {} ", section.index() + 1, section.title()),
                style,
            ));
        }

        let status = board.widgets.status(bindings.status).unwrap_or("Idle");
        let status_color = if status.starts_with("Error") {
            Color::Red
        } else {
            match board.phase(current) {
                SectionPhase::Failed => Color::Red,
                SectionPhase::Rendered => Color::Green,
                SectionPhase::Loading => Color::Yellow,
                SectionPhase::Idle => Color::Gray,
            }
        };

        let mut info = vec![
            Span::styled(
                format!(
                    "Range: {} → {} | ",
                    locked(&self.start_date),
                    locked(&self.end_date)
                ),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(status.to_string(), Style::default().fg(status_color)),
        ];
        if board.widgets.is_loading(bindings.loading) {
            info.push(Span::styled(
                "  ⟳ loading",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(cached) = board.cached(current) {
            info.push(Span::styled(
                format!(
                    " | Showing {} → {}, fetched {}",
                    cached.range.start_iso(),
                    cached.range.end_iso(),
                    cached.fetched_at.format("%H:%M:%S")
                ),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let header = Paragraph::new(Text::from(vec![Line::from(tabs), Line::from(info)]))
            .block(Block::default().borders(Borders::BOTTOM));

        f.render_widget(header, area);
    }

    fn render_tables(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        board: &BoardState,
        bindings: &SectionBindings,
    ) {
        if bindings.tables.is_empty() {
            return;
        }

        let constraints: Vec<Constraint> = bindings
            .tables
            .iter()
            .map(|table| {
                let rows = board.widgets.rows(table.id).map_or(1, <[TableRow]>::len);
                Constraint::Min(rows.min(12) as u16 + 3)
            })
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (table, chunk) in bindings.tables.iter().zip(chunks.iter()) {
            self.render_table(f, *chunk, table, board.widgets.rows(table.id));
        }
    }

    fn render_table(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        binding: &TableBinding,
        rows: Option<&[TableRow]>,
    ) {
        let block = Block::default().borders(Borders::ALL).title(binding.title);

        // A lone spanning row is a notice, drawn across the whole body.
        if let Some([TableRow::Spanning { text, .. }]) = rows {
            let notice = Paragraph::new(text.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(notice, area);
            return;
        }

        let body = rows.unwrap_or_default().iter().map(|row| match row {
            TableRow::Cells(cells) => Row::new(cells.iter().map(|c| Cell::from(c.as_str()))),
            TableRow::Spanning { text, .. } => Row::new(vec![Cell::from(text.as_str())])
                .style(Style::default().fg(Color::DarkGray)),
        });

        let share = 100 / binding.columns.len().max(1) as u16;
        let widths: Vec<Constraint> = binding
            .columns
            .iter()
            .map(|_| Constraint::Percentage(share))
            .collect();

        let table = Table::new(body)
            .header(
                Row::new(binding.columns.to_vec())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .widths(&widths)
            .block(block);

        f.render_widget(table, area);
    }

    fn render_charts(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        board: &BoardState,
        bindings: &SectionBindings,
    ) {
        if bindings.charts.is_empty() || area.height == 0 {
            return;
        }

        let count = bindings.charts.len() as u32;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                bindings
                    .charts
                    .iter()
                    .map(|_| Constraint::Ratio(1, count))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (chart, chunk) in bindings.charts.iter().zip(chunks.iter()) {
            match board.charts.get(chart.id) {
                Some(handle) => match &handle.series {
                    ChartSeries::Candles(candles) => self.render_candle_chart(f, *chunk, handle, candles),
                    ChartSeries::Lines(lines) => self.render_line_chart(f, *chunk, handle, lines),
                    ChartSeries::Shares(slices) => self.render_share_chart(f, *chunk, handle, slices),
                },
                None => self.render_chart_placeholder(f, *chunk, chart, board),
            }
        }
    }

    fn render_chart_placeholder(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        chart: &ChartBinding,
        board: &BoardState,
    ) {
        let message = board
            .widgets
            .text(chart.error_slot)
            .unwrap_or("Waiting for data...");
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(chart.title));
        f.render_widget(paragraph, area);
    }

    fn render_line_chart(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        handle: &ChartHandle,
        lines: &[LineSeries],
    ) {
        let points: Vec<Vec<(f64, f64)>> = lines
            .iter()
            .map(|line| {
                line.points
                    .iter()
                    .map(|(date, value)| (day_ordinal(*date), *value))
                    .collect()
            })
            .collect();

        let [mut x0, mut x1] = handle.x_bounds().unwrap_or_else(|| {
            let ordinals = || points.iter().flatten().map(|(x, _)| *x);
            [
                ordinals().fold(f64::INFINITY, f64::min),
                ordinals().fold(f64::NEG_INFINITY, f64::max),
            ]
        });
        if !(x0.is_finite() && x1.is_finite()) {
            return;
        }
        if x1 <= x0 {
            x0 -= 0.5;
            x1 += 0.5;
        }

        let datasets: Vec<Dataset> = lines
            .iter()
            .zip(points.iter())
            .enumerate()
            .map(|(i, (line, data))| {
                Dataset::default()
                    .name(line.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(data)
            })
            .collect();

        let ticks = handle.layout.x_ticks.max(2);
        let x_labels: Vec<Span> = (0..ticks)
            .map(|i| {
                let ordinal = x0 + (x1 - x0) * i as f64 / (ticks - 1) as f64;
                let label = NaiveDate::from_num_days_from_ce_opt(ordinal.round() as i32)
                    .map(|d| d.format("%m-%d").to_string())
                    .unwrap_or_default();
                Span::styled(label, Style::default().fg(Color::Gray))
            })
            .collect();

        let [y0, y1] = handle.y_bounds;
        let y_labels = vec![
            Span::raw(Self::format_axis(y0)),
            Span::raw(Self::format_axis((y0 + y1) / 2.0)),
            Span::raw(Self::format_axis(y1)),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(handle.options.title.as_str())
                    .title_alignment(Alignment::Center),
            )
            .x_axis(Axis::default().bounds([x0, x1]).labels(x_labels))
            .y_axis(
                Axis::default()
                    .bounds([y0, y1])
                    .labels(y_labels)
                    .style(Style::default().fg(Color::Gray)),
            );

        f.render_widget(chart, area);
    }

    fn render_candle_chart(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        handle: &ChartHandle,
        candles: &[CandleData],
    ) {
        let chart_block = Block::default()
            .borders(Borders::ALL)
            .title(handle.options.title.as_str());

        let inner_area = chart_block.inner(area);
        if inner_area.height < 3 || inner_area.width < 10 || candles.is_empty() {
            return;
        }
        f.render_widget(chart_block, area);

        let [min_price, max_price] = handle.y_bounds;
        let price_range = max_price - min_price;
        let [x0, x1] = handle.x_bounds().unwrap_or_else(|| {
            let ordinals = || candles.iter().map(|c| day_ordinal(c.date));
            [
                ordinals().fold(f64::INFINITY, f64::min),
                ordinals().fold(f64::NEG_INFINITY, f64::max),
            ]
        });
        let day_span = (x1 - x0).max(1.0);

        // Leave room on the right for the price labels.
        let plot_width = inner_area.width.saturating_sub(9).max(1);
        let candle_width = (plot_width as usize / candles.len()).clamp(1, 3) as u16;
        let last_row = (inner_area.height - 1) as f64;
        let row = |price: f64| -> u16 {
            let scaled = ((price - min_price) / price_range * last_row)
                .round()
                .clamp(0.0, last_row);
            inner_area.y + (inner_area.height - 1) - scaled as u16
        };

        for candle in candles {
            let offset = ((day_ordinal(candle.date) - x0) / day_span
                * plot_width.saturating_sub(candle_width) as f64)
                .round()
                .max(0.0) as u16;
            let x = inner_area.x + offset;
            if x + candle_width > inner_area.right() {
                break;
            }

            let is_bullish = candle.close >= candle.open;
            let color = if is_bullish { Color::Green } else { Color::Red };

            // Wick from high to low
            for y in row(candle.high)..=row(candle.low) {
                let wick = Paragraph::new("│").style(Style::default().fg(color));
                f.render_widget(wick, Rect::new(x + candle_width / 2, y, 1, 1));
            }

            let (open_y, close_y) = (row(candle.open), row(candle.close));
            for y in open_y.min(close_y)..=open_y.max(close_y) {
                for w in 0..candle_width {
                    let body = Paragraph::new("█").style(Style::default().fg(color));
                    f.render_widget(body, Rect::new(x + w, y, 1, 1));
                }
            }
        }

        let top_label =
            Paragraph::new(Self::format_axis(max_price)).style(Style::default().fg(Color::Gray));
        let bottom_label =
            Paragraph::new(Self::format_axis(min_price)).style(Style::default().fg(Color::Gray));

        f.render_widget(
            top_label,
            Rect::new(inner_area.right() - 8, inner_area.y, 8, 1),
        );
        f.render_widget(
            bottom_label,
            Rect::new(inner_area.right() - 8, inner_area.bottom() - 1, 8, 1),
        );
    }

    fn render_share_chart(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        handle: &ChartHandle,
        slices: &[ShareSlice],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(handle.options.title.as_str());
        let inner_area = block.inner(area);
        f.render_widget(block, area);

        let bar_width = inner_area.width.saturating_sub(12 + 24) as f64;
        let lines: Vec<Line> = slices
            .iter()
            .enumerate()
            .map(|(i, slice)| {
                let filled = (slice.share / 100.0 * bar_width).round().max(1.0) as usize;
                Line::from(vec![
                    Span::styled(
                        format!("{:<12}", slice.label),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        "█".repeat(filled),
                        Style::default().fg(PALETTE[i % PALETTE.len()]),
                    ),
                    Span::raw(format!(" {:.2}% ({})", slice.share, currency(slice.backing))),
                ])
            })
            .collect();

        f.render_widget(Paragraph::new(lines), inner_area);
    }

    fn render_texts(
        &self,
        f: &mut Frame<CrosstermBackend<io::Stdout>>,
        area: Rect,
        board: &BoardState,
        bindings: &SectionBindings,
    ) {
        if bindings.text_slots.is_empty() || area.height == 0 {
            return;
        }

        let lines: Vec<Line> = bindings
            .text_slots
            .iter()
            .map(|slot| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", slot.label),
                        Style::default()
                            .fg(Color::LightCyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(board.widgets.text(slot.id).unwrap_or("-").to_string()),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Insights"));
        f.render_widget(paragraph, area);
    }

    fn render_footer(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        let controls = match locked(&self.editing).as_ref() {
            Some(edit) => vec![
                Span::styled(
                    format!("{}: ", edit.field.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{}_", edit.buffer), Style::default().fg(Color::Yellow)),
                Span::raw("  (YYYY-MM-DD, "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" apply, "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" cancel)"),
            ],
            None => vec![
                Span::raw("Controls: "),
                Span::styled("1-5", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Section  "),
                Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Refresh  "),
                Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Start date  "),
                Span::styled("e", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" End date  "),
                Span::styled("c", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Export CSV  "),
                Span::styled("p", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Export PDF  "),
                Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" Quit"),
            ],
        };

        let footer = Paragraph::new(Line::from(controls))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::TOP));

        f.render_widget(footer, area);
    }

    fn format_axis(value: f64) -> String {
        if value.abs() > 1_000_000.0 {
            format!("{:.2}M", value / 1_000_000.0)
        } else if value.abs() > 1_000.0 {
            format!("{:.2}K", value / 1_000.0)
        } else {
            format!("{:.2}", value)
        }
    }
}
