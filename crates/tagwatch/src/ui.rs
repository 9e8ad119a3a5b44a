//! Terminal UI for tag monitoring.

#![allow(missing_docs)]

use std::io;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use crossbeam_channel::Receiver;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Paragraph, Row, Sparkline, Table, TableState,
    },
    Frame, Terminal,
};
use smol_str::SmolStr;

use crate::history::TagHistory;
use crate::poll::{Poller, PollingEngine};
use crate::registry::TagRegistry;
use crate::tag::{Quality, Tag};

const COLOR_TEAL: Color = Color::Rgb(0, 168, 150);
const COLOR_GREEN: Color = Color::Rgb(46, 204, 113);
const COLOR_AMBER: Color = Color::Rgb(243, 156, 18);
const COLOR_RED: Color = Color::Rgb(231, 76, 60);
const COLOR_INFO: Color = Color::Rgb(142, 142, 147);

struct WritePrompt {
    name: SmolStr,
    unit: SmolStr,
    input: String,
}

struct UiState {
    tags: Vec<Tag>,
    table: TableState,
    auto_update: bool,
    prompt: Option<WritePrompt>,
    alert: Option<(String, Style)>,
    connected: bool,
}

/// Run the interactive tag monitor until the user quits.
///
/// The poller owns the sweep cadence; the UI only re-reads the registry on
/// change notifications, user actions, or manual refresh.
pub fn run_ui(
    engine: &Arc<PollingEngine>,
    poller: &Poller,
    changes: &Receiver<()>,
    connected: bool,
) -> anyhow::Result<()> {
    let registry = engine.registry();
    let mut state = UiState {
        tags: registry.list_all(),
        table: TableState::default(),
        auto_update: !poller.is_paused(),
        prompt: None,
        alert: None,
        connected,
    };
    if !state.tags.is_empty() {
        state.table.select(Some(0));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| {
        loop {
            let mut dirty = false;
            while changes.try_recv().is_ok() {
                dirty = true;
            }
            if dirty && state.auto_update {
                state.tags = registry.list_all();
            }

            terminal.draw(|frame| render(frame, &registry, engine, &mut state))?;

            if event::poll(StdDuration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && handle_key(key, &registry, engine, poller, &mut state)
                    {
                        break;
                    }
                }
            }
        }
        Ok(())
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn handle_key(
    key: KeyEvent,
    registry: &Arc<TagRegistry>,
    engine: &Arc<PollingEngine>,
    poller: &Poller,
    state: &mut UiState,
) -> bool {
    if state.prompt.is_some() {
        match key.code {
            KeyCode::Esc => state.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = state.prompt.take() {
                    submit_write(&prompt.name, prompt.input.trim(), registry, state);
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = state.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            KeyCode::Char(ch) if is_numeric_char(ch) => {
                if let Some(prompt) = state.prompt.as_mut() {
                    prompt.input.push(ch);
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Up => move_selection(state, -1),
        KeyCode::Down => move_selection(state, 1),
        KeyCode::Char('r') => {
            engine.refresh();
            state.tags = registry.list_all();
            push_alert(state, "Manual refresh complete", info_style());
        }
        KeyCode::Char('a') => {
            if poller.is_paused() {
                poller.resume();
                state.auto_update = true;
                push_alert(state, "Auto-update enabled", Style::default().fg(COLOR_GREEN));
            } else {
                poller.pause();
                state.auto_update = false;
                push_alert(state, "Auto-update disabled", Style::default().fg(COLOR_AMBER));
            }
        }
        KeyCode::Char('w') => {
            let prompt = selected_tag(state).map(|tag| WritePrompt {
                name: tag.name.clone(),
                unit: tag.unit.clone(),
                input: String::new(),
            });
            state.prompt = prompt;
        }
        KeyCode::Char('x') => {
            let Some(name) = selected_tag(state).map(|tag| tag.name.clone()) else {
                return false;
            };
            if registry.reset_to_auto(&name) {
                push_alert(
                    state,
                    format!("{name} reset to AUTO"),
                    Style::default().fg(COLOR_GREEN),
                );
            } else {
                push_alert(
                    state,
                    format!("{name} is not in WRITTEN mode"),
                    Style::default().fg(COLOR_AMBER),
                );
            }
            state.tags = registry.list_all();
        }
        KeyCode::Char('X') => {
            let count = registry.reset_all_written();
            push_alert(
                state,
                format!("Reset {count} tag(s) to AUTO"),
                Style::default().fg(COLOR_GREEN),
            );
            state.tags = registry.list_all();
        }
        _ => {}
    }
    false
}

// Accepts anything that can appear in a decimal float literal; the actual
// validation happens on submit.
fn is_numeric_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E')
}

fn submit_write(name: &str, input: &str, registry: &TagRegistry, state: &mut UiState) {
    match input.parse::<f64>() {
        Ok(value) => {
            if registry.write(name, value) {
                push_alert(
                    state,
                    format!("{name} = {value} written"),
                    Style::default().fg(COLOR_GREEN),
                );
            } else {
                push_alert(
                    state,
                    format!("tag '{name}' not found"),
                    Style::default().fg(COLOR_RED),
                );
            }
        }
        // Malformed input never reaches the registry.
        Err(_) => push_alert(
            state,
            format!("invalid number '{input}'"),
            Style::default().fg(COLOR_RED),
        ),
    }
    state.tags = registry.list_all();
}

fn selected_tag(state: &UiState) -> Option<&Tag> {
    state.table.selected().and_then(|idx| state.tags.get(idx))
}

fn move_selection(state: &mut UiState, delta: isize) {
    if state.tags.is_empty() {
        state.table.select(None);
        return;
    }
    let current = state.table.selected().unwrap_or(0) as isize;
    let last = state.tags.len() as isize - 1;
    let next = (current + delta).clamp(0, last);
    state.table.select(Some(next as usize));
}

fn push_alert(state: &mut UiState, message: impl Into<String>, style: Style) {
    state.alert = Some((message.into(), style));
}

fn info_style() -> Style {
    Style::default().fg(COLOR_INFO)
}

fn render(
    frame: &mut Frame<'_>,
    registry: &TagRegistry,
    engine: &Arc<PollingEngine>,
    state: &mut UiState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], engine, state);
    render_table(frame, chunks[1], &state.tags, &mut state.table);
    render_history(frame, chunks[2], registry, state);
    render_footer(frame, chunks[3], state);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, engine: &Arc<PollingEngine>, state: &UiState) {
    let (status, status_style) = if state.connected {
        ("CONNECTED", Style::default().fg(COLOR_GREEN))
    } else {
        ("DISCONNECTED", Style::default().fg(COLOR_RED))
    };
    let stats = engine.stats();
    let line = Line::from(vec![
        Span::styled(status, status_style.add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {} tags", state.tags.len())),
        Span::styled(
            format!(
                "  sweeps {}  last {:.1} ms  avg {:.1} ms  failures {}",
                stats.sweeps(),
                stats.last_ms,
                stats.avg_ms,
                stats.read_failures
            ),
            info_style(),
        ),
        Span::styled(
            if state.auto_update {
                "  [auto]"
            } else {
                "  [manual]"
            },
            info_style(),
        ),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" tagwatch "),
    );
    frame.render_widget(header, area);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, tags: &[Tag], table: &mut TableState) {
    let header = Row::new(["TAG NAME", "VALUE", "UNIT", "STATUS", "TIME", "QUALITY"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row<'_>> = tags
        .iter()
        .map(|tag| {
            let quality_style = match tag.quality {
                Quality::Good => Style::default().fg(COLOR_GREEN),
                Quality::Bad => Style::default().fg(COLOR_RED),
                Quality::Init => info_style(),
            };
            let mode_style = if tag.written {
                Style::default().fg(COLOR_AMBER)
            } else {
                info_style()
            };
            Row::new(vec![
                Cell::from(tag.name.as_str()),
                Cell::from(format!("{:.2}", tag.value)),
                Cell::from(tag.unit.as_str()),
                Cell::from(tag.mode()).style(mode_style),
                Cell::from(tag.stamp.as_str()),
                Cell::from(tag.quality.as_str()).style(quality_style),
            ])
        })
        .collect();
    let widget = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Tags "),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(widget, area, table);
}

fn render_history(frame: &mut Frame<'_>, area: Rect, registry: &TagRegistry, state: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let Some(tag) = selected_tag(state) else {
        frame.render_widget(block.title(" History "), area);
        return;
    };
    let history = registry.history_of(&tag.name);
    let samples = history.as_ref().map_or(0, TagHistory::len);
    let title = format!(" History: {} ({samples} samples) ", tag.name);
    let data = history
        .as_ref()
        .map(|history| scale_samples(history.values()))
        .unwrap_or_default();
    let spark = Sparkline::default()
        .block(block.title(title))
        .data(&data)
        .style(Style::default().fg(COLOR_TEAL));
    frame.render_widget(spark, area);
}

// Sparklines render u64 bars; normalize the window into 1..=101 so a flat
// series still shows up.
fn scale_samples(values: &[f64]) -> Vec<u64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|value| {
            if span <= f64::EPSILON {
                1
            } else {
                (((value - min) / span) * 100.0).round() as u64 + 1
            }
        })
        .collect()
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, state: &UiState) {
    if let Some(prompt) = state.prompt.as_ref() {
        let unit = if prompt.unit.is_empty() {
            String::new()
        } else {
            format!(" [{}]", prompt.unit)
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" Write {}{unit}: ", prompt.name),
                Style::default().fg(COLOR_AMBER).add_modifier(Modifier::BOLD),
            ),
            Span::raw(prompt.input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }
    if let Some((message, style)) = state.alert.as_ref() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {message}"), *style))),
            area,
        );
        return;
    }
    let hints = " q quit   r refresh   a auto   w write   x reset   X reset-all   up/down select";
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, info_style()))),
        area,
    );
}
