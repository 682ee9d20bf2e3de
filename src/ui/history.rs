use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::format::format_duration;
use crate::store::HistoryEntry;

/// Text of a single history row
pub fn entry_line(entry: &HistoryEntry<'_>, selected: bool) -> Line<'static> {
    let record = entry.record;
    let marker = if selected { "[x] " } else { "" };
    let when = record
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");

    Line::from(vec![
        Span::raw(marker),
        Span::styled(
            format!("{:>10}", format_duration(record.duration_seconds)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} / {}", when, record.category),
            Style::default().fg(Color::Gray),
        ),
    ])
}

/// Pure presenter for a single history row
pub fn present_entry(entry: &HistoryEntry<'_>, selected: bool) -> ListItem<'static> {
    let item = ListItem::new(entry_line(entry, selected));
    if selected {
        item.style(Style::default().bg(Color::Blue).fg(Color::White))
    } else {
        item
    }
}

/// Render the statistics tab: run count, overall average, newest-first list
pub fn render_history(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // summary
            Constraint::Length(1),
            Constraint::Min(0), // list
        ])
        .split(area);

    let snapshot = app.snapshot();
    let summary = Paragraph::new(Line::from(vec![
        Span::raw("Travels: "),
        Span::styled(
            snapshot.count.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Average: "),
        Span::styled(
            format_duration(snapshot.global_average),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(summary, chunks[0]);

    let entries = app.history();
    if entries.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No timer saved.",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        f.render_widget(empty, chunks[2]);
        return;
    }

    let title = if app.selection.is_selecting() {
        format!("Select runs ({} selected)", app.selection.len())
    } else {
        "Runs".to_string()
    };

    let items = entries
        .iter()
        .map(|entry| present_entry(entry, app.selection.is_selected(entry.index)))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(list, chunks[2], &mut state);
}
