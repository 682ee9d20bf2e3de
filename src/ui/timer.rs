use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::format::{format_duration, format_millis};
use crate::record::Category;

/// Render the stopwatch tab: live time, start/stop control, route choice
pub fn render_timer(app: &App, f: &mut Frame, area: Rect) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let running = app.stopwatch.is_running();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(1), // time
            Constraint::Length(1),
            Constraint::Length(3), // button
            Constraint::Length(1),
            Constraint::Length(1), // route
            Constraint::Length(1), // last run
            Constraint::Min(0),
        ])
        .split(area);

    let time = Paragraph::new(Span::styled(format_millis(app.stopwatch.elapsed_ms()), bold_style))
        .alignment(Alignment::Center);
    f.render_widget(time, chunks[1]);

    let (label, color) = if running {
        ("Stop", Color::Red)
    } else {
        ("Start", Color::Green)
    };
    let button = Paragraph::new(Span::styled(
        label,
        Style::default().patch(bold_style).fg(color),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
    f.render_widget(button, centered(chunks[3], 20));

    let mut route_spans = vec![Span::raw("Route: ")];
    for category in Category::ALL {
        let style = if category == app.route {
            Style::default()
                .patch(bold_style)
                .fg(Color::Green)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        route_spans.push(Span::styled(format!(" {category} "), style));
        route_spans.push(Span::raw(" "));
    }
    let route = Paragraph::new(Line::from(route_spans)).alignment(Alignment::Center);
    f.render_widget(route, chunks[5]);

    if let Some(last) = &app.last_run {
        let last = Paragraph::new(Span::styled(
            format!(
                "Last run: {} ({})",
                format_duration(last.duration_seconds),
                last.category
            ),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(last, chunks[6]);
    }
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
