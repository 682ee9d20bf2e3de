pub mod charting;
pub mod history;
pub mod screen;
pub mod timer;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Tab};

const HORIZONTAL_MARGIN: u16 = 2;

/// Draw the whole frame: tab bar, the focused screen, status/legend line
pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(1),    // screen
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    render_tabs(app, f, chunks[0]);

    let screen = screen::current_screen(app.tab);
    screen.render(app, f, chunks[1]);

    if let Some(status) = &app.status {
        let status = Paragraph::new(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(status, chunks[2]);
    }

    let legend = Paragraph::new(Span::styled(
        format!("{} / (tab) switch / (q)uit", screen.legend(app)),
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, chunks[3]);
}

fn render_tabs(app: &App, f: &mut Frame, area: Rect) {
    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect::<Vec<_>>();
    let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("trailtime"))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}
