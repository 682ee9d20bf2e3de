use ratatui::{layout::Rect, Frame};

use crate::app::{App, Tab};
use crate::ui::{charting::render_charts, history::render_history, timer::render_timer};

/// A UI Screen boundary: renders one tab and names its keys
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
    fn legend(&self, app: &App) -> String;
}

pub struct TimerScreen;

impl Screen for TimerScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_timer(app, f, area);
    }

    fn legend(&self, app: &App) -> String {
        let action = if app.stopwatch.is_running() {
            "stop"
        } else {
            "start"
        };
        format!("(space) {action} / (f)orest / (r)oad")
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_history(app, f, area);
    }

    fn legend(&self, app: &App) -> String {
        if app.selection.is_selecting() {
            format!(
                "(space) toggle / (d)elete {} / (esc) cancel",
                app.selection.len()
            )
        } else {
            "(↑↓) move / (s)elect".to_string()
        }
    }
}

pub struct ChartsScreen;

impl Screen for ChartsScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_charts(app, f, area);
    }

    fn legend(&self, _app: &App) -> String {
        "x: run number, newest first".to_string()
    }
}

/// Helper to construct the screen for the focused tab
pub fn current_screen(tab: Tab) -> Box<dyn Screen> {
    match tab {
        Tab::Timer => Box::new(TimerScreen),
        Tab::History => Box::new(HistoryScreen),
        Tab::Charts => Box::new(ChartsScreen),
    }
}
