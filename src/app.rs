use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::config::Config;
use crate::record::{Category, FinishedRun, TimerRecord};
use crate::runtime::{AppEvent, Sampler};
use crate::selection::SelectionState;
use crate::stats::{aggregate, chart_series, AggregateSnapshot, ChartSeries};
use crate::stopwatch::Stopwatch;
use crate::store::{newest_first, HistoryEntry, RecordIndex, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Timer,
    History,
    Charts,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Timer, Tab::History, Tab::Charts];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Timer => "Timer",
            Tab::History => "Statistics",
            Tab::Charts => "Charts",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Timer => Tab::History,
            Tab::History => Tab::Charts,
            Tab::Charts => Tab::Timer,
        }
    }
}

/// Where ticks for a running stopwatch come from
#[derive(Debug, Clone)]
struct TickSource {
    tx: Sender<AppEvent>,
    interval: Duration,
}

/// Application model: the live session plus the last loaded record snapshot
#[derive(Debug)]
pub struct App {
    pub tab: Tab,
    pub route: Category,
    pub stopwatch: Stopwatch,
    pub store: RecordStore,
    /// Storage order, oldest first; refreshed on every tab focus
    pub records: Vec<TimerRecord>,
    pub selection: SelectionState,
    /// Highlighted row in the newest-first history list
    pub cursor: usize,
    pub last_run: Option<TimerRecord>,
    pub status: Option<String>,
    pub should_quit: bool,
    ticks: Option<TickSource>,
}

impl App {
    pub fn new(store: RecordStore, config: &Config) -> Self {
        let records = store.load();
        Self {
            tab: Tab::default(),
            route: config.route,
            stopwatch: Stopwatch::new(),
            store,
            records,
            selection: SelectionState::new(),
            cursor: 0,
            last_run: None,
            status: None,
            should_quit: false,
            ticks: None,
        }
    }

    /// Give the app a channel for sampler ticks. Without one the stopwatch
    /// still works but the live display only moves on explicit `on_tick`.
    pub fn with_ticks(mut self, tx: Sender<AppEvent>, interval: Duration) -> Self {
        self.ticks = Some(TickSource { tx, interval });
        self
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        aggregate(&self.records)
    }

    pub fn chart(&self) -> ChartSeries {
        let newest: Vec<TimerRecord> = self.records.iter().rev().cloned().collect();
        chart_series(&newest)
    }

    /// Re-read the store, as each view does when it gains focus
    pub fn refresh(&mut self) {
        self.records = self.store.load();
        self.clamp_cursor();
    }

    pub fn focus(&mut self, tab: Tab) {
        if self.tab != tab {
            self.selection = std::mem::take(&mut self.selection).cancel();
        }
        self.tab = tab;
        self.refresh();
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    pub fn on_tick_at(&mut self, now: Instant) {
        self.stopwatch.sample_at(now);
    }

    pub fn toggle_timer(&mut self) {
        self.toggle_timer_at(Instant::now());
    }

    pub fn toggle_timer_at(&mut self, now: Instant) {
        if self.stopwatch.is_running() {
            self.stop_timer_at(now);
        } else {
            self.start_timer_at(now);
        }
    }

    pub fn start_timer_at(&mut self, now: Instant) {
        if !self.stopwatch.start_at(now) {
            return;
        }
        if let Some(ticks) = &self.ticks {
            self.stopwatch.attach_sampler(Sampler::spawn(
                ticks.interval,
                ticks.tx.clone(),
                AppEvent::Tick,
            ));
        }
        self.status = None;
    }

    /// Stop the running session and persist it. Returns the new record, or
    /// None if nothing was running.
    pub fn stop_timer_at(&mut self, now: Instant) -> Option<TimerRecord> {
        let run = self.stopwatch.stop_at(now)?;
        // Sessions are single-use
        self.stopwatch = Stopwatch::new();
        Some(self.save_run(run))
    }

    fn save_run(&mut self, run: FinishedRun) -> TimerRecord {
        let record = TimerRecord::from_run(run, self.route);
        match self.store.append(record.clone()) {
            Ok(()) => {
                info!(
                    "saved {} run of {} s",
                    record.category, record.duration_seconds
                );
                self.refresh();
            }
            Err(e) => {
                warn!("run kept in memory only: {e}");
                self.status = Some(format!("Could not save run: {e}"));
                self.records.push(record.clone());
            }
        }
        self.last_run = Some(record.clone());
        record
    }

    pub fn set_route(&mut self, route: Category) {
        self.route = route;
    }

    pub fn toggle_select_mode(&mut self) {
        self.selection = std::mem::take(&mut self.selection).toggle_mode();
    }

    pub fn cancel_selection(&mut self) {
        self.selection = std::mem::take(&mut self.selection).cancel();
    }

    /// Toggle the record under the cursor
    pub fn toggle_at_cursor(&mut self) {
        if let Some(index) = RecordIndex::from_newest_first(self.cursor, self.records.len()) {
            self.selection = std::mem::take(&mut self.selection).toggle(index);
        }
    }

    pub fn delete_selected(&mut self) {
        let (selection, doomed) = std::mem::take(&mut self.selection).confirm_delete();
        self.selection = selection;
        if doomed.is_empty() {
            return;
        }

        match self.store.delete(&doomed) {
            Ok(remaining) => {
                info!("deleted {} runs", doomed.len());
                self.records = remaining;
                self.status = None;
            }
            Err(e) => {
                // The list keeps mirroring storage so indices stay valid
                warn!("delete not persisted: {e}");
                self.status = Some(format!("Could not delete runs: {e}"));
            }
        }
        self.clamp_cursor();
    }

    pub fn history(&self) -> Vec<HistoryEntry<'_>> {
        newest_first(&self.records)
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.records.len() {
            self.cursor += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.records.len().saturating_sub(1));
    }

    /// Leave the app; a running session is dropped without a record
    pub fn quit(&mut self) {
        if self.stopwatch.is_running() {
            info!("quitting with a running session, discarding it");
        }
        self.stopwatch.abandon();
        self.should_quit = true;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Esc if self.selection.is_selecting() => self.cancel_selection(),
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            KeyCode::Tab => self.focus(self.tab.next()),
            KeyCode::Char('1') => self.focus(Tab::Timer),
            KeyCode::Char('2') => self.focus(Tab::History),
            KeyCode::Char('3') => self.focus(Tab::Charts),
            _ => match self.tab {
                Tab::Timer => self.on_timer_key(key),
                Tab::History => self.on_history_key(key),
                Tab::Charts => {}
            },
        }
    }

    fn on_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_timer(),
            KeyCode::Char('f') => self.set_route(Category::Forest),
            KeyCode::Char('r') => self.set_route(Category::Road),
            KeyCode::Char('c') => self.set_route(self.route.next()),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
            KeyCode::Char('s') => self.toggle_select_mode(),
            KeyCode::Char(' ') if self.selection.is_selecting() => self.toggle_at_cursor(),
            KeyCode::Char('d') if self.selection.is_selecting() => self.delete_selected(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::kv::{KeyValueStore, KvError};
    use assert_matches::assert_matches;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc;

    /// Memory store whose writes can be switched off from outside the app
    #[derive(Default)]
    struct FlakyKv {
        inner: MemoryKvStore,
        failing: Rc<Cell<bool>>,
    }

    impl KeyValueStore for FlakyKv {
        fn get(&self, key: &str) -> Result<Option<String>, KvError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
            if self.failing.get() {
                return Err(KvError::Unavailable);
            }
            self.inner.set(key, value)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(kv: MemoryKvStore) -> App {
        App::new(RecordStore::new(Box::new(kv)), &Config::default())
    }

    #[test]
    fn stop_appends_record_with_selected_route() {
        let mut app = app_with(MemoryKvStore::new());
        app.set_route(Category::Road);

        let t0 = Instant::now();
        app.start_timer_at(t0);
        let record = app.stop_timer_at(t0 + Duration::from_millis(75_400)).unwrap();

        assert_eq!(record.duration_seconds, 75.4);
        assert_eq!(record.category, Category::Road);
        assert_eq!(app.store.load(), vec![record.clone()]);
        assert_eq!(app.records, vec![record.clone()]);
        assert_eq!(app.last_run, Some(record));
        assert!(!app.stopwatch.is_running());
    }

    #[test]
    fn stop_without_start_persists_nothing() {
        let mut app = app_with(MemoryKvStore::new());
        assert!(app.stop_timer_at(Instant::now()).is_none());
        assert!(app.store.load().is_empty());
    }

    #[test]
    fn failed_write_keeps_record_in_memory() {
        let mut app = app_with(MemoryKvStore::failing_writes());
        let t0 = Instant::now();
        app.start_timer_at(t0);
        app.stop_timer_at(t0 + Duration::from_secs(5));

        assert_eq!(app.records.len(), 1);
        assert!(app.store.load().is_empty());
        assert_matches!(app.status, Some(ref msg) if msg.starts_with("Could not save run"));
    }

    #[test]
    fn ticks_update_live_elapsed() {
        let mut app = app_with(MemoryKvStore::new());
        let t0 = Instant::now();
        app.start_timer_at(t0);
        app.on_tick_at(t0 + Duration::from_millis(1_200));
        assert_eq!(app.stopwatch.elapsed_ms(), 1_200);
    }

    #[test]
    fn start_attaches_sampler_when_ticks_are_wired() {
        let (tx, rx) = mpsc::channel();
        let mut app = app_with(MemoryKvStore::new()).with_ticks(tx, Duration::from_millis(2));

        app.toggle_timer();
        assert!(app.stopwatch.has_sampler());
        assert_matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(AppEvent::Tick)
        );

        app.toggle_timer();
        assert!(!app.stopwatch.has_sampler());
        assert_eq!(app.records.len(), 1);
    }

    #[test]
    fn quit_abandons_running_session() {
        let (tx, _rx) = mpsc::channel();
        let mut app = app_with(MemoryKvStore::new()).with_ticks(tx, Duration::from_millis(2));
        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.stopwatch.is_running());

        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
        assert!(!app.stopwatch.is_running());
        assert!(!app.stopwatch.has_sampler());
        assert!(app.store.load().is_empty());
    }

    #[test]
    fn route_keys() {
        let mut app = app_with(MemoryKvStore::new());
        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.route, Category::Road);
        app.on_key(key(KeyCode::Char('c')));
        assert_eq!(app.route, Category::Forest);
    }

    #[test]
    fn select_and_delete_newest_from_history() {
        let mut app = app_with(MemoryKvStore::new());
        let t0 = Instant::now();
        for secs in [10, 20, 30] {
            app.start_timer_at(t0);
            app.stop_timer_at(t0 + Duration::from_secs(secs));
        }
        let stored = app.store.load();

        app.on_key(key(KeyCode::Char('2')));
        assert_eq!(app.tab, Tab::History);
        app.on_key(key(KeyCode::Char('s')));
        app.on_key(key(KeyCode::Char(' '))); // cursor 0 is the newest run
        app.on_key(key(KeyCode::Char('d')));

        assert!(!app.selection.is_selecting());
        assert_eq!(app.store.load(), stored[..2].to_vec());
        assert_eq!(app.records, stored[..2].to_vec());
    }

    #[test]
    fn esc_in_select_mode_cancels_without_deleting() {
        let mut app = app_with(MemoryKvStore::new());
        let t0 = Instant::now();
        app.start_timer_at(t0);
        app.stop_timer_at(t0 + Duration::from_secs(1));

        app.focus(Tab::History);
        app.on_key(key(KeyCode::Char('s')));
        app.on_key(key(KeyCode::Char(' ')));
        app.on_key(key(KeyCode::Esc));

        assert!(!app.should_quit);
        assert!(!app.selection.is_selecting());
        assert_eq!(app.store.load().len(), 1);
    }

    #[test]
    fn failed_delete_then_retry_removes_the_chosen_run() {
        let failing = Rc::new(Cell::new(false));
        let kv = FlakyKv {
            failing: Rc::clone(&failing),
            ..FlakyKv::default()
        };
        let mut app = App::new(RecordStore::new(Box::new(kv)), &Config::default());
        let t0 = Instant::now();
        for secs in [10, 20, 30] {
            app.start_timer_at(t0);
            app.stop_timer_at(t0 + Duration::from_secs(secs));
        }

        // oldest run sits at the bottom of the newest-first list
        app.focus(Tab::History);
        app.cursor_down();
        app.cursor_down();
        app.toggle_select_mode();
        app.toggle_at_cursor();
        failing.set(true);
        app.delete_selected();

        assert_matches!(app.status, Some(ref msg) if msg.starts_with("Could not delete"));
        assert_eq!(app.records, app.store.load());
        assert_eq!(app.records.len(), 3);

        failing.set(false);
        app.cursor_up();
        app.cursor_up();
        app.toggle_select_mode();
        app.toggle_at_cursor();
        app.delete_selected();

        let durations: Vec<f64> = app.store.load().iter().map(|r| r.duration_seconds).collect();
        assert_eq!(durations, vec![10.0, 20.0]);
        assert_eq!(app.records, app.store.load());
    }

    #[test]
    fn cursor_stays_in_bounds_after_delete() {
        let mut app = app_with(MemoryKvStore::new());
        let t0 = Instant::now();
        for secs in [1, 2] {
            app.start_timer_at(t0);
            app.stop_timer_at(t0 + Duration::from_secs(secs));
        }
        app.focus(Tab::History);
        app.cursor_down();
        app.cursor_down();
        assert_eq!(app.cursor, 1);

        app.toggle_select_mode();
        app.toggle_at_cursor();
        app.delete_selected();
        assert_eq!(app.records.len(), 1);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn tab_cycles_and_refreshes() {
        let mut kv = MemoryKvStore::new();
        crate::kv::KeyValueStore::set(
            &mut kv,
            crate::store::TIMERS_KEY,
            r#"[{"date":"2025-01-01T00:00:00.000Z","duration":30,"routeType":"Forest"}]"#,
        )
        .unwrap();
        let mut app = app_with(kv);
        assert_eq!(app.records.len(), 1);

        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::History);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Charts);
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Timer);
        assert_eq!(app.snapshot().count, 1);
    }
}
