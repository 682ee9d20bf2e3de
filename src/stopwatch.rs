use std::time::Instant;

use chrono::Utc;
use log::debug;

use crate::record::FinishedRun;
use crate::runtime::Sampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopwatchState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// One timing session: Idle -> Running -> Stopped.
///
/// While running it may own a [`Sampler`] that drives the live display; every
/// exit from Running (stop, abandon, drop) cancels it.
#[derive(Debug, Default)]
pub struct Stopwatch {
    state: StopwatchState,
    started_at: Option<Instant>,
    elapsed_ms: u64,
    sampler: Option<Sampler>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    /// Last sampled elapsed time, for display only
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn has_sampler(&self) -> bool {
        self.sampler.as_ref().is_some_and(Sampler::is_active)
    }

    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    /// Begin timing at `now`. A no-op returning false if already running.
    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.is_running() {
            debug!("start ignored: stopwatch already running");
            return false;
        }
        self.state = StopwatchState::Running;
        self.started_at = Some(now);
        self.elapsed_ms = 0;
        debug!("stopwatch started");
        true
    }

    /// Hand the running session its tick source. Dropped (and so cancelled)
    /// if the stopwatch is not running.
    pub fn attach_sampler(&mut self, sampler: Sampler) {
        if self.is_running() {
            self.sampler = Some(sampler);
        }
    }

    pub fn sample(&mut self) -> Option<u64> {
        self.sample_at(Instant::now())
    }

    /// Refresh the live elapsed value. None unless running.
    pub fn sample_at(&mut self, now: Instant) -> Option<u64> {
        match (self.state, self.started_at) {
            (StopwatchState::Running, Some(start)) => {
                self.elapsed_ms = now.saturating_duration_since(start).as_millis() as u64;
                Some(self.elapsed_ms)
            }
            _ => None,
        }
    }

    pub fn stop(&mut self) -> Option<FinishedRun> {
        self.stop_at(Instant::now())
    }

    /// Finish the session at `now`. Produces a run only from Running; any
    /// other state yields None and changes nothing.
    pub fn stop_at(&mut self, now: Instant) -> Option<FinishedRun> {
        if !self.is_running() {
            debug!("stop ignored: stopwatch not running");
            return None;
        }
        let elapsed_ms = self.sample_at(now).unwrap_or(self.elapsed_ms);
        self.cancel_sampler();
        self.state = StopwatchState::Stopped;
        self.started_at = None;

        let run = FinishedRun::new(elapsed_ms, Utc::now());
        debug!("stopwatch stopped after {} s", run.duration_seconds);
        Some(run)
    }

    /// Drop the session without producing a run
    pub fn abandon(&mut self) {
        if self.is_running() {
            debug!("running session abandoned after {} ms", self.elapsed_ms);
        }
        self.cancel_sampler();
        *self = Self::default();
    }

    fn cancel_sampler(&mut self) {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.cancel();
        }
    }
}
