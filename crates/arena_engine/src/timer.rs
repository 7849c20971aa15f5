use crate::scheduler::EngineAction;

/// Outcome of advancing the round timer by one second.
#[derive(Debug, PartialEq)]
pub enum TimerTick {
    Idle,
    /// Still counting; the remaining time should be displayed.
    Display {
        remaining: u32,
        label: Option<String>,
    },
    /// Reached zero; the owner must perform the action exactly once.
    Expired(EngineAction),
}

/// The per-match countdown. At most one timer runs per match: starting a
/// new one implicitly stops the old one.
#[derive(Default)]
pub struct RoundTimer {
    remaining: u32,
    label: Option<String>,
    action: Option<EngineAction>,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.action.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Begin a countdown, replacing any running timer. Returns true when a
    /// previous timer was stopped.
    pub fn start(&mut self, seconds: u32, label: Option<String>, action: EngineAction) -> bool {
        let replaced = self.stop();

        self.remaining = seconds.max(1);
        self.label = label;
        self.action = Some(action);

        replaced
    }

    /// Stop the countdown. Safe to call when no timer is running.
    pub fn stop(&mut self) -> bool {
        self.remaining = 0;
        self.label = None;
        self.action.take().is_some()
    }

    pub fn tick(&mut self) -> TimerTick {
        if self.action.is_none() {
            return TimerTick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.label = None;
            match self.action.take() {
                Some(action) => TimerTick::Expired(action),
                None => TimerTick::Idle,
            }
        } else {
            TimerTick::Display {
                remaining: self.remaining,
                label: self.label.clone(),
            }
        }
    }
}
