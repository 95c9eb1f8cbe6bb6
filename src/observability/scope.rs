//! Begin/complete logging around a write
//!
//! An `EventScope` logs its begin event on creation and exactly one of
//! complete or failed before it goes away. A scope dropped without either
//! logs the failed event with `reason = "abandoned"`.

use std::time::Instant;

use super::events::Event;
use super::logger::Logger;

/// Events logged by a scope over its lifetime
#[derive(Debug, Clone, Copy)]
pub struct ScopeEvents {
    pub begin: Event,
    pub complete: Event,
    pub failed: Event,
}

/// Scope around insert operations
pub const INSERT_EVENTS: ScopeEvents = ScopeEvents {
    begin: Event::InsertBegin,
    complete: Event::InsertComplete,
    failed: Event::InsertFailed,
};

/// Logs the lifecycle of one operation; silent when disabled
pub struct EventScope {
    events: ScopeEvents,
    enabled: bool,
    finished: bool,
    started: Instant,
    fields: Vec<(&'static str, String)>,
}

impl EventScope {
    /// Opens a scope, logging the begin event if enabled
    pub fn begin(events: ScopeEvents, enabled: bool, fields: &[(&'static str, &str)]) -> Self {
        let fields: Vec<(&'static str, String)> =
            fields.iter().map(|(k, v)| (*k, v.to_string())).collect();

        let scope = Self {
            events,
            enabled,
            finished: false,
            started: Instant::now(),
            fields,
        };
        if enabled {
            Logger::info(scope.events.begin.as_str(), &scope.field_refs(&[]));
        }
        scope
    }

    /// Returns whether the scope logs anything
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns elapsed milliseconds since the scope began
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    fn field_refs<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        self.fields
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(extra.iter().copied())
            .collect()
    }

    /// Logs the complete event with extra fields
    pub fn complete(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        if self.enabled {
            let elapsed = self.elapsed_ms().to_string();
            let mut fields = self.field_refs(extra);
            fields.push(("elapsed_ms", &elapsed));
            Logger::info(self.events.complete.as_str(), &fields);
        }
    }

    /// Logs the failed event with a reason
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        if self.enabled {
            Logger::error(
                self.events.failed.as_str(),
                &self.field_refs(&[("reason", reason)]),
            );
        }
    }
}

impl Drop for EventScope {
    fn drop(&mut self) {
        if !self.finished && self.enabled {
            Logger::error(
                self.events.failed.as_str(),
                &self.field_refs(&[("reason", "abandoned")]),
            );
        }
    }
}
