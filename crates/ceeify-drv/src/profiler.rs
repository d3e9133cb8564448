//! The optional profiling hook (spec §6's "Profiler (consumed, optional)":
//! "Begin/end named scopes; emits per-scope wall-clock... snapshots as
//! Chrome-trace-format JSON"). Disabled by default (`NoopProfiler`); `-p/
//! --profile <out.json>` swaps in `JsonProfiler`.

use std::cell::RefCell;
use std::path::Path;
use std::time::Instant;

use serde_json::json;

struct ScopeEvent {
    name: &'static str,
    ts_micros: u128,
    dur_micros: u128,
}

pub trait Profiler {
    fn begin_scope(&self, name: &'static str) -> ScopeGuard<'_>;
    fn write_report(&self, path: &Path) -> std::io::Result<()>;
}

pub struct ScopeGuard<'a> {
    name: &'static str,
    start: Instant,
    ts_micros: u128,
    sink: Option<&'a RefCell<Vec<ScopeEvent>>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink {
            sink.borrow_mut().push(ScopeEvent {
                name: self.name,
                ts_micros: self.ts_micros,
                dur_micros: self.start.elapsed().as_micros(),
            });
        }
    }
}

#[derive(Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    fn begin_scope(&self, name: &'static str) -> ScopeGuard<'_> {
        ScopeGuard { name, start: Instant::now(), ts_micros: 0, sink: None }
    }

    fn write_report(&self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct JsonProfiler {
    epoch: Instant,
    events: RefCell<Vec<ScopeEvent>>,
}

impl JsonProfiler {
    pub fn new() -> Self {
        Self { epoch: Instant::now(), events: RefCell::new(Vec::new()) }
    }
}

impl Default for JsonProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler for JsonProfiler {
    fn begin_scope(&self, name: &'static str) -> ScopeGuard<'_> {
        ScopeGuard {
            name,
            start: Instant::now(),
            ts_micros: self.epoch.elapsed().as_micros(),
            sink: Some(&self.events),
        }
    }

    fn write_report(&self, path: &Path) -> std::io::Result<()> {
        let events: Vec<_> = self
            .events
            .borrow()
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "ph": "X",
                    "ts": e.ts_micros,
                    "dur": e.dur_micros,
                    "args": {},
                })
            })
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&events)?)
    }
}
