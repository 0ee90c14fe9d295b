//! Injected logging collaborator.
//!
//! Components receive a [`Reporter`] instead of writing to the process-wide
//! logger directly. The binary hands them one backed by the global
//! `env_logger` sink; tests hand them one backed by a capturing sink.

use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Log target used for every record emitted through a [`Reporter`].
pub const LOG_TARGET: &str = "rpdk::typescript";

/// Cloneable handle over a `log::Log` sink.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn Log>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::global()
    }
}

/// Forwards to whatever logger the process installed.
struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

impl Reporter {
    /// Reporter writing to the process-wide logger.
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalSink))
    }

    /// Reporter writing to the given sink.
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self { sink }
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, args)
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args)
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args)
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args)
    }
}

/// Sink that keeps every record in memory.
///
/// Used by tests to assert on what a component reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the captured records.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// True if any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl Log for MemorySink {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}
