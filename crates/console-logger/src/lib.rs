//! Console Logger
//!
//! A `tracing` subscriber for the browser. Events are formatted by
//! `tracing_subscriber::fmt`, written to the devtools console by level, and
//! the most recent lines are kept in a circular buffer for diagnostics.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Number of lines kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 200;

static BUFFER: OnceLock<Arc<LineBuffer>> = OnceLock::new();

/// Rolling buffer of formatted log lines
#[derive(Debug)]
pub struct LineBuffer {
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Lines currently held, oldest first
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn push(&self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }
}

/// `MakeWriter` handing out one `ConsoleLine` per event
#[derive(Debug, Clone)]
pub struct ConsoleWriter {
    buffer: Arc<LineBuffer>,
}

impl ConsoleWriter {
    pub fn new(buffer: Arc<LineBuffer>) -> Self {
        Self { buffer }
    }
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(Level::INFO, Arc::clone(&self.buffer))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(*meta.level(), Arc::clone(&self.buffer))
    }
}

/// One formatted event; emitted when dropped
pub struct ConsoleLine {
    level: Level,
    bytes: Vec<u8>,
    buffer: Arc<LineBuffer>,
}

impl ConsoleLine {
    fn new(level: Level, buffer: Arc<LineBuffer>) -> Self {
        Self { level, bytes: Vec::new(), buffer }
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.bytes);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        self.buffer.push(line);
        emit(self.level, line);
    }
}

/// Formatting layer writing to the console and into `buffer`.
///
/// Timestamps are left out: the browser console adds its own and
/// `SystemTime` is unavailable on `wasm32-unknown-unknown`.
pub fn console_layer<S>(buffer: Arc<LineBuffer>) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(ConsoleWriter::new(buffer))
        .with_ansi(false)
        .without_time()
}

/// Parse a level name such as "debug" or "WARN"; unknown names yield None
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse::<LevelFilter>().ok()
}

/// Install the global subscriber with the default buffer size.
///
/// Returns false if a subscriber was already installed.
pub fn init(level: LevelFilter) -> bool {
    init_with_capacity(level, DEFAULT_CAPACITY)
}

/// Install the global subscriber keeping at most `capacity` recent lines
pub fn init_with_capacity(level: LevelFilter, capacity: usize) -> bool {
    if BUFFER.get().is_some() {
        return false;
    }
    let buffer = Arc::clone(BUFFER.get_or_init(|| Arc::new(LineBuffer::new(capacity))));
    tracing_subscriber::registry()
        .with(console_layer(buffer).with_filter(level))
        .try_init()
        .is_ok()
}

/// Recent lines from the global subscriber (empty before `init`)
pub fn recent_lines() -> Vec<String> {
    BUFFER.get().map(|buffer| buffer.lines()).unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::info_1(&value),
        Level::DEBUG => web_sys::console::log_1(&value),
        _ => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}
