//! Console Logging
//!
//! A `tracing-subscriber` fmt layer whose writer forwards each formatted
//! line to the browser console, at the console level matching the event.

use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::writer::MakeWriter;

/// Hands out one buffered writer per event
#[derive(Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Collects one formatted event and emits it when dropped
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self { level, buf: Vec::new() }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        let msg = wasm_bindgen::JsValue::from_str(line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&msg),
            Level::WARN => web_sys::console::warn_1(&msg),
            Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }
}

/// Install the console subscriber; an unknown level falls back to `info`
pub fn init(level: &str) {
    let max_level = level.parse::<Level>().unwrap_or(Level::INFO);
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(max_level)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        web_sys::console::warn_1(&"[LOG] subscriber already installed".into());
    }
}
