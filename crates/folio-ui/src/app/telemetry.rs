//! Tracing subscriber that writes to the browser console.
//!
//! # Design
//! - Reuse the `tracing-subscriber` fmt layer; only the writer is browser-specific.
//! - Each event is buffered and emitted as one console call at its own level.

use gloo::console;
use std::io::{self, Write};
use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Install the console subscriber once; later calls are ignored.
pub(crate) fn init_logging(level: &str) {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_env_filter(EnvFilter::new(level))
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        console::debug!("tracing subscriber already installed");
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ConsoleMakeWriter;

struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        match self.level {
            Level::ERROR => console::error!(line),
            Level::WARN => console::warn!(line),
            Level::INFO => console::info!(line),
            _ => console::debug!(line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}
