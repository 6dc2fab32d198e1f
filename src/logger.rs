//! Flight event and data logs.
//!
//! An event log holds timestamped lines:
//!
//! ```text
//! [ 14:02:11 ][ EVENT ]	Switching to LAUNCH mode
//! [ 14:02:19 ][ ERROR ]	failed to read altimeter: bus timeout
//! ```
//!
//! A data log starts with a header row and then holds one right-justified row of
//! numbers per coast tick, each column as wide as its header.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const COLUMN_SEPARATOR: &str = "\t\t";

/// Printed at the top of every log file.
pub const LOG_BANNER: &str = r"         ___
  _____ / _ \ _____
  |_ _|/ /_\ \|_ _|
   | |/ _____ \| |
   | / /_   _\ \ |
  |_____|___|_____|
    \___________/

";

pub struct Logger<W: Write> {
    writer: W,
    headers: Vec<String>,
    closed: bool,
}

impl Logger<BufWriter<File>> {
    /// Creates `<dir>/<prefix>-<YYYY-MM-DD_HH-MM-SS>.txt`, starting with [`LOG_BANNER`].
    /// Pass headers to make it a data log.
    pub fn create(dir: &Path, prefix: &str, headers: Option<&[&str]>) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file_path = log_file_path(dir, prefix);
        let file = File::create(&file_path)?;
        log::info!("Opened {} log at {}", prefix, file_path.display());
        let mut writer = BufWriter::new(file);
        writer.write_all(LOG_BANNER.as_bytes())?;
        Logger::new(writer, headers)
    }
}

fn log_file_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!(
        "{}-{}.txt",
        prefix,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    ))
}

impl<W: Write> Logger<W> {
    pub fn new(writer: W, headers: Option<&[&str]>) -> io::Result<Self> {
        let headers: Vec<String> = headers
            .unwrap_or_default()
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut logger = Logger {
            writer,
            headers,
            closed: false,
        };
        if !logger.headers.is_empty() {
            writeln!(logger.writer, "{}", logger.headers.join(COLUMN_SEPARATOR))?;
        }
        Ok(logger)
    }

    pub fn event(&mut self, message: &str) {
        self.write_line(&format!("[ {} ][ EVENT ]\t{}", time_stamp(), message));
    }

    pub fn error(&mut self, message: &str) {
        self.write_line(&format!("[ {} ][ ERROR ]\t{}", time_stamp(), message));
    }

    /// Writes one row of a data log. Values past the last header are ignored.
    pub fn write_row(&mut self, values: &[f32]) {
        let row = values
            .iter()
            .zip(&self.headers)
            .map(|(value, header)| format!("{:>width$.3}", value, width = header.len()))
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);
        self.write_line(&row);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Flushes and stops accepting writes. Closing twice does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.writer.flush() {
            log::error!("Failed to flush log on close: {e}");
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    fn write_line(&mut self, line: &str) {
        if self.closed {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{line}") {
            log::error!("Failed to write to log file: {e}");
        }
    }
}

impl<W: Write> Drop for Logger<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

fn time_stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
