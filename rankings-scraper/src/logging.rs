use std::fmt::{self, Display};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::Level;

/// Copies every log line to the log file and to stderr.
///
/// Both writes are attempted; the first error is reported.
struct Tee<W> {
    file: W,
}

impl<W: Write> Write for Tee<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = self.file.write_all(buf);
        let stderr = io::stderr().write_all(buf);
        file.and(stderr)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let file = self.file.flush();
        let stderr = io::stderr().flush();
        file.and(stderr)
    }
}

/// `<timestamp> - <LEVEL> - <message>`
fn format_line(timestamp: &dyn Display, level: Level, message: &fmt::Arguments) -> String {
    format!("{} - {} - {}", timestamp, level, message)
}

/// Log to stderr and append to `log_file`, `<timestamp> - <LEVEL> - <message>`.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when verbose).
pub fn init(log_file: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let line = format_line(&buf.timestamp_millis(), record.level(), record.args());
            writeln!(buf, "{}", line)
        })
        .target(Target::Pipe(Box::new(Tee::<File> { file })))
        .try_init()
        .context("Logger already initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fails every write, like a closed pipe.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn line_format() {
        let line = format_line(
            &"2024-01-01T00:00:00.000Z",
            Level::Warn,
            &format_args!("Skipping {}, {}: {}", 2020, "Final", "x"),
        );
        assert_eq!(line, "2024-01-01T00:00:00.000Z - WARN - Skipping 2020, Final: x");
    }

    #[test]
    fn tee_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.log");
        fs::write(&path, "earlier run\n").unwrap();

        let file = OpenOptions::new().append(true).open(&path).unwrap();
        let mut tee = Tee { file };
        writeln!(tee, "first").unwrap();
        writeln!(tee, "second").unwrap();
        tee.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\nfirst\nsecond\n");
    }

    #[test]
    fn tee_reports_file_error() {
        let mut tee = Tee { file: Broken };
        let err = tee.write(b"line\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(tee.flush().is_err());
    }
}
