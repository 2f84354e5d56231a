//! Rolling Logger
//!
//! A size-rotated log file plus an in-memory buffer of the most recent
//! lines, installed as the global `tracing` subscriber. Records emitted
//! through the `log` facade are forwarded as well.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;

/// Rotation and buffering limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Rotate once the active file would grow past this many bytes
    pub max_file_bytes: u64,
    /// Rotated files kept next to the active one
    pub max_backups: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
            max_backups: 5,
            buffer_lines: 500,
        }
    }
}

static RECENT: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn recent() -> &'static Mutex<VecDeque<String>> {
    RECENT.get_or_init(|| Mutex::new(VecDeque::new()))
}

/// The last buffered log lines, oldest first
pub fn recent_lines() -> Vec<String> {
    match recent().lock() {
        Ok(lines) => lines.iter().cloned().collect(),
        Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
    }
}

// ========================
// Rolling File
// ========================

/// The active `<app>.log` file and its rotation state
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    options: LoggerOptions,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: impl AsRef<Path>, app_name: &str, options: LoggerOptions) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir,
            app_name: app_name.to_string(),
            options,
            file,
            written,
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    /// Rotated files, oldest first
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("{}-", self.app_name);
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&prefix) && name.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();
        backups.sort();
        Ok(backups)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let mut target = self.dir.join(format!("{}-{}.log", self.app_name, stamp));
        let mut suffix = 1;
        while target.exists() {
            target = self.dir.join(format!("{}-{}-{}.log", self.app_name, stamp, suffix));
            suffix += 1;
        }
        fs::rename(self.active_path(), &target)?;

        let backups = self.backups()?;
        if backups.len() > self.options.max_backups {
            for old in &backups[..backups.len() - self.options.max_backups] {
                fs::remove_file(old)?;
            }
        }

        self.file = OpenOptions::new().create(true).append(true).open(self.active_path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.options.max_file_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

// ========================
// Subscriber Writer
// ========================

/// Shared handle handed to the fmt layer; mirrors every line into the
/// recent-lines buffer
#[derive(Clone)]
pub struct LogWriter {
    file: Arc<Mutex<RollingFile>>,
    buffer_lines: usize,
}

impl LogWriter {
    pub fn new(file: RollingFile) -> Self {
        let buffer_lines = file.options.buffer_lines;
        Self {
            file: Arc::new(Mutex::new(file)),
            buffer_lines,
        }
    }

    fn remember(&self, buf: &[u8]) {
        if self.buffer_lines == 0 {
            return;
        }
        let text = String::from_utf8_lossy(buf);
        let Ok(mut lines) = recent().lock() else {
            return;
        };
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            while lines.len() >= self.buffer_lines {
                lines.pop_front();
            }
            lines.push_back(line.to_string());
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.remember(buf);
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global logger writing to `<dir>/<app_name>.log`
pub fn init_logger(dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with(dir, app_name, LoggerOptions::default())
}

pub fn init_logger_with(dir: impl AsRef<Path>, app_name: &str, options: LoggerOptions) -> Result<(), String> {
    let file = RollingFile::open(dir.as_ref(), app_name, options)
        .map_err(|e| format!("failed to open log file in {}: {}", dir.as_ref().display(), e))?;
    tracing_subscriber::fmt()
        .with_writer(LogWriter::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("failed to install logger: {}", e))?;
    tracing::info!(app = app_name, "logger initialized");
    Ok(())
}

pub fn info(message: &str) -> Result<(), String> {
    log::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    log::error!("{}", message);
    Ok(())
}
