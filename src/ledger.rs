//! Durable progress ledger and timestamped run logs
use std::collections::HashSet;
use std::fs::{read_to_string, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::{OrgMoverError, OrgMoverErrorKind};

/// Append-only record of repository names that completed transfer.
///
/// The file is the sole carrier of resumability across runs: one name per
/// line, UTF-8, read fully at startup. A name is in here if and only if the
/// destination holds a complete mirror of that repository.
pub struct ProgressLedger {
    /// Path of the backing file
    path: PathBuf,

    /// In-memory skip-set, loaded at open and grown by `record`
    completed: HashSet<String>,
}

impl ProgressLedger {
    /// Open a ledger, loading the completed set from `path`.
    ///
    /// A missing file is an empty ledger, not an error.
    /// # Errors
    /// Error if the file exists but can't be read
    pub fn open(path: &Path) -> Result<Self, OrgMoverError> {
        let completed = match read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(OrgMoverError::new(OrgMoverErrorKind::Ledger)
                    .with_text(format!("unable to read '{}': {e}", path.display())))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            completed,
        })
    }

    /// Whether a repository already completed in a previous (or this) run.
    pub fn contains(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    /// Record a completed repository, durably, before returning.
    ///
    /// The append is flushed and fsynced so that a crash right after a
    /// successful transfer never loses the completion fact.
    /// # Errors
    /// Error if the append can't be made durable
    pub fn record(&mut self, name: &str) -> Result<(), OrgMoverError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{name}\n").as_bytes())?;
        file.sync_all()?;
        self.completed.insert(name.to_string());
        Ok(())
    }

    /// Number of completed repositories.
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Whether nothing has completed yet.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

/// Append-only, human-readable run log with timestamped lines.
pub struct RunLog {
    /// Open log file handle
    file: File,
}

impl RunLog {
    /// Open (or create) a log file for appending.
    /// # Errors
    /// Error if the file can't be opened
    pub fn open(path: &Path) -> Result<Self, OrgMoverError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Append one timestamped line, flushed immediately.
    /// # Errors
    /// Error if the line can't be written
    pub fn append(&mut self, message: &str) -> Result<(), OrgMoverError> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.file, "[{timestamp}] {message}")?;
        self.file.flush()?;
        Ok(())
    }
}

/// The two run logs: one line per success, one line per failed attempt.
pub struct RunLogs {
    /// Completed repositories, with duration
    pub success: RunLog,

    /// Failed transfers, with the failing step and error detail
    pub error: RunLog,
}

impl RunLogs {
    /// Open both logs.
    /// # Errors
    /// Error if either file can't be opened
    pub fn open(success_path: &Path, error_path: &Path) -> Result<Self, OrgMoverError> {
        Ok(Self {
            success: RunLog::open(success_path)?,
            error: RunLog::open(error_path)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::testutil::scratch_dir;
    use std::fs;

    #[test]
    fn missing_file_is_empty_ledger() {
        let dir = scratch_dir("ledger-missing");
        let ledger = ProgressLedger::open(&dir.join("completed.txt")).unwrap();
        assert!(ledger.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn record_survives_reopen() {
        let dir = scratch_dir("ledger-reopen");
        let path = dir.join("completed.txt");
        {
            let mut ledger = ProgressLedger::open(&path).unwrap();
            ledger.record("alpha").unwrap();
            ledger.record("beta").unwrap();
            assert!(ledger.contains("alpha"));
        }
        let reopened = ProgressLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains("alpha"));
        assert!(reopened.contains("beta"));
        assert!(!reopened.contains("gamma"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn blank_lines_are_ignored() {
        let dir = scratch_dir("ledger-blank");
        let path = dir.join("completed.txt");
        fs::write(&path, "alpha\n\n  \nbeta\n").unwrap();
        let ledger = ProgressLedger::open(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn run_log_lines_are_timestamped() {
        let dir = scratch_dir("run-log");
        let path = dir.join("log.txt");
        {
            let mut log = RunLog::open(&path).unwrap();
            log.append("hello").unwrap();
            log.append("world").unwrap();
        }
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] hello"));
        assert!(lines[1].ends_with("] world"));
        fs::remove_dir_all(&dir).ok();
    }
}
