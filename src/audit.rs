//! Append-only audit log of completed share/unshare actions
//!
//! One tab-separated line per action:
//!
//! ```text
//! 2026-10-19T12:00:00Z	shared	path=/data/bulk/proj1	user=bob	rule=r1
//! 2026-10-19T12:05:00Z	unshared	rule=r1
//! ```

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A completed action worth recording
#[derive(Debug, Clone, Copy)]
pub enum AuditEvent<'a> {
    Shared {
        path: &'a Path,
        username: &'a str,
        rule_id: &'a str,
    },
    Unshared {
        rule_id: &'a str,
    },
}

impl fmt::Display for AuditEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Shared {
                path,
                username,
                rule_id,
            } => write!(
                f,
                "shared\tpath={}\tuser={}\trule={}",
                path.display(),
                username,
                rule_id
            ),
            AuditEvent::Unshared { rule_id } => write!(f, "unshared\trule={}", rule_id),
        }
    }
}

/// Handle to the audit log file
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line for `event`
    ///
    /// The file is opened in append mode per call and the line goes out in
    /// a single `write_all`, so lines from concurrent invocations do not
    /// interleave.
    pub fn record(&self, event: &AuditEvent<'_>) -> io::Result<()> {
        let line = format!(
            "{}\t{}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            event
        );

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_appends_lines() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("logs").join("shares.log"));

        log.record(&AuditEvent::Shared {
            path: Path::new("/data/bulk/proj1"),
            username: "bob",
            rule_id: "r1",
        })
        .unwrap();
        log.record(&AuditEvent::Unshared { rule_id: "r1" }).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("\tshared\tpath=/data/bulk/proj1\tuser=bob\trule=r1"));
        assert!(lines[1].ends_with("\tunshared\trule=r1"));

        let timestamp = lines[0].split('\t').next().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_record_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let log = AuditLog::new(blocker.join("shares.log"));
        assert!(log.record(&AuditEvent::Unshared { rule_id: "r1" }).is_err());
    }
}
