//! Structured event-trace log format.
//!
//! Three record kinds, one per line, matching the original kernel's compact
//! trace format: `i` (insert), `e` (execute), `r` (remove). Each carries the
//! current-event coordinates the engine was at when the record was emitted,
//! plus the coordinates of the event the record is about — which is enough
//! to reconstruct causality (what was running when X was scheduled/removed)
//! from the log alone.

use std::fmt;
use std::io;
use std::path::Path;

/// One line of an event-trace log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRecord {
    /// An event was scheduled while `current` was executing.
    Insert {
        current_uid: u32,
        current_ns: u64,
        new_uid: u32,
        new_ns: u64,
    },
    /// An event was dispatched.
    Execute { uid: u32, ns: u64 },
    /// An event was removed from the scheduler while `current` was executing.
    Remove {
        current_uid: u32,
        current_ns: u64,
        removed_uid: u32,
        removed_ns: u64,
    },
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LogRecord::Insert {
                current_uid,
                current_ns,
                new_uid,
                new_ns,
            } => write!(f, "i {current_uid} {current_ns} {new_uid} {new_ns}"),
            LogRecord::Execute { uid, ns } => write!(f, "e {uid} {ns}"),
            LogRecord::Remove {
                current_uid,
                current_ns,
                removed_uid,
                removed_ns,
            } => write!(f, "r {current_uid} {current_ns} {removed_uid} {removed_ns}"),
        }
    }
}

/// Parses one log line. Returns `None` for a blank or malformed line rather
/// than erroring, so a caller can `filter_map` over a whole file.
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let mut parts = line.split_whitespace();
    let record = match parts.next()? {
        "i" => LogRecord::Insert {
            current_uid: parts.next()?.parse().ok()?,
            current_ns: parts.next()?.parse().ok()?,
            new_uid: parts.next()?.parse().ok()?,
            new_ns: parts.next()?.parse().ok()?,
        },
        "e" => LogRecord::Execute {
            uid: parts.next()?.parse().ok()?,
            ns: parts.next()?.parse().ok()?,
        },
        "r" => LogRecord::Remove {
            current_uid: parts.next()?.parse().ok()?,
            current_ns: parts.next()?.parse().ok()?,
            removed_uid: parts.next()?.parse().ok()?,
            removed_ns: parts.next()?.parse().ok()?,
        },
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(record)
}

/// Reads and parses an entire log file written by
/// [`SimulatorEngine::enable_log_to`](crate::engine::SimulatorEngine::enable_log_to).
///
/// # Errors
/// Propagates any I/O error from reading `path`. Malformed lines are
/// silently skipped, matching `parse_log_line`'s leniency.
pub fn read_log(path: impl AsRef<Path>) -> io::Result<Vec<LogRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().filter_map(parse_log_line).collect())
}
