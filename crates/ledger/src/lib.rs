// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FlowController Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowctl-ledger: the append-only, daily-rotated CSV ledger of job state
//! transitions (`spec.md` §4.1). Source of truth for restart recovery.

mod csv_row;
mod error;

pub use error::LedgerError;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use flowctl_core::{Clock, JobState, LedgerEntry};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "timestamp,job_name,state,reason";

/// The append-only ledger for one deployment. A single instance is shared
/// (via `Arc`) across the Scheduler Loop and the Bus Adapter so every
/// state-changing path serializes on the same mutex, matching the
/// Python original's `self._ledger_lock`.
pub struct Ledger {
    dir: PathBuf,
    uid: String,
    lock: Mutex<()>,
}

impl Ledger {
    pub fn new(dir: impl Into<PathBuf>, uid: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            uid: uid.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.{}.ledger", self.uid, date.format("%Y%m%d")))
    }

    /// Append one record, creating the file (with header) if absent. Each
    /// call is exactly one record; the file is reopened per append, which
    /// is acceptable at the rates this orchestrator writes.
    pub fn append(
        &self,
        clock: &impl Clock,
        job_name: &str,
        state: JobState,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let _guard = self.lock.lock();
        let timestamp = clock.now();
        let path = self.path_for(timestamp.date_naive());

        let is_new = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LedgerError::Open {
                path: path.clone(),
                source,
            })?;

        if is_new {
            writeln!(file, "{HEADER}").map_err(|source| LedgerError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let row = format!(
            "{},{},{},{}\n",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            csv_row::quote_field(job_name),
            state,
            csv_row::quote_field(reason),
        );
        file.write_all(row.as_bytes())
            .map_err(|source| LedgerError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(LedgerEntry::new(timestamp, job_name, state, reason))
    }

    /// All rows for `date`, oldest-first. Missing or empty files return an
    /// empty result, not an error. Malformed rows are skipped with a
    /// warning — the reader trusts that only `append` ever writes here.
    pub fn read(&self, date: NaiveDate) -> Result<Vec<LedgerEntry>, LedgerError> {
        let _guard = self.lock.lock();
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&path).map_err(|source| LedgerError::Read {
            path: path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LedgerError::Read {
                path: path.clone(),
                source,
            })?;
            if idx == 0 {
                continue; // header
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(&line) {
                Some(entry) => entries.push(entry),
                None => tracing::warn!(path = %path.display(), line = idx + 1, "skipping malformed ledger row"),
            }
        }
        Ok(entries)
    }

    pub fn read_today(&self, clock: &impl Clock) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.read(clock.now().date_naive())
    }
}

fn parse_row(line: &str) -> Option<LedgerEntry> {
    let fields = csv_row::split_csv_line(line);
    if fields.len() != 4 {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(fields[0], "%Y-%m-%d %H:%M:%S").ok()?;
    let timestamp = Local.from_local_datetime(&naive).single()?;
    let state: JobState = fields[2].parse().ok()?;
    Some(LedgerEntry::new(timestamp, &fields[1], state, &fields[3]))
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
