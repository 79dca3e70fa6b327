//! Saving and loading alarms as a minimal iCalendar document.
//!
//! ```text
//! BEGIN:VCALENDAR
//! VERSION:2.0
//! BEGIN:VEVENT
//! UID:<uuid>
//! DTSTAMP:<utc write time>
//! DTSTART:<local alarm time>
//! SUMMARY:<label>
//! PRIORITY:<integer>
//! END:VEVENT
//! END:VCALENDAR
//! ```
//!
//! The reader only looks at `DTSTART`, `SUMMARY`, `PRIORITY` and `END:VEVENT`,
//! anything else (including nested `VALARM` blocks) is skipped.

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use chrono::{NaiveDateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{alarm::Alarm, manager::AlarmManager};

const DTSTART_FORMAT: &str = "%Y%m%dT%H%M%S";
const DTSTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("couldn't access alarm calendar: {0}")]
    Io(#[from] io::Error),
    #[error("alarm record {index} is unusable: {source}")]
    Record {
        index: usize,
        #[source]
        source: RecordError,
    },
}

/// problems with a single `VEVENT`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("event has no DTSTART")]
    MissingTime,
    #[error("invalid DTSTART {value:?}: {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// what to do with a record whose time can't be read
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// drop the record, log it and keep going
    #[default]
    Skip,
    /// fail the whole load without adding anything
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// write a display `VALARM` reminder inside each event
    pub reminders: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { reminders: true }
    }
}

/// writes every alarm of `manager` in the order [`AlarmManager::get_all_alarms`] gives them
///
/// # Errors
/// if writing fails
pub fn save<W: Write>(
    manager: &AlarmManager,
    mut writer: W,
    options: SaveOptions,
) -> io::Result<()> {
    writeln!(writer, "BEGIN:VCALENDAR")?;
    writeln!(writer, "VERSION:2.0")?;
    for alarm in manager.get_all_alarms() {
        let label = escape(&alarm.label);
        writeln!(writer, "BEGIN:VEVENT")?;
        writeln!(writer, "UID:{}", Uuid::new_v4())?;
        writeln!(writer, "DTSTAMP:{}", Utc::now().format(DTSTAMP_FORMAT))?;
        writeln!(writer, "DTSTART:{}", alarm.time.format(DTSTART_FORMAT))?;
        writeln!(writer, "SUMMARY:{label}")?;
        writeln!(writer, "PRIORITY:{}", alarm.priority)?;
        if options.reminders {
            writeln!(writer, "BEGIN:VALARM")?;
            writeln!(writer, "TRIGGER:-PT0M")?;
            writeln!(writer, "DESCRIPTION:{label}")?;
            writeln!(writer, "ACTION:DISPLAY")?;
            writeln!(writer, "END:VALARM")?;
        }
        writeln!(writer, "END:VEVENT")?;
    }
    writeln!(writer, "END:VCALENDAR")?;
    writer.flush()
}

/// reads every `VEVENT` in order, each one either an alarm (with its priority set)
/// or the reason it couldn't be built
///
/// # Errors
/// if reading fails, bad records are reported per item instead
pub fn load<R: BufRead>(mut reader: R) -> Result<Vec<Result<Alarm, RecordError>>, CodecError> {
    let mut records = Vec::new();
    let mut time: Option<Result<NaiveDateTime, RecordError>> = None;
    let mut label = String::new();
    let mut priority = 0;
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        // bad bytes only spoil their own line
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_start().trim_end_matches(|c| c == '\n' || c == '\r');
        if let Some(value) = line.strip_prefix("DTSTART:") {
            let value = value.trim_end();
            time = Some(
                NaiveDateTime::parse_from_str(value, DTSTART_FORMAT).map_err(|source| {
                    RecordError::InvalidTime {
                        value: value.to_string(),
                        source,
                    }
                }),
            );
        } else if let Some(value) = line.strip_prefix("SUMMARY:") {
            label = unescape(value);
        } else if let Some(value) = line.strip_prefix("PRIORITY:") {
            let value = value.trim_end();
            priority = value.parse().unwrap_or_else(|_| {
                warn!("priority {value:?} is not a number, using 0");
                0
            });
        } else if line.trim_end() == "END:VEVENT" {
            let record = time
                .take()
                .unwrap_or(Err(RecordError::MissingTime))
                .map(|time| Alarm::new(time, std::mem::take(&mut label), priority));
            records.push(record);
            label.clear();
            priority = 0;
        }
    }
    Ok(records)
}

/// loads a calendar straight into `manager`, returns how many alarms were added
///
/// # Errors
/// if reading fails, or with [`LoadPolicy::Abort`] on the first bad record,
/// in which case `manager` is left untouched
pub fn load_into<R: BufRead>(
    manager: &mut AlarmManager,
    reader: R,
    policy: LoadPolicy,
) -> Result<usize, CodecError> {
    let mut alarms = Vec::new();
    for (index, record) in load(reader)?.into_iter().enumerate() {
        match (record, policy) {
            (Ok(alarm), _) => alarms.push(alarm),
            (Err(source), LoadPolicy::Abort) => {
                return Err(CodecError::Record { index, source });
            }
            (Err(err), LoadPolicy::Skip) => warn!("skipping alarm record {index}: {err}"),
        }
    }
    let added = alarms.len();
    for alarm in alarms {
        let priority = alarm.priority;
        manager.add_alarm(alarm, priority);
    }
    Ok(added)
}

/// # Errors
/// if the file or its directory can't be written
pub fn save_file(manager: &AlarmManager, path: &Path, options: SaveOptions) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    save(manager, BufWriter::new(File::create(path)?), options)?;
    info!("saved {} alarms to {}", manager.len(), path.display());
    Ok(())
}

/// a missing file counts as an empty calendar
///
/// # Errors
/// see [`load_into`]
pub fn load_file(
    manager: &mut AlarmManager,
    path: &Path,
    policy: LoadPolicy,
) -> Result<usize, CodecError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let added = load_into(manager, BufReader::new(file), policy)?;
    info!("loaded {added} alarms from {}", path.display());
    Ok(added)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some('r' | 'R') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
