//! Loading and saving flat rule files.
//!
//! A rule file holds one rule per line, three whitespace-separated fields:
//!
//! ```text
//! Web Logs ra
//! Web Secrets -
//! System Web rwxa
//! ```
//!
//! Loading is all-or-nothing. The file is parsed into a fresh
//! [`RuleDatabase`] and only a fully parsed file replaces the caller's rules;
//! a bad line or a read error leaves them exactly as they were.
//!
//! Files are written either in the default form, with minimal whitespace and
//! compact access strings, or in the kernel form, with fixed-width columns:
//!
//! ```text
//! Web                     Logs                    r--a
//! ```

use crate::access::{Access, AccessFormat, KERNEL_ACCESS_LEN};
use crate::error::{Error, Result};
use crate::label::SMACK_LABEL_LEN;
use crate::rules::RuleDatabase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Options
// ============================================================================

/// Output layout of a saved rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleFormat {
    /// `subject object access` with compact access strings.
    #[default]
    Default,
    /// Labels padded to [`SMACK_LABEL_LEN`] columns and four-character access.
    Kernel,
}

impl RuleFormat {
    /// Access encoding used by this layout.
    pub fn access_format(self) -> AccessFormat {
        match self {
            RuleFormat::Default => AccessFormat::Compact,
            RuleFormat::Kernel => AccessFormat::Kernel,
        }
    }
}

impl fmt::Display for RuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleFormat::Default => write!(f, "default"),
            RuleFormat::Kernel => write!(f, "kernel"),
        }
    }
}

impl FromStr for RuleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(RuleFormat::Default),
            "kernel" => Ok(RuleFormat::Kernel),
            _ => Err(Error::UnknownFormat {
                name: s.to_string(),
            }),
        }
    }
}

/// Options controlling [`load_from_reader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    subject_filter: Option<String>,
}

impl LoadOptions {
    /// Options that keep every rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only rules whose subject is exactly `subject`.
    ///
    /// Lines for other subjects are still checked for well-formedness.
    pub fn with_subject_filter(mut self, subject: impl Into<String>) -> Self {
        self.subject_filter = Some(subject.into());
        self
    }

    /// The subject filter, if any.
    pub fn subject_filter(&self) -> Option<&str> {
        self.subject_filter.as_deref()
    }

    fn accepts(&self, subject: &str) -> bool {
        self.subject_filter
            .as_deref()
            .is_none_or(|filter| filter == subject)
    }
}

// ============================================================================
// Load
// ============================================================================

/// Parses a whole rule stream into a new database.
///
/// Every line must split into exactly three fields; a blank line counts as
/// malformed. The first malformed line or read error aborts the parse.
pub fn load_from_reader<R: BufRead>(reader: R, options: &LoadOptions) -> Result<RuleDatabase> {
    let mut db = RuleDatabase::new();
    let mut lines = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        lines = index + 1;

        let mut fields = line.split_ascii_whitespace();
        let (Some(subject), Some(object), Some(access), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::malformed_line(lines, line.trim_end()));
        };

        if options.accepts(subject) {
            db.upsert(subject, object, Access::decode(access))?;
        }
    }

    log::debug!("Parsed {} rules from {lines} lines", db.len());
    Ok(db)
}

/// Loads a rule stream into `db`, replacing its contents only on success.
pub fn load_into<R: BufRead>(
    db: &mut RuleDatabase,
    reader: R,
    options: &LoadOptions,
) -> Result<()> {
    match load_from_reader(reader, options) {
        Ok(loaded) => {
            db.replace_all(loaded);
            Ok(())
        }
        Err(e) => {
            log::warn!("Rule load rejected, keeping {} existing rules: {e}", db.len());
            Err(e)
        }
    }
}

/// Loads the rule file at `path` into `db`, replacing its contents only on
/// success.
pub fn load_file(
    db: &mut RuleDatabase,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io_with_path(e, path))?;
    log::debug!("Loading rules from {}", path.display());
    load_into(db, BufReader::new(file), options).map_err(|e| match e {
        Error::Io(source) => Error::io_with_path(source, path),
        other => other,
    })
}

// ============================================================================
// Save
// ============================================================================

/// Checks that every label in `db` can be written as a single field.
///
/// An empty label or one containing ASCII whitespace would not read back as
/// the same rule, so it is reported as [`Error::InvalidLabel`].
fn ensure_writable(db: &RuleDatabase) -> Result<()> {
    for (subject, object, _) in db.iter() {
        for label in [subject, object] {
            let text = label.as_str();
            if text.is_empty() || text.bytes().any(|b| b.is_ascii_whitespace()) {
                return Err(Error::InvalidLabel {
                    label: text.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Writes every rule of `db` to `writer`, one per line.
///
/// A rule granting nothing is written with `-` as its access in the default
/// layout, so the line still has three fields. Labels that cannot be written
/// as a single field fail the save before anything is written. Stops at the
/// first write error; nothing already written is undone.
pub fn save_to_writer<W: Write>(
    db: &RuleDatabase,
    mut writer: W,
    format: RuleFormat,
) -> Result<()> {
    ensure_writable(db)?;
    let access_format = format.access_format();
    for (subject, object, access) in db.iter() {
        let access = access.encode(access_format);
        match format {
            RuleFormat::Default if access.is_empty() => {
                writeln!(writer, "{subject} {object} -")?
            }
            RuleFormat::Default => writeln!(writer, "{subject} {object} {access}")?,
            RuleFormat::Kernel => writeln!(
                writer,
                "{:<width$} {:<width$} {:>alen$}",
                subject.as_str(),
                object.as_str(),
                access,
                width = SMACK_LABEL_LEN,
                alen = KERNEL_ACCESS_LEN,
            )?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes every rule of `db` to the file at `path`, creating or truncating it.
pub fn save_file(db: &RuleDatabase, path: impl AsRef<Path>, format: RuleFormat) -> Result<()> {
    let path = path.as_ref();
    ensure_writable(db)?;
    let file = File::create(path).map_err(|e| Error::io_with_path(e, path))?;
    save_to_writer(db, BufWriter::new(file), format).map_err(|e| match e {
        Error::Io(source) => Error::io_with_path(source, path),
        other => other,
    })?;
    log::debug!("Wrote {} rules to {} ({format})", db.len(), path.display());
    Ok(())
}

impl RuleDatabase {
    /// Loads the rule file at `path`, see [`load_file`].
    pub fn read_rules_from_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<()> {
        load_file(self, path, options)
    }

    /// Saves to the file at `path`, see [`save_file`].
    pub fn write_rules_to_file(&self, path: impl AsRef<Path>, format: RuleFormat) -> Result<()> {
        save_file(self, path, format)
    }
}
