//! # smack-rules
//!
//! In-memory database of Smack access rules.
//!
//! A rule grants a subject label a set of permissions on an object label.
//! This crate keeps those rules, answers access queries against them, and
//! reads and writes the flat rule files they are distributed in.
//!
//! # Modules
//!
//! - [`access`]: permission bit-set and its text encodings
//! - [`label`]: label type and label syntax validation
//! - [`rules`]: the rule database
//! - [`file`]: atomic rule file loading and saving
//! - [`attr`]: label storage on filesystem objects
//! - [`error`]: Error types and Result alias
//!
//! # Usage
//!
//! ```rust
//! use smack_rules::{LoadOptions, RuleDatabase, RuleFormat, file};
//! use std::io::Cursor;
//!
//! let mut db = RuleDatabase::new();
//! file::load_into(&mut db, Cursor::new("Web Logs ra\n"), &LoadOptions::new()).unwrap();
//! assert!(db.has_access_str("Web", "Logs", "a"));
//!
//! let mut out = Vec::new();
//! file::save_to_writer(&db, &mut out, RuleFormat::Default).unwrap();
//! assert_eq!(out, b"Web Logs ra\n");
//! ```

#![warn(clippy::all)]

pub mod access;
pub mod attr;
pub mod error;
pub mod file;
pub mod label;
pub mod rules;

// Re-export key types at crate root for convenience
pub use access::{Access, AccessFormat};
pub use attr::{AttributeKind, AttributeStore, MemoryAttributeStore};
pub use error::{Error, Result};
pub use file::{LoadOptions, RuleFormat};
pub use label::{Label, LabelValidator, SMACK_LABEL_LEN, SmackLabelValidator, is_valid_label};
pub use rules::{Rule, RuleDatabase};
