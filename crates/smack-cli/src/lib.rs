//! # smack-cli
//!
//! Command-line front end for the Smack rule database.
//!
//! This crate provides the `smackrules` tool:
//! - Listing rule files in either layout, or as JSON
//! - Access checks against a rule file
//! - Adding and removing rules in place
//! - Converting between the default and kernel layouts
//! - Label syntax checks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};
