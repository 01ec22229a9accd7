//! Handler functions for `smackrules` subcommands.
//!
//! Handlers write their output to a caller-supplied writer and return
//! whether the command succeeded in the exit-status sense: `check` returns
//! `false` for a denied access and `label` for an invalid label. Errors are
//! reserved for things that went wrong.

use crate::cli::{Command, ConfigAction, RulesArgs};
use crate::config::SmackConfig;
use crate::error::{Error, Result};
use smack_rules::{
    Access, Label, LabelValidator, LoadOptions, RuleDatabase, RuleFormat, SmackLabelValidator,
    file,
};
use std::io::Write;
use std::path::{Path, PathBuf};

// ============================================================================
// Command dispatch
// ============================================================================

/// Runs `command` and reports whether it succeeded.
pub fn run<W: Write>(
    command: Command,
    config: &SmackConfig,
    config_path: Option<&str>,
    out: &mut W,
) -> Result<bool> {
    match command {
        Command::List {
            rules,
            subject,
            format,
            json,
        } => {
            let subject = subject.or_else(|| config.subject_filter.clone());
            let format = format.unwrap_or(config.output_format);
            cmd_list(config, &rules, subject.as_deref(), format, json, out)?;
            Ok(true)
        }
        Command::Check {
            rules,
            subject,
            object,
            access,
        } => cmd_check(config, &rules, &subject, &object, &access, out),
        Command::Add {
            rules,
            subject,
            object,
            access,
        } => {
            cmd_add(config, &rules, &subject, &object, &access)?;
            Ok(true)
        }
        Command::Remove {
            rules,
            subject,
            object,
        } => {
            cmd_remove(config, &rules, &subject, object.as_deref(), out)?;
            Ok(true)
        }
        Command::RemoveObject { rules, object } => {
            cmd_remove_object(config, &rules, &object)?;
            Ok(true)
        }
        Command::Convert {
            input,
            output,
            format,
        } => {
            cmd_convert(&input, &output, format.unwrap_or(config.output_format))?;
            Ok(true)
        }
        Command::Label { labels } => cmd_label(&labels, out),
        Command::Config { action } => {
            handle_config_command(config, config_path, action, out)?;
            Ok(true)
        }
    }
}

// ============================================================================
// Rule commands
// ============================================================================

/// Prints the rules of a rule file.
pub fn cmd_list<W: Write>(
    config: &SmackConfig,
    rules: &RulesArgs,
    subject: Option<&str>,
    format: RuleFormat,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let mut options = LoadOptions::new();
    if let Some(subject) = subject {
        options = options.with_subject_filter(subject);
    }
    let (_, db) = load_rules(config, rules, &options)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &db.to_rules())?;
        writeln!(out)?;
    } else {
        file::save_to_writer(&db, &mut *out, format)?;
    }
    Ok(())
}

/// Checks whether `subject` has `access` to `object`.
pub fn cmd_check<W: Write>(
    config: &SmackConfig,
    rules: &RulesArgs,
    subject: &str,
    object: &str,
    access: &str,
    out: &mut W,
) -> Result<bool> {
    let (_, db) = load_rules(config, rules, &LoadOptions::new())?;
    let required = Access::decode(access);
    let granted = db.has_access(subject, object, required);
    tracing::debug!(subject, object, required = %required, granted, "Access check");
    writeln!(out, "{}", if granted { "granted" } else { "denied" })?;
    Ok(granted)
}

/// Adds or replaces a rule and rewrites the rule file.
///
/// A missing rule file is created.
pub fn cmd_add(
    config: &SmackConfig,
    rules: &RulesArgs,
    subject: &str,
    object: &str,
    access: &str,
) -> Result<()> {
    let subject = Label::validated(subject, &SmackLabelValidator)?;
    let object = Label::validated(object, &SmackLabelValidator)?;
    let path = config.rules_file(rules.file.as_deref())?;
    let mut db = if path.exists() {
        load_path(&path, &LoadOptions::new())?
    } else {
        tracing::info!(path = %path.display(), "Creating new rule file");
        RuleDatabase::new()
    };

    db.add_rule(subject.as_str(), object.as_str(), access)?;
    save_path(&db, &path, config.output_format)
}

/// Removes one rule, or every rule of `subject`, and rewrites the rule file.
pub fn cmd_remove<W: Write>(
    config: &SmackConfig,
    rules: &RulesArgs,
    subject: &str,
    object: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let (path, mut db) = load_rules(config, rules, &LoadOptions::new())?;
    match object {
        Some(object) => {
            if !db.remove(subject, object) {
                tracing::warn!(subject, object, "No such rule");
                writeln!(out, "no rule for {subject} {object}")?;
                return Ok(());
            }
        }
        None => db.remove_all_for_subject(subject),
    }
    save_path(&db, &path, config.output_format)
}

/// Removes every rule for `object` and rewrites the rule file.
pub fn cmd_remove_object(config: &SmackConfig, rules: &RulesArgs, object: &str) -> Result<()> {
    let (path, mut db) = load_rules(config, rules, &LoadOptions::new())?;
    db.remove_all_for_object(object);
    save_path(&db, &path, config.output_format)
}

/// Rewrites `input` to `output` in `format`.
pub fn cmd_convert(input: &Path, output: &Path, format: RuleFormat) -> Result<()> {
    let db = load_path(input, &LoadOptions::new())?;
    save_path(&db, output, format)
}

/// Prints whether each label is valid. Returns `false` if any is not.
pub fn cmd_label<W: Write>(labels: &[String], out: &mut W) -> Result<bool> {
    let mut all_valid = true;
    for label in labels {
        let valid = SmackLabelValidator.is_valid_label(label);
        all_valid &= valid;
        writeln!(out, "{label}: {}", if valid { "valid" } else { "invalid" })?;
    }
    Ok(all_valid)
}

fn load_rules(
    config: &SmackConfig,
    rules: &RulesArgs,
    options: &LoadOptions,
) -> Result<(PathBuf, RuleDatabase)> {
    let path = config.rules_file(rules.file.as_deref())?;
    let db = load_path(&path, options)?;
    Ok((path, db))
}

fn load_path(path: &Path, options: &LoadOptions) -> Result<RuleDatabase> {
    let mut db = RuleDatabase::new();
    file::load_file(&mut db, path, options)?;
    tracing::info!(path = %path.display(), rules = db.len(), "Loaded rules");
    Ok(db)
}

fn save_path(db: &RuleDatabase, path: &Path, format: RuleFormat) -> Result<()> {
    file::save_file(db, path, format)?;
    tracing::info!(path = %path.display(), rules = db.len(), %format, "Saved rules");
    Ok(())
}

// ============================================================================
// Config commands
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command<W: Write>(
    config: &SmackConfig,
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Show => {
            write!(out, "{}", config.to_toml_string()?)?;
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let target = file.as_deref().or(config_path);
            cmd_config_init(target, force, out)
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let path = SmackConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        tracing::info!("Config file does not exist; run `smackrules config init` to create it");
    }
    Ok(())
}

/// Create a default configuration file.
pub fn cmd_config_init<W: Write>(file: Option<&str>, force: bool, out: &mut W) -> Result<()> {
    let path = SmackConfig::resolve_config_path(file)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| smack_rules::Error::io_with_path(e, parent))?;
    }

    let toml_str = SmackConfig::default().to_toml_string()?;
    std::fs::write(&path, toml_str).map_err(|e| smack_rules::Error::io_with_path(e, &path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rules_file(dir: &TempDir, text: &str) -> RulesArgs {
        let path = dir.path().join("accesses");
        std::fs::write(&path, text).unwrap();
        RulesArgs { file: Some(path) }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    // ------------------------------------------------------------------------
    // list
    // ------------------------------------------------------------------------

    #[test]
    fn test_list_default_format() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "bob obj1 a\nalice obj1 WR\n");
        let mut out = Vec::new();
        cmd_list(&SmackConfig::default(), &rules, None, RuleFormat::Default, false, &mut out)
            .unwrap();
        assert_eq!(output(out), "alice obj1 rw\nbob obj1 a\n");
    }

    #[test]
    fn test_list_subject_filter() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "bob obj1 a\nalice obj1 rw\n");
        let mut out = Vec::new();
        cmd_list(
            &SmackConfig::default(),
            &rules,
            Some("bob"),
            RuleFormat::Default,
            false,
            &mut out,
        )
        .unwrap();
        assert_eq!(output(out), "bob obj1 a\n");
    }

    #[test]
    fn test_list_json() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\n");
        let mut out = Vec::new();
        cmd_list(&SmackConfig::default(), &rules, None, RuleFormat::Default, true, &mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output(out)).unwrap();
        assert_eq!(value[0]["subject"], "alice");
        assert_eq!(value[0]["object"], "obj1");
        assert_eq!(value[0]["access"], "rw");
    }

    #[test]
    fn test_list_without_file_is_config_error() {
        let mut out = Vec::new();
        let err = cmd_list(
            &SmackConfig::default(),
            &RulesArgs::default(),
            None,
            RuleFormat::Default,
            false,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_list_uses_config_rules_path() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 x\n");
        let config = SmackConfig {
            rules_path: rules.file.clone(),
            ..Default::default()
        };
        let mut out = Vec::new();
        cmd_list(&config, &RulesArgs::default(), None, RuleFormat::Kernel, false, &mut out)
            .unwrap();
        assert!(output(out).ends_with(" --x-\n"));
    }

    // ------------------------------------------------------------------------
    // check
    // ------------------------------------------------------------------------

    #[test]
    fn test_check_granted_and_denied() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\n");
        let config = SmackConfig::default();

        let mut out = Vec::new();
        assert!(cmd_check(&config, &rules, "alice", "obj1", "r", &mut out).unwrap());
        assert!(!cmd_check(&config, &rules, "alice", "obj1", "rx", &mut out).unwrap());
        assert!(!cmd_check(&config, &rules, "bob", "obj1", "r", &mut out).unwrap());
        assert_eq!(output(out), "granted\ndenied\ndenied\n");
    }

    #[test]
    fn test_check_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1\n");
        let mut out = Vec::new();
        let err = cmd_check(&SmackConfig::default(), &rules, "alice", "obj1", "r", &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Rules(smack_rules::Error::MalformedLine { .. })
        ));
    }

    // ------------------------------------------------------------------------
    // add / remove
    // ------------------------------------------------------------------------

    #[test]
    fn test_add_creates_file() {
        let dir = TempDir::new().unwrap();
        let rules = RulesArgs {
            file: Some(dir.path().join("new")),
        };
        cmd_add(&SmackConfig::default(), &rules, "Web", "Logs", "ar").unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "Web Logs ra\n");
    }

    #[test]
    fn test_add_replaces_existing_rule() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "Web Logs r\nWeb Tmp w\n");
        cmd_add(&SmackConfig::default(), &rules, "Web", "Logs", "rwa").unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "Web Logs rwa\nWeb Tmp w\n");
    }

    #[test]
    fn test_add_rejects_invalid_label() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "Web Logs r\n");
        let err = cmd_add(&SmackConfig::default(), &rules, "-Web", "Logs", "r").unwrap_err();
        assert!(matches!(
            err,
            Error::Rules(smack_rules::Error::InvalidLabel { .. })
        ));
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "Web Logs r\n");
    }

    #[test]
    fn test_add_honours_output_format() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "");
        let config = SmackConfig {
            output_format: RuleFormat::Kernel,
            ..Default::default()
        };
        cmd_add(&config, &rules, "Web", "Logs", "r").unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, format!("{:<23} {:<23} r---\n", "Web", "Logs"));
    }

    #[test]
    fn test_remove_single_rule() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\nalice obj2 x\n");
        let mut out = Vec::new();
        cmd_remove(&SmackConfig::default(), &rules, "alice", Some("obj1"), &mut out).unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "alice obj2 x\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_remove_missing_rule_reports() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\n");
        let mut out = Vec::new();
        cmd_remove(&SmackConfig::default(), &rules, "alice", Some("obj9"), &mut out).unwrap();
        assert_eq!(output(out), "no rule for alice obj9\n");
    }

    #[test]
    fn test_remove_subject() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\nalice obj2 x\nbob obj1 a\n");
        let mut out = Vec::new();
        cmd_remove(&SmackConfig::default(), &rules, "alice", None, &mut out).unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "bob obj1 a\n");
    }

    #[test]
    fn test_remove_object() {
        let dir = TempDir::new().unwrap();
        let rules = rules_file(&dir, "alice obj1 rw\nalice obj2 x\nbob obj1 a\n");
        cmd_remove_object(&SmackConfig::default(), &rules, "obj1").unwrap();
        let text = std::fs::read_to_string(rules.file.unwrap()).unwrap();
        assert_eq!(text, "alice obj2 x\n");
    }

    // ------------------------------------------------------------------------
    // convert / label
    // ------------------------------------------------------------------------

    #[test]
    fn test_convert_to_kernel_and_back() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        let kernel = dir.path().join("kernel");
        let back = dir.path().join("back");
        std::fs::write(&input, "alice obj1 rw\nbob obj1 a\n").unwrap();

        cmd_convert(&input, &kernel, RuleFormat::Kernel).unwrap();
        cmd_convert(&kernel, &back, RuleFormat::Default).unwrap();

        assert_eq!(
            std::fs::read_to_string(&back).unwrap(),
            "alice obj1 rw\nbob obj1 a\n"
        );
    }

    #[test]
    fn test_label_command() {
        let mut out = Vec::new();
        let labels = vec!["Web".to_string(), "-bad".to_string()];
        assert!(!cmd_label(&labels, &mut out).unwrap());
        assert_eq!(output(out), "Web: valid\n-bad: invalid\n");

        let mut out = Vec::new();
        assert!(cmd_label(&["_".to_string()], &mut out).unwrap());
    }

    // ------------------------------------------------------------------------
    // config
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_path_explicit() {
        let mut out = Vec::new();
        cmd_config_path(Some("/explicit/config.toml"), &mut out).unwrap();
        assert_eq!(output(out), "/explicit/config.toml\n");
    }

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("smackrules").join("config.toml");
        let mut out = Vec::new();
        cmd_config_init(Some(path.to_str().unwrap()), false, &mut out).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("output_format"));
        assert!(content.contains("[logging]"));
    }

    #[test]
    fn test_config_init_no_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();
        let mut out = Vec::new();
        let err = cmd_config_init(Some(path.to_str().unwrap()), false, &mut out).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_config_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();
        let mut out = Vec::new();
        cmd_config_init(Some(path.to_str().unwrap()), true, &mut out).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("output_format"));
    }

    #[test]
    fn test_config_show() {
        let config = SmackConfig {
            output_format: RuleFormat::Kernel,
            ..Default::default()
        };
        let mut out = Vec::new();
        handle_config_command(&config, None, ConfigAction::Show, &mut out).unwrap();
        assert!(output(out).contains("output_format = \"kernel\""));
    }
}
