//! Command-line interface for regform.
//!
//! This module provides the CLI structure and output formatting for the
//! `regform` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, EditCommand, EntryArgs, ListCommand, RegisterCommand,
    ShowCommand,
};

use crate::record::StoredRecord;

/// regform - Registration records from the terminal
///
/// Fill in, validate and store registration forms, and list, edit or delete
/// the saved records.
#[derive(Debug, Parser)]
#[command(name = "regform")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new record
    Register(RegisterCommand),

    /// Edit an existing record
    Edit(EditCommand),

    /// List saved records, newest first
    List(ListCommand),

    /// Show one record
    Show(ShowCommand),

    /// Delete a record
    Delete(DeleteCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// A stored record as a JSON document, with its id and timestamps.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
pub fn record_json(stored: &StoredRecord) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(&stored.record)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("id".to_string(), stored.id.as_str().into());
        object.insert(
            "createdAt".to_string(),
            stored.created_at().map(|t| t.to_rfc3339()).into(),
        );
        object.insert(
            "updatedAt".to_string(),
            stored.updated_at().map(|t| t.to_rfc3339()).into(),
        );
    }
    Ok(value)
}

/// One line describing a record, for `list`.
#[must_use]
pub fn summary_line(stored: &StoredRecord) -> String {
    let created = stored
        .created_at()
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
    format!(
        "{}  {:<25}  {}  {:<30}  {}",
        stored.id, stored.record.name, stored.record.mobile_number, stored.record.email, created
    )
}

/// Multi-line description of a record, for `show`.
#[must_use]
pub fn detail_lines(stored: &StoredRecord) -> Vec<String> {
    let record = &stored.record;
    let marital = if record.marital_status.is_empty() {
        "-".to_string()
    } else {
        record
            .marital_status
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let qualification = record
        .education
        .qualification()
        .map_or("-", |q| q.label());

    let mut lines = vec![
        format!("Id:             {}", stored.id),
        format!("Name:           {}", record.name),
        format!("Mobile:         {}", record.mobile_number),
        format!("Gender:         {}", record.gender),
        format!("Marital status: {marital}"),
        format!("State:          {}", record.state),
        format!("Email:          {}", record.email),
        format!("Qualification:  {qualification}"),
    ];
    match &record.education {
        crate::record::Education::Graduate { subjects } => lines.push(format!(
            "Subjects:       {}, {}, {}",
            subjects.subject1, subjects.subject2, subjects.subject3
        )),
        crate::record::Education::PostGraduate { subject } => {
            lines.push(format!("Subject:        {subject}"));
        }
        _ => {}
    }
    lines.push(format!(
        "Photo:          {}",
        record.photo_ref.as_deref().unwrap_or("-")
    ));
    if let Some(created) = stored.created_at() {
        lines.push(format!("Created:        {}", created.to_rfc3339()));
    }
    if let Some(updated) = stored.updated_at() {
        lines.push(format!("Updated:        {}", updated.to_rfc3339()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use crate::record::{Education, RecordId, Stamp};
    use chrono::{TimeZone, Utc};
    use clap::CommandFactory;

    fn stored() -> StoredRecord {
        let mut record = crate::testing::sample_record("Asha");
        record.education = Education::PostGraduate {
            subject: "Physics".to_string(),
        };
        record.timestamps.created_at =
            Some(Stamp::At(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()));
        StoredRecord {
            id: RecordId::from("abc123"),
            record,
        }
    }

    #[test]
    fn test_cli_debug() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "regform");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let quiet = Cli::try_parse_from(["regform", "-q", "list"]).unwrap();
        assert_eq!(quiet.verbosity(), Verbosity::Quiet);

        let normal = Cli::try_parse_from(["regform", "list"]).unwrap();
        assert_eq!(normal.verbosity(), Verbosity::Normal);

        let trace = Cli::try_parse_from(["regform", "-vv", "list"]).unwrap();
        assert_eq!(trace.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_register() {
        let args = [
            "regform",
            "register",
            "--name",
            "Asha",
            "--marital-status",
            "Married",
            "--marital-status",
            "Widowed",
            "--qualification",
            "Graduate",
            "--subject",
            "A",
            "--subject",
            "B",
            "--photo",
            "/tmp/me.jpg",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Register(register) = cli.command else {
            panic!("expected register");
        };
        assert_eq!(register.entry.name.as_deref(), Some("Asha"));
        assert_eq!(register.entry.marital_status.len(), 2);
        assert_eq!(register.entry.subjects, vec!["A", "B"]);
        assert_eq!(register.entry.photo, Some(PathBuf::from("/tmp/me.jpg")));
    }

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from(["regform", "edit", "rec-1", "--email", "x@y.io"]).unwrap();
        let Command::Edit(edit) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(edit.id, "rec-1");
        assert_eq!(edit.entry.email.as_deref(), Some("x@y.io"));
        assert!(!edit.remove_photo);
    }

    #[test]
    fn test_remove_photo_conflicts_with_photo() {
        let args = ["regform", "edit", "r", "--remove-photo", "--photo", "/tmp/a.jpg"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_delete_and_show() {
        let cli = Cli::try_parse_from(["regform", "delete", "r1", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Delete(DeleteCommand { yes: true, .. })));

        let cli = Cli::try_parse_from(["regform", "show", "r1", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Show(ShowCommand { json: true, .. })));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["regform", "-c", "/custom/config.toml", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["regform", "config", "validate", "-f", "/x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_record_json() {
        let value = record_json(&stored()).unwrap();
        assert_eq!(value["id"], "abc123");
        assert_eq!(value["educationalQualification"], "Post Graduate");
        assert_eq!(value["subject"], "Physics");
        assert_eq!(value["createdAt"], "2024-01-02T03:04:05+00:00");
        assert!(value["updatedAt"].is_null());
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&stored());
        assert!(line.starts_with("abc123  Asha"));
        assert!(line.ends_with("2024-01-02 03:04"));
    }

    #[test]
    fn test_detail_lines() {
        let lines = detail_lines(&stored());
        assert!(lines.iter().any(|l| l.contains("Post Graduate")));
        assert!(lines.iter().any(|l| l.starts_with("Subject:") && l.contains("Physics")));
        assert!(lines.iter().any(|l| l.starts_with("Marital status: -")));
        assert!(!lines.iter().any(|l| l.starts_with("Updated:")));
    }
}
