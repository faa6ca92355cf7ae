//! `regform` - CLI for the registration form engine
//!
//! This binary drives the form controller from the command line and manages
//! the saved records.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use regform::backend::{Collaborators, RecordStore};
use regform::cli::{
    detail_lines, record_json, summary_line, Cli, Command, ConfigCommand, DeleteCommand,
    EditCommand, EntryArgs, ShowCommand,
};
use regform::form::{FormController, FormError, SubmitOutcome};
use regform::{
    init_logging, AlwaysGranted, Config, FilePicker, LocalBlobStore, RecordId, RecordListing,
    SqliteRecordStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Execute the command; config commands read the file themselves
    let config_path = cli.config;
    match cli.command {
        Command::Register(cmd) => handle_register(&load_config(config_path)?, &cmd.entry).await,
        Command::Edit(cmd) => handle_edit(&load_config(config_path)?, &cmd).await,
        Command::List(cmd) => handle_list(&load_config(config_path)?, cmd.json).await,
        Command::Show(cmd) => handle_show(&load_config(config_path)?, &cmd).await,
        Command::Delete(cmd) => handle_delete(&load_config(config_path)?, &cmd).await,
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteRecordStore>> {
    let path = config.database_path();
    let store = SqliteRecordStore::open(&path)
        .with_context(|| format!("failed to open record store at {}", path.display()))?;
    Ok(Arc::new(store))
}

fn collaborators(
    config: &Config,
    store: Arc<SqliteRecordStore>,
    entry: &EntryArgs,
) -> Collaborators {
    let picker = entry
        .photo
        .as_ref()
        .map_or_else(FilePicker::empty, FilePicker::new);
    Collaborators {
        records: store,
        blobs: Arc::new(LocalBlobStore::new(config.photo_dir())),
        permissions: Arc::new(AlwaysGranted),
        picker: Arc::new(picker),
    }
}

async fn handle_register(config: &Config, entry: &EntryArgs) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut form = FormController::new(collaborators(config, store, entry), config);
    fill_and_submit(&mut form, entry).await
}

async fn handle_edit(config: &Config, cmd: &EditCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let listing = RecordListing::new(store.clone(), config.storage.collection.clone());
    let context = listing
        .open_for_edit(&RecordId::from(cmd.id.as_str()))
        .await
        .with_context(|| format!("cannot edit record '{}'", cmd.id))?;

    let mut form = FormController::new(collaborators(config, store, &cmd.entry), config);
    form.load(context);
    if cmd.remove_photo {
        form.remove_photo();
    }
    fill_and_submit(&mut form, &cmd.entry).await
}

async fn fill_and_submit(form: &mut FormController, entry: &EntryArgs) -> anyhow::Result<()> {
    if let Err(e) = entry.apply(form).await {
        let (title, body) = e.notice();
        bail!("{title}: {body}");
    }

    match form.submit().await {
        Ok(SubmitOutcome::Saved(success)) => {
            println!("{}", success.title());
            println!("{}", success.message());
            println!("Record id: {}", success.record_id);
            Ok(())
        }
        Ok(SubmitOutcome::Ignored) => bail!("a submission is already in progress"),
        Err(FormError::Validation(report)) => {
            eprintln!("Please fix the following fields:");
            for issue in report.issues() {
                eprintln!("  {:<26} {}", issue.field, issue.message);
            }
            bail!("validation failed for {} field(s)", report.len());
        }
        Err(e) => {
            let (title, body) = e.notice();
            Err(anyhow::Error::new(e).context(format!("{title}: {body}")))
        }
    }
}

async fn handle_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut listing = RecordListing::new(store, config.storage.collection.clone());
    let records = listing.refresh().await.context("failed to list records")?;

    if json {
        let values = records
            .iter()
            .map(record_json)
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if records.is_empty() {
        println!("No records found.");
    } else {
        for record in records {
            println!("{}", summary_line(record));
        }
        println!();
        println!("{} record(s)", records.len());
    }
    Ok(())
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stored = store
        .get(&config.storage.collection, &RecordId::from(cmd.id.as_str()))
        .await
        .with_context(|| format!("cannot show record '{}'", cmd.id))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record_json(&stored)?)?);
    } else {
        for line in detail_lines(&stored) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will permanently delete record '{}'.", cmd.id);
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let store = open_store(config)?;
    let mut listing = RecordListing::new(store, config.storage.collection.clone());
    listing
        .delete(&RecordId::from(cmd.id.as_str()))
        .await
        .with_context(|| format!("failed to delete record '{}'", cmd.id))?;
    println!(
        "Deleted record '{}'. {} record(s) remain.",
        cmd.id,
        listing.records().len()
    );
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Collection:         {}", config.storage.collection);
                println!();
                println!("[Photos]");
                println!("  Directory:          {}", config.photo_dir().display());
                println!("  Max bytes:          {}", config.photos.max_bytes);
                println!(
                    "  Allowed types:      {}",
                    config.photos.allowed_types.join(", ")
                );
                println!(
                    "  Picker limits:      {}x{} @ {}",
                    config.photos.max_width, config.photos.max_height, config.photos.quality
                );
                println!();
                println!("[Form]");
                println!("  Validation mode:    {:?}", config.form.validation_mode);
                println!(
                    "  Capital initial:    {}",
                    config.form.require_capital_initial
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_config_validate_fails_on_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.toml", "[photos]\nmax_bytes = 0\n");

        let result = handle_config(None, ConfigCommand::Validate { file: Some(bad) });
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validate_ignores_broken_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(&dir, "broken.toml", "[form]\nvalidation_mode = \"never\"\n");
        let good = write(&dir, "good.toml", "[storage]\ncollection = \"staff\"\n");

        let validate_good = ConfigCommand::Validate { file: Some(good) };
        let result = handle_config(Some(broken.clone()), validate_good);
        assert!(result.is_ok());

        // Without --file the global --config path is the one validated
        let result = handle_config(Some(broken), ConfigCommand::Validate { file: None });
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_follows_global_flag() {
        assert!(handle_config(Some(PathBuf::from("/tmp/x.toml")), ConfigCommand::Path).is_ok());
    }
}
