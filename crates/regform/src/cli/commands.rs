//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::backend::PhotoSource;
use crate::form::{Field, FormController, FormError};
use crate::record::{MaritalStatus, Qualification};

/// Form field values supplied as flags.
///
/// Each flag goes through the same field update a UI keystroke would.
#[derive(Debug, Clone, Default, Args)]
pub struct EntryArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Ten digit mobile number
    #[arg(long)]
    pub mobile: Option<String>,

    /// Gender (Male, Female, Other)
    #[arg(long)]
    pub gender: Option<String>,

    /// Marital status; repeat to select several
    #[arg(long = "marital-status", value_name = "STATUS")]
    pub marital_status: Vec<String>,

    /// State of residence
    #[arg(long)]
    pub state: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Educational qualification (Graduate, "Post Graduate", Other)
    #[arg(long)]
    pub qualification: Option<String>,

    /// Subject; three for Graduate, one for Post Graduate
    #[arg(long = "subject", value_name = "SUBJECT")]
    pub subjects: Vec<String>,

    /// Photo to attach
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,
}

impl EntryArgs {
    /// Feed the supplied values into `form`, in field order.
    ///
    /// Marital statuses replace the current selection. The photo, if any,
    /// is attached from the gallery, so the form's picker must be the one
    /// that returns it.
    ///
    /// # Errors
    ///
    /// Returns the first rejected value.
    pub async fn apply(&self, form: &mut FormController) -> Result<(), FormError> {
        let text_fields = [
            (Field::Name, &self.name),
            (Field::MobileNumber, &self.mobile),
            (Field::Gender, &self.gender),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                form.update_field(field, value)?;
            }
        }

        if !self.marital_status.is_empty() {
            for selected in form.state().marital_status().to_vec() {
                form.toggle_marital_status(selected);
            }
            for status in &self.marital_status {
                let option = status
                    .parse::<MaritalStatus>()
                    .map_err(|e| FormError::invalid_input(Field::MaritalStatus, e.to_string()))?;
                if !form.state().marital_status().contains(&option) {
                    form.toggle_marital_status(option);
                }
            }
        }

        let later_fields = [
            (Field::State, &self.state),
            (Field::Email, &self.email),
            (Field::EducationalQualification, &self.qualification),
        ];
        for (field, value) in later_fields {
            if let Some(value) = value {
                form.update_field(field, value)?;
            }
        }

        if !self.subjects.is_empty() {
            let slots: &[Field] = match form.state().qualification() {
                Some(Qualification::Graduate) => {
                    &[Field::Subject1, Field::Subject2, Field::Subject3]
                }
                Some(Qualification::PostGraduate) => &[Field::Subject],
                _ => {
                    return Err(FormError::invalid_input(
                        Field::EducationalQualification,
                        "subjects apply only to Graduate or Post Graduate",
                    ))
                }
            };
            if self.subjects.len() > slots.len() {
                return Err(FormError::invalid_input(
                    slots[slots.len() - 1],
                    format!("expected at most {} subject(s)", slots.len()),
                ));
            }
            for (field, subject) in slots.iter().zip(&self.subjects) {
                form.update_field(*field, subject)?;
            }
        }

        if self.photo.is_some() {
            form.attach_photo(PhotoSource::Gallery).await?;
        }

        Ok(())
    }
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Field values
    #[command(flatten)]
    pub entry: EntryArgs,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the record to edit
    pub id: String,

    /// Field values to change
    #[command(flatten)]
    pub entry: EntryArgs,

    /// Detach the current photo
    #[arg(long, conflicts_with = "photo")]
    pub remove_photo: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the record to show
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the record to delete
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
