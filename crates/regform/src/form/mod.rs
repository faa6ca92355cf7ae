//! Registration form controller.
//!
//! [`FormController`] owns the field values, per-field errors, the attached
//! photo and the submit state machine. It talks to the outside world only
//! through the collaborator traits in [`crate::backend`].
//!
//! A submission moves through `Idle -> Validating -> Submitting` and, when a
//! newly picked photo is attached, through `Uploading` before the record is
//! written. Only one submission may be in flight per form; a second call
//! while one is running returns [`SubmitOutcome::Ignored`].

mod error;
mod photo;
mod rules;
mod state;
mod status;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use error::FormError;
pub use photo::{check_asset, PhotoRejection};
pub use rules::{
    filter_mobile, filter_name, validate, FieldIssue, ValidationReport, MOBILE_DIGITS,
    NAME_MAX_CHARS,
};
pub use state::{EditContext, Field, FieldErrors, FormMode, FormState, Photo};
pub use status::{FormStatus, PhaseGuard, SubmitPhase};

use crate::backend::{Capability, Collaborators, ImageAsset, PhotoSource, PickResult, UploadProgress};
use crate::config::{Config, FormConfig, PhotoConfig, ValidationMode};
use crate::record::{
    Gender, MaritalStatus, Qualification, RecordId, Stamp, StoredRecord, SubmissionRecord,
    Timestamps, STATES, STATE_PLACEHOLDER,
};

/// What a call to [`FormController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The record was written.
    Saved(SubmitSuccess),
    /// Another submission was already in flight; nothing happened.
    Ignored,
}

/// Details of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSuccess {
    /// Id of the created or updated record.
    pub record_id: RecordId,
    /// Whether the saved record carries a photo reference.
    pub had_photo: bool,
    /// Whether the write created or updated the record.
    pub mode: FormMode,
}

impl SubmitSuccess {
    /// Title for the confirmation notice.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Registration Successful!",
            FormMode::Edit => "Update Successful!",
        }
    }

    /// Body for the confirmation notice.
    #[must_use]
    pub fn message(&self) -> String {
        let verb = match self.mode {
            FormMode::Create => "saved",
            FormMode::Edit => "updated",
        };
        if self.had_photo {
            format!("Your details and photo have been {verb}.")
        } else {
            format!("Your details have been {verb}.")
        }
    }

    /// Next steps offered to the user.
    #[must_use]
    pub fn follow_ups(&self) -> [FollowUp; 2] {
        match self.mode {
            FormMode::Create => [FollowUp::AddAnother, FollowUp::ViewList],
            FormMode::Edit => [FollowUp::ViewList, FollowUp::ContinueEditing],
        }
    }
}

/// What to do after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUp {
    /// Go to the record list; the form is reset.
    ViewList,
    /// Clear the form for another registration.
    AddAnother,
    /// Keep the form as it is, still editing the saved record.
    ContinueEditing,
}

impl std::fmt::Display for FollowUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ViewList => write!(f, "View All Records"),
            Self::AddAnother => write!(f, "Add Another"),
            Self::ContinueEditing => write!(f, "Continue Editing"),
        }
    }
}

/// Owns one form session.
#[derive(Debug)]
pub struct FormController {
    collaborators: Collaborators,
    collection: String,
    form: FormConfig,
    photos: PhotoConfig,
    state: FormState,
    errors: FieldErrors,
    focus: Option<Field>,
    edit: Option<EditContext>,
    status: FormStatus,
    progress: UploadProgress,
}

impl FormController {
    /// Open an empty form in create mode.
    #[must_use]
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        Self {
            collaborators,
            collection: config.storage.collection.clone(),
            form: config.form.clone(),
            photos: config.photos.clone(),
            state: FormState::default(),
            errors: FieldErrors::default(),
            focus: None,
            edit: None,
            status: FormStatus::new(),
            progress: UploadProgress::new(),
        }
    }

    /// Open a form pre-populated from an existing record, in edit mode.
    #[must_use]
    pub fn for_edit(collaborators: Collaborators, config: &Config, record: StoredRecord) -> Self {
        let mut controller = Self::new(collaborators, config);
        controller.load(EditContext::from(record));
        controller
    }

    /// Switch to editing `context`, replacing the current values.
    pub fn load(&mut self, context: EditContext) {
        info!(record_id = %context.record_id, "Opening record for edit");
        self.state = FormState::from_record(&context.original);
        self.errors.clear_all();
        self.focus = None;
        self.progress.clear();
        self.edit = Some(context);
    }

    /// Current field values.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Current per-field errors.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The input that should hold focus after a failed validation.
    #[must_use]
    pub fn focused(&self) -> Option<Field> {
        self.focus
    }

    /// The record being edited, if any.
    #[must_use]
    pub fn edit_context(&self) -> Option<&EditContext> {
        self.edit.as_ref()
    }

    /// Create or edit.
    #[must_use]
    pub fn mode(&self) -> FormMode {
        if self.edit.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    /// A handle to the submission phase.
    #[must_use]
    pub fn status(&self) -> FormStatus {
        self.status.clone()
    }

    /// A handle to photo upload progress.
    #[must_use]
    pub fn progress(&self) -> UploadProgress {
        self.progress.clone()
    }

    /// Apply a value to one field.
    ///
    /// Text fields take the raw input. Option fields take the option label;
    /// for [`Field::MaritalStatus`] the label is toggled in or out of the
    /// selection. An accepted change clears the field's error.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidInput`] and leaves the form unchanged if
    /// the value is rejected.
    pub fn update_field(&mut self, field: Field, value: &str) -> Result<&FormState, FormError> {
        match field {
            Field::Name => {
                filter_name(value, self.form.require_capital_initial)
                    .map_err(|reason| FormError::invalid_input(field, reason))?;
                self.state.name = value.to_string();
            }
            Field::MobileNumber => {
                filter_mobile(value).map_err(|reason| FormError::invalid_input(field, reason))?;
                self.state.mobile_number = value.to_string();
            }
            Field::Gender => {
                let gender = value
                    .parse::<Gender>()
                    .map_err(|e| FormError::invalid_input(field, e.to_string()))?;
                self.state.gender = Some(gender);
            }
            Field::MaritalStatus => {
                let option = value
                    .parse::<MaritalStatus>()
                    .map_err(|e| FormError::invalid_input(field, e.to_string()))?;
                self.state.toggle_marital_status(option);
            }
            Field::State => {
                let chosen = value.trim();
                if chosen != STATE_PLACEHOLDER && !STATES.contains(&chosen) {
                    return Err(FormError::invalid_input(
                        field,
                        format!("'{chosen}' is not a valid state"),
                    ));
                }
                self.state.state = chosen.to_string();
            }
            Field::Email => self.state.email = value.to_string(),
            Field::EducationalQualification => {
                let qualification = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse::<Qualification>().map_err(|e| {
                        FormError::invalid_input(field, e.to_string())
                    })?)
                };
                self.state.set_qualification(qualification);
                for subject in [Field::Subject1, Field::Subject2, Field::Subject3, Field::Subject] {
                    if subject.subject_of() != qualification {
                        self.errors.clear(subject);
                    }
                }
            }
            Field::Subject1 | Field::Subject2 | Field::Subject3 | Field::Subject => {
                if field.subject_of() != self.state.qualification {
                    return Err(FormError::invalid_input(
                        field,
                        "this subject does not apply to the selected qualification",
                    ));
                }
                if let Some(slot) = self.state.subject_mut(field) {
                    *slot = value.to_string();
                }
            }
        }

        self.errors.clear(field);
        debug!(field = %field, "Field updated");
        Ok(&self.state)
    }

    /// Toggle one marital status option.
    pub fn toggle_marital_status(&mut self, option: MaritalStatus) -> &FormState {
        self.state.toggle_marital_status(option);
        self.errors.clear(Field::MaritalStatus);
        &self.state
    }

    /// Pick a photo and attach it, replacing any previous one.
    ///
    /// Camera capture asks for permission first.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the current photo in place, if permission
    /// is denied, the picker is cancelled or fails, or the asset breaks the
    /// size or type limits.
    pub async fn attach_photo(&mut self, source: PhotoSource) -> Result<ImageAsset, FormError> {
        if source == PhotoSource::Camera {
            let status = self
                .collaborators
                .permissions
                .request(Capability::Camera)
                .await;
            if !status.is_granted() {
                warn!("Camera permission denied");
                return Err(FormError::PermissionDenied {
                    capability: Capability::Camera,
                });
            }
        }

        let options = self.photos.picker_options();
        let asset = match self.collaborators.picker.pick(source, &options).await {
            PickResult::Cancelled => {
                debug!(source = %source, "Photo selection cancelled");
                return Err(FormError::PickerCancelled);
            }
            PickResult::Error(message) => {
                warn!(source = %source, error = %message, "Image picker failed");
                return Err(FormError::Picker {
                    origin: source,
                    message,
                });
            }
            PickResult::Asset(asset) => asset,
        };

        if let Err(rejection) = check_asset(&asset, &self.photos) {
            info!(uri = %asset.uri, reason = %rejection, "Photo rejected");
            return Err(rejection.into());
        }

        info!(uri = %asset.uri, size = ?asset.file_size, "Photo attached");
        self.state.photo = Some(Photo::Pending(asset.clone()));
        Ok(asset)
    }

    /// Detach the current photo.
    pub fn remove_photo(&mut self) {
        if self.state.photo.take().is_some() {
            debug!("Photo removed");
        }
    }

    /// Run full-form validation and refresh the field errors.
    ///
    /// Every error is reset first. In [`ValidationMode::AllErrors`] focus
    /// moves to the first failing field.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&mut self) -> Result<(), ValidationReport> {
        let mode = self.form.validation_mode;
        let result = validate(&self.state, mode);

        self.errors.clear_all();
        self.focus = None;
        if let Err(report) = &result {
            for issue in report.issues() {
                self.errors.set(issue.field, issue.message.clone());
            }
            if mode == ValidationMode::AllErrors {
                self.focus = report.first().map(|issue| issue.field);
            }
        }
        result
    }

    /// Validate and write the form.
    ///
    /// In edit mode the record in the edit context is updated and its
    /// creation time is left alone; otherwise a new record is created. A
    /// photo that fails to persist is dropped and the record is saved
    /// without one.
    ///
    /// After a successful create the form stays open on the new record, so
    /// submitting again updates it rather than creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Validation`] without touching any collaborator if
    /// validation fails, and [`FormError::Store`] with the form unchanged if
    /// the write fails.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        let Some(guard) = self.status.try_begin() else {
            debug!("Submit ignored, a submission is already in flight");
            return Ok(SubmitOutcome::Ignored);
        };

        if let Err(report) = self.validate() {
            info!(failing = report.len(), "Form validation failed");
            return Err(FormError::Validation(report));
        }

        guard.set(SubmitPhase::Submitting);
        let photo_ref = match self.state.photo.clone() {
            None => None,
            Some(Photo::Stored(reference)) => Some(reference),
            Some(Photo::Pending(asset)) => {
                guard.set(SubmitPhase::Uploading);
                let reference = self.upload_photo(&asset).await;
                guard.set(SubmitPhase::Submitting);
                reference
            }
        };

        let record = self.build_record(photo_ref)?;
        let mode = self.mode();
        let records = Arc::clone(&self.collaborators.records);
        let written = match &self.edit {
            Some(context) => records
                .update(&self.collection, &context.record_id, &record)
                .await
                .map(|()| context.record_id.clone()),
            None => records.create(&self.collection, &record).await,
        };

        let record_id = match written {
            Ok(id) => id,
            Err(e) => {
                let err = FormError::store(e);
                warn!(error = %err, "Failed to save record");
                return Err(err);
            }
        };

        info!(
            record_id = %record_id,
            mode = ?mode,
            had_photo = record.photo_ref.is_some(),
            "Record saved"
        );

        let had_photo = record.photo_ref.is_some();
        self.state.photo = record.photo_ref.clone().map(Photo::Stored);
        self.edit = Some(EditContext {
            record_id: record_id.clone(),
            original: record,
        });
        drop(guard);

        Ok(SubmitOutcome::Saved(SubmitSuccess {
            record_id,
            had_photo,
            mode,
        }))
    }

    /// Persist a pending photo, returning `None` if that fails.
    async fn upload_photo(&self, asset: &ImageAsset) -> Option<String> {
        self.progress.clear();
        let stored = self
            .collaborators
            .blobs
            .store(asset, &self.progress)
            .await;
        self.progress.finish();

        match stored {
            Ok(reference) => {
                info!(uri = %asset.uri, reference = %reference, "Photo stored");
                Some(reference)
            }
            Err(e) => {
                warn!(uri = %asset.uri, error = %e, "Photo upload failed, saving without photo");
                None
            }
        }
    }

    fn build_record(&self, photo_ref: Option<String>) -> Result<SubmissionRecord, FormError> {
        let gender = self.state.gender.ok_or_else(|| {
            FormError::Validation(ValidationReport::single(
                Field::Gender,
                "Please select your gender",
            ))
        })?;

        let created_at = match self.edit {
            Some(_) => None,
            None => Some(Stamp::ServerTime),
        };

        Ok(SubmissionRecord {
            name: self.state.name.trim().to_string(),
            mobile_number: self.state.mobile_number.trim().to_string(),
            gender,
            marital_status: self.state.marital_status.clone(),
            state: self.state.state.trim().to_string(),
            email: self.state.email.trim().to_lowercase(),
            education: self.state.education(),
            photo_ref,
            timestamps: Timestamps {
                created_at,
                updated_at: Some(Stamp::ServerTime),
            },
        })
    }

    /// Return to an empty create-mode form.
    pub fn reset(&mut self) -> &FormState {
        self.state = FormState::default();
        self.errors.clear_all();
        self.focus = None;
        self.edit = None;
        self.progress.clear();
        debug!("Form reset");
        &self.state
    }

    /// Discard the form. Same as [`FormController::reset`].
    pub fn cancel(&mut self) -> &FormState {
        info!(mode = ?self.mode(), "Form cancelled");
        self.reset()
    }

    /// Act on the user's choice after a successful submission.
    pub fn apply_follow_up(&mut self, choice: FollowUp) {
        match choice {
            FollowUp::ViewList | FollowUp::AddAnother => {
                self.reset();
            }
            FollowUp::ContinueEditing => {}
        }
    }
}
