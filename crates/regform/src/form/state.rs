//! Form state held for the lifetime of one form session.

use std::collections::BTreeMap;
use std::fmt;

use crate::backend::ImageAsset;
use crate::record::{
    Education, Gender, GraduateSubjects, MaritalStatus, Qualification, RecordId, StoredRecord,
    SubmissionRecord,
};

/// An input on the registration form, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Full name.
    Name,
    /// Mobile number.
    MobileNumber,
    /// Gender radio group.
    Gender,
    /// Marital status check boxes.
    MaritalStatus,
    /// State picker.
    State,
    /// Email address.
    Email,
    /// Qualification picker.
    EducationalQualification,
    /// First graduate subject.
    Subject1,
    /// Second graduate subject.
    Subject2,
    /// Third graduate subject.
    Subject3,
    /// Post graduate subject.
    Subject,
}

impl Field {
    /// All fields in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Name,
        Self::MobileNumber,
        Self::Gender,
        Self::MaritalStatus,
        Self::State,
        Self::Email,
        Self::EducationalQualification,
        Self::Subject1,
        Self::Subject2,
        Self::Subject3,
        Self::Subject,
    ];

    /// Key used for this field in record documents.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::MobileNumber => "mobileNumber",
            Self::Gender => "gender",
            Self::MaritalStatus => "maritalStatus",
            Self::State => "state",
            Self::Email => "email",
            Self::EducationalQualification => "educationalQualification",
            Self::Subject1 => "subject1",
            Self::Subject2 => "subject2",
            Self::Subject3 => "subject3",
            Self::Subject => "subject",
        }
    }

    /// Whether this is one of the qualification-specific subject inputs.
    #[must_use]
    pub fn is_subject(&self) -> bool {
        matches!(
            self,
            Self::Subject1 | Self::Subject2 | Self::Subject3 | Self::Subject
        )
    }

    /// The qualification a subject input belongs to.
    #[must_use]
    pub fn subject_of(&self) -> Option<Qualification> {
        match self {
            Self::Subject1 | Self::Subject2 | Self::Subject3 => Some(Qualification::Graduate),
            Self::Subject => Some(Qualification::PostGraduate),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The photo currently attached to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    /// Picked on this device, not yet persisted.
    Pending(ImageAsset),
    /// Already persisted; holds the stored URL or path.
    Stored(String),
}

/// Field values of one form session.
///
/// Mutated only through [`crate::form::FormController`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub(crate) name: String,
    pub(crate) mobile_number: String,
    pub(crate) gender: Option<Gender>,
    pub(crate) marital_status: Vec<MaritalStatus>,
    pub(crate) state: String,
    pub(crate) email: String,
    pub(crate) qualification: Option<Qualification>,
    pub(crate) subject1: String,
    pub(crate) subject2: String,
    pub(crate) subject3: String,
    pub(crate) subject: String,
    pub(crate) photo: Option<Photo>,
}

impl FormState {
    /// Pre-populate a form from an existing record.
    #[must_use]
    pub fn from_record(record: &SubmissionRecord) -> Self {
        let mut state = Self {
            name: record.name.clone(),
            mobile_number: record.mobile_number.clone(),
            gender: Some(record.gender),
            state: record.state.clone(),
            email: record.email.clone(),
            qualification: record.education.qualification(),
            photo: record.photo_ref.clone().map(Photo::Stored),
            ..Self::default()
        };
        for status in &record.marital_status {
            if !state.marital_status.contains(status) {
                state.marital_status.push(*status);
            }
        }
        match &record.education {
            Education::Graduate { subjects } => {
                state.subject1.clone_from(&subjects.subject1);
                state.subject2.clone_from(&subjects.subject2);
                state.subject3.clone_from(&subjects.subject3);
            }
            Education::PostGraduate { subject } => state.subject.clone_from(subject),
            Education::Unspecified | Education::Other => {}
        }
        state
    }

    /// Entered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entered mobile number.
    #[must_use]
    pub fn mobile_number(&self) -> &str {
        &self.mobile_number
    }

    /// Selected gender.
    #[must_use]
    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Selected marital statuses, in selection order.
    #[must_use]
    pub fn marital_status(&self) -> &[MaritalStatus] {
        &self.marital_status
    }

    /// Selected state; empty or the placeholder when nothing is chosen.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Entered email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Selected qualification.
    #[must_use]
    pub fn qualification(&self) -> Option<Qualification> {
        self.qualification
    }

    /// Current value of a subject input; empty for non-subject fields.
    #[must_use]
    pub fn subject(&self, field: Field) -> &str {
        match field {
            Field::Subject1 => &self.subject1,
            Field::Subject2 => &self.subject2,
            Field::Subject3 => &self.subject3,
            Field::Subject => &self.subject,
            _ => "",
        }
    }

    /// Attached photo.
    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    /// Whether nothing has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn subject_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Subject1 => Some(&mut self.subject1),
            Field::Subject2 => Some(&mut self.subject2),
            Field::Subject3 => Some(&mut self.subject3),
            Field::Subject => Some(&mut self.subject),
            _ => None,
        }
    }

    /// Add the option if absent, remove it if present.
    pub(crate) fn toggle_marital_status(&mut self, option: MaritalStatus) {
        if let Some(pos) = self.marital_status.iter().position(|s| *s == option) {
            self.marital_status.remove(pos);
        } else {
            self.marital_status.push(option);
        }
    }

    /// Change qualification, clearing subjects that no longer apply.
    pub(crate) fn set_qualification(&mut self, qualification: Option<Qualification>) {
        if qualification != Some(Qualification::Graduate) {
            self.subject1.clear();
            self.subject2.clear();
            self.subject3.clear();
        }
        if qualification != Some(Qualification::PostGraduate) {
            self.subject.clear();
        }
        self.qualification = qualification;
    }

    /// Education payload for the current qualification, with trimmed subjects.
    #[must_use]
    pub fn education(&self) -> Education {
        match self.qualification {
            None => Education::Unspecified,
            Some(Qualification::Graduate) => Education::Graduate {
                subjects: GraduateSubjects {
                    subject1: self.subject1.trim().to_string(),
                    subject2: self.subject2.trim().to_string(),
                    subject3: self.subject3.trim().to_string(),
                },
            },
            Some(Qualification::PostGraduate) => Education::PostGraduate {
                subject: self.subject.trim().to_string(),
            },
            Some(Qualification::Other) => Education::Other,
        }
    }
}

/// Per-field error messages.
///
/// A field has an error exactly when it has a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    messages: BTreeMap<Field, String>,
}

impl FieldErrors {
    /// Whether the field is flagged.
    #[must_use]
    pub fn has_error(&self, field: Field) -> bool {
        self.messages.contains_key(&field)
    }

    /// The field's message, if flagged.
    #[must_use]
    pub fn message(&self, field: Field) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    /// Whether any field is flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of flagged fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Flagged fields with their messages, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.messages.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub(crate) fn set(&mut self, field: Field, message: impl Into<String>) {
        self.messages.insert(field, message.into());
    }

    pub(crate) fn clear(&mut self, field: Field) {
        self.messages.remove(&field);
    }

    pub(crate) fn clear_all(&mut self) {
        self.messages.clear();
    }
}

/// Marks a form as editing an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditContext {
    /// The record being edited.
    pub record_id: RecordId,
    /// The record as it was when the form opened (or last saved).
    pub original: SubmissionRecord,
}

impl From<StoredRecord> for EditContext {
    fn from(stored: StoredRecord) -> Self {
        Self {
            record_id: stored.id,
            original: stored.record,
        }
    }
}

/// Whether a form creates a new record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormMode {
    /// Submitting creates a record.
    Create,
    /// Submitting updates the record in the edit context.
    Edit,
}
