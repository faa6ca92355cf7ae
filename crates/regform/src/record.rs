//! Core record types for regform.
//!
//! This module defines the registrant record that the form controller sends
//! to the record store, along with the enumerated option sets the form
//! offers (gender, marital status, qualification and state).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder entry shown at the top of the state picker.
pub const STATE_PLACEHOLDER: &str = "Select State";

/// States offered by the state picker, in display order.
pub const STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// A value that is not one of the options a picker offers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownOption {
    /// Which option set was being parsed.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

impl UnknownOption {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Registrant gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other.
    Other,
}

impl Gender {
    /// All options in display order.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption::new("gender", s))
    }
}

/// One selectable marital status. The form keeps a set of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaritalStatus {
    /// Never married.
    Unmarried,
    /// Married.
    Married,
    /// Divorced.
    Divorced,
    /// Widowed.
    Widowed,
}

impl MaritalStatus {
    /// All options in display order.
    pub const ALL: [Self; 4] = [
        Self::Unmarried,
        Self::Married,
        Self::Divorced,
        Self::Widowed,
    ];
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmarried => write!(f, "Unmarried"),
            Self::Married => write!(f, "Married"),
            Self::Divorced => write!(f, "Divorced"),
            Self::Widowed => write!(f, "Widowed"),
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption::new("marital status", s))
    }
}

/// Highest educational qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualification {
    /// Graduate; requires three subjects.
    Graduate,
    /// Post graduate; requires one subject.
    PostGraduate,
    /// Any other qualification; no subjects.
    Other,
}

impl Qualification {
    /// All options in display order.
    pub const ALL: [Self; 3] = [Self::Graduate, Self::PostGraduate, Self::Other];

    /// The label stored in records and shown in the picker.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Graduate => "Graduate",
            Self::PostGraduate => "Post Graduate",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Qualification {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownOption::new("qualification", s))
    }
}

/// The three subjects recorded for a graduate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraduateSubjects {
    /// First subject.
    pub subject1: String,
    /// Second subject.
    pub subject2: String,
    /// Third subject.
    pub subject3: String,
}

/// Education details, keyed by qualification.
///
/// Serialized flat into the record document: the qualification label goes
/// under `educationalQualification` and the subject payload sits beside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "educationalQualification")]
pub enum Education {
    /// No qualification selected.
    #[default]
    #[serde(rename = "")]
    Unspecified,
    /// Graduate with three subjects.
    #[serde(rename = "Graduate")]
    Graduate {
        /// Subject names.
        subjects: GraduateSubjects,
    },
    /// Post graduate with one subject.
    #[serde(rename = "Post Graduate")]
    PostGraduate {
        /// Subject name.
        subject: String,
    },
    /// Other qualification.
    #[serde(rename = "Other")]
    Other,
}

impl Education {
    /// The qualification this education entry belongs to.
    #[must_use]
    pub fn qualification(&self) -> Option<Qualification> {
        match self {
            Self::Unspecified => None,
            Self::Graduate { .. } => Some(Qualification::Graduate),
            Self::PostGraduate { .. } => Some(Qualification::PostGraduate),
            Self::Other => Some(Qualification::Other),
        }
    }
}

/// Identifier of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A timestamp as written by the form.
///
/// `ServerTime` asks the store to substitute its own clock at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// Resolve to the store's current time when written.
    ServerTime,
    /// A concrete instant.
    At(DateTime<Utc>),
}

impl Stamp {
    /// Resolve the stamp against the given "now".
    #[must_use]
    pub fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::ServerTime => now,
            Self::At(at) => at,
        }
    }

    /// The concrete instant, if already resolved.
    #[must_use]
    pub fn instant(self) -> Option<DateTime<Utc>> {
        match self {
            Self::ServerTime => None,
            Self::At(at) => Some(at),
        }
    }
}

/// Creation and update stamps carried alongside a record.
///
/// On write, `None` means "leave as is"; on read, `None` means the store
/// never recorded one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamps {
    /// When the record was first created.
    pub created_at: Option<Stamp>,
    /// When the record was last written.
    pub updated_at: Option<Stamp>,
}

/// The registrant record written to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Full name, trimmed.
    pub name: String,

    /// Ten digit mobile number.
    pub mobile_number: String,

    /// Gender.
    pub gender: Gender,

    /// Selected marital statuses; may be empty.
    #[serde(default)]
    pub marital_status: Vec<MaritalStatus>,

    /// State of residence.
    pub state: String,

    /// Lower-cased email address.
    pub email: String,

    /// Qualification and its subjects.
    #[serde(flatten)]
    pub education: Education,

    /// URL or local path of the stored photo, if any.
    #[serde(default)]
    pub photo_ref: Option<String>,

    /// Timestamps, kept out of the document body.
    #[serde(skip)]
    pub timestamps: Timestamps,
}

/// A record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Store-assigned id.
    pub id: RecordId,
    /// The record body with resolved timestamps.
    pub record: SubmissionRecord,
}

impl StoredRecord {
    /// When the record was created, if known.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.record.timestamps.created_at.and_then(Stamp::instant)
    }

    /// When the record was last updated, if known.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.record.timestamps.updated_at.and_then(Stamp::instant)
    }
}
