//! Field filters and full-form validation rules.
//!
//! Two layers of checking happen here. Input filters run on every keystroke
//! and reject a proposed value outright. Full-form validation runs on submit
//! and produces per-field messages.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::state::{Field, FormState};
use crate::config::ValidationMode;
use crate::record::{STATES, STATE_PLACEHOLDER};

/// Longest accepted name, in characters.
pub const NAME_MAX_CHARS: usize = 25;

/// Exact length of a mobile number.
pub const MOBILE_DIGITS: usize = 10;

/// Digits a mobile number may start with.
pub const MOBILE_LEADING_DIGITS: [char; 4] = ['6', '7', '8', '9'];

/// A compiled field pattern.
#[derive(Debug)]
pub struct FieldPattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// The compiled regex.
    regex: Regex,
}

impl FieldPattern {
    /// Create a new field pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Check if the whole value matches this pattern.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Characters allowed in a name: letters, spaces, dot, hyphen and the
/// Roman numeral letters used in suffixes such as "III".
pub fn name_pattern() -> &'static FieldPattern {
    static PATTERN: OnceLock<FieldPattern> = OnceLock::new();
    PATTERN.get_or_init(|| FieldPattern::new("name", r"^[A-Za-z .\-IVXLCDM]*$"))
}

/// Digits only.
pub fn mobile_pattern() -> &'static FieldPattern {
    static PATTERN: OnceLock<FieldPattern> = OnceLock::new();
    PATTERN.get_or_init(|| FieldPattern::new("mobile", r"^[0-9]*$"))
}

/// A plain `local@domain.tld` address.
pub fn email_pattern() -> &'static FieldPattern {
    static PATTERN: OnceLock<FieldPattern> = OnceLock::new();
    PATTERN.get_or_init(|| FieldPattern::new("email", r"^[^\s@]+@[^\s@]+\.[^\s@]+$"))
}

/// Keystroke filter for the name field.
///
/// # Errors
///
/// Returns the reason the proposed value is rejected.
pub fn filter_name(value: &str, require_capital_initial: bool) -> Result<(), String> {
    if !name_pattern().matches(value) {
        return Err(
            "Name may only contain letters, spaces, dots, hyphens and Roman numerals".to_string(),
        );
    }
    if value.chars().count() > NAME_MAX_CHARS {
        return Err(format!("Name cannot exceed {NAME_MAX_CHARS} characters"));
    }
    if require_capital_initial
        && value
            .chars()
            .next()
            .is_some_and(|first| !first.is_ascii_uppercase())
    {
        return Err("Name must start with a capital letter".to_string());
    }
    Ok(())
}

/// Keystroke filter for the mobile number field.
///
/// # Errors
///
/// Returns the reason the proposed value is rejected.
pub fn filter_mobile(value: &str) -> Result<(), String> {
    if !mobile_pattern().matches(value) {
        return Err("Mobile number may only contain digits".to_string());
    }
    if value.len() > MOBILE_DIGITS {
        return Err(format!("Mobile number cannot exceed {MOBILE_DIGITS} digits"));
    }
    if value
        .chars()
        .next()
        .is_some_and(|first| !MOBILE_LEADING_DIGITS.contains(&first))
    {
        return Err("Mobile number must start with 6, 7, 8, or 9".to_string());
    }
    Ok(())
}

/// One failing field found by full-form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// The failing field.
    pub field: Field,
    /// Message shown next to the field.
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failing field, in declaration order.
///
/// Holds exactly one issue in [`ValidationMode::FirstError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<FieldIssue>,
}

impl ValidationReport {
    /// A report naming a single field.
    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field,
                message: message.into(),
            }],
        }
    }

    /// The first failing field.
    #[must_use]
    pub fn first(&self) -> Option<&FieldIssue> {
        self.issues.first()
    }

    /// All issues.
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn names(&self, field: Field) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Always false for a report returned by [`validate`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Run the required-field checks in declaration order.
///
/// # Errors
///
/// Returns the failing fields. In [`ValidationMode::FirstError`] checking
/// stops at the first failure.
pub fn validate(state: &FormState, mode: ValidationMode) -> Result<(), ValidationReport> {
    let mut issues = Vec::new();
    for field in Field::ALL {
        if let Some(message) = check_field(state, field) {
            issues.push(FieldIssue { field, message });
            if mode == ValidationMode::FirstError {
                break;
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { issues })
    }
}

/// Check one field, returning its message if it fails.
#[must_use]
pub fn check_field(state: &FormState, field: Field) -> Option<String> {
    match field {
        Field::Name => check_name(state.name()),
        Field::MobileNumber => check_mobile(state.mobile_number()),
        Field::Gender => state
            .gender()
            .is_none()
            .then(|| "Please select your gender".to_string()),
        Field::MaritalStatus => None,
        Field::State => check_state(state.state()),
        Field::Email => check_email(state.email()),
        Field::EducationalQualification => state
            .qualification()
            .is_none()
            .then(|| "Please select your educational qualification".to_string()),
        Field::Subject1 | Field::Subject2 | Field::Subject3 | Field::Subject => {
            check_subject(state, field)
        }
    }
}

fn check_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let Some(first) = trimmed.chars().next() else {
        return Some("Please enter your name".to_string());
    };
    if !first.is_alphabetic() {
        return Some("Name must start with a letter".to_string());
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Some(format!("Name cannot exceed {NAME_MAX_CHARS} characters"));
    }
    None
}

fn check_mobile(mobile: &str) -> Option<String> {
    let mobile = mobile.trim();
    if mobile.is_empty() {
        return Some("Please enter your mobile number".to_string());
    }
    if mobile.len() != MOBILE_DIGITS || !mobile.bytes().all(|b| b.is_ascii_digit()) {
        return Some(format!("Mobile number must be exactly {MOBILE_DIGITS} digits"));
    }
    if !mobile.starts_with(MOBILE_LEADING_DIGITS) {
        return Some("Mobile number must start with 6, 7, 8, or 9".to_string());
    }
    None
}

fn check_state(state: &str) -> Option<String> {
    let state = state.trim();
    if state.is_empty() || state == STATE_PLACEHOLDER {
        return Some("Please select your state".to_string());
    }
    if !STATES.contains(&state) {
        return Some(format!("'{state}' is not a recognised state"));
    }
    None
}

fn check_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Please enter your email address".to_string());
    }
    if !email_pattern().matches(email) {
        return Some("Please enter a valid email address".to_string());
    }
    None
}

fn check_subject(state: &FormState, field: Field) -> Option<String> {
    let required_for = field.subject_of()?;
    if state.qualification() != Some(required_for) {
        return None;
    }
    if !state.subject(field).trim().is_empty() {
        return None;
    }
    let message = match field {
        Field::Subject1 => "Please enter subject 1",
        Field::Subject2 => "Please enter subject 2",
        Field::Subject3 => "Please enter subject 3",
        _ => "Please enter your post graduate subject",
    };
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Gender, Qualification};

    fn valid_state() -> FormState {
        FormState {
            name: "A".to_string(),
            mobile_number: "9876543210".to_string(),
            gender: Some(Gender::Male),
            state: "Kerala".to_string(),
            email: "a@b.co".to_string(),
            qualification: Some(Qualification::Other),
            ..FormState::default()
        }
    }

    fn graduate_state() -> FormState {
        let mut state = valid_state();
        state.qualification = Some(Qualification::Graduate);
        state.subject1 = "History".to_string();
        state.subject2 = "Civics".to_string();
        state.subject3 = "Geography".to_string();
        state
    }

    #[test]
    fn test_name_filter_accepts_allowed_characters() {
        for name in ["", "A", "Jean-Luc Picard", "Henry VIII", "Dr. Rao", "M"] {
            assert!(filter_name(name, false).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_name_filter_rejects_other_characters() {
        for name in ["R2D2", "O'Neil", "Anne_Marie", "Zoë", "a@b"] {
            assert!(filter_name(name, false).is_err(), "{name}");
        }
    }

    #[test]
    fn test_name_filter_length_limit() {
        let at_limit = "A".repeat(NAME_MAX_CHARS);
        assert!(filter_name(&at_limit, false).is_ok());

        let over = "A".repeat(NAME_MAX_CHARS + 1);
        let reason = filter_name(&over, false).unwrap_err();
        assert!(reason.contains("25"));
    }

    #[test]
    fn test_name_filter_capital_initial() {
        assert!(filter_name("asha", false).is_ok());
        assert!(filter_name("asha", true).is_err());
        assert!(filter_name("Asha", true).is_ok());
        assert!(filter_name("", true).is_ok());
    }

    #[test]
    fn test_mobile_filter() {
        assert!(filter_mobile("").is_ok());
        assert!(filter_mobile("9").is_ok());
        assert!(filter_mobile("6123456789").is_ok());

        assert!(filter_mobile("98a").is_err());
        assert!(filter_mobile("98765432100").is_err());
        assert!(filter_mobile("5").is_err());
        assert!(filter_mobile("+91").is_err());
    }

    #[test]
    fn test_patterns_are_named() {
        assert_eq!(name_pattern().name, "name");
        assert_eq!(mobile_pattern().name, "mobile");
        assert!(email_pattern().matches("x@y.io"));
        assert!(!email_pattern().matches("x@y"));
        assert!(!email_pattern().matches("x y@z.io"));
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate(&valid_state(), ValidationMode::AllErrors).is_ok());
        assert!(validate(&valid_state(), ValidationMode::FirstError).is_ok());
    }

    #[test]
    fn test_empty_form_reports_required_fields_in_order() {
        let report = validate(&FormState::default(), ValidationMode::AllErrors).unwrap_err();
        let fields: Vec<Field> = report.issues().iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Name,
                Field::MobileNumber,
                Field::Gender,
                Field::State,
                Field::Email,
                Field::EducationalQualification,
            ]
        );
    }

    #[test]
    fn test_first_error_mode_stops_early() {
        let report = validate(&FormState::default(), ValidationMode::FirstError).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.first().map(|i| i.field), Some(Field::Name));
    }

    #[test]
    fn test_mobile_must_start_with_six_to_nine() {
        let mut state = valid_state();
        state.mobile_number = "5551234567".to_string();

        let report = validate(&state, ValidationMode::FirstError).unwrap_err();
        let issue = report.first().unwrap();
        assert_eq!(issue.field, Field::MobileNumber);
        assert!(issue.message.contains("6, 7, 8, or 9"));
    }

    #[test]
    fn test_mobile_must_be_ten_digits() {
        let mut state = valid_state();
        state.mobile_number = "98765".to_string();

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert!(report.names(Field::MobileNumber));
        assert!(report.first().unwrap().message.contains("exactly 10"));
    }

    #[test]
    fn test_bad_email_then_corrected() {
        let mut state = valid_state();
        state.email = "bad".to_string();

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.first().unwrap().field, Field::Email);

        state.email = "a@b.co".to_string();
        assert!(validate(&state, ValidationMode::AllErrors).is_ok());
    }

    #[test]
    fn test_name_must_start_with_letter() {
        let mut state = valid_state();
        state.name = " -Ravi".to_string();

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert!(report.names(Field::Name));
    }

    #[test]
    fn test_state_placeholder_is_not_a_selection() {
        let mut state = valid_state();
        state.state = STATE_PLACEHOLDER.to_string();

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert!(report.names(Field::State));
    }

    #[test]
    fn test_marital_status_never_required() {
        let state = valid_state();
        assert!(state.marital_status().is_empty());
        assert!(check_field(&state, Field::MaritalStatus).is_none());
    }

    #[test]
    fn test_graduate_subjects_required() {
        assert!(validate(&graduate_state(), ValidationMode::AllErrors).is_ok());

        for field in [Field::Subject1, Field::Subject2, Field::Subject3] {
            let mut state = graduate_state();
            if let Some(value) = state.subject_mut(field) {
                value.clear();
            }
            let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
            assert_eq!(report.len(), 1, "{field}");
            assert_eq!(report.first().unwrap().field, field);
        }
    }

    #[test]
    fn test_whitespace_subject_counts_as_empty() {
        let mut state = graduate_state();
        state.subject2 = "   ".to_string();

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert!(report.names(Field::Subject2));
    }

    #[test]
    fn test_post_graduate_subject_required() {
        let mut state = valid_state();
        state.qualification = Some(Qualification::PostGraduate);

        let report = validate(&state, ValidationMode::AllErrors).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.first().unwrap().field, Field::Subject);

        state.subject = "Physics".to_string();
        assert!(validate(&state, ValidationMode::AllErrors).is_ok());
    }

    #[test]
    fn test_subjects_ignored_for_other_qualification() {
        let state = valid_state();
        assert!(check_field(&state, Field::Subject1).is_none());
        assert!(check_field(&state, Field::Subject).is_none());
    }

    #[test]
    fn test_report_display() {
        let report = validate(&FormState::default(), ValidationMode::FirstError).unwrap_err();
        assert_eq!(report.to_string(), "name: Please enter your name");
    }
}
