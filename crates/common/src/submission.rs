//! Customer submission model and input validation
//!
//! Raw form input arrives as a loosely-typed JSON object (urlencoded bodies are
//! lifted into string values first). [`validate_submission`] turns it into a
//! [`NewSubmission`] or a [`ValidationError`] that lists every bad field.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CUSTNAME_MAX_LEN: usize = 255;
pub const CUSTTEL_MAX_LEN: usize = 50;
pub const CUSTEMAIL_MAX_LEN: usize = 255;

const SIZE_MESSAGE: &str = "Size must be small, medium, or large";
const DELIVERY_MESSAGE: &str = "Delivery time must be morning, afternoon, or evening";

// ============================================================================
// Enumerated fields
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(format!("unknown size: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryWindow {
    Morning,
    Afternoon,
    Evening,
}

impl DeliveryWindow {
    pub const ALL: [DeliveryWindow; 3] = [
        DeliveryWindow::Morning,
        DeliveryWindow::Afternoon,
        DeliveryWindow::Evening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

impl std::fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryWindow {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            _ => Err(format!("unknown delivery window: {}", s)),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A validated submission that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub custname: String,
    pub custtel: String,
    pub custemail: String,
    pub size: Size,
    pub delivery: DeliveryWindow,
    pub comments: Option<String>,
}

/// A persisted submission as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSubmission {
    pub id: i64,
    pub custname: String,
    pub custtel: String,
    pub custemail: String,
    pub size: Size,
    pub delivery: DeliveryWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CustomerSubmission {
    /// True when every client-supplied field equals `new`.
    pub fn same_fields_as(&self, new: &NewSubmission) -> bool {
        self.custname == new.custname
            && self.custtel == new.custtel
            && self.custemail == new.custemail
            && self.size == new.size
            && self.delivery == new.delivery
            && self.comments == new.comments
    }
}

// ============================================================================
// Validation errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    WrongType,
    TooLong,
    MalformedEmail,
    NotInEnum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

/// Every field-level violation found in one input, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Validation failed for: {}", .violations.iter().map(|v| v.field).collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    pub fn violation(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.violation(field).is_some()
    }
}

// ============================================================================
// Validator
// ============================================================================

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+.-]*[A-Za-z0-9_+-]@([A-Za-z0-9][A-Za-z0-9-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Syntactic email check: `local@label.tld`, no leading dot, no `..`.
pub fn is_valid_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_RE.is_match(value)
}

enum RawField<'a> {
    Absent,
    Text(&'a str),
    Other(&'static str),
}

fn lookup<'a>(input: &'a Map<String, Value>, field: &str) -> RawField<'a> {
    match input.get(field) {
        None | Some(Value::Null) => RawField::Absent,
        Some(Value::String(s)) => RawField::Text(s),
        Some(Value::Bool(_)) => RawField::Other("boolean"),
        Some(Value::Number(_)) => RawField::Other("number"),
        Some(Value::Array(_)) => RawField::Other("array"),
        Some(Value::Object(_)) => RawField::Other("object"),
    }
}

fn required_text(
    input: &Map<String, Value>,
    field: &'static str,
    max_len: usize,
    required_message: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match lookup(input, field) {
        RawField::Absent => {
            violations.push(FieldViolation::new(field, ViolationKind::Required, required_message));
            None
        }
        RawField::Other(found) => {
            violations.push(FieldViolation::new(
                field,
                ViolationKind::WrongType,
                format!("{} must be a string (got {})", field, found),
            ));
            None
        }
        RawField::Text(s) if s.is_empty() => {
            violations.push(FieldViolation::new(field, ViolationKind::Required, required_message));
            None
        }
        RawField::Text(s) => {
            let len = s.chars().count();
            if len > max_len {
                violations.push(FieldViolation::new(
                    field,
                    ViolationKind::TooLong,
                    format!("{} must be at most {} characters (got {})", field, max_len, len),
                ));
                return None;
            }
            Some(s.to_string())
        }
    }
}

fn required_enum<T: std::str::FromStr>(
    input: &Map<String, Value>,
    field: &'static str,
    message: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    match lookup(input, field) {
        RawField::Absent => {
            violations.push(FieldViolation::new(field, ViolationKind::Required, message));
            None
        }
        RawField::Other(_) => {
            violations.push(FieldViolation::new(field, ViolationKind::WrongType, message));
            None
        }
        RawField::Text("") => {
            violations.push(FieldViolation::new(field, ViolationKind::Required, message));
            None
        }
        RawField::Text(s) => match s.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                violations.push(FieldViolation::new(field, ViolationKind::NotInEnum, message));
                None
            }
        },
    }
}

fn optional_text(
    input: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match lookup(input, field) {
        RawField::Absent | RawField::Text("") => None,
        RawField::Text(s) => Some(s.to_string()),
        RawField::Other(found) => {
            violations.push(FieldViolation::new(
                field,
                ViolationKind::WrongType,
                format!("{} must be a string (got {})", field, found),
            ));
            None
        }
    }
}

/// Validate raw form input into a [`NewSubmission`].
///
/// All violations are collected; at most one is reported per field. Unknown
/// keys are ignored. An empty `comments` value is treated as absent.
pub fn validate_submission(input: &Map<String, Value>) -> Result<NewSubmission, ValidationError> {
    let mut violations = Vec::new();

    let custname = required_text(
        input,
        "custname",
        CUSTNAME_MAX_LEN,
        "Customer name is required",
        &mut violations,
    );
    let custtel = required_text(
        input,
        "custtel",
        CUSTTEL_MAX_LEN,
        "Phone number is required",
        &mut violations,
    );
    let custemail = required_text(
        input,
        "custemail",
        CUSTEMAIL_MAX_LEN,
        "Email address is required",
        &mut violations,
    )
    .and_then(|email| {
        if is_valid_email(&email) {
            Some(email)
        } else {
            violations.push(FieldViolation::new(
                "custemail",
                ViolationKind::MalformedEmail,
                "Invalid email address",
            ));
            None
        }
    });
    let size = required_enum::<Size>(input, "size", SIZE_MESSAGE, &mut violations);
    let delivery =
        required_enum::<DeliveryWindow>(input, "delivery", DELIVERY_MESSAGE, &mut violations);
    let comments = optional_text(input, "comments", &mut violations);

    match (custname, custtel, custemail, size, delivery) {
        (Some(custname), Some(custtel), Some(custemail), Some(size), Some(delivery))
            if violations.is_empty() =>
        {
            Ok(NewSubmission {
                custname,
                custtel,
                custemail,
                size,
                delivery,
                comments,
            })
        }
        _ => Err(ValidationError { violations }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    fn john_doe() -> Map<String, Value> {
        input(json!({
            "custname": "John Doe",
            "custtel": "123-456-7890",
            "custemail": "john@example.com",
            "size": "medium",
            "delivery": "evening",
            "comments": ""
        }))
    }

    #[test]
    fn test_valid_input() {
        let submission = validate_submission(&john_doe()).unwrap();
        assert_eq!(submission.custname, "John Doe");
        assert_eq!(submission.custtel, "123-456-7890");
        assert_eq!(submission.custemail, "john@example.com");
        assert_eq!(submission.size, Size::Medium);
        assert_eq!(submission.delivery, DeliveryWindow::Evening);
        assert_eq!(submission.comments, None);
    }

    #[test]
    fn test_comments_kept_when_present() {
        let mut raw = john_doe();
        raw.insert("comments".into(), json!("Ring twice"));
        let submission = validate_submission(&raw).unwrap();
        assert_eq!(submission.comments.as_deref(), Some("Ring twice"));
    }

    #[test]
    fn test_every_missing_field_is_reported() {
        let err = validate_submission(&Map::new()).unwrap_err();
        assert_eq!(
            err.field_names(),
            vec!["custname", "custtel", "custemail", "size", "delivery"]
        );
        assert!(err.violations.iter().all(|v| v.kind == ViolationKind::Required));
        assert_eq!(
            err.violation("custname").unwrap().message,
            "Customer name is required"
        );
    }

    #[test]
    fn test_each_required_field_missing() {
        for field in ["custname", "custtel", "custemail", "size", "delivery"] {
            let mut raw = john_doe();
            raw.remove(field);
            let err = validate_submission(&raw).unwrap_err();
            assert_eq!(err.field_names(), vec![field], "removing {}", field);

            let mut raw = john_doe();
            raw.insert(field.into(), Value::Null);
            assert!(validate_submission(&raw).unwrap_err().contains(field));

            let mut raw = john_doe();
            raw.insert(field.into(), json!(""));
            assert!(validate_submission(&raw).unwrap_err().contains(field));
        }
    }

    #[test]
    fn test_enum_membership() {
        let mut raw = john_doe();
        raw.insert("size".into(), json!("huge"));
        raw.insert("delivery".into(), json!("Evening"));
        let err = validate_submission(&raw).unwrap_err();
        assert_eq!(err.field_names(), vec!["size", "delivery"]);
        assert_eq!(err.violation("size").unwrap().kind, ViolationKind::NotInEnum);
        assert_eq!(err.violation("size").unwrap().message, SIZE_MESSAGE);
        assert_eq!(err.violation("delivery").unwrap().message, DELIVERY_MESSAGE);
    }

    #[test]
    fn test_wrong_types() {
        let mut raw = john_doe();
        raw.insert("custtel".into(), json!(1234567890));
        raw.insert("size".into(), json!(["small"]));
        raw.insert("comments".into(), json!({"note": true}));
        let err = validate_submission(&raw).unwrap_err();
        assert_eq!(err.field_names(), vec!["custtel", "size", "comments"]);
        assert!(err.violations.iter().all(|v| v.kind == ViolationKind::WrongType));
        assert!(err.violation("custtel").unwrap().message.contains("number"));
    }

    #[test]
    fn test_length_bounds() {
        let mut raw = john_doe();
        raw.insert("custname".into(), json!("a".repeat(CUSTNAME_MAX_LEN)));
        raw.insert("custtel".into(), json!("1".repeat(CUSTTEL_MAX_LEN)));
        assert!(validate_submission(&raw).is_ok());

        raw.insert("custname".into(), json!("a".repeat(CUSTNAME_MAX_LEN + 1)));
        raw.insert("custtel".into(), json!("1".repeat(CUSTTEL_MAX_LEN + 1)));
        let err = validate_submission(&raw).unwrap_err();
        assert_eq!(err.field_names(), vec!["custname", "custtel"]);
        assert!(err.violations.iter().all(|v| v.kind == ViolationKind::TooLong));
    }

    #[test]
    fn test_length_counts_characters() {
        let mut raw = john_doe();
        // 255 two-byte characters is within bounds.
        raw.insert("custname".into(), json!("é".repeat(CUSTNAME_MAX_LEN)));
        assert!(validate_submission(&raw).is_ok());
    }

    #[test]
    fn test_malformed_email() {
        let mut raw = john_doe();
        raw.insert("custemail".into(), json!("not-an-email"));
        let err = validate_submission(&raw).unwrap_err();
        assert_eq!(err.field_names(), vec!["custemail"]);
        let violation = err.violation("custemail").unwrap();
        assert_eq!(violation.kind, ViolationKind::MalformedEmail);
        assert_eq!(violation.message, "Invalid email address");
    }

    #[test]
    fn test_email_syntax() {
        for ok in [
            "john@example.com",
            "john.doe+tag@mail.example.co",
            "o'brien@example.ie",
            "a_b-c@sub-domain.example.org",
        ] {
            assert!(is_valid_email(ok), "{} should be valid", ok);
        }
        for bad in [
            "not-an-email",
            "@example.com",
            "john@",
            "john@example",
            "john@example.c",
            ".john@example.com",
            "john..doe@example.com",
            "john.@example.com",
            "john doe@example.com",
            "john@-example.com",
            "john@@example.com",
        ] {
            assert!(!is_valid_email(bad), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut raw = john_doe();
        raw.insert("extra".into(), json!(12));
        assert!(validate_submission(&raw).is_ok());
    }

    #[test]
    fn test_error_display_lists_fields() {
        let mut raw = john_doe();
        raw.remove("custname");
        raw.insert("size".into(), json!("xl"));
        let err = validate_submission(&raw).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed for: custname, size");
    }

    #[test]
    fn test_enum_round_trip_through_str() {
        for size in Size::ALL {
            assert_eq!(size.to_string().parse::<Size>().unwrap(), size);
        }
        for window in DeliveryWindow::ALL {
            assert_eq!(window.to_string().parse::<DeliveryWindow>().unwrap(), window);
        }
    }
}
