//! Public form schemas
//!
//! Submissions from the public site are checked here before anything is sent.
//! Every failing rule is reported, grouped by field.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    // General address shape; leading dots and `..` are checked separately
    static ref EMAIL_ADDRESS_REGEX: Regex = Regex::new(
        r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$"
    ).unwrap();

    // Stricter format the pickup form has always required
    static ref EMAIL_FORMAT_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9_\-.]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$"
    ).unwrap();

    // Digits are ASCII only
    static ref PHONE_REGEX: Regex = Regex::new(
        r"^([+]?[\s0-9]+)?([0-9]{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$"
    ).unwrap();
}

/// Message for a missing field
pub const REQUIRED_MESSAGE: &str = "Required";
/// Message for a malformed address
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";
/// Message for an address outside the accepted format
pub const EMAIL_FORMAT_MESSAGE: &str = "Email must be a valid format";
/// Message for a malformed phone number
pub const INVALID_PHONE_MESSAGE: &str = "Invalid contact number";

/// Whether a string is a well-formed email address
pub fn is_valid_email(email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !email.contains("..") && EMAIL_ADDRESS_REGEX.is_match(email)
}

/// Validation errors keyed by field, in the `{ "fieldErrors": { .. } }` shape
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormErrors {
    /// Errors not tied to a field
    #[serde(default)]
    pub form_errors: Vec<String>,
    /// Messages per field
    #[serde(default)]
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    /// Record a message for a field
    pub fn add(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Whether nothing failed
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages recorded for a field
    pub fn for_field(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn check_email(errors: &mut FormErrors, email: Option<&str>) {
    let Some(email) = email else {
        errors.add("email", REQUIRED_MESSAGE);
        return;
    };
    if !is_valid_email(email) {
        errors.add("email", INVALID_EMAIL_MESSAGE);
    }
    if !EMAIL_FORMAT_REGEX.is_match(email) {
        errors.add("email", EMAIL_FORMAT_MESSAGE);
    }
}

/// Pickup request form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactForm {
    /// Submitter's email
    #[serde(default)]
    pub email: Option<String>,
    /// Submitter's phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactForm {
    /// Check every field
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        check_email(&mut errors, self.email.as_deref());

        match self.phone.as_deref() {
            None => errors.add("phone", REQUIRED_MESSAGE),
            Some(phone) if !PHONE_REGEX.is_match(phone) => errors.add("phone", INVALID_PHONE_MESSAGE),
            Some(_) => {}
        }

        errors.into_result()
    }
}

/// Newsletter sign-up form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewsletterForm {
    /// Subscriber's email
    #[serde(default)]
    pub email: Option<String>,
}

impl NewsletterForm {
    /// Check every field
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        check_email(&mut errors, self.email.as_deref());
        errors.into_result()
    }
}
