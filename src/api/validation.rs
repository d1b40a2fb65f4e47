use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Lowercase the domain part, keep the local part as given
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Rules for a text input field
#[derive(Debug, Clone, Copy)]
pub struct CharField {
    pub required: bool,
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub trim_whitespace: bool,
}

impl CharField {
    pub const fn required() -> Self {
        Self {
            required: true,
            allow_blank: false,
            max_length: None,
            trim_whitespace: true,
        }
    }

    pub const fn optional() -> Self {
        Self {
            required: false,
            allow_blank: true,
            max_length: None,
            trim_whitespace: true,
        }
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub const fn untrimmed(mut self) -> Self {
        self.trim_whitespace = false;
        self
    }
}

/// Field-by-field reader over a JSON object body that collects every error
/// before failing.
///
/// In partial mode (PATCH) absent fields are skipped instead of reported.
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Value, partial: bool) -> Result<Self, ApiError> {
        match body {
            Value::Object(fields) => Ok(Self {
                fields,
                partial,
                errors: FieldErrors::new(),
            }),
            other => Err(ApiError::validation(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected a dictionary, but got {}.", json_type_name(other)),
            )),
        }
    }

    pub fn char_field(&mut self, name: &str, rules: CharField) -> Option<String> {
        let raw = match self.fields.get(name) {
            None => {
                if rules.required && !self.partial {
                    self.errors.add(name, REQUIRED);
                }
                return None;
            }
            Some(Value::Null) => {
                self.errors.add(name, NOT_NULL);
                return None;
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                self.errors.add(name, NOT_A_STRING);
                return None;
            }
        };

        let value = if rules.trim_whitespace {
            raw.trim().to_string()
        } else {
            raw
        };

        if value.is_empty() && !rules.allow_blank {
            self.errors.add(name, NOT_BLANK);
            return None;
        }
        if let Some(max) = rules.max_length {
            if value.chars().count() > max {
                self.errors
                    .add(name, format!("Ensure this field has no more than {} characters.", max));
                return None;
            }
        }
        Some(value)
    }

    pub fn email_field(&mut self, name: &str, rules: CharField) -> Option<String> {
        let value = self.char_field(name, rules)?;
        if value.is_empty() {
            return Some(value);
        }
        if !is_valid_email(&value) {
            self.errors.add(name, INVALID_EMAIL);
            return None;
        }
        Some(normalize_email(&value))
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.errors.into_result()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
