//! Request validation that reports every problem at once.
//!
//! Handlers push checks into a [`Violations`] collector and call
//! [`Violations::finish`] at the end, so a bad request lists all of its
//! offending fields in a single 400 instead of one per round trip.

use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Requires a non-blank value.
    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} is required"));
        }
    }

    /// Requires `local@domain` with a dotted domain. Anything stricter
    /// belongs to a confirmation mail, not a regex.
    pub fn email(&mut self, field: &str, value: &str) {
        let well_formed = value
            .split_once('@')
            .map_or(false, |(local, domain)| {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            });
        if !well_formed {
            self.push(field, format!("{field} must be a valid email address"));
        }
    }

    /// Requires an absolute http(s) URL when the value is present.
    pub fn url(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                self.push(field, format!("{field} must be an http(s) URL"));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok when nothing was reported, otherwise a 400 carrying every error.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(v: Violations) -> Vec<FieldError> {
        match v.finish() {
            Ok(()) => vec![],
            Err(AppError::Validation(fields)) => fields,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clean_input_finishes_ok() {
        let mut v = Violations::new();
        v.non_empty("name", "Dana");
        v.email("email", "dana@school.edu");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_blank_value_is_required() {
        let mut v = Violations::new();
        v.non_empty("name", "   ");
        let errors = errors_of(v);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "name is required");
    }

    #[test]
    fn test_all_failures_reported_together() {
        let mut v = Violations::new();
        v.non_empty("name", "");
        v.email("email", "not-an-email");
        v.url("jobLink", Some("ftp://example.com"));
        let errors = errors_of(v);
        assert_eq!(errors.len(), 3);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "jobLink"]);
    }

    #[test]
    fn test_email_rejects_missing_at_and_bare_domain() {
        for bad in ["plain", "a@b", "@x.com", "a@.com"] {
            let mut v = Violations::new();
            v.email("email", bad);
            assert!(!v.is_empty(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_email_accepts_dotted_domain() {
        let mut v = Violations::new();
        v.email("email", "sam+jobs@corp.example.com");
        assert!(v.is_empty());
    }

    #[test]
    fn test_url_absent_is_fine() {
        let mut v = Violations::new();
        v.url("jobLink", None);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_url_requires_http_scheme() {
        let mut v = Violations::new();
        v.url("link", Some("https://leetcode.com/problems/two-sum"));
        assert!(v.is_empty());
        v.url("link", Some("leetcode.com/problems/two-sum"));
        assert!(!v.is_empty());
    }
}
