use std::fmt;

/// A single field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required")]
pub struct FieldError {
    /// Human-readable field name, e.g. `"blood group"`.
    pub field: &'static str,
}

/// Every field that failed validation for one candidate record.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// A single missing field.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self(vec![FieldError { field }])
    }

    /// The failing fields, in the order they were checked.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "please provide ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", error.field)?;
        }
        Ok(())
    }
}

/// Accumulates field failures so that all of them are reported at once.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    /// Require a non-blank string, returning it trimmed.
    pub(crate) fn text(&mut self, field: &'static str, value: String) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.push(FieldError { field });
        }
        trimmed.to_string()
    }

    /// Require a value to be present.
    pub(crate) fn present<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors.push(FieldError { field });
        }
        value
    }

    /// Finish checking, returning the failures if there were any.
    pub(crate) fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Trim an optional string, treating blank values as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_missing_field() {
        let mut checker = Checker::default();
        checker.text("name", "  ".to_string());
        checker.present::<u8>("blood group", None);
        checker.text("phone", "123".to_string());

        let errors = checker.finish().unwrap_err();
        assert_eq!(
            errors.fields(),
            &[
                FieldError { field: "name" },
                FieldError {
                    field: "blood group"
                }
            ]
        );
        assert_eq!(errors.to_string(), "please provide name, blood group");
    }

    #[test]
    fn passes_when_all_fields_present() {
        let mut checker = Checker::default();
        assert_eq!(checker.text("name", " Asha ".to_string()), "Asha");
        assert_eq!(checker.present("units", Some(2)), Some(2));
        assert!(checker.finish().is_ok());
    }

    #[test]
    fn missing_names_one_field() {
        let errors = ValidationErrors::missing("blood group");
        assert_eq!(errors.fields(), [FieldError { field: "blood group" }]);
        assert_eq!(errors.to_string(), "please provide blood group");
    }

    #[test]
    fn blank_optional_text_is_absent() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" Noida ".to_string())), Some("Noida".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
