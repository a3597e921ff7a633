//! Structural validation of built records.
//!
//! The [`Validator`] walks a record's fields against its descriptor tables and accumulates
//! every problem it finds; it never stops at the first error. Nested backbone elements and
//! contained resources are validated in place, with their errors reported under a path such as
//! `coverage[0].coverage`.

use crate::builder::MissingEntries;
use crate::config::ModelConfig;
use crate::datatypes::Reference;
use crate::descriptor::FieldDescriptor;
use crate::registry;
use std::fmt;

/// A single validation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A repeated field holds a missing entry.
    #[error("repeating element '{field}' does not permit missing entries (index {index})")]
    Structural { field: String, index: usize },

    /// A reference names a resource type outside the field's allowed targets.
    #[error("resource type '{actual}' for element '{field}' must be one of: {}", .allowed.join(", "))]
    ReferenceType {
        field: String,
        actual: String,
        allowed: Vec<String>,
    },

    /// A reference value could not be interpreted.
    #[error("invalid reference '{value}' for element '{field}': {reason}")]
    InvalidReference {
        field: String,
        value: String,
        reason: String,
    },

    /// A mandatory field is absent.
    #[error("missing required element '{field}'")]
    RequiredField { field: String },
}

impl ValidationError {
    /// Path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Structural { field, .. }
            | ValidationError::ReferenceType { field, .. }
            | ValidationError::InvalidReference { field, .. }
            | ValidationError::RequiredField { field } => field,
        }
    }
}

/// Every error found while validating one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors {
    type_name: &'static str,
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(type_name: &'static str, errors: Vec<ValidationError>) -> Self {
        Self { type_name, errors }
    }

    /// Type name of the record that failed.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed validation with {} error(s)",
            self.type_name,
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Something the validator can descend into.
pub trait Validate {
    fn validate_fields(&self, validator: &mut Validator);
}

/// Accumulates validation errors for one record, tracking the path of nested elements.
#[derive(Debug)]
pub struct Validator {
    config: ModelConfig,
    prefix: Vec<String>,
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            prefix: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Path of `name` (at `index`, if repeated) under the current prefix.
    pub fn path(&self, name: &str, index: Option<usize>) -> String {
        let leaf = match index {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_owned(),
        };
        if self.prefix.is_empty() {
            leaf
        } else {
            format!("{}.{leaf}", self.prefix.join("."))
        }
    }

    pub fn report(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// A repeated field must not have had missing entries when it was staged.
    pub fn check_entries(&mut self, name: &str, missing: &MissingEntries) {
        for index in missing.indices(name) {
            let field = self.path(name, None);
            self.report(ValidationError::Structural { field, index });
        }
    }

    /// A required singular field must be present.
    pub fn require<T>(&mut self, field: &FieldDescriptor, value: Option<&T>) {
        if value.is_none() {
            let field = self.path(field.name, None);
            self.report(ValidationError::RequiredField { field });
        }
    }

    /// Validate a nested element or contained resource under `name[index]`.
    pub fn nested<T: Validate + ?Sized>(&mut self, name: &str, index: Option<usize>, value: &T) {
        let seg = match index {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_owned(),
        };
        self.prefix.push(seg);
        value.validate_fields(self);
        self.prefix.pop();
    }

    pub fn nested_field<T: Validate>(&mut self, name: &str, value: Option<&T>) {
        if let Some(value) = value {
            self.nested(name, None, value);
        }
    }

    pub fn nested_list<T: Validate>(&mut self, name: &str, values: &[T]) {
        for (i, value) in values.iter().enumerate() {
            self.nested(name, Some(i), value);
        }
    }

    /// Check an optional singular reference field.
    pub fn check_reference(&mut self, field: &FieldDescriptor, reference: Option<&Reference>) {
        if let Some(reference) = reference {
            self.check_reference_at(field, None, reference);
        }
    }

    /// Check every entry of a repeated reference field.
    pub fn check_references(&mut self, field: &FieldDescriptor, references: &[Reference]) {
        for (i, reference) in references.iter().enumerate() {
            self.check_reference_at(field, Some(i), reference);
        }
    }

    fn check_reference_at(
        &mut self,
        field: &FieldDescriptor,
        index: Option<usize>,
        reference: &Reference,
    ) {
        if !self.config.check_reference_types() {
            return;
        }

        let path = self.path(field.name, index);
        let allowed = field.reference_targets;

        let literal_type = match reference.literal() {
            Some(literal) => match literal_resource_type(literal) {
                Ok(found) => found,
                Err(reason) => {
                    self.report(ValidationError::InvalidReference {
                        field: path,
                        value: literal.to_owned(),
                        reason,
                    });
                    return;
                }
            },
            None => None,
        };

        if let Some(found) = literal_type {
            self.check_target(&path, found, allowed, reference.literal().unwrap_or(found));
        }

        if let Some(declared) = reference.type_.as_ref().map(|t| t.as_str()) {
            self.check_target(&path, declared, allowed, declared);

            if let Some(found) = literal_type {
                if found != declared {
                    self.report(ValidationError::InvalidReference {
                        field: path,
                        value: reference.literal().unwrap_or_default().to_owned(),
                        reason: format!("resource type does not match Reference.type '{declared}'"),
                    });
                }
            }
        }
    }

    fn check_target(&mut self, path: &str, resource_type: &str, allowed: &[&str], value: &str) {
        if !registry::is_resource_type(resource_type) {
            self.report(ValidationError::InvalidReference {
                field: path.to_owned(),
                value: value.to_owned(),
                reason: format!("'{resource_type}' is not a valid resource type name"),
            });
        } else if !allowed.contains(&resource_type) {
            self.report(ValidationError::ReferenceType {
                field: path.to_owned(),
                actual: resource_type.to_owned(),
                allowed: allowed.iter().map(|t| (*t).to_owned()).collect(),
            });
        }
    }
}

/// Resource type named by a literal reference.
///
/// Returns `Ok(None)` for local (`#id`) and absolute (scheme-prefixed) references, which are not
/// type-checked. Relative references must be `Type/id`, `Type/id/_history/vid` or a conditional
/// `Type?query`.
pub fn literal_resource_type(literal: &str) -> Result<Option<&str>, String> {
    if literal.starts_with('#') || has_scheme(literal) {
        return Ok(None);
    }

    if let Some((resource_type, _query)) = literal.split_once('?') {
        if is_type_name(resource_type) {
            return Ok(Some(resource_type));
        }
        return Err("resource type not found in conditional reference".to_owned());
    }

    let segments: Vec<&str> = literal.split('/').collect();
    let well_formed = match segments.as_slice() {
        [resource_type, id] => is_type_name(resource_type) && vpr_types::Id::new(id).is_ok(),
        [resource_type, id, "_history", version] => {
            is_type_name(resource_type)
                && vpr_types::Id::new(id).is_ok()
                && vpr_types::Id::new(version).is_ok()
        }
        _ => false,
    };

    if well_formed {
        Ok(Some(segments[0]))
    } else {
        Err("resource type not found in reference value".to_owned())
    }
}

/// A non-empty prefix before the first `:` and a non-empty value after it (`http:`, `urn:`).
///
/// Any such literal counts as absolute, including conditional references whose query holds a
/// URL.
fn has_scheme(literal: &str) -> bool {
    matches!(literal.find(':'), Some(i) if i > 0 && literal.len() > i + 1)
}

fn is_type_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpr_types::Uri;

    static OWNER: FieldDescriptor =
        FieldDescriptor::optional("owner", "Reference").targets(&["Organization"]);
    static STATUS: FieldDescriptor = FieldDescriptor::required("status", "code");

    fn reference(literal: &str) -> Reference {
        Reference::to(literal).expect("reference")
    }

    fn check(reference: &Reference) -> Vec<ValidationError> {
        let mut v = Validator::new(ModelConfig::default());
        v.check_reference(&OWNER, Some(reference));
        v.into_errors()
    }

    #[test]
    fn literal_types_are_parsed() {
        assert_eq!(literal_resource_type("Organization/1"), Ok(Some("Organization")));
        assert_eq!(
            literal_resource_type("Patient/p1/_history/2"),
            Ok(Some("Patient"))
        );
        assert_eq!(
            literal_resource_type("Patient?identifier=123"),
            Ok(Some("Patient"))
        );
        assert_eq!(literal_resource_type("#contained-1"), Ok(None));
        assert_eq!(
            literal_resource_type("http://example.org/fhir/Patient/1"),
            Ok(None)
        );
        assert_eq!(literal_resource_type("urn:uuid:1234"), Ok(None));
        assert!(literal_resource_type(":x").is_err());
        assert!(literal_resource_type("Patient/1:").is_err());
        assert!(literal_resource_type("Patient").is_err());
        assert!(literal_resource_type("patient/1").is_err());
        assert!(literal_resource_type("Patient/bad id").is_err());
    }

    #[test]
    fn any_colon_with_text_on_both_sides_skips_type_checks() {
        assert_eq!(
            literal_resource_type("Patient?identifier=http://x|1"),
            Ok(None)
        );
        assert_eq!(literal_resource_type("Patient/1:2"), Ok(None));
        assert!(check(&reference("Patient/1:2")).is_empty());
    }

    #[test]
    fn r4b_type_outside_allowed_set_is_a_reference_type_error() {
        assert_eq!(
            check(&reference("PackagedProductDefinition/p1")),
            vec![ValidationError::ReferenceType {
                field: "owner".into(),
                actual: "PackagedProductDefinition".into(),
                allowed: vec!["Organization".into()],
            }]
        );
    }

    #[test]
    fn allowed_reference_passes() {
        assert!(check(&reference("Organization/acme")).is_empty());
        assert!(check(&reference("#org1")).is_empty());
    }

    #[test]
    fn disallowed_reference_reports_field_type_and_allowed_set() {
        let errors = check(&reference("Patient/p1"));
        assert_eq!(
            errors,
            vec![ValidationError::ReferenceType {
                field: "owner".into(),
                actual: "Patient".into(),
                allowed: vec!["Organization".into()],
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "resource type 'Patient' for element 'owner' must be one of: Organization"
        );
    }

    #[test]
    fn unknown_resource_type_is_invalid_reference() {
        let errors = check(&reference("Spaceship/1"));
        assert!(matches!(
            &errors[..],
            [ValidationError::InvalidReference { reason, .. }] if reason.contains("not a valid resource type")
        ));
    }

    #[test]
    fn declared_type_must_be_allowed_and_match_literal() {
        let declared_only = Reference::default().with_type(Uri::new("Patient").expect("uri"));
        assert!(matches!(
            &check(&declared_only)[..],
            [ValidationError::ReferenceType { actual, .. }] if actual == "Patient"
        ));

        let mismatch = reference("Organization/acme").with_type(Uri::new("Patient").expect("uri"));
        let errors = check(&mismatch);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[1], ValidationError::InvalidReference { .. }));
    }

    #[test]
    fn reference_checks_can_be_switched_off() {
        let mut v = Validator::new(ModelConfig::default().with_check_reference_types(false));
        v.check_reference(&OWNER, Some(&reference("Patient/p1")));
        assert!(v.errors().is_empty());
    }

    #[test]
    fn errors_accumulate_without_short_circuit() {
        let mut v = Validator::new(ModelConfig::default());
        v.require::<String>(&STATUS, None);
        v.check_references(&OWNER, &[reference("Patient/1"), reference("Organization/2")]);
        v.check_reference(&OWNER, Some(&reference("Group/3")));

        let fields: Vec<String> = v.errors().iter().map(|e| e.field().to_owned()).collect();
        assert_eq!(fields, vec!["status", "owner[0]", "owner"]);
    }

    #[test]
    fn nested_validation_prefixes_paths() {
        struct Inner;
        impl Validate for Inner {
            fn validate_fields(&self, validator: &mut Validator) {
                validator.require::<String>(&STATUS, None);
            }
        }

        let mut v = Validator::new(ModelConfig::default());
        v.nested_list("coverage", &[Inner, Inner]);
        let fields: Vec<&str> = v.errors().iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec!["coverage[0].status", "coverage[1].status"]);
    }

    #[test]
    fn errors_display_lists_every_error() {
        let errors = ValidationErrors::new(
            "Account",
            vec![
                ValidationError::RequiredField {
                    field: "status".into(),
                },
                ValidationError::Structural {
                    field: "subject".into(),
                    index: 1,
                },
            ],
        );
        let text = errors.to_string();
        assert!(text.starts_with("Account failed validation with 2 error(s)"));
        assert!(text.contains("missing required element 'status'"));
        assert!(text.contains("(index 1)"));
    }
}
