//! YAML wire boundary for modelled resources.
//!
//! Rendering is visitor-driven: [`YamlWriter`] builds the document while walking a record, so
//! key order is always the traversal order. Parsing is strict. Each resource type has a wire
//! model with `#[serde(deny_unknown_fields)]`, and mismatches are reported with the path to the
//! failing field (via `serde_path_to_error`).
//!
//! Records are assembled from wire input with validation disabled. [`parse`] then runs a single
//! consolidated validation pass when the configuration asks for it.

use crate::base::ResourceBaseWire;
use crate::config::ModelConfig;
use crate::descriptor::RESOURCE_BASE_FIELDS;
use crate::registry;
use crate::resource::AnyResource;
use crate::visitor::{walk, NodeKind, Value, Visitable, Visitor};
use crate::{FhirError, FhirResult};
use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value as YamlValue};
use std::fs;
use std::path::Path;

const RESOURCE_TYPE_KEY: &str = "resourceType";

// ============================================================================
// Rendering
// ============================================================================

/// Builds a YAML value from visitor events.
///
/// Each complex node opens a mapping frame in `visit_start` and closes it in `visit_end`,
/// inserting the finished mapping into its parent. Primitives are inserted directly.
#[derive(Debug, Default)]
pub struct YamlWriter {
    stack: Vec<Mapping>,
    root: Option<YamlValue>,
}

impl YamlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document; `None` until a root node has been fully visited.
    pub fn into_value(self) -> Option<YamlValue> {
        self.root
    }

    fn insert(&mut self, name: &str, index: Option<usize>, value: YamlValue) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(value);
            return;
        };

        let key = YamlValue::String(name.to_owned());
        match index {
            None => {
                parent.insert(key, value);
            }
            Some(_) => {
                let entry = parent
                    .entry(key)
                    .or_insert_with(|| YamlValue::Sequence(Vec::new()));
                if let YamlValue::Sequence(items) = entry {
                    items.push(value);
                }
            }
        }
    }
}

fn primitive_value(value: Value<'_>) -> YamlValue {
    match value {
        Value::String(s) => YamlValue::String(s.to_owned()),
        Value::Boolean(b) => YamlValue::Bool(b),
        Value::Integer(i) => YamlValue::Number(i.into()),
        Value::Date(d) => YamlValue::String(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => YamlValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

impl Visitor for YamlWriter {
    fn visit_start(&mut self, name: &str, index: Option<usize>, node: &dyn Visitable) {
        match node.kind() {
            NodeKind::Primitive => {
                if let Some(value) = node.value() {
                    self.insert(name, index, primitive_value(value));
                }
            }
            NodeKind::Resource => {
                let mut frame = Mapping::new();
                frame.insert(
                    YamlValue::String(RESOURCE_TYPE_KEY.to_owned()),
                    YamlValue::String(node.type_name().to_owned()),
                );
                self.stack.push(frame);
            }
            NodeKind::Element => self.stack.push(Mapping::new()),
        }
    }

    fn visit_end(&mut self, name: &str, index: Option<usize>, node: &dyn Visitable) {
        if node.kind() == NodeKind::Primitive {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            self.insert(name, index, YamlValue::Mapping(frame));
        }
    }
}

/// Render any record, element or datatype as a YAML value.
pub fn to_value(node: &dyn Visitable) -> YamlValue {
    let mut writer = YamlWriter::new();
    walk(node, &mut writer);
    writer.into_value().unwrap_or(YamlValue::Null)
}

/// Render any record, element or datatype as YAML text, keys in traversal order.
///
/// # Errors
///
/// Returns [`FhirError::InvalidYaml`] if serialisation fails.
pub fn render(node: &dyn Visitable) -> FhirResult<String> {
    Ok(serde_yaml::to_string(&to_value(node))?)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a YAML resource document.
///
/// The `resourceType` key selects the wire model. The record is assembled without validation;
/// if `config.validating()` is set, one validation pass then runs over the whole record,
/// including contained resources.
///
/// # Errors
///
/// Returns [`FhirError`] if:
/// - the text is not valid YAML ([`FhirError::InvalidYaml`]),
/// - `resourceType` is missing or names a type that is not modelled ([`FhirError::InvalidInput`]),
/// - any key is unknown or any value has the wrong shape ([`FhirError::Translation`]),
/// - validation fails ([`FhirError::Validation`]).
pub fn parse(yaml_text: &str, config: ModelConfig) -> FhirResult<AnyResource> {
    let value: YamlValue = serde_yaml::from_str(yaml_text)?;
    let resource = parse_value(value)?;

    if config.validating() {
        if let Err(errors) = resource.validate(config) {
            tracing::debug!(
                resource_type = resource.type_name(),
                errors = errors.len(),
                "parsed resource failed validation"
            );
            return Err(errors.into());
        }
    }

    tracing::debug!(resource_type = resource.type_name(), "parsed resource");
    Ok(resource)
}

/// Read and [`parse`] a YAML resource file.
///
/// # Errors
///
/// Returns [`FhirError::Io`] if the file cannot be read, otherwise as [`parse`].
pub fn parse_file(path: &Path, config: ModelConfig) -> FhirResult<AnyResource> {
    let yaml_text = fs::read_to_string(path)?;
    parse(&yaml_text, config)
}

/// Assemble a resource from a YAML value without running the validator.
pub(crate) fn parse_value(value: YamlValue) -> FhirResult<AnyResource> {
    let YamlValue::Mapping(mut map) = value else {
        return Err(FhirError::InvalidInput(
            "expected a YAML mapping for a resource".into(),
        ));
    };

    let resource_type = match map.remove(RESOURCE_TYPE_KEY) {
        Some(YamlValue::String(s)) => s,
        Some(_) => {
            return Err(FhirError::InvalidInput(
                "resourceType must be a string".into(),
            ))
        }
        None => return Err(FhirError::InvalidInput("missing resourceType".into())),
    };

    let (base_map, own_map) = split_base_fields(map);
    let base = deserialize_at::<ResourceBaseWire>(&resource_type, base_map)?.into_builder()?;

    let resource: AnyResource = match resource_type.as_str() {
        "Account" => deserialize_at::<crate::account::AccountWire>(&resource_type, own_map)?
            .into_record(base)?
            .into(),
        "Organization" => {
            deserialize_at::<crate::organization::OrganizationWire>(&resource_type, own_map)?
                .into_record(base)?
                .into()
        }
        "Patient" => deserialize_at::<crate::patient::PatientWire>(&resource_type, own_map)?
            .into_record(base)?
            .into(),
        other if registry::is_resource_type(other) => {
            tracing::warn!(resource_type = other, "resource type is not modelled");
            return Err(FhirError::InvalidInput(format!(
                "resourceType '{other}' is not supported by this model"
            )));
        }
        other => {
            return Err(FhirError::InvalidInput(format!(
                "unknown resourceType '{other}'"
            )))
        }
    };

    Ok(resource)
}

/// Separate the keys every resource shares from the type-specific ones.
fn split_base_fields(map: Mapping) -> (Mapping, Mapping) {
    let mut base = Mapping::new();
    let mut own = Mapping::new();
    for (key, value) in map {
        let is_base = key
            .as_str()
            .is_some_and(|k| RESOURCE_BASE_FIELDS.iter().any(|f| f.name == k));
        if is_base {
            base.insert(key, value);
        } else {
            own.insert(key, value);
        }
    }
    (base, own)
}

/// Deserialize a wire model, naming the failing path on mismatch.
fn deserialize_at<T: DeserializeOwned>(type_name: &str, map: Mapping) -> FhirResult<T> {
    match serde_path_to_error::deserialize::<_, T>(YamlValue::Mapping(map)) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(FhirError::Translation(format!(
                "{type_name} schema mismatch at {path}: {source}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountCoverage, AccountStatus};
    use crate::base::{BackboneBuilder, Record, ResourceBuilder};
    use crate::datatypes::{
        Coding, CodeableConcept, Extension, ExtensionValue, Identifier, Meta, Narrative,
        NarrativeStatus, Period, Reference,
    };
    use crate::organization::Organization;
    use crate::validation::ValidationError;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::num::NonZeroU32;
    use vpr_types::{Code, Id, NonEmptyText, Uri};

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("text")
    }

    fn uri(s: &str) -> Uri {
        Uri::new(s).expect("uri")
    }

    fn reference(s: &str) -> Reference {
        Reference::to(s).expect("reference")
    }

    fn account() -> Account {
        let updated = Utc
            .with_ymd_and_hms(2026, 1, 23, 13, 58, 4)
            .single()
            .expect("instant");

        Account::builder()
            .id(Id::new("acct-1").expect("id"))
            .meta(Meta {
                last_updated: Some(updated),
                ..Meta::default()
            })
            .text(Narrative {
                status: NarrativeStatus::Generated,
                div: text("<div xmlns=\"http://www.w3.org/1999/xhtml\">Account</div>"),
            })
            .add_contained([AnyResource::from(
                Organization::builder()
                    .id(Id::new("org1").expect("id"))
                    .name(text("Acme"))
                    .build()
                    .expect("org"),
            )])
            .add_extension([Extension::new(
                uri("http://example.org/fhir/ext/legacy"),
                ExtensionValue::Boolean(true),
            )])
            .add_identifier([Identifier::new(uri("urn:oid:1.2.36.1"), text("ACC-001"))])
            .status(AccountStatus::OnHold)
            .type_(CodeableConcept::from_coding(
                Coding::new(
                    uri("http://terminology.hl7.org/CodeSystem/v3-ActCode"),
                    Code::new("PBILLACCT").expect("code"),
                )
                .with_display(text("patient billing account")),
            ))
            .add_subject([reference("Patient/p1")])
            .service_period(Period {
                start: Some(updated),
                end: None,
            })
            .add_coverage([AccountCoverage::builder()
                .coverage(reference("Coverage/c1"))
                .priority(NonZeroU32::new(1))
                .build()
                .expect("coverage")])
            .owner(reference("#org1"))
            .build()
            .expect("account")
    }

    #[test]
    fn render_starts_with_resource_type_and_follows_traversal_order() {
        let yaml = render(&account()).expect("render");
        let keys: Vec<&str> = yaml
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            vec![
                "resourceType",
                "id",
                "meta",
                "text",
                "contained",
                "extension",
                "identifier",
                "status",
                "type",
                "subject",
                "servicePeriod",
                "coverage",
                "owner",
            ]
        );
        assert!(yaml.contains("status: on-hold"));
        assert!(yaml.contains("2026-01-23T13:58:04Z"));
        assert!(yaml.contains("valueBoolean: true"));
    }

    #[test]
    fn parse_of_render_round_trips() {
        let original = account();
        let yaml = render(&original).expect("render");
        let parsed = parse(&yaml, ModelConfig::default()).expect("parse");
        assert_eq!(parsed, AnyResource::from(original));
    }

    #[test]
    fn renders_datatypes_without_resource_type() {
        let yaml = render(&reference("Patient/p1").with_display(text("Sarah"))).expect("render");
        assert_eq!(yaml, "reference: Patient/p1\ndisplay: Sarah\n");
    }

    #[test]
    fn parses_patient_with_dates_and_names() {
        let input = r#"resourceType: Patient
id: 90a8d1ea318041d9adb070a834d4e0f6
name:
  - use: official
    family: Williams
    given:
      - Sarah
      - Jane
  - use: nickname
    given:
      - Sally
birthDate: 1992-03-20
meta:
  lastUpdated: 2026-01-23T13:58:04.099304Z
"#;

        let resource = parse(input, ModelConfig::default()).expect("should parse patient");
        let patient = resource.as_patient().expect("patient");
        assert_eq!(patient.name().len(), 2);
        assert_eq!(
            patient.birth_date(),
            Some(NaiveDate::from_ymd_opt(1992, 3, 20).expect("date"))
        );
        let updated = patient
            .base()
            .meta()
            .and_then(|m| m.last_updated)
            .expect("lastUpdated");
        assert_eq!(updated.to_rfc3339(), "2026-01-23T13:58:04.099304+00:00");

        let rendered = render(&resource).expect("render");
        assert!(rendered.starts_with("resourceType: Patient\n"));
        assert_eq!(parse(&rendered, ModelConfig::default()).expect("reparse"), resource);
    }

    #[test]
    fn strict_parsing_rejects_unknown_keys() {
        let input = r#"resourceType: Patient
id: p1
unexpected_key: should_fail
"#;

        let err = parse(input, ModelConfig::default()).expect_err("should reject unknown key");
        match err {
            FhirError::Translation(msg) => {
                assert!(msg.starts_with("Patient schema mismatch"));
                assert!(msg.contains("unexpected_key"));
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn strict_parsing_names_the_failing_path() {
        let input = r#"resourceType: Patient
name:
  - family: Williams
    given: "not_an_array"
"#;

        let err = parse(input, ModelConfig::default()).expect_err("should reject wrong type");
        match err {
            FhirError::Translation(msg) => {
                assert!(msg.contains("name[0].given"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn base_field_errors_are_reported() {
        let input = "resourceType: Organization\nid: not an id\n";
        let err = parse(input, ModelConfig::default()).expect_err("bad id");
        assert!(matches!(err, FhirError::Translation(msg) if msg.contains("at id")));
    }

    #[test]
    fn rejects_missing_and_unknown_resource_types() {
        let err = parse("id: p1\n", ModelConfig::default()).expect_err("no resourceType");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("missing")));

        let err = parse("resourceType: NotPatient\n", ModelConfig::default())
            .expect_err("unknown type");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("NotPatient")));

        let err = parse("resourceType: Coverage\n", ModelConfig::default())
            .expect_err("unmodelled type");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("not supported")));

        let err = parse("- a\n- b\n", ModelConfig::default()).expect_err("not a mapping");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }

    #[test]
    fn validation_runs_once_after_assembly() {
        let input = r#"resourceType: Account
subject:
  - reference: Medication/m1
guarantor:
  - onHold: true
"#;

        let err = parse(input, ModelConfig::default()).expect_err("invalid account");
        let errors = match err {
            FhirError::Validation(errors) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        };
        let fields: Vec<&str> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec!["status", "subject[0]", "guarantor[0].party"]);

        let lenient = parse(input, ModelConfig::lenient()).expect("validation disabled");
        assert_eq!(lenient.type_name(), "Account");
    }

    #[test]
    fn contained_resources_are_parsed_and_checked() {
        let input = r##"resourceType: Patient
contained:
  - resourceType: Organization
    id: org1
    partOf:
      reference: Patient/p9
managingOrganization:
  reference: "#org1"
"##;

        let err = parse(input, ModelConfig::default()).expect_err("contained partOf is wrong");
        let errors = match err {
            FhirError::Validation(errors) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        };
        assert_eq!(
            errors.first().map(ValidationError::field),
            Some("contained[0].partOf")
        );

        let without_checks = ModelConfig::default().with_check_reference_types(false);
        let resource = parse(input, without_checks).expect("reference checks off");
        assert_eq!(resource.base().contained().len(), 1);
    }

    #[test]
    fn zero_priority_is_a_schema_mismatch() {
        let input = r#"resourceType: Account
status: active
coverage:
  - coverage:
      reference: Coverage/c1
    priority: 0
"#;

        let err = parse(input, ModelConfig::default()).expect_err("priority is a positiveInt");
        assert!(matches!(
            err,
            FhirError::Translation(msg) if msg.starts_with("Account schema mismatch at coverage[0].priority")
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = parse_file(
            Path::new("/nonexistent/fhir-model/account.yaml"),
            ModelConfig::default(),
        )
        .expect_err("missing file");
        assert!(matches!(err, FhirError::Io(_)));
    }

    #[test]
    fn contained_schema_errors_name_the_entry() {
        let input = r#"resourceType: Patient
contained:
  - resourceType: Organization
    nickname: Acme
"#;

        let err = parse(input, ModelConfig::default()).expect_err("bad contained");
        assert!(matches!(
            err,
            FhirError::Translation(msg) if msg.starts_with("contained[0]: Organization schema mismatch")
        ));
    }
}
