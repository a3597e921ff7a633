//! FHIR datatypes used by the modelled resources.
//!
//! These are small value types compared field by field. They serialise directly with serde
//! (field names match the FHIR element names) and are traversed through [`Visitable`] in FHIR
//! declaration order. Element-level `id` and `extension` are not modelled on datatypes.

use crate::visitor::{accept_field, accept_list, dispatch, NodeKind, Visitable, Visitor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use vpr_types::{Code, Id, NonEmptyText, Uri};

macro_rules! element_node {
    ($type_name:literal) => {
        fn type_name(&self) -> &'static str {
            $type_name
        }

        fn kind(&self) -> NodeKind {
            NodeKind::Element
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    };
}

// ============================================================================
// Coding / CodeableConcept
// ============================================================================

/// A code defined by a terminology system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<Uri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<NonEmptyText>,
}

impl Coding {
    pub fn new(system: Uri, code: Code) -> Self {
        Self {
            system: Some(system),
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: NonEmptyText) -> Self {
        self.display = Some(display);
        self
    }
}

impl Visitable for Coding {
    element_node!("Coding");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.system, "system", v);
            accept_field(&self.version, "version", v);
            accept_field(&self.code, "code", v);
            accept_field(&self.display, "display", v);
        });
    }
}

/// A concept expressed as codings and/or text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<NonEmptyText>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            text: None,
        }
    }

    pub fn from_text(text: NonEmptyText) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text),
        }
    }
}

impl Visitable for CodeableConcept {
    element_node!("CodeableConcept");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_list(&self.coding, "coding", "Coding", v);
            accept_field(&self.text, "text", v);
        });
    }
}

// ============================================================================
// Identifier / Period
// ============================================================================

/// A business identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<Uri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<NonEmptyText>,
}

impl Identifier {
    pub fn new(system: Uri, value: NonEmptyText) -> Self {
        Self {
            system: Some(system),
            value: Some(value),
        }
    }
}

impl Visitable for Identifier {
    element_node!("Identifier");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.system, "system", v);
            accept_field(&self.value, "value", v);
        });
    }
}

/// A time range; either bound may be open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Visitable for Period {
    element_node!("Period");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.start, "start", v);
            accept_field(&self.end, "end", v);
        });
    }
}

// ============================================================================
// Reference
// ============================================================================

/// A reference from one resource to another.
///
/// The target type is checked against the owning field's allowed targets by
/// [`crate::validation::Validator`], not by the type system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// Literal reference: `Type/id`, `Type?query`, `#local` or an absolute URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<NonEmptyText>,
    /// Declared target type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Uri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<NonEmptyText>,
}

impl Reference {
    /// Reference by literal value, e.g. `Organization/acme`.
    ///
    /// # Errors
    ///
    /// Returns [`vpr_types::TextError`] if `literal` is blank.
    pub fn to(literal: impl AsRef<str>) -> Result<Self, vpr_types::TextError> {
        Ok(Self {
            reference: Some(NonEmptyText::new(literal)?),
            ..Self::default()
        })
    }

    pub fn with_type(mut self, type_: Uri) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn with_display(mut self, display: NonEmptyText) -> Self {
        self.display = Some(display);
        self
    }

    pub fn literal(&self) -> Option<&str> {
        self.reference.as_ref().map(NonEmptyText::as_str)
    }
}

impl Visitable for Reference {
    element_node!("Reference");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.reference, "reference", v);
            accept_field(&self.type_, "type", v);
            accept_field(&self.identifier, "identifier", v);
            accept_field(&self.display, "display", v);
        });
    }
}

// ============================================================================
// Meta / Narrative
// ============================================================================

/// Resource metadata maintained by the infrastructure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Uri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<Uri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Coding>,
}

impl Visitable for Meta {
    element_node!("Meta");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.version_id, "versionId", v);
            accept_field(&self.last_updated, "lastUpdated", v);
            accept_field(&self.source, "source", v);
            accept_list(&self.profile, "profile", "canonical", v);
            accept_list(&self.tag, "tag", "Coding", v);
        });
    }
}

/// Status of a narrative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeStatus {
    Generated,
    Extensions,
    Additional,
    Empty,
}

impl NarrativeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NarrativeStatus::Generated => "generated",
            NarrativeStatus::Extensions => "extensions",
            NarrativeStatus::Additional => "additional",
            NarrativeStatus::Empty => "empty",
        }
    }
}

impl Visitable for NarrativeStatus {
    fn type_name(&self) -> &'static str {
        "code"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Primitive
    }

    fn value(&self) -> Option<crate::visitor::Value<'_>> {
        Some(crate::visitor::Value::String(self.as_str()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |_| {});
    }
}

/// Human-readable summary of a resource. Stored verbatim; never rendered here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Narrative {
    pub status: NarrativeStatus,
    pub div: NonEmptyText,
}

impl Visitable for Narrative {
    element_node!("Narrative");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            self.status.accept("status", None, v);
            self.div.accept("div", None, v);
        });
    }
}

// ============================================================================
// Extension
// ============================================================================

/// Value of an extension (`value[x]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExtensionValue {
    String(NonEmptyText),
    Boolean(bool),
    Integer(i64),
    Code(Code),
    Uri(Uri),
}

impl ExtensionValue {
    /// Type-suffixed element name, e.g. `valueString`.
    pub fn element_name(&self) -> &'static str {
        match self {
            ExtensionValue::String(_) => "valueString",
            ExtensionValue::Boolean(_) => "valueBoolean",
            ExtensionValue::Integer(_) => "valueInteger",
            ExtensionValue::Code(_) => "valueCode",
            ExtensionValue::Uri(_) => "valueUri",
        }
    }

    fn as_visitable(&self) -> &dyn Visitable {
        match self {
            ExtensionValue::String(v) => v,
            ExtensionValue::Boolean(v) => v,
            ExtensionValue::Integer(v) => v,
            ExtensionValue::Code(v) => v,
            ExtensionValue::Uri(v) => v,
        }
    }
}

/// Additional content defined by an implementation, identified by `url`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ExtensionWire", into = "ExtensionWire")]
pub struct Extension {
    pub url: Uri,
    pub value: Option<ExtensionValue>,
}

impl Extension {
    pub fn new(url: Uri, value: ExtensionValue) -> Self {
        Self {
            url,
            value: Some(value),
        }
    }
}

impl Visitable for Extension {
    element_node!("Extension");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            self.url.accept("url", None, v);
            if let Some(value) = &self.value {
                value.as_visitable().accept(value.element_name(), None, v);
            }
        });
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ExtensionWire {
    url: Uri,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_integer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_uri: Option<Uri>,
}

impl TryFrom<ExtensionWire> for Extension {
    type Error = String;

    fn try_from(wire: ExtensionWire) -> Result<Self, Self::Error> {
        let candidates = [
            wire.value_string.map(ExtensionValue::String),
            wire.value_boolean.map(ExtensionValue::Boolean),
            wire.value_integer.map(ExtensionValue::Integer),
            wire.value_code.map(ExtensionValue::Code),
            wire.value_uri.map(ExtensionValue::Uri),
        ];
        let mut values = candidates.into_iter().flatten();
        let value = values.next();
        if values.next().is_some() {
            return Err(format!(
                "extension '{}' has more than one value[x] element",
                wire.url
            ));
        }

        Ok(Self {
            url: wire.url,
            value,
        })
    }
}

impl From<Extension> for ExtensionWire {
    fn from(ext: Extension) -> Self {
        let mut wire = ExtensionWire {
            url: ext.url,
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_code: None,
            value_uri: None,
        };
        match ext.value {
            Some(ExtensionValue::String(v)) => wire.value_string = Some(v),
            Some(ExtensionValue::Boolean(v)) => wire.value_boolean = Some(v),
            Some(ExtensionValue::Integer(v)) => wire.value_integer = Some(v),
            Some(ExtensionValue::Code(v)) => wire.value_code = Some(v),
            Some(ExtensionValue::Uri(v)) => wire.value_uri = Some(v),
            None => {}
        }
        wire
    }
}

// ============================================================================
// HumanName
// ============================================================================

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    Usual,
    Official,
    Temp,
    Nickname,
    Anonymous,
    Old,
    Maiden,
}

impl NameUse {
    pub fn as_str(self) -> &'static str {
        match self {
            NameUse::Usual => "usual",
            NameUse::Official => "official",
            NameUse::Temp => "temp",
            NameUse::Nickname => "nickname",
            NameUse::Anonymous => "anonymous",
            NameUse::Old => "old",
            NameUse::Maiden => "maiden",
        }
    }
}

impl Visitable for NameUse {
    fn type_name(&self) -> &'static str {
        "code"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Primitive
    }

    fn value(&self) -> Option<crate::visitor::Value<'_>> {
        Some(crate::visitor::Value::String(self.as_str()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |_| {});
    }
}

/// A person's name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<NameUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<NonEmptyText>,
}

impl Visitable for HumanName {
    element_node!("HumanName");

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            accept_field(&self.use_, "use", v);
            accept_field(&self.family, "family", v);
            accept_list(&self.given, "given", "string", v);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::collect_paths;

    fn uri(s: &str) -> Uri {
        Uri::new(s).expect("uri")
    }

    #[test]
    fn reference_visits_fields_in_declared_order() {
        let reference = Reference::to("Organization/acme")
            .expect("reference")
            .with_type(uri("Organization"))
            .with_display(NonEmptyText::new("Acme").expect("text"));

        assert_eq!(
            collect_paths(&reference),
            vec![
                "Reference",
                "Reference.reference",
                "Reference.type",
                "Reference.display"
            ]
        );
    }

    #[test]
    fn extension_visits_typed_value_name() {
        let ext = Extension::new(uri("http://example.org/ext"), ExtensionValue::Boolean(true));
        assert_eq!(
            collect_paths(&ext),
            vec!["Extension", "Extension.url", "Extension.valueBoolean"]
        );
    }

    #[test]
    fn extension_round_trips_through_wire_form() {
        let ext = Extension::new(
            uri("http://example.org/ext"),
            ExtensionValue::Code(Code::new("on hold").expect("code")),
        );
        let yaml = serde_yaml::to_string(&ext).expect("serialise");
        assert!(yaml.contains("valueCode: on hold"));
        let back: Extension = serde_yaml::from_str(&yaml).expect("deserialise");
        assert_eq!(back, ext);
    }

    #[test]
    fn extension_rejects_two_values() {
        let input = "url: http://example.org/ext\nvalueBoolean: true\nvalueInteger: 3\n";
        let err = serde_yaml::from_str::<Extension>(input).expect_err("should reject");
        assert!(err.to_string().contains("more than one value"));
    }

    #[test]
    fn reference_type_uses_wire_name() {
        let input = "reference: Patient/p1\ntype: Patient\n";
        let reference: Reference = serde_yaml::from_str(input).expect("deserialise");
        assert_eq!(reference.literal(), Some("Patient/p1"));
        assert_eq!(reference.type_.as_ref().map(Uri::as_str), Some("Patient"));
    }

    #[test]
    fn structurally_equal_values_compare_equal() {
        let a = CodeableConcept::from_coding(Coding::new(
            uri("http://terminology.hl7.org/CodeSystem/v3-ActCode"),
            Code::new("PBILLACCT").expect("code"),
        ));
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, CodeableConcept::default());
    }
}
