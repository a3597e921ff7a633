//! Static field metadata for record types.
//!
//! Every record type publishes a [`RecordDescriptor`]: the table of base fields it embeds
//! followed by its own fields, both in declaration order. The tables are constant data emitted
//! next to each record type. They drive validation (required fields, reference
//! targets) and document the order in which [`crate::visitor`] traverses a record.

use std::fmt;

/// How many values a field may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `0..1`
    Optional,
    /// `1..1`
    Required,
    /// `0..*`
    Repeated,
}

impl Cardinality {
    pub const fn is_required(self) -> bool {
        matches!(self, Cardinality::Required)
    }

    pub const fn is_repeated(self) -> bool {
        matches!(self, Cardinality::Repeated)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Cardinality::Optional => "0..1",
            Cardinality::Required => "1..1",
            Cardinality::Repeated => "0..*",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding strength of a coded field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

impl BindingStrength {
    pub const fn as_str(self) -> &'static str {
        match self {
            BindingStrength::Required => "required",
            BindingStrength::Extensible => "extensible",
            BindingStrength::Preferred => "preferred",
            BindingStrength::Example => "example",
        }
    }
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value-set binding of a coded field. Only the shape is recorded here; membership is
/// resolved by terminology services outside this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: &'static str,
    pub strength: BindingStrength,
    pub value_set: &'static str,
}

/// Metadata for one field of a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Element name as it appears on the wire.
    pub name: &'static str,
    /// FHIR type name of the field's values.
    pub type_name: &'static str,
    pub cardinality: Cardinality,
    /// Part of the summary view of the resource.
    pub summary: bool,
    /// Allowed target resource types; empty unless the field holds references.
    pub reference_targets: &'static [&'static str],
    pub binding: Option<Binding>,
}

impl FieldDescriptor {
    const fn new(name: &'static str, type_name: &'static str, cardinality: Cardinality) -> Self {
        Self {
            name,
            type_name,
            cardinality,
            summary: false,
            reference_targets: &[],
            binding: None,
        }
    }

    pub const fn optional(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, type_name, Cardinality::Optional)
    }

    pub const fn required(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, type_name, Cardinality::Required)
    }

    pub const fn repeated(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, type_name, Cardinality::Repeated)
    }

    pub const fn summary(self) -> Self {
        Self {
            summary: true,
            ..self
        }
    }

    pub const fn targets(self, reference_targets: &'static [&'static str]) -> Self {
        Self {
            reference_targets,
            ..self
        }
    }

    pub const fn binding(
        self,
        name: &'static str,
        strength: BindingStrength,
        value_set: &'static str,
    ) -> Self {
        Self {
            binding: Some(Binding {
                name,
                strength,
                value_set,
            }),
            ..self
        }
    }

    pub fn is_reference(&self) -> bool {
        !self.reference_targets.is_empty()
    }

    pub fn allows_target(&self, resource_type: &str) -> bool {
        self.reference_targets.contains(&resource_type)
    }
}

/// Whether a record type is a top-level resource or an element nested inside one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Resource,
    BackboneElement,
}

/// Field tables for one record type.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
    /// Type name, or `Parent.field` path for backbone elements.
    pub type_name: &'static str,
    pub kind: RecordKind,
    /// Fields embedded from the shared base, visited first.
    pub base: &'static [FieldDescriptor],
    /// Type-specific fields in schema declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl RecordDescriptor {
    /// Base fields followed by own fields, in traversal order.
    pub fn all_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        let (base, fields) = (self.base, self.fields);
        base.iter().chain(fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.all_fields().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.all_fields().filter(|f| f.cardinality.is_required())
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.all_fields().map(|f| f.name).collect()
    }
}

/// Fields every resource embeds through [`crate::base::ResourceBase`].
pub const RESOURCE_BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::optional("id", "id").summary(),
    FieldDescriptor::optional("meta", "Meta").summary(),
    FieldDescriptor::optional("implicitRules", "uri").summary(),
    FieldDescriptor::optional("language", "code").binding(
        "Language",
        BindingStrength::Preferred,
        "http://hl7.org/fhir/ValueSet/languages",
    ),
    FieldDescriptor::optional("text", "Narrative"),
    FieldDescriptor::repeated("contained", "Resource"),
    FieldDescriptor::repeated("extension", "Extension"),
    FieldDescriptor::repeated("modifierExtension", "Extension"),
];

/// Fields every backbone element embeds through [`crate::base::BackboneBase`].
pub const BACKBONE_BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::optional("id", "string"),
    FieldDescriptor::repeated("extension", "Extension"),
    FieldDescriptor::repeated("modifierExtension", "Extension").summary(),
];

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: RecordDescriptor = RecordDescriptor {
        type_name: "Sample",
        kind: RecordKind::Resource,
        base: RESOURCE_BASE_FIELDS,
        fields: &[
            FieldDescriptor::required("status", "code"),
            FieldDescriptor::optional("owner", "Reference").targets(&["Organization"]),
        ],
    };

    #[test]
    fn all_fields_lists_base_before_own_fields() {
        assert_eq!(
            SAMPLE.field_names(),
            vec![
                "id",
                "meta",
                "implicitRules",
                "language",
                "text",
                "contained",
                "extension",
                "modifierExtension",
                "status",
                "owner",
            ]
        );
    }

    #[test]
    fn field_lookup_covers_base_and_own_fields() {
        assert_eq!(SAMPLE.field("language").map(|f| f.type_name), Some("code"));
        let owner = SAMPLE.field("owner").expect("owner declared");
        assert!(owner.is_reference());
        assert!(owner.allows_target("Organization"));
        assert!(!owner.allows_target("Patient"));
        assert!(SAMPLE.field("missing").is_none());
    }

    #[test]
    fn required_fields_filters_by_cardinality() {
        let required: Vec<_> = SAMPLE.required_fields().map(|f| f.name).collect();
        assert_eq!(required, vec!["status"]);
    }

    #[test]
    fn builder_style_constructors_compose() {
        let field = FieldDescriptor::optional("language", "code")
            .summary()
            .binding("Language", BindingStrength::Preferred, "urn:vs");
        assert!(field.summary);
        assert_eq!(field.cardinality.as_str(), "0..1");
        let binding = field.binding.expect("binding");
        assert_eq!(binding.strength.to_string(), "preferred");
        assert_eq!(binding.value_set, "urn:vs");
    }
}
