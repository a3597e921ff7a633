//! Organization resource: a formally or informally recognised grouping of people or
//! organisations formed to achieve some form of collective action.

use crate::base::{Record, ResourceBase, ResourceBaseBuilder, ResourceBuilder};
use crate::builder::{finish, HashCache, MissingEntries, Repeated};
use crate::datatypes::{CodeableConcept, Identifier, Reference};
use crate::descriptor::{
    BindingStrength, FieldDescriptor, RecordDescriptor, RecordKind, RESOURCE_BASE_FIELDS,
};
use crate::validation::{Validate, ValidationErrors, Validator};
use crate::visitor::{accept_field, accept_list, dispatch, NodeKind, Visitable, Visitor};
use serde::Deserialize;
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use vpr_types::NonEmptyText;

const IDENTIFIER: FieldDescriptor = FieldDescriptor::repeated("identifier", "Identifier").summary();
const ACTIVE: FieldDescriptor = FieldDescriptor::optional("active", "boolean").summary();
const TYPE: FieldDescriptor = FieldDescriptor::repeated("type", "CodeableConcept")
    .summary()
    .binding(
        "OrganizationType",
        BindingStrength::Example,
        "http://hl7.org/fhir/ValueSet/organization-type",
    );
const NAME: FieldDescriptor = FieldDescriptor::optional("name", "string").summary();
const ALIAS: FieldDescriptor = FieldDescriptor::repeated("alias", "string");
const PART_OF: FieldDescriptor = FieldDescriptor::optional("partOf", "Reference")
    .summary()
    .targets(&["Organization"]);

/// A grouping of people or organisations with a common purpose.
#[derive(Clone, Debug)]
pub struct Organization {
    base: ResourceBase,
    identifier: Vec<Identifier>,
    active: Option<bool>,
    type_: Vec<CodeableConcept>,
    name: Option<NonEmptyText>,
    alias: Vec<NonEmptyText>,
    part_of: Option<Reference>,
    missing: MissingEntries,
    hash: HashCache,
}

impl Organization {
    pub fn base(&self) -> &ResourceBase {
        &self.base
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    /// Whether the organisation's record is still in active use.
    pub fn active(&self) -> Option<bool> {
        self.active
    }

    pub fn type_(&self) -> &[CodeableConcept] {
        &self.type_
    }

    pub fn name(&self) -> Option<&NonEmptyText> {
        self.name.as_ref()
    }

    /// Other names the organisation is or was known by.
    pub fn alias(&self) -> &[NonEmptyText] {
        &self.alias
    }

    pub fn part_of(&self) -> Option<&Reference> {
        self.part_of.as_ref()
    }
}

impl Record for Organization {
    type Builder = OrganizationBuilder;

    const DESCRIPTOR: &'static RecordDescriptor = &RecordDescriptor {
        type_name: "Organization",
        kind: RecordKind::Resource,
        base: RESOURCE_BASE_FIELDS,
        fields: &[IDENTIFIER, ACTIVE, TYPE, NAME, ALIAS, PART_OF],
    };

    fn builder() -> OrganizationBuilder {
        OrganizationBuilder::default()
    }

    fn to_builder(&self) -> OrganizationBuilder {
        OrganizationBuilder {
            base: ResourceBaseBuilder::from_base(&self.base),
            identifier: Repeated::restore(self.identifier.clone(), IDENTIFIER.name, &self.missing),
            active: self.active,
            type_: Repeated::restore(self.type_.clone(), TYPE.name, &self.missing),
            name: self.name.clone(),
            alias: Repeated::restore(self.alias.clone(), ALIAS.name, &self.missing),
            part_of: self.part_of.clone(),
        }
    }

    fn hash_code(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let mut state = DefaultHasher::new();
            Self::DESCRIPTOR.type_name.hash(&mut state);
            self.base.hash(&mut state);
            self.identifier.hash(&mut state);
            self.active.hash(&mut state);
            self.type_.hash(&mut state);
            self.name.hash(&mut state);
            self.alias.hash(&mut state);
            self.part_of.hash(&mut state);
            self.missing.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for Organization {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.identifier == other.identifier
            && self.active == other.active
            && self.type_ == other.type_
            && self.name == other.name
            && self.alias == other.alias
            && self.part_of == other.part_of
            && self.missing == other.missing
    }
}

impl Eq for Organization {}

impl Hash for Organization {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Validate for Organization {
    fn validate_fields(&self, validator: &mut Validator) {
        self.base.validate_fields(validator);
        validator.check_entries(IDENTIFIER.name, &self.missing);
        validator.check_entries(TYPE.name, &self.missing);
        validator.check_entries(ALIAS.name, &self.missing);
        validator.check_reference(&PART_OF, self.part_of.as_ref());
    }
}

impl Visitable for Organization {
    fn type_name(&self) -> &'static str {
        Self::DESCRIPTOR.type_name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Resource
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            self.base.accept_fields(v);
            accept_list(&self.identifier, IDENTIFIER.name, IDENTIFIER.type_name, v);
            accept_field(&self.active, ACTIVE.name, v);
            accept_list(&self.type_, TYPE.name, TYPE.type_name, v);
            accept_field(&self.name, NAME.name, v);
            accept_list(&self.alias, ALIAS.name, ALIAS.type_name, v);
            accept_field(&self.part_of, PART_OF.name, v);
        });
    }
}

/// Builder for [`Organization`].
#[derive(Clone, Debug, Default)]
pub struct OrganizationBuilder {
    base: ResourceBaseBuilder,
    identifier: Repeated<Identifier>,
    active: Option<bool>,
    type_: Repeated<CodeableConcept>,
    name: Option<NonEmptyText>,
    alias: Repeated<NonEmptyText>,
    part_of: Option<Reference>,
}

impl OrganizationBuilder {
    pub fn add_identifier<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Identifier>>,
    {
        self.identifier.append(values);
        self
    }

    pub fn identifier<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Identifier>>,
    {
        self.identifier.replace(values);
        self
    }

    pub fn active(mut self, active: impl Into<Option<bool>>) -> Self {
        self.active = active.into();
        self
    }

    pub fn add_type<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<CodeableConcept>>,
    {
        self.type_.append(values);
        self
    }

    pub fn type_<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<CodeableConcept>>,
    {
        self.type_.replace(values);
        self
    }

    pub fn name(mut self, name: impl Into<Option<NonEmptyText>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_alias<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<NonEmptyText>>,
    {
        self.alias.append(values);
        self
    }

    pub fn alias<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<NonEmptyText>>,
    {
        self.alias.replace(values);
        self
    }

    pub fn part_of(mut self, part_of: impl Into<Option<Reference>>) -> Self {
        self.part_of = part_of.into();
        self
    }
}

impl ResourceBuilder for OrganizationBuilder {
    type Output = Organization;

    fn base_mut(&mut self) -> &mut ResourceBaseBuilder {
        &mut self.base
    }

    fn build(self) -> Result<Organization, ValidationErrors> {
        let config = self.base.config();
        let mut missing = MissingEntries::default();
        let organization = Organization {
            base: self.base.freeze(),
            identifier: self.identifier.freeze(IDENTIFIER.name, &mut missing),
            active: self.active,
            type_: self.type_.freeze(TYPE.name, &mut missing),
            name: self.name,
            alias: self.alias.freeze(ALIAS.name, &mut missing),
            part_of: self.part_of,
            missing,
            hash: HashCache::default(),
        };
        finish(organization, config)
    }
}

// ============================================================================
// Wire model
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct OrganizationWire {
    #[serde(default)]
    identifier: Vec<Identifier>,
    active: Option<bool>,
    #[serde(default, rename = "type")]
    type_: Vec<CodeableConcept>,
    name: Option<NonEmptyText>,
    #[serde(default)]
    alias: Vec<NonEmptyText>,
    part_of: Option<Reference>,
}

impl OrganizationWire {
    pub(crate) fn into_record(
        self,
        base: ResourceBaseBuilder,
    ) -> Result<Organization, ValidationErrors> {
        OrganizationBuilder {
            base,
            ..OrganizationBuilder::default()
        }
        .identifier(self.identifier)
        .active(self.active)
        .type_(self.type_)
        .name(self.name)
        .alias(self.alias)
        .part_of(self.part_of)
        .validating(false)
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use crate::visitor::collect_paths;
    use vpr_types::Id;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("text")
    }

    fn sample() -> Organization {
        Organization::builder()
            .id(Id::new("acme").expect("id"))
            .active(true)
            .add_type([CodeableConcept::from_text(text("Healthcare Provider"))])
            .name(text("Acme Health"))
            .add_alias([text("Acme"), text("AH")])
            .part_of(Reference::to("Organization/parent").expect("reference"))
            .build()
            .expect("valid organization")
    }

    #[test]
    fn round_trip_through_builder() {
        let org = sample();
        assert_eq!(org.to_builder().build().expect("rebuild"), org);
    }

    #[test]
    fn alias_replace_and_append() {
        let org = sample();
        let appended = org.to_builder().add_alias([text("Acme Inc")]).build().expect("append");
        assert_eq!(appended.alias().len(), 3);

        let replaced = org.to_builder().alias([text("Acme Inc")]).build().expect("replace");
        let aliases: Vec<&str> = replaced.alias().iter().map(NonEmptyText::as_str).collect();
        assert_eq!(aliases, vec!["Acme Inc"]);
    }

    #[test]
    fn missing_alias_is_reported_by_a_later_validation_pass() {
        let org = sample()
            .to_builder()
            .add_alias([None::<NonEmptyText>])
            .validating(false)
            .build()
            .expect("validation disabled");
        assert_eq!(org.alias().len(), 2);

        let err = org
            .validate(crate::config::ModelConfig::default())
            .expect_err("gap in alias");
        assert_eq!(
            err.errors(),
            &[ValidationError::Structural {
                field: "alias".into(),
                index: 2
            }]
        );
    }

    #[test]
    fn part_of_must_reference_an_organization() {
        let err = sample()
            .to_builder()
            .part_of(Reference::to("Patient/p1").expect("reference"))
            .build()
            .expect_err("wrong target");
        assert!(matches!(
            err.first(),
            Some(ValidationError::ReferenceType { field, .. }) if field == "partOf"
        ));
    }

    #[test]
    fn traversal_lists_base_then_own_fields() {
        assert_eq!(
            collect_paths(&sample()),
            vec![
                "Organization",
                "Organization.id",
                "Organization.active",
                "Organization.type[0]",
                "Organization.type[0].text",
                "Organization.name",
                "Organization.alias[0]",
                "Organization.alias[1]",
                "Organization.partOf",
                "Organization.partOf.reference",
            ]
        );
    }
}
