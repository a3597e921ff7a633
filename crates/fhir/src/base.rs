//! Base fields shared by every record type, and the traits tying records to their builders.
//!
//! Concrete records embed a [`ResourceBase`] (resources) or a [`BackboneBase`] (backbone
//! elements) by value. The matching builder traits supply the base-field setters once, so each
//! concrete builder only declares its own fields.

use crate::builder::{MissingEntries, Repeated};
use crate::config::ModelConfig;
use crate::datatypes::{Extension, Meta, Narrative};
use crate::descriptor::RecordDescriptor;
use crate::resource::AnyResource;
use crate::validation::{Validate, ValidationErrors, Validator};
use crate::visitor::{accept_field, accept_list, Visitable, Visitor};
use crate::{FhirError, FhirResult};
use serde::Deserialize;
use vpr_types::{Code, Id, NonEmptyText, Uri};

/// An immutable record produced by a builder.
pub trait Record: Validate + Visitable + Clone + PartialEq + Sized {
    type Builder;

    /// Field tables of this type.
    const DESCRIPTOR: &'static RecordDescriptor;

    /// An empty builder using the default [`ModelConfig`].
    fn builder() -> Self::Builder;

    /// A builder seeded with every field of this record. The record itself is untouched.
    fn to_builder(&self) -> Self::Builder;

    /// Hash over the full field list, computed on first use and cached on the instance.
    fn hash_code(&self) -> u64;

    /// Run the validator over this record as an explicit, separate pass.
    ///
    /// # Errors
    ///
    /// Returns every error found, in field declaration order.
    fn validate(&self, config: ModelConfig) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new(config);
        self.validate_fields(&mut validator);
        let errors = validator.into_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(Self::DESCRIPTOR.type_name, errors))
        }
    }
}

// ============================================================================
// Resource base
// ============================================================================

/// Fields every resource carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceBase {
    id: Option<Id>,
    meta: Option<Meta>,
    implicit_rules: Option<Uri>,
    language: Option<Code>,
    text: Option<Narrative>,
    contained: Vec<AnyResource>,
    extension: Vec<Extension>,
    modifier_extension: Vec<Extension>,
    missing: MissingEntries,
}

impl ResourceBase {
    /// Logical id.
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn implicit_rules(&self) -> Option<&Uri> {
        self.implicit_rules.as_ref()
    }

    pub fn language(&self) -> Option<&Code> {
        self.language.as_ref()
    }

    pub fn text(&self) -> Option<&Narrative> {
        self.text.as_ref()
    }

    /// Resources embedded inline; they have no independent existence.
    pub fn contained(&self) -> &[AnyResource] {
        &self.contained
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }

    /// Accept the base fields in declaration order.
    pub(crate) fn accept_fields(&self, visitor: &mut dyn Visitor) {
        accept_field(&self.id, "id", visitor);
        accept_field(&self.meta, "meta", visitor);
        accept_field(&self.implicit_rules, "implicitRules", visitor);
        accept_field(&self.language, "language", visitor);
        accept_field(&self.text, "text", visitor);
        accept_list(&self.contained, "contained", "Resource", visitor);
        accept_list(&self.extension, "extension", "Extension", visitor);
        accept_list(
            &self.modifier_extension,
            "modifierExtension",
            "Extension",
            visitor,
        );
    }
}

impl Validate for ResourceBase {
    fn validate_fields(&self, validator: &mut Validator) {
        validator.check_entries("contained", &self.missing);
        validator.check_entries("extension", &self.missing);
        validator.check_entries("modifierExtension", &self.missing);
        validator.nested_list("contained", &self.contained);
    }
}

/// Staged base fields of a resource builder, plus the builder's configuration.
#[derive(Clone, Debug, Default)]
pub struct ResourceBaseBuilder {
    config: ModelConfig,
    id: Option<Id>,
    meta: Option<Meta>,
    implicit_rules: Option<Uri>,
    language: Option<Code>,
    text: Option<Narrative>,
    contained: Repeated<AnyResource>,
    extension: Repeated<Extension>,
    modifier_extension: Repeated<Extension>,
}

impl ResourceBaseBuilder {
    pub(crate) fn from_base(base: &ResourceBase) -> Self {
        Self {
            config: ModelConfig::default(),
            id: base.id.clone(),
            meta: base.meta.clone(),
            implicit_rules: base.implicit_rules.clone(),
            language: base.language.clone(),
            text: base.text.clone(),
            contained: Repeated::restore(base.contained.clone(), "contained", &base.missing),
            extension: Repeated::restore(base.extension.clone(), "extension", &base.missing),
            modifier_extension: Repeated::restore(
                base.modifier_extension.clone(),
                "modifierExtension",
                &base.missing,
            ),
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub(crate) fn freeze(self) -> ResourceBase {
        let mut missing = MissingEntries::default();
        ResourceBase {
            id: self.id,
            meta: self.meta,
            implicit_rules: self.implicit_rules,
            language: self.language,
            text: self.text,
            contained: self.contained.freeze("contained", &mut missing),
            extension: self.extension.freeze("extension", &mut missing),
            modifier_extension: self
                .modifier_extension
                .freeze("modifierExtension", &mut missing),
            missing,
        }
    }
}

/// Base-field setters shared by every resource builder.
///
/// Repeated fields follow one convention throughout: `add_*` appends to the staged entries,
/// while the plain setter replaces the whole list with the given values.
pub trait ResourceBuilder: Sized {
    type Output: Record;

    fn base_mut(&mut self) -> &mut ResourceBaseBuilder;

    /// Freeze the staged fields into a record.
    ///
    /// # Errors
    ///
    /// Fails on missing list entries, and on any validator error when validation is enabled.
    fn build(self) -> Result<Self::Output, ValidationErrors>;

    fn id(mut self, id: impl Into<Option<Id>>) -> Self {
        self.base_mut().id = id.into();
        self
    }

    fn meta(mut self, meta: impl Into<Option<Meta>>) -> Self {
        self.base_mut().meta = meta.into();
        self
    }

    fn implicit_rules(mut self, implicit_rules: impl Into<Option<Uri>>) -> Self {
        self.base_mut().implicit_rules = implicit_rules.into();
        self
    }

    fn language(mut self, language: impl Into<Option<Code>>) -> Self {
        self.base_mut().language = language.into();
        self
    }

    fn text(mut self, text: impl Into<Option<Narrative>>) -> Self {
        self.base_mut().text = text.into();
        self
    }

    fn add_contained<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AnyResource>>,
    {
        self.base_mut().contained.append(values);
        self
    }

    fn contained<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AnyResource>>,
    {
        self.base_mut().contained.replace(values);
        self
    }

    fn add_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().extension.append(values);
        self
    }

    fn extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().extension.replace(values);
        self
    }

    fn add_modifier_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().modifier_extension.append(values);
        self
    }

    fn modifier_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().modifier_extension.replace(values);
        self
    }

    /// Turn the validator on or off for `build()`.
    fn validating(mut self, validating: bool) -> Self {
        let base = self.base_mut();
        base.config = base.config.with_validating(validating);
        self
    }

    fn config(mut self, config: ModelConfig) -> Self {
        self.base_mut().config = config;
        self
    }
}

/// Base fields as they appear in a YAML resource document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct ResourceBaseWire {
    id: Option<Id>,
    meta: Option<Meta>,
    implicit_rules: Option<Uri>,
    language: Option<Code>,
    text: Option<Narrative>,
    #[serde(default)]
    contained: Vec<serde_yaml::Value>,
    #[serde(default)]
    extension: Vec<Extension>,
    #[serde(default)]
    modifier_extension: Vec<Extension>,
}

impl ResourceBaseWire {
    /// Stage the base fields, parsing contained resources without validating them.
    pub(crate) fn into_builder(self) -> FhirResult<ResourceBaseBuilder> {
        let mut contained = Vec::with_capacity(self.contained.len());
        for (index, value) in self.contained.into_iter().enumerate() {
            let resource = crate::yaml::parse_value(value).map_err(|err| match err {
                FhirError::Translation(msg) => {
                    FhirError::Translation(format!("contained[{index}]: {msg}"))
                }
                FhirError::InvalidInput(msg) => {
                    FhirError::InvalidInput(format!("contained[{index}]: {msg}"))
                }
                other => other,
            })?;
            contained.push(resource);
        }

        Ok(ResourceBaseBuilder {
            config: ModelConfig::default(),
            id: self.id,
            meta: self.meta,
            implicit_rules: self.implicit_rules,
            language: self.language,
            text: self.text,
            contained: Repeated::seed(contained),
            extension: Repeated::seed(self.extension),
            modifier_extension: Repeated::seed(self.modifier_extension),
        })
    }
}

// ============================================================================
// Backbone element base
// ============================================================================

/// Fields every backbone element carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BackboneBase {
    id: Option<NonEmptyText>,
    extension: Vec<Extension>,
    modifier_extension: Vec<Extension>,
    missing: MissingEntries,
}

impl BackboneBase {
    /// Element id, unique within the resource.
    pub fn id(&self) -> Option<&NonEmptyText> {
        self.id.as_ref()
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }

    pub(crate) fn accept_fields(&self, visitor: &mut dyn Visitor) {
        accept_field(&self.id, "id", visitor);
        accept_list(&self.extension, "extension", "Extension", visitor);
        accept_list(
            &self.modifier_extension,
            "modifierExtension",
            "Extension",
            visitor,
        );
    }
}

impl Validate for BackboneBase {
    fn validate_fields(&self, validator: &mut Validator) {
        validator.check_entries("extension", &self.missing);
        validator.check_entries("modifierExtension", &self.missing);
    }
}

/// Staged base fields of a backbone element builder.
#[derive(Clone, Debug, Default)]
pub struct BackboneBaseBuilder {
    config: ModelConfig,
    id: Option<NonEmptyText>,
    extension: Repeated<Extension>,
    modifier_extension: Repeated<Extension>,
}

impl BackboneBaseBuilder {
    pub(crate) fn from_base(base: &BackboneBase) -> Self {
        Self {
            config: ModelConfig::default(),
            id: base.id.clone(),
            extension: Repeated::restore(base.extension.clone(), "extension", &base.missing),
            modifier_extension: Repeated::restore(
                base.modifier_extension.clone(),
                "modifierExtension",
                &base.missing,
            ),
        }
    }

    pub(crate) fn from_wire(
        id: Option<NonEmptyText>,
        extension: Vec<Extension>,
        modifier_extension: Vec<Extension>,
    ) -> Self {
        Self {
            config: ModelConfig::default(),
            id,
            extension: Repeated::seed(extension),
            modifier_extension: Repeated::seed(modifier_extension),
        }
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }

    pub(crate) fn freeze(self) -> BackboneBase {
        let mut missing = MissingEntries::default();
        BackboneBase {
            id: self.id,
            extension: self.extension.freeze("extension", &mut missing),
            modifier_extension: self
                .modifier_extension
                .freeze("modifierExtension", &mut missing),
            missing,
        }
    }
}

/// Base-field setters shared by every backbone element builder.
pub trait BackboneBuilder: Sized {
    type Output: Record;

    fn base_mut(&mut self) -> &mut BackboneBaseBuilder;

    /// Freeze the staged fields into an element.
    ///
    /// # Errors
    ///
    /// Fails on missing list entries, and on any validator error when validation is enabled.
    fn build(self) -> Result<Self::Output, ValidationErrors>;

    fn id(mut self, id: impl Into<Option<NonEmptyText>>) -> Self {
        self.base_mut().id = id.into();
        self
    }

    fn add_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().extension.append(values);
        self
    }

    fn extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().extension.replace(values);
        self
    }

    fn add_modifier_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().modifier_extension.append(values);
        self
    }

    fn modifier_extension<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Extension>>,
    {
        self.base_mut().modifier_extension.replace(values);
        self
    }

    fn validating(mut self, validating: bool) -> Self {
        let base = self.base_mut();
        base.config = base.config.with_validating(validating);
        self
    }

    fn config(mut self, config: ModelConfig) -> Self {
        self.base_mut().config = config;
        self
    }
}
