//! Account resource: a financial tool for tracking value accrued for a particular purpose.
//!
//! Account carries two backbone elements, [`AccountCoverage`] and [`AccountGuarantor`], each
//! with its own builder. Field order in the descriptor tables below is the traversal order and
//! therefore the YAML key order.

use crate::base::{
    BackboneBase, BackboneBaseBuilder, BackboneBuilder, Record, ResourceBase, ResourceBaseBuilder,
    ResourceBuilder,
};
use crate::builder::{finish, HashCache, MissingEntries, Repeated};
use crate::datatypes::{CodeableConcept, Extension, Identifier, Period, Reference};
use crate::descriptor::{
    BindingStrength, FieldDescriptor, RecordDescriptor, RecordKind, BACKBONE_BASE_FIELDS,
    RESOURCE_BASE_FIELDS,
};
use crate::validation::{Validate, ValidationErrors, Validator};
use crate::visitor::{accept_field, accept_list, dispatch, NodeKind, Value, Visitable, Visitor};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;
use vpr_types::NonEmptyText;

// ============================================================================
// Field tables
// ============================================================================

const IDENTIFIER: FieldDescriptor = FieldDescriptor::repeated("identifier", "Identifier").summary();
const STATUS: FieldDescriptor = FieldDescriptor::required("status", "code")
    .summary()
    .binding(
        "AccountStatus",
        BindingStrength::Required,
        "http://hl7.org/fhir/ValueSet/account-status|4.3.0",
    );
const TYPE: FieldDescriptor = FieldDescriptor::optional("type", "CodeableConcept")
    .summary()
    .binding(
        "AccountType",
        BindingStrength::Example,
        "http://hl7.org/fhir/ValueSet/account-type",
    );
const NAME: FieldDescriptor = FieldDescriptor::optional("name", "string").summary();
const SUBJECT: FieldDescriptor = FieldDescriptor::repeated("subject", "Reference")
    .summary()
    .targets(&[
        "Patient",
        "Device",
        "Practitioner",
        "PractitionerRole",
        "Location",
        "HealthcareService",
        "Organization",
    ]);
const SERVICE_PERIOD: FieldDescriptor = FieldDescriptor::optional("servicePeriod", "Period").summary();
const COVERAGE: FieldDescriptor = FieldDescriptor::repeated("coverage", "BackboneElement").summary();
const OWNER: FieldDescriptor = FieldDescriptor::optional("owner", "Reference")
    .summary()
    .targets(&["Organization"]);
const DESCRIPTION: FieldDescriptor = FieldDescriptor::optional("description", "string").summary();
const GUARANTOR: FieldDescriptor = FieldDescriptor::repeated("guarantor", "BackboneElement");
const PART_OF: FieldDescriptor =
    FieldDescriptor::optional("partOf", "Reference").targets(&["Account"]);

const COVERAGE_COVERAGE: FieldDescriptor = FieldDescriptor::required("coverage", "Reference")
    .summary()
    .targets(&["Coverage"]);
const COVERAGE_PRIORITY: FieldDescriptor =
    FieldDescriptor::optional("priority", "positiveInt").summary();

const GUARANTOR_PARTY: FieldDescriptor = FieldDescriptor::required("party", "Reference")
    .targets(&["Patient", "RelatedPerson", "Organization"]);
const GUARANTOR_ON_HOLD: FieldDescriptor = FieldDescriptor::optional("onHold", "boolean");
const GUARANTOR_PERIOD: FieldDescriptor = FieldDescriptor::optional("period", "Period");

// ============================================================================
// AccountStatus
// ============================================================================

/// Whether the account is available to be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountStatus {
    Active,
    Inactive,
    EnteredInError,
    OnHold,
    Unknown,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::EnteredInError => "entered-in-error",
            AccountStatus::OnHold => "on-hold",
            AccountStatus::Unknown => "unknown",
        }
    }
}

impl Visitable for AccountStatus {
    fn type_name(&self) -> &'static str {
        "code"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Primitive
    }

    fn value(&self) -> Option<Value<'_>> {
        Some(Value::String(self.as_str()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |_| {});
    }
}

// ============================================================================
// Account
// ============================================================================

/// A financial tool for tracking value accrued for a particular purpose.
#[derive(Clone, Debug)]
pub struct Account {
    base: ResourceBase,
    identifier: Vec<Identifier>,
    status: Option<AccountStatus>,
    type_: Option<CodeableConcept>,
    name: Option<NonEmptyText>,
    subject: Vec<Reference>,
    service_period: Option<Period>,
    coverage: Vec<AccountCoverage>,
    owner: Option<Reference>,
    description: Option<NonEmptyText>,
    guarantor: Vec<AccountGuarantor>,
    part_of: Option<Reference>,
    missing: MissingEntries,
    hash: HashCache,
}

impl Account {
    pub fn base(&self) -> &ResourceBase {
        &self.base
    }

    /// Unique identifiers used for this account.
    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    /// Always present on a validated account.
    pub fn status(&self) -> Option<AccountStatus> {
        self.status
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn name(&self) -> Option<&NonEmptyText> {
        self.name.as_ref()
    }

    /// Entities the account's charges are tracked against.
    pub fn subject(&self) -> &[Reference] {
        &self.subject
    }

    pub fn service_period(&self) -> Option<&Period> {
        self.service_period.as_ref()
    }

    /// Insurance coverages to bill, in priority order.
    pub fn coverage(&self) -> &[AccountCoverage] {
        &self.coverage
    }

    pub fn owner(&self) -> Option<&Reference> {
        self.owner.as_ref()
    }

    pub fn description(&self) -> Option<&NonEmptyText> {
        self.description.as_ref()
    }

    pub fn guarantor(&self) -> &[AccountGuarantor] {
        &self.guarantor
    }

    pub fn part_of(&self) -> Option<&Reference> {
        self.part_of.as_ref()
    }
}

impl Record for Account {
    type Builder = AccountBuilder;

    const DESCRIPTOR: &'static RecordDescriptor = &RecordDescriptor {
        type_name: "Account",
        kind: RecordKind::Resource,
        base: RESOURCE_BASE_FIELDS,
        fields: &[
            IDENTIFIER,
            STATUS,
            TYPE,
            NAME,
            SUBJECT,
            SERVICE_PERIOD,
            COVERAGE,
            OWNER,
            DESCRIPTION,
            GUARANTOR,
            PART_OF,
        ],
    };

    fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    fn to_builder(&self) -> AccountBuilder {
        AccountBuilder {
            base: ResourceBaseBuilder::from_base(&self.base),
            identifier: Repeated::restore(self.identifier.clone(), IDENTIFIER.name, &self.missing),
            status: self.status,
            type_: self.type_.clone(),
            name: self.name.clone(),
            subject: Repeated::restore(self.subject.clone(), SUBJECT.name, &self.missing),
            service_period: self.service_period.clone(),
            coverage: Repeated::restore(self.coverage.clone(), COVERAGE.name, &self.missing),
            owner: self.owner.clone(),
            description: self.description.clone(),
            guarantor: Repeated::restore(self.guarantor.clone(), GUARANTOR.name, &self.missing),
            part_of: self.part_of.clone(),
        }
    }

    fn hash_code(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let mut state = DefaultHasher::new();
            Self::DESCRIPTOR.type_name.hash(&mut state);
            self.base.hash(&mut state);
            self.identifier.hash(&mut state);
            self.status.hash(&mut state);
            self.type_.hash(&mut state);
            self.name.hash(&mut state);
            self.subject.hash(&mut state);
            self.service_period.hash(&mut state);
            self.coverage.hash(&mut state);
            self.owner.hash(&mut state);
            self.description.hash(&mut state);
            self.guarantor.hash(&mut state);
            self.part_of.hash(&mut state);
            self.missing.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.identifier == other.identifier
            && self.status == other.status
            && self.type_ == other.type_
            && self.name == other.name
            && self.subject == other.subject
            && self.service_period == other.service_period
            && self.coverage == other.coverage
            && self.owner == other.owner
            && self.description == other.description
            && self.guarantor == other.guarantor
            && self.part_of == other.part_of
            && self.missing == other.missing
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Validate for Account {
    fn validate_fields(&self, validator: &mut Validator) {
        self.base.validate_fields(validator);
        validator.check_entries(IDENTIFIER.name, &self.missing);
        validator.require(&STATUS, self.status.as_ref());
        validator.check_entries(SUBJECT.name, &self.missing);
        validator.check_references(&SUBJECT, &self.subject);
        validator.check_entries(COVERAGE.name, &self.missing);
        validator.nested_list(COVERAGE.name, &self.coverage);
        validator.check_reference(&OWNER, self.owner.as_ref());
        validator.check_entries(GUARANTOR.name, &self.missing);
        validator.nested_list(GUARANTOR.name, &self.guarantor);
        validator.check_reference(&PART_OF, self.part_of.as_ref());
    }
}

impl Visitable for Account {
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
            accept_field(&self.status, STATUS.name, v);
            accept_field(&self.type_, TYPE.name, v);
            accept_field(&self.name, NAME.name, v);
            accept_list(&self.subject, SUBJECT.name, SUBJECT.type_name, v);
            accept_field(&self.service_period, SERVICE_PERIOD.name, v);
            accept_list(&self.coverage, COVERAGE.name, COVERAGE.type_name, v);
            accept_field(&self.owner, OWNER.name, v);
            accept_field(&self.description, DESCRIPTION.name, v);
            accept_list(&self.guarantor, GUARANTOR.name, GUARANTOR.type_name, v);
            accept_field(&self.part_of, PART_OF.name, v);
        });
    }
}

/// Builder for [`Account`].
#[derive(Clone, Debug, Default)]
pub struct AccountBuilder {
    base: ResourceBaseBuilder,
    identifier: Repeated<Identifier>,
    status: Option<AccountStatus>,
    type_: Option<CodeableConcept>,
    name: Option<NonEmptyText>,
    subject: Repeated<Reference>,
    service_period: Option<Period>,
    coverage: Repeated<AccountCoverage>,
    owner: Option<Reference>,
    description: Option<NonEmptyText>,
    guarantor: Repeated<AccountGuarantor>,
    part_of: Option<Reference>,
}

impl AccountBuilder {
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

    pub fn status(mut self, status: impl Into<Option<AccountStatus>>) -> Self {
        self.status = status.into();
        self
    }

    pub fn type_(mut self, type_: impl Into<Option<CodeableConcept>>) -> Self {
        self.type_ = type_.into();
        self
    }

    pub fn name(mut self, name: impl Into<Option<NonEmptyText>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_subject<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Reference>>,
    {
        self.subject.append(values);
        self
    }

    pub fn subject<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Reference>>,
    {
        self.subject.replace(values);
        self
    }

    pub fn service_period(mut self, service_period: impl Into<Option<Period>>) -> Self {
        self.service_period = service_period.into();
        self
    }

    pub fn add_coverage<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AccountCoverage>>,
    {
        self.coverage.append(values);
        self
    }

    pub fn coverage<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AccountCoverage>>,
    {
        self.coverage.replace(values);
        self
    }

    pub fn owner(mut self, owner: impl Into<Option<Reference>>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn description(mut self, description: impl Into<Option<NonEmptyText>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_guarantor<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AccountGuarantor>>,
    {
        self.guarantor.append(values);
        self
    }

    pub fn guarantor<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<AccountGuarantor>>,
    {
        self.guarantor.replace(values);
        self
    }

    pub fn part_of(mut self, part_of: impl Into<Option<Reference>>) -> Self {
        self.part_of = part_of.into();
        self
    }
}

impl ResourceBuilder for AccountBuilder {
    type Output = Account;

    fn base_mut(&mut self) -> &mut ResourceBaseBuilder {
        &mut self.base
    }

    fn build(self) -> Result<Account, ValidationErrors> {
        let config = self.base.config();
        let mut missing = MissingEntries::default();
        let account = Account {
            base: self.base.freeze(),
            identifier: self.identifier.freeze(IDENTIFIER.name, &mut missing),
            status: self.status,
            type_: self.type_,
            name: self.name,
            subject: self.subject.freeze(SUBJECT.name, &mut missing),
            service_period: self.service_period,
            coverage: self.coverage.freeze(COVERAGE.name, &mut missing),
            owner: self.owner,
            description: self.description,
            guarantor: self.guarantor.freeze(GUARANTOR.name, &mut missing),
            part_of: self.part_of,
            missing,
            hash: HashCache::default(),
        };
        finish(account, config)
    }
}

// ============================================================================
// Account.coverage
// ============================================================================

/// An insurance coverage to bill against the account.
#[derive(Clone, Debug)]
pub struct AccountCoverage {
    base: BackboneBase,
    coverage: Option<Reference>,
    priority: Option<NonZeroU32>,
    hash: HashCache,
}

impl AccountCoverage {
    pub fn base(&self) -> &BackboneBase {
        &self.base
    }

    pub fn coverage(&self) -> Option<&Reference> {
        self.coverage.as_ref()
    }

    /// Relative order of the coverage; 1 is billed first.
    pub fn priority(&self) -> Option<NonZeroU32> {
        self.priority
    }
}

impl Record for AccountCoverage {
    type Builder = AccountCoverageBuilder;

    const DESCRIPTOR: &'static RecordDescriptor = &RecordDescriptor {
        type_name: "Account.coverage",
        kind: RecordKind::BackboneElement,
        base: BACKBONE_BASE_FIELDS,
        fields: &[COVERAGE_COVERAGE, COVERAGE_PRIORITY],
    };

    fn builder() -> AccountCoverageBuilder {
        AccountCoverageBuilder::default()
    }

    fn to_builder(&self) -> AccountCoverageBuilder {
        AccountCoverageBuilder {
            base: BackboneBaseBuilder::from_base(&self.base),
            coverage: self.coverage.clone(),
            priority: self.priority,
        }
    }

    fn hash_code(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let mut state = DefaultHasher::new();
            Self::DESCRIPTOR.type_name.hash(&mut state);
            self.base.hash(&mut state);
            self.coverage.hash(&mut state);
            self.priority.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for AccountCoverage {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.coverage == other.coverage && self.priority == other.priority
    }
}

impl Eq for AccountCoverage {}

impl Hash for AccountCoverage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Validate for AccountCoverage {
    fn validate_fields(&self, validator: &mut Validator) {
        self.base.validate_fields(validator);
        validator.require(&COVERAGE_COVERAGE, self.coverage.as_ref());
        validator.check_reference(&COVERAGE_COVERAGE, self.coverage.as_ref());
    }
}

impl Visitable for AccountCoverage {
    fn type_name(&self) -> &'static str {
        Self::DESCRIPTOR.type_name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Element
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            self.base.accept_fields(v);
            accept_field(&self.coverage, COVERAGE_COVERAGE.name, v);
            accept_field(&self.priority, COVERAGE_PRIORITY.name, v);
        });
    }
}

/// Builder for [`AccountCoverage`].
#[derive(Clone, Debug, Default)]
pub struct AccountCoverageBuilder {
    base: BackboneBaseBuilder,
    coverage: Option<Reference>,
    priority: Option<NonZeroU32>,
}

impl AccountCoverageBuilder {
    pub fn coverage(mut self, coverage: impl Into<Option<Reference>>) -> Self {
        self.coverage = coverage.into();
        self
    }

    pub fn priority(mut self, priority: impl Into<Option<NonZeroU32>>) -> Self {
        self.priority = priority.into();
        self
    }
}

impl BackboneBuilder for AccountCoverageBuilder {
    type Output = AccountCoverage;

    fn base_mut(&mut self) -> &mut BackboneBaseBuilder {
        &mut self.base
    }

    fn build(self) -> Result<AccountCoverage, ValidationErrors> {
        let config = self.base.config();
        let coverage = AccountCoverage {
            base: self.base.freeze(),
            coverage: self.coverage,
            priority: self.priority,
            hash: HashCache::default(),
        };
        finish(coverage, config)
    }
}

// ============================================================================
// Account.guarantor
// ============================================================================

/// A party responsible for balancing the account if other payment options fall short.
#[derive(Clone, Debug)]
pub struct AccountGuarantor {
    base: BackboneBase,
    party: Option<Reference>,
    on_hold: Option<bool>,
    period: Option<Period>,
    hash: HashCache,
}

impl AccountGuarantor {
    pub fn base(&self) -> &BackboneBase {
        &self.base
    }

    pub fn party(&self) -> Option<&Reference> {
        self.party.as_ref()
    }

    /// Credit or other hold applied to the guarantor.
    pub fn on_hold(&self) -> Option<bool> {
        self.on_hold
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }
}

impl Record for AccountGuarantor {
    type Builder = AccountGuarantorBuilder;

    const DESCRIPTOR: &'static RecordDescriptor = &RecordDescriptor {
        type_name: "Account.guarantor",
        kind: RecordKind::BackboneElement,
        base: BACKBONE_BASE_FIELDS,
        fields: &[GUARANTOR_PARTY, GUARANTOR_ON_HOLD, GUARANTOR_PERIOD],
    };

    fn builder() -> AccountGuarantorBuilder {
        AccountGuarantorBuilder::default()
    }

    fn to_builder(&self) -> AccountGuarantorBuilder {
        AccountGuarantorBuilder {
            base: BackboneBaseBuilder::from_base(&self.base),
            party: self.party.clone(),
            on_hold: self.on_hold,
            period: self.period.clone(),
        }
    }

    fn hash_code(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let mut state = DefaultHasher::new();
            Self::DESCRIPTOR.type_name.hash(&mut state);
            self.base.hash(&mut state);
            self.party.hash(&mut state);
            self.on_hold.hash(&mut state);
            self.period.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for AccountGuarantor {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.party == other.party
            && self.on_hold == other.on_hold
            && self.period == other.period
    }
}

impl Eq for AccountGuarantor {}

impl Hash for AccountGuarantor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Validate for AccountGuarantor {
    fn validate_fields(&self, validator: &mut Validator) {
        self.base.validate_fields(validator);
        validator.require(&GUARANTOR_PARTY, self.party.as_ref());
        validator.check_reference(&GUARANTOR_PARTY, self.party.as_ref());
    }
}

impl Visitable for AccountGuarantor {
    fn type_name(&self) -> &'static str {
        Self::DESCRIPTOR.type_name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Element
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        dispatch(self, name, index, visitor, |v| {
            self.base.accept_fields(v);
            accept_field(&self.party, GUARANTOR_PARTY.name, v);
            accept_field(&self.on_hold, GUARANTOR_ON_HOLD.name, v);
            accept_field(&self.period, GUARANTOR_PERIOD.name, v);
        });
    }
}

/// Builder for [`AccountGuarantor`].
#[derive(Clone, Debug, Default)]
pub struct AccountGuarantorBuilder {
    base: BackboneBaseBuilder,
    party: Option<Reference>,
    on_hold: Option<bool>,
    period: Option<Period>,
}

impl AccountGuarantorBuilder {
    pub fn party(mut self, party: impl Into<Option<Reference>>) -> Self {
        self.party = party.into();
        self
    }

    pub fn on_hold(mut self, on_hold: impl Into<Option<bool>>) -> Self {
        self.on_hold = on_hold.into();
        self
    }

    pub fn period(mut self, period: impl Into<Option<Period>>) -> Self {
        self.period = period.into();
        self
    }
}

impl BackboneBuilder for AccountGuarantorBuilder {
    type Output = AccountGuarantor;

    fn base_mut(&mut self) -> &mut BackboneBaseBuilder {
        &mut self.base
    }

    fn build(self) -> Result<AccountGuarantor, ValidationErrors> {
        let config = self.base.config();
        let guarantor = AccountGuarantor {
            base: self.base.freeze(),
            party: self.party,
            on_hold: self.on_hold,
            period: self.period,
            hash: HashCache::default(),
        };
        finish(guarantor, config)
    }
}

// ============================================================================
// Wire models
// ============================================================================

/// Account-specific keys of a YAML Account document. Base keys are split off by the caller.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct AccountWire {
    #[serde(default)]
    identifier: Vec<Identifier>,
    status: Option<AccountStatus>,
    #[serde(rename = "type")]
    type_: Option<CodeableConcept>,
    name: Option<NonEmptyText>,
    #[serde(default)]
    subject: Vec<Reference>,
    service_period: Option<Period>,
    #[serde(default)]
    coverage: Vec<AccountCoverageWire>,
    owner: Option<Reference>,
    description: Option<NonEmptyText>,
    #[serde(default)]
    guarantor: Vec<AccountGuarantorWire>,
    part_of: Option<Reference>,
}

impl AccountWire {
    /// Assemble the account without running the validator.
    pub(crate) fn into_record(self, base: ResourceBaseBuilder) -> Result<Account, ValidationErrors> {
        let coverage = self
            .coverage
            .into_iter()
            .map(AccountCoverageWire::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        let guarantor = self
            .guarantor
            .into_iter()
            .map(AccountGuarantorWire::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        AccountBuilder {
            base,
            ..AccountBuilder::default()
        }
        .identifier(self.identifier)
        .status(self.status)
        .type_(self.type_)
        .name(self.name)
        .subject(self.subject)
        .service_period(self.service_period)
        .coverage(coverage)
        .owner(self.owner)
        .description(self.description)
        .guarantor(guarantor)
        .part_of(self.part_of)
        .validating(false)
        .build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AccountCoverageWire {
    id: Option<NonEmptyText>,
    #[serde(default)]
    extension: Vec<Extension>,
    #[serde(default)]
    modifier_extension: Vec<Extension>,
    coverage: Option<Reference>,
    priority: Option<NonZeroU32>,
}

impl AccountCoverageWire {
    fn into_record(self) -> Result<AccountCoverage, ValidationErrors> {
        AccountCoverageBuilder {
            base: BackboneBaseBuilder::from_wire(self.id, self.extension, self.modifier_extension),
            coverage: self.coverage,
            priority: self.priority,
        }
        .validating(false)
        .build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AccountGuarantorWire {
    id: Option<NonEmptyText>,
    #[serde(default)]
    extension: Vec<Extension>,
    #[serde(default)]
    modifier_extension: Vec<Extension>,
    party: Option<Reference>,
    on_hold: Option<bool>,
    period: Option<Period>,
}

impl AccountGuarantorWire {
    fn into_record(self) -> Result<AccountGuarantor, ValidationErrors> {
        AccountGuarantorBuilder {
            base: BackboneBaseBuilder::from_wire(self.id, self.extension, self.modifier_extension),
            party: self.party,
            on_hold: self.on_hold,
            period: self.period,
        }
        .validating(false)
        .build()
    }
}
