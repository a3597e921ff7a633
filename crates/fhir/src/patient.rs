//! Patient resource: demographics and administrative information about an individual
//! receiving care.
//!
//! Notes:
//! - `gender` is a required-strength binding; only the four administrative codes are accepted.
//! - `birthDate` is a calendar date without time or timezone.

use crate::base::{Record, ResourceBase, ResourceBaseBuilder, ResourceBuilder};
use crate::builder::{finish, HashCache, MissingEntries, Repeated};
use crate::datatypes::{HumanName, Identifier, Reference};
use crate::descriptor::{
    BindingStrength, FieldDescriptor, RecordDescriptor, RecordKind, RESOURCE_BASE_FIELDS,
};
use crate::validation::{Validate, ValidationErrors, Validator};
use crate::visitor::{accept_field, accept_list, dispatch, NodeKind, Value, Visitable, Visitor};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const IDENTIFIER: FieldDescriptor = FieldDescriptor::repeated("identifier", "Identifier").summary();
const ACTIVE: FieldDescriptor = FieldDescriptor::optional("active", "boolean").summary();
const NAME: FieldDescriptor = FieldDescriptor::repeated("name", "HumanName").summary();
const GENDER: FieldDescriptor = FieldDescriptor::optional("gender", "code")
    .summary()
    .binding(
        "AdministrativeGender",
        BindingStrength::Required,
        "http://hl7.org/fhir/ValueSet/administrative-gender|4.3.0",
    );
const BIRTH_DATE: FieldDescriptor = FieldDescriptor::optional("birthDate", "date").summary();
const GENERAL_PRACTITIONER: FieldDescriptor =
    FieldDescriptor::repeated("generalPractitioner", "Reference").targets(&[
        "Organization",
        "Practitioner",
        "PractitionerRole",
    ]);
const MANAGING_ORGANIZATION: FieldDescriptor =
    FieldDescriptor::optional("managingOrganization", "Reference")
        .summary()
        .targets(&["Organization"]);

// ============================================================================
// AdministrativeGender
// ============================================================================

/// Gender for administrative purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    pub fn as_str(self) -> &'static str {
        match self {
            AdministrativeGender::Male => "male",
            AdministrativeGender::Female => "female",
            AdministrativeGender::Other => "other",
            AdministrativeGender::Unknown => "unknown",
        }
    }
}

impl Visitable for AdministrativeGender {
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
// Patient
// ============================================================================

/// An individual receiving care or other health-related services.
#[derive(Clone, Debug)]
pub struct Patient {
    base: ResourceBase,
    identifier: Vec<Identifier>,
    active: Option<bool>,
    name: Vec<HumanName>,
    gender: Option<AdministrativeGender>,
    birth_date: Option<NaiveDate>,
    general_practitioner: Vec<Reference>,
    managing_organization: Option<Reference>,
    missing: MissingEntries,
    hash: HashCache,
}

impl Patient {
    pub fn base(&self) -> &ResourceBase {
        &self.base
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn active(&self) -> Option<bool> {
        self.active
    }

    pub fn name(&self) -> &[HumanName] {
        &self.name
    }

    pub fn gender(&self) -> Option<AdministrativeGender> {
        self.gender
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    /// The patient's nominated primary care providers.
    pub fn general_practitioner(&self) -> &[Reference] {
        &self.general_practitioner
    }

    /// Custodian of the patient record.
    pub fn managing_organization(&self) -> Option<&Reference> {
        self.managing_organization.as_ref()
    }
}

impl Record for Patient {
    type Builder = PatientBuilder;

    const DESCRIPTOR: &'static RecordDescriptor = &RecordDescriptor {
        type_name: "Patient",
        kind: RecordKind::Resource,
        base: RESOURCE_BASE_FIELDS,
        fields: &[
            IDENTIFIER,
            ACTIVE,
            NAME,
            GENDER,
            BIRTH_DATE,
            GENERAL_PRACTITIONER,
            MANAGING_ORGANIZATION,
        ],
    };

    fn builder() -> PatientBuilder {
        PatientBuilder::default()
    }

    fn to_builder(&self) -> PatientBuilder {
        PatientBuilder {
            base: ResourceBaseBuilder::from_base(&self.base),
            identifier: Repeated::restore(self.identifier.clone(), IDENTIFIER.name, &self.missing),
            active: self.active,
            name: Repeated::restore(self.name.clone(), NAME.name, &self.missing),
            gender: self.gender,
            birth_date: self.birth_date,
            general_practitioner: Repeated::restore(
                self.general_practitioner.clone(),
                GENERAL_PRACTITIONER.name,
                &self.missing,
            ),
            managing_organization: self.managing_organization.clone(),
        }
    }

    fn hash_code(&self) -> u64 {
        self.hash.get_or_compute(|| {
            let mut state = DefaultHasher::new();
            Self::DESCRIPTOR.type_name.hash(&mut state);
            self.base.hash(&mut state);
            self.identifier.hash(&mut state);
            self.active.hash(&mut state);
            self.name.hash(&mut state);
            self.gender.hash(&mut state);
            self.birth_date.hash(&mut state);
            self.general_practitioner.hash(&mut state);
            self.managing_organization.hash(&mut state);
            self.missing.hash(&mut state);
            state.finish()
        })
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.identifier == other.identifier
            && self.active == other.active
            && self.name == other.name
            && self.gender == other.gender
            && self.birth_date == other.birth_date
            && self.general_practitioner == other.general_practitioner
            && self.managing_organization == other.managing_organization
            && self.missing == other.missing
    }
}

impl Eq for Patient {}

impl Hash for Patient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Validate for Patient {
    fn validate_fields(&self, validator: &mut Validator) {
        self.base.validate_fields(validator);
        validator.check_entries(IDENTIFIER.name, &self.missing);
        validator.check_entries(NAME.name, &self.missing);
        validator.check_entries(GENERAL_PRACTITIONER.name, &self.missing);
        validator.check_references(&GENERAL_PRACTITIONER, &self.general_practitioner);
        validator.check_reference(&MANAGING_ORGANIZATION, self.managing_organization.as_ref());
    }
}

impl Visitable for Patient {
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
            accept_list(&self.name, NAME.name, NAME.type_name, v);
            accept_field(&self.gender, GENDER.name, v);
            accept_field(&self.birth_date, BIRTH_DATE.name, v);
            accept_list(
                &self.general_practitioner,
                GENERAL_PRACTITIONER.name,
                GENERAL_PRACTITIONER.type_name,
                v,
            );
            accept_field(&self.managing_organization, MANAGING_ORGANIZATION.name, v);
        });
    }
}

/// Builder for [`Patient`].
#[derive(Clone, Debug, Default)]
pub struct PatientBuilder {
    base: ResourceBaseBuilder,
    identifier: Repeated<Identifier>,
    active: Option<bool>,
    name: Repeated<HumanName>,
    gender: Option<AdministrativeGender>,
    birth_date: Option<NaiveDate>,
    general_practitioner: Repeated<Reference>,
    managing_organization: Option<Reference>,
}

impl PatientBuilder {
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

    pub fn add_name<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<HumanName>>,
    {
        self.name.append(values);
        self
    }

    pub fn name<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<HumanName>>,
    {
        self.name.replace(values);
        self
    }

    pub fn gender(mut self, gender: impl Into<Option<AdministrativeGender>>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn birth_date(mut self, birth_date: impl Into<Option<NaiveDate>>) -> Self {
        self.birth_date = birth_date.into();
        self
    }

    pub fn add_general_practitioner<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Reference>>,
    {
        self.general_practitioner.append(values);
        self
    }

    pub fn general_practitioner<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Reference>>,
    {
        self.general_practitioner.replace(values);
        self
    }

    pub fn managing_organization(
        mut self,
        managing_organization: impl Into<Option<Reference>>,
    ) -> Self {
        self.managing_organization = managing_organization.into();
        self
    }
}

impl ResourceBuilder for PatientBuilder {
    type Output = Patient;

    fn base_mut(&mut self) -> &mut ResourceBaseBuilder {
        &mut self.base
    }

    fn build(self) -> Result<Patient, ValidationErrors> {
        let config = self.base.config();
        let mut missing = MissingEntries::default();
        let patient = Patient {
            base: self.base.freeze(),
            identifier: self.identifier.freeze(IDENTIFIER.name, &mut missing),
            active: self.active,
            name: self.name.freeze(NAME.name, &mut missing),
            gender: self.gender,
            birth_date: self.birth_date,
            general_practitioner: self
                .general_practitioner
                .freeze(GENERAL_PRACTITIONER.name, &mut missing),
            managing_organization: self.managing_organization,
            missing,
            hash: HashCache::default(),
        };
        finish(patient, config)
    }
}

// ============================================================================
// Wire model
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct PatientWire {
    #[serde(default)]
    identifier: Vec<Identifier>,
    active: Option<bool>,
    #[serde(default)]
    name: Vec<HumanName>,
    gender: Option<AdministrativeGender>,
    birth_date: Option<NaiveDate>,
    #[serde(default)]
    general_practitioner: Vec<Reference>,
    managing_organization: Option<Reference>,
}

impl PatientWire {
    pub(crate) fn into_record(self, base: ResourceBaseBuilder) -> Result<Patient, ValidationErrors> {
        PatientBuilder {
            base,
            ..PatientBuilder::default()
        }
        .identifier(self.identifier)
        .active(self.active)
        .name(self.name)
        .gender(self.gender)
        .birth_date(self.birth_date)
        .general_practitioner(self.general_practitioner)
        .managing_organization(self.managing_organization)
        .validating(false)
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::NameUse;
    use crate::validation::ValidationError;
    use crate::visitor::collect_paths;
    use vpr_types::{Id, NonEmptyText};

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).expect("text")
    }

    fn official_name() -> HumanName {
        HumanName {
            use_: Some(NameUse::Official),
            family: Some(text("Williams")),
            given: vec![text("Sarah"), text("Jane")],
        }
    }

    fn sample() -> Patient {
        Patient::builder()
            .id(Id::new("90a8d1ea318041d9adb070a834d4e0f6").expect("id"))
            .add_name([official_name()])
            .gender(AdministrativeGender::Female)
            .birth_date(NaiveDate::from_ymd_opt(1992, 3, 20).expect("date"))
            .add_general_practitioner([Reference::to("Practitioner/gp1").expect("reference")])
            .managing_organization(Reference::to("Organization/acme").expect("reference"))
            .build()
            .expect("valid patient")
    }

    #[test]
    fn minimal_patient_builds() {
        let patient = Patient::builder().build().expect("no required fields");
        assert!(patient.name().is_empty());
        assert!(patient.base().id().is_none());
    }

    #[test]
    fn round_trip_through_builder() {
        let patient = sample();
        assert_eq!(patient.to_builder().build().expect("rebuild"), patient);
    }

    #[test]
    fn missing_name_entry_fails_only_when_validating() {
        let staged = || Patient::builder().add_name([None::<HumanName>]);

        let err = staged().build().expect_err("gap in name");
        assert!(matches!(
            err.first(),
            Some(ValidationError::Structural { field, index: 0 }) if field == "name"
        ));

        let patient = staged().validating(false).build().expect("validation disabled");
        assert!(patient.name().is_empty());
        assert_ne!(patient, Patient::builder().build().expect("empty patient"));
    }

    #[test]
    fn general_practitioner_targets_are_checked() {
        let err = sample()
            .to_builder()
            .add_general_practitioner([Reference::to("Patient/p2").expect("reference")])
            .build()
            .expect_err("patient is not a practitioner");
        assert!(matches!(
            err.first(),
            Some(ValidationError::ReferenceType { field, .. }) if field == "generalPractitioner[1]"
        ));
    }

    #[test]
    fn traversal_follows_declared_order() {
        assert_eq!(
            collect_paths(&sample()),
            vec![
                "Patient",
                "Patient.id",
                "Patient.name[0]",
                "Patient.name[0].use",
                "Patient.name[0].family",
                "Patient.name[0].given[0]",
                "Patient.name[0].given[1]",
                "Patient.gender",
                "Patient.birthDate",
                "Patient.generalPractitioner[0]",
                "Patient.generalPractitioner[0].reference",
                "Patient.managingOrganization",
                "Patient.managingOrganization.reference",
            ]
        );
    }

    #[test]
    fn gender_codes_are_lowercase() {
        assert_eq!(AdministrativeGender::Unknown.as_str(), "unknown");
        let parsed: AdministrativeGender = serde_yaml::from_str("female").expect("gender");
        assert_eq!(parsed, AdministrativeGender::Female);
        assert!(serde_yaml::from_str::<AdministrativeGender>("F").is_err());
    }
}
