//! Closed set of modelled resource types.

use crate::account::Account;
use crate::base::{Record, ResourceBase};
use crate::config::ModelConfig;
use crate::organization::Organization;
use crate::patient::Patient;
use crate::validation::{Validate, ValidationErrors, Validator};
use crate::visitor::{NodeKind, Visitable, Visitor};
use std::any::Any;

/// Any modelled resource. Used for contained resources and for parsed documents.
///
/// Two values are equal only when they hold the same resource type with equal fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyResource {
    Account(Account),
    Organization(Organization),
    Patient(Patient),
}

impl AnyResource {
    pub fn type_name(&self) -> &'static str {
        self.as_visitable().type_name()
    }

    pub fn base(&self) -> &ResourceBase {
        match self {
            AnyResource::Account(r) => r.base(),
            AnyResource::Organization(r) => r.base(),
            AnyResource::Patient(r) => r.base(),
        }
    }

    /// Run the validator over the wrapped resource.
    ///
    /// # Errors
    ///
    /// Returns every error found in the wrapped resource and anything it contains.
    pub fn validate(&self, config: ModelConfig) -> Result<(), ValidationErrors> {
        match self {
            AnyResource::Account(r) => r.validate(config),
            AnyResource::Organization(r) => r.validate(config),
            AnyResource::Patient(r) => r.validate(config),
        }
    }

    pub fn hash_code(&self) -> u64 {
        match self {
            AnyResource::Account(r) => r.hash_code(),
            AnyResource::Organization(r) => r.hash_code(),
            AnyResource::Patient(r) => r.hash_code(),
        }
    }

    pub fn as_account(&self) -> Option<&Account> {
        match self {
            AnyResource::Account(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_organization(&self) -> Option<&Organization> {
        match self {
            AnyResource::Organization(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            AnyResource::Patient(r) => Some(r),
            _ => None,
        }
    }

    fn as_visitable(&self) -> &dyn Visitable {
        match self {
            AnyResource::Account(r) => r,
            AnyResource::Organization(r) => r,
            AnyResource::Patient(r) => r,
        }
    }
}

impl From<Account> for AnyResource {
    fn from(value: Account) -> Self {
        AnyResource::Account(value)
    }
}

impl From<Organization> for AnyResource {
    fn from(value: Organization) -> Self {
        AnyResource::Organization(value)
    }
}

impl From<Patient> for AnyResource {
    fn from(value: Patient) -> Self {
        AnyResource::Patient(value)
    }
}

impl Validate for AnyResource {
    fn validate_fields(&self, validator: &mut Validator) {
        match self {
            AnyResource::Account(r) => r.validate_fields(validator),
            AnyResource::Organization(r) => r.validate_fields(validator),
            AnyResource::Patient(r) => r.validate_fields(validator),
        }
    }
}

/// Traversal is transparent: visitors see the wrapped resource itself.
impl Visitable for AnyResource {
    fn type_name(&self) -> &'static str {
        self.as_visitable().type_name()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Resource
    }

    fn as_any(&self) -> &dyn Any {
        self.as_visitable().as_any()
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        self.as_visitable().accept(name, index, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ResourceBuilder;
    use crate::datatypes::Reference;
    use crate::visitor::{collect, collect_paths};
    use vpr_types::Id;

    fn organization(id: &str) -> Organization {
        Organization::builder()
            .id(Id::new(id).expect("id"))
            .build()
            .expect("organization")
    }

    #[test]
    fn wrapping_is_transparent_to_visitors() {
        let wrapped = AnyResource::from(organization("acme"));
        assert_eq!(wrapped.type_name(), "Organization");
        assert_eq!(
            collect_paths(&wrapped),
            vec!["Organization", "Organization.id"]
        );
        assert!(wrapped.as_any().downcast_ref::<Organization>().is_some());
    }

    #[test]
    fn collecting_visitor_finds_contained_resources() {
        let patient = Patient::builder()
            .add_contained([
                AnyResource::from(organization("a")),
                AnyResource::from(organization("b")),
            ])
            .managing_organization(Reference::to("#a").expect("reference"))
            .build()
            .expect("patient");

        let found: Vec<Organization> = collect(&patient);
        let ids: Vec<&str> = found
            .iter()
            .filter_map(|o| o.base().id().map(Id::as_str))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            collect_paths(&patient)[..3],
            ["Patient", "Patient.contained[0]", "Patient.contained[0].id"]
        );
    }

    #[test]
    fn accessors_match_variant() {
        let wrapped = AnyResource::from(organization("acme"));
        assert!(wrapped.as_organization().is_some());
        assert!(wrapped.as_account().is_none());
        assert!(wrapped.as_patient().is_none());
        assert_eq!(
            wrapped.base().id().map(Id::as_str),
            Some("acme")
        );
        assert_eq!(wrapped.hash_code(), organization("acme").hash_code());
    }
}
