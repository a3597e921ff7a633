//! FHIR resource model for the VPR record crates.
//!
//! This crate provides a generic **structured-record framework** and the resource types built on
//! it:
//! - static field descriptor tables per record type ([`descriptor`], [`registry`])
//! - immutable records produced by single-owner builders ([`base`], [`builder`])
//! - a validator that accumulates structural, reference and required-field errors
//!   ([`validation`])
//! - field-wise equality with a cached hash
//! - a four-phase visitor over every record, element and primitive ([`visitor`])
//! - a strict YAML wire boundary built on the visitor ([`yaml`])
//!
//! Modelled resources: [`Account`] (with [`AccountCoverage`] and [`AccountGuarantor`]),
//! [`Organization`] and [`Patient`].
//!
//! Configuration is passed in explicitly through [`ModelConfig`]; this crate never reads
//! environment variables itself.

pub mod account;
pub mod base;
pub mod builder;
pub mod config;
pub mod datatypes;
pub mod descriptor;
pub mod organization;
pub mod patient;
pub mod registry;
pub mod resource;
pub mod validation;
pub mod visitor;
pub mod yaml;

// Re-export record types and their builders
pub use account::{
    Account, AccountBuilder, AccountCoverage, AccountCoverageBuilder, AccountGuarantor,
    AccountGuarantorBuilder, AccountStatus,
};
pub use organization::{Organization, OrganizationBuilder};
pub use patient::{AdministrativeGender, Patient, PatientBuilder};
pub use resource::AnyResource;

// Re-export framework types
pub use base::{BackboneBuilder, Record, ResourceBuilder};
pub use config::ModelConfig;
pub use descriptor::{Cardinality, FieldDescriptor, RecordDescriptor};
pub use validation::{ValidationError, ValidationErrors};
pub use visitor::{Visitable, Visitor};

/// Traits needed to build and inspect records.
pub mod prelude {
    pub use crate::base::{BackboneBuilder, Record, ResourceBuilder};
    pub use crate::visitor::Visitable;
}

/// Errors returned by the `fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
