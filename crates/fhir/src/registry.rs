//! Known resource type names and the descriptors of the modelled types.

use crate::account::{Account, AccountCoverage, AccountGuarantor};
use crate::base::Record;
use crate::descriptor::RecordDescriptor;
use crate::organization::Organization;
use crate::patient::Patient;

/// Every concrete FHIR R4B (4.3.0) resource type, in alphabetical order.
static RESOURCE_TYPES: &[&str] = &[
    "Account",
    "ActivityDefinition",
    "AdministrableProductDefinition",
    "AdverseEvent",
    "AllergyIntolerance",
    "Appointment",
    "AppointmentResponse",
    "AuditEvent",
    "Basic",
    "Binary",
    "BiologicallyDerivedProduct",
    "BodyStructure",
    "Bundle",
    "CapabilityStatement",
    "CarePlan",
    "CareTeam",
    "CatalogEntry",
    "ChargeItem",
    "ChargeItemDefinition",
    "Citation",
    "Claim",
    "ClaimResponse",
    "ClinicalImpression",
    "ClinicalUseDefinition",
    "CodeSystem",
    "Communication",
    "CommunicationRequest",
    "CompartmentDefinition",
    "Composition",
    "ConceptMap",
    "Condition",
    "Consent",
    "Contract",
    "Coverage",
    "CoverageEligibilityRequest",
    "CoverageEligibilityResponse",
    "DetectedIssue",
    "Device",
    "DeviceDefinition",
    "DeviceMetric",
    "DeviceRequest",
    "DeviceUseStatement",
    "DiagnosticReport",
    "DocumentManifest",
    "DocumentReference",
    "Encounter",
    "Endpoint",
    "EnrollmentRequest",
    "EnrollmentResponse",
    "EpisodeOfCare",
    "EventDefinition",
    "Evidence",
    "EvidenceReport",
    "EvidenceVariable",
    "ExampleScenario",
    "ExplanationOfBenefit",
    "FamilyMemberHistory",
    "Flag",
    "Goal",
    "GraphDefinition",
    "Group",
    "GuidanceResponse",
    "HealthcareService",
    "ImagingStudy",
    "Immunization",
    "ImmunizationEvaluation",
    "ImmunizationRecommendation",
    "ImplementationGuide",
    "Ingredient",
    "InsurancePlan",
    "Invoice",
    "Library",
    "Linkage",
    "List",
    "Location",
    "ManufacturedItemDefinition",
    "Measure",
    "MeasureReport",
    "Media",
    "Medication",
    "MedicationAdministration",
    "MedicationDispense",
    "MedicationKnowledge",
    "MedicationRequest",
    "MedicationStatement",
    "MedicinalProductDefinition",
    "MessageDefinition",
    "MessageHeader",
    "MolecularSequence",
    "NamingSystem",
    "NutritionOrder",
    "NutritionProduct",
    "Observation",
    "ObservationDefinition",
    "OperationDefinition",
    "OperationOutcome",
    "Organization",
    "OrganizationAffiliation",
    "PackagedProductDefinition",
    "Parameters",
    "Patient",
    "PaymentNotice",
    "PaymentReconciliation",
    "Person",
    "PlanDefinition",
    "Practitioner",
    "PractitionerRole",
    "Procedure",
    "Provenance",
    "Questionnaire",
    "QuestionnaireResponse",
    "RegulatedAuthorization",
    "RelatedPerson",
    "RequestGroup",
    "ResearchDefinition",
    "ResearchElementDefinition",
    "ResearchStudy",
    "ResearchSubject",
    "RiskAssessment",
    "Schedule",
    "SearchParameter",
    "ServiceRequest",
    "Slot",
    "Specimen",
    "SpecimenDefinition",
    "StructureDefinition",
    "StructureMap",
    "Subscription",
    "SubscriptionStatus",
    "SubscriptionTopic",
    "Substance",
    "SubstanceDefinition",
    "SupplyDelivery",
    "SupplyRequest",
    "Task",
    "TerminologyCapabilities",
    "TestReport",
    "TestScript",
    "ValueSet",
    "VerificationResult",
    "VisionPrescription",
];

/// True if `name` is a concrete resource type. Abstract `Resource` and `DomainResource` are
/// not.
pub fn is_resource_type(name: &str) -> bool {
    RESOURCE_TYPES.binary_search(&name).is_ok()
}

pub fn resource_types() -> &'static [&'static str] {
    RESOURCE_TYPES
}

/// Descriptor of a modelled resource or backbone element (`Account.coverage`).
pub fn descriptor(type_name: &str) -> Option<&'static RecordDescriptor> {
    modelled_descriptors()
        .iter()
        .copied()
        .find(|d| d.type_name == type_name)
}

/// Descriptors of every modelled type, resources before their backbone elements.
pub fn modelled_descriptors() -> &'static [&'static RecordDescriptor] {
    static MODELLED: &[&RecordDescriptor] = &[
        Account::DESCRIPTOR,
        AccountCoverage::DESCRIPTOR,
        AccountGuarantor::DESCRIPTOR,
        Organization::DESCRIPTOR,
        Patient::DESCRIPTOR,
    ];
    MODELLED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RecordKind;

    #[test]
    fn type_list_is_sorted_for_binary_search() {
        assert!(RESOURCE_TYPES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(resource_types().len(), RESOURCE_TYPES.len());
    }

    #[test]
    fn concrete_types_are_known() {
        for name in ["Account", "Patient", "Coverage", "VisionPrescription", "Group"] {
            assert!(is_resource_type(name), "{name}");
        }
    }

    #[test]
    fn r4b_product_and_evidence_types_are_known() {
        for name in [
            "PackagedProductDefinition",
            "ClinicalUseDefinition",
            "Citation",
            "EvidenceReport",
            "SubscriptionTopic",
            "Ingredient",
            "RegulatedAuthorization",
        ] {
            assert!(is_resource_type(name), "{name}");
        }
        assert_eq!(resource_types().len(), 141);
    }

    #[test]
    fn types_retired_before_r4b_are_not_known() {
        for name in [
            "MedicinalProduct",
            "MedicinalProductPackaged",
            "EffectEvidenceSynthesis",
            "RiskEvidenceSynthesis",
            "SubstanceSpecification",
        ] {
            assert!(!is_resource_type(name), "{name}");
        }
    }

    #[test]
    fn abstract_and_unknown_types_are_not() {
        for name in ["Resource", "DomainResource", "patient", "Spaceship", ""] {
            assert!(!is_resource_type(name), "{name:?}");
        }
    }

    #[test]
    fn descriptors_cover_resources_and_backbone_paths() {
        let account = descriptor("Account").expect("Account modelled");
        assert_eq!(account.kind, RecordKind::Resource);

        let coverage = descriptor("Account.coverage").expect("coverage modelled");
        assert_eq!(coverage.kind, RecordKind::BackboneElement);
        assert_eq!(
            coverage.field("coverage").map(|f| f.reference_targets),
            Some(&["Coverage"][..])
        );

        assert!(descriptor("Coverage").is_none());
        assert_eq!(modelled_descriptors().len(), 5);
    }
}
