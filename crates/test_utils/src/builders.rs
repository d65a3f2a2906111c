//! Test Data Builders
//!
//! Builders for premium request documents. Tests name only the attributes
//! they care about; identifiers default to fresh UUIDs.

use core_kernel::{ApplicationFormId, CoverageId, UuidIdGenerator};
use domain_application::{
    ApplicationEnvelope, ApplicationInput, ClientInput, CoverageDetailInput, CoverageInput, FieldValue, RoleInput,
};

/// Role code attached to insured roles built here
pub const INSURED_ROLE_CODE: &str = "INSURED";
/// Role code attached to owner roles built here
pub const OWNER_ROLE_CODE: &str = "OWNER";

fn role(code: &str, client: ClientInput) -> RoleInput {
    let role_id: String = UuidIdGenerator.generate();
    RoleInput {
        role_id: Some(FieldValue::new(role_id)),
        role_code: Some(FieldValue::from(code)),
        client: Some(client),
    }
}

/// Builder for a client
#[derive(Debug, Clone, Default)]
pub struct ClientInputBuilder {
    client: ClientInput,
}

impl ClientInputBuilder {
    /// Creates a client with a generated id and nothing else set
    pub fn new() -> Self {
        let client_id: String = UuidIdGenerator.generate();
        Self {
            client: ClientInput {
                client_id: Some(FieldValue::new(client_id)),
                ..ClientInput::default()
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.client.client_name = Some(name.into());
        self
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.client.gender = Some(gender.into());
        self
    }

    pub fn with_date_of_birth(mut self, date: &str) -> Self {
        self.client.date_of_birth = Some(date.into());
        self
    }

    /// Sets the tobacco answer verbatim
    pub fn with_tobacco(mut self, status: &str) -> Self {
        self.client.tobacco_status = Some(status.into());
        self
    }

    pub fn smoker(self) -> Self {
        self.with_tobacco("Smoker")
    }

    pub fn non_smoker(self) -> Self {
        self.with_tobacco("Non-Smoker")
    }

    pub fn build(self) -> ClientInput {
        self.client
    }
}

/// Builder for a coverage line
///
/// Defaults to a base coverage with a face amount of 100000 and no
/// underwriting details.
#[derive(Debug, Clone)]
pub struct CoverageInputBuilder {
    coverage: CoverageInput,
    details: CoverageDetailInput,
}

impl Default for CoverageInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageInputBuilder {
    pub fn new() -> Self {
        let coverage_id: CoverageId = UuidIdGenerator.generate();
        Self {
            coverage: CoverageInput {
                coverage_id: Some(FieldValue::new(coverage_id.as_str())),
                coverage_definition_id: Some("BASE-TERM".into()),
                ..CoverageInput::default()
            },
            details: CoverageDetailInput {
                face_amount: Some("100000".into()),
                ..CoverageDetailInput::default()
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.coverage.coverage_id = Some(id.into());
        self
    }

    pub fn without_id(mut self) -> Self {
        self.coverage.coverage_id = None;
        self
    }

    pub fn with_definition(mut self, definition: &str) -> Self {
        self.coverage.coverage_definition_id = Some(definition.into());
        self
    }

    /// Uses a rider definition, rated at the non-base rate
    pub fn rider(self) -> Self {
        self.with_definition("ADB-RIDER")
    }

    pub fn with_face_amount(mut self, amount: &str) -> Self {
        self.details.face_amount = Some(amount.into());
        self
    }

    pub fn without_face_amount(mut self) -> Self {
        self.details.face_amount = None;
        self
    }

    /// Sets the table rating percent, e.g. `"150"`
    pub fn with_table_rating(mut self, percent: &str) -> Self {
        self.details.table_rating_percent = Some(percent.into());
        self
    }

    /// Sets the underwriting class code, e.g. `"03"`
    pub fn with_underwriting_class(mut self, code: &str) -> Self {
        self.details.underwriting_class = Some(code.into());
        self
    }

    /// Adds an insured role for the client
    pub fn with_insured(mut self, client: ClientInput) -> Self {
        self.coverage.roles.push(role(INSURED_ROLE_CODE, client));
        self
    }

    pub fn build(mut self) -> CoverageInput {
        self.coverage.details = Some(self.details);
        self.coverage
    }
}

/// Builder for a whole application
#[derive(Debug, Clone)]
pub struct ApplicationInputBuilder {
    application: ApplicationInput,
}

impl Default for ApplicationInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationInputBuilder {
    /// Creates an application with generated form and plan ids and no coverages
    pub fn new() -> Self {
        let form_id: ApplicationFormId = UuidIdGenerator.generate();
        let plan_id: String = UuidIdGenerator.generate();
        Self {
            application: ApplicationInput {
                application_form_id: Some(FieldValue::new(form_id.as_str())),
                plan_id: Some(FieldValue::new(plan_id)),
                ..ApplicationInput::default()
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.application.application_form_id = Some(id.into());
        self
    }

    pub fn without_id(mut self) -> Self {
        self.application.application_form_id = None;
        self
    }

    pub fn with_owner(mut self, client: ClientInput) -> Self {
        self.application.roles.push(role(OWNER_ROLE_CODE, client));
        self
    }

    pub fn with_coverage(mut self, coverage: CoverageInput) -> Self {
        self.application.coverages.push(coverage);
        self
    }

    pub fn build(self) -> ApplicationInput {
        self.application
    }

    /// Wraps the application the way the front end posts it
    pub fn build_envelope(self) -> ApplicationEnvelope {
        ApplicationEnvelope {
            application: self.application,
        }
    }

    /// The posted JSON body
    pub fn build_json(self) -> serde_json::Value {
        serde_json::to_value(self.build_envelope()).unwrap_or_default()
    }
}
