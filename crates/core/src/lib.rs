//! patient-core: Patient record types and request rules
//!
//! This crate holds everything about the Patient resource that does not
//! touch I/O: the create/update/read shapes, list filter validation,
//! freshness tokens, and the error body shared by all endpoints.

pub mod error;
pub mod etag;
pub mod outcome;
pub mod patch;
pub mod patient;
pub mod query;

pub use error::{FieldIssue, ValidationError};
pub use etag::{is_not_modified, patient_etag, weak_etag};
pub use outcome::ErrorBody;
pub use patch::Patch;
pub use patient::{NewPatient, Patient, PatientPatch, generate_id};
pub use query::{ListParams, PatientFilter};
