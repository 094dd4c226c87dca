//! Patient transfer shapes
//!
//! - [`NewPatient`]: body of a create request
//! - [`PatientPatch`]: body of an update request, every field optional
//! - [`Patient`]: the stored record, returned by every endpoint

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Issues, ValidationError};
use crate::patch::Patch;

const NAME_MAX: usize = 100;
const GENDER_MAX: usize = 32;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 32;
const ADDRESS_MAX: usize = 500;

/// Generate a fresh patient identifier
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// A stored patient record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Build a record from a create request, with identity and creation time
    /// supplied by the store.
    pub fn from_new(id: String, new: NewPatient, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            gender: new.gender,
            birth_date: new.birth_date,
            email: new.email,
            phone: new.phone,
            address: new.address,
            created_at,
            updated_at: None,
        }
    }

    /// Instant of the last mutation: `updated_at` once set, else `created_at`.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Apply the supplied fields of `patch` and stamp `updated_at`.
    ///
    /// `updated_at` is clamped so it never falls before `created_at`.
    pub fn apply(&mut self, patch: &PatientPatch, now: DateTime<Utc>) {
        patch.first_name.apply_to(&mut self.first_name);
        patch.last_name.apply_to(&mut self.last_name);
        patch.gender.apply_to(&mut self.gender);
        patch.birth_date.apply_to(&mut self.birth_date);
        patch.email.apply_to(&mut self.email);
        patch.phone.apply_to(&mut self.phone);
        patch.address.apply_to(&mut self.address);
        self.updated_at = Some(now.max(self.created_at));
    }
}

/// Body of `POST /patients`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewPatient {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let mut issues = Issues::default();
        issues.max_len("first_name", &self.first_name, NAME_MAX);
        issues.max_len("last_name", &self.last_name, NAME_MAX);
        issues.max_len("gender", &self.gender, GENDER_MAX);
        check_optional(
            &mut issues,
            self.birth_date,
            self.email.as_deref(),
            self.phone.as_deref(),
            self.address.as_deref(),
            today,
        );
        issues.finish()
    }
}

/// Body of `PUT /patients/{id}`. Only supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatientPatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub first_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub last_name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub gender: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub birth_date: Patch<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub email: Patch<Option<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub phone: Patch<Option<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub address: Patch<Option<String>>,
}

impl PatientPatch {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let mut issues = Issues::default();
        if let Some(v) = self.first_name.as_present() {
            issues.max_len("first_name", v, NAME_MAX);
        }
        if let Some(v) = self.last_name.as_present() {
            issues.max_len("last_name", v, NAME_MAX);
        }
        if let Some(v) = self.gender.as_present() {
            issues.max_len("gender", v, GENDER_MAX);
        }
        check_optional(
            &mut issues,
            self.birth_date.as_present().copied().flatten(),
            self.email.as_present().and_then(|v| v.as_deref()),
            self.phone.as_present().and_then(|v| v.as_deref()),
            self.address.as_present().and_then(|v| v.as_deref()),
            today,
        );
        issues.finish()
    }
}

fn check_optional(
    issues: &mut Issues,
    birth_date: Option<NaiveDate>,
    email: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
    today: NaiveDate,
) {
    if birth_date.is_some_and(|d| d > today) {
        issues.push("birth_date", "must not be in the future");
    }
    if let Some(email) = email {
        issues.max_len("email", email, EMAIL_MAX);
        if !email.contains('@') {
            issues.push("email", "must contain '@'");
        }
    }
    if let Some(phone) = phone {
        issues.max_len("phone", phone, PHONE_MAX);
    }
    if let Some(address) = address {
        issues.max_len("address", address, ADDRESS_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn sample() -> Patient {
        let new: NewPatient = serde_json::from_value(serde_json::json!({
            "first_name": "Ann",
            "last_name": "Lee",
            "gender": "female",
            "email": "ann@example.com"
        }))
        .unwrap();
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Patient::from_new(generate_id(), new, created)
    }

    #[test]
    fn new_patient_requires_names_and_gender() {
        let err = serde_json::from_value::<NewPatient>(serde_json::json!({
            "first_name": "Ann"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn new_patient_rejects_unknown_fields() {
        let err = serde_json::from_value::<NewPatient>(serde_json::json!({
            "first_name": "Ann",
            "last_name": "Lee",
            "gender": "female",
            "shoe_size": 38
        }));
        assert!(err.is_err());
    }

    #[test]
    fn validation_reports_every_bad_field() {
        let new = NewPatient {
            first_name: "A".repeat(101),
            last_name: "Lee".into(),
            gender: "female".into(),
            birth_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            email: Some("not-an-email".into()),
            phone: None,
            address: None,
        };
        let err = new.validate(today()).unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "birth_date", "email"]);
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let mut patient = sample();
        let before = patient.clone();
        let patch: PatientPatch =
            serde_json::from_value(serde_json::json!({"last_name": "Park", "email": null}))
                .unwrap();
        let now = before.created_at + chrono::Duration::seconds(5);

        patient.apply(&patch, now);

        assert_eq!(patient.first_name, before.first_name);
        assert_eq!(patient.gender, before.gender);
        assert_eq!(patient.created_at, before.created_at);
        assert_eq!(patient.last_name, "Park");
        assert_eq!(patient.email, None);
        assert_eq!(patient.updated_at, Some(now));
        assert_eq!(patient.last_modified(), now);
    }

    #[test]
    fn apply_never_sets_updated_at_before_created_at() {
        let mut patient = sample();
        let earlier = patient.created_at - chrono::Duration::seconds(1);
        patient.apply(&PatientPatch::default(), earlier);
        assert_eq!(patient.updated_at, Some(patient.created_at));
    }

    #[test]
    fn read_shape_serializes_null_updated_at() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["updated_at"].is_null());
        assert_eq!(json["first_name"], "Ann");
        assert!(json["id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
