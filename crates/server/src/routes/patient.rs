//! Patient resource HTTP handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use patient_core::{ListParams, NewPatient, Patient, PatientPatch, is_not_modified, patient_etag};

use crate::db::SharedStore;
use crate::error::AppError;
use crate::extract::{ValidJson, ValidQuery};

const NOT_FOUND: &str = "Patient not found";

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid header value {:?}: {}", value, e)))
}

/// `ETag` header carrying the freshness token of `patient`
fn etag_headers(patient: &Patient) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ETAG, header_value(&patient_etag(patient))?);
    Ok(headers)
}

/// POST /patients - Create a new patient
pub async fn create(
    State(store): State<SharedStore>,
    ValidJson(body): ValidJson<NewPatient>,
) -> Result<impl IntoResponse, AppError> {
    body.validate(Utc::now().date_naive())?;

    let patient = store.insert(body).await?;
    tracing::info!(patient_id = %patient.id, "Patient created");

    let mut headers = etag_headers(&patient)?;
    headers.insert(
        header::LOCATION,
        header_value(&format!("/patients/{}", patient.id))?,
    );

    Ok((StatusCode::CREATED, headers, Json(patient)))
}

/// GET /patients - List patients matching the query filters
pub async fn list(
    State(store): State<SharedStore>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let filter = params.into_filter()?;
    let patients = store.list(&filter).await?;
    Ok(Json(patients))
}

/// GET /patients/{id} - Read a patient, honouring `If-None-Match`
pub async fn read(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let patient = store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    let etag = patient_etag(&patient);
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::ETAG, header_value(&etag)?);

    if is_not_modified(if_none_match, &etag) {
        tracing::debug!(patient_id = %id, "Patient not modified");
        return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
    }

    Ok((StatusCode::OK, response_headers, Json(patient)).into_response())
}

/// PUT /patients/{id} - Apply a partial update
pub async fn update(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<PatientPatch>,
) -> Result<impl IntoResponse, AppError> {
    body.validate(Utc::now().date_naive())?;

    match store.update(&id, &body).await? {
        Some(patient) => {
            tracing::info!(patient_id = %patient.id, "Patient updated");
            let headers = etag_headers(&patient)?;
            Ok((StatusCode::OK, headers, Json(patient)))
        }
        None => Err(AppError::NotFound(NOT_FOUND.to_string())),
    }
}

/// DELETE /patients/{id} - Permanently remove a patient
pub async fn delete(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if store.delete(&id).await? {
        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(NOT_FOUND.to_string()))
    }
}
