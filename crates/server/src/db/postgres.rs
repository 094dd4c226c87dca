use async_trait::async_trait;
use deadpool_postgres::Pool;
use patient_core::query::escape_like;
use patient_core::{NewPatient, Patient, PatientFilter, PatientPatch};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use super::store::{PatientStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS patients (
    id          TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    gender      TEXT NOT NULL,
    birth_date  DATE,
    email       TEXT,
    phone       TEXT,
    address     TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS patients_created_at_idx ON patients (created_at);
";

const COLUMNS: &str =
    "id, first_name, last_name, gender, birth_date, email, phone, address, created_at, updated_at";

type Param<'a> = &'a (dyn ToSql + Sync);

/// PostgreSQL-backed Patient store
#[derive(Clone)]
pub struct PgPatientStore {
    pool: Pool,
}

impl PgPatientStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the `patients` table and its index if they don't exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        Ok(())
    }
}

fn row_to_patient(row: &Row) -> Result<Patient, tokio_postgres::Error> {
    Ok(Patient {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        gender: row.try_get("gender")?,
        birth_date: row.try_get("birth_date")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Append `column = $n` when the patch carries a value for it
fn push_set<'a, T>(
    sets: &mut Vec<String>,
    params: &mut Vec<Param<'a>>,
    column: &str,
    value: Option<&'a T>,
) where
    T: ToSql + Sync,
{
    if let Some(value) = value {
        params.push(value);
        sets.push(format!("{} = ${}", column, params.len()));
    }
}

#[async_trait]
impl PatientStore for PgPatientStore {
    async fn insert(&self, new: NewPatient) -> Result<Patient, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let row = tx
            .query_one(
                &format!(
                    "INSERT INTO patients \
                     (first_name, last_name, gender, birth_date, email, phone, address) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
                    COLUMNS
                ),
                &[
                    &new.first_name,
                    &new.last_name,
                    &new.gender,
                    &new.birth_date,
                    &new.email,
                    &new.phone,
                    &new.address,
                ],
            )
            .await?;
        let patient = row_to_patient(&row)?;
        tx.commit().await?;
        Ok(patient)
    }

    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StoreError> {
        let first_name = filter
            .first_name
            .as_deref()
            .map(|v| format!("%{}%", escape_like(v)));
        let last_name = filter
            .last_name
            .as_deref()
            .map(|v| format!("%{}%", escape_like(v)));

        let mut clauses = Vec::new();
        let mut params: Vec<Param<'_>> = Vec::new();
        if let Some(ref pattern) = first_name {
            params.push(pattern);
            clauses.push(format!("first_name ILIKE ${}", params.len()));
        }
        if let Some(ref pattern) = last_name {
            params.push(pattern);
            clauses.push(format!("last_name ILIKE ${}", params.len()));
        }
        if let Some(ref gender) = filter.gender {
            params.push(gender);
            clauses.push(format!("gender = ${}", params.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        params.push(&filter.limit);
        params.push(&filter.offset);
        let sql = format!(
            "SELECT {} FROM patients {} ORDER BY created_at ASC LIMIT ${} OFFSET ${}",
            COLUMNS,
            where_clause,
            params.len() - 1,
            params.len()
        );

        let client = self.pool.get().await?;
        let rows = client.query(&sql, &params).await?;
        Ok(rows
            .iter()
            .map(row_to_patient)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get(&self, id: &str) -> Result<Option<Patient>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {} FROM patients WHERE id = $1", COLUMNS),
                &[&id],
            )
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_patient(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: &str, patch: &PatientPatch) -> Result<Option<Patient>, StoreError> {
        let mut sets = Vec::new();
        let mut params: Vec<Param<'_>> = Vec::new();
        params.push(&id);
        push_set(&mut sets, &mut params, "first_name", patch.first_name.as_present());
        push_set(&mut sets, &mut params, "last_name", patch.last_name.as_present());
        push_set(&mut sets, &mut params, "gender", patch.gender.as_present());
        push_set(&mut sets, &mut params, "birth_date", patch.birth_date.as_present());
        push_set(&mut sets, &mut params, "email", patch.email.as_present());
        push_set(&mut sets, &mut params, "phone", patch.phone.as_present());
        push_set(&mut sets, &mut params, "address", patch.address.as_present());
        sets.push("updated_at = GREATEST(clock_timestamp(), created_at)".to_string());

        let sql = format!(
            "UPDATE patients SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            COLUMNS
        );

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let row = tx.query_opt(&sql, &params).await?;
        let patient = row.as_ref().map(row_to_patient).transpose()?;
        tx.commit().await?;
        Ok(patient)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let deleted = tx
            .execute("DELETE FROM patients WHERE id = $1", &[&id])
            .await?;
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}
