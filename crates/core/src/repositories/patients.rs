//! Patient registration.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::{clamp_page, like_pattern};
use api_shared::models::Patient;
use api_shared::requests::PatientReq;
use sqlx::PgPool;
use uuid::Uuid;

const PATIENT_COLUMNS: &str = "id, full_name, cpf, birth_date, gender, phone, email, insurer, \
     insurance_plan, insurance_card_number, notes, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PatientsRepository {
    pool: PgPool,
}

impl PatientsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a patient. CPF is unique across the clinic.
    pub async fn create(&self, req: &PatientReq) -> OpxResult<Patient> {
        let query = format!(
            "INSERT INTO patients (id, full_name, cpf, birth_date, gender, phone, email, \
             insurer, insurance_plan, insurance_card_number, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {PATIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(Uuid::new_v4())
            .bind(req.full_name.as_str())
            .bind(req.cpf.as_str())
            .bind(req.birth_date)
            .bind(req.gender.as_deref())
            .bind(req.phone.as_deref())
            .bind(req.email.as_ref().map(|e| e.as_str()))
            .bind(req.insurer.as_deref())
            .bind(req.insurance_plan.as_deref())
            .bind(req.insurance_card_number.as_deref())
            .bind(req.notes.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!(
                        "a patient with CPF {} already exists",
                        req.cpf.formatted()
                    ))
                } else {
                    e
                }
            })
    }

    pub async fn get(&self, id: Uuid) -> OpxResult<Patient> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("patient"))
    }

    /// Lists active patients, optionally filtered by name or CPF substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<Patient>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE active"
        ));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR cpf LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY full_name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        Ok(builder
            .build_query_as::<Patient>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update(&self, id: Uuid, req: &PatientReq) -> OpxResult<Patient> {
        let query = format!(
            "UPDATE patients SET full_name = $2, cpf = $3, birth_date = $4, gender = $5, \
             phone = $6, email = $7, insurer = $8, insurance_plan = $9, \
             insurance_card_number = $10, notes = $11, updated_at = now()
             WHERE id = $1
             RETURNING {PATIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(req.full_name.as_str())
            .bind(req.cpf.as_str())
            .bind(req.birth_date)
            .bind(req.gender.as_deref())
            .bind(req.phone.as_deref())
            .bind(req.email.as_ref().map(|e| e.as_str()))
            .bind(req.insurer.as_deref())
            .bind(req.insurance_plan.as_deref())
            .bind(req.insurance_card_number.as_deref())
            .bind(req.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("patient"))
    }

    /// Soft-deletes: the patient disappears from listings but existing
    /// orders keep their reference.
    pub async fn deactivate(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE patients SET active = false, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("patient"));
        }
        Ok(())
    }
}
