//! Hospital registry.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::{clamp_page, like_pattern};
use api_shared::models::Hospital;
use api_shared::requests::HospitalReq;
use sqlx::PgPool;
use uuid::Uuid;

const HOSPITAL_COLUMNS: &str =
    "id, name, cnpj, address, city, state, phone, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct HospitalsRepository {
    pool: PgPool,
}

impl HospitalsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &HospitalReq) -> OpxResult<Hospital> {
        let state = req.state.as_str().to_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OpxError::InvalidInput(
                "state must be a two-letter UF code".into(),
            ));
        }
        let query = format!(
            "INSERT INTO hospitals (id, name, cnpj, address, city, state, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {HOSPITAL_COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(Uuid::new_v4())
            .bind(req.name.as_str())
            .bind(req.cnpj.as_str())
            .bind(req.address.as_deref())
            .bind(req.city.as_str())
            .bind(&state)
            .bind(req.phone.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!(
                        "a hospital with CNPJ {} already exists",
                        req.cnpj.formatted()
                    ))
                } else {
                    e
                }
            })
    }

    pub async fn get(&self, id: Uuid) -> OpxResult<Hospital> {
        let query = format!("SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE id = $1");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("hospital"))
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<Hospital>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE active"
        ));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR city ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        Ok(builder
            .build_query_as::<Hospital>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update(&self, id: Uuid, req: &HospitalReq) -> OpxResult<Hospital> {
        let state = req.state.as_str().to_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OpxError::InvalidInput(
                "state must be a two-letter UF code".into(),
            ));
        }
        let query = format!(
            "UPDATE hospitals SET name = $2, cnpj = $3, address = $4, city = $5, state = $6, \
             phone = $7, updated_at = now()
             WHERE id = $1
             RETURNING {HOSPITAL_COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .bind(req.name.as_str())
            .bind(req.cnpj.as_str())
            .bind(req.address.as_deref())
            .bind(req.city.as_str())
            .bind(&state)
            .bind(req.phone.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("hospital"))
    }

    pub async fn deactivate(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE hospitals SET active = false, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("hospital"));
        }
        Ok(())
    }
}
