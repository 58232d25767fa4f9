//! OPME supplier registry.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::{clamp_page, like_pattern};
use api_shared::models::Supplier;
use api_shared::requests::SupplierReq;
use sqlx::PgPool;
use uuid::Uuid;

const SUPPLIER_COLUMNS: &str =
    "id, company_name, trade_name, cnpj, email, phone, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SuppliersRepository {
    pool: PgPool,
}

impl SuppliersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &SupplierReq) -> OpxResult<Supplier> {
        let query = format!(
            "INSERT INTO suppliers (id, company_name, trade_name, cnpj, email, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SUPPLIER_COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(Uuid::new_v4())
            .bind(req.company_name.as_str())
            .bind(req.trade_name.as_deref())
            .bind(req.cnpj.as_str())
            .bind(req.email.as_ref().map(|e| e.as_str()))
            .bind(req.phone.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!(
                        "a supplier with CNPJ {} already exists",
                        req.cnpj.formatted()
                    ))
                } else {
                    e
                }
            })
    }

    pub async fn get(&self, id: Uuid) -> OpxResult<Supplier> {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("supplier"))
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<Supplier>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE active"
        ));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (company_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR trade_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY company_name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        Ok(builder
            .build_query_as::<Supplier>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update(&self, id: Uuid, req: &SupplierReq) -> OpxResult<Supplier> {
        let query = format!(
            "UPDATE suppliers SET company_name = $2, trade_name = $3, cnpj = $4, email = $5, \
             phone = $6, updated_at = now()
             WHERE id = $1
             RETURNING {SUPPLIER_COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(req.company_name.as_str())
            .bind(req.trade_name.as_deref())
            .bind(req.cnpj.as_str())
            .bind(req.email.as_ref().map(|e| e.as_str()))
            .bind(req.phone.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("supplier"))
    }

    pub async fn deactivate(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE suppliers SET active = false, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("supplier"));
        }
        Ok(())
    }
}
