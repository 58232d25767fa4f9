//! Reference catalogs: CBHPM procedures, CID-10 codes and OPME items.
//!
//! These are lookup tables the order wizard searches against. The three
//! aggregates share one repository because the operations are uniform and a
//! single screen ("catálogos") administers them.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::{clamp_page, like_pattern};
use api_shared::models::{CidEntry, OpmeItem, Procedure};
use api_shared::requests::{CidReq, OpmeItemReq, ProcedureReq};
use sqlx::PgPool;
use uuid::Uuid;

const PROCEDURE_COLUMNS: &str =
    "id, cbhpm_code, name, porte, description, active, created_at, updated_at";
const CID_COLUMNS: &str = "id, code, description, category, created_at";
const OPME_COLUMNS: &str = "id, technical_name, commercial_name, anvisa_registration, \
     manufacturer, default_supplier_id, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -- CBHPM procedures ---------------------------------------------------

    pub async fn create_procedure(&self, req: &ProcedureReq) -> OpxResult<Procedure> {
        let query = format!(
            "INSERT INTO procedures (id, cbhpm_code, name, porte, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROCEDURE_COLUMNS}"
        );
        sqlx::query_as::<_, Procedure>(&query)
            .bind(Uuid::new_v4())
            .bind(req.cbhpm_code.as_str())
            .bind(req.name.as_str())
            .bind(req.porte.as_deref())
            .bind(req.description.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!(
                        "CBHPM code {} is already cataloged",
                        req.cbhpm_code
                    ))
                } else {
                    e
                }
            })
    }

    pub async fn get_procedure(&self, id: Uuid) -> OpxResult<Procedure> {
        let query = format!("SELECT {PROCEDURE_COLUMNS} FROM procedures WHERE id = $1");
        sqlx::query_as::<_, Procedure>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("procedure"))
    }

    /// Searches by name or CBHPM code.
    pub async fn list_procedures(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<Procedure>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {PROCEDURE_COLUMNS} FROM procedures WHERE active"
        ));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR cbhpm_code LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(builder
            .build_query_as::<Procedure>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update_procedure(&self, id: Uuid, req: &ProcedureReq) -> OpxResult<Procedure> {
        let query = format!(
            "UPDATE procedures SET cbhpm_code = $2, name = $3, porte = $4, description = $5, \
             updated_at = now()
             WHERE id = $1
             RETURNING {PROCEDURE_COLUMNS}"
        );
        sqlx::query_as::<_, Procedure>(&query)
            .bind(id)
            .bind(req.cbhpm_code.as_str())
            .bind(req.name.as_str())
            .bind(req.porte.as_deref())
            .bind(req.description.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("procedure"))
    }

    pub async fn deactivate_procedure(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE procedures SET active = false, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("procedure"));
        }
        Ok(())
    }

    // -- CID-10 codes -------------------------------------------------------

    pub async fn create_cid(&self, req: &CidReq) -> OpxResult<CidEntry> {
        let query = format!(
            "INSERT INTO cid_codes (id, code, description, category)
             VALUES ($1, $2, $3, $4)
             RETURNING {CID_COLUMNS}"
        );
        sqlx::query_as::<_, CidEntry>(&query)
            .bind(Uuid::new_v4())
            .bind(req.code.as_str())
            .bind(req.description.as_str())
            .bind(req.category.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!("CID-10 code {} is already cataloged", req.code))
                } else {
                    e
                }
            })
    }

    pub async fn get_cid(&self, id: Uuid) -> OpxResult<CidEntry> {
        let query = format!("SELECT {CID_COLUMNS} FROM cid_codes WHERE id = $1");
        sqlx::query_as::<_, CidEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("CID-10 code"))
    }

    pub async fn list_cids(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<CidEntry>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {CID_COLUMNS} FROM cid_codes WHERE true"));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY code LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(builder
            .build_query_as::<CidEntry>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update_cid(&self, id: Uuid, req: &CidReq) -> OpxResult<CidEntry> {
        let query = format!(
            "UPDATE cid_codes SET code = $2, description = $3, category = $4
             WHERE id = $1
             RETURNING {CID_COLUMNS}"
        );
        sqlx::query_as::<_, CidEntry>(&query)
            .bind(id)
            .bind(req.code.as_str())
            .bind(req.description.as_str())
            .bind(req.category.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("CID-10 code"))
    }

    /// CID entries are hard-deleted; order rows reference them by id array
    /// without a foreign key, so history survives catalog cleanups.
    pub async fn delete_cid(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query("DELETE FROM cid_codes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("CID-10 code"));
        }
        Ok(())
    }

    // -- OPME items ---------------------------------------------------------

    pub async fn create_opme_item(&self, req: &OpmeItemReq) -> OpxResult<OpmeItem> {
        let query = format!(
            "INSERT INTO opme_items (id, technical_name, commercial_name, anvisa_registration, \
             manufacturer, default_supplier_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {OPME_COLUMNS}"
        );
        let item = sqlx::query_as::<_, OpmeItem>(&query)
            .bind(Uuid::new_v4())
            .bind(req.technical_name.as_str())
            .bind(req.commercial_name.as_deref())
            .bind(req.anvisa_registration.as_ref().map(|a| a.as_str()))
            .bind(req.manufacturer.as_deref())
            .bind(req.default_supplier_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn get_opme_item(&self, id: Uuid) -> OpxResult<OpmeItem> {
        let query = format!("SELECT {OPME_COLUMNS} FROM opme_items WHERE id = $1");
        sqlx::query_as::<_, OpmeItem>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("OPME item"))
    }

    pub async fn list_opme_items(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<OpmeItem>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {OPME_COLUMNS} FROM opme_items WHERE active"
        ));
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            builder
                .push(" AND (technical_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR commercial_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR anvisa_registration LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY technical_name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(builder
            .build_query_as::<OpmeItem>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn update_opme_item(&self, id: Uuid, req: &OpmeItemReq) -> OpxResult<OpmeItem> {
        let query = format!(
            "UPDATE opme_items SET technical_name = $2, commercial_name = $3, \
             anvisa_registration = $4, manufacturer = $5, default_supplier_id = $6, \
             updated_at = now()
             WHERE id = $1
             RETURNING {OPME_COLUMNS}"
        );
        sqlx::query_as::<_, OpmeItem>(&query)
            .bind(id)
            .bind(req.technical_name.as_str())
            .bind(req.commercial_name.as_deref())
            .bind(req.anvisa_registration.as_ref().map(|a| a.as_str()))
            .bind(req.manufacturer.as_deref())
            .bind(req.default_supplier_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("OPME item"))
    }

    pub async fn deactivate_opme_item(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE opme_items SET active = false, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("OPME item"));
        }
        Ok(())
    }
}
