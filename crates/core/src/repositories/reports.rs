//! Dashboard aggregations.
//!
//! Every report shares the same filter set (date range on order creation,
//! optional doctor) and returns `label`/`count` rows ready for a chart.

use crate::error::OpxResult;
use api_shared::models::CountRow;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// How many rows the "top N" reports return.
const TOP_N: i64 = 10;

/// Filters shared by every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Order counts per lifecycle status.
    pub async fn orders_by_status(&self, filter: ReportFilter) -> OpxResult<Vec<CountRow>> {
        let mut builder = QueryBuilder::new(
            "SELECT o.status AS label, count(*) AS count FROM medical_orders o WHERE true",
        );
        push_filter(&mut builder, filter);
        builder.push(" GROUP BY o.status ORDER BY count DESC");
        Ok(builder.build_query_as::<CountRow>().fetch_all(&self.pool).await?)
    }

    /// Order counts per hospital, drafts without a hospital excluded.
    pub async fn orders_by_hospital(&self, filter: ReportFilter) -> OpxResult<Vec<CountRow>> {
        let mut builder = QueryBuilder::new(
            "SELECT h.name AS label, count(*) AS count
             FROM medical_orders o
             JOIN hospitals h ON h.id = o.hospital_id
             WHERE true",
        );
        push_filter(&mut builder, filter);
        builder.push(" GROUP BY h.name ORDER BY count DESC");
        Ok(builder.build_query_as::<CountRow>().fetch_all(&self.pool).await?)
    }

    /// Orders created per calendar month, labelled `YYYY-MM`.
    ///
    /// Without an explicit `from`, the window defaults to the last twelve
    /// months so the dashboard chart has a bounded x-axis.
    pub async fn orders_per_month(&self, filter: ReportFilter) -> OpxResult<Vec<CountRow>> {
        let mut builder = QueryBuilder::new(
            "SELECT to_char(date_trunc('month', o.created_at), 'YYYY-MM') AS label, \
             count(*) AS count FROM medical_orders o WHERE true",
        );
        if filter.from.is_none() {
            builder.push(" AND o.created_at >= now() - interval '12 months'");
        }
        push_filter(&mut builder, filter);
        builder.push(" GROUP BY 1 ORDER BY 1");
        Ok(builder.build_query_as::<CountRow>().fetch_all(&self.pool).await?)
    }

    /// Most requested main procedures.
    pub async fn top_procedures(&self, filter: ReportFilter) -> OpxResult<Vec<CountRow>> {
        let mut builder = QueryBuilder::new(
            "SELECT pr.cbhpm_code || ' - ' || pr.name AS label, count(*) AS count
             FROM medical_orders o
             JOIN procedures pr ON pr.id = o.procedure_id
             WHERE true",
        );
        push_filter(&mut builder, filter);
        builder
            .push(" GROUP BY pr.cbhpm_code, pr.name ORDER BY count DESC LIMIT ")
            .push_bind(TOP_N);
        Ok(builder.build_query_as::<CountRow>().fetch_all(&self.pool).await?)
    }

    /// Most requested OPME items, counting each order an item appears on.
    pub async fn top_opme_items(&self, filter: ReportFilter) -> OpxResult<Vec<CountRow>> {
        let mut builder = QueryBuilder::new(
            "SELECT i.technical_name AS label, count(*) AS count
             FROM medical_orders o
             CROSS JOIN LATERAL unnest(o.opme_item_ids) AS item_id
             JOIN opme_items i ON i.id = item_id
             WHERE true",
        );
        push_filter(&mut builder, filter);
        builder
            .push(" GROUP BY i.technical_name ORDER BY count DESC LIMIT ")
            .push_bind(TOP_N);
        Ok(builder.build_query_as::<CountRow>().fetch_all(&self.pool).await?)
    }
}

/// Appends the shared report filters against alias `o`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: ReportFilter) {
    if let Some(from) = filter.from {
        builder.push(" AND o.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        // Inclusive end date: everything before the following midnight.
        builder
            .push(" AND o.created_at < ")
            .push_bind(to)
            .push(" + interval '1 day'");
    }
    if let Some(doctor_id) = filter.doctor_id {
        builder.push(" AND o.doctor_id = ").push_bind(doctor_id);
    }
}
