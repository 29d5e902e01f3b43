use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{NewSipPlan, SipPlan};
use super::store::SipStore;

/// `SipStore` backed by the `sips` table.
#[derive(Clone)]
pub struct PgSipStore {
    pool: PgPool,
}

impl PgSipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SipStore for PgSipStore {
    async fn fetch_records_for_user(&self, user_id: &str) -> Result<Vec<SipPlan>, DatabaseError> {
        let query = r#"
            SELECT id, user_id, scheme_name, monthly_amount, start_date, created_at, updated_at
            FROM sips
            WHERE user_id = $1
            ORDER BY created_at, id
        "#;

        let plans = sqlx::query_as::<_, SipPlan>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(plans)
    }

    async fn create_record(&self, user_id: &str, plan: NewSipPlan) -> Result<SipPlan, DatabaseError> {
        let query = r#"
            INSERT INTO sips (id, user_id, scheme_name, monthly_amount, start_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, user_id, scheme_name, monthly_amount, start_date, created_at, updated_at
        "#;

        let created = sqlx::query_as::<_, SipPlan>(query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&plan.scheme_name)
            .bind(plan.monthly_amount)
            .bind(plan.start_date)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
