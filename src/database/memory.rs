use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{NewSipPlan, SipPlan};
use super::store::SipStore;

/// In-process `SipStore` for development and tests. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySipStore {
    plans: Arc<RwLock<Vec<SipPlan>>>,
}

impl MemorySipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed record as-is, bypassing validation.
    pub async fn insert(&self, plan: SipPlan) {
        self.plans.write().await.push(plan);
    }

    pub async fn len(&self) -> usize {
        self.plans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.read().await.is_empty()
    }
}

#[async_trait]
impl SipStore for MemorySipStore {
    async fn fetch_records_for_user(&self, user_id: &str) -> Result<Vec<SipPlan>, DatabaseError> {
        let plans = self.plans.read().await;
        Ok(plans
            .iter()
            .filter(|plan| plan.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_record(&self, user_id: &str, plan: NewSipPlan) -> Result<SipPlan, DatabaseError> {
        let now = Utc::now();
        let created = SipPlan {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            scheme_name: plan.scheme_name,
            monthly_amount: plan.monthly_amount,
            start_date: plan.start_date,
            created_at: now,
            updated_at: now,
        };

        self.plans.write().await.push(created.clone());
        Ok(created)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
