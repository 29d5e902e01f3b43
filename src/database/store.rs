use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{NewSipPlan, SipPlan};

/// Persistence for SIP plan records.
///
/// Every read is scoped to one owner: implementations must filter by
/// `user_id` in the query itself, never in the caller.
#[async_trait]
pub trait SipStore: Send + Sync {
    /// All plans owned by `user_id`, oldest first.
    async fn fetch_records_for_user(&self, user_id: &str) -> Result<Vec<SipPlan>, DatabaseError>;

    /// Insert a validated plan for `user_id`. The store assigns `id`,
    /// `created_at` and `updated_at`.
    async fn create_record(&self, user_id: &str, plan: NewSipPlan) -> Result<SipPlan, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
