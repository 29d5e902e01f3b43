pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemorySipStore;
pub use postgres::PgSipStore;
pub use store::SipStore;
