// Protected handlers: every route here sits behind `jwt_auth_middleware`,
// which injects `AuthUser`. Handlers only ever touch the caller's own records.
pub mod sips;

pub use sips::{create as sip_create, summary as sip_summary};
