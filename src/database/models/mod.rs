pub mod sip;

pub use sip::{NewSipPlan, PlanValidationError, SipPlan};
