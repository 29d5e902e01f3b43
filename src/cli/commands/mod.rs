pub mod sips;
pub mod token;
