// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token required)
pub mod protected; // /sips/*
pub mod public; // /, /health
