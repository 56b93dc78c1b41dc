// src/handlers/mod.rs
pub mod index;
pub mod matchmaking;
pub mod session;
