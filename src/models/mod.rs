// src/models/mod.rs
pub mod attributes;
pub mod filter;
pub mod server;
