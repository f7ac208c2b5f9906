// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod packs;
pub mod profile;
pub mod quiz;
