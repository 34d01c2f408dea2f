//! Invoice Risk Assessment API Library
//!
//! This library provides the core functionality for the invoice risk
//! assessment service: form validation, the external risk model client, the
//! invoice repository, data models, and HTTP handlers.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `repository`: Invoice storage abstraction.
//! - `risk_client`: External risk model client.
//! - `validation`: Form schema validation.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod risk_client;
pub mod validation;
