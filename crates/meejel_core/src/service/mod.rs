//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and scoring into use-case level APIs.
//! - Keep hosting layers (CLI, HTTP, admin) decoupled from storage details.

pub mod rubric_service;
