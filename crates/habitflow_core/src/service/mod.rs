//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and engine functions into use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod completion_ledger;
pub mod habit_service;
pub mod stats_service;
