//! Ledger Service Library
//!
//! Transactional virtual-currency wallet engine for gaming and loyalty
//! platforms: double-entry ledger writes under pessimistic row locks, with
//! at-most-once semantics via idempotency keys.
//!
//! # Modules
//!
//! * `api` - HTTP boundary (routes, error mapping, response envelope).
//! * `config` - Environment-driven configuration.
//! * `domain` - Entities, id newtypes, error taxonomy and read ports.
//! * `infrastructure` - Store gateway and the PostgreSQL repositories.
//! * `jobs` - Background maintenance (idempotency record sweeper).
//! * `use_cases` - Transfer orchestration and read queries.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod jobs;
pub mod use_cases;
