pub mod idempotency_repository;
pub mod ledger_repository;
pub mod models;
pub mod read_repository;
pub mod store;
pub mod wallet_repository;
