pub mod purge_idempotency;
