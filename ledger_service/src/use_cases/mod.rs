pub mod get_balances;
pub mod get_history;
pub mod process_transfer;
