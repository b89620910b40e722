use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identificador de Cuenta usando NewType Pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identificador de Billetera usando NewType Pattern.
///
/// El orden natural (`Ord`) es el orden por bytes del UUID; el lock manager
/// depende de ese orden para adquirir locks en una secuencia global única.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct WalletId(pub Uuid);

impl WalletId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identificador de Transacción usando NewType Pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identificador de Tipo de Activo (SMALLINT en la base de datos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct AssetTypeId(pub i16);

impl fmt::Display for AssetTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cuenta de sistema Treasury: única fuente de valor nuevo.
pub const TREASURY_ACCOUNT_ID: AccountId = AccountId(Uuid::from_u128(0x01));

/// Cuenta de sistema Revenue: sumidero del valor gastado.
pub const REVENUE_ACCOUNT_ID: AccountId = AccountId(Uuid::from_u128(0x02));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_account_ids_are_distinct_and_stable() {
        assert_ne!(TREASURY_ACCOUNT_ID, REVENUE_ACCOUNT_ID);
        assert_eq!(
            TREASURY_ACCOUNT_ID.to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            REVENUE_ACCOUNT_ID.to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn wallet_id_order_follows_uuid_bytes() {
        let low = WalletId(Uuid::from_u128(1));
        let high = WalletId(Uuid::from_u128(u128::MAX));
        assert!(low < high);
    }
}
