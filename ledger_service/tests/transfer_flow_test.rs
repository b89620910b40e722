//! End-to-end transfer scenarios against a live PostgreSQL instance.
//!
//! These tests require a running PostgreSQL and `DATABASE_URL`; they are
//! marked as ignored by default so the regular test run does not need
//! infrastructure. Run them with:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test --test transfer_flow_test -- --ignored
//! ```
//!
//! Each test seeds its own asset type (unique code) plus its own user
//! accounts, so tests can run concurrently against the same database.

use chrono::Duration;
use ledger_service::domain::entities::{TransactionKind, TransferRequest};
use ledger_service::domain::error::LedgerError;
use ledger_service::domain::types::{
    AccountId, AssetTypeId, WalletId, REVENUE_ACCOUNT_ID, TREASURY_ACCOUNT_ID,
};
use ledger_service::infrastructure::persistence::store::Store;
use ledger_service::use_cases::process_transfer::ProcessTransferUseCase;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Store {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = PgPoolOptions::new()
        .max_connections(15)
        .connect(&database_url)
        .await
        .expect("failed to connect to the test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    Store::from_pool(pool)
}

fn use_case(store: &Store) -> ProcessTransferUseCase {
    ProcessTransferUseCase::new(store.clone(), Duration::hours(24))
}

/// Inserts a fresh asset type with a unique code and creates the two system
/// wallets for it (Treasury and Revenue, both allowed to go negative).
async fn seed_asset(pool: &PgPool, prefix: &str) -> (AssetTypeId, String) {
    let code = format!("{}_{}", prefix, Uuid::new_v4().simple());

    let asset_id: i16 = sqlx::query_scalar(
        "INSERT INTO asset_types (code, name) VALUES ($1, $1) RETURNING id",
    )
    .bind(&code)
    .fetch_one(pool)
    .await
    .unwrap();

    for account in [TREASURY_ACCOUNT_ID, REVENUE_ACCOUNT_ID] {
        sqlx::query(
            "INSERT INTO wallets (id, account_id, asset_type_id, balance, allow_negative)
             VALUES ($1, $2, $3, 0, TRUE)",
        )
        .bind(Uuid::new_v4())
        .bind(account)
        .bind(asset_id)
        .execute(pool)
        .await
        .unwrap();
    }

    (AssetTypeId(asset_id), code)
}

/// Creates a user account with one wallet holding the given balance.
async fn seed_user(pool: &PgPool, asset_id: AssetTypeId, balance: i64) -> (AccountId, WalletId) {
    let account_id = AccountId::new();
    let wallet_id = WalletId::new();

    sqlx::query("INSERT INTO accounts (id, kind) VALUES ($1, 'USER')")
        .bind(account_id)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO wallets (id, account_id, asset_type_id, balance, allow_negative)
         VALUES ($1, $2, $3, $4, FALSE)",
    )
    .bind(wallet_id)
    .bind(account_id)
    .bind(asset_id)
    .bind(balance)
    .execute(pool)
    .await
    .unwrap();

    (account_id, wallet_id)
}

async fn system_wallet_id(pool: &PgPool, account: AccountId, asset_id: AssetTypeId) -> WalletId {
    sqlx::query_scalar("SELECT id FROM wallets WHERE account_id = $1 AND asset_type_id = $2")
        .bind(account)
        .bind(asset_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn wallet_balance(pool: &PgPool, wallet_id: WalletId) -> i64 {
    sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
        .bind(wallet_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn set_wallet_balance(pool: &PgPool, wallet_id: WalletId, balance: i64) {
    sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(wallet_id)
        .execute(pool)
        .await
        .unwrap();
}

fn request(account_id: AccountId, code: &str, amount: i64, key: &str) -> TransferRequest {
    TransferRequest {
        account_id,
        asset_code: code.to_string(),
        amount,
        idempotency_key: Some(key.to_string()),
        description: Some("buy".to_string()),
        metadata: serde_json::json!({}),
    }
}

#[tokio::test]
#[ignore]
async fn single_top_up_writes_double_entry() {
    // Arrange: Alice holds 1000 gold, Treasury sits at -3750
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "GOLD").await;
    let (alice, alice_wallet) = seed_user(pool, asset_id, 1000).await;
    let treasury_wallet = system_wallet_id(pool, TREASURY_ACCOUNT_ID, asset_id).await;
    set_wallet_balance(pool, treasury_wallet, -3750).await;

    // Act
    let key = format!("k1-{}", Uuid::new_v4());
    let result = use_case(&store)
        .top_up(request(alice, &code, 500, &key))
        .await
        .unwrap();

    // Assert: result payload
    assert_eq!(result.kind, TransactionKind::TopUp);
    assert_eq!(result.amount, 500);
    assert!(!result.idempotent);
    assert_eq!(result.source.wallet_id, treasury_wallet);
    assert_eq!(result.source.balance_before, -3750);
    assert_eq!(result.source.balance_after, -4250);
    assert_eq!(result.destination.wallet_id, alice_wallet);
    assert_eq!(result.destination.balance_before, 1000);
    assert_eq!(result.destination.balance_after, 1500);

    // Assert: stored balances
    assert_eq!(wallet_balance(pool, alice_wallet).await, 1500);
    assert_eq!(wallet_balance(pool, treasury_wallet).await, -4250);

    // Assert: one transaction, one Debit + one Credit of equal amounts
    let entries: Vec<(String, i64, i64, i64)> = sqlx::query_as(
        "SELECT entry_type::text, amount, balance_before, balance_after
         FROM ledger_entries WHERE transaction_id = $1 ORDER BY entry_type",
    )
    .bind(result.transaction_id)
    .fetch_all(pool)
    .await
    .unwrap();

    assert_eq!(entries.len(), 2);
    let credit = entries.iter().find(|e| e.0 == "CREDIT").unwrap();
    let debit = entries.iter().find(|e| e.0 == "DEBIT").unwrap();
    assert_eq!((credit.1, credit.2, credit.3), (500, 1000, 1500));
    assert_eq!((debit.1, debit.2, debit.3), (500, -3750, -4250));
}

#[tokio::test]
#[ignore]
async fn replayed_top_up_is_idempotent() {
    // Arrange
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "GOLD").await;
    let (alice, alice_wallet) = seed_user(pool, asset_id, 1000).await;

    let uc = use_case(&store);
    let key = format!("k1-{}", Uuid::new_v4());

    // Act: same call twice with the same idempotency key
    let first = uc.top_up(request(alice, &code, 500, &key)).await.unwrap();
    let second = uc.top_up(request(alice, &code, 500, &key)).await.unwrap();

    // Assert: one transaction, identical payloads, replay is marked
    assert!(!first.idempotent);
    assert!(second.idempotent);
    assert_eq!(second.transaction_id, first.transaction_id);
    assert_eq!(second.amount, first.amount);
    assert_eq!(second.destination, first.destination);
    assert_eq!(wallet_balance(pool, alice_wallet).await, 1500);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE idempotency_key = $1")
            .bind(&key)
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn fifty_concurrent_top_ups_all_commit() {
    // Arrange
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "GOLD").await;
    let (alice, alice_wallet) = seed_user(pool, asset_id, 0).await;
    let treasury_wallet = system_wallet_id(pool, TREASURY_ACCOUNT_ID, asset_id).await;

    // Act: fifty concurrent top-ups of 10, each with its own key
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50 {
        let uc = use_case(&store);
        let req = request(alice, &code, 10, &format!("bulk-{}-{}", i, Uuid::new_v4()));
        tasks.spawn(async move { uc.top_up(req).await });
    }

    let mut succeeded = 0;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap();
        assert!(outcome.is_ok(), "unexpected failure: {:?}", outcome.err());
        succeeded += 1;
    }
    assert_eq!(succeeded, 50);

    // Assert: balances and conservation
    assert_eq!(wallet_balance(pool, alice_wallet).await, 500);
    assert_eq!(wallet_balance(pool, treasury_wallet).await, -500);

    let asset_sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(balance), 0)::BIGINT FROM wallets WHERE asset_type_id = $1",
    )
    .bind(asset_id)
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(asset_sum, 0);

    // Assert: the per-wallet entry chain is continuous
    let chain: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT balance_before, balance_after FROM ledger_entries
         WHERE wallet_id = $1 ORDER BY created_at ASC, seq ASC",
    )
    .bind(alice_wallet)
    .fetch_all(pool)
    .await
    .unwrap();

    assert_eq!(chain.len(), 50);
    assert_eq!(chain[0].0, 0);
    for window in chain.windows(2) {
        assert_eq!(window[1].0, window[0].1, "broken balance chain");
    }
    assert_eq!(chain.last().unwrap().1, 500);
}

#[tokio::test]
#[ignore]
async fn purchase_beyond_balance_is_rejected() {
    // Arrange: Bob holds 25 diamonds
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "DIAMOND").await;
    let (bob, bob_wallet) = seed_user(pool, asset_id, 25).await;

    // Act
    let err = use_case(&store)
        .purchase(request(bob, &code, 999_999, &format!("k-{}", Uuid::new_v4())))
        .await
        .unwrap_err();

    // Assert: classified error with context, nothing written
    match err {
        LedgerError::InsufficientBalance {
            wallet_id,
            requested,
            available,
        } => {
            assert_eq!(wallet_id, bob_wallet);
            assert_eq!(requested, 999_999);
            assert_eq!(available, 25);
        }
        other => panic!("Expected InsufficientBalance, got {:?}", other),
    }

    assert_eq!(wallet_balance(pool, bob_wallet).await, 25);

    let entries: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE wallet_id = $1")
            .bind(bob_wallet)
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(entries, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn concurrent_spends_cannot_overdraw() {
    // Arrange: Charlie holds 100 loyalty points
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "LOYALTY").await;
    let (charlie, charlie_wallet) = seed_user(pool, asset_id, 100).await;
    let revenue_wallet = system_wallet_id(pool, REVENUE_ACCOUNT_ID, asset_id).await;

    // Act: five concurrent purchases of 50, distinct keys
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..5 {
        let uc = use_case(&store);
        let req = request(charlie, &code, 50, &format!("spend-{}-{}", i, Uuid::new_v4()));
        tasks.spawn(async move { uc.purchase(req).await });
    }

    let mut committed = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => committed += 1,
            Err(LedgerError::InsufficientBalance { .. }) => rejected += 1,
            Err(other) => panic!("Unexpected failure: {:?}", other),
        }
    }

    // Assert: exactly two fit into the balance, conservation holds
    assert_eq!(committed, 2);
    assert_eq!(rejected, 3);
    assert_eq!(wallet_balance(pool, charlie_wallet).await, 0);
    assert_eq!(wallet_balance(pool, revenue_wallet).await, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn duplicate_key_race_commits_once() {
    // Arrange
    let store = setup().await;
    let pool = store.pool();
    let (asset_id, code) = seed_asset(pool, "DIAMOND").await;
    let (bob, bob_wallet) = seed_user(pool, asset_id, 0).await;
    let key = format!("dup-k-{}", Uuid::new_v4());

    // Act: two concurrent bonuses with the same idempotency key
    let uc1 = use_case(&store);
    let uc2 = use_case(&store);
    let req1 = request(bob, &code, 100, &key);
    let req2 = request(bob, &code, 100, &key);

    let (first, second) = tokio::join!(uc1.issue_bonus(req1), uc2.issue_bonus(req2));
    let first = first.unwrap();
    let second = second.unwrap();

    // Assert: one commit, the other is a replay of the same transaction
    assert_eq!(first.transaction_id, second.transaction_id);
    assert_ne!(
        first.idempotent, second.idempotent,
        "exactly one caller must observe the fresh commit"
    );

    assert_eq!(wallet_balance(pool, bob_wallet).await, 100);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE idempotency_key = $1")
            .bind(&key)
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}
