mod common;

use alloy_primitives::{Address, U256};
use common::*;
use position_indexer::contracts::{Dvp, Escrow, Exchange, SecurityToken};
use position_indexer::kind::TokenKind;
use position_indexer::registry::Registry;
use position_indexer::repository::{
    CheckpointRepository, Database, LockEvent, LockHistoryRepository, PositionRepository,
};
use position_indexer::resolver::BalanceResolver;
use position_indexer::{IndexerError, Processor, ProcessorConfig};

fn processor(ledger: MockLedger, db: Database) -> Processor<MockLedger> {
    Processor::new(
        ledger,
        db,
        ProcessorConfig::new(TOKEN_LIST, TokenKind::StraightBond),
    )
}

fn bond_with_transfers(head: u64) -> (MockLedger, Database) {
    let ledger = MockLedger::new(head);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.emit(BOND, transfer(Address::ZERO, ISSUER, 1_000_000), 100, 0);
    ledger.emit(BOND, transfer(ISSUER, TRADER, 10_000), 103, 2);
    ledger.set_balance(BOND, ISSUER, 990_000);
    ledger.set_balance(BOND, TRADER, 10_000);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    (ledger, db)
}

fn latest_block(processor: &Processor<MockLedger>, token: Address, exchange: Address) -> Option<u64> {
    CheckpointRepository::new(&processor.database().conn)
        .get_latest_block(&token, &exchange)
        .unwrap()
}

#[tokio::test]
async fn basic_transfer_is_mirrored() {
    let (ledger, db) = bond_with_transfers(105);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.head, 105);
    assert_eq!(summary.chunks, 1);
    assert_eq!(summary.positions_written, 2);

    let repo = PositionRepository::new(&processor.database().conn);
    let issuer = repo.get(&BOND, &ISSUER).unwrap().unwrap();
    let trader = repo.get(&BOND, &TRADER).unwrap().unwrap();
    assert_eq!(issuer.balance, U256::from(990_000u64));
    assert_eq!(trader.balance, U256::from(10_000u64));
    assert_eq!(trader.exchange_balance, U256::ZERO);
    assert_eq!(trader.pending_transfer, Some(U256::ZERO));

    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(105));
}

#[tokio::test]
async fn repeated_transfers_read_each_balance_once() {
    let ledger = MockLedger::new(50);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    for i in 0..5 {
        ledger.emit(BOND, transfer(ISSUER, TRADER, 1), 10 + i, 0);
    }
    ledger.set_balance(BOND, ISSUER, 95);
    ledger.set_balance(BOND, TRADER, 5);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();
    assert_eq!(processor.ledger().count_calls::<SecurityToken::balanceOfCall>(), 2);
}

#[tokio::test]
async fn replaying_a_window_is_idempotent() {
    let (ledger, db) = bond_with_transfers(105);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();
    let first = PositionRepository::new(&processor.database().conn)
        .list_by_token(&BOND)
        .unwrap();

    // Rewind the checkpoint so the same blocks are processed again
    CheckpointRepository::new(&processor.database().conn)
        .upsert(&BOND, &Address::ZERO, 50)
        .unwrap();
    processor.sync_new_logs().await.unwrap();

    let second = PositionRepository::new(&processor.database().conn)
        .list_by_token(&BOND)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(105));
}

#[tokio::test]
async fn checkpoint_never_moves_backwards() {
    let (ledger, db) = bond_with_transfers(105);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();
    processor.ledger().set_head(200);
    processor.sync_new_logs().await.unwrap();
    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(200));

    processor.ledger().set_head(150);
    processor.sync_new_logs().await.unwrap();
    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(200));
}

#[tokio::test]
async fn large_gap_is_processed_in_chunks() {
    let ledger = MockLedger::new(19_999_999);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    seed_checkpoint(&db, BOND, Address::ZERO, 9_999_999);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.chunks, 10);
    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(19_999_999));

    let summary = processor.sync_new_logs().await.unwrap();
    assert_eq!(summary.chunks, 1);
    assert_eq!(summary.positions_written, 0);
}

#[tokio::test]
async fn zero_balances_create_no_rows() {
    let ledger = MockLedger::new(20);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.emit(BOND, transfer(ISSUER, TRADER, 0), 10, 0);
    ledger.set_balance(BOND, ISSUER, 0);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.positions_written, 0);
    assert!(
        PositionRepository::new(&processor.database().conn)
            .list_by_token(&BOND)
            .unwrap()
            .is_empty()
    );
    assert_eq!(latest_block(&processor, BOND, Address::ZERO), Some(20));
}

#[tokio::test]
async fn late_listing_rebuilds_history_from_genesis() {
    let ledger = MockLedger::new(500);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.list_token(BOND_B, "IbetStraightBond", Address::ZERO);
    ledger.emit(BOND_B, transfer(ISSUER, TRADER, 7), 12, 0);
    ledger.set_balance(BOND_B, TRADER, 7);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();
    assert_eq!(latest_block(&processor, BOND_B, Address::ZERO), None);

    seed_listing(processor.database(), BOND_B);
    processor.sync_new_logs().await.unwrap();

    let trader = PositionRepository::new(&processor.database().conn)
        .get(&BOND_B, &TRADER)
        .unwrap()
        .unwrap();
    assert_eq!(trader.balance, U256::from(7u64));
    assert_eq!(latest_block(&processor, BOND_B, Address::ZERO), Some(500));
}

#[tokio::test]
async fn other_templates_are_ignored() {
    let ledger = MockLedger::new(30);
    ledger.list_token(SHARE, "IbetShare", Address::ZERO);
    ledger.emit(SHARE, transfer(ISSUER, TRADER, 1), 5, 0);
    ledger.set_balance(SHARE, TRADER, 1);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, SHARE);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.chunks, 0);
    assert_eq!(latest_block(&processor, SHARE, Address::ZERO), None);
}

#[tokio::test]
async fn failed_checkpoint_rolls_back_the_chunk() {
    let (ledger, db) = bond_with_transfers(105);
    db.conn
        .execute_batch(
            "CREATE TRIGGER refuse_checkpoint BEFORE INSERT ON position_checkpoint
             BEGIN SELECT RAISE(ABORT, 'checkpoint write refused'); END;",
        )
        .unwrap();
    let mut processor = processor(ledger, db);

    let err = processor.initial_sync().await.unwrap_err();
    assert!(matches!(err, IndexerError::Database(_)));
    assert!(!err.is_transient());

    let stats = PositionRepository::new(&processor.database().conn)
        .get_statistics()
        .unwrap();
    assert_eq!(stats.positions, 0);
    assert_eq!(stats.checkpoints, 0);
}

#[tokio::test]
async fn unreachable_node_is_reported_as_transient() {
    let (ledger, db) = bond_with_transfers(105);
    ledger.set_unavailable(true);
    let mut processor = processor(ledger, db);

    let err = processor.initial_sync().await.unwrap_err();
    assert!(matches!(err, IndexerError::Unavailable(_)));
    assert!(err.is_transient());

    processor.ledger().set_unavailable(false);
    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.positions_written, 2);
}

#[tokio::test]
async fn exchange_events_refresh_exchange_fields() {
    let ledger = MockLedger::new(80);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);
    ledger.emit(
        EXCHANGE,
        Exchange::NewOrder {
            tokenAddress: BOND,
            orderId: U256::from(1u64),
            accountAddress: ISSUER,
            isBuy: false,
            price: U256::from(100u64),
            amount: U256::from(40u64),
            agentAddress: Address::ZERO,
        },
        60,
        0,
    );
    ledger.set_exchange_balance(EXCHANGE, BOND, ISSUER, 60, 40);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let issuer = PositionRepository::new(&processor.database().conn)
        .get(&BOND, &ISSUER)
        .unwrap()
        .unwrap();
    assert_eq!(issuer.exchange_balance, U256::from(60u64));
    assert_eq!(issuer.exchange_commitment, U256::from(40u64));
    assert_eq!(issuer.balance, U256::ZERO);
    assert_eq!(issuer.pending_transfer, None);
    assert_eq!(latest_block(&processor, BOND, EXCHANGE), Some(80));
}

#[tokio::test]
async fn escrow_events_refresh_both_parties() {
    let ledger = MockLedger::new(80);
    ledger.list_token(BOND, "IbetStraightBond", ESCROW);
    ledger.emit(
        ESCROW,
        Escrow::EscrowFinished {
            escrowId: U256::from(3u64),
            token: BOND,
            sender: ISSUER,
            recipient: TRADER,
            amount: U256::from(10u64),
            agent: Address::ZERO,
        },
        70,
        1,
    );
    ledger.set_exchange_balance(ESCROW, BOND, ISSUER, 90, 0);
    ledger.set_exchange_balance(ESCROW, BOND, TRADER, 10, 0);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let repo = PositionRepository::new(&processor.database().conn);
    assert_eq!(
        repo.get(&BOND, &TRADER).unwrap().unwrap().exchange_balance,
        U256::from(10u64)
    );
    assert_eq!(
        repo.get(&BOND, &ISSUER).unwrap().unwrap().exchange_balance,
        U256::from(90u64)
    );
}

#[tokio::test]
async fn exchange_events_for_untracked_or_reconciled_tokens_are_discarded() {
    let ledger = MockLedger::new(300);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);
    ledger.list_token(BOND_B, "IbetStraightBond", EXCHANGE);

    let order = |token: Address, account: Address| Exchange::NewOrder {
        tokenAddress: token,
        orderId: U256::from(1u64),
        accountAddress: account,
        isBuy: false,
        price: U256::from(1u64),
        amount: U256::from(1u64),
        agentAddress: Address::ZERO,
    };
    // BOND is reconciled up to block 100, BOND_B has no checkpoint
    ledger.emit(EXCHANGE, order(BOND, TRADER), 50, 0);
    ledger.emit(EXCHANGE, order(BOND_B, TRADER), 50, 1);
    ledger.emit(EXCHANGE, order(SHARE, TRADER), 50, 2);
    ledger.set_exchange_balance(EXCHANGE, BOND, TRADER, 1, 1);
    ledger.set_exchange_balance(EXCHANGE, BOND_B, TRADER, 1, 1);
    ledger.set_exchange_balance(EXCHANGE, SHARE, TRADER, 1, 1);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    seed_listing(&db, BOND_B);
    seed_checkpoint(&db, BOND, EXCHANGE, 100);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let repo = PositionRepository::new(&processor.database().conn);
    assert!(repo.get(&BOND, &TRADER).unwrap().is_none());
    assert!(repo.get(&BOND_B, &TRADER).unwrap().is_some());
    assert!(repo.get(&SHARE, &TRADER).unwrap().is_none());
    assert_eq!(
        processor
            .ledger()
            .count_calls::<Exchange::commitmentOfCall>(),
        1
    );
}

#[tokio::test]
async fn deposits_into_the_exchange_skip_the_exchange_account() {
    let ledger = MockLedger::new(40);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);
    ledger.emit(BOND, transfer(ISSUER, EXCHANGE, 25), 30, 0);
    ledger.set_balance(BOND, ISSUER, 75);
    ledger.set_balance(BOND, EXCHANGE, 25);
    ledger.set_exchange_balance(EXCHANGE, BOND, ISSUER, 25, 0);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let repo = PositionRepository::new(&processor.database().conn);
    assert!(repo.get(&BOND, &EXCHANGE).unwrap().is_none());
    let issuer = repo.get(&BOND, &ISSUER).unwrap().unwrap();
    assert_eq!(issuer.balance, U256::from(75u64));
    assert_eq!(issuer.exchange_balance, U256::from(25u64));
    assert_eq!(processor.ledger().count_calls::<SecurityToken::balanceOfCall>(), 1);
    assert_eq!(
        processor
            .ledger()
            .count_calls_to::<Exchange::balanceOfCall>(EXCHANGE),
        1
    );
}

#[tokio::test]
async fn plain_transfers_leave_exchange_fields_alone() {
    let ledger = MockLedger::new(40);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);
    ledger.emit(BOND, transfer(ISSUER, TRADER, 5), 30, 0);
    ledger.set_balance(BOND, TRADER, 5);
    ledger.set_exchange_balance(EXCHANGE, BOND, TRADER, 9, 9);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let trader = PositionRepository::new(&processor.database().conn)
        .get(&BOND, &TRADER)
        .unwrap()
        .unwrap();
    assert_eq!(trader.balance, U256::from(5u64));
    assert_eq!(trader.exchange_balance, U256::ZERO);
    assert_eq!(
        processor
            .ledger()
            .count_calls_to::<Exchange::balanceOfCall>(EXCHANGE),
        0
    );
}

#[tokio::test]
async fn transfer_applications_refresh_pending_amounts() {
    let ledger = MockLedger::new(40);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.emit(
        BOND,
        SecurityToken::ApplyForTransfer {
            index: U256::from(0u64),
            from: ISSUER,
            to: TRADER,
            value: U256::from(30u64),
            data: String::new(),
        },
        15,
        0,
    );
    ledger.set_balance(BOND, ISSUER, 70);
    ledger.set_pending(BOND, ISSUER, 30);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let repo = PositionRepository::new(&processor.database().conn);
    let issuer = repo.get(&BOND, &ISSUER).unwrap().unwrap();
    assert_eq!(issuer.balance, U256::from(70u64));
    assert_eq!(issuer.pending_transfer, Some(U256::from(30u64)));
    // Nothing reaches the recipient until the transfer is approved
    assert!(repo.get(&BOND, &TRADER).unwrap().is_none());
}

#[tokio::test]
async fn delivery_events_refresh_the_seller_only() {
    let ledger = MockLedger::new(90);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);
    ledger.emit(
        EXCHANGE,
        Dvp::DeliveryCreated {
            deliveryId: U256::from(4u64),
            token: BOND,
            seller: ISSUER,
            buyer: TRADER,
            amount: U256::from(7u64),
            agent: Address::ZERO,
            data: String::new(),
        },
        61,
        0,
    );
    ledger.set_exchange_balance(EXCHANGE, BOND, ISSUER, 7, 0);
    ledger.set_exchange_balance(EXCHANGE, BOND, TRADER, 3, 0);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let repo = PositionRepository::new(&processor.database().conn);
    assert_eq!(
        repo.get(&BOND, &ISSUER).unwrap().unwrap().exchange_balance,
        U256::from(7u64)
    );
    assert!(repo.get(&BOND, &TRADER).unwrap().is_none());
    assert_eq!(
        processor
            .ledger()
            .count_calls_to::<Exchange::balanceOfCall>(EXCHANGE),
        1
    );
}

#[tokio::test]
async fn holder_changes_refresh_both_holders() {
    let ledger = MockLedger::new(90);
    ledger.list_token(BOND, "IbetStraightBond", ESCROW);
    ledger.emit(
        ESCROW,
        Escrow::HolderChanged {
            token: BOND,
            from: ISSUER,
            to: TRADER,
            value: U256::from(12u64),
        },
        75,
        0,
    );
    ledger.set_exchange_balance(ESCROW, BOND, ISSUER, 88, 0);
    ledger.set_exchange_balance(ESCROW, BOND, TRADER, 12, 0);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.positions_written, 2);

    let repo = PositionRepository::new(&processor.database().conn);
    assert_eq!(
        repo.get(&BOND, &ISSUER).unwrap().unwrap().exchange_balance,
        U256::from(88u64)
    );
    assert_eq!(
        repo.get(&BOND, &TRADER).unwrap().unwrap().exchange_balance,
        U256::from(12u64)
    );
}

#[tokio::test]
async fn lock_events_refresh_locked_amounts() {
    let ledger = MockLedger::new(40);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.emit(
        BOND,
        SecurityToken::Lock {
            accountAddress: ISSUER,
            lockAddress: LOCK,
            value: U256::from(300u64),
            data: String::new(),
        },
        20,
        0,
    );
    ledger.set_balance(BOND, ISSUER, 700);
    ledger.set_locked(BOND, LOCK, ISSUER, 300);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    let summary = processor.initial_sync().await.unwrap();
    assert_eq!(summary.positions_written, 2);

    let repo = PositionRepository::new(&processor.database().conn);
    let locked = repo.get_locked(&BOND, &LOCK, &ISSUER).unwrap().unwrap();
    assert_eq!(locked.value, U256::from(300u64));
    assert_eq!(
        repo.get(&BOND, &ISSUER).unwrap().unwrap().balance,
        U256::from(700u64)
    );
}

#[tokio::test]
async fn lock_history_keeps_every_event_once() {
    let ledger = MockLedger::new(60);
    ledger.list_token(BOND, "IbetStraightBond", Address::ZERO);
    ledger.emit(
        BOND,
        SecurityToken::Lock {
            accountAddress: ISSUER,
            lockAddress: LOCK,
            value: U256::from(300u64),
            data: r#"{"message":"garnishment"}"#.to_string(),
        },
        20,
        0,
    );
    ledger.emit(
        BOND,
        SecurityToken::Unlock {
            accountAddress: ISSUER,
            lockAddress: LOCK,
            recipientAddress: TRADER,
            value: U256::from(100u64),
            data: String::new(),
        },
        25,
        1,
    );
    ledger.set_sender(20, 0, ISSUER);
    ledger.set_sender(25, 1, LOCK);
    ledger.set_locked(BOND, LOCK, ISSUER, 200);
    ledger.set_balance(BOND, ISSUER, 700);
    ledger.set_balance(BOND, TRADER, 100);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = processor(ledger, db);

    processor.initial_sync().await.unwrap();

    let history = LockHistoryRepository::new(&processor.database().conn)
        .list(Some(&BOND), Some(&ISSUER), 10)
        .unwrap();
    assert_eq!(history.len(), 2);

    let unlock = &history[0];
    assert_eq!(unlock.event, LockEvent::Unlock);
    assert_eq!(unlock.transaction_hash, tx_hash(25, 1));
    assert_eq!(unlock.msg_sender, LOCK);
    assert_eq!(unlock.recipient_address, Some(TRADER));
    assert_eq!(unlock.value, U256::from(100u64));
    assert_eq!(unlock.block_timestamp, block_time(25));

    let lock = &history[1];
    assert_eq!(lock.event, LockEvent::Lock);
    assert_eq!(lock.msg_sender, ISSUER);
    assert_eq!(lock.lock_address, LOCK);
    assert_eq!(lock.recipient_address, None);
    assert_eq!(lock.data, r#"{"message":"garnishment"}"#);

    // Replaying the window must not duplicate history
    CheckpointRepository::new(&processor.database().conn)
        .upsert(&BOND, &Address::ZERO, 10)
        .unwrap();
    processor.sync_new_logs().await.unwrap();
    assert_eq!(
        LockHistoryRepository::new(&processor.database().conn)
            .count()
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn membership_tokens_only_follow_transfers() {
    let ledger = MockLedger::new(40);
    ledger.list_token(BOND, "IbetMembership", Address::ZERO);
    ledger.emit(
        BOND,
        SecurityToken::Lock {
            accountAddress: ISSUER,
            lockAddress: LOCK,
            value: U256::from(1u64),
            data: String::new(),
        },
        20,
        0,
    );
    ledger.emit(BOND, transfer(ISSUER, TRADER, 4), 21, 0);
    ledger.set_balance(BOND, TRADER, 4);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    let mut processor = Processor::new(
        ledger,
        db,
        ProcessorConfig::new(TOKEN_LIST, TokenKind::Membership),
    );

    processor.initial_sync().await.unwrap();

    assert_eq!(processor.ledger().count_calls::<SecurityToken::lockedOfCall>(), 0);
    assert_eq!(processor.ledger().count_calls::<SecurityToken::pendingTransferCall>(), 0);
    let trader = PositionRepository::new(&processor.database().conn)
        .get(&BOND, &TRADER)
        .unwrap()
        .unwrap();
    assert_eq!(trader.balance, U256::from(4u64));
    assert_eq!(trader.pending_transfer, None);
}

#[tokio::test]
async fn registry_resumes_after_checkpoint() {
    let ledger = MockLedger::new(1_000);
    ledger.list_token(BOND, "IbetStraightBond", EXCHANGE);

    let db = Database::in_memory().unwrap();
    seed_listing(&db, BOND);
    seed_listing(&db, SHARE);
    seed_checkpoint(&db, BOND, EXCHANGE, 640);

    let registry = Registry::build(&ledger, &db.conn, TOKEN_LIST, TokenKind::StraightBond)
        .await
        .unwrap();

    // SHARE is listed in the database but unknown to the token list
    assert_eq!(registry.tokens().len(), 1);
    assert_eq!(registry.get_cursor(&BOND), Some(641));
    assert_eq!(registry.exchanges()[0].address, EXCHANGE);
    assert_eq!(registry.lowest_cursor(1_000), Some(641));
}

#[tokio::test]
async fn resolver_reads_all_balances() {
    let ledger = MockLedger::new(1);
    ledger.set_balance(BOND, TRADER, 12);
    ledger.set_exchange_balance(EXCHANGE, BOND, TRADER, 5, 2);

    let mut registry = Registry::new();
    registry.add_token(BOND, TokenKind::StraightBond, EXCHANGE, 0);
    registry.add_token(BOND_B, TokenKind::StraightBond, Address::ZERO, 0);
    let resolver = BalanceResolver::new(&ledger);

    let with_exchange = registry.token(&BOND).unwrap();
    assert_eq!(
        resolver.resolve(with_exchange, TRADER).await.unwrap(),
        (U256::from(12u64), U256::from(5u64), U256::from(2u64))
    );

    // Nothing seeded for BOND_B: every read falls back to zero
    let without_exchange = registry.token(&BOND_B).unwrap();
    assert_eq!(
        resolver.resolve(without_exchange, TRADER).await.unwrap(),
        (U256::ZERO, U256::ZERO, U256::ZERO)
    );
}
