//! Integration tests for the transaction posting engine.
//!
//! These tests run against a real Postgres database and are skipped when
//! `DATABASE_URL` is not set. Each test posts under a fresh company code so
//! tests never observe each other's rows.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use vypar_core::posting::{LineInput, PostingError, TransactionStatus, TransactionType};
use vypar_db::entities::sea_orm_active_enums::{
    PartyType, TransactionStatus as DbTransactionStatus,
};
use vypar_db::migration::{Migrator, MigratorTrait};
use vypar_db::repositories::{
    CreateItemInput, CreatePartyInput, CreateTransactionInput, ItemError, ItemRepository,
    PartyRepository, SequenceRepository, TransactionError, TransactionFilter,
    TransactionRepository, UpdateTransactionInput,
};
use vypar_shared::types::CompanyScope;

/// Connects to the test database, or `None` to skip the test.
async fn test_db() -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = Database::connect(&url)
        .await
        .expect("failed to connect to test database");
    Migrator::up(&db, None).await.expect("migrations failed");
    Some(db)
}

/// Fresh tenant per test.
fn fresh_scope() -> CompanyScope {
    CompanyScope::new(format!("t-{}", Uuid::new_v4()))
}

async fn create_item(
    db: &DatabaseConnection,
    scope: &CompanyScope,
    name: &str,
    gst_rate: rust_decimal::Decimal,
    stock: i64,
) -> Uuid {
    ItemRepository::new(db.clone())
        .create(
            scope,
            CreateItemInput {
                name: name.to_string(),
                sale_price: dec!(100),
                purchase_price: dec!(80),
                stock,
                gst_rate,
                hsn_code: Some("8471".to_string()),
            },
        )
        .await
        .expect("failed to create item")
        .id
}

async fn create_party(
    db: &DatabaseConnection,
    scope: &CompanyScope,
    name: &str,
    gstin: Option<&str>,
) -> Uuid {
    PartyRepository::new(db.clone())
        .create(
            scope,
            CreatePartyInput {
                name: name.to_string(),
                party_type: PartyType::Customer,
                gstin: gstin.map(str::to_string),
                phone: None,
                email: None,
                billing_address: None,
                opening_balance: dec!(0),
            },
        )
        .await
        .expect("failed to create party")
        .id
}

fn sale_input(number: &str, party_id: Option<Uuid>, lines: Vec<LineInput>) -> CreateTransactionInput {
    CreateTransactionInput {
        transaction_type: TransactionType::Sale,
        transaction_number: number.to_string(),
        status: TransactionStatus::Draft,
        party_id,
        transaction_date: None,
        lines,
        discount: dec!(0),
        total_amount: dec!(1180),
        amount_paid: dec!(0),
        notes: None,
    }
}

fn line_by_id(item_id: Uuid, quantity: i64) -> LineInput {
    LineInput {
        item_id: Some(item_id),
        name: None,
        quantity,
        rate: dec!(100),
    }
}

async fn stock_of(db: &DatabaseConnection, scope: &CompanyScope, item_id: Uuid) -> i64 {
    ItemRepository::new(db.clone())
        .find_by_id(scope, item_id)
        .await
        .expect("item should exist")
        .stock
}

#[tokio::test]
async fn test_intra_state_sale_splits_tax_and_decrements_stock() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;
    let party_id = create_party(&db, &scope, "Sharma Traders", Some("27AAACS1234A1Z5")).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope,
            Some("27"),
            sale_input("INV-1", Some(party_id), vec![line_by_id(item_id, 10)]),
        )
        .await
        .expect("posting should succeed");

    assert_eq!(view.lines.len(), 1);
    let line = &view.lines[0].line;
    assert_eq!(line.taxable_value, dec!(1000));
    assert_eq!(line.cgst, dec!(90));
    assert_eq!(line.sgst, dec!(90));
    assert_eq!(line.igst, dec!(0));
    assert_eq!(view.transaction.subtotal, dec!(1000));
    assert_eq!(view.transaction.party_gstin.as_deref(), Some("27AAACS1234A1Z5"));
    assert_eq!(view.party_name.as_deref(), Some("Sharma Traders"));

    assert_eq!(stock_of(&db, &scope, item_id).await, 90);
}

#[tokio::test]
async fn test_inter_state_sale_carries_igst() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;
    let party_id = create_party(&db, &scope, "Gupta & Sons", Some("09AAACG1234A1Z5")).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope,
            Some("27"),
            sale_input("INV-1", Some(party_id), vec![line_by_id(item_id, 10)]),
        )
        .await
        .expect("posting should succeed");

    let line = &view.lines[0].line;
    assert_eq!(line.cgst, dec!(0));
    assert_eq!(line.sgst, dec!(0));
    assert_eq!(line.igst, dec!(180));
}

#[tokio::test]
async fn test_unregistered_party_defaults_to_inter_state() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;
    let party_id = create_party(&db, &scope, "Walk-in", None).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope,
            Some("27"),
            sale_input("INV-1", Some(party_id), vec![line_by_id(item_id, 10)]),
        )
        .await
        .expect("posting should succeed");

    assert_eq!(view.lines[0].line.igst, dec!(180));
}

#[tokio::test]
async fn test_posting_by_name_creates_item() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();

    let repo = TransactionRepository::new(db.clone());
    let input = CreateTransactionInput {
        transaction_type: TransactionType::Purchase,
        transaction_number: "PUR-1".to_string(),
        status: TransactionStatus::Draft,
        party_id: None,
        transaction_date: None,
        lines: vec![LineInput {
            item_id: None,
            name: Some("New Widget".to_string()),
            quantity: 5,
            rate: dec!(50),
        }],
        discount: dec!(0),
        total_amount: dec!(250),
        amount_paid: dec!(250),
        notes: None,
    };
    let view = repo
        .create_transaction(&scope, Some("27"), input)
        .await
        .expect("posting should succeed");

    assert_eq!(view.lines[0].item_name, "New Widget");
    // Created item is seeded with the line rate and zero GST
    assert_eq!(view.lines[0].line.gst_rate, dec!(0));

    let items = ItemRepository::new(db.clone())
        .list(&scope)
        .await
        .expect("list should succeed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "New Widget");
    assert_eq!(items[0].sale_price, dec!(50));
    // Purchase increments stock from the seeded zero
    assert_eq!(items[0].stock, 5);
}

#[tokio::test]
async fn test_resolve_or_create_is_idempotent_across_posts() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let repo = TransactionRepository::new(db.clone());

    for number in ["PUR-1", "PUR-2"] {
        let input = CreateTransactionInput {
            transaction_type: TransactionType::Purchase,
            transaction_number: number.to_string(),
            status: TransactionStatus::Draft,
            party_id: None,
            transaction_date: None,
            lines: vec![LineInput {
                item_id: None,
                name: Some("Bolt M8".to_string()),
                quantity: 10,
                rate: dec!(2),
            }],
            discount: dec!(0),
            total_amount: dec!(20),
            amount_paid: dec!(20),
            notes: None,
        };
        repo.create_transaction(&scope, None, input)
            .await
            .expect("posting should succeed");
    }

    let items = ItemRepository::new(db.clone())
        .list(&scope)
        .await
        .expect("list should succeed");
    assert_eq!(items.len(), 1, "same name must resolve to one item");
    assert_eq!(items[0].stock, 20);
}

#[tokio::test]
async fn test_failed_posting_leaves_no_trace() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;
    let missing = Uuid::new_v4();

    let repo = TransactionRepository::new(db.clone());
    let result = repo
        .create_transaction(
            &scope,
            Some("27"),
            sale_input(
                "INV-1",
                None,
                vec![line_by_id(item_id, 10), line_by_id(missing, 1)],
            ),
        )
        .await;

    assert!(matches!(
        result,
        Err(TransactionError::Posting(PostingError::ItemNotFound(id))) if id == missing
    ));

    // Nothing committed: no transaction, no stock movement
    let listed = repo
        .list_transactions(&scope, TransactionFilter::default())
        .await
        .expect("list should succeed");
    assert!(listed.is_empty());
    assert_eq!(stock_of(&db, &scope, item_id).await, 100);
}

#[tokio::test]
async fn test_duplicate_number_rejected() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    repo.create_transaction(
        &scope,
        None,
        sale_input("INV-1", None, vec![line_by_id(item_id, 1)]),
    )
    .await
    .expect("first posting should succeed");

    let result = repo
        .create_transaction(
            &scope,
            None,
            sale_input("INV-1", None, vec![line_by_id(item_id, 1)]),
        )
        .await;
    assert!(matches!(
        result,
        Err(TransactionError::DuplicateNumber(ref n)) if n == "INV-1"
    ));

    // The rejected posting must not have moved stock
    assert_eq!(stock_of(&db, &scope, item_id).await, 99);
}

#[tokio::test]
async fn test_delete_reverses_stock() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope,
            None,
            sale_input("INV-1", None, vec![line_by_id(item_id, 10)]),
        )
        .await
        .expect("posting should succeed");
    assert_eq!(stock_of(&db, &scope, item_id).await, 90);

    repo.delete_transaction(&scope, view.transaction.id)
        .await
        .expect("delete should succeed");

    assert_eq!(stock_of(&db, &scope, item_id).await, 100);
    assert!(matches!(
        repo.get_transaction(&scope, view.transaction.id).await,
        Err(TransactionError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_estimate_conversion_is_one_way() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    let estimate = repo
        .create_transaction(
            &scope,
            Some("27"),
            CreateTransactionInput {
                transaction_type: TransactionType::Estimate,
                transaction_number: "EST-1".to_string(),
                status: TransactionStatus::Sent,
                party_id: None,
                transaction_date: None,
                lines: vec![line_by_id(item_id, 10)],
                discount: dec!(0),
                total_amount: dec!(1180),
                amount_paid: dec!(0),
                notes: Some("valid 30 days".to_string()),
            },
        )
        .await
        .expect("estimate should post");

    // Estimates never touch stock
    assert_eq!(stock_of(&db, &scope, item_id).await, 100);

    let invoice = repo
        .convert_to_invoice(&scope, estimate.transaction.id)
        .await
        .expect("conversion should succeed");

    assert_eq!(
        invoice.transaction.converted_from,
        Some(estimate.transaction.id)
    );
    assert_eq!(invoice.transaction.total_amount, dec!(1180));
    assert_eq!(invoice.transaction.balance_due, dec!(1180));
    assert_eq!(invoice.lines.len(), 1);
    assert_eq!(invoice.lines[0].line.cgst, estimate.lines[0].line.cgst);
    // The sale takes the stock the estimate reserved on paper
    assert_eq!(stock_of(&db, &scope, item_id).await, 90);

    let source = repo
        .get_transaction(&scope, estimate.transaction.id)
        .await
        .expect("source should still exist");
    assert_eq!(source.transaction.status, DbTransactionStatus::Invoiced);

    // Second conversion is rejected and moves no stock
    let again = repo.convert_to_invoice(&scope, estimate.transaction.id).await;
    assert!(matches!(
        again,
        Err(TransactionError::Posting(PostingError::AlreadyInvoiced))
    ));
    assert_eq!(stock_of(&db, &scope, item_id).await, 90);

    // Converting a sale is rejected outright
    let not_estimate = repo.convert_to_invoice(&scope, invoice.transaction.id).await;
    assert!(matches!(
        not_estimate,
        Err(TransactionError::Posting(PostingError::NotAnEstimate))
    ));
}

#[tokio::test]
async fn test_converted_estimate_remains_deletable() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    let estimate = repo
        .create_transaction(
            &scope,
            Some("27"),
            CreateTransactionInput {
                transaction_type: TransactionType::Estimate,
                transaction_number: "EST-1".to_string(),
                status: TransactionStatus::Draft,
                party_id: None,
                transaction_date: None,
                lines: vec![line_by_id(item_id, 10)],
                discount: dec!(0),
                total_amount: dec!(1180),
                amount_paid: dec!(0),
                notes: None,
            },
        )
        .await
        .expect("estimate should post");

    let invoice = repo
        .convert_to_invoice(&scope, estimate.transaction.id)
        .await
        .expect("conversion should succeed");

    repo.delete_transaction(&scope, estimate.transaction.id)
        .await
        .expect("converted estimate must still be deletable");

    // The invoice survives with its conversion link cleared
    let survivor = repo
        .get_transaction(&scope, invoice.transaction.id)
        .await
        .expect("invoice should survive the source deletion");
    assert_eq!(survivor.transaction.converted_from, None);

    // The estimate never moved stock, so deleting it reverses nothing
    assert_eq!(stock_of(&db, &scope, item_id).await, 90);
}

#[tokio::test]
async fn test_item_names_unique_per_company_only() {
    let Some(db) = test_db().await else { return };
    let scope_a = fresh_scope();
    let scope_b = fresh_scope();
    let repo = ItemRepository::new(db.clone());

    let input = || CreateItemInput {
        name: "Widget".to_string(),
        sale_price: dec!(100),
        purchase_price: dec!(80),
        stock: 0,
        gst_rate: dec!(18),
        hsn_code: None,
    };

    repo.create(&scope_a, input())
        .await
        .expect("first create should succeed");

    let duplicate = repo.create(&scope_a, input()).await;
    assert!(matches!(
        duplicate,
        Err(ItemError::DuplicateName(ref n)) if n == "Widget"
    ));

    // The same name is free under another company
    repo.create(&scope_b, input())
        .await
        .expect("another company may reuse the name");
}

#[tokio::test]
async fn test_concurrent_postings_by_name_converge_on_one_item() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();

    let results = futures::future::join_all((0..8).map(|i| {
        let repo = TransactionRepository::new(db.clone());
        let scope = scope.clone();
        async move {
            repo.create_transaction(
                &scope,
                None,
                CreateTransactionInput {
                    transaction_type: TransactionType::Purchase,
                    transaction_number: format!("PUR-{i}"),
                    status: TransactionStatus::Draft,
                    party_id: None,
                    transaction_date: None,
                    lines: vec![LineInput {
                        item_id: None,
                        name: Some("Hex Nut".to_string()),
                        quantity: 10,
                        rate: dec!(2),
                    }],
                    discount: dec!(0),
                    total_amount: dec!(20),
                    amount_paid: dec!(20),
                    notes: None,
                },
            )
            .await
        }
    }))
    .await;

    for result in results {
        result.expect("every concurrent posting should succeed");
    }

    let items = ItemRepository::new(db.clone())
        .list(&scope)
        .await
        .expect("list should succeed");
    assert_eq!(items.len(), 1, "concurrent postings must converge on one item");
    assert_eq!(items[0].stock, 80);
}

#[tokio::test]
async fn test_conversion_number_collision_is_a_conflict() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());

    // A client-supplied sale already occupies the number the sequence will generate
    repo.create_transaction(
        &scope,
        None,
        sale_input("1", None, vec![line_by_id(item_id, 1)]),
    )
    .await
    .expect("sale should post");

    let estimate = repo
        .create_transaction(
            &scope,
            None,
            CreateTransactionInput {
                transaction_type: TransactionType::Estimate,
                transaction_number: "EST-1".to_string(),
                status: TransactionStatus::Draft,
                party_id: None,
                transaction_date: None,
                lines: vec![line_by_id(item_id, 10)],
                discount: dec!(0),
                total_amount: dec!(1180),
                amount_paid: dec!(0),
                notes: None,
            },
        )
        .await
        .expect("estimate should post");

    let result = repo.convert_to_invoice(&scope, estimate.transaction.id).await;
    assert!(matches!(
        result,
        Err(TransactionError::DuplicateNumber(ref n)) if n == "1"
    ));

    // The failed conversion rolled back: source untouched, no stock moved
    let source = repo
        .get_transaction(&scope, estimate.transaction.id)
        .await
        .expect("estimate should remain");
    assert_ne!(source.transaction.status, DbTransactionStatus::Invoiced);
    assert_eq!(stock_of(&db, &scope, item_id).await, 99);
}

#[tokio::test]
async fn test_sequence_numbers_are_monotonic() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let repo = SequenceRepository::new(db.clone());

    let first = repo
        .next_number(&scope, TransactionType::Sale)
        .await
        .expect("sequence should advance");
    let second = repo
        .next_number(&scope, TransactionType::Sale)
        .await
        .expect("sequence should advance");
    let other_type = repo
        .next_number(&scope, TransactionType::Estimate)
        .await
        .expect("sequence should advance");

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(other_type, 1, "each type counts independently");
}

#[tokio::test]
async fn test_concurrent_sequence_allocations_never_collide() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();

    let allocations = futures::future::join_all((0..16).map(|_| {
        let repo = SequenceRepository::new(db.clone());
        let scope = scope.clone();
        async move { repo.next_number(&scope, TransactionType::Sale).await }
    }))
    .await;

    let mut numbers: Vec<i64> = allocations
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("all allocations should succeed");
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=16).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_list_filters_by_type_party_and_date() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 1000).await;
    let party_id = create_party(&db, &scope, "Sharma Traders", None).await;

    let march_15 = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap()
        .and_utc();
    let april_2 = NaiveDate::from_ymd_opt(2026, 4, 2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        .and_utc();

    let repo = TransactionRepository::new(db.clone());
    let mut sale = sale_input("INV-1", Some(party_id), vec![line_by_id(item_id, 1)]);
    sale.transaction_date = Some(march_15.into());
    repo.create_transaction(&scope, None, sale)
        .await
        .expect("sale should post");

    let purchase = CreateTransactionInput {
        transaction_type: TransactionType::Purchase,
        transaction_number: "PUR-1".to_string(),
        status: TransactionStatus::Draft,
        party_id: None,
        transaction_date: Some(april_2.into()),
        lines: vec![line_by_id(item_id, 5)],
        discount: dec!(0),
        total_amount: dec!(590),
        amount_paid: dec!(0),
        notes: None,
    };
    repo.create_transaction(&scope, None, purchase)
        .await
        .expect("purchase should post");

    // No filter: both, newest first
    let all = repo
        .list_transactions(&scope, TransactionFilter::default())
        .await
        .expect("list should succeed");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].transaction.transaction_number, "PUR-1");

    // Type filter
    let sales = repo
        .list_transactions(
            &scope,
            TransactionFilter {
                types: vec![TransactionType::Sale],
                ..Default::default()
            },
        )
        .await
        .expect("list should succeed");
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].transaction.transaction_number, "INV-1");

    // Party filter
    let by_party = repo
        .list_transactions(
            &scope,
            TransactionFilter {
                party_id: Some(party_id),
                ..Default::default()
            },
        )
        .await
        .expect("list should succeed");
    assert_eq!(by_party.len(), 1);

    // Date range: the end date covers the whole day
    let march = repo
        .list_transactions(
            &scope,
            TransactionFilter {
                date_from: NaiveDate::from_ymd_opt(2026, 3, 1),
                date_to: NaiveDate::from_ymd_opt(2026, 3, 15),
                ..Default::default()
            },
        )
        .await
        .expect("list should succeed");
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].transaction.transaction_number, "INV-1");
}

#[tokio::test]
async fn test_update_recomputes_balance_due() {
    let Some(db) = test_db().await else { return };
    let scope = fresh_scope();
    let item_id = create_item(&db, &scope, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope,
            None,
            sale_input("INV-1", None, vec![line_by_id(item_id, 10)]),
        )
        .await
        .expect("posting should succeed");
    assert_eq!(view.transaction.balance_due, dec!(1180));

    let updated = repo
        .update_transaction(
            &scope,
            view.transaction.id,
            UpdateTransactionInput {
                amount_paid: Some(dec!(500)),
                status: Some(TransactionStatus::Sent),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");

    assert_eq!(updated.transaction.amount_paid, dec!(500));
    assert_eq!(updated.transaction.balance_due, dec!(680));
    assert_eq!(updated.transaction.status, DbTransactionStatus::Sent);
    // Lines untouched by header edits
    assert_eq!(updated.lines.len(), 1);
}

#[tokio::test]
async fn test_company_scoping_hides_other_tenants() {
    let Some(db) = test_db().await else { return };
    let scope_a = fresh_scope();
    let scope_b = fresh_scope();
    let item_id = create_item(&db, &scope_a, "Widget", dec!(18), 100).await;

    let repo = TransactionRepository::new(db.clone());
    let view = repo
        .create_transaction(
            &scope_a,
            None,
            sale_input("INV-1", None, vec![line_by_id(item_id, 1)]),
        )
        .await
        .expect("posting should succeed");

    assert!(matches!(
        repo.get_transaction(&scope_b, view.transaction.id).await,
        Err(TransactionError::NotFound(_))
    ));
    let listed = repo
        .list_transactions(&scope_b, TransactionFilter::default())
        .await
        .expect("list should succeed");
    assert!(listed.is_empty());

    // An item from another company cannot be referenced
    let cross = repo
        .create_transaction(
            &scope_b,
            None,
            sale_input("INV-1", None, vec![line_by_id(item_id, 1)]),
        )
        .await;
    assert!(matches!(
        cross,
        Err(TransactionError::Posting(PostingError::ItemNotFound(_)))
    ));
}
