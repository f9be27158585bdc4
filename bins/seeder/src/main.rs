//! Database seeder for Vypar development and testing.
//!
//! Seeds a demo company with a handful of items and parties so the API can
//! be exercised immediately after `migrator up`.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use vypar_db::repositories::{
    CreateItemInput, CreatePartyInput, ItemError, ItemRepository, PartyError, PartyRepository,
};
use vypar_db::entities::sea_orm_active_enums::PartyType;
use vypar_shared::types::CompanyScope;

/// Demo tenant all seeds land under.
const DEMO_COMPANY: &str = "demo";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = vypar_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let scope = CompanyScope::new(DEMO_COMPANY);

    println!("Seeding items...");
    let items = ItemRepository::new(db.clone());
    for (name, sale, purchase, stock, gst, hsn) in [
        ("A4 Paper Ream", dec!(320), dec!(260), 120, dec!(12), "4802"),
        ("Ballpoint Pen (Box)", dec!(150), dec!(100), 200, dec!(18), "9608"),
        ("Office Chair", dec!(5500), dec!(4200), 15, dec!(18), "9401"),
        ("Laptop Stand", dec!(1450), dec!(1100), 40, dec!(18), "8473"),
    ] {
        seed_item(&items, &scope, name, sale, purchase, stock, gst, hsn).await;
    }

    println!("Seeding parties...");
    let parties = PartyRepository::new(db.clone());
    seed_party(
        &parties,
        &scope,
        "Sharma Traders",
        PartyType::Customer,
        Some("27AAACS1234A1Z5"),
    )
    .await;
    seed_party(
        &parties,
        &scope,
        "Gupta & Sons",
        PartyType::Customer,
        Some("09AAACG1234A1Z5"),
    )
    .await;
    seed_party(
        &parties,
        &scope,
        "Verma Wholesale Supply",
        PartyType::Supplier,
        Some("27AAACV1234A1Z5"),
    )
    .await;
    seed_party(&parties, &scope, "Walk-in Customer", PartyType::Customer, None).await;

    println!("Done. Seeded company code: {DEMO_COMPANY}");
}

#[allow(clippy::too_many_arguments)]
async fn seed_item(
    repo: &ItemRepository,
    scope: &CompanyScope,
    name: &str,
    sale_price: Decimal,
    purchase_price: Decimal,
    stock: i64,
    gst_rate: Decimal,
    hsn_code: &str,
) {
    let input = CreateItemInput {
        name: name.to_string(),
        sale_price,
        purchase_price,
        stock,
        gst_rate,
        hsn_code: Some(hsn_code.to_string()),
    };
    match repo.create(scope, input).await {
        Ok(item) => println!("  item: {} ({})", item.name, item.id),
        Err(ItemError::DuplicateName(name)) => println!("  item: {name} (already seeded)"),
        Err(e) => panic!("failed to seed item {name}: {e}"),
    }
}

async fn seed_party(
    repo: &PartyRepository,
    scope: &CompanyScope,
    name: &str,
    party_type: PartyType,
    gstin: Option<&str>,
) {
    let input = CreatePartyInput {
        name: name.to_string(),
        party_type,
        gstin: gstin.map(str::to_string),
        phone: None,
        email: None,
        billing_address: None,
        opening_balance: dec!(0),
    };
    match repo.create(scope, input).await {
        Ok(party) => println!("  party: {} ({})", party.name, party.id),
        Err(PartyError::DuplicateName(name)) => println!("  party: {name} (already seeded)"),
        Err(e) => panic!("failed to seed party {name}: {e}"),
    }
}
