//! Initial database migration.
//!
//! Creates the enums, catalog tables, transaction tables, and number
//! sequences for the invoicing backend.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG TABLES
        // ============================================================
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(PARTIES_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_LINES_SQL).await?;

        // ============================================================
        // PART 4: NUMBER SEQUENCES
        // ============================================================
        db.execute_unprepared(SEQUENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Commercial transaction types (wire names, camelCase)
CREATE TYPE transaction_type AS ENUM (
    'sale',
    'purchase',
    'saleReturn',
    'purchaseReturn',
    'estimate',
    'saleOrder',
    'purchaseOrder',
    'paymentIn',
    'paymentOut',
    'expense'
);

-- Document lifecycle states
CREATE TYPE transaction_status AS ENUM (
    'Draft',
    'Sent',
    'Viewed',
    'Accepted',
    'Rejected',
    'Invoiced'
);

-- Party classification
CREATE TYPE party_type AS ENUM (
    'customer',
    'supplier'
);
";

const ITEMS_SQL: &str = r"
-- Inventory items, unique by name within a company
CREATE TABLE items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    sale_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    purchase_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    stock BIGINT NOT NULL DEFAULT 0,
    gst_rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    hsn_code VARCHAR(20),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_items_company_name UNIQUE (company_code, name),
    CONSTRAINT chk_items_gst_rate CHECK (gst_rate >= 0 AND gst_rate <= 100)
);

CREATE INDEX idx_items_company ON items(company_code, name);
";

const PARTIES_SQL: &str = r"
-- Customers and suppliers, unique by name within a company
CREATE TABLE parties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    party_type party_type NOT NULL,
    gstin VARCHAR(15),
    phone VARCHAR(20),
    email VARCHAR(255),
    billing_address TEXT,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_parties_company_name UNIQUE (company_code, name)
);

CREATE INDEX idx_parties_company_type ON parties(company_code, party_type);
";

const TRANSACTIONS_SQL: &str = r"
-- Transaction headers
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_code VARCHAR(50) NOT NULL,
    transaction_type transaction_type NOT NULL,
    status transaction_status NOT NULL DEFAULT 'Draft',
    transaction_number VARCHAR(50) NOT NULL,
    party_id UUID REFERENCES parties(id),
    party_gstin VARCHAR(15),
    subtotal NUMERIC(19, 4) NOT NULL DEFAULT 0,
    discount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(19, 4) NOT NULL,
    amount_paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    balance_due NUMERIC(19, 4) NOT NULL DEFAULT 0,
    transaction_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    converted_from UUID REFERENCES transactions(id) ON DELETE SET NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_transactions_number UNIQUE (company_code, transaction_type, transaction_number)
);

-- Listing is always newest-first within a company
CREATE INDEX idx_transactions_company_date
    ON transactions(company_code, transaction_date DESC, created_at DESC);

CREATE INDEX idx_transactions_party ON transactions(party_id) WHERE party_id IS NOT NULL;
";

const TRANSACTION_LINES_SQL: &str = r"
-- Per-item lines with tax snapshots taken at posting time
CREATE TABLE transaction_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id),
    line_no INTEGER NOT NULL,
    quantity BIGINT NOT NULL,
    rate NUMERIC(19, 4) NOT NULL,
    gst_rate NUMERIC(5, 2) NOT NULL,
    hsn_code VARCHAR(20),
    taxable_value NUMERIC(19, 4) NOT NULL,
    cgst NUMERIC(19, 4) NOT NULL DEFAULT 0,
    sgst NUMERIC(19, 4) NOT NULL DEFAULT 0,
    igst NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_lines_transaction_line_no UNIQUE (transaction_id, line_no),
    CONSTRAINT chk_lines_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_lines_transaction ON transaction_lines(transaction_id);
CREATE INDEX idx_lines_item ON transaction_lines(item_id);
";

const SEQUENCES_SQL: &str = r"
-- Atomic per-company, per-type document number counters
CREATE TABLE sequences (
    key VARCHAR(100) PRIMARY KEY,
    value BIGINT NOT NULL DEFAULT 0
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS sequences CASCADE;
DROP TABLE IF EXISTS transaction_lines CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS parties CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TYPE IF EXISTS party_type;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_type;
";
