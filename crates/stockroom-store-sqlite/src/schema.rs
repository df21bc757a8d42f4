//! SQL schema for the Stockroom SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 UTC strings (microsecond precision,
/// `Z` suffix), so lexical order is chronological order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    role          TEXT NOT NULL CHECK (role IN ('admin', 'worker')),
    full_name     TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Sign-ups awaiting email confirmation; moved into users on confirm.
CREATE TABLE IF NOT EXISTS pending_signups (
    token_hash    TEXT PRIMARY KEY,  -- SHA-256 hex of the confirmation token
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('admin', 'worker')),
    full_name     TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,     -- SHA-256 hex of the bearer token
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    product_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (name != ''),
    description TEXT,
    price       REAL NOT NULL CHECK (price >= 0),
    category    TEXT,
    sku         TEXT,
    created_by  TEXT REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Sales are insert-only.
CREATE TABLE IF NOT EXISTS sales (
    sale_id      TEXT PRIMARY KEY,
    product_id   TEXT NOT NULL REFERENCES products(product_id),
    worker_id    TEXT NOT NULL REFERENCES users(user_id),
    quantity     INTEGER NOT NULL CHECK (quantity > 0),
    unit_price   REAL NOT NULL CHECK (unit_price >= 0),
    total_amount REAL NOT NULL,
    sale_date    TEXT NOT NULL,
    notes        TEXT,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sales_date_idx    ON sales(sale_date);
CREATE INDEX IF NOT EXISTS sales_worker_idx  ON sales(worker_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx ON sessions(user_id);

PRAGMA user_version = 1;
";
