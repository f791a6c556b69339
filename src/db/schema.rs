//! Database schema and migrations for postbox.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - accounts table
    r#"
-- Accounts table for the identity store
CREATE TABLE accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    address         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password        TEXT NOT NULL,           -- Argon2 hash
    nickname        TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'active',  -- 'active', 'deactivated'
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
    deactivated_at  TEXT
);

CREATE INDEX idx_accounts_address ON accounts(address);
CREATE INDEX idx_accounts_status ON accounts(status);
"#,
    // v2: Messages table - one canonical row per send
    r#"
-- Messages table; rows are immutable once written
CREATE TABLE messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id   INTEGER NOT NULL REFERENCES accounts(id),
    subject     TEXT NOT NULL,
    body        TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'sent',  -- 'sent', 'failed'
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_messages_sender_id ON messages(sender_id);
CREATE INDEX idx_messages_created_at ON messages(created_at);
"#,
    // v3: Delivery links - one row per recipient of a message
    r#"
-- Delivery links carry per-recipient read and deleted state
CREATE TABLE delivery_links (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id    INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    recipient_id  INTEGER NOT NULL REFERENCES accounts(id),
    is_read       INTEGER NOT NULL DEFAULT 0,
    is_deleted    INTEGER NOT NULL DEFAULT 0,
    UNIQUE(message_id, recipient_id)
);

CREATE INDEX idx_delivery_links_message_id ON delivery_links(message_id);
CREATE INDEX idx_delivery_links_recipient_id ON delivery_links(recipient_id);
"#,
    // v4: Trash entries for soft-deleted delivery links
    r#"
-- Trash entries; at most one pending entry per link
CREATE TABLE trash_entries (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    link_id      INTEGER NOT NULL REFERENCES delivery_links(id) ON DELETE CASCADE,
    deleted_at   TEXT NOT NULL DEFAULT (datetime('now')),
    expires_at   TEXT NOT NULL,
    is_restored  INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX idx_trash_entries_pending_link
    ON trash_entries(link_id) WHERE is_restored = 0;
CREATE INDEX idx_trash_entries_expires_at ON trash_entries(expires_at);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_accounts_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE accounts"));
        assert!(first.contains("address"));
        assert!(first.contains("password"));
        assert!(first.contains("nickname"));
        assert!(first.contains("status"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        // Each migration should be non-empty and contain SQL keywords
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }

    #[test]
    fn test_messages_migration_contains_messages_table() {
        let messages_migration = MIGRATIONS[1];
        assert!(messages_migration.contains("CREATE TABLE messages"));
        assert!(messages_migration.contains("sender_id"));
        assert!(messages_migration.contains("subject"));
        assert!(messages_migration.contains("body"));
        assert!(messages_migration.contains("status"));
    }

    #[test]
    fn test_delivery_links_migration_contains_links_table() {
        let links_migration = MIGRATIONS[2];
        assert!(links_migration.contains("CREATE TABLE delivery_links"));
        assert!(links_migration.contains("message_id"));
        assert!(links_migration.contains("recipient_id"));
        assert!(links_migration.contains("is_read"));
        assert!(links_migration.contains("is_deleted"));
        assert!(links_migration.contains("UNIQUE(message_id, recipient_id)"));
    }

    #[test]
    fn test_trash_entries_migration_contains_trash_table() {
        let trash_migration = MIGRATIONS[3];
        assert!(trash_migration.contains("CREATE TABLE trash_entries"));
        assert!(trash_migration.contains("link_id"));
        assert!(trash_migration.contains("deleted_at"));
        assert!(trash_migration.contains("expires_at"));
        assert!(trash_migration.contains("is_restored"));
        assert!(trash_migration.contains("WHERE is_restored = 0"));
    }
}
