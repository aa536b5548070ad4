/// Dialect Module
///
/// The dialect-dependent pieces of SQL generation live here: identifier
/// quoting, identity retrieval after an insert, and transaction-begin
/// syntax. The rest of the crate is dialect-agnostic; a session picks its
/// dialect at construction time.

/// Target SQL dialect for statement generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Sqlite,
}

/// Locking behavior for `BEGIN`, the SQLite analogue of an isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionBehavior {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

impl Dialect {
    /// Wraps a table name in the dialect's identifier-quoting convention.
    ///
    /// Bracket quoting is used for generated statements; SQLite accepts it
    /// alongside double quotes. The name is interpolated without escaping;
    /// table names come from trusted code, not external input.
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::Sqlite => format!("[{}]", name),
        }
    }

    /// Statement retrieving the identity generated by the last insert on
    /// the connection.
    ///
    /// SQLite prepares one statement at a time, so this runs as a separate
    /// scalar query after the mutation rather than being appended to it.
    pub fn identity_sql(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "SELECT last_insert_rowid()",
        }
    }

    /// `BEGIN` statement for the given transaction behavior.
    pub fn begin_sql(&self, behavior: TransactionBehavior) -> &'static str {
        match (self, behavior) {
            (Dialect::Sqlite, TransactionBehavior::Deferred) => "BEGIN DEFERRED",
            (Dialect::Sqlite, TransactionBehavior::Immediate) => "BEGIN IMMEDIATE",
            (Dialect::Sqlite, TransactionBehavior::Exclusive) => "BEGIN EXCLUSIVE",
        }
    }

    pub fn commit_sql(&self) -> &'static str {
        "COMMIT"
    }

    pub fn rollback_sql(&self) -> &'static str {
        "ROLLBACK"
    }
}
