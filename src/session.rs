/// Session Module
///
/// A session owns the lifecycle of one database connection, at most one
/// in-flight command, and at most one transaction, and exposes the public
/// data-access operations: fetch-all, find-by-criteria, count, and
/// parameterized select/insert/update/delete.
///
/// ## State machine
///
/// A session moves through `Idle -> Open -> Closed`. `open` is idempotent
/// while open, `Closed` is terminal, and `close` is defined per state: it
/// never assumes a transaction or command exists, so it is safe to call
/// from any teardown path (`Drop` invokes it unconditionally).
///
/// ## Concurrency
///
/// Single-threaded, synchronous, blocking. Every operation takes
/// `&mut self`, so the borrow checker serializes callers and guarantees no
/// concurrent in-flight commands on one session. Statements live inside the
/// scope of the operation that prepared them and are released when the row
/// cursor is drained or abandoned early.
use crate::config::{Config, ConnectionProfile};
use crate::core::{LitedalError, Result};
use crate::criteria::Criteria;
use crate::dialect::{Dialect, TransactionBehavior};
use crate::record::{bind_record, Record};
use crate::sql::{self, resolve_placeholders};
use rusqlite::{Connection, Row, ToSql};
use tracing::{debug, error};

/// Transaction state of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// No active transaction (autocommit mode)
    #[default]
    Autocommit,
    /// Transaction in progress
    Transaction,
}

#[derive(Debug)]
enum SessionState {
    /// Constructed but not yet connected
    Idle,
    /// Live connection with its transaction state
    Open {
        conn: Connection,
        tx: TransactionState,
    },
    /// Terminal: the connection has been released
    Closed,
}

/// A database session: one connection, one pending command, at most one
/// transaction.
///
/// # Examples
///
/// ```no_run
/// use litedal::{Criteria, Session};
///
/// # fn demo() -> litedal::Result<()> {
/// let mut session = Session::open_path("app.db")?;
/// let adults = session.count("people", Some(&Criteria::new().with("age", 18)))?;
/// session.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    profile: ConnectionProfile,
    dialect: Dialect,
    state: SessionState,
}

impl Session {
    /// Creates an idle session for the given profile. No connection is
    /// established until `open` is called.
    pub fn new(profile: ConnectionProfile) -> Self {
        Session {
            profile,
            dialect: Dialect::default(),
            state: SessionState::Idle,
        }
    }

    /// Creates an idle session from a named configuration profile.
    ///
    /// # Errors
    ///
    /// `Config` when no profile is registered under the key.
    pub fn from_config(config: &Config, key: &str) -> Result<Self> {
        Ok(Session::new(config.profile(key)?.clone()))
    }

    /// Creates a session for the given database path and opens it.
    pub fn open_path(path: impl Into<String>) -> Result<Self> {
        let mut session = Session::new(ConnectionProfile::new(path));
        session.open()?;
        Ok(session)
    }

    /// Creates and opens an in-memory session.
    pub fn in_memory() -> Result<Self> {
        Session::open_path(":memory:")
    }

    /// Dialect used for generated statements.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // ---- Connection lifecycle ----

    /// Establishes the connection if not already open. Idempotent while
    /// open; a closed session cannot be reopened.
    pub fn open(&mut self) -> Result<()> {
        match &self.state {
            SessionState::Open { .. } => Ok(()),
            SessionState::Closed => Err(LitedalError::Connection(
                "session is closed".to_string(),
            )),
            SessionState::Idle => {
                let conn = Connection::open(&self.profile.path)?;
                if let Some(pragmas) = &self.profile.pragmas {
                    for pragma in pragmas {
                        conn.execute_batch(pragma)?;
                    }
                }
                debug!(path = %self.profile.path, "opened connection");
                self.state = SessionState::Open {
                    conn,
                    tx: TransactionState::default(),
                };
                Ok(())
            }
        }
    }

    /// Closes the session: rolls back any active transaction and releases
    /// the connection. Defined per current state, so it is safe to call at
    /// any point, any number of times.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Open { conn, tx } => {
                if tx == TransactionState::Transaction {
                    // The connection is released regardless of the outcome.
                    conn.execute_batch(self.dialect.rollback_sql())?;
                    debug!("rolled back active transaction on close");
                }
                debug!("closed connection");
                Ok(())
            }
            SessionState::Idle | SessionState::Closed => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// Current transaction state; `Autocommit` when the session is not open.
    pub fn transaction_state(&self) -> TransactionState {
        match &self.state {
            SessionState::Open { tx, .. } => *tx,
            _ => TransactionState::default(),
        }
    }

    // ---- Transactions ----

    /// Starts a transaction if none is active. A second call while a
    /// transaction is in progress is silently ignored.
    pub fn begin_transaction(&mut self, behavior: TransactionBehavior) -> Result<()> {
        let begin_sql = self.dialect.begin_sql(behavior);
        let (conn, tx) = self.open_parts_mut()?;
        if *tx == TransactionState::Transaction {
            return Ok(());
        }
        conn.execute_batch(begin_sql)?;
        *tx = TransactionState::Transaction;
        debug!("transaction started");
        Ok(())
    }

    /// Commits the active transaction; no-op when none is active.
    pub fn commit(&mut self) -> Result<()> {
        let commit_sql = self.dialect.commit_sql();
        let (conn, tx) = self.open_parts_mut()?;
        if *tx != TransactionState::Transaction {
            return Ok(());
        }
        conn.execute_batch(commit_sql)?;
        *tx = TransactionState::Autocommit;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls back the active transaction; no-op when none is active.
    pub fn rollback(&mut self) -> Result<()> {
        let rollback_sql = self.dialect.rollback_sql();
        let (conn, tx) = self.open_parts_mut()?;
        if *tx != TransactionState::Transaction {
            return Ok(());
        }
        conn.execute_batch(rollback_sql)?;
        *tx = TransactionState::Autocommit;
        debug!("transaction rolled back");
        Ok(())
    }

    // ---- Query operations ----

    /// Fetches every row of a table as generic records.
    pub fn fetch_all(&mut self, table: &str) -> Result<Vec<Record>> {
        self.fetch_all_with(table, bind_record)
    }

    /// Fetches every row of a table through a caller-supplied binder.
    pub fn fetch_all_with<T, F>(&mut self, table: &str, binder: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        let table = validate_table(table)?;
        let sql_text = sql::select_all(self.dialect, table);
        self.select_method(&sql_text, None, binder, None)
    }

    /// Counts rows in a table, optionally filtered by criteria. Empty
    /// criteria count the whole table.
    pub fn count(&mut self, table: &str, criteria: Option<&Criteria>) -> Result<i64> {
        let table = validate_table(table)?;
        let mut sql_text = sql::count_rows(self.dialect, table);

        match criteria.filter(|c| !c.is_empty()) {
            Some(criteria) => {
                sql_text.push(' ');
                sql_text.push_str(&sql::where_clause(criteria));
                self.execute_scalar(&sql_text, Some(criteria))
            }
            None => self.execute_scalar(&sql_text, None),
        }
    }

    /// Counts rows matching a raw condition. The condition is appended
    /// verbatim after `WHERE`; criteria are mandatory and must cover every
    /// placeholder in the combined text.
    pub fn count_where(
        &mut self,
        table: &str,
        condition: &str,
        criteria: &Criteria,
    ) -> Result<i64> {
        let table = validate_table(table)?;
        let condition = validate_condition(condition)?;
        require_criteria(criteria, "count with a raw condition")?;

        let sql_text = format!("{} WHERE {}", sql::count_rows(self.dialect, table), condition);
        self.execute_scalar(&sql_text, Some(criteria))
    }

    /// Finds the first record matching the criteria.
    ///
    /// # Errors
    ///
    /// `MissingCriteria` for empty criteria; `NoRows` when nothing matches.
    pub fn find_one(&mut self, table: &str, criteria: &Criteria) -> Result<Record> {
        self.find_one_with(table, criteria, bind_record)
    }

    /// Typed variant of `find_one`.
    pub fn find_one_with<T, F>(&mut self, table: &str, criteria: &Criteria, binder: F) -> Result<T>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        let table = validate_table(table)?;
        require_criteria(criteria, "find_one")?;

        let sql_text = format!(
            "{} {}",
            sql::select_all(self.dialect, table),
            sql::where_clause(criteria)
        );
        let rows = self.select_method(&sql_text, Some(criteria), binder, Some(1))?;
        rows.into_iter().next().ok_or(LitedalError::NoRows)
    }

    /// Finds the first record matching a raw condition. The condition is
    /// appended verbatim after `WHERE`; criteria are mandatory.
    pub fn find_one_where(
        &mut self,
        table: &str,
        condition: &str,
        criteria: &Criteria,
    ) -> Result<Record> {
        self.find_one_where_with(table, condition, criteria, bind_record)
    }

    /// Typed variant of `find_one_where`.
    pub fn find_one_where_with<T, F>(
        &mut self,
        table: &str,
        condition: &str,
        criteria: &Criteria,
        binder: F,
    ) -> Result<T>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        let table = validate_table(table)?;
        let condition = validate_condition(condition)?;
        require_criteria(criteria, "find_one with a raw condition")?;

        let sql_text = format!(
            "{} WHERE {}",
            sql::select_all(self.dialect, table),
            condition
        );
        let rows = self.select_method(&sql_text, Some(criteria), binder, Some(1))?;
        rows.into_iter().next().ok_or(LitedalError::NoRows)
    }

    /// Runs arbitrary caller SQL and materializes every row as a generic
    /// record.
    pub fn select(&mut self, sql_text: &str, criteria: Option<&Criteria>) -> Result<Vec<Record>> {
        self.select_with(sql_text, criteria, bind_record)
    }

    /// Runs arbitrary caller SQL through a caller-supplied binder.
    pub fn select_with<T, F>(
        &mut self,
        sql_text: &str,
        criteria: Option<&Criteria>,
        binder: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        self.select_method(sql_text, criteria, binder, None)
    }

    /// Streams rows to a callback without materializing a vector. Returns
    /// the number of rows visited.
    pub fn for_each_row<F>(
        &mut self,
        sql_text: &str,
        criteria: Option<&Criteria>,
        mut f: F,
    ) -> Result<usize>
    where
        F: FnMut(&Row) -> Result<()>,
    {
        let visited = self.select_method(sql_text, criteria, |row| f(row), None)?;
        Ok(visited.len())
    }

    // ---- Mutation operations ----

    /// Runs an insert statement and returns the generated identity value.
    pub fn insert(&mut self, sql_text: &str, criteria: &Criteria) -> Result<i64> {
        self.execute(sql_text, Some(criteria), true)
    }

    /// Runs an update statement and returns the rows-affected count.
    pub fn update(&mut self, sql_text: &str, criteria: &Criteria) -> Result<i64> {
        self.execute(sql_text, Some(criteria), false)
    }

    /// Runs a delete statement and returns the rows-affected count.
    pub fn delete(&mut self, sql_text: &str, criteria: Option<&Criteria>) -> Result<i64> {
        self.execute(sql_text, criteria, false)
    }

    /// Runs a mutation statement.
    ///
    /// With `return_identity` the result is the identity generated by the
    /// statement (retrieved via the dialect's identity query), returned in
    /// the rows-affected position; the two meanings share one return value
    /// by design, so callers pick the interpretation via the flag. Without
    /// it, the result is the rows-affected count.
    ///
    /// Placeholders in the text must be covered by the criteria, exactly as
    /// for queries.
    pub fn execute(
        &mut self,
        sql_text: &str,
        criteria: Option<&Criteria>,
        return_identity: bool,
    ) -> Result<i64> {
        let sql_text = validate_command(sql_text)?;
        let params = resolve_placeholders(sql_text, criteria)?;
        let identity_sql = self.dialect.identity_sql();
        let conn = self.conn()?;

        let affected = {
            let mut statement = conn.prepare(sql_text)?;
            statement.execute(param_refs(&params).as_slice())?
        };

        if return_identity {
            let identity: i64 = conn.query_row(identity_sql, [], |row| row.get(0))?;
            debug!(identity, "statement executed");
            Ok(identity)
        } else {
            debug!(rows = affected, "statement executed");
            Ok(affected as i64)
        }
    }

    // ---- Execution primitives ----

    /// Prepares, binds, and runs a query, yielding one bound record per row
    /// as the cursor advances. Forward-only and single-pass: the statement
    /// and cursor are dropped when the rows are drained, when `limit` is
    /// reached, or when an error abandons the iteration early.
    fn select_method<T, F>(
        &mut self,
        sql_text: &str,
        criteria: Option<&Criteria>,
        mut binder: F,
        limit: Option<usize>,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        let sql_text = validate_command(sql_text)?;
        let params = resolve_placeholders(sql_text, criteria)?;
        let conn = self.conn()?;

        let mut statement = conn.prepare(sql_text)?;
        let mut rows = statement.query(param_refs(&params).as_slice())?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(binder(row)?);
            if limit.map_or(false, |n| out.len() >= n) {
                break;
            }
        }
        debug!(rows = out.len(), "query executed");
        Ok(out)
    }

    /// Runs a query expected to yield a single scalar (first column of the
    /// first row).
    fn execute_scalar(&mut self, sql_text: &str, criteria: Option<&Criteria>) -> Result<i64> {
        let values = self.select_method(
            sql_text,
            criteria,
            |row| row.get::<_, i64>(0).map_err(LitedalError::from),
            Some(1),
        )?;
        values.into_iter().next().ok_or(LitedalError::NoRows)
    }

    fn conn(&self) -> Result<&Connection> {
        match &self.state {
            SessionState::Open { conn, .. } => Ok(conn),
            SessionState::Idle => Err(LitedalError::Connection(
                "session is not open".to_string(),
            )),
            SessionState::Closed => Err(LitedalError::Connection(
                "session is closed".to_string(),
            )),
        }
    }

    fn open_parts_mut(&mut self) -> Result<(&mut Connection, &mut TransactionState)> {
        match &mut self.state {
            SessionState::Open { conn, tx } => Ok((conn, tx)),
            SessionState::Idle => Err(LitedalError::Connection(
                "session is not open".to_string(),
            )),
            SessionState::Closed => Err(LitedalError::Connection(
                "session is closed".to_string(),
            )),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("failed to close session during drop: {}", e);
        }
    }
}

fn param_refs<'a>(params: &'a [(String, &'a crate::value::Value)]) -> Vec<(&'a str, &'a dyn ToSql)> {
    params
        .iter()
        .map(|(name, value)| (name.as_str(), *value as &dyn ToSql))
        .collect()
}

fn validate_table(table: &str) -> Result<&str> {
    if table.trim().is_empty() {
        return Err(LitedalError::InvalidArgument(
            "table name is empty".to_string(),
        ));
    }
    Ok(table)
}

fn validate_command(sql_text: &str) -> Result<&str> {
    if sql_text.trim().is_empty() {
        return Err(LitedalError::InvalidArgument(
            "command text is empty".to_string(),
        ));
    }
    Ok(sql_text)
}

fn validate_condition(condition: &str) -> Result<&str> {
    if condition.trim().is_empty() {
        return Err(LitedalError::InvalidArgument(
            "condition is empty".to_string(),
        ));
    }
    Ok(condition)
}

fn require_criteria(criteria: &Criteria, operation: &str) -> Result<()> {
    if criteria.is_empty() {
        return Err(LitedalError::MissingCriteria(format!(
            "{} requires at least one criteria entry",
            operation
        )));
    }
    Ok(())
}
