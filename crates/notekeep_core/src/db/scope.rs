//! Per-request unit of work.
//!
//! # Responsibility
//! - Bind one request to one connection and a generated `request_id`.
//! - Run writes in an immediate transaction and reads in a deferred one.
//! - Bound statement execution by an optional request deadline.
//!
//! # Invariants
//! - A write either commits fully or rolls back; an `Err` from the closure
//!   drops the transaction, which rolls it back.
//! - The deadline progress handler never outlives the scope.

use crate::error::{CoreError, CoreResult};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// SQLite VM instructions between deadline checks.
const DEADLINE_CHECK_INTERVAL_OPS: i32 = 1_000;

/// Explicit request scope over one store connection.
pub struct RequestScope<'conn> {
    conn: &'conn mut Connection,
    request_id: Uuid,
    deadline: Option<Instant>,
}

impl<'conn> RequestScope<'conn> {
    /// Opens a scope without a deadline.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn,
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    /// Opens a scope whose statements are interrupted once `timeout` elapses.
    ///
    /// Interrupted statements fail with a `Store` error and the enclosing
    /// transaction rolls back. A timeout too large to represent as an
    /// `Instant` means no deadline.
    pub fn with_timeout(conn: &'conn mut Connection, timeout: Duration) -> Self {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Self::new(conn);
        };
        conn.progress_handler(
            DEADLINE_CHECK_INTERVAL_OPS,
            Some(move || Instant::now() >= deadline),
        );
        Self {
            conn,
            request_id: Uuid::new_v4(),
            deadline: Some(deadline),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Runs `op` inside an immediate (write-locking) transaction.
    pub fn write<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        self.run(op, "write", TransactionBehavior::Immediate, f)
    }

    /// Runs `op` inside a deferred transaction so every statement shares one
    /// snapshot.
    pub fn read<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        self.run(op, "read", TransactionBehavior::Deferred, f)
    }

    fn run<T>(
        &mut self,
        op: &'static str,
        mode: &'static str,
        behavior: TransactionBehavior,
        f: impl FnOnce(&Transaction<'_>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let started_at = Instant::now();
        let result = run_in_transaction(self.conn, behavior, f);
        self.log_outcome(op, mode, started_at, &result);
        result
    }

    fn log_outcome<T>(
        &self,
        op: &'static str,
        mode: &'static str,
        started_at: Instant,
        result: &CoreResult<T>,
    ) {
        let duration_ms = started_at.elapsed().as_millis();
        match result {
            Ok(_) => info!(
                "event=db_tx module=db status=ok request_id={} op={op} mode={mode} duration_ms={duration_ms}",
                self.request_id
            ),
            Err(err) if err.is_store() => {
                let detail = err
                    .source()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                error!(
                    "event=db_tx module=db status=error request_id={} op={op} mode={mode} duration_ms={duration_ms} error_code={} deadline_exceeded={} error={detail}",
                    self.request_id,
                    err.code(),
                    self.deadline_exceeded(),
                );
            }
            Err(err) => warn!(
                "event=db_tx module=db status=rejected request_id={} op={op} mode={mode} duration_ms={duration_ms} error_code={}",
                self.request_id,
                err.code()
            ),
        }
    }

    fn deadline_exceeded(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }
}

impl Drop for RequestScope<'_> {
    fn drop(&mut self) {
        if self.deadline.is_some() {
            self.conn.progress_handler(0, None::<fn() -> bool>);
        }
    }
}

fn run_in_transaction<T>(
    conn: &mut Connection,
    behavior: TransactionBehavior,
    f: impl FnOnce(&Transaction<'_>) -> CoreResult<T>,
) -> CoreResult<T> {
    let tx = conn
        .transaction_with_behavior(behavior)
        .map_err(CoreError::from)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::RequestScope;
    use crate::error::CoreError;
    use rusqlite::Connection;
    use std::time::Duration;

    fn counter_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE counter (value INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn count_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM counter;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn write_commits_on_ok() {
        let mut conn = counter_db();
        let mut scope = RequestScope::new(&mut conn);
        scope
            .write("insert", |tx| {
                tx.execute("INSERT INTO counter (value) VALUES (1);", [])?;
                Ok(())
            })
            .unwrap();
        drop(scope);
        assert_eq!(count_rows(&conn), 1);
    }

    #[test]
    fn write_rolls_back_on_early_error() {
        let mut conn = counter_db();
        let mut scope = RequestScope::new(&mut conn);
        let err = scope
            .write::<()>("insert_then_fail", |tx| {
                tx.execute("INSERT INTO counter (value) VALUES (1);", [])?;
                Err(CoreError::Validation("late rejection".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        drop(scope);
        assert_eq!(count_rows(&conn), 0);
    }

    #[test]
    fn expired_deadline_interrupts_statements() {
        let mut conn = counter_db();
        let mut scope = RequestScope::with_timeout(&mut conn, Duration::ZERO);
        let err = scope
            .read("slow_scan", |tx| {
                let total: i64 = tx.query_row(
                    "WITH RECURSIVE seq(n) AS (
                        SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 10000000
                     )
                     SELECT SUM(n) FROM seq;",
                    [],
                    |row| row.get(0),
                )?;
                Ok(total)
            })
            .unwrap_err();
        assert!(err.is_store());
        drop(scope);

        // Handler is removed with the scope.
        let mut scope = RequestScope::new(&mut conn);
        let rows = scope
            .read("count", |tx| {
                Ok(tx.query_row("SELECT COUNT(*) FROM counter;", [], |row| {
                    row.get::<_, i64>(0)
                })?)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn unrepresentable_timeout_runs_without_deadline() {
        let mut conn = counter_db();
        let mut scope = RequestScope::with_timeout(&mut conn, Duration::MAX);
        assert!(scope.deadline.is_none());
        scope
            .write("insert", |tx| {
                tx.execute("INSERT INTO counter (value) VALUES (1);", [])?;
                Ok(())
            })
            .unwrap();
        drop(scope);
        assert_eq!(count_rows(&conn), 1);
    }

    #[test]
    fn request_ids_are_unique_per_scope() {
        let mut conn = counter_db();
        let first = RequestScope::new(&mut conn).request_id();
        let second = RequestScope::new(&mut conn).request_id();
        assert_ne!(first, second);
    }
}
