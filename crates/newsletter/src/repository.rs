//! Subscriber persistence on SQL Server.
//!
//! Statements are generated from the [`Subscriber`] catalog and run through an
//! [`SqlExecutor`], which owns connections, cancellation and timeouts.

use std::future::Future;

use newsletter_sql::{
    FieldSet, FragmentError, IsolationLevel, TransactionScript, column_names, column_values,
    quote_nstring, update_assignments,
};
use thiserror::Error;

use crate::entity::Subscriber;
use crate::row::{FromRow, Row, RowError};

/// Fields the database sets itself on insert and update.
const MANAGED_FIELDS: [&str; 5] = [
    "id",
    "is_subscribed",
    "subscribed_date",
    "unsubscribed_date",
    "del_flag",
];

/// Errors raised by an [`SqlExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Statement failed: {0}")]
    Statement(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Row(#[from] RowError),
}

/// Runs SQL text against the database.
pub trait SqlExecutor: Send + Sync {
    /// Run a query and return all rows.
    fn query(&self, sql: &str) -> impl Future<Output = Result<Vec<Row>, ExecError>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> impl Future<Output = Result<u64, ExecError>> + Send;
}

/// Storage operations for subscribers.
pub trait SubscriberRepository: Send + Sync {
    /// Active, subscribed rows.
    fn get_all_subscribers(&self) -> impl Future<Output = RepoResult<Vec<Subscriber>>> + Send;

    /// Active rows with this email (zero or more).
    fn find_by_email(&self, email: &str)
    -> impl Future<Output = RepoResult<Vec<Subscriber>>> + Send;

    /// Insert a new, subscribed row from the contact fields.
    fn insert(&self, subscriber: &Subscriber) -> impl Future<Output = RepoResult<()>> + Send;

    /// Update the contact fields and toggle the subscription by email.
    fn update_by_email(&self, subscriber: &Subscriber)
    -> impl Future<Output = RepoResult<()>> + Send;

    /// Delete soft-deleted rows; returns the number removed.
    fn purge_deleted(&self) -> impl Future<Output = RepoResult<u64>> + Send;
}

/// Statement text for the subscribers table.
#[derive(Debug, Clone)]
pub struct SubscriberStatements {
    table: String,
}

impl SubscriberStatements {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select_subscribed(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE Delflag = 0 AND IsSubscribed = 1",
            column_names::<Subscriber>(&FieldSet::new(), ""),
            self.table
        )
    }

    pub fn select_by_email(&self, email: &str) -> String {
        format!(
            "SELECT {} FROM {} WHERE Delflag = 0 AND Email = {}",
            column_names::<Subscriber>(&FieldSet::new(), ""),
            self.table,
            quote_nstring(email)
        )
    }

    pub fn insert(&self, subscriber: &Subscriber) -> Result<String, FragmentError> {
        let managed = FieldSet::of(MANAGED_FIELDS);
        Ok(format!(
            "INSERT INTO {} ({},[IsSubscribed],[SubscribedDate],[UnsubscribedDate],[Delflag]) \
             VALUES ({},1,GETDATE(),Null,0)",
            self.table,
            column_names::<Subscriber>(&managed, ""),
            column_values(subscriber, &managed)?
        ))
    }

    pub fn update_by_email(&self, subscriber: &Subscriber) -> Result<String, FragmentError> {
        let managed = FieldSet::of(MANAGED_FIELDS);
        let toggle = if subscriber.is_subscribed {
            "IsSubscribed = 1, SubscribedDate = GETDATE()"
        } else {
            "IsSubscribed = 0, UnsubscribedDate = GETDATE()"
        };
        Ok(format!(
            "UPDATE {} SET {}, {} WHERE Email = {}",
            self.table,
            update_assignments(subscriber, &managed)?,
            toggle,
            quote_nstring(&subscriber.email)
        ))
    }

    pub fn purge_deleted(&self) -> String {
        TransactionScript::new()
            .isolation(IsolationLevel::RepeatableRead)
            .push(format!("DELETE FROM {} WHERE Delflag = 1", self.table))
            .build()
    }
}

/// [`SubscriberRepository`] over any [`SqlExecutor`].
pub struct SqlSubscriberRepository<E> {
    executor: E,
    statements: SubscriberStatements,
}

impl<E: SqlExecutor> SqlSubscriberRepository<E> {
    pub fn new(executor: E, table: impl Into<String>) -> Self {
        Self {
            executor,
            statements: SubscriberStatements::new(table),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn statements(&self) -> &SubscriberStatements {
        &self.statements
    }

    async fn fetch(&self, action: &'static str, sql: String) -> RepoResult<Vec<Subscriber>> {
        let rows = self.executor.query(&sql).await.map_err(|e| {
            tracing::error!(action, table = %self.statements.table(), error = %e, "query failed");
            e
        })?;
        rows.iter()
            .map(Subscriber::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::error!(action, table = %self.statements.table(), error = %e, "row decode failed");
                RepoError::from(e)
            })
    }

    async fn run(&self, action: &'static str, sql: String) -> RepoResult<u64> {
        let affected = self.executor.execute(&sql).await.map_err(|e| {
            tracing::error!(action, table = %self.statements.table(), error = %e, "statement failed");
            e
        })?;
        tracing::debug!(action, affected, "statement executed");
        Ok(affected)
    }
}

impl<E: SqlExecutor> SubscriberRepository for SqlSubscriberRepository<E> {
    async fn get_all_subscribers(&self) -> RepoResult<Vec<Subscriber>> {
        self.fetch("get_all_subscribers", self.statements.select_subscribed())
            .await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Vec<Subscriber>> {
        self.fetch("find_by_email", self.statements.select_by_email(email))
            .await
    }

    async fn insert(&self, subscriber: &Subscriber) -> RepoResult<()> {
        let sql = self.statements.insert(subscriber)?;
        self.run("insert", sql).await.map(|_| ())
    }

    async fn update_by_email(&self, subscriber: &Subscriber) -> RepoResult<()> {
        let sql = self.statements.update_by_email(subscriber)?;
        self.run("update_by_email", sql).await.map(|_| ())
    }

    async fn purge_deleted(&self) -> RepoResult<u64> {
        self.run("purge_deleted", self.statements.purge_deleted())
            .await
    }
}
