//! Rollback-on-error transaction scripts.
//!
//! [`wrap`] places an ordered list of statements inside a
//! `BEGIN TRY ... BEGIN CATCH` block that rolls back and re-raises the error
//! with its number, severity, state, procedure and line.
//!
//! ```
//! use newsletter_sql::{IsolationLevel, TransactionScript};
//!
//! let sql = TransactionScript::new()
//!     .isolation(IsolationLevel::RepeatableRead)
//!     .push("DELETE FROM TB_TRN_Subscribers WHERE Delflag = 1")
//!     .build();
//!
//! assert!(sql.starts_with("\n\tSET TRANSACTION ISOLATION LEVEL REPEATABLE READ;\n\tBEGIN"));
//! ```

use std::fmt;

const STATEMENT_SEPARATOR: &str = "\n\t\n\t";

const HEAD: &str = "\n\tBEGIN\n\tBEGIN TRY\n\tBEGIN TRANSACTION;\n\t\t";

const TAIL: &str = "\tCOMMIT TRANSACTION;
\tEND TRY

\tBEGIN CATCH
\tROLLBACK TRANSACTION;
\tDECLARE
\t    @ErrorMessage nvarchar(4000) = ERROR_MESSAGE(),
\t    @ErrorNumber int = ERROR_NUMBER(),
\t    @ErrorSeverity int = ERROR_SEVERITY(),
\t    @ErrorState int = ERROR_STATE(),
\t    @ErrorLine int = ERROR_LINE(),
\t    @ErrorProcedure nvarchar(200) = ISNULL(ERROR_PROCEDURE(), '-');
\tSELECT @ErrorMessage = N'Error %d, Level %d, State %d, Procedure %s, Line %d, ' + 'Message: ' + @ErrorMessage;
\tRAISERROR (@ErrorMessage, @ErrorSeverity, 1, @ErrorNumber, @ErrorSeverity, @ErrorState, @ErrorProcedure, @ErrorLine)
\tEND CATCH
\tEND";

/// SQL Server transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Snapshot => "SNAPSHOT",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Wrap `statements` in the rollback template.
///
/// Statements are joined with a blank tab-indented line and the last one is
/// followed by a newline. When `isolation` is set, a
/// `SET TRANSACTION ISOLATION LEVEL` line precedes the `BEGIN` block.
/// Statements are inserted verbatim.
pub fn wrap<S: AsRef<str>>(statements: &[S], isolation: Option<IsolationLevel>) -> String {
    let body_len: usize = statements
        .iter()
        .map(|s| s.as_ref().len() + STATEMENT_SEPARATOR.len())
        .sum();
    let mut sql = String::with_capacity(HEAD.len() + body_len + TAIL.len() + 64);

    if let Some(level) = isolation {
        sql.push_str("\n\tSET TRANSACTION ISOLATION LEVEL ");
        sql.push_str(level.as_sql());
        sql.push(';');
    }
    sql.push_str(HEAD);

    for (i, statement) in statements.iter().enumerate() {
        sql.push_str(statement.as_ref());
        if i + 1 == statements.len() {
            sql.push('\n');
        } else {
            sql.push_str(STATEMENT_SEPARATOR);
        }
    }

    sql.push('\n');
    sql.push_str(TAIL);
    sql
}

/// Builder over [`wrap`].
#[derive(Debug, Clone, Default)]
pub struct TransactionScript {
    statements: Vec<String>,
    isolation: Option<IsolationLevel>,
}

impl TransactionScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the isolation level.
    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    /// Append a statement.
    pub fn push(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Append several statements in order.
    pub fn extend<I, S>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements.extend(statements.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn build(&self) -> String {
        wrap(&self.statements, self.isolation)
    }
}
