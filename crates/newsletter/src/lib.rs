//! # newsletter
//!
//! Newsletter subscription backend for SQL Server.
//!
//! SQL text is generated from the [`Subscriber`] catalog by `newsletter-sql`
//! and run through an [`SqlExecutor`]; the mail transport is a [`Mailer`].
//!
//! The `newsletter` binary wires it together (see [`cli`]):
//!
//! ```text
//! newsletter serve --config newsletter.toml   # HTTP API
//! newsletter send  --config newsletter.toml   # newsletter batch
//! newsletter purge --config newsletter.toml   # delete soft-deleted rows
//! newsletter records                          # list record catalogs
//! ```

pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod http;
pub mod logging;
pub mod mailer;
pub mod repository;
pub mod row;
pub mod service;

pub use config::{Config, DatabaseConfig, LogConfig, LogFormat, MailConfig, ServerConfig};
pub use entity::Subscriber;
pub use error::{ErrorCode, ErrorMessage, Language};
pub use executor::DryRunExecutor;
pub use http::{ApiError, AppState};
pub use mailer::{MailContent, MailError, Mailer, TracingMailer};
pub use repository::{
    ExecError, RepoError, RepoResult, SqlExecutor, SqlSubscriberRepository, SubscriberRepository,
    SubscriberStatements,
};
pub use row::{FromRow, FromSqlValue, Row, RowError};
pub use service::{Newsletter, ServiceResult, SubscriberService, is_email};
