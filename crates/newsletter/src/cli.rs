//! Command-line entry points: the HTTP server and the batch jobs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::error::ErrorCode;
use crate::executor::DryRunExecutor;
use crate::http::{self, AppState};
use crate::logging;
use crate::mailer::TracingMailer;
use crate::repository::SqlSubscriberRepository;
use crate::service::SubscriberService;

const DEFAULT_CONFIG: &str = "newsletter.toml";

pub type AppService = SubscriberService<SqlSubscriberRepository<DryRunExecutor>, TracingMailer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Serve,
    Send,
    Purge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(HelpTopic),
    Serve(ServeArgs),
    Send(JobArgs),
    Purge(JobArgs),
    Records,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    pub config: PathBuf,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArgs {
    pub config: PathBuf,
}

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    match parse_args(&args)? {
        Command::Help(topic) => {
            print_help(topic);
            Ok(())
        }
        Command::Records => {
            print_records();
            Ok(())
        }
        Command::Serve(args) => {
            let config = startup(&args.config)?;
            serve(&config, args.port).await
        }
        Command::Send(args) => {
            let config = startup(&args.config)?;
            let sent = send_newsletter(&config).await?;
            tracing::info!(sent, "newsletter batch finished");
            Ok(())
        }
        Command::Purge(args) => {
            let config = startup(&args.config)?;
            let removed = purge_deleted(&config).await?;
            tracing::info!(removed, "purge finished");
            Ok(())
        }
    }
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(String::as_str);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "serve" => parse_serve(it),
        "send" => parse_job(it, HelpTopic::Send, Command::Send),
        "purge" => parse_job(it, HelpTopic::Purge, Command::Purge),
        "records" => Ok(Command::Records),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn config_value<'a>(
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<PathBuf>> {
    if token == "--config" {
        let Some(v) = it.next() else {
            anyhow::bail!("--config requires a value");
        };
        return Ok(Some(PathBuf::from(v)));
    }
    Ok(token.strip_prefix("--config=").map(PathBuf::from))
}

fn parse_serve<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut port = None;

    while let Some(token) = it.next() {
        if let Some(path) = config_value(token, &mut it)? {
            config = path;
            continue;
        }
        let raw_port = match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Serve)),
            "--port" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--port requires a value");
                };
                v
            }
            _ if token.starts_with("--port=") => token.trim_start_matches("--port="),
            other => anyhow::bail!("unknown argument: {other}"),
        };
        let parsed: u16 = raw_port
            .parse()
            .with_context(|| format!("invalid port: {raw_port}"))?;
        if parsed == 0 {
            anyhow::bail!("--port must not be 0");
        }
        port = Some(parsed);
    }

    Ok(Command::Serve(ServeArgs { config, port }))
}

fn parse_job<'a>(
    mut it: impl Iterator<Item = &'a str>,
    topic: HelpTopic,
    command: fn(JobArgs) -> Command,
) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        if let Some(path) = config_value(token, &mut it)? {
            config = path;
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(topic)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(command(JobArgs { config }))
}

/// Load config, install logging and report what was loaded.
fn startup(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)?;
    logging::init_tracing(&config.log)?;
    tracing::info!(
        stage = %config.stage,
        version = %config.server.app_version,
        config = %path.display(),
        "configuration loaded"
    );
    for (name, fields) in newsletter_sql::registered_records() {
        let columns: Vec<_> = fields
            .iter()
            .filter(|f| f.is_active())
            .map(|f| f.column)
            .collect();
        tracing::info!(record = name, columns = ?columns, "record registered");
    }
    Ok(config)
}

/// Wire the service from config.
pub fn build_service(config: &Config) -> AppService {
    let executor = DryRunExecutor::from_config(&config.database);
    tracing::info!(database = %executor.target(), "using dry-run executor");
    let repo = SqlSubscriberRepository::new(executor, &config.database.table);
    SubscriberService::new(repo, TracingMailer::from_config(&config.mail))
        .with_newsletter(config.mail.newsletter())
}

async fn serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        build_service(config),
        &config.server.app_version,
    ));
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.server.port)));
    http::serve(http::router(state), addr).await
}

/// Run the newsletter batch. No active subscribers is not a failure.
pub async fn send_newsletter(config: &Config) -> anyhow::Result<usize> {
    match build_service(config).send_newsletter().await {
        Ok(sent) => Ok(sent),
        Err(ErrorCode::DataNotFound) => {
            tracing::info!("no active subscribers; nothing sent");
            Ok(0)
        }
        Err(code) => Err(anyhow::anyhow!(code)).context("newsletter batch failed"),
    }
}

pub async fn purge_deleted(config: &Config) -> anyhow::Result<u64> {
    build_service(config)
        .purge_deleted()
        .await
        .map_err(|code| anyhow::anyhow!(code))
        .context("purge of deleted subscribers failed")
}

fn print_records() {
    for (name, fields) in newsletter_sql::registered_records() {
        println!("{name}");
        for field in fields {
            if field.is_active() {
                println!("  {:<20} [{}] {}", field.field_name, field.column, field.category);
            } else {
                println!("  {:<20} (excluded)", field.field_name);
            }
        }
    }
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
newsletter - subscription backend for SQL Server

USAGE:
  newsletter <COMMAND> [OPTIONS]

COMMANDS:
  serve         Run the HTTP API
  send          Mail the newsletter to every active subscriber
  purge         Delete soft-deleted subscribers
  records       List the registered record catalogs

Run `newsletter <command> --help` for more."
            );
        }
        HelpTopic::Serve => {
            println!(
                "\
USAGE:
  newsletter serve [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: newsletter.toml)
  --port <PORT>         Override server.port from config
  -h, --help            Print help"
            );
        }
        HelpTopic::Send | HelpTopic::Purge => {
            let name = if topic == HelpTopic::Send { "send" } else { "purge" };
            println!(
                "\
USAGE:
  newsletter {name} [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: newsletter.toml)
  -h, --help            Print help"
            );
        }
    }
}
