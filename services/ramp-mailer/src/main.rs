use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use ramp_mailer::{
    run_locked, shutdown_signal, CsvContacts, Dispatcher, FileQuotaStore, MailerConfig,
    MessageContent, QuotaTracker, RunLock, SmtpTransport, Template,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ramp-mailer", version, about = "Quota-ramped bulk email sender")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send the message to as many contacts as today's quota allows.
    Send {
        #[arg(long)]
        subject: String,
        #[arg(long, value_name = "PATH", help = "Plain-text body template")]
        text_template: Option<PathBuf>,
        #[arg(long, value_name = "PATH", help = "HTML body template")]
        html_template: Option<PathBuf>,
        #[arg(long, value_name = "PATH", help = "Overrides CONTACTS_FILE")]
        contacts: Option<PathBuf>,
        #[arg(long, value_name = "PATH", help = "Overrides HISTORY_FILE")]
        history: Option<PathBuf>,
    },
    /// Show today's quota without changing it.
    Status {
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
        #[arg(long, value_name = "PATH", help = "Overrides HISTORY_FILE")]
        history: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct StatusView {
    date: String,
    limit: u64,
    count: u64,
    remaining: u64,
    usage_percent: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = MailerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config)?;

    match cli.command {
        Commands::Send {
            subject,
            text_template,
            html_template,
            contacts,
            history,
        } => {
            if let Some(path) = contacts {
                config.contacts_file = path;
            }
            if let Some(path) = history {
                config.history_file = path;
            }
            let content = MessageContent::new(
                subject,
                read_template(html_template.as_deref())?,
                read_template(text_template.as_deref())?,
            )
            .context("invalid message content")?;
            send(&config, &content).await
        }
        Commands::Status { json, history } => {
            if let Some(path) = history {
                config.history_file = path;
            }
            status(&config, json)
        }
    }
}

async fn send(config: &MailerConfig, content: &MessageContent) -> Result<()> {
    let lock = RunLock::acquire(&config.history_file).context("failed to acquire run lock")?;

    let tracker = QuotaTracker::new(
        FileQuotaStore::new(config.history_file.clone()),
        config.ramp_policy()?,
    );
    let dispatcher = Dispatcher::new(
        tracker,
        SmtpTransport::new(config.smtp_settings()),
        config.message_builder(),
        config.throttle(),
    );

    let contacts = CsvContacts::new(config.contacts_file.clone());
    let report = run_locked(lock, dispatcher.run(&contacts, content), shutdown_signal())
        .await?
        .context("dispatch failed")?;

    if !report.limit_reached {
        info!(
            attempted = report.attempted,
            delivered = report.delivered(),
            failed = report.failed(),
            "send complete"
        );
    }
    println!("{}", report.summary());
    Ok(())
}

fn status(config: &MailerConfig, json: bool) -> Result<()> {
    let tracker = QuotaTracker::new(
        FileQuotaStore::new(config.history_file.clone()),
        config.ramp_policy()?,
    );
    let state = tracker
        .preview(Utc::now().date_naive())
        .context("failed to read quota state")?;

    let view = StatusView {
        date: state.date.to_string(),
        limit: state.limit,
        count: state.count,
        remaining: state.remaining(),
        usage_percent: state.usage_percentage(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "{}: {}/{} sent, {} remaining",
            view.date, view.count, view.limit, view.remaining
        );
    }
    Ok(())
}

fn read_template(path: Option<&Path>) -> Result<Option<Template>> {
    path.map(|path| {
        fs::read_to_string(path)
            .map(Template::new)
            .with_context(|| format!("failed to read template {}", path.display()))
    })
    .transpose()
}

fn init_tracing(config: &MailerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    match &config.send_log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
