use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::contacts::DEFAULT_CONTACTS_FILENAME;
use crate::dispatch::{Throttle, DEFAULT_BATCH_SIZE, DEFAULT_THROTTLE_SECONDS};
use crate::mail::{
    MessageBuilder, SmtpSettings, TlsMode, DEFAULT_FROM_ADDR, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT,
    DEFAULT_SMTP_TIMEOUT_SECS, DEFAULT_UNSUBSCRIBE_URL,
};
use crate::quota::{RampPolicy, DEFAULT_INITIAL_LIMIT, DEFAULT_MAX_LIMIT, DEFAULT_RAMP_STEP};
use crate::storage::DEFAULT_HISTORY_FILENAME;

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: TlsMode,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_timeout_secs: u64,
    pub from_addr: String,
    pub unsubscribe_url: String,
    pub contacts_file: PathBuf,
    pub history_file: PathBuf,
    pub send_log_file: Option<PathBuf>,
    pub log_level: String,
    pub initial_limit: u64,
    pub max_limit: u64,
    pub ramp_step: u64,
    pub batch_size: u64,
    pub throttle_seconds: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_tls: TlsMode::None,
            smtp_username: None,
            smtp_password: None,
            smtp_timeout_secs: DEFAULT_SMTP_TIMEOUT_SECS,
            from_addr: DEFAULT_FROM_ADDR.to_string(),
            unsubscribe_url: DEFAULT_UNSUBSCRIBE_URL.to_string(),
            contacts_file: PathBuf::from(DEFAULT_CONTACTS_FILENAME),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILENAME),
            send_log_file: None,
            log_level: "info".to_string(),
            initial_limit: DEFAULT_INITIAL_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            ramp_step: DEFAULT_RAMP_STEP,
            batch_size: DEFAULT_BATCH_SIZE,
            throttle_seconds: DEFAULT_THROTTLE_SECONDS,
        }
    }
}

impl MailerConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("SMTP_HOST") {
            cfg.smtp_host = host;
        }
        if let Some(port) = lookup("SMTP_PORT") {
            cfg.smtp_port = parse_var("SMTP_PORT", &port, "a valid u16")?;
        }
        if let Some(tls) = lookup("SMTP_TLS") {
            cfg.smtp_tls = tls
                .parse()
                .with_context(|| format!("SMTP_TLS is invalid: {tls}"))?;
        }
        cfg.smtp_username = lookup("SMTP_USERNAME").filter(|v| !v.is_empty());
        cfg.smtp_password = lookup("SMTP_PASSWORD").filter(|v| !v.is_empty());
        if let Some(timeout) = lookup("SMTP_TIMEOUT_SECS") {
            cfg.smtp_timeout_secs =
                parse_var("SMTP_TIMEOUT_SECS", &timeout, "a positive integer")?;
        }
        if let Some(from) = lookup("FROM_ADDR") {
            cfg.from_addr = from;
        }
        if let Some(url) = lookup("UNSUBSCRIBE_URL") {
            cfg.unsubscribe_url = url;
        }
        if let Some(path) = lookup("CONTACTS_FILE") {
            cfg.contacts_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("HISTORY_FILE") {
            cfg.history_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("SEND_LOG_FILE").filter(|v| !v.is_empty()) {
            cfg.send_log_file = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            cfg.log_level = level;
        }
        if let Some(limit) = lookup("INITIAL_LIMIT") {
            cfg.initial_limit = parse_var("INITIAL_LIMIT", &limit, "a non-negative integer")?;
        }
        if let Some(limit) = lookup("MAX_LIMIT") {
            cfg.max_limit = parse_var("MAX_LIMIT", &limit, "a non-negative integer")?;
        }
        if let Some(step) = lookup("RAMP_STEP") {
            cfg.ramp_step = parse_var("RAMP_STEP", &step, "a non-negative integer")?;
        }
        if let Some(size) = lookup("BATCH_SIZE") {
            cfg.batch_size = parse_var("BATCH_SIZE", &size, "a positive integer")?;
        }
        if let Some(secs) = lookup("THROTTLE_SECONDS") {
            cfg.throttle_seconds =
                parse_var("THROTTLE_SECONDS", &secs, "a non-negative integer")?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be greater than zero");
        }
        if self.initial_limit > self.max_limit {
            anyhow::bail!(
                "INITIAL_LIMIT ({}) must not exceed MAX_LIMIT ({})",
                self.initial_limit,
                self.max_limit
            );
        }
        if self.from_addr.trim().is_empty() {
            anyhow::bail!("FROM_ADDR must not be empty");
        }
        if self.smtp_timeout_secs == 0 {
            anyhow::bail!("SMTP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(())
    }

    pub fn ramp_policy(&self) -> Result<RampPolicy> {
        RampPolicy::new(self.initial_limit, self.max_limit, self.ramp_step)
            .context("invalid ramp configuration")
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::new(self.batch_size, Duration::from_secs(self.throttle_seconds))
    }

    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            tls: self.smtp_tls,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            timeout: Duration::from_secs(self.smtp_timeout_secs),
        }
    }

    pub fn message_builder(&self) -> MessageBuilder {
        MessageBuilder::new(self.from_addr.clone(), self.unsubscribe_url.clone())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str, expected: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be {expected}"))
}
