//! cert-console admin CLI
//!
//! Terminal front end for the certification admin backend: session
//! management, user listing, certificate listing and reprints. All
//! backend traffic flows through the shared client core, so a session
//! that expires mid-command refreshes transparently.

mod commands;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console_client::ApiClient;
use transport::{HttpTransport, SessionStore};

use crate::commands::{CliReload, TermNotifier};
use crate::config::Config;

const USAGE: &str = "\
usage: cert-console [--config <path>] <command>

commands:
  login <email>          sign in (password from CONSOLE_PASSWORD or prompt)
  logout                 sign out and forget the local session
  profile                show the signed-in user
  users list [search]    list console users
  certs list [search]    list certificates
  certs print <id>       queue a new render of a certificate
  certs revoke <id>      revoke a certificate
";

/// Split `--config <path>` out of the raw arguments; everything else is
/// the command words.
fn split_args(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut config_path = None;
    let mut command = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" {
            if let Some(value) = args.get(i + 1) {
                config_path = Some(value.clone());
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        command.push(args[i].clone());
        i += 1;
    }
    (config_path, command)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cli_config_path, command) = split_args(&args);

    if command.is_empty() {
        eprint!("{USAGE}");
        std::process::exit(2);
    }

    let config_path = Config::resolve_path(cli_config_path.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        session_file = %config.session_file.display(),
        "configuration loaded"
    );

    let session = Arc::new(
        SessionStore::load(config.session_file.clone())
            .await
            .context("failed to load session store")?,
    );
    let transport = Arc::new(HttpTransport::new(
        &config.api.base_url,
        Arc::clone(&session),
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let client = ApiClient::new(
        transport,
        session,
        Arc::new(TermNotifier),
        Arc::new(CliReload {
            session_file: config.session_file.clone(),
        }),
    );

    let words: Vec<&str> = command.iter().map(String::as_str).collect();
    match words.as_slice() {
        ["login", email] => commands::login(&client, email).await,
        ["logout"] => commands::logout(&client).await,
        ["profile"] => commands::profile(&client).await,
        ["users", "list"] => commands::list_users(&client, None).await,
        ["users", "list", search] => commands::list_users(&client, Some(search)).await,
        ["certs", "list"] => commands::list_certificates(&client, None).await,
        ["certs", "list", search] => commands::list_certificates(&client, Some(search)).await,
        ["certs", "print", id] => commands::print_certificate(&client, id).await,
        ["certs", "revoke", id] => commands::revoke_certificate(&client, id).await,
        _ => {
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_args_extracts_config_flag() {
        let (config, command) = split_args(&strings(&["--config", "/etc/cc.toml", "users", "list"]));
        assert_eq!(config.as_deref(), Some("/etc/cc.toml"));
        assert_eq!(command, vec!["users", "list"]);
    }

    #[test]
    fn split_args_flag_position_does_not_matter() {
        let (config, command) = split_args(&strings(&["certs", "list", "--config", "a.toml"]));
        assert_eq!(config.as_deref(), Some("a.toml"));
        assert_eq!(command, vec!["certs", "list"]);
    }

    #[test]
    fn split_args_without_flag() {
        let (config, command) = split_args(&strings(&["login", "an@example.com"]));
        assert_eq!(config, None);
        assert_eq!(command, vec!["login", "an@example.com"]);
    }

    #[test]
    fn split_args_dangling_flag_is_ignored() {
        let (config, command) = split_args(&strings(&["profile", "--config"]));
        assert_eq!(config, None);
        assert_eq!(command, vec!["profile"]);
    }

    #[test]
    fn usage_mentions_every_command() {
        for command in ["login", "logout", "profile", "users list", "certs list", "certs print", "certs revoke"] {
            assert!(USAGE.contains(command), "usage text must mention {command}");
        }
    }
}
