//! Command implementations and terminal-side client hooks
//!
//! Each command is a thin printout over a typed resource call. Error
//! text reaches the user two ways: the notification gate (armed after
//! the first successful exchange) prints to stderr, and the command's
//! own error propagates to main for the exit code.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use console_api::models::LoginRequest;
use console_api::query::{CertificateQuery, ListQuery, UserQuery};
use console_api::{auth, certificates, users};
use console_client::{ApiClient, Notifier, ReloadHook};

/// Toast analog: one stderr line per notified failure.
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Full-reload analog for a terminal process: the session is gone, so
/// drop the persisted copy and exit — the next invocation starts clean.
pub struct CliReload {
    pub session_file: PathBuf,
}

impl ReloadHook for CliReload {
    fn reload(&self) {
        let _ = std::fs::remove_file(&self.session_file);
        eprintln!("session expired — sign in again with `cert-console login <email>`");
        std::process::exit(1);
    }
}

pub async fn login(client: &ApiClient, email: &str) -> anyhow::Result<()> {
    let password = match std::env::var("CONSOLE_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => prompt_password()?,
    };

    let user = auth::login(
        client,
        &LoginRequest {
            email: email.to_owned(),
            password,
        },
    )
    .await?;

    println!(
        "signed in as {} <{}> ({})",
        user.full_name,
        user.email,
        user.role.as_str()
    );
    Ok(())
}

pub async fn logout(client: &ApiClient) -> anyhow::Result<()> {
    auth::logout(client).await?;
    println!("signed out");
    Ok(())
}

pub async fn profile(client: &ApiClient) -> anyhow::Result<()> {
    let user = auth::profile(client).await?;
    println!("{} <{}>", user.full_name, user.email);
    println!("role:   {}", user.role.as_str());
    println!("active: {}", user.status);
    if let Some(province) = &user.province_name {
        println!("region: {province}");
    }
    Ok(())
}

pub async fn list_users(client: &ApiClient, search: Option<&str>) -> anyhow::Result<()> {
    let query = UserQuery {
        list: list_query(search),
        role: None,
        status: None,
    };
    let page = users::list(client, &query).await?;

    println!("{:<26} {:<30} {:<9} ACTIVE", "ID", "EMAIL", "ROLE");
    for user in &page.records {
        println!(
            "{:<26} {:<30} {:<9} {}",
            user.id,
            user.email,
            user.role.as_str(),
            user.status
        );
    }
    println!(
        "page {} ({} of {} users)",
        page.pagination.page,
        page.records.len(),
        page.pagination.total
    );
    Ok(())
}

pub async fn list_certificates(client: &ApiClient, search: Option<&str>) -> anyhow::Result<()> {
    let query = CertificateQuery {
        list: list_query(search),
        status: None,
        is_revoked: None,
    };
    let page = certificates::list(client, &query).await?;

    println!("{:<26} {:<28} {:<11} REVOKED", "ID", "FACILITY", "STATUS");
    for certificate in &page.records {
        println!(
            "{:<26} {:<28} {:<11} {}",
            certificate.id,
            certificate.facility_name,
            certificate.status.as_str(),
            certificate.is_revoked
        );
    }
    println!(
        "page {} ({} of {} certificates)",
        page.pagination.page,
        page.records.len(),
        page.pagination.total
    );
    Ok(())
}

pub async fn print_certificate(client: &ApiClient, id: &str) -> anyhow::Result<()> {
    certificates::print(client, id).await?;
    println!("queued a new render of certificate {id}");
    Ok(())
}

pub async fn revoke_certificate(client: &ApiClient, id: &str) -> anyhow::Result<()> {
    let certificate = certificates::revoke(client, id).await?;
    println!(
        "revoked certificate {} ({})",
        certificate.id, certificate.facility_name
    );
    Ok(())
}

fn list_query(search: Option<&str>) -> ListQuery {
    match search {
        Some(text) => ListQuery::new().search(text),
        None => ListQuery::new(),
    }
}

/// Read the password from stdin when CONSOLE_PASSWORD is unset.
fn prompt_password() -> anyhow::Result<String> {
    eprint!("password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        anyhow::bail!("empty password");
    }
    Ok(password)
}
