//! One-shot commands that run the session flow without the TUI.
//!
//! Each command performs a single session operation, prints its outcome and
//! returns an error (non-zero exit) when the operation failed.

use std::io::{self, Write};

use anyhow::{bail, Result};
use sessiongate_core::{
    AuthError, Config, LoginSuccess, SessionClient, SessionEvent, TokenStore, UserInfo,
};
use tokio::sync::mpsc;

use crate::utils::{format_expiry, mask_token};

/// Buffer size for the session event channel
const CHANNEL_BUFFER_SIZE: usize = 32;

fn session(config: &Config) -> Result<(SessionClient, mpsc::Receiver<SessionEvent>)> {
    let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    Ok((SessionClient::from_config(config, tx)?, rx))
}

/// Print error banners to stderr; everything else is reported by the caller
fn report_errors(rx: &mut mpsc::Receiver<SessionEvent>) {
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Error(message) = event {
            eprintln!("{}", message);
        }
    }
}

fn print_user(user: &UserInfo) {
    println!("{}", user.status_text());
    println!("  Username: {}", user.display_name());
    println!("  Token:    {}", user.token_status());
    for (key, value) in user.extra_fields() {
        println!("  {}: {}", key, value);
    }
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Interactive login: prompts for anything not given on the command line or environment
pub async fn login(mut config: Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| std::env::var("SESSIONGATE_USERNAME").ok()) {
        Some(name) => name,
        None => prompt_username(config.last_username.as_deref())?,
    };
    let password = match std::env::var("SESSIONGATE_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let store = config.token_store()?;
    login_with(&mut config, store, &username, &password).await?;
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

/// Log in with resolved credentials, storing the token in `store` and
/// remembering the username in `config` (the caller persists it)
pub async fn login_with(
    config: &mut Config,
    store: Box<dyn TokenStore>,
    username: &str,
    password: &str,
) -> Result<LoginSuccess> {
    let (tx, mut rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let mut client = SessionClient::new(config.api_client()?, store, tx)
        .with_delays(config.login_redirect_delay(), config.expired_redirect_delay());
    let result = client.authenticate(username, password).await;
    report_errors(&mut rx);
    let success = result?;

    println!("Login successful as {}", success.username);
    if success.expires_in.is_some() {
        println!("Token expires {}", format_expiry(success.minutes_until_expiry()));
    }

    config.last_username = Some(success.username.clone());
    Ok(success)
}

/// Check the stored token against the backend
pub async fn verify(config: &Config) -> Result<()> {
    let (mut client, mut rx) = session(config)?;
    let result = client.verify().await;
    report_errors(&mut rx);

    match result? {
        Some(user) => {
            print_user(&user);
            Ok(())
        }
        None => bail!(AuthError::MissingToken.user_message()),
    }
}

/// Remove the stored token
pub async fn logout(config: &Config) -> Result<()> {
    let (mut client, mut rx) = session(config)?;
    let result = client.logout().await;
    report_errors(&mut rx);
    result?;
    println!("Logged out");
    Ok(())
}

/// Report whether a token is stored, without contacting the backend
pub fn status(config: &Config) -> Result<()> {
    let store = config.token_store()?;
    match store.get()? {
        Some(token) => println!("Logged in (token {})", mask_token(&token)),
        None => println!("Not logged in"),
    }
    println!("Backend: {}", config.api_base_url);
    Ok(())
}
