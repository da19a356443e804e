//! Account commands - login, register, logout, whoami, password recovery

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Password;
use serde_json::json;

use ecobazaar_core::services::RegisterOutcome;

use super::{check, App};
use crate::output;

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Email a password reset link
    Forgot {
        /// Account email
        email: String,
    },
    /// Set a new password with the token from the reset email
    Reset {
        /// Reset token
        token: String,
        /// New password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Password from the flag/env, or an interactive prompt
fn password_or_prompt(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn login(email: &str, password: Option<String>, json: bool) -> Result<()> {
    let password = password_or_prompt(password, false)?;
    let app = App::open("/login").await?;

    let user = check(app.ctx.login(email, &password).await)?;
    if json {
        return output::json(&user);
    }
    let name = user
        .as_ref()
        .and_then(|u| u.display_name().map(str::to_string))
        .unwrap_or_else(|| email.to_string());
    output::success(&format!("Logged in as {}", name.bold()));

    let cart = app.ctx.cart.cart();
    let wishlist = app.ctx.wishlist.entries();
    println!(
        "{}",
        format!(
            "{} item(s) in cart, {} on wishlist",
            cart.map(|c| c.item_count()).unwrap_or(0),
            wishlist.len()
        )
        .dimmed()
    );
    Ok(())
}

pub async fn register(
    email: &str,
    name: Option<String>,
    role: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let app = App::open("/register").await?;

    let allowed = check(app.ctx.session.allowed_roles().await)?.unwrap_or_default();
    let role = match allowed.iter().find(|r| r.as_str().eq_ignore_ascii_case(role)) {
        Some(role) => *role,
        None if allowed.is_empty() => anyhow::bail!("The server does not accept new accounts"),
        None => {
            let names: Vec<_> = allowed.iter().map(|r| r.as_str()).collect();
            anyhow::bail!("Role '{}' not allowed. Choose one of: {}", role, names.join(", "))
        }
    };

    let password = password_or_prompt(password, true)?;
    let mut profile = json!({
        "email": email,
        "password": password,
        "role": role,
    });
    if let Some(name) = name {
        profile["name"] = json!(name);
    }

    let outcome = check(app.ctx.register(profile).await)?;
    match outcome {
        Some(RegisterOutcome::SignedIn(user)) => {
            if json {
                return output::json(&user);
            }
            output::success(&format!("Account created, logged in as {}", email.bold()));
        }
        Some(RegisterOutcome::Pending(body)) => {
            if json {
                return output::json(&body);
            }
            output::success("Account created");
            output::info(&format!("Log in with `eb login {}`", email));
        }
        None => output::success("Account created"),
    }
    Ok(())
}

pub async fn logout() -> Result<()> {
    let app = App::open("/").await?;
    let was_signed_in = app.ctx.session.state().is_authenticated;
    app.ctx.logout();
    if was_signed_in {
        output::success("Logged out");
    } else {
        println!("{}", "Not logged in".dimmed());
    }
    Ok(())
}

pub async fn whoami(json: bool) -> Result<()> {
    let app = App::open("/").await?;
    let state = app.ctx.session.state();
    if json {
        return output::json(&state);
    }

    let Some(user) = state.user else {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    };

    let mut table = output::create_table();
    table.add_row(vec!["User ID".to_string(), user.id.to_string()]);
    if let Some(name) = user.display_name() {
        table.add_row(vec!["Name".to_string(), name.to_string()]);
    }
    if let Some(email) = user.email() {
        table.add_row(vec!["Email".to_string(), email.to_string()]);
    }
    table.add_row(vec!["Role".to_string(), user.role.as_str().to_string()]);
    println!("{}", table);
    Ok(())
}

pub async fn password(command: PasswordCommands) -> Result<()> {
    let app = App::open("/forgot-password").await?;
    match command {
        PasswordCommands::Forgot { email } => {
            check(app.ctx.session.forgot_password(&email).await)?;
            output::success(&format!("If {} has an account, a reset link is on its way", email));
        }
        PasswordCommands::Reset { token, password } => {
            check(app.ctx.session.validate_token(&token).await)?;
            let password = password_or_prompt(password, true)?;
            check(app.ctx.session.reset_password(&token, &password).await)?;
            output::success("Password updated. You can now log in.");
        }
    }
    Ok(())
}
