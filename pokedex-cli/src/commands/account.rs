use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_favorites::{AuthProvider, EmailCredentials, SignUpOutcome};

use crate::CliError;
use crate::cli_types::CredentialArgs;

fn credentials(args: &CredentialArgs) -> Result<EmailCredentials, CliError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CliError::other("Password must not be empty"));
    }
    Ok(EmailCredentials::new(args.email.trim(), password))
}

pub(crate) fn run_login(args: &CredentialArgs, quiet: bool) -> Result<(), CliError> {
    let creds = credentials(args)?;
    let client = super::open_client()?;
    let rt = super::runtime()?;

    let pb = super::spinner(quiet, "Signing in...");
    let result = rt.block_on(client.sign_in(&creds));
    pb.finish_and_clear();

    let session = result.map_err(|e| CliError::other(format!("Error logging in: {}", e)))?;
    pokedex_favorites::save_session(&session)?;

    log::info!(
        "{} Login successful!",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    if let Some(email) = &session.user.email {
        log::info!(
            "  Signed in as {}",
            email.if_supports_color(Stdout, |t| t.cyan())
        );
    }
    Ok(())
}

pub(crate) fn run_signup(args: &CredentialArgs, quiet: bool) -> Result<(), CliError> {
    let creds = credentials(args)?;
    let client = super::open_client()?;
    let rt = super::runtime()?;

    let pb = super::spinner(quiet, "Creating account...");
    let result = rt.block_on(client.sign_up(&creds));
    pb.finish_and_clear();

    match result.map_err(|e| CliError::other(format!("Error signing up: {}", e)))? {
        SignUpOutcome::SignedIn(session) => {
            pokedex_favorites::save_session(&session)?;
            log::info!(
                "{} Signup successful! You are now signed in.",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
        }
        SignUpOutcome::ConfirmationRequired { email } => {
            log::info!(
                "{} Signup successful! Please check your email for confirmation.",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            );
            log::debug!("Confirmation sent to {}", email);
        }
    }
    Ok(())
}

pub(crate) fn run_logout(quiet: bool) -> Result<(), CliError> {
    if pokedex_favorites::load_saved_session().is_none() {
        pokedex_favorites::clear_saved_session()?;
        log::info!("Not logged in.");
        return Ok(());
    }

    // A missing backend config must not keep the user signed in locally.
    match super::open_client() {
        Ok(client) => {
            let rt = super::runtime()?;
            let pb = super::spinner(quiet, "Signing out...");
            let result = rt.block_on(client.sign_out());
            pb.finish_and_clear();
            if let Err(e) = result {
                log::warn!("Error logging out: {}", e);
            }
        }
        Err(e) => log::warn!("Skipping remote sign-out: {}", e),
    }

    pokedex_favorites::clear_saved_session()?;
    log::info!(
        "{} Logout successful!",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(())
}

pub(crate) fn run_whoami() -> Result<(), CliError> {
    let Some(session) = pokedex_favorites::load_saved_session() else {
        log::info!("Not logged in.");
        return Ok(());
    };

    let email = session.user.email.as_deref().unwrap_or("(no email)");
    log::info!("{}", email.if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} {}",
        "User id:".if_supports_color(Stdout, |t| t.cyan()),
        session.user.id
    );
    match session.expires_at {
        Some(at) if session.is_expired(chrono::Utc::now()) => log::info!(
            "  {} {}",
            "Expired:".if_supports_color(Stdout, |t| t.cyan()),
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .if_supports_color(Stdout, |t| t.red()),
        ),
        Some(at) => log::info!(
            "  {} {}",
            "Expires:".if_supports_color(Stdout, |t| t.cyan()),
            at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
        ),
        None => {}
    }
    Ok(())
}
