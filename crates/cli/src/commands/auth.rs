//! Interactive OTP login and logout.
//!
//! # Usage
//!
//! ```bash
//! # Send an OTP to the number, then prompt for it
//! fl-cli login --phone 9876543210
//!
//! # At the OTP prompt, `resend` sends a new code and `change` goes back to
//! # the phone number prompt
//! ```

use futurelabs_storefront::login::{LoginError, LoginFlow, LoginStep, MessageKind};
use futurelabs_storefront::{AppError, AppState, error};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{CommandError, say};

/// Line-oriented prompt on stdin.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, question: &str) -> Result<String, CommandError> {
        say(question)?;
        self.lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string())
            .ok_or(CommandError::Aborted("login"))
    }
}

/// Print the flow's current message, if any.
fn show_message(flow: &LoginFlow) -> std::io::Result<()> {
    match (flow.message(), flow.message_kind()) {
        (Some(message), Some(MessageKind::Success)) => say(&message),
        (Some(message), _) => say(&format!("! {message}")),
        _ => Ok(()),
    }
}

/// Report unexpected failures; the shopper already sees the flow message.
fn note(result: Result<(), LoginError>) {
    if let Err(e) = result {
        AppError::from(e).report();
    }
}

/// Run the login flow until a session is established.
pub async fn login(state: &AppState, phone: Option<String>) -> Result<(), CommandError> {
    let flow = state.login_flow();
    let mut prompt = Prompt::stdin();
    let mut pending_phone = phone;

    loop {
        match flow.step() {
            LoginStep::PhoneEntry => {
                let phone = match pending_phone.take() {
                    Some(phone) => phone,
                    None => prompt.ask("Phone number (10 digits):").await?,
                };
                note(flow.submit_phone(&phone).await);
                show_message(&flow)?;
            }
            LoginStep::OtpEntry => {
                if let Some(destination) = flow.otp_destination() {
                    say(&format!("OTP sent to {destination}"))?;
                }
                let input = prompt
                    .ask("Enter OTP (or 'resend' / 'change'):")
                    .await?;
                match input.as_str() {
                    "resend" => note(flow.resend_otp().await),
                    "change" => flow.change_number(),
                    otp => note(flow.submit_otp(otp).await),
                }
                show_message(&flow)?;
            }
            LoginStep::Completed => break,
        }
    }

    tokio::time::sleep(flow.completion_delay()).await;

    if let Some(session) = state.sessions().current().map_err(AppError::from)? {
        error::set_sentry_user(session.user_id());
        tracing::info!(user_id = %session.user_id(), "Logged in");
    }
    Ok(())
}

/// Forget the stored session.
pub fn logout(state: &AppState) -> Result<(), CommandError> {
    state.sessions().logout().map_err(AppError::from)?;
    error::clear_sentry_user();
    say("Logged out")?;
    Ok(())
}
