//! Contact form submission flow.
//! Idle -> Validating -> (Invalid -> Idle) | Sending -> (Sent | Failed) -> Idle.
//! One attempt per submit, no retries. An atomic in-flight flag rejects a second
//! submit while one is running; the flag is released by a guard so the submit
//! control comes back in every outcome.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::form::{FormFields, validate_form};
use crate::telegram::SendError;

pub const SENT_TEXT: &str = "Message sent successfully!";
pub const FAILED_TEXT: &str = "Failed to send message. Please try again later.";
pub const CONFIGURATION_TEXT: &str =
    "Configuration error: Please check your Telegram bot token and chat ID in config/telegram.json";
const INVALID_HEADER: &str = "Please fix the following errors:";

/// Delivers sanitized form fields to the site owner.
pub trait MessageSender {
    fn send(&self, fields: &FormFields) -> impl Future<Output = Result<(), SendError>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Sending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn success(text: &str) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.to_string(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent and the fields are kept.
    Invalid(Vec<String>),
    Sent,
    Failed { configuration: bool },
    /// Another submit was already running.
    Busy,
}

#[derive(Debug)]
pub struct ContactForm {
    fields: Mutex<FormFields>,
    status: Mutex<Option<Status>>,
    state: Mutex<SubmitState>,
    in_flight: AtomicBool,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(FormFields::default())
    }
}

/// Releases the in-flight flag and returns the form to Idle when dropped.
struct InFlight<'a>(&'a ContactForm);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set_state(SubmitState::Idle);
        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl ContactForm {
    pub fn new(fields: FormFields) -> Self {
        Self {
            fields: Mutex::new(fields),
            status: Mutex::new(None),
            state: Mutex::new(SubmitState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn fields(&self) -> FormFields {
        lock(&self.fields).clone()
    }

    pub fn set_fields(&self, fields: FormFields) {
        *lock(&self.fields) = fields;
    }

    pub fn status(&self) -> Option<Status> {
        lock(&self.status).clone()
    }

    pub fn state(&self) -> SubmitState {
        *lock(&self.state)
    }

    pub fn is_submit_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    fn set_state(&self, state: SubmitState) {
        *lock(&self.state) = state;
    }

    fn set_status(&self, status: Option<Status>) {
        *lock(&self.status) = status;
    }

    pub async fn submit<S: MessageSender>(&self, sender: &S) -> SubmitOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::warn!(state = ?self.state(), "submit ignored, a message is already being sent");
            return SubmitOutcome::Busy;
        }
        let _guard = InFlight(self);

        self.set_state(SubmitState::Validating);
        let fields = self.fields();
        let errors = validate_form(&fields);
        if !errors.is_empty() {
            tracing::info!(?errors, "contact form rejected");
            self.set_status(Some(Status::error(format!(
                "{}\n{}",
                INVALID_HEADER,
                errors.join("\n")
            ))));
            return SubmitOutcome::Invalid(errors);
        }

        self.set_state(SubmitState::Sending);
        self.set_status(None);

        match sender.send(&fields.sanitized()).await {
            Ok(()) => {
                tracing::info!("contact message sent");
                self.set_status(Some(Status::success(SENT_TEXT)));
                lock(&self.fields).clear();
                SubmitOutcome::Sent
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending message");
                let configuration = e.is_configuration_error();
                let text = if configuration {
                    CONFIGURATION_TEXT
                } else {
                    FAILED_TEXT
                };
                self.set_status(Some(Status::error(text)));
                SubmitOutcome::Failed { configuration }
            }
        }
    }
}

// A panic while holding one of these locks cannot leave the data half-written.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
