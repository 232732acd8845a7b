//! Contact form fields, validation and sanitization.

use regex::Regex;
use std::sync::LazyLock;

// ASCII word characters only; `\w` would also admit non-ASCII letters.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+$").expect("email pattern is valid")
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormFields {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    /// Copy with every field escaped for the outgoing message.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_input(Some(&self.name)),
            email: sanitize_input(Some(&self.email)),
            message: sanitize_input(Some(&self.message)),
        }
    }
}

/// Returns one message per violated rule; empty means the form can be sent.
pub fn validate_form(fields: &FormFields) -> Vec<String> {
    let mut errors = Vec::new();

    let name = fields.name.trim();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else if name.chars().count() < 2 {
        errors.push("Name must be at least 2 characters".to_string());
    }

    let email = fields.email.trim();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.push("Please enter a valid email address".to_string());
    }

    let message = fields.message.trim();
    if message.is_empty() {
        errors.push("Message is required".to_string());
    } else if message.chars().count() < 5 {
        errors.push("Message must be at least 5 characters".to_string());
    }

    errors
}

/// Escapes `< > " ' /` for insertion as plain text into the message template.
/// This is not an HTML sanitizer. A missing value yields an empty string.
pub fn sanitize_input(input: Option<&str>) -> String {
    let Some(input) = input else {
        return String::new();
    };

    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c => out.push(c),
        }
    }
    out
}
