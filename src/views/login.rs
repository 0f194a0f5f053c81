use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiOutcome;
use crate::error::{ClientError, FieldErrors};
use crate::forms::FormErrors;
use crate::i18n::{keys, Translator};
use crate::models::AuthRequest;
use crate::navigation::{Navigator, Route};
use crate::notice::{Notice, Notifier};
use crate::session::AuthClient;

const NOTICE_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Local validation failed; nothing was sent
    Invalid,
    SignedIn,
    /// Backend refused; the message was shown as a notice
    Failed(String),
}

/// Login form: validates, signs in, and routes or reports
pub struct LoginView {
    auth: AuthClient,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    translator: Translator,
    form: FormErrors,
}

impl LoginView {
    pub fn new(
        auth: AuthClient,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        translator: Translator,
    ) -> Self {
        Self {
            auth,
            navigator,
            notifier,
            translator,
            form: FormErrors::new(["email", "password"]),
        }
    }

    pub fn form(&self) -> &FormErrors {
        &self.form
    }

    pub async fn submit(&mut self, email: &str, password: &str) -> LoginOutcome {
        self.form.clear();
        if !self.validate(email, password) {
            self.form.mark_all_touched();
            return LoginOutcome::Invalid;
        }

        let request = AuthRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.auth.login(&request).await {
            Ok(envelope) => match envelope.outcome {
                ApiOutcome::Ok(_) => {
                    self.navigator.navigate(Route::Dashboard);
                    LoginOutcome::SignedIn
                }
                ApiOutcome::ValidationError(fields) => self.fail(envelope.message.as_deref(), Some(&fields)),
                ApiOutcome::OtherError(message) => self.fail(Some(&message), None),
            },
            Err(error) => self.fail_with(&error),
        }
    }

    fn validate(&mut self, email: &str, password: &str) -> bool {
        let email = email.trim();
        if email.is_empty() {
            self.form.set_error("email", "required");
        } else if !looks_like_email(email) {
            self.form.set_error("email", "email");
        }
        if password.is_empty() {
            self.form.set_error("password", "required");
        }
        self.form.is_valid()
    }

    fn fail_with(&mut self, error: &ClientError) -> LoginOutcome {
        let fields = error.field_errors().cloned();
        self.fail(error.server_message(), fields.as_ref())
    }

    fn fail(&mut self, message: Option<&str>, fields: Option<&FieldErrors>) -> LoginOutcome {
        if let Some(fields) = fields {
            self.form.apply_server_validation_errors(fields);
        }

        let message = message
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.translator.instant(keys::INVALID_CREDENTIALS));

        self.notifier.notify(Notice::new(
            message.clone(),
            self.translator.instant(keys::CLOSE),
            NOTICE_DURATION,
        ));
        LoginOutcome::Failed(message)
    }
}

/// Same shape check as a browser `type=email` field: `local@domain`, no spaces
fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(looks_like_email("ada@localhost"));
        assert!(!looks_like_email("ada"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@"));
        assert!(!looks_like_email("ada@@example.com"));
        assert!(!looks_like_email("a da@example.com"));
    }
}
