use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::http::RequestSummary;
use crate::i18n::{keys, Translator};
use crate::navigation::{Navigator, Route};
use crate::notice::{Notice, Notifier};
use crate::pipeline::{RequestStage, StageRing};

/// Turns failed responses into user-facing notices.
///
/// | status | key                    | side effect          |
/// |--------|------------------------|----------------------|
/// | 402    | errors.planLimit       | navigate to pricing  |
/// | 403    | errors.forbidden       |                      |
/// | 404    | errors.notFound        |                      |
/// | 429    | errors.tooManyRequests |                      |
/// | 500    | errors.serverError     |                      |
///
/// Any other status, or a failure without a status, is left alone.
pub struct ErrorStage {
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    translator: Translator,
    duration: Duration,
}

impl ErrorStage {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        translator: Translator,
        duration: Duration,
    ) -> Self {
        Self {
            notifier,
            navigator,
            translator,
            duration,
        }
    }

    fn status_key(status: u16) -> Option<&'static str> {
        match status {
            402 => Some(keys::PLAN_LIMIT),
            403 => Some(keys::FORBIDDEN),
            404 => Some(keys::NOT_FOUND),
            429 => Some(keys::TOO_MANY_REQUESTS),
            500 => Some(keys::SERVER_ERROR),
            _ => None,
        }
    }

    /// Server message, then the status translation, then the generic fallback
    fn message_for(&self, key: &str, error: &ClientError) -> String {
        error
            .server_message()
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.translator.lookup(key).map(str::to_string))
            .unwrap_or_else(|| self.translator.instant(keys::GENERIC))
    }
}

#[async_trait]
impl RequestStage for ErrorStage {
    fn name(&self) -> &'static str {
        "error"
    }

    fn ring(&self) -> StageRing {
        StageRing::Notification
    }

    async fn on_error(&self, request: &RequestSummary, error: &ClientError) {
        let Some(status) = error.status_code() else {
            return;
        };
        let Some(key) = Self::status_key(status) else {
            return;
        };

        let message = self.message_for(key, error);
        tracing::debug!("{} → {} notice: {}", request, status, message);

        self.notifier.notify(Notice::new(
            message,
            self.translator.instant(keys::CLOSE),
            self.duration,
        ));

        if status == 402 {
            self.navigator.navigate(Route::Pricing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::navigation::Router;
    use crate::notice::NoticeBoard;
    use reqwest::Method;

    fn stage() -> (ErrorStage, Arc<NoticeBoard>, Arc<Router>) {
        let notices = Arc::new(NoticeBoard::new());
        let router = Arc::new(Router::new(Route::Projects));
        let stage = ErrorStage::new(
            notices.clone(),
            router.clone(),
            Translator::new(Language::En),
            Duration::from_millis(5000),
        );
        (stage, notices, router)
    }

    fn summary() -> RequestSummary {
        RequestSummary {
            method: Method::GET,
            url: "http://localhost/api/projects/9".to_string(),
        }
    }

    #[tokio::test]
    async fn test_server_message_wins() {
        let (stage, notices, router) = stage();
        let error = ClientError::http(403, Some("Not a project member".to_string()), None);

        stage.on_error(&summary(), &error).await;

        let shown = notices.notices();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, "Not a project member");
        assert_eq!(shown[0].action, "Close");
        assert_eq!(shown[0].duration, Duration::from_millis(5000));
        assert!(router.history().is_empty());
    }

    #[tokio::test]
    async fn test_translated_fallback_and_pricing_redirect() {
        let (stage, notices, router) = stage();

        stage.on_error(&summary(), &ClientError::http(404, None, None)).await;
        stage.on_error(&summary(), &ClientError::http(402, Some("  ".to_string()), None)).await;

        let shown = notices.notices();
        assert_eq!(shown[0].message, "The requested resource was not found.");
        assert_eq!(shown[1].message, "You have reached your plan limit. Upgrade to continue.");
        assert_eq!(router.history(), vec![Route::Pricing]);
    }

    #[tokio::test]
    async fn test_unlisted_statuses_are_ignored() {
        let (stage, notices, router) = stage();

        for status in [400, 401, 409, 502] {
            stage.on_error(&summary(), &ClientError::http(status, Some("nope".into()), None)).await;
        }
        stage.on_error(&summary(), &ClientError::realtime("socket closed")).await;

        assert!(notices.is_empty());
        assert!(router.history().is_empty());
    }
}
