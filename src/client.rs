// Composition root: wires storage, session, pipeline, resources and realtime

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::i18n::Translator;
use crate::navigation::Navigator;
use crate::notice::Notifier;
use crate::pipeline::{AuthStage, ErrorStage, RequestPipeline, TraceStage};
use crate::realtime::{Connector, RealtimeChannel, WebSocketConnector};
use crate::resources::{
    AttachmentsClient, BillingClient, BoardsClient, DashboardClient, LabelsClient, NotificationsClient,
    ProjectsClient, TasksClient, UnreadCounter, UsersClient,
};
use crate::session::{AuthClient, SessionStore};
use crate::storage::{DurableStorage, FileStorage};
use crate::theme::ThemeStore;
use crate::views::{KanbanBoard, LoginView};

/// Host-provided collaborators
pub struct ClientParts {
    pub storage: Arc<dyn DurableStorage>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub connector: Arc<dyn Connector>,
}

/// One signed-in (or signing-in) user's view of the backend
pub struct CirqueClient {
    config: ClientConfig,
    translator: Translator,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    session: Arc<SessionStore>,
    api: ApiClient,
    unread: UnreadCounter,
    realtime: Arc<RealtimeChannel>,
    theme: ThemeStore,
}

impl CirqueClient {
    /// File storage under the configured directory and a real WebSocket transport
    pub fn new(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let storage = Arc::new(FileStorage::open(config.storage.dir.as_deref())?);
        Self::with_parts(
            config,
            ClientParts {
                storage,
                navigator,
                notifier,
                connector: Arc::new(WebSocketConnector),
            },
        )
    }

    pub fn with_parts(config: ClientConfig, parts: ClientParts) -> Result<Self, ClientError> {
        let translator = Translator::from_code(&config.ui.language);
        let session = Arc::new(SessionStore::new(parts.storage.clone(), parts.navigator.clone()));

        let pipeline = RequestPipeline::new()
            .with_stage(TraceStage)
            .with_stage(AuthStage::new(session.clone()))
            .with_stage(ErrorStage::new(
                parts.notifier.clone(),
                parts.navigator.clone(),
                translator,
                config.notice_duration(),
            ));
        tracing::debug!("Request pipeline: {:?}", pipeline.stage_names());

        let api = ApiClient::new(&config, Arc::new(pipeline))?;
        let unread = UnreadCounter::new();
        let realtime = Arc::new(RealtimeChannel::new(
            config.realtime.clone(),
            parts.connector,
            session.clone(),
            unread.clone(),
        )?);
        let theme = ThemeStore::new(parts.storage);

        Ok(Self {
            config,
            translator,
            navigator: parts.navigator,
            notifier: parts.notifier,
            session,
            api,
            unread,
            realtime,
            theme,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn translator(&self) -> Translator {
        self.translator
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone(), self.session.clone())
    }

    pub fn projects(&self) -> ProjectsClient {
        ProjectsClient::new(self.api.clone())
    }

    pub fn boards(&self) -> BoardsClient {
        BoardsClient::new(self.api.clone())
    }

    pub fn tasks(&self) -> TasksClient {
        TasksClient::new(self.api.clone())
    }

    pub fn labels(&self) -> LabelsClient {
        LabelsClient::new(self.api.clone())
    }

    pub fn attachments(&self) -> AttachmentsClient {
        AttachmentsClient::new(self.api.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.api.clone())
    }

    pub fn billing(&self) -> BillingClient {
        BillingClient::new(self.api.clone())
    }

    pub fn dashboard(&self) -> DashboardClient {
        DashboardClient::new(self.api.clone())
    }

    pub fn notifications(&self) -> NotificationsClient {
        NotificationsClient::new(self.api.clone(), self.unread.clone())
    }

    pub fn unread(&self) -> &UnreadCounter {
        &self.unread
    }

    pub fn realtime(&self) -> &Arc<RealtimeChannel> {
        &self.realtime
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn login_view(&self) -> LoginView {
        LoginView::new(
            self.auth(),
            self.navigator.clone(),
            self.notifier.clone(),
            self.translator,
        )
    }

    pub fn kanban(&self, board_id: i64) -> KanbanBoard {
        KanbanBoard::new(board_id, self.boards(), self.tasks(), self.realtime.clone())
    }

    /// Drop the realtime connection, then clear the session
    pub async fn sign_out(&self) {
        self.realtime.disconnect().await;
        self.session.logout();
        self.unread.reset();
    }
}

impl std::fmt::Debug for CirqueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CirqueClient")
            .field("api", &self.api.base_url())
            .field("realtime", &self.realtime)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{Route, Router};
    use crate::notice::NoticeBoard;
    use crate::storage::MemoryStorage;
    use crate::testing::MemoryConnector;

    fn client() -> (CirqueClient, Arc<Router>) {
        let router = Arc::new(Router::new(Route::Login));
        let (connector, _broker) = MemoryConnector::new();
        let parts = ClientParts {
            storage: Arc::new(MemoryStorage::new()),
            navigator: router.clone(),
            notifier: Arc::new(NoticeBoard::new()),
            connector: Arc::new(connector),
        };
        let config = ClientConfig::for_endpoints("http://127.0.0.1:9/api", "ws://127.0.0.1:9/ws");
        (CirqueClient::with_parts(config, parts).unwrap(), router)
    }

    #[test]
    fn test_client_starts_signed_out() {
        let (client, _) = client();
        assert!(!client.session().is_authenticated());
        assert_eq!(client.api().pipeline().stage_names(), vec!["trace", "auth", "error"]);
        assert_eq!(client.unread().get(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let (client, router) = client();
        client
            .session()
            .store_auth(&crate::testing::auth_response("a", "r"))
            .unwrap();
        client.unread().set(3);

        client.sign_out().await;
        assert!(!client.session().is_authenticated());
        assert_eq!(client.unread().get(), 0);
        assert_eq!(router.current(), Route::Login);
    }
}
