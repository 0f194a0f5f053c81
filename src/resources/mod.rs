// Typed REST clients, one per backend resource. Each is a thin request builder
// over the shared `ApiClient`; callers interpret the returned envelopes.

pub mod attachments;
pub mod billing;
pub mod boards;
pub mod dashboard;
pub mod labels;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;

pub use attachments::AttachmentsClient;
pub use billing::BillingClient;
pub use boards::BoardsClient;
pub use dashboard::DashboardClient;
pub use labels::LabelsClient;
pub use notifications::{NotificationsClient, UnreadCounter};
pub use projects::ProjectsClient;
pub use tasks::TasksClient;
pub use users::UsersClient;
