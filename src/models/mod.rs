// Wire models for the CirqueTask REST API (camelCase JSON)

pub mod activity;
pub mod attachment;
pub mod auth;
pub mod billing;
pub mod board;
pub mod dashboard;
pub mod label;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

pub use activity::ActivityLog;
pub use attachment::Attachment;
pub use auth::{AuthRequest, AuthResponse, ForgotPasswordRequest, ProfileUpdate, RefreshRequest, RegisterRequest, ResetPasswordRequest};
pub use billing::{CheckoutPlan, CheckoutRequest, Feature, Plan, PlanDto, SessionUrl};
pub use board::{Board, BoardRequest, Column, ColumnRequest};
pub use dashboard::Dashboard;
pub use label::{Label, LabelRequest};
pub use notification::{Notification, NotificationType, UnreadCount};
pub use project::{AddMemberRequest, Member, Project, ProjectRequest, ProjectRole};
pub use task::{Comment, CommentRequest, Task, TaskMoveRequest, TaskPriority, TaskQuery, TaskRequest, TaskStatus, TaskType};
pub use user::User;
