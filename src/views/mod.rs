// Screen-level orchestration that has no rendering of its own

pub mod kanban;
pub mod login;

pub use kanban::{splice_task, KanbanBoard};
pub use login::{LoginOutcome, LoginView};
