pub mod auth;
pub mod billing;
pub mod board;
pub mod dashboard;
pub mod notification;
pub mod project;
pub mod task;
pub mod theme;
pub mod watch;
