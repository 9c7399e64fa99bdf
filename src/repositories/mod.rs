//! Storage seams.
//!
//! Services only see the [`UserRepository`] and [`TaskRepository`] traits; the PostgreSQL
//! implementations live next to them and are chosen in `startup`.

pub mod task;
pub mod user;

pub use task::{escape_like_pattern, PgTaskRepository, TaskRepository};
pub use user::{PgUserRepository, UserRepository};
