pub mod task;
pub mod user;

pub use task::{HealthResponse, TaskService};
pub use user::UserService;
