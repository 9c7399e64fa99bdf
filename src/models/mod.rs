pub mod task;
pub mod user;

pub use task::{
    NewTask, SortOrder, Task, TaskChanges, TaskListQuery, TaskListResponse, TaskSortBy,
    TaskStatus,
};
pub use user::{NewUser, User, UserResponse};
