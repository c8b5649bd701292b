pub mod questions;
pub mod users;

pub use questions::QuestionsService;
pub use users::UsersService;
