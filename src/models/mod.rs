pub mod question;
pub mod user;

pub use question::Question;
pub use user::{CreateUserRequest, LoginRequest, User};
