pub mod auth;
pub mod chat;
pub mod colleges;
pub mod health;
pub mod limits;
pub mod user;
