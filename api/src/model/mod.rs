pub mod auth;
pub mod booking;
pub mod history;
pub mod room;
pub mod user;
