pub mod auth;
pub mod availability;
pub mod booking;
pub mod history;
pub mod id;
pub mod role;
pub mod room;
pub mod slot;
pub mod user;
