pub mod auth;
pub mod case;
pub mod log;
pub mod photo;
pub mod shared;
pub mod showing;
pub mod sms;
