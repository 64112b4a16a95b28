pub mod auth;
pub mod case;
pub mod export;
pub mod log;
pub mod photo;
pub mod public;
pub mod showing;
pub mod sms;
pub mod storage;
