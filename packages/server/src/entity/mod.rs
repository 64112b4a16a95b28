pub mod recall_case;
pub mod recall_log;
pub mod recall_photo;
pub mod showing;
pub mod showing_photo;
pub mod user;
