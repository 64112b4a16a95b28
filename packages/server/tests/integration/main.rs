mod common;

mod photo_trash;
mod recall_log;
mod showing;
