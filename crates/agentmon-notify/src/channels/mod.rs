pub mod callback;
pub mod log;
pub mod slack;
pub mod webhook;
