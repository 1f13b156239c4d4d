pub mod bot;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use bot::run;
