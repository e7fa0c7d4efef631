pub mod bot;
pub mod client;
pub mod messages;
