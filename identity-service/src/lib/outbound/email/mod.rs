pub mod http;
pub mod logging;

pub use http::HttpEmailSender;
pub use logging::LogEmailSender;
