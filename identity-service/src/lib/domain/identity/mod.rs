pub mod code;
pub mod confirmation;
pub mod errors;
pub mod models;
pub mod ports;
pub mod service;
