pub mod auth;
pub mod logging;
pub mod timezone;
pub mod url;
