pub mod assistant_api;
pub mod parse;
pub mod request;
pub mod runtime;
