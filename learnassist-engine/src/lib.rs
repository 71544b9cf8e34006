pub mod badge;
pub mod preferences;
pub mod session;
pub mod speech;
pub mod traits;
