pub mod assistant;
pub mod config;
pub mod conversation;
pub mod error;
pub mod preferences;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use assistant::*;
pub use config::*;
pub use conversation::*;
pub use error::*;
pub use preferences::*;
pub use text::*;
pub use types::*;
