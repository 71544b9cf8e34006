pub mod config_store;
pub mod defaults;
pub mod fs_util;
pub mod gateway;
pub mod preference_file;
pub mod runtime_engine;
