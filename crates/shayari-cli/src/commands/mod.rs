pub mod config;
pub mod data;
pub mod item;
pub mod settings;
