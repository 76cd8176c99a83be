//! different utility modules used throughout the project
/// logger setup: terminal plus optional timestamped log file
pub mod logger;
/// user preferences loaded from TOML
pub mod preferences;
