//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_git_repository, check_working_directory_clean, has_github_token};
pub use settings::{get_env_var, get_env_vars, Settings};
