// demos/onboarding/src/services/mod.rs

pub mod user_directory;

pub use user_directory::UserDirectory;
