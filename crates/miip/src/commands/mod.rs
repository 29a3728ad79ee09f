pub mod clean;
pub mod setup;
