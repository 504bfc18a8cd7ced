/// Run configuration.
pub mod config;
/// Log lines, progress and completion notifications.
pub mod events;
/// The sequential generation loop.
pub mod run;
/// Background execution with a single in-flight run.
pub mod worker;
