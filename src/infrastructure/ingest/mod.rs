//! Bulk ingest: connectors for each backend, the shared runner and the
//! job dispatcher

pub mod discord;
pub mod dispatcher;
pub mod factory;
pub mod github;
pub mod object_storage;
pub mod runner;
pub mod slack;

pub use discord::DiscordConnector;
pub use dispatcher::IngestDispatcher;
pub use factory::{ApiEndpoints, ConnectorFactory};
pub use github::GitHubConnector;
pub use object_storage::ObjectStoreConnector;
pub use runner::{IngestRunner, RunStats};
pub use slack::SlackConnector;
