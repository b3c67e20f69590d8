pub mod app;
pub mod assistant;
pub mod documents;
pub mod metrics;
pub mod notifications;
