// Amagasa Offline Caching Agent Library
// The host page registers the agent and drives its lifecycle/fetch events

pub mod agent;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod interceptor;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
