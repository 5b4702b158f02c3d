//! Configuration loading and management

mod hierarchical_loader;
mod runtime_config;

pub use hierarchical_loader::HierarchicalConfigLoader;
pub use runtime_config::{
    normalize_url, FeedConfig, GlobalOptions, NetworkConfig, RuntimeConfig, DEFAULT_FEED_URL,
    DEFAULT_RELEASES_URL,
};
