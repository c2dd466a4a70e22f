//! Configuration module for Wiki-Race
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file (or no file at all) yields a
//! usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use wiki_race::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wiki-race.toml")).unwrap();
//! println!("Serving on {}", config.server.bind);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, SearchConfig, ServerConfig, UserAgentConfig, DEFAULT_ARTICLE_PATTERN,
    DEFAULT_BACKLINKS_API,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
