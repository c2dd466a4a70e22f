use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wiki_race::config::load_config;
///
/// let config = load_config(Path::new("wiki-race.toml")).unwrap();
/// println!("Cache TTL: {}s", config.fetcher.cache_ttl_secs);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of a configuration file's bytes
///
/// Logged at startup so operators can tell which configuration a server
/// instance is running with.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read(path)?;
    Ok(digest(&content))
}

/// Loads a configuration together with the hash of the exact text parsed
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, digest(content.as_bytes())))
}

fn digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
