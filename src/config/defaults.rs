//! Default configuration values

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.flux_namespace, "flux-system");
        assert_eq!(config.timeout, "5m");
    }
}
