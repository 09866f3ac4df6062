use crate::config::types::{Config, CrawlerConfig, FetcherConfig};
use crate::url::is_absolute_url;
use crate::{ConfigError, ConfigResult};

/// Largest depth ceiling accepted for the first session
pub const MAX_DEPTH_LIMIT: u32 = 10;

/// Largest error threshold accepted
pub const MAX_ERRORS_LIMIT: u32 = 99;

/// Largest worker pool accepted per session
pub const MAX_WORKERS: usize = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_start_url(&config.start_url)?;

    if config.cur_depth >= config.max_depth {
        return Err(ConfigError::Validation(format!(
            "cur_depth must be smaller than max_depth, got cur_depth={} max_depth={}",
            config.cur_depth, config.max_depth
        )));
    }

    if config.max_depth < 1 || config.max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 1 and {}, got {}",
            MAX_DEPTH_LIMIT, config.max_depth
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.max_errors < 1 || config.max_errors > MAX_ERRORS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_errors must be between 1 and {}, got {}",
            MAX_ERRORS_LIMIT, config.max_errors
        )));
    }

    if config.depth_increment < 1 {
        return Err(ConfigError::Validation(
            "depth_increment must be >= 1".to_string(),
        ));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.result_buffer < 1 {
        return Err(ConfigError::Validation(
            "result_buffer must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed URL: non-empty and absolute
fn validate_start_url(start_url: &str) -> ConfigResult<()> {
    if start_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "start_url cannot be empty".to_string(),
        ));
    }

    if !is_absolute_url(start_url) {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' is not an absolute URL",
            start_url
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> ConfigResult<()> {
    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
