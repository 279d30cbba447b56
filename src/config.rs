//! Runtime settings read from the environment.
//!
//! Every value has a typed default; a variable that is unset or does not
//! parse leaves the default in place.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use canvas::erase::EraseConfig;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub alpha_threshold: u8,
    pub min_island_pixels: usize,
    pub window_padding: f64,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let erase = EraseConfig::default();
        Self {
            alpha_threshold: erase.alpha_threshold,
            min_island_pixels: erase.min_island_pixels,
            window_padding: erase.window_padding,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            alpha_threshold: env_parse(&lookup, "SKETCHBOARD_ALPHA_THRESHOLD", defaults.alpha_threshold),
            min_island_pixels: env_parse(&lookup, "SKETCHBOARD_MIN_ISLAND_PIXELS", defaults.min_island_pixels),
            window_padding: Some(env_parse(&lookup, "SKETCHBOARD_WINDOW_PADDING", defaults.window_padding))
                .filter(|p| p.is_finite() && *p >= 0.0)
                .unwrap_or(defaults.window_padding),
            log_filter: lookup("SKETCHBOARD_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Engine configuration with these settings applied.
    #[must_use]
    pub fn erase_config(&self) -> EraseConfig {
        EraseConfig {
            alpha_threshold: self.alpha_threshold,
            min_island_pixels: self.min_island_pixels,
            window_padding: self.window_padding,
            ..EraseConfig::default()
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}
