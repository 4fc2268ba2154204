//! Tracker configuration: numeric tolerance and the poker sites whose
//! windows are worth tracking. Sites are plain data; adding one means adding
//! a JSON entry, not code.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

static SITES_JSON: &str = include_str!("../data/sites.json");

static BUILTIN_SITES: Lazy<Vec<SiteConfig>> =
    Lazy::new(|| serde_json::from_str(SITES_JSON).expect("Failed to parse built-in sites"));

/// Absolute slack, in big blinds, for comparing observed amounts.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Substring identifying the site's table windows.
    pub table_title: String,
    pub seats: usize,
}

impl SiteConfig {
    /// Small and big blind parsed from a window title such as
    /// `"Halley - $0.01/$0.02 USD - No Limit Hold'em"`.
    pub fn stakes(&self, title: &str) -> Option<(f64, f64)> {
        if !title.contains(&self.table_title) {
            return None;
        }
        parse_stakes(title)
    }
}

pub fn parse_stakes(title: &str) -> Option<(f64, f64)> {
    let clean = |s: &str| -> Option<f64> {
        s.trim_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .replace(',', "")
            .parse()
            .ok()
    };
    title.split_whitespace().find_map(|token| {
        let (sb, bb) = token.split_once('/')?;
        let (sb, bb) = (clean(sb)?, clean(bb)?);
        (sb > 0.0 && bb >= sb).then_some((sb, bb))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_sites() -> Vec<SiteConfig> {
    BUILTIN_SITES.clone()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            tolerance: DEFAULT_TOLERANCE,
            sites: default_sites(),
        }
    }
}

impl TrackerConfig {
    pub fn load(path: &Path) -> TrackerResult<TrackerConfig> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> TrackerResult<TrackerConfig> {
        let config: TrackerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if let Some(site) = self.sites.iter().find(|s| s.seats < 2) {
            return Err(TrackerError::InvalidConfig(format!(
                "site '{}' needs at least 2 seats",
                site.name
            )));
        }
        Ok(())
    }

    /// Most specific site whose title pattern matches and whose stakes parse.
    pub fn find_site(&self, title: &str) -> Option<&SiteConfig> {
        self.sites
            .iter()
            .filter(|s| s.stakes(title).is_some())
            .max_by_key(|s| s.table_title.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stakes_dollars() {
        assert_eq!(
            parse_stakes("Halley - $0.01/$0.02 USD - No Limit Hold'em"),
            Some((0.01, 0.02))
        );
        assert_eq!(parse_stakes("Lobby"), None);
        assert_eq!(parse_stakes("Table 1/x"), None);
    }

    #[test]
    fn test_builtin_sites_load() {
        let config = TrackerConfig::default();
        assert!(config.sites.len() >= 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_find_site_prefers_specific_title() {
        let config = TrackerConfig::default();
        let site = config
            .find_site("Atlas - $0.05/$0.10 - No Limit Hold'em 9-max")
            .unwrap();
        assert_eq!(site.seats, 9);
        assert!(config.find_site("No Limit Hold'em").is_none());
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let err = TrackerConfig::from_json(r#"{"tolerance": -1.0}"#);
        assert!(matches!(err, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TrackerConfig::from_json(r#"{"sites": []}"#).unwrap();
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert!(config.sites.is_empty());
    }
}
