use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the data sources the dashboard can read its feed from.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Static scanner output served from a local web server.
    #[default]
    Local,
    /// The scan API of the scanner backend (`GET /api/scan`), results only.
    ScanApi,
    /// Static scanner output under an arbitrary base URL.
    Custom { base_url: String },
}

impl Environment {
    /// Returns the base URL the static feed files live under.
    pub fn base_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:8000/data".to_string(),
            Environment::ScanApi => "http://localhost:5000".to_string(),
            Environment::Custom { base_url } => base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the results array.
    pub fn results_url(&self) -> String {
        match self {
            Environment::ScanApi => format!("{}/api/scan", self.base_url()),
            _ => format!("{}/scan_results.json", self.base_url()),
        }
    }

    /// URL of the last-update marker, if this source publishes one.
    pub fn last_update_url(&self) -> Option<String> {
        match self {
            Environment::ScanApi => None,
            _ => Some(format!("{}/last_update.txt", self.base_url())),
        }
    }

    /// URL of the optional meta document, if this source publishes one.
    pub fn meta_url(&self) -> Option<String> {
        match self {
            Environment::ScanApi => None,
            _ => Some(format!("{}/meta.json", self.base_url())),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "scan-api" | "scan_api" | "api" => Ok(Environment::ScanApi),
            other if other.starts_with("http://") || other.starts_with("https://") => {
                Ok(Environment::Custom {
                    base_url: s.to_string(),
                })
            }
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::ScanApi => write!(f, "Scan API"),
            Environment::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_layout_urls() {
        let env = Environment::Custom {
            base_url: "https://feeds.test/data/".to_string(),
        };
        assert_eq!(env.results_url(), "https://feeds.test/data/scan_results.json");
        assert_eq!(
            env.last_update_url().as_deref(),
            Some("https://feeds.test/data/last_update.txt")
        );
        assert_eq!(
            env.meta_url().as_deref(),
            Some("https://feeds.test/data/meta.json")
        );
    }

    #[test]
    fn test_scan_api_has_results_only() {
        let env = Environment::ScanApi;
        assert!(env.results_url().ends_with("/api/scan"));
        assert!(env.last_update_url().is_none());
        assert!(env.meta_url().is_none());
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!("LOCAL".parse::<Environment>(), Ok(Environment::Local));
        assert_eq!("scan-api".parse::<Environment>(), Ok(Environment::ScanApi));
        assert_eq!(
            "http://127.0.0.1:9000".parse::<Environment>(),
            Ok(Environment::Custom {
                base_url: "http://127.0.0.1:9000".to_string()
            })
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
