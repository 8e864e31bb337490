//! Platform — which store a download row was reported by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store that reported a download count.
///
/// The CSV producer writes lowercase keys (`appstore`, `googleplay`), but
/// hand-edited files and older exports use display names, so parsing is
/// lenient. Values that match no known store pass through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    AppStore,
    GooglePlay,
    Huawei,
    Other(String),
}

impl Platform {
    /// Parse a raw CSV cell. Case, spaces, underscores and hyphens are ignored.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "appstore" | "apple" | "ios" => Platform::AppStore,
            "googleplay" | "google" | "android" => Platform::GooglePlay,
            "huawei" | "appgallery" | "huaweiappgallery" => Platform::Huawei,
            _ => Platform::Other(raw.trim().to_string()),
        }
    }

    /// Human-readable label used in charts and tables.
    pub fn label(&self) -> &str {
        match self {
            Platform::AppStore => "App Store",
            Platform::GooglePlay => "Google Play",
            Platform::Huawei => "Huawei AppGallery",
            Platform::Other(name) => name,
        }
    }

    /// Key written by the upstream producer.
    pub fn key(&self) -> &str {
        match self {
            Platform::AppStore => "appstore",
            Platform::GooglePlay => "googleplay",
            Platform::Huawei => "huawei",
            Platform::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_producer_keys() {
        assert_eq!(Platform::parse("appstore"), Platform::AppStore);
        assert_eq!(Platform::parse("googleplay"), Platform::GooglePlay);
        assert_eq!(Platform::parse("huawei"), Platform::Huawei);
    }

    #[test]
    fn parses_display_names() {
        assert_eq!(Platform::parse("App Store"), Platform::AppStore);
        assert_eq!(Platform::parse("AppStore"), Platform::AppStore);
        assert_eq!(Platform::parse("Google_Play"), Platform::GooglePlay);
        assert_eq!(Platform::parse(" google-play "), Platform::GooglePlay);
    }

    #[test]
    fn unknown_platform_passes_through() {
        assert_eq!(
            Platform::parse(" Amazon "),
            Platform::Other("Amazon".to_string())
        );
        assert_eq!(Platform::parse("Amazon").label(), "Amazon");
    }

    #[test]
    fn labels() {
        assert_eq!(Platform::AppStore.to_string(), "App Store");
        assert_eq!(Platform::GooglePlay.label(), "Google Play");
        assert_eq!(Platform::GooglePlay.key(), "googleplay");
    }
}
