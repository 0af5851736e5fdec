//! Key types for the version cache

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform a server build is distributed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows build (`bin-win`)
    Win,
    /// Linux build (`bin-linux`)
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Win, Platform::Linux];

    /// Returns the string representation used in URLs and download links
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Win => "win",
            Platform::Linux => "linux",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Platform::Win),
            "linux" => Ok(Platform::Linux),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release channel of a server build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Preview,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Stable, Channel::Preview];

    pub fn from_preview(preview: bool) -> Self {
        if preview {
            Channel::Preview
        } else {
            Channel::Stable
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Channel::Preview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Preview => "preview",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one tracked version series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub platform: Platform,
    pub channel: Channel,
}

impl CacheKey {
    pub fn new(platform: Platform, channel: Channel) -> Self {
        Self { platform, channel }
    }

    /// Every platform/channel combination, platform-major
    pub fn all() -> Vec<CacheKey> {
        Self::for_platforms(&Platform::ALL)
    }

    /// Every channel of the given platforms, in the order given
    pub fn for_platforms(platforms: &[Platform]) -> Vec<CacheKey> {
        platforms
            .iter()
            .flat_map(|&platform| {
                Channel::ALL
                    .into_iter()
                    .map(move |channel| CacheKey::new(platform, channel))
            })
            .collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("win", Some(Platform::Win))]
    #[case("linux", Some(Platform::Linux))]
    #[case("Win", None)]
    #[case("macos", None)]
    #[case("", None)]
    fn platform_from_str_accepts_only_known_platforms(
        #[case] input: &str,
        #[case] expected: Option<Platform>,
    ) {
        assert_eq!(input.parse::<Platform>().ok(), expected);
    }

    #[test]
    fn all_returns_every_combination_platform_major() {
        assert_eq!(
            CacheKey::all(),
            vec![
                CacheKey::new(Platform::Win, Channel::Stable),
                CacheKey::new(Platform::Win, Channel::Preview),
                CacheKey::new(Platform::Linux, Channel::Stable),
                CacheKey::new(Platform::Linux, Channel::Preview),
            ]
        );
    }

    #[test]
    fn for_platforms_limits_key_space() {
        assert_eq!(
            CacheKey::for_platforms(&[Platform::Linux]),
            vec![
                CacheKey::new(Platform::Linux, Channel::Stable),
                CacheKey::new(Platform::Linux, Channel::Preview),
            ]
        );
    }

    #[test]
    fn display_joins_platform_and_channel() {
        let key = CacheKey::new(Platform::Win, Channel::from_preview(true));
        assert_eq!(key.to_string(), "win/preview");
    }
}
