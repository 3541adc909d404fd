use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::cli::RouteArgs;

pub const FRAGMENT_PREFIX: &str = "#/";
pub const DEFAULT_VOLUME: u32 = 1;

/// Parsed form of the location fragment. Everything that should be on screen is
/// re-derivable from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Read { volume: u32, page: u32 },
    Gallery { index: u32 },
}

impl Route {
    /// Total over all inputs: unknown prefixes, trailing segments and
    /// unparsable numbers fall back instead of failing.
    pub fn parse(fragment: &str) -> Self {
        let trimmed = fragment.trim();
        let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);

        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        let Some((&head, rest)) = segments.split_first() else {
            return Self::Home;
        };

        match head {
            "read" if rest.len() <= 2 => Self::Read {
                volume: number_at(rest, 0).unwrap_or(DEFAULT_VOLUME),
                page: number_at(rest, 1).unwrap_or(0),
            },
            head if (head.starts_with("art") || head.starts_with("gallery"))
                && rest.len() <= 1 =>
            {
                Self::Gallery {
                    index: number_at(rest, 0).unwrap_or(0),
                }
            }
            _ => Self::Home,
        }
    }

    /// Parses the fragment of a full location such as `https://host/#/read/2/3`.
    pub fn from_location(location: &str) -> anyhow::Result<Self> {
        let url = Url::parse(location)?;
        Ok(Self::parse(url.fragment().unwrap_or("")))
    }

    pub fn fragment(&self) -> String {
        self.to_string()
    }
}

/// Prints the normalized fragment for a fragment or a full location URL.
pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    let route = if args.location.contains("://") {
        Route::from_location(&args.location).context("parse location url")?
    } else {
        Route::parse(&args.location)
    };
    println!("{route}");
    Ok(())
}

// Digit-only segments saturate at `u32::MAX` so oversized requests still get clamped.
fn number_at(segments: &[&str], index: usize) -> Option<u32> {
    let segment = segments.get(index)?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        segment
            .parse::<u64>()
            .map_or(u32::MAX, |n| u32::try_from(n).unwrap_or(u32::MAX)),
    )
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str(FRAGMENT_PREFIX),
            Self::Read { volume, page } => write!(f, "{FRAGMENT_PREFIX}read/{volume}/{page}"),
            Self::Gallery { index } => write!(f, "{FRAGMENT_PREFIX}art/{index}"),
        }
    }
}

impl FromStr for Route {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
