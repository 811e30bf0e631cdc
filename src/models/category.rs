//! Content categories tracked on a channel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A channel tab tracked independently of the others.
///
/// Each category keys its own announcement target and known-ID set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Videos,
    Shorts,
    Streams,
}

impl Category {
    /// All tracked categories, in scan order.
    pub const ALL: [Category; 3] = [Category::Videos, Category::Shorts, Category::Streams];

    /// Channel tab path segment for this category.
    pub const fn tab(&self) -> &'static str {
        match self {
            Category::Videos => "videos",
            Category::Shorts => "shorts",
            Category::Streams => "streams",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tab())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "videos" => Ok(Category::Videos),
            "shorts" => Ok(Category::Shorts),
            "streams" => Ok(Category::Streams),
            other => Err(format!(
                "unknown category '{other}' (expected videos, shorts, or streams)"
            )),
        }
    }
}
