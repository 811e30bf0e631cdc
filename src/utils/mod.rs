//! Utility functions and helpers.

use url::Url;

use crate::error::Result;
use crate::models::Category;

/// Normalize a channel handle to the '@handle' form.
pub fn normalize_handle(channel: &str) -> String {
    let trimmed = channel.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{trimmed}")
    }
}

/// Build the public URL for a channel's category tab.
pub fn channel_tab_url(channel: &str, category: Category) -> Result<Url> {
    let base = Url::parse("https://www.youtube.com/")?;
    let url = base.join(&format!("{}/{}", normalize_handle(channel), category.tab()))?;
    Ok(url)
}

/// Build the public watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("@example"), "@example");
        assert_eq!(normalize_handle("example"), "@example");
        assert_eq!(normalize_handle("  example  "), "@example");
    }

    #[test]
    fn test_channel_tab_url() {
        let url = channel_tab_url("example", Category::Videos).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/@example/videos");

        let url = channel_tab_url("@example", Category::Shorts).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/@example/shorts");
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
