//! Pipeline entry points for the watch cycle.
//!
//! - `diff`: known-ID bookkeeping and new-ID calculation
//! - `announce`: announcement delivery to Discord
//! - `watch`: the baseline + scan loop driving both

pub mod announce;
pub mod diff;
pub mod watch;

pub use announce::{AnnouncementSink, DiscordAnnouncer};
pub use diff::KnownVideos;
pub use watch::{ScanOutcome, Watcher};
