//! Service layer for the announcer application.
//!
//! - Channel listing fetch (`ChannelListing`)

mod listing;

pub use listing::{ChannelListing, VideoSource};
