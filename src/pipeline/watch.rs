// src/pipeline/watch.rs

//! The watch loop: baseline initialization, periodic scans, and
//! announcement dispatch.
//!
//! Single-threaded and cooperative: one cycle sleeps, then scans every
//! category in order, fetching a bounded listing, announcing anything not
//! yet known, and folding each ID into the known set only after its
//! announcement succeeds. Fetch and delivery failures are logged and the
//! affected work is retried on a later cycle.

use std::time::Duration;

use log::{debug, error, info};

use crate::error::{AppError, Result};
use crate::models::{Category, Config};
use crate::pipeline::announce::AnnouncementSink;
use crate::pipeline::diff::KnownVideos;
use crate::services::VideoSource;

/// Summary of a single scan cycle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// IDs fetched but not yet known at the start of the cycle
    pub discovered: usize,
    /// Announcements that succeeded (and were recorded as known)
    pub announced: usize,
    /// Categories skipped because their fetch failed
    pub failed_categories: usize,
    /// Announcement attempts that failed (retried next cycle)
    pub failed_announcements: usize,
}

/// Controller owning the known-ID state and driving the scan cycle.
pub struct Watcher<'a> {
    config: &'a Config,
    source: &'a dyn VideoSource,
    sink: &'a dyn AnnouncementSink,
    known: KnownVideos,
}

impl<'a> Watcher<'a> {
    /// Create a watcher with an empty known set.
    pub fn new(
        config: &'a Config,
        source: &'a dyn VideoSource,
        sink: &'a dyn AnnouncementSink,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            known: KnownVideos::new(),
        }
    }

    /// Known-ID state, for inspection.
    pub fn known(&self) -> &KnownVideos {
        &self.known
    }

    /// Seed the known set from the current listing of every category.
    ///
    /// Everything listed now predates the watch and is never announced.
    /// Any fetch failure here is fatal: without a baseline there is no
    /// valid starting state.
    pub async fn baseline(&mut self) -> Result<()> {
        info!("Initializing baseline...");

        for category in Category::ALL {
            info!("Fetching '{category}' video IDs...");
            let ids = self
                .source
                .fetch_ids(category, self.config.watch.baseline_limit)
                .await
                .map_err(|e| AppError::baseline(category, e))?;
            info!("Got {} video IDs for '{category}'.", ids.len());
            self.known.record_all(category, ids);
        }

        info!("Baseline initialized.");
        Ok(())
    }

    /// Run scan cycles forever at the configured interval.
    pub async fn run(&mut self) -> Result<()> {
        let interval = Duration::from_secs(self.config.watch.interval_secs);
        info!(
            "Watching '{}' every {}s.",
            self.config.channel,
            interval.as_secs()
        );

        loop {
            debug!("Sleeping...");
            tokio::time::sleep(interval).await;

            debug!("Checking for updates...");
            let outcome = self.scan().await;
            debug!(
                "Cycle complete: {} discovered, {} announced.",
                outcome.discovered, outcome.announced
            );
        }
    }

    /// Scan every category once and announce anything new.
    pub async fn scan(&mut self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for category in Category::ALL {
            self.scan_category(category, &mut outcome).await;
        }
        outcome
    }

    /// Scan one category: bounded fetch, diff, announce each fresh ID.
    async fn scan_category(&mut self, category: Category, outcome: &mut ScanOutcome) {
        let fetched = match self
            .source
            .fetch_ids(category, Some(self.config.watch.scan_limit))
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                outcome.failed_categories += 1;
                error!("Failed to fetch video IDs for '{category}': {e}");
                return;
            }
        };

        let fresh = self.known.fresh(category, &fetched);
        outcome.discovered += fresh.len();

        let Some(target) = self.config.target(category) else {
            outcome.failed_categories += 1;
            error!("No announcement target configured for '{category}'.");
            return;
        };

        for id in fresh {
            info!("Found new video ID '{id}' in '{category}'.");

            match self.sink.announce(target, &id).await {
                Ok(()) => {
                    // The only state mutation: recorded synchronously with
                    // the successful post.
                    self.known.record(category, id);
                    outcome.announced += 1;
                    info!("Announcement sent.");
                }
                Err(e) => {
                    outcome.failed_announcements += 1;
                    error!("Failed to announce '{id}' in '{category}': {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{AnnouncementTarget, DeliveryConfig, ListingConfig, WatchConfig};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn test_config() -> Config {
        let announcements = Category::ALL
            .into_iter()
            .map(|c| {
                (
                    c,
                    AnnouncementTarget {
                        channel_id: format!("chan-{c}"),
                        message: "New upload!".to_string(),
                    },
                )
            })
            .collect();

        Config {
            channel: "@example".to_string(),
            token: "test-token".to_string(),
            listing: ListingConfig::default(),
            watch: WatchConfig::default(),
            delivery: DeliveryConfig::default(),
            announcements,
        }
    }

    /// Source replaying a queued response per fetch, per category.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<HashMap<Category, VecDeque<Result<Vec<String>>>>>,
    }

    impl ScriptedSource {
        fn push(&self, category: Category, response: Result<Vec<String>>) {
            self.responses
                .lock()
                .unwrap()
                .entry(category)
                .or_default()
                .push_back(response);
        }
    }

    #[async_trait]
    impl VideoSource for ScriptedSource {
        async fn fetch_ids(
            &self,
            category: Category,
            _limit: Option<usize>,
        ) -> Result<Vec<String>> {
            self.responses
                .lock()
                .unwrap()
                .get_mut(&category)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Sink recording successful posts, with optional queued failures.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<String>>,
        failures: Mutex<VecDeque<AppError>>,
    }

    impl RecordingSink {
        fn fail_next(&self, error: AppError) {
            self.failures.lock().unwrap().push_back(error);
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnnouncementSink for RecordingSink {
        async fn announce(&self, _target: &AnnouncementTarget, video_id: &str) -> Result<()> {
            if let Some(error) = self.failures.lock().unwrap().pop_front() {
                return Err(error);
            }
            self.sent.lock().unwrap().push(video_id.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn new_id_is_announced_once_and_recorded() {
        // Scenario A: baseline {v1,v2}, next fetch {v1,v2,v3}.
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(Category::Videos, Ok(ids(&["v1", "v2"])));
        source.push(Category::Videos, Ok(ids(&["v1", "v2", "v3"])));
        let sink = RecordingSink::default();

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();
        assert_eq!(watcher.known().count(Category::Videos), 2);

        let outcome = watcher.scan().await;
        assert_eq!(outcome.discovered, 1);
        assert_eq!(outcome.announced, 1);
        assert_eq!(sink.sent(), ids(&["v3"]));
        assert_eq!(watcher.known().count(Category::Videos), 3);
        assert!(watcher.known().contains(Category::Videos, "v3"));
    }

    #[tokio::test]
    async fn failed_announcement_is_retried_next_cycle() {
        // Scenario B: delivery times out, the ID stays unknown and the
        // next cycle attempts it again.
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(Category::Videos, Ok(ids(&[])));
        source.push(Category::Videos, Ok(ids(&["v3"])));
        source.push(Category::Videos, Ok(ids(&["v3"])));
        let sink = RecordingSink::default();
        sink.fail_next(AppError::AnnounceTimeout { timeout_secs: 60 });

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();

        let outcome = watcher.scan().await;
        assert_eq!(outcome.failed_announcements, 1);
        assert_eq!(outcome.announced, 0);
        assert!(!watcher.known().contains(Category::Videos, "v3"));
        assert!(sink.sent().is_empty());

        let outcome = watcher.scan().await;
        assert_eq!(outcome.announced, 1);
        assert_eq!(sink.sent(), ids(&["v3"]));
        assert!(watcher.known().contains(Category::Videos, "v3"));
    }

    #[tokio::test]
    async fn fetch_failure_skips_category_only() {
        // Scenario C: one category's fetch fails; the others still scan.
        let config = test_config();
        let source = ScriptedSource::default();
        // Baseline: videos lists v1, the other categories are empty
        // (an exhausted queue yields Ok([])).
        source.push(Category::Videos, Ok(ids(&["v1"])));
        let sink = RecordingSink::default();

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();

        // Next cycle: videos fetch fails, shorts lists something new.
        source.push(
            Category::Videos,
            Err(AppError::listing(Category::Videos, "connection reset")),
        );
        source.push(Category::Shorts, Ok(ids(&["s1"])));
        let outcome = watcher.scan().await;

        assert_eq!(outcome.failed_categories, 1);
        assert_eq!(sink.sent(), ids(&["s1"]));
        assert!(watcher.known().contains(Category::Shorts, "s1"));
        assert_eq!(watcher.known().count(Category::Videos), 1);
    }

    #[tokio::test]
    async fn rejected_announcement_leaves_id_unknown() {
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(Category::Streams, Ok(ids(&[])));
        source.push(Category::Streams, Ok(ids(&["live1"])));
        let sink = RecordingSink::default();
        sink.fail_next(AppError::AnnounceRejected {
            status: 403,
            body: "Missing Access".to_string(),
        });

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();

        let outcome = watcher.scan().await;
        assert_eq!(outcome.failed_announcements, 1);
        assert!(!watcher.known().contains(Category::Streams, "live1"));
    }

    #[tokio::test]
    async fn baseline_failure_is_fatal() {
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(
            Category::Videos,
            Err(AppError::listing(Category::Videos, "connection refused")),
        );
        let sink = RecordingSink::default();

        let mut watcher = Watcher::new(&config, &source, &sink);
        let result = watcher.baseline().await;
        assert!(matches!(result, Err(AppError::Baseline { .. })));
    }

    #[tokio::test]
    async fn baseline_ids_are_never_announced() {
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(Category::Videos, Ok(ids(&["v1", "v2"])));
        // The same IDs reappear in every later bounded fetch.
        source.push(Category::Videos, Ok(ids(&["v1", "v2"])));
        source.push(Category::Videos, Ok(ids(&["v2", "v1"])));
        let sink = RecordingSink::default();

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();

        watcher.scan().await;
        watcher.scan().await;
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn unchanged_listing_yields_empty_delta() {
        let config = test_config();
        let source = ScriptedSource::default();
        source.push(Category::Videos, Ok(ids(&["v1"])));
        source.push(Category::Videos, Ok(ids(&["v1", "v2"])));
        source.push(Category::Videos, Ok(ids(&["v1", "v2"])));
        let sink = RecordingSink::default();

        let mut watcher = Watcher::new(&config, &source, &sink);
        watcher.baseline().await.unwrap();

        let first = watcher.scan().await;
        assert_eq!(first.announced, 1);

        let second = watcher.scan().await;
        assert_eq!(second.discovered, 0);
        assert_eq!(second.announced, 0);
        assert_eq!(sink.sent(), ids(&["v2"]));
    }
}
