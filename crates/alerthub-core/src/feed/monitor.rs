//! Background community alert monitor.
//!
//! Periodically runs the incident search and logs alerts it has not seen
//! before, keyed by link. Links absent from every scan for the retention
//! window are forgotten. Stops when its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use alerthub_types::error::SearchError;
use alerthub_types::feed::CommunityAlert;
use dashmap::DashMap;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{FeedService, SearchProvider};

pub struct AlertMonitor<P: SearchProvider> {
    feed: Arc<FeedService<P>>,
    interval: Duration,
    retention: Duration,
    /// Link -> last scan that returned it.
    seen: DashMap<String, Instant>,
}

/// How long a link stays known after it stops showing up.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

impl<P: SearchProvider> AlertMonitor<P> {
    pub fn new(feed: Arc<FeedService<P>>, interval: Duration) -> Self {
        Self {
            feed,
            interval,
            retention: DEFAULT_RETENTION,
            seen: DashMap::new(),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Run one pass and return only alerts not reported by earlier passes.
    pub async fn scan(&self) -> Result<Vec<CommunityAlert>, SearchError> {
        let alerts = self.feed.community_alerts().await?;

        let now = Instant::now();
        let retention = self.retention;
        self.seen
            .retain(|_, last_seen| now.duration_since(*last_seen) < retention);

        let fresh: Vec<CommunityAlert> = alerts
            .into_iter()
            .filter(|alert| self.seen.insert(alert.link.clone(), now).is_none())
            .collect();

        for alert in &fresh {
            tracing::warn!(
                level = %alert.level,
                title = %alert.title,
                link = %alert.link,
                "community alert"
            );
        }
        Ok(fresh)
    }

    /// Scan every interval until `cancel` fires. The first scan runs
    /// immediately.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "alert monitor started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.scan().await {
                        Ok(fresh) => tracing::debug!(new_alerts = fresh.len(), "alert scan complete"),
                        Err(e) => tracing::warn!(error = %e, "alert scan failed"),
                    }
                }
            }
        }
        tracing::info!("alert monitor stopped");
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::ScriptedSearch;
    use alerthub_types::feed::AlertLevel;
    use serde_json::json;

    fn monitor() -> Arc<AlertMonitor<ScriptedSearch>> {
        let search = ScriptedSearch::default().with(
            "google",
            json!({"organic_results": [
                {"title": "Evacuation ordered", "link": "https://a.example/1"},
                {"title": "Road closure on 6th", "link": "https://a.example/2"},
                {"title": "Library hours", "link": "https://a.example/3"},
            ]}),
        );
        Arc::new(AlertMonitor::new(
            Arc::new(FeedService::new(search, "Austin, Texas")),
            Duration::from_secs(900),
        ))
    }

    #[tokio::test]
    async fn test_scan_reports_each_alert_once() {
        let monitor = monitor();
        let first = monitor.scan().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].level, AlertLevel::Yellow);

        let second = monitor.scan().await.unwrap();
        assert!(second.is_empty());
        assert_eq!(monitor.seen_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let monitor = monitor();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.clone().run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(monitor.seen_count(), 2);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_links_are_forgotten_after_retention() {
        let monitor = Arc::new(
            Arc::into_inner(monitor())
                .unwrap()
                .with_retention(Duration::from_secs(3600)),
        );

        assert_eq!(monitor.scan().await.unwrap().len(), 2);

        // still within retention, and each sighting refreshes the stamp
        tokio::time::advance(Duration::from_secs(1800)).await;
        assert!(monitor.scan().await.unwrap().is_empty());
        tokio::time::advance(Duration::from_secs(1800)).await;
        assert!(monitor.scan().await.unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(3601)).await;
        let again = monitor.scan().await.unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(monitor.seen_count(), 2);
    }
}
