use crate::error::Result;
use crate::query::StrategyFragments;
use crate::strategy::{RandomBy, Selector, StrategyDescriptor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use soul_core::Track;

/// Every eligible track is equally likely
pub struct RandomByTrack {
    descriptor: StrategyDescriptor,
    fragments: StrategyFragments,
}

impl RandomByTrack {
    pub const ID: &'static str = "song";

    pub fn new() -> Self {
        Self {
            descriptor: StrategyDescriptor {
                id: Self::ID.to_string(),
                label: "Shuffle by Song".to_string(),
                adverb: "by song".to_string(),
                description: "Play songs randomly from the playback source".to_string(),
                icon_name: "media-playlist-shuffle".to_string(),
            },
            fragments: StrategyFragments::ordered_by("RANDOM()"),
        }
    }
}

impl Default for RandomByTrack {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RandomBy for RandomByTrack {
    fn descriptor(&self) -> &StrategyDescriptor {
        &self.descriptor
    }

    fn fragments(&self) -> &StrategyFragments {
        &self.fragments
    }

    async fn playback_track(
        &mut self,
        selector: &mut Selector<'_>,
        after: DateTime<Utc>,
    ) -> Result<Option<Track>> {
        selector.playback_candidate(after).await
    }

    async fn shuffler_track(
        &mut self,
        selector: &mut Selector<'_>,
        after: DateTime<Utc>,
    ) -> Result<Option<Track>> {
        selector.shuffler_candidate(after).await
    }
}
