use async_trait::async_trait;
use serde_json::Value;

use super::error::UpstreamResult;
use super::types::{Channel, Comment, Page};
use crate::related::{VideoInfo, VideoRef};

/// The video platform as seen by the HTTP handlers.
///
/// Listing operations that the platform paginates take the continuation
/// returned with the previous page, or `None` for the first page.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    async fn get_info(&self, video_id: &str) -> UpstreamResult<VideoInfo>;

    async fn search(
        &self,
        query: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<VideoRef>>;

    async fn get_comments(
        &self,
        video_id: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<Comment>>;

    async fn get_channel(&self, channel_id: &str) -> UpstreamResult<Channel>;

    async fn get_channel_videos(
        &self,
        channel_id: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<VideoRef>>;

    async fn get_channel_shorts(&self, channel_id: &str) -> UpstreamResult<Vec<VideoRef>>;

    async fn get_channel_playlists(&self, channel_id: &str) -> UpstreamResult<Value>;

    /// Returns `None` when the platform has no such playlist.
    async fn get_playlist(&self, playlist_id: &str) -> UpstreamResult<Option<Value>>;

    async fn get_trending(&self, category: &str) -> UpstreamResult<Value>;
}
