use async_trait::async_trait;

use super::error::UpstreamResult;
use super::platform::VideoPlatform;
use super::types::{Comment, Page};
use crate::related::VideoRef;

/// Anything that can hand out pages of `T` given a continuation.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch(&self, continuation: Option<&str>) -> UpstreamResult<Page<T>>;
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Pulls pages from a `PageSource` one at a time, following continuations.
pub struct Pager<'a, T> {
    source: &'a dyn PageSource<T>,
    cursor: Cursor,
}

impl<'a, T: Send> Pager<'a, T> {
    pub fn new(source: &'a dyn PageSource<T>) -> Self {
        Self {
            source,
            cursor: Cursor::Start,
        }
    }

    /// Next batch, or `None` once the source has no more pages.
    pub async fn next(&mut self) -> UpstreamResult<Option<Vec<T>>> {
        let continuation = match &self.cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token.as_str()),
            Cursor::Done => return Ok(None),
        };
        let page = self.source.fetch(continuation).await?;
        self.cursor = match page.continuation {
            Some(token) => Cursor::Next(token),
            None => Cursor::Done,
        };
        Ok(Some(page.items))
    }

    /// Collects batches until at least `limit` items are gathered or the
    /// source runs dry, then truncates to `limit`.
    pub async fn collect_up_to(&mut self, limit: usize) -> UpstreamResult<Vec<T>> {
        let mut items = Vec::new();
        while items.len() < limit {
            match self.next().await? {
                Some(batch) => items.extend(batch),
                None => break,
            }
        }
        items.truncate(limit);
        Ok(items)
    }

    /// Returns the contents of the 1-based page `page`, or an empty list if
    /// the source ends before reaching it.
    pub async fn nth_page(&mut self, page: usize) -> UpstreamResult<Vec<T>> {
        let mut batch = self.next().await?.unwrap_or_default();
        for _ in 1..page.max(1) {
            match self.next().await? {
                Some(next) => batch = next,
                None => return Ok(Vec::new()),
            }
        }
        Ok(batch)
    }
}

pub struct SearchPages<'a> {
    pub platform: &'a dyn VideoPlatform,
    pub query: &'a str,
}

#[async_trait]
impl<'a> PageSource<VideoRef> for SearchPages<'a> {
    async fn fetch(&self, continuation: Option<&str>) -> UpstreamResult<Page<VideoRef>> {
        self.platform.search(self.query, continuation).await
    }
}

pub struct CommentPages<'a> {
    pub platform: &'a dyn VideoPlatform,
    pub video_id: &'a str,
}

#[async_trait]
impl<'a> PageSource<Comment> for CommentPages<'a> {
    async fn fetch(&self, continuation: Option<&str>) -> UpstreamResult<Page<Comment>> {
        self.platform.get_comments(self.video_id, continuation).await
    }
}

pub struct ChannelVideoPages<'a> {
    pub platform: &'a dyn VideoPlatform,
    pub channel_id: &'a str,
}

#[async_trait]
impl<'a> PageSource<VideoRef> for ChannelVideoPages<'a> {
    async fn fetch(&self, continuation: Option<&str>) -> UpstreamResult<Page<VideoRef>> {
        self.platform
            .get_channel_videos(self.channel_id, continuation)
            .await
    }
}
