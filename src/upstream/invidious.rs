use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::{UpstreamError, UpstreamResult};
use super::platform::VideoPlatform;
use super::types::{Channel, ChannelMetadata, Comment, CommentAuthor, Page};
use crate::config::UpstreamConfig;
use crate::related::{refs_from_value, VideoInfo, VideoRef};

/// Client for an Invidious-compatible `/api/v1` JSON API.
pub struct InvidiousClient {
    http: reqwest::Client,
    baseurl: String,
    lang: String,
    region: String,
}

impl InvidiousClient {
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.useragent.as_str())
            .build()?;

        Ok(Self {
            http,
            baseurl: config.baseurl.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            region: config.region.clone(),
        })
    }

    /// GETs `path` and decodes the body as JSON. A 404 yields `None`.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> UpstreamResult<Option<Value>> {
        let url = format!("{}{}", self.baseurl, path);
        debug!(url = %url, "Upstream request");

        let response = self
            .http
            .get(&url)
            .query(&[("hl", self.lang.as_str()), ("region", self.region.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
                message,
            });
        }

        Ok(Some(response.json::<Value>().await?))
    }

    async fn get_required(&self, path: &str, query: &[(&str, &str)]) -> UpstreamResult<Value> {
        self.get_json(path, query).await?.ok_or_else(|| UpstreamError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            url: format!("{}{}", self.baseurl, path),
            message: "Not found".to_string(),
        })
    }
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Renames `videoId` to `id` so listings line up with `VideoRef`.
pub fn normalize_video(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(video_id) = map.remove("videoId") {
                map.entry("id").or_insert(video_id);
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn normalize_videos(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_video).collect()),
        other => other,
    }
}

pub fn video_refs(value: Value) -> Vec<VideoRef> {
    refs_from_value(normalize_videos(value))
}

/// Builds a `VideoInfo` from a `/api/v1/videos/{id}` response.
pub fn video_info_from(value: Value) -> UpstreamResult<VideoInfo> {
    let Value::Object(mut map) = normalize_video(value) else {
        return Err(UpstreamError::InvalidResponse(
            "video response is not an object".to_string(),
        ));
    };
    let recommended = map.remove("recommendedVideos").unwrap_or(Value::Null);

    let mut info: VideoInfo = serde_json::from_value(Value::Object(map))?;
    info.related_videos = video_refs(recommended);
    Ok(info)
}

fn continuation_of(body: &Value) -> Option<String> {
    body.get("continuation")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn take_array(body: &mut Value, key: &str) -> Value {
    body.get_mut(key).map(Value::take).unwrap_or(Value::Null)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InvidiousComment {
    comment_id: Option<String>,
    content: Option<String>,
    published_text: Option<String>,
    author: Option<String>,
    author_id: Option<String>,
    author_thumbnails: Option<Vec<Value>>,
    like_count: Option<u64>,
    is_pinned: Option<bool>,
    replies: Option<InvidiousReplies>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InvidiousReplies {
    reply_count: Option<u64>,
}

impl From<InvidiousComment> for Comment {
    fn from(c: InvidiousComment) -> Self {
        Comment {
            comment_id: c.comment_id,
            text: c.content,
            published_time: c.published_text,
            author: Some(CommentAuthor {
                id: c.author_id,
                name: c.author,
                thumbnails: c.author_thumbnails,
            }),
            like_count: c.like_count,
            reply_count: c.replies.and_then(|r| r.reply_count),
            is_pinned: c.is_pinned,
        }
    }
}

pub fn comments_from(mut body: Value) -> Page<Comment> {
    let continuation = continuation_of(&body);
    let comments = match take_array(&mut body, "comments") {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<InvidiousComment>(item).ok())
            .map(Comment::from)
            .collect(),
        _ => Vec::new(),
    };
    Page::new(comments, continuation)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InvidiousChannel {
    author: Option<String>,
    author_id: Option<String>,
    description: Option<String>,
    author_thumbnails: Option<Value>,
    author_banners: Option<Value>,
    sub_count: Option<u64>,
    video_count: Option<u64>,
}

pub fn channel_from(channel_id: &str, body: Value) -> UpstreamResult<Channel> {
    let raw: InvidiousChannel = serde_json::from_value(body)?;
    Ok(Channel {
        id: raw.author_id.unwrap_or_else(|| channel_id.to_string()),
        metadata: ChannelMetadata {
            title: raw.author,
            description: raw.description,
            avatar: raw.author_thumbnails,
            banner: raw.author_banners,
            // Channels that hide their count report zero.
            subscriber_count: raw.sub_count.filter(|n| *n > 0).map(|n| n.to_string()),
            videos_count: raw.video_count.map(|n| n.to_string()),
        },
    })
}

#[async_trait]
impl VideoPlatform for InvidiousClient {
    async fn get_info(&self, video_id: &str) -> UpstreamResult<VideoInfo> {
        let body = self
            .get_required(&format!("/api/v1/videos/{}", segment(video_id)), &[])
            .await?;
        video_info_from(body)
    }

    async fn search(
        &self,
        query: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<VideoRef>> {
        // Invidious pages search by number; the page number is the continuation.
        let page: u32 = match continuation {
            Some(token) => token.parse().map_err(|_| {
                UpstreamError::InvalidResponse(format!("bad search continuation {:?}", token))
            })?,
            None => 1,
        };
        let page_str = page.to_string();
        let body = self
            .get_required(
                "/api/v1/search",
                &[("q", query), ("type", "video"), ("page", page_str.as_str())],
            )
            .await?;

        let items: Vec<Value> = match body {
            Value::Array(items) => items
                .into_iter()
                .filter(|item| {
                    item.get("type")
                        .and_then(Value::as_str)
                        .map_or(true, |kind| kind == "video")
                })
                .collect(),
            _ => Vec::new(),
        };
        let continuation = (!items.is_empty()).then(|| (page + 1).to_string());
        Ok(Page::new(video_refs(Value::Array(items)), continuation))
    }

    async fn get_comments(
        &self,
        video_id: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<Comment>> {
        let path = format!("/api/v1/comments/{}", segment(video_id));
        let body = match continuation {
            Some(token) => self.get_required(&path, &[("continuation", token)]).await?,
            None => self.get_required(&path, &[]).await?,
        };
        Ok(comments_from(body))
    }

    async fn get_channel(&self, channel_id: &str) -> UpstreamResult<Channel> {
        let body = self
            .get_required(&format!("/api/v1/channels/{}", segment(channel_id)), &[])
            .await?;
        channel_from(channel_id, body)
    }

    async fn get_channel_videos(
        &self,
        channel_id: &str,
        continuation: Option<&str>,
    ) -> UpstreamResult<Page<VideoRef>> {
        let path = format!("/api/v1/channels/{}/videos", segment(channel_id));
        let mut body = match continuation {
            Some(token) => self.get_required(&path, &[("continuation", token)]).await?,
            None => self.get_required(&path, &[]).await?,
        };
        let continuation = continuation_of(&body);
        Ok(Page::new(
            video_refs(take_array(&mut body, "videos")),
            continuation,
        ))
    }

    async fn get_channel_shorts(&self, channel_id: &str) -> UpstreamResult<Vec<VideoRef>> {
        let mut body = self
            .get_required(
                &format!("/api/v1/channels/{}/shorts", segment(channel_id)),
                &[],
            )
            .await?;
        Ok(video_refs(take_array(&mut body, "videos")))
    }

    async fn get_channel_playlists(&self, channel_id: &str) -> UpstreamResult<Value> {
        self.get_required(
            &format!("/api/v1/channels/{}/playlists", segment(channel_id)),
            &[],
        )
        .await
    }

    async fn get_playlist(&self, playlist_id: &str) -> UpstreamResult<Option<Value>> {
        let body = self
            .get_json(&format!("/api/v1/playlists/{}", segment(playlist_id)), &[])
            .await?;
        let Some(Value::Object(mut map)) = body else {
            return Ok(None);
        };
        let has_id = map
            .get("playlistId")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            return Ok(None);
        }
        if let Some(videos) = map.remove("videos") {
            map.insert("videos".to_string(), normalize_videos(videos));
        }
        Ok(Some(Value::Object(map)))
    }

    async fn get_trending(&self, category: &str) -> UpstreamResult<Value> {
        let kind = category.to_lowercase();
        let body = self
            .get_required("/api/v1/trending", &[("type", kind.as_str())])
            .await?;
        Ok(normalize_videos(body))
    }
}
