use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::types::*;
use crate::related::{flatten_with_limit, VideoInfo, VideoRef};
use crate::server::AppState;
use crate::upstream::{ChannelVideoPages, Comment, CommentPages, Pager, SearchPages};

/// Trending category served by `/api/fvideo`.
const FEATURED_CATEGORY: &str = "Music";

fn required<'a>(
    params: &'a HashMap<String, String>,
    key: &str,
    message: &str,
) -> ApiResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

fn number_or(params: &HashMap<String, String>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub async fn get_video(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<VideoInfo>> {
    let id = required(&params, "id", "Missing video id")?;

    let info = state.platform.get_info(id).await?;
    let flattened = flatten_with_limit(info, state.config.limits.related);
    debug!(
        video_id = id,
        related = flattened.related.len(),
        "Flattened related videos"
    );

    Ok(Json(flattened.info))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<VideoRef>>> {
    let query = required(&params, "q", "Missing search query")?;
    let limit = number_or(&params, "limit", state.config.limits.search);

    let source = SearchPages {
        platform: state.platform.as_ref(),
        query,
    };
    let videos = Pager::<VideoRef>::new(&source).collect_up_to(limit).await?;

    Ok(Json(videos))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<CommentsResponse>> {
    let id = required(&params, "id", "Missing video id")?;

    let source = CommentPages {
        platform: state.platform.as_ref(),
        video_id: id,
    };
    let comments = Pager::<Comment>::new(&source)
        .collect_up_to(state.config.limits.comments)
        .await?;

    Ok(Json(CommentsResponse {
        comments: comments.into_iter().map(CommentDto::from).collect(),
    }))
}

pub async fn get_channel(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ChannelResponse>> {
    let id = required(&params, "id", "Missing channel id")?;
    // Echoed as requested; `nth_page` reads page 0 as the first page.
    let page = number_or(&params, "page", 1);

    let channel = state.platform.get_channel(id).await?;
    let source = ChannelVideoPages {
        platform: state.platform.as_ref(),
        channel_id: id,
    };
    let videos = Pager::<VideoRef>::new(&source).nth_page(page).await?;

    Ok(Json(ChannelResponse {
        channel: ChannelDto::from_channel(channel, &state.config.hidden_subscriber_label),
        page,
        videos,
    }))
}

pub async fn get_channel_shorts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<VideoRef>>> {
    let id = required(&params, "id", "Missing channel id")?;
    let shorts = state.platform.get_channel_shorts(id).await?;
    Ok(Json(shorts))
}

pub async fn get_channel_playlists(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let id = required(&params, "id", "Missing channel id")?;
    let playlists = state.platform.get_channel_playlists(id).await?;
    Ok(Json(playlists))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let id = required(&params, "id", "Missing playlist id")?;
    let playlist = state
        .platform
        .get_playlist(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;
    Ok(Json(playlist))
}

pub async fn get_featured(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let trending = state.platform.get_trending(FEATURED_CATEGORY).await?;
    Ok(Json(trending))
}
