use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One batch of a paginated upstream listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, continuation: Option<String>) -> Self {
        Self { items, continuation }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Option<String>,
    pub text: Option<String>,
    pub published_time: Option<String>,
    pub author: Option<CommentAuthor>,
    pub like_count: Option<u64>,
    pub reply_count: Option<u64>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: Option<String>,
    pub name: Option<String>,
    pub thumbnails: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub metadata: ChannelMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Value>,
    pub banner: Option<Value>,
    /// Human readable subscriber count, absent when the channel hides it.
    pub subscriber_count: Option<String>,
    pub videos_count: Option<String>,
}
