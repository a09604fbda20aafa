use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::related::VideoRef;
use crate::upstream::{Channel, Comment};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDto {
    pub text: Option<String>,
    pub comment_id: Option<String>,
    pub published_time: Option<String>,
    pub author: CommentAuthorDto,
    pub like_count: String,
    pub reply_count: String,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthorDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub thumbnails: Vec<Value>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        let author = comment.author.unwrap_or_default();
        CommentDto {
            text: comment.text,
            comment_id: comment.comment_id,
            published_time: comment.published_time,
            author: CommentAuthorDto {
                id: author.id,
                name: author.name,
                thumbnails: author.thumbnails.unwrap_or_default(),
            },
            like_count: comment.like_count.unwrap_or(0).to_string(),
            reply_count: comment.reply_count.unwrap_or(0).to_string(),
            is_pinned: comment.is_pinned.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub channel: ChannelDto,
    pub page: usize,
    pub videos: Vec<VideoRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDto {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Value>,
    pub banner: Option<Value>,
    pub subscriber_count: String,
    pub video_count: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl ChannelDto {
    /// `hidden_label` stands in for the subscriber count when the channel
    /// does not publish one.
    pub fn from_channel(channel: Channel, hidden_label: &str) -> Self {
        let meta = channel.metadata;
        ChannelDto {
            id: channel.id,
            name: non_empty(meta.title),
            description: non_empty(meta.description),
            avatar: meta.avatar.filter(|v| !v.is_null()),
            banner: meta.banner.filter(|v| !v.is_null()),
            subscriber_count: non_empty(meta.subscriber_count)
                .unwrap_or_else(|| hidden_label.to_string()),
            video_count: meta.videos_count.unwrap_or_else(|| "0".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{ChannelMetadata, CommentAuthor};
    use serde_json::json;

    #[test]
    fn test_comment_defaults() {
        let dto = CommentDto::from(Comment::default());
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            value,
            json!({
                "text": null,
                "comment_id": null,
                "published_time": null,
                "author": { "id": null, "name": null, "thumbnails": [] },
                "like_count": "0",
                "reply_count": "0",
                "is_pinned": false,
            })
        );
    }

    #[test]
    fn test_comment_fields() {
        let dto = CommentDto::from(Comment {
            comment_id: Some("c1".to_string()),
            text: Some("nice".to_string()),
            published_time: Some("2 days ago".to_string()),
            author: Some(CommentAuthor {
                id: Some("UC1".to_string()),
                name: Some("someone".to_string()),
                thumbnails: Some(vec![json!({ "url": "x" })]),
            }),
            like_count: Some(1200),
            reply_count: Some(4),
            is_pinned: Some(true),
        });
        assert_eq!(dto.like_count, "1200");
        assert_eq!(dto.reply_count, "4");
        assert!(dto.is_pinned);
        assert_eq!(dto.author.thumbnails.len(), 1);
    }

    #[test]
    fn test_channel_dto() {
        let channel = Channel {
            id: "UC1".to_string(),
            metadata: ChannelMetadata {
                title: Some(String::new()),
                subscriber_count: None,
                ..Default::default()
            },
        };
        let dto = ChannelDto::from_channel(channel, "hidden");
        assert_eq!(dto.name, None);
        assert_eq!(dto.subscriber_count, "hidden");
        assert_eq!(dto.video_count, "0");

        let value = serde_json::to_value(&dto).unwrap();
        assert!(value.get("subscriberCount").is_some());
        assert!(value.get("videoCount").is_some());
    }
}
