use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Length of a well-formed platform video id.
pub const VIDEO_ID_LEN: usize = 11;

/// A single video as embedded in listings and related feeds.
///
/// The upstream object is kept as-is, so serializing a stub gives back exactly
/// what was received. `id` and `related` are read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoRef {
    fields: Map<String, Value>,
}

impl VideoRef {
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.into()));
        Self { fields }
    }

    pub fn with_related(mut self, related: Vec<VideoRef>) -> Self {
        let related = related.into_iter().map(|stub| Value::Object(stub.fields));
        self.fields
            .insert("related".to_string(), Value::Array(related.collect()));
        self
    }

    /// The id, if it is a string of exactly `VIDEO_ID_LEN` characters.
    ///
    /// Length is counted in Unicode scalar values. An id containing characters
    /// outside the Basic Multilingual Plane therefore counts each of them once,
    /// where a UTF-16 length would count two. Real platform ids are ASCII, so
    /// the two measures agree for every id the upstream produces.
    pub fn valid_id(&self) -> Option<&str> {
        self.fields
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| id.chars().count() == VIDEO_ID_LEN)
    }

    /// The object entries of the nested `related` list, for traversal.
    /// The stored list itself is left untouched.
    pub fn related_stubs(&self) -> Vec<VideoRef> {
        self.fields
            .get("related")
            .map(|related| refs_from_value(related.clone()))
            .unwrap_or_default()
    }
}

/// Watch-page information for one video.
///
/// The three top-level candidate lists are typed. `secondary_info` and every
/// other field stay raw in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default, deserialize_with = "lenient_refs")]
    pub related: Vec<VideoRef>,
    #[serde(default, deserialize_with = "lenient_refs")]
    pub related_videos: Vec<VideoRef>,
    #[serde(default, deserialize_with = "lenient_refs")]
    pub watch_next_feed: Vec<VideoRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoInfo {
    /// `secondary_info.watch_next_feed`, when `secondary_info` is an object.
    pub fn secondary_watch_next_feed(&self) -> Option<&Value> {
        self.extra.get("secondary_info")?.get("watch_next_feed")
    }

    pub fn secondary_watch_next_feed_mut(&mut self) -> Option<&mut Value> {
        self.extra
            .get_mut("secondary_info")?
            .get_mut("watch_next_feed")
    }
}

/// Converts an arbitrary JSON value into a list of stubs.
///
/// Anything that is not an array yields an empty list, and array entries that
/// are not objects are dropped.
pub fn refs_from_value(value: Value) -> Vec<VideoRef> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(fields) => Some(VideoRef { fields }),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_refs<'de, D>(deserializer: D) -> Result<Vec<VideoRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(refs_from_value(value))
}
