use std::collections::{HashSet, VecDeque};

use serde_json::Value;
use tracing::debug;

use super::model::{refs_from_value, VideoInfo, VideoRef};

/// Upper bound on the number of related videos returned for one video.
pub const MAX_RELATED: usize = 100;

type SeedAccessor = fn(&VideoInfo) -> Vec<VideoRef>;

/// Candidate seed fields, in priority order.
const SEED_SOURCES: [(&str, SeedAccessor); 4] = [
    ("related", seed_related),
    ("related_videos", seed_related_videos),
    ("watch_next_feed", seed_watch_next_feed),
    ("secondary_info.watch_next_feed", seed_secondary_watch_next_feed),
];

fn seed_related(info: &VideoInfo) -> Vec<VideoRef> {
    info.related.clone()
}

fn seed_related_videos(info: &VideoInfo) -> Vec<VideoRef> {
    info.related_videos.clone()
}

fn seed_watch_next_feed(info: &VideoInfo) -> Vec<VideoRef> {
    info.watch_next_feed.clone()
}

fn seed_secondary_watch_next_feed(info: &VideoInfo) -> Vec<VideoRef> {
    info.secondary_watch_next_feed()
        .map(|feed| refs_from_value(feed.clone()))
        .unwrap_or_default()
}

/// Result of flattening: the related list, and the info it was taken from
/// with all candidate fields cleared and `watch_next_feed` set to the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub related: Vec<VideoRef>,
    pub info: VideoInfo,
}

/// Returns the name and a copy of the first non-empty seed field.
pub fn select_seed(info: &VideoInfo) -> Option<(&'static str, Vec<VideoRef>)> {
    SEED_SOURCES.iter().find_map(|(name, accessor)| {
        let stubs = accessor(info);
        (!stubs.is_empty()).then_some((*name, stubs))
    })
}

pub fn flatten(info: VideoInfo) -> Flattened {
    flatten_with_limit(info, MAX_RELATED)
}

/// Collapses the nested related-video graph of `info` into a flat list of at
/// most `max` unique, well-formed videos in breadth-first discovery order.
pub fn flatten_with_limit(mut info: VideoInfo, max: usize) -> Flattened {
    let seed = match select_seed(&info) {
        Some((source, stubs)) => {
            debug!(source, count = stubs.len(), "Seeding related videos");
            stubs
        }
        None => Vec::new(),
    };

    let related = walk(seed, max);

    info.related.clear();
    info.related_videos.clear();
    if let Some(feed) = info.secondary_watch_next_feed_mut() {
        *feed = Value::Array(Vec::new());
    }
    info.watch_next_feed = related.clone();

    Flattened { related, info }
}

fn walk(seed: Vec<VideoRef>, max: usize) -> Vec<VideoRef> {
    let mut frontier: VecDeque<VideoRef> = seed.into();
    let mut visited: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    while result.len() < max {
        let Some(stub) = frontier.pop_front() else {
            break;
        };
        let Some(id) = stub.valid_id() else {
            continue;
        };
        if !visited.insert(id.to_string()) {
            continue;
        }
        frontier.extend(stub.related_stubs());
        result.push(stub);
    }

    result.truncate(max);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_for(n: usize) -> String {
        format!("vid{:08}", n)
    }

    fn ids(videos: &[VideoRef]) -> Vec<&str> {
        videos.iter().filter_map(|v| v.valid_id()).collect()
    }

    fn info_from(value: serde_json::Value) -> VideoInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dedup_example() {
        let info = info_from(json!({
            "related": [
                { "id": "AAAAAAAAAAA" },
                { "id": "BBBBBBBBBBB", "related": [{ "id": "AAAAAAAAAAA" }, { "id": "CCCCCCCCCCC" }] },
            ]
        }));
        let out = flatten(info);
        assert_eq!(ids(&out.related), vec!["AAAAAAAAAAA", "BBBBBBBBBBB", "CCCCCCCCCCC"]);
    }

    #[test]
    fn test_malformed_stub_dropped() {
        let info = info_from(json!({
            "related": [
                { "id": "short" },
                { "title": "no id at all" },
                null,
                { "id": 42 },
                { "id": "AAAAAAAAAAA" },
            ]
        }));
        let out = flatten(info);
        assert_eq!(ids(&out.related), vec!["AAAAAAAAAAA"]);
        assert_eq!(out.related.len(), 1);
    }

    #[test]
    fn test_malformed_stub_children_not_expanded() {
        let info = info_from(json!({
            "related": [{ "id": "short", "related": [{ "id": "AAAAAAAAAAA" }] }]
        }));
        assert!(flatten(info).related.is_empty());

        let info = info_from(json!({
            "related": [
                { "id": 7, "related": [{ "id": "AAAAAAAAAAA" }] },
                { "id": "BBBBBBBBBBB" },
            ]
        }));
        assert_eq!(ids(&flatten(info).related), vec!["BBBBBBBBBBB"]);
    }

    #[test]
    fn test_cap() {
        let seed: Vec<VideoRef> = (0..150).map(|n| VideoRef::new(id_for(n))).collect();
        let info = VideoInfo {
            related: seed,
            ..Default::default()
        };
        let out = flatten(info);
        assert_eq!(out.related.len(), MAX_RELATED);
        assert_eq!(out.related[99].valid_id(), Some(id_for(99).as_str()));

        let seed: Vec<VideoRef> = (0..10).map(|n| VideoRef::new(id_for(n))).collect();
        let info = VideoInfo {
            related: seed,
            ..Default::default()
        };
        assert_eq!(flatten_with_limit(info, 4).related.len(), 4);
    }

    #[test]
    fn test_cap_reached_through_children() {
        let children: Vec<VideoRef> = (1..200).map(|n| VideoRef::new(id_for(n))).collect();
        let info = VideoInfo {
            related: vec![VideoRef::new(id_for(0)).with_related(children)],
            ..Default::default()
        };
        let out = flatten(info);
        assert_eq!(out.related.len(), MAX_RELATED);
    }

    #[test]
    fn test_breadth_first_order() {
        let info = info_from(json!({
            "related": [
                { "id": "CCCCCCCCCCC", "related": [{ "id": "DDDDDDDDDDD", "related": [{ "id": "EEEEEEEEEEE" }] }] },
                { "id": "AAAAAAAAAAA", "related": [{ "id": "FFFFFFFFFFF" }] },
            ]
        }));
        let out = flatten(info);
        assert_eq!(
            ids(&out.related),
            vec!["CCCCCCCCCCC", "AAAAAAAAAAA", "DDDDDDDDDDD", "FFFFFFFFFFF", "EEEEEEEEEEE"]
        );
    }

    #[test]
    fn test_cycle() {
        let info = info_from(json!({
            "related": [
                { "id": "AAAAAAAAAAA", "related": [{ "id": "BBBBBBBBBBB", "related": [{ "id": "AAAAAAAAAAA" }] }] },
                { "id": "BBBBBBBBBBB" },
            ]
        }));
        let out = flatten(info);
        assert_eq!(ids(&out.related), vec!["AAAAAAAAAAA", "BBBBBBBBBBB"]);
        // The seed-level B wins over the nested one, so it carries no related list.
        assert_eq!(serde_json::to_value(&out.related[1]).unwrap(), json!({ "id": "BBBBBBBBBBB" }));
    }

    #[test]
    fn test_seed_priority() {
        let info = info_from(json!({
            "related": [],
            "related_videos": [{ "id": "BBBBBBBBBBB" }],
            "watch_next_feed": [{ "id": "CCCCCCCCCCC" }],
        }));
        assert_eq!(select_seed(&info).map(|(name, _)| name), Some("related_videos"));
        assert_eq!(ids(&flatten(info).related), vec!["BBBBBBBBBBB"]);

        let info = info_from(json!({
            "related": [],
            "related_videos": [],
            "watch_next_feed": [{ "id": "CCCCCCCCCCC" }],
            "secondary_info": { "watch_next_feed": [{ "id": "DDDDDDDDDDD" }] },
        }));
        assert_eq!(select_seed(&info).map(|(name, _)| name), Some("watch_next_feed"));
        assert_eq!(ids(&flatten(info).related), vec!["CCCCCCCCCCC"]);

        let info = info_from(json!({
            "secondary_info": { "watch_next_feed": [{ "id": "DDDDDDDDDDD" }] },
        }));
        assert_eq!(
            select_seed(&info).map(|(name, _)| name),
            Some("secondary_info.watch_next_feed")
        );
        assert_eq!(ids(&flatten(info).related), vec!["DDDDDDDDDDD"]);

        let info = info_from(json!({ "title": "lonely" }));
        assert!(select_seed(&info).is_none());
        assert!(flatten(info).related.is_empty());
    }

    #[test]
    fn test_clears_candidate_fields() {
        let info = info_from(json!({
            "title": "kept",
            "related": [{ "id": "AAAAAAAAAAA", "related": [{ "id": "BBBBBBBBBBB" }] }],
            "related_videos": [{ "id": "CCCCCCCCCCC" }],
            "watch_next_feed": [{ "id": "DDDDDDDDDDD" }],
            "secondary_info": { "watch_next_feed": [{ "id": "EEEEEEEEEEE" }] },
        }));
        let out = flatten(info);
        assert!(out.info.related.is_empty());
        assert!(out.info.related_videos.is_empty());
        assert_eq!(out.info.secondary_watch_next_feed(), Some(&json!([])));
        assert_eq!(out.info.watch_next_feed, out.related);
        assert_eq!(out.info.extra.get("title"), Some(&json!("kept")));

        // Nested related lists are not stripped.
        assert_eq!(out.related[0].related_stubs().len(), 1);

        let json = serde_json::to_value(&out.info).unwrap();
        assert_eq!(json["related"], json!([]));
        assert_eq!(json["related_videos"], json!([]));
        assert_eq!(json["watch_next_feed"][1]["id"], json!("BBBBBBBBBBB"));
    }

    #[test]
    fn test_stubs_serialized_as_received() {
        let info = info_from(json!({
            "related": [
                { "id": "AAAAAAAAAAA", "related": [] },
                { "id": "BBBBBBBBBBB", "related": [null, { "id": "CCCCCCCCCCC" }] },
            ],
            "secondary_info": "text",
        }));
        let out = flatten(info);
        assert_eq!(ids(&out.related), vec!["AAAAAAAAAAA", "BBBBBBBBBBB", "CCCCCCCCCCC"]);

        let json = serde_json::to_value(&out.info).unwrap();
        assert_eq!(json["secondary_info"], json!("text"));
        assert_eq!(
            json["watch_next_feed"],
            json!([
                { "id": "AAAAAAAAAAA", "related": [] },
                { "id": "BBBBBBBBBBB", "related": [null, { "id": "CCCCCCCCCCC" }] },
                { "id": "CCCCCCCCCCC" },
            ])
        );
    }
}
