//! Video list response types and normalization.

use chrono::DateTime;
use serde::Deserialize;
use upfeed_core::{Error, Item, SourceId};

/// Raw response from the video list endpoint.
///
/// `data` is absent or null when `code` is non-zero.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<VideoListData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoListData {
    #[serde(default)]
    pub list: VideoList,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub vlist: Vec<VideoRecord>,
}

/// One video as returned by the upstream.
#[derive(Debug, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub aid: i64,
    #[serde(default)]
    pub bvid: String,
    #[serde(default)]
    pub pic: String,
    pub created: i64,
}

/// Profile URL of a creator; its last path segment is the source id.
pub fn author_url(source: &SourceId) -> String {
    format!("https://space.bilibili.com/{source}")
}

impl VideoRecord {
    fn video_url(&self) -> String {
        if self.bvid.is_empty() {
            format!("https://www.bilibili.com/video/av{}", self.aid)
        } else {
            format!("https://www.bilibili.com/video/{}", self.bvid)
        }
    }

    fn thumbnail_url(&self) -> String {
        if self.pic.starts_with("//") { format!("https:{}", self.pic) } else { self.pic.clone() }
    }

    fn into_item(self, source: &SourceId) -> Result<Item, Error> {
        let published_at = DateTime::from_timestamp(self.created, 0)
            .ok_or_else(|| Error::Decode(format!("invalid publish timestamp {}", self.created)))?;

        Ok(Item {
            url: self.video_url(),
            thumbnail_url: self.thumbnail_url(),
            author_url: author_url(source),
            title: self.title,
            author: self.author,
            published_at,
        })
    }
}

impl VideoListResponse {
    /// Convert to items tagged with their source.
    ///
    /// A non-zero `code` is an application-level failure even on HTTP 200.
    pub fn into_items(self, source: &SourceId) -> Result<Vec<Item>, Error> {
        if self.code != 0 {
            return Err(Error::UpstreamStatus { code: self.code, message: self.message });
        }

        self.data
            .unwrap_or_default()
            .list
            .vlist
            .into_iter()
            .map(|record| record.into_item(source))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "code": 0,
        "message": "0",
        "ttl": 1,
        "data": {
            "list": {
                "tlist": {},
                "vlist": [
                    {
                        "title": "Newest upload",
                        "author": "Some Creator",
                        "aid": 1000001,
                        "bvid": "BV1xx411c7mD",
                        "pic": "//i0.hdslb.com/bfs/archive/one.jpg",
                        "created": 1700000300,
                        "length": "10:00"
                    },
                    {
                        "title": "Older upload",
                        "author": "Some Creator",
                        "aid": 1000000,
                        "bvid": "",
                        "pic": "https://i0.hdslb.com/bfs/archive/two.jpg",
                        "created": 1700000100
                    }
                ]
            },
            "page": {"pn": 1, "ps": 30, "count": 2}
        }
    }"#;

    #[test]
    fn test_deserialize_response() {
        let response: VideoListResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert_eq!(response.code, 0);
        assert_eq!(response.data.unwrap().list.vlist.len(), 2);
    }

    #[test]
    fn test_normalize_to_items() {
        let response: VideoListResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        let items = response.into_items(&SourceId::from("946974")).unwrap();

        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Newest upload");
        assert_eq!(first.url, "https://www.bilibili.com/video/BV1xx411c7mD");
        assert_eq!(first.thumbnail_url, "https://i0.hdslb.com/bfs/archive/one.jpg");
        assert_eq!(first.author, "Some Creator");
        assert_eq!(first.author_url, "https://space.bilibili.com/946974");
        assert_eq!(first.published_at.timestamp(), 1_700_000_300);

        let second = &items[1];
        assert_eq!(second.url, "https://www.bilibili.com/video/av1000000");
        assert_eq!(second.thumbnail_url, "https://i0.hdslb.com/bfs/archive/two.jpg");
    }

    #[test]
    fn test_non_zero_code() {
        let json = r#"{"code": -352, "message": "risk control", "data": null}"#;
        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        let result = response.into_items(&SourceId::from("1"));
        assert_eq!(result.unwrap_err(), Error::UpstreamStatus { code: -352, message: "risk control".to_string() });
    }

    #[test]
    fn test_missing_data_is_empty() {
        let json = r#"{"code": 0, "message": "0"}"#;
        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_items(&SourceId::from("1")).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let json = r#"{"code": 0, "data": {"list": {"vlist": [{"title": "t", "created": 9223372036854775807}]}}}"#;
        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_items(&SourceId::from("1")), Err(Error::Decode(_))));
    }
}
