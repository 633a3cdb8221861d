//! Video list request parameters and headers.

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use upfeed_core::{Error, SourceId};

/// Path of the per-creator video list endpoint.
pub const VIDEO_LIST_PATH: &str = "/x/space/arc/search";

/// Origin the upstream expects on API calls.
pub const SPACE_ORIGIN: &str = "https://space.bilibili.com";

/// Query parameters for one creator's newest videos.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoListRequest {
    /// Creator id.
    pub mid: String,
    /// Page size.
    pub ps: u32,
    /// Category filter (0 = all).
    pub tid: u32,
    /// Page number, 1-based.
    pub pn: u32,
    /// Sort order.
    pub order: String,
}

impl VideoListRequest {
    /// First page of a creator's uploads, newest first.
    pub fn newest(source: &SourceId, page_size: u32) -> Self {
        Self { mid: source.as_str().to_string(), ps: page_size, tid: 0, pn: 1, order: "pubdate".to_string() }
    }

    /// Browser-like headers for this request.
    pub fn headers(&self, user_agent: &str) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value(user_agent)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers.insert(header::ORIGIN, HeaderValue::from_static(SPACE_ORIGIN));
        headers.insert(header::REFERER, header_value(&format!("{SPACE_ORIGIN}/{}/video", self.mid))?);
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidInput(format!("invalid header value {value:?}: {e}")))
}
