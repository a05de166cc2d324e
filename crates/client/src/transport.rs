// ABOUTME: Text fetching over reqwest: status, headers, final URL and a charset-decoded body.
// ABOUTME: Redirects are followed by the underlying client; callers decide what a non-success status means.

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};

use crate::error::ClientError;

/// Maximum allowed response body size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// A fetched text resource.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// The URL after redirects.
    pub final_url: String,
    /// The lowercased content-type header, if any.
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    /// A header value as text, if present and well-formed.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Fetches a URL and decodes the body to text. Error statuses are returned
/// as regular responses; only transport-level failures are errors.
pub async fn fetch_text(
    http: &reqwest::Client,
    url: &str,
    accept: Option<&str>,
) -> Result<Response, ClientError> {
    let mut request = http.get(url);
    if let Some(accept) = accept {
        request = request.header(ACCEPT, accept);
    }

    let response = request.send().await?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers = response.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_lowercase);

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_CONTENT_LENGTH {
        return Err(ClientError::BodyTooLarge {
            url: url.to_string(),
        });
    }

    let body = decode_body(&bytes, content_type.as_deref());

    Ok(Response {
        status,
        final_url,
        content_type,
        headers,
        body,
    })
}

/// Decodes body bytes using the charset from the content-type header, with
/// detection as the fallback.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    for part in content_type.to_lowercase().split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            return Some(charset.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}
