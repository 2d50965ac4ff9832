use std::collections::HashMap;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use http_body_util::Full;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Connect,
    Trace,
    Other(String),
}

impl HttpMethod {
    pub fn from_hyper(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => HttpMethod::Get,
            hyper::Method::POST => HttpMethod::Post,
            hyper::Method::PUT => HttpMethod::Put,
            hyper::Method::DELETE => HttpMethod::Delete,
            hyper::Method::PATCH => HttpMethod::Patch,
            hyper::Method::OPTIONS => HttpMethod::Options,
            hyper::Method::HEAD => HttpMethod::Head,
            hyper::Method::CONNECT => HttpMethod::Connect,
            hyper::Method::TRACE => HttpMethod::Trace,
            ref other => HttpMethod::Other(other.as_str().to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(
        method: HttpMethod,
        path: String,
        headers: HashMap<String, String>,
        path_params: HashMap<String, String>,
        query_params: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            path,
            headers,
            path_params,
            query_params,
            body,
        }
    }

    /// Bare GET request for `path`, with its query string (if any) decoded.
    pub fn get(path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };
        Self::new(
            HttpMethod::Get,
            path.to_string(),
            HashMap::new(),
            HashMap::new(),
            parse_query(query),
            Vec::new(),
        )
    }

    /// Decoded value of a query parameter, or `""` when absent.
    pub fn query(&self, name: &str) -> &str {
        self.query_params.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Decodes an `application/x-www-form-urlencoded` query string.
///
/// `+` becomes a space and percent escapes are decoded. When a key repeats
/// the first value is kept; a key without `=` maps to `""`. Pairs containing
/// `;` or a malformed `%` escape are dropped.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let valid: Vec<&str> = raw
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.contains(';') && has_valid_escapes(pair))
        .collect();

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&valid.join("&")).unwrap_or_default();
    let mut params = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

fn has_valid_escapes(pair: &str) -> bool {
    let bytes = pair.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the body verbatim; headers are left untouched.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn json(mut self, data: impl serde::Serialize) -> Self {
        self.headers.insert("Content-Type".to_string(), "application/json".to_string());
        let mut json_body = serde_json::to_vec(&data).unwrap_or_default();
        json_body.extend_from_slice(b"\r\n");
        self.body = json_body;
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl From<Response> for hyper::Response<Full<Bytes>> {
    fn from(quecho_res: Response) -> Self {
        let mut res = hyper::Response::new(Full::new(Bytes::from(quecho_res.body)));
        *res.status_mut() = hyper::StatusCode::from_u16(quecho_res.status_code)
            .unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);

        for (key, value) in quecho_res.headers {
            match (HeaderName::try_from(key.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().insert(name, value);
                }
                _ => quecho_log::warn!("Dropping invalid response header {key:?}: {value:?}"),
            }
        }
        res
    }
}
