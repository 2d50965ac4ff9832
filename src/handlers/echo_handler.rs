use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quecho_core::{handler, FromRequest, Handler, Query, QuechoError, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Raw `q1`..`q4` query parameters. Absent keys deserialize to `""`.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EchoParams {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: String,
}

/// The document echoed back to the caller. Field order is the wire order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub query_param1: String,
    pub query_param2: String,
    pub query_param3: String,
    pub query_param4: String,
}

impl From<EchoParams> for QueryRecord {
    fn from(params: EchoParams) -> Self {
        Self {
            query_param1: params.q1,
            query_param2: params.q2,
            query_param3: params.q3,
            query_param4: params.q4,
        }
    }
}

/// Compact JSON that additionally escapes `<`, `>`, `&`, U+2028 and U+2029
/// as `\uXXXX`, matching the bytes clients already receive.
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

pub fn to_json(record: &QueryRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::with_capacity(96);
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, HtmlSafeFormatter);
    record.serialize(&mut serializer)?;
    Ok(body)
}

/// Echoes the query parameters as JSON after round-tripping the document
/// through a uniquely named file in the scratch directory.
pub struct EchoHandler {
    scratch_dir: PathBuf,
    content_type: String,
}

impl EchoHandler {
    pub fn new(scratch_dir: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            content_type: content_type.into(),
        }
    }

    pub fn from_config(config: &quecho_config::Echo) -> Self {
        Self::new(&config.scratch_dir, &config.content_type)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub async fn handle(&self, req: Request) -> Result<Response, QuechoError> {
        let Query(params) = Query::<EchoParams>::from_request(&req)?;
        let record = QueryRecord::from(params);
        let body = to_json(&record)?;

        let path = self.scratch_dir.join(Uuid::new_v4().to_string());
        quecho_log::debug!("Writing {} bytes to scratch file {}", body.len(), path.display());

        {
            let mut file = fs::File::create(&path)
                .await
                .map_err(|e| scratch_error("create", &path, e))?;
            file.write_all(&body)
                .await
                .map_err(|e| scratch_error("write", &path, e))?;
            file.flush()
                .await
                .map_err(|e| scratch_error("write", &path, e))?;
        }

        let contents = fs::read(&path)
            .await
            .map_err(|e| scratch_error("read", &path, e))?;
        fs::remove_file(&path)
            .await
            .map_err(|e| scratch_error("delete", &path, e))?;

        Ok(Response::new(200)
            .with_header("Content-Type", &self.content_type)
            .with_body(contents))
    }

    /// Wraps a shared handler so it can be registered on several routes.
    pub fn into_handler(self: Arc<Self>) -> Handler {
        handler(move |req| {
            let echo = Arc::clone(&self);
            async move { echo.handle(req).await }
        })
    }
}

fn scratch_error(op: &str, path: &Path, err: std::io::Error) -> QuechoError {
    QuechoError::with_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {op} scratch file {}", path.display()),
        err.to_string(),
    )
}
