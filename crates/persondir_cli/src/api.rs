//! Line-oriented JSON API over the directory service.
//!
//! # Responsibility
//! - Decode one request per line and dispatch it to the directory service.
//! - Map results and domain errors onto HTTP-like status envelopes.
//!
//! # Invariants
//! - Handling a line never panics; malformed input, including bytes that
//!   are not UTF-8, becomes a `400` and serving continues.
//! - Field-level validation runs on `register` only; `update` bodies are
//!   merged as given.

use chrono::NaiveDate;
use persondir_core::{
    Clock, DirectoryError, DirectoryService, ErrorKind, PersonPatch, PersonRecord, PersonStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_ACCEPTED: u16 = 202;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// One decoded request line, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Ping,
    Register { user: PersonRecord },
    FindAll,
    Update { email: String, user: PersonPatch },
    Delete { email: String },
    Search { from: NaiveDate, to: NaiveDate },
}

/// Response envelope written back per request line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    fn success(status: u16, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status,
                body: Some(body),
                message: None,
            },
            Err(err) => Self::failure(STATUS_INTERNAL_ERROR, format!("encode failed: {err}")),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: None,
            message: None,
        }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<DirectoryError> for Response {
    fn from(err: DirectoryError) -> Self {
        Self::failure(status_for(err.kind()), err.to_string())
    }
}

/// Transport status for a directory error kind.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::AgeNotAllowed | ErrorKind::InvalidRange => STATUS_BAD_REQUEST,
        ErrorKind::NotFound => STATUS_NOT_FOUND,
        ErrorKind::DuplicateEmail => STATUS_CONFLICT,
    }
}

/// Decodes and handles one raw request line.
pub fn handle_line<S: PersonStore, C: Clock>(
    service: &DirectoryService<S, C>,
    line: &str,
) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(service, request),
        Err(err) => {
            log::warn!("event=request_decode module=cli status=error line_len={}", line.len());
            Response::failure(STATUS_BAD_REQUEST, format!("malformed request: {err}"))
        }
    }
}

/// Dispatches one decoded request.
pub fn handle<S: PersonStore, C: Clock>(
    service: &DirectoryService<S, C>,
    request: Request,
) -> Response {
    match request {
        Request::Ping => Response::success(STATUS_OK, persondir_core::ping()),
        Request::Register { user } => {
            if let Err(err) = user.validate(service.today()) {
                return Response::failure(STATUS_BAD_REQUEST, err.to_string());
            }
            match service.register(user) {
                Ok(saved) => Response::success(STATUS_CREATED, saved),
                Err(err) => err.into(),
            }
        }
        Request::FindAll => Response::success(STATUS_OK, service.find_all()),
        Request::Update { email, user } => match service.update(&email, &user) {
            Ok(updated) => Response::success(STATUS_OK, updated),
            Err(err) => err.into(),
        },
        Request::Delete { email } => match service.delete_user(&email) {
            Ok(()) => Response::empty(STATUS_ACCEPTED),
            Err(err) => err.into(),
        },
        Request::Search { from, to } => match service.get_users_by_birth_date_range(from, to) {
            Ok(hits) => Response::success(STATUS_OK, hits),
            Err(err) => err.into(),
        },
    }
}

/// Serves request lines from `reader`, writing one JSON response line per
/// request to `writer`. Blank lines and `#` comments are skipped.
///
/// Returns the number of responses written. Only I/O failures end the
/// session early.
pub fn serve<S, C, R, W>(
    service: &DirectoryService<S, C>,
    mut reader: R,
    mut writer: W,
) -> io::Result<usize>
where
    S: PersonStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    let mut served = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                handle_line(service, trimmed)
            }
            Err(err) => {
                log::warn!(
                    "event=request_decode module=cli status=error reason=invalid_utf8 line_len={}",
                    buf.len()
                );
                Response::failure(STATUS_BAD_REQUEST, format!("malformed request: {err}"))
            }
        };

        serde_json::to_writer(&mut writer, &response)?;
        writeln!(writer)?;
        served += 1;
    }
    writer.flush()?;

    Ok(served)
}
