//! Mock file catalog
//!
//! Payloads are generated in memory per request. Some catalog entries are
//! listed on the downloads page only and have no payload.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use crate::request::iso_now;
use crate::server::SharedState;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.\n\nDuis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.";

const USERS_CSV: &str = "Name,Email,Age,City,Country,Department,Salary\n\
John Doe,john@example.com,30,New York,USA,Engineering,75000\n\
Jane Smith,jane@example.com,25,Los Angeles,USA,Marketing,65000\n\
Bob Johnson,bob@example.com,35,Chicago,USA,Sales,70000\n\
Alice Brown,alice@example.com,28,Miami,USA,Design,68000\n\
Charlie Wilson,charlie@example.com,32,Seattle,USA,Engineering,80000\n\
Diana Davis,diana@example.com,29,Boston,USA,HR,62000\n\
Eve Anderson,eve@example.com,31,Austin,USA,Engineering,77000\n\
Frank Miller,frank@example.com,27,Denver,USA,Marketing,63000";

/// 1x1 transparent PNG.
const PIXEL_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

const REPORT_PDF: &str = "%PDF-1.4\n1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj 2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj 3 0 obj<</Type/Page/MediaBox[0 0 612 792]/Parent 2 0 R/Contents 4 0 R>>endobj 4 0 obj<</Length 44>>stream\nBT\n/F1 12 Tf\n100 700 Td\n(Test PDF Document) Tj\nET\nendstream\nendobj\nxref\n0 5\n0000000000 65535 f \n0000000010 00000 n \n0000000053 00000 n \n0000000125 00000 n \n0000000185 00000 n \ntrailer<</Size 5/Root 1 0 R>>\nstartxref\n274\n%%EOF";

/// How a catalog entry's bytes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Lorem ipsum plus a generation stamp
    StampedText,
    /// Pretty-printed export document with a timestamp
    JsonExport,
    Static(&'static str),
    Base64(&'static str),
    /// Listed on the page, not served
    DisplayOnly,
}

/// Why a served payload could not be produced.
#[derive(Debug)]
pub enum RenderError {
    Decode(base64::DecodeError),
    Encode(serde_json::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Decode(e) => write!(f, "invalid embedded payload: {}", e),
            RenderError::Encode(e) => write!(f, "export encoding failed: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, Copy)]
pub struct MockFile {
    pub id: &'static str,
    pub name: &'static str,
    pub type_label: &'static str,
    pub content_type: &'static str,
    pub description: &'static str,
    /// Size advertised on the page; served payloads are much smaller.
    pub nominal_size: u64,
    pub payload: PayloadKind,
}

pub const CATALOG: &[MockFile] = &[
    MockFile {
        id: "sample-text",
        name: "sample-document.txt",
        type_label: "Text Document",
        content_type: "text/plain",
        description: "Sample text file with Lorem ipsum content",
        nominal_size: 2560,
        payload: PayloadKind::StampedText,
    },
    MockFile {
        id: "sample-json",
        name: "data-export.json",
        type_label: "JSON Data",
        content_type: "application/json",
        description: "JSON file containing structured test data",
        nominal_size: 5324,
        payload: PayloadKind::JsonExport,
    },
    MockFile {
        id: "sample-csv",
        name: "users-list.csv",
        type_label: "CSV Spreadsheet",
        content_type: "text/csv",
        description: "CSV file with sample user data",
        nominal_size: 8912,
        payload: PayloadKind::Static(USERS_CSV),
    },
    MockFile {
        id: "sample-image",
        name: "test-image.png",
        type_label: "PNG Image",
        content_type: "image/png",
        description: "Sample PNG image for testing",
        nominal_size: 128_000,
        payload: PayloadKind::Base64(PIXEL_PNG_B64),
    },
    MockFile {
        id: "sample-pdf",
        name: "report.pdf",
        type_label: "PDF Document",
        content_type: "application/pdf",
        description: "Sample PDF document with test content",
        nominal_size: 350_208,
        payload: PayloadKind::Static(REPORT_PDF),
    },
    MockFile {
        id: "sample-audio",
        name: "audio-sample.mp3",
        type_label: "MP3 Audio",
        content_type: "audio/mpeg",
        description: "Short audio clip for testing",
        nominal_size: 1_258_291,
        payload: PayloadKind::DisplayOnly,
    },
    MockFile {
        id: "sample-video",
        name: "video-clip.mp4",
        type_label: "MP4 Video",
        content_type: "video/mp4",
        description: "Sample video file for download testing",
        nominal_size: 6_082_560,
        payload: PayloadKind::DisplayOnly,
    },
    MockFile {
        id: "sample-archive",
        name: "archive-files.zip",
        type_label: "ZIP Archive",
        content_type: "application/zip",
        description: "ZIP archive containing multiple test files",
        nominal_size: 2_411_724,
        payload: PayloadKind::DisplayOnly,
    },
];

/// Catalog entry that can be downloaded.
pub fn find(id: &str) -> Option<&'static MockFile> {
    CATALOG
        .iter()
        .find(|f| f.id == id && f.is_served())
}

/// Human-readable size, e.g. `2.5 KB` or `1.2 MB`.
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        let kb = b / KB;
        if kb >= 100.0 {
            format!("{:.0} KB", kb)
        } else {
            format!("{:.1} KB", kb)
        }
    } else {
        format!("{} B", bytes)
    }
}

impl MockFile {
    pub fn is_served(&self) -> bool {
        self.payload != PayloadKind::DisplayOnly
    }

    /// Bytes for one download. `None` for display-only entries.
    pub fn render(&self) -> Option<Result<Vec<u8>, RenderError>> {
        let bytes = match self.payload {
            PayloadKind::StampedText => format!(
                "{}\n\nGenerated on: {}",
                LOREM,
                Utc::now().format("%-m/%-d/%Y, %-I:%M:%S %p")
            )
            .into_bytes(),
            PayloadKind::JsonExport => {
                let doc = json!({
                    "test": true,
                    "timestamp": iso_now(),
                    "data": {
                        "users": 100,
                        "files": 25,
                        "downloads": 500,
                        "categories": ["test", "automation", "playwright"],
                        "settings": {
                            "theme": "dark",
                            "language": "en",
                            "notifications": true,
                        },
                    },
                    "metadata": {
                        "version": "1.0.0",
                        "format": "json",
                        "encoding": "utf-8",
                        "generator": "MCPBench Test Environment",
                    },
                });
                match serde_json::to_vec_pretty(&doc) {
                    Ok(bytes) => bytes,
                    Err(e) => return Some(Err(RenderError::Encode(e))),
                }
            }
            PayloadKind::Static(text) => text.as_bytes().to_vec(),
            PayloadKind::Base64(encoded) => {
                return Some(STANDARD.decode(encoded).map_err(RenderError::Decode))
            }
            PayloadKind::DisplayOnly => return None,
        };
        Some(Ok(bytes))
    }
}

pub async fn download_handler(
    State(state): State<SharedState>,
    Path(file_id): Path<String>,
) -> Response {
    let Some(file) = find(&file_id) else {
        debug!("Unknown download {:?}", file_id);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found", "fileId": file_id })),
        )
            .into_response();
    };

    state.latency.pause(1000, 2000).await;

    let content = match file.render() {
        Some(Ok(bytes)) => bytes,
        Some(Err(e)) => {
            warn!("Failed to render {}: {}", file.id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error", "message": e.to_string() })),
            )
                .into_response();
        }
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "File not found", "fileId": file_id })),
            )
                .into_response()
        }
    };

    debug!("Serving {} ({} bytes)", file.name, content.len());
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.name),
            ),
            (header::CONTENT_LENGTH, content.len().to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        content,
    )
        .into_response()
}
