//! MIME type detection module
//!
//! Returns the Content-Type for a file name based on its extension. Common web
//! types come from a fixed table; anything else is left to `mime_guess`.

use std::path::Path;

/// Signature of an injectable content-type lookup
pub type ContentTypeFn = fn(&str) -> Option<String>;

/// Get the Content-Type for a file name, or `None` if the extension is unknown
///
/// # Examples
/// ```
/// use bundle_static::http::mime::content_type_for;
/// assert_eq!(content_type_for("/app.js").as_deref(), Some("application/javascript"));
/// assert_eq!(content_type_for("/styles/site.css").as_deref(), Some("text/css"));
/// assert_eq!(content_type_for("/README"), None);
/// ```
pub fn content_type_for(name: &str) -> Option<String> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();

    known_content_type(&extension)
        .map(ToString::to_string)
        .or_else(|| {
            mime_guess::from_ext(&extension)
                .first()
                .map(|mime| mime.to_string())
        })
}

fn known_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}
