//! MIME handling for uploaded equation images.

/// Extension for an accepted image MIME type; `None` for anything else.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// MIME type for a stored file, by extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Whether a MIME type is an accepted image type.
pub fn is_image(mime: &str) -> bool {
    extension_for_mime(mime).is_some()
}
