//! Writing collected previews to disk.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use bytes::Bytes;
use tokio::fs;
use tracing::debug;

/// Pick a file extension by sniffing the payload's magic bytes.
pub fn sniff_extension(payload: &[u8]) -> &'static str {
    if payload.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if payload.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if payload.starts_with(b"GIF87a") || payload.starts_with(b"GIF89a") {
        "gif"
    } else if payload.len() >= 12 && &payload[0..4] == b"RIFF" && &payload[8..12] == b"WEBP" {
        "webp"
    } else if payload.starts_with(b"<svg") || payload.starts_with(b"<?xml") {
        "svg"
    } else {
        "img"
    }
}

/// Write each preview to `dir` as `<name>.<ext>`. Returns the number of
/// files written.
pub async fn write_previews(dir: &Path, previews: &HashMap<String, Bytes>) -> io::Result<usize> {
    fs::create_dir_all(dir).await?;

    let mut written = 0;
    for (name, payload) in previews {
        let path = dir.join(format!("{name}.{}", sniff_extension(payload)));
        fs::write(&path, payload).await?;
        debug!(path = %path.display(), bytes = payload.len(), "Wrote preview");
        written += 1;
    }

    Ok(written)
}
