//! Filesystem layout helpers.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extension of every stored entry.
pub const ENTRY_EXTENSION: &str = "json";

/// Encode a store key as a portable file stem.
///
/// ASCII alphanumerics, `-`, `_` and `.` pass through; every other byte is
/// written as `%XX`. `pack:GA:1:2026.02.20` -> `pack%3AGA%3A1%3A2026.02.20`.
pub fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Reverse of [`encode_key`]. Returns `None` for stems this store did not write.
pub fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Path of the file holding `key`.
pub fn entry_path(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{}.{}", encode_key(key), ENTRY_EXTENSION))
}

/// Create the directories above `path`.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// Replace `path` with `contents` via a sibling temp file and a rename.
///
/// Temp names are unique per write, so concurrent writers of the same key
/// never interleave bytes; the last rename wins.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

    ensure_parent_dirs(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid entry path {}", path.display()))?;
    let tmp_path = path.with_file_name(format!(
        ".{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = std::fs::write(&tmp_path, contents) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(anyhow!("Failed to write {}: {}", tmp_path.display(), e));
    }
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        anyhow!("Failed to replace {}: {}", path.display(), e)
    })
}

/// [`atomic_write`] of compact JSON.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec(value)
        .map_err(|e| anyhow!("Failed to encode {}: {}", path.display(), e))?;
    atomic_write(path, &body)
}
