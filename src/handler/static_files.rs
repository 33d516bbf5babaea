//! Static file serving module
//!
//! Resolves request paths under the site root, detects MIME types, and
//! builds file responses.

use crate::config::AppState;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve a GET request for `path` from the site root
pub async fn serve_static(path: &str, state: &AppState) -> Response<Full<Bytes>> {
    let index_file = state.config.site.index_file.as_str();
    let root = state.site_root.as_path();

    let request_path = if path == "/" {
        format!("/{index_file}")
    } else {
        path.to_string()
    };

    let Some(file_path) = resolve_safe_path(root, &request_path) else {
        logger::log_warning(&format!("Rejected unsafe path: {path}"));
        return http::build_400_response();
    };

    // File not found is common (404), no need to log at warning level
    let Ok(metadata) = fs::metadata(&file_path).await else {
        return http::build_404_response();
    };
    let file_path = if metadata.is_dir() {
        file_path.join(index_file)
    } else {
        file_path
    };

    // Symlinks may point anywhere; the canonical target must stay under root
    let Ok(canonical) = fs::canonicalize(&file_path).await else {
        return http::build_404_response();
    };
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            canonical.display()
        ));
        return http::build_400_response();
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_debug(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return http::build_404_response();
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::build_file_response(content, content_type)
}

/// Map a URL path onto a path under `root` without touching the filesystem
///
/// Percent-escapes are decoded and NUL bytes stripped before joining. Returns
/// `None` when the path is malformed or a `..` segment would climb above
/// `root`. Leading slashes never make the result absolute.
pub fn resolve_safe_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    if has_malformed_escape(url_path) {
        return None;
    }
    let decoded = percent_decode_str(url_path).decode_utf8().ok()?;
    let sanitized = decoded.replace('\0', "");

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(&sanitized).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::CurDir => {}
            Component::Prefix(_) => return None,
        }
    }

    Some(resolved)
}

/// A `%` not followed by two hex digits
fn has_malformed_escape(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/site")
    }

    #[test]
    fn test_resolve_plain_paths() {
        assert_eq!(
            resolve_safe_path(&root(), "/index.html"),
            Some(PathBuf::from("/srv/site/index.html"))
        );
        assert_eq!(
            resolve_safe_path(&root(), "/assets/./img/../logo.svg"),
            Some(PathBuf::from("/srv/site/assets/logo.svg"))
        );
        assert_eq!(resolve_safe_path(&root(), "/"), Some(root()));
    }

    #[test]
    fn test_resolve_decodes_escapes_and_strips_nul() {
        assert_eq!(
            resolve_safe_path(&root(), "/our%20team.html"),
            Some(PathBuf::from("/srv/site/our team.html"))
        );
        assert_eq!(
            resolve_safe_path(&root(), "/index.html%00"),
            Some(PathBuf::from("/srv/site/index.html"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        for path in [
            "/../../etc/passwd",
            "/..",
            "/assets/../../etc/passwd",
            "/%2e%2e/%2e%2e/etc/passwd",
            "/..%2f..%2fetc%2fpasswd",
            "/.%00./etc/passwd",
        ] {
            assert_eq!(resolve_safe_path(&root(), path), None, "path {path}");
        }
    }

    #[test]
    fn test_absolute_injection_stays_under_root() {
        assert_eq!(
            resolve_safe_path(&root(), "//etc/passwd"),
            Some(PathBuf::from("/srv/site/etc/passwd"))
        );
        assert_eq!(
            resolve_safe_path(&root(), "/%2Fetc%2Fpasswd"),
            Some(PathBuf::from("/srv/site/etc/passwd"))
        );
    }

    #[test]
    fn test_resolve_rejects_malformed_input() {
        assert_eq!(resolve_safe_path(&root(), "/bad%zzescape"), None);
        assert_eq!(resolve_safe_path(&root(), "/trailing%4"), None);
        assert_eq!(resolve_safe_path(&root(), "/%ff%fe"), None);
    }
}
