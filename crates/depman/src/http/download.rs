//! Single-shot transfer of a URL into a local file

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The remote (or local) source does not exist
    #[error("not found: {url}")]
    NotFound { url: Url },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: Url, status: StatusCode },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported URL scheme '{scheme}': {url}")]
    UnsupportedScheme { scheme: String, url: Url },

    #[error("I/O error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    fn io(operation: impl Into<String>, source: io::Error) -> Self {
        DownloadError::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Fetches `url` into `dest`, returning the number of bytes written.
///
/// `http`/`https` URLs are fetched with one GET; `file` URLs are copied from
/// the local path. Content is staged in a temporary file in `dest`'s
/// directory and only renamed to `dest` once complete, so a failed transfer
/// never leaves a partial file at `dest`.
///
/// # Errors
///
/// - [`DownloadError::NotFound`] for HTTP 404 or a missing local file
/// - [`DownloadError::HttpStatus`] for any other non-success status
/// - [`DownloadError::UnsupportedScheme`] for schemes other than http, https, file
/// - [`DownloadError::Io`] when staging or persisting fails
pub fn fetch_to_file(client: &Client, url: &Url, dest: &Path) -> Result<u64, DownloadError> {
    match url.scheme() {
        "http" | "https" => {
            let response = client
                .get(url.as_str())
                .send()
                .map_err(|e| DownloadError::Http {
                    url: url.clone(),
                    source: e.without_url(),
                })?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(DownloadError::NotFound { url: url.clone() });
            }
            if !status.is_success() {
                return Err(DownloadError::HttpStatus {
                    url: url.clone(),
                    status,
                });
            }

            write_atomically(response, dest)
        }
        "file" => {
            let source_path = url
                .to_file_path()
                .map_err(|()| DownloadError::UnsupportedScheme {
                    scheme: "file".to_string(),
                    url: url.clone(),
                })?;

            let source = match fs::File::open(&source_path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(DownloadError::NotFound { url: url.clone() });
                }
                Err(e) => {
                    return Err(DownloadError::io(
                        format!("open {}", source_path.display()),
                        e,
                    ));
                }
            };

            write_atomically(source, dest)
        }
        other => Err(DownloadError::UnsupportedScheme {
            scheme: other.to_string(),
            url: url.clone(),
        }),
    }
}

fn write_atomically(mut reader: impl Read, dest: &Path) -> Result<u64, DownloadError> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(parent)
        .map_err(|e| DownloadError::io(format!("create directory {}", parent.display()), e))?;

    // Same directory as dest so the final rename never crosses filesystems.
    let mut temp_file = NamedTempFile::new_in(parent)
        .map_err(|e| DownloadError::io("create temporary file for download", e))?;

    let written = io::copy(&mut reader, &mut temp_file)
        .map_err(|e| DownloadError::io("transfer content", e))?;

    temp_file
        .flush()
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| DownloadError::io("sync temporary file", e))?;

    temp_file
        .persist(dest)
        .map_err(|e| DownloadError::io(format!("persist {}", dest.display()), e.error))?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    fn client() -> Client {
        crate::http::build_client(std::time::Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_fetch_http_writes_full_body() {
        let mut server = Server::new();
        let body = vec![b'x'; 10_000];
        let mock = server
            .mock("GET", "/lib/tool.jar")
            .with_status(200)
            .with_body(&body)
            .create();

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("files/tool.jar");
        let url = Url::parse(&format!("{}/lib/tool.jar", server.url())).unwrap();

        let written = fetch_to_file(&client(), &url, &dest).unwrap();

        mock.assert();
        assert_eq!(written, 10_000);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn test_fetch_http_404_is_not_found() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/missing.jar").with_status(404).create();

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.jar");
        let url = Url::parse(&format!("{}/missing.jar", server.url())).unwrap();

        let err = fetch_to_file(&client(), &url, &dest).unwrap_err();

        assert!(matches!(err, DownloadError::NotFound { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_fetch_http_error_status_leaves_no_file() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/broken.jar")
            .with_status(500)
            .with_body("oops")
            .create();

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("broken.jar");
        let url = Url::parse(&format!("{}/broken.jar", server.url())).unwrap();

        let err = fetch_to_file(&client(), &url, &dest).unwrap_err();

        assert!(matches!(err, DownloadError::HttpStatus { status, .. } if status.as_u16() == 500));
        assert!(!dest.exists());
        // no staged leftovers either
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fetch_file_url_copies() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.jar");
        fs::write(&source, b"local content").unwrap();
        let dest = temp.path().join("out/source.jar");
        let url = Url::from_file_path(&source).unwrap();

        fetch_to_file(&client(), &url, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"local content");
    }

    #[test]
    fn test_fetch_missing_file_url() {
        let temp = TempDir::new().unwrap();
        let url = Url::from_file_path(temp.path().join("nope.jar")).unwrap();

        let err = fetch_to_file(&client(), &url, &temp.path().join("nope.jar")).unwrap_err();

        assert!(matches!(err, DownloadError::NotFound { .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let temp = TempDir::new().unwrap();
        let url = Url::parse("ftp://example.com/tool.jar").unwrap();

        let err = fetch_to_file(&client(), &url, &temp.path().join("tool.jar")).unwrap_err();

        assert!(matches!(err, DownloadError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    }
}
