//! Fallback strategy: shell out to the external yt-dlp extractor.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::proxy::ProxyEndpoint;

use super::types::{fresh_file_name, AudioDownloader, DownloadError, DownloadedAudio};

/// Fallback download strategy driving the independently-maintained
/// yt-dlp tool. Slower than the native client but far more resilient
/// to platform changes.
pub struct YtDlpDownloader {
    bin: String,
    storage_dir: PathBuf,
    cookies_file: Option<PathBuf>,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(
        bin: impl Into<String>,
        storage_dir: impl Into<PathBuf>,
        cookies_file: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            bin: bin.into(),
            storage_dir: storage_dir.into(),
            cookies_file,
            timeout,
        }
    }

    fn build_args(&self, video_id: &str, output: &str, proxy: &ProxyEndpoint) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "-o".to_string(),
            output.to_string(),
        ];

        if let Some(url) = proxy.url() {
            args.push("--proxy".to_string());
            args.push(url.to_string());
        }

        if let Some(cookies) = &self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        args.push(format!(
            "https://www.youtube.com/watch?v={}",
            urlencoding::encode(video_id)
        ));
        args
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn download(
        &self,
        video_id: &str,
        proxy: &ProxyEndpoint,
    ) -> Result<DownloadedAudio, DownloadError> {
        // yt-dlp picks the container; the extension here is nominal and
        // only needs to be unique and stable for serving.
        let file_name = fresh_file_name(".webm");
        let path = self.storage_dir.join(&file_name);
        let args = self.build_args(video_id, &path.to_string_lossy(), proxy);

        debug!(video_id = video_id, bin = %self.bin, "Invoking yt-dlp");

        let child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let output = match timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DownloadError::Extractor(format!(
                    "yt-dlp not found at {}",
                    self.bin
                )));
            }
            Ok(Err(e)) => return Err(DownloadError::Extractor(e.to_string())),
            Err(_) => {
                cleanup_outputs(&path).await;
                return Err(DownloadError::Extractor(format!(
                    "yt-dlp timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            cleanup_outputs(&path).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        // A zero exit with no file means the tool wrote somewhere else;
        // treat it as an extractor fault rather than serving nothing.
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(DownloadError::Extractor(
                "yt-dlp exited successfully but produced no output file".to_string(),
            ));
        }

        Ok(DownloadedAudio { file_name, path })
    }
}

/// yt-dlp leaves `.part` files behind on interrupted transfers.
async fn cleanup_outputs(path: &std::path::Path) {
    super::remove_partial(path).await;
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    super::remove_partial(std::path::Path::new(&part)).await;
}

fn classify_failure(stderr: &str) -> DownloadError {
    let summary = stderr
        .lines()
        .find(|l| l.contains("ERROR"))
        .unwrap_or_else(|| stderr.lines().next().unwrap_or("unknown error"))
        .trim()
        .to_string();

    let age_gate = Regex::new(r"(?i)age[ -]restrict|confirm your age").expect("valid regex");
    if age_gate.is_match(stderr) {
        DownloadError::AgeRestricted(summary)
    } else {
        DownloadError::Extractor(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader(cookies: Option<PathBuf>) -> YtDlpDownloader {
        YtDlpDownloader::new("yt-dlp", "/tmp/tracks", cookies, Duration::from_secs(60))
    }

    #[test]
    fn test_build_args_direct() {
        let args = downloader(None).build_args("abc123", "/tmp/tracks/x.webm", &ProxyEndpoint::Direct);
        assert_eq!(args[0..2], ["-f".to_string(), "bestaudio".to_string()]);
        assert!(!args.contains(&"--proxy".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(
            args.last().unwrap(),
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn test_build_args_with_proxy_and_cookies() {
        let args = downloader(Some(PathBuf::from("/etc/jukebox/cookies.txt"))).build_args(
            "abc123",
            "/tmp/tracks/x.webm",
            &ProxyEndpoint::Url("http://proxy1:4444".to_string()),
        );
        let proxy_at = args.iter().position(|a| a == "--proxy").unwrap();
        assert_eq!(args[proxy_at + 1], "http://proxy1:4444");
        let cookies_at = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookies_at + 1], "/etc/jukebox/cookies.txt");
    }

    #[test]
    fn test_classify_failure_age_gate() {
        let err = classify_failure(
            "ERROR: [youtube] abc123: Sign in to confirm your age. This video may be inappropriate for some users.",
        );
        assert!(matches!(err, DownloadError::AgeRestricted(_)));
    }

    #[test]
    fn test_classify_failure_generic() {
        let err = classify_failure("ERROR: [youtube] abc123: Video unavailable");
        match err {
            DownloadError::Extractor(msg) => assert!(msg.contains("Video unavailable")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_with_stub_extractor() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-yt-dlp");
        // Scans for -o and touches the requested output path.
        std::fs::write(
            &bin,
            "#!/bin/sh\nwhile [ \"$1\" != \"-o\" ]; do shift; done\nshift\n: > \"$1\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let storage = dir.path().join("tracks");
        std::fs::create_dir(&storage).unwrap();

        let downloader = YtDlpDownloader::new(
            bin.to_string_lossy().to_string(),
            &storage,
            None,
            Duration::from_secs(10),
        );
        let audio = downloader
            .download("abc123", &ProxyEndpoint::Direct)
            .await
            .unwrap();
        assert!(audio.path.exists());
        assert!(audio.file_name.ends_with(".webm"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_surfaces_extractor_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-yt-dlp");
        std::fs::write(
            &bin,
            "#!/bin/sh\necho 'ERROR: Video unavailable' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let downloader = YtDlpDownloader::new(
            bin.to_string_lossy().to_string(),
            dir.path(),
            None,
            Duration::from_secs(10),
        );
        let err = downloader
            .download("abc123", &ProxyEndpoint::Direct)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Extractor(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_reports_extractor_error() {
        let downloader = YtDlpDownloader::new(
            "/nonexistent/yt-dlp-binary",
            "/tmp",
            None,
            Duration::from_secs(10),
        );
        let err = downloader
            .download("abc123", &ProxyEndpoint::Direct)
            .await
            .unwrap_err();
        match err {
            DownloadError::Extractor(msg) => assert!(msg.contains("not found")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
