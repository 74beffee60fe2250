use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub public: PublicConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

/// Bind address for the HTTP server
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    3045
}

/// Externally visible address, used to compose the URLs returned to
/// clients. May differ from the bind address behind NAT or a reverse
/// proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            port: default_port(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost".to_string()
}

/// Managed storage directory and track retention policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory the downloaded tracks are written to and served from
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Path of the persisted download history
    #[serde(default = "default_history_path")]
    pub history_file: PathBuf,
    /// How long a downloaded track is kept on disk
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// How often the expiry sweep runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            history_file: default_history_path(),
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("downloaded-tracks")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("history.json")
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    600
}

/// Download strategy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Extra attempts of the primary strategy after the first failure
    #[serde(default)]
    pub retries: u32,
    /// Whether to fall back to the external extractor after the primary
    /// strategy is exhausted
    #[serde(default = "default_true")]
    pub use_fallback: bool,
    /// Path of the yt-dlp binary used by the fallback strategy
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    /// Netscape-format cookie jar handed to yt-dlp (optional)
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            use_fallback: default_true(),
            ytdlp_path: default_ytdlp_path(),
            cookies_file: None,
            timeout_secs: default_download_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_download_timeout_secs() -> u64 {
    120
}

/// Egress proxy rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Ordered rotation list. The reserved entry "direct" means no
    /// proxy for that slot.
    #[serde(default = "default_proxy_endpoints")]
    pub endpoints: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoints: default_proxy_endpoints(),
        }
    }
}

fn default_proxy_endpoints() -> Vec<String> {
    vec!["direct".to_string()]
}

/// Moderation ban lists
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ModerationConfig {
    /// Terms matched whole-word, case-insensitively against titles
    #[serde(default)]
    pub banned_terms: Vec<String>,
    /// Account identifiers matched exactly
    #[serde(default)]
    pub banned_accounts: Vec<String>,
}

/// Webhook notification configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NotifyConfig {
    /// Webhook every successful download is announced to, in addition
    /// to any per-request target
    #[serde(default)]
    pub global_webhook: Option<String>,
}

/// Playlist relay configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PlaylistConfig {
    /// Upstream service playlist requests are forwarded to
    #[serde(default)]
    pub upstream_url: Option<String>,
}

/// Sanitized config for API responses (webhook target and proxy
/// addresses redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub public: PublicConfig,
    pub storage: StorageConfig,
    pub download: SanitizedDownloadConfig,
    pub proxy: SanitizedProxyConfig,
    pub moderation: ModerationStats,
    pub notify: SanitizedNotifyConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDownloadConfig {
    pub retries: u32,
    pub use_fallback: bool,
    pub ytdlp_path: String,
    pub cookies_configured: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProxyConfig {
    pub enabled: bool,
    pub endpoints_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModerationStats {
    pub banned_terms_count: usize,
    pub banned_accounts_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifyConfig {
    pub global_webhook_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            public: config.public.clone(),
            storage: config.storage.clone(),
            download: SanitizedDownloadConfig {
                retries: config.download.retries,
                use_fallback: config.download.use_fallback,
                ytdlp_path: config.download.ytdlp_path.clone(),
                cookies_configured: config.download.cookies_file.is_some(),
                timeout_secs: config.download.timeout_secs,
            },
            proxy: SanitizedProxyConfig {
                enabled: config.proxy.enabled,
                endpoints_count: config.proxy.endpoints.len(),
            },
            moderation: ModerationStats {
                banned_terms_count: config.moderation.banned_terms.len(),
                banned_accounts_count: config.moderation.banned_accounts.len(),
            },
            notify: SanitizedNotifyConfig {
                global_webhook_configured: config.notify.global_webhook.is_some(),
            },
        }
    }
}
