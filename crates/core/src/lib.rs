pub mod config;
pub mod downloader;
pub mod history;
pub mod metrics;
pub mod moderation;
pub mod notify;
pub mod orchestrator;
pub mod proxy;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DownloadConfig,
    ModerationConfig, NotifyConfig, PlaylistConfig, ProxyConfig, PublicConfig, SanitizedConfig,
    ServerConfig, StorageConfig,
};
pub use downloader::{
    AudioDownloader, DownloadError, DownloadedAudio, InnertubeDownloader, ThumbnailProbe,
    YoutubeThumbnailProbe, YtDlpDownloader,
};
pub use history::{HistoryEntry, HistoryLedger, HistorySweeper, SweepStats};
pub use moderation::{ModerationFilter, RejectReason};
pub use notify::{Notifier, TrackAnnouncement, WebhookNotifier};
pub use orchestrator::{
    AcquireError, AcquireFailure, AcquiredTrack, DownloadOrchestrator, OrchestratorConfig,
    TrackRequest,
};
pub use proxy::{ProxyEndpoint, ProxyPool, ProxyPoolError};
pub use search::{SearchHit, Searcher, YoutubeSearcher};
