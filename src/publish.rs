use std::path::Path;

use tracing::{info, warn};

use crate::{config, error::QuotecardResult};

#[derive(Clone, Copy, Debug)]
pub struct PublishRequest<'a> {
    pub video: &'a Path,
    pub caption: &'a str,
    pub thumbnail: &'a Path,
}

/// Platform hand-off. Errors from implementations are cycle-local: the
/// driver logs them and keeps polling.
pub trait Publisher {
    fn publish(&self, request: &PublishRequest<'_>) -> QuotecardResult<()>;
}

/// Credential-gated publisher. Missing `IG_USER`/`IG_PASS` is a warning-level
/// no-op. The platform's clip upload has no supported Rust client, so the
/// credentialed path records the finished artifacts for an external uploader
/// instead of speaking the private API itself.
pub struct ReelsPublisher;

impl Publisher for ReelsPublisher {
    fn publish(&self, request: &PublishRequest<'_>) -> QuotecardResult<()> {
        let Some((user, _pass)) = config::platform_credentials() else {
            warn!("IG_USER or IG_PASS not set, skipping publish");
            return Ok(());
        };

        info!(
            user = %user,
            video = %request.video.display(),
            thumbnail = %request.thumbnail.display(),
            caption = request.caption,
            "clip ready for upload"
        );
        Ok(())
    }
}
