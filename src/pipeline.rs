use std::time::Duration;

use chrono::Local;
use rand::rngs::StdRng;
use tracing::{error, info, warn};

use crate::{
    assets,
    config::Config,
    error::QuotecardResult,
    publish::{PublishRequest, Publisher},
    quote::{self, QuoteSource},
    render::{CardArtifacts, CardRenderer},
    schedule::{ScheduleSet, Slot},
    video::{self, VideoConfig},
};

/// Owns everything one production run needs: configuration, the renderer,
/// the quote source, the publisher, and the single random source all draws
/// go through.
pub struct Pipeline {
    config: Config,
    renderer: CardRenderer,
    source: Box<dyn QuoteSource>,
    publisher: Box<dyn Publisher>,
    rng: StdRng,
}

impl Pipeline {
    pub fn new(
        config: Config,
        source: Box<dyn QuoteSource>,
        publisher: Box<dyn Publisher>,
        rng: StdRng,
    ) -> QuotecardResult<Self> {
        config.validate()?;
        assets::ensure_dirs(&config.dirs)?;
        let renderer = CardRenderer::new(&config);
        Ok(Self {
            config,
            renderer,
            source,
            publisher,
            rng,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One production cycle: quote, card + thumbnail, video, publish. Quote,
    /// render, and video failures fail the cycle; publish failures are
    /// logged and contained here.
    pub fn run_cycle(&mut self) -> QuotecardResult<CardArtifacts> {
        let quote = quote::fetch_valid_quote(self.source.as_mut(), self.config.quote_max_attempts)?;
        info!(quote = %quote, "quote generated");

        let artifacts = self.renderer.render(&quote, &mut self.rng)?;

        let video_cfg = VideoConfig {
            duration_secs: self.config.video_duration_secs,
            fps: self.config.video_fps,
            out_path: self.config.output_paths().video,
            overwrite: true,
        };
        let video_path = video::assemble_video(
            &artifacts.card,
            &self.config.dirs.music(),
            &video_cfg,
            &mut self.rng,
        )?;

        let request = PublishRequest {
            video: &video_path,
            caption: &self.config.caption,
            thumbnail: &artifacts.thumbnail,
        };
        if let Err(err) = self.publisher.publish(&request) {
            warn!(error = %err, "publish failed, cycle continues");
        }

        Ok(artifacts)
    }

    /// Polls wall-clock time against a daily slot set forever. Slot
    /// generation failures propagate: without a schedule no posts can
    /// happen, and that must surface loudly.
    pub fn run_loop(&mut self, clock: &dyn Clock) -> QuotecardResult<()> {
        let mut set = ScheduleSet::generate_daily(&self.config.windows, &mut self.rng)?;
        info!(slots = ?set.slots(), "daily slots generated");

        loop {
            let now = clock.now_slot();
            if let PollOutcome::Fired { slot, exhausted } = poll_step(&mut set, now) {
                info!(%slot, "slot fired");
                match self.run_cycle() {
                    Ok(artifacts) => info!(card = %artifacts.card.display(), "cycle complete"),
                    Err(err) => error!(error = %err, "cycle failed"),
                }

                if exhausted {
                    info!("all slots for the day consumed, cooling down before regeneration");
                    clock.sleep(Duration::from_secs(self.config.regen_cooldown_secs));
                    set = ScheduleSet::generate_daily(&self.config.windows, &mut self.rng)?;
                    info!(slots = ?set.slots(), "new daily slots generated");
                }
            }

            clock.sleep(Duration::from_secs(self.config.poll_interval_secs));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Idle,
    Fired { slot: Slot, exhausted: bool },
}

/// One poll tick. The due slot is consumed before production starts, which
/// is what keeps a second sample inside the same clock minute from
/// double-firing. A slot lost to a crash mid-production is accepted and will
/// not re-fire before the next regeneration.
pub fn poll_step(set: &mut ScheduleSet, now: Slot) -> PollOutcome {
    if !set.is_due(now) {
        return PollOutcome::Idle;
    }
    set.consume(now);
    PollOutcome::Fired {
        slot: now,
        exhausted: set.is_empty(),
    }
}

/// Wall-clock seam so the polling state machine is testable without real
/// time.
pub trait Clock {
    fn now_slot(&self) -> Slot;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_slot(&self) -> Slot {
        Slot::from_time(&Local::now())
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
