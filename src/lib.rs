#![forbid(unsafe_code)]

pub mod assets;
pub mod composite;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod quote;
pub mod render;
pub mod schedule;
pub mod text;
pub mod video;

pub use config::{Config, Dirs, OutputPaths, WatermarkRow};
pub use error::{QuotecardError, QuotecardResult};
pub use pipeline::{Clock, Pipeline, PollOutcome, SystemClock, poll_step};
pub use publish::{PublishRequest, Publisher, ReelsPublisher};
pub use quote::{CompletionQuoteSource, MAX_QUOTE_LEN, QuoteSource, fetch_valid_quote};
pub use render::{CARD_HEIGHT, CARD_WIDTH, CardArtifacts, CardRenderer};
pub use schedule::{ScheduleSet, Slot, Window};
pub use text::FontBook;
