//! Vote Tally
//!
//! A live two-team vote tally for the terminal. The scores endpoint is
//! polled once per second; every time a side's count goes up the
//! dashboard plays a burst of effects whose intensity grows when
//! increases arrive in quick succession.
//!
//! # Key Pieces
//!
//! - **Poller** - fixed-interval fetches, failures only flip the badge
//! - **Combo** - time-windowed intensity per team
//! - **Effects** - bounded, timed bursts evaluated per frame
//! - **Dashboard** - ratatui view over the tally state
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vote_tally::{HttpScoreSource, TallyConfig};
//!
//! # async fn demo() -> vote_tally::Result<()> {
//! let config = TallyConfig::builder()
//!     .api_base_url("https://votes.example.com/api")
//!     .poll_interval_ms(1000)
//!     .build_validated()?;
//!
//! let source = Arc::new(HttpScoreSource::new(&config)?);
//! vote_tally::tui::run_dashboard(config, source).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod combo;
pub mod config;
pub mod effects;
pub mod error;
pub mod headless;
pub mod poller;
pub mod scores;
pub mod tally;
pub mod tui;

pub use client::{HttpScoreSource, ScoreSource};
pub use config::TallyConfig;
pub use error::{Error, Result};
pub use poller::{PollOutcome, Poller};
pub use scores::{Scores, Team};
pub use tally::{TallyEvent, TallyState, TallyView};
