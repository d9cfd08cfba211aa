//! Terminal dashboard
//!
//! Model (`TallyState` inside [`App`]) + update (poll outcomes and key
//! presses) + view ([`render::render`]). Rendering is immediate mode: every
//! frame is drawn from a fresh [`TallyView`](crate::tally::TallyView).

pub mod app;
pub mod render;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::ScoreSource;
use crate::config::TallyConfig;
use crate::poller::Poller;
use crate::{Error, Result};

pub use app::App;

/// Run the full-screen dashboard until the user quits
pub async fn run_dashboard(config: TallyConfig, source: Arc<dyn ScoreSource>) -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let poller = Poller::new(source, config.poll_interval()).spawn(tx);
    let app = App::new(&config);

    // Crossterm event polling blocks, so the frame loop gets its own thread.
    let result = tokio::task::spawn_blocking(move || {
        with_terminal(ratatui::try_init, ratatui::restore, |terminal| {
            app.run(terminal, rx)
        })
    })
    .await
    .map_err(|e| Error::Other(format!("dashboard thread failed: {e}")))?;

    poller.abort();
    result
}

/// Run `body` on a freshly initialised terminal. `restore` runs on every
/// exit path, including a failed init that already switched to raw mode.
fn with_terminal<T, R>(
    init: impl FnOnce() -> std::io::Result<T>,
    restore: impl FnOnce(),
    body: impl FnOnce(&mut T) -> Result<R>,
) -> Result<R> {
    let mut terminal = match init() {
        Ok(terminal) => terminal,
        Err(e) => {
            restore();
            tracing::error!(error = %e, "Terminal setup failed");
            return Err(e.into());
        }
    };
    let result = body(&mut terminal);
    restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    #[test]
    fn test_restores_after_failed_init() {
        let restored = Cell::new(false);
        let result: Result<()> = with_terminal(
            || Err::<(), _>(io::Error::new(io::ErrorKind::Other, "alternate screen")),
            || restored.set(true),
            |_| panic!("body must not run"),
        );
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(restored.get());
    }

    #[test]
    fn test_restores_after_body_error() {
        let restored = Cell::new(false);
        let result: Result<()> = with_terminal(
            || Ok(0u8),
            || restored.set(true),
            |_| Err(Error::Other("draw failed".into())),
        );
        assert!(matches!(result, Err(Error::Other(_))));
        assert!(restored.get());
    }
}
