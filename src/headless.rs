//! Line-oriented watcher for terminals that cannot host the dashboard

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::ScoreSource;
use crate::config::TallyConfig;
use crate::poller::Poller;
use crate::tally::TallyState;
use crate::Result;

/// Print one line per tally event until interrupted
pub async fn run_headless(config: TallyConfig, source: Arc<dyn ScoreSource>) -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let poller = Poller::new(source, config.poll_interval()).spawn(tx);

    let result = tokio::select! {
        result = watch(&config, rx, std::io::stdout()) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    };

    poller.abort();
    result
}

/// Apply outcomes as they arrive and write every resulting event to `out`
pub async fn watch<W: Write>(
    config: &TallyConfig,
    mut updates: mpsc::Receiver<crate::poller::PollOutcome>,
    mut out: W,
) -> Result<()> {
    let mut state = TallyState::new(config);
    while let Some(outcome) = updates.recv().await {
        for event in state.apply(outcome.result, outcome.received) {
            let scores = state.scores();
            writeln!(out, "[{}-{}] {}", scores.team1, scores.team2, event)?;
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollOutcome;
    use crate::scores::Scores;
    use crate::Error;

    #[tokio::test]
    async fn test_watch_writes_events() {
        let (tx, rx) = mpsc::channel(8);
        let outcomes = [
            Ok(Scores::new(1, 0)),
            Ok(Scores::new(1, 0)),
            Err(Error::Status(500)),
            Ok(Scores::new(1, 2)),
        ];
        for (seq, result) in outcomes.into_iter().enumerate() {
            tx.send(PollOutcome::new(seq as u64, result)).await.unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        watch(&TallyConfig::default(), rx, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "[1-0] team1 0 -> 1 (+1) scale 1.30 chain 1");
        assert!(lines[1].starts_with("[1-0] disconnected"));
        assert_eq!(lines[2], "[1-2] connected");
        assert!(lines[3].starts_with("[1-2] team2 0 -> 2 (+2)"));
    }
}
