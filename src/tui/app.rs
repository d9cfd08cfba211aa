//! Dashboard model and update loop

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::config::TallyConfig;
use crate::poller::PollOutcome;
use crate::scores::Team;
use crate::tally::TallyState;
use crate::{Error, Result};

use super::render;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Bump(Team),
}

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('1') => Some(Action::Bump(Team::One)),
        KeyCode::Char('2') => Some(Action::Bump(Team::Two)),
        _ => None,
    }
}

pub struct App {
    state: TallyState,
    frame_interval: Duration,
    running: bool,
    poller_alive: bool,
}

impl App {
    pub fn new(config: &TallyConfig) -> Self {
        Self {
            state: TallyState::new(config),
            frame_interval: config.frame_interval(),
            running: true,
            poller_alive: true,
        }
    }

    pub fn state(&self) -> &TallyState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Apply every queued poll outcome, returns how many were applied
    pub fn drain(&mut self, updates: &mut mpsc::Receiver<PollOutcome>, now: Instant) -> usize {
        let mut applied = 0;
        loop {
            match updates.try_recv() {
                Ok(outcome) => {
                    self.state.apply(outcome.result, outcome.received);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.poller_alive {
                        self.poller_alive = false;
                        tracing::error!("Poller stopped unexpectedly");
                        self.state
                            .apply(Err(Error::Other("poller stopped".into())), now);
                    }
                    break;
                }
            }
        }
        applied
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        let Event::Key(key) = event else {
            return;
        };
        match action_for(key) {
            Some(Action::Quit) => {
                tracing::info!("Quit requested");
                self.running = false;
            }
            Some(Action::Bump(team)) => {
                tracing::debug!(team = %team, "Local test vote");
                self.state.bump(team, now);
            }
            None => {}
        }
    }

    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>, now: Instant) -> Result<()> {
        self.state.tick(now);
        let view = self.state.view(now);
        terminal.draw(|frame| render::render(frame, &view))?;
        Ok(())
    }

    /// Blocking frame loop, returns once the user quits
    pub fn run<B: Backend>(
        mut self,
        terminal: &mut Terminal<B>,
        mut updates: mpsc::Receiver<PollOutcome>,
    ) -> Result<()> {
        while self.running {
            self.drain(&mut updates, Instant::now());
            self.draw(terminal, Instant::now())?;

            if event::poll(self.frame_interval)? {
                let event = event::read()?;
                self.handle_event(&event, Instant::now());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::Scores;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_key_bindings() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(action_for(&press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for(&press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(action_for(&press(KeyCode::Char('c'))), None);
        assert_eq!(action_for(&press(KeyCode::Char('2'))), Some(Action::Bump(Team::Two)));

        let mut release = press(KeyCode::Char('1'));
        release.kind = KeyEventKind::Release;
        assert_eq!(action_for(&release), None);
    }

    #[test]
    fn test_bump_and_quit() {
        let now = Instant::now();
        let mut app = App::new(&TallyConfig::default());

        app.handle_event(&key(KeyCode::Char('1')), now);
        app.handle_event(&key(KeyCode::Char('1')), now);
        assert_eq!(app.state().scores(), Scores::new(2, 0));
        assert!(app.is_running());

        app.handle_event(&key(KeyCode::Char('q')), now);
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_drain_applies_outcomes() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut app = App::new(&TallyConfig::default());

        tx.send(PollOutcome::new(0, Ok(Scores::new(1, 0)))).await.unwrap();
        tx.send(PollOutcome::new(1, Ok(Scores::new(2, 3)))).await.unwrap();
        assert_eq!(app.drain(&mut rx, Instant::now()), 2);
        assert_eq!(app.state().scores(), Scores::new(2, 3));
        assert_eq!(app.state().previous(), Scores::new(1, 0));
        assert!(app.state().is_connected());

        drop(tx);
        assert_eq!(app.drain(&mut rx, Instant::now()), 0);
        assert!(!app.state().is_connected());
    }

    #[tokio::test]
    async fn test_drain_uses_arrival_time() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut app = App::new(&TallyConfig::default());
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        // Two polls a second apart, drained together after a stalled frame
        tx.send(PollOutcome::received_at(0, Ok(Scores::new(1, 0)), t0)).await.unwrap();
        tx.send(PollOutcome::received_at(1, Ok(Scores::new(2, 0)), t1)).await.unwrap();
        assert_eq!(app.drain(&mut rx, t1 + Duration::from_millis(200)), 2);

        let view = app.state().view(t1);
        assert_eq!(view.team(Team::One).chain, 1);
        assert!((view.team(Team::One).scale - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_draw_to_test_backend() {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        let mut app = App::new(&TallyConfig::default());
        app.handle_event(&key(KeyCode::Char('2')), Instant::now());
        app.draw(&mut terminal, Instant::now()).unwrap();

        let buf = terminal.backend().buffer();
        let text: String = (0..buf.area.height)
            .flat_map(|y| (0..buf.area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Total Votes: 1"));
    }
}
