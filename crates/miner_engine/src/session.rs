use std::time::Duration;

use miner_core::{update, ClientCommand, Effect, Phase, ServerEvent, SessionState, ShopId};
use miner_logging::{miner_debug, miner_error, miner_info};
use serde::{Deserialize, Serialize};

use crate::config::duration_ms;
use crate::PersistError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("send failed: {0}")]
    Send(String),
}

/// Connection delivering decoded events and accepting typed commands.
pub trait SessionTransport {
    /// Establish the connection. Adapters over an already open stream succeed
    /// without doing anything.
    fn connect(&mut self) -> Result<(), TransportError>;
    /// Next event, or `None` once the server closed the connection.
    fn recv(&mut self) -> Result<Option<ServerEvent>, TransportError>;
    fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("{0}")]
    Other(String),
}

/// Subscriber invoked with every event, in registration order, before the
/// sequencer reacts to it.
pub trait Listener {
    fn listen(&mut self, event: &ServerEvent, session: &SessionState) -> Result<(), SinkError>;
}

/// Blocking stall between consecutive shop requests.
pub trait Pacer {
    fn pause(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct SleepPacer {
    delay: Duration,
}

impl SleepPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Pacer for SleepPacer {
    fn pause(&self) {
        std::thread::sleep(self.delay);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    #[serde(with = "duration_ms")]
    pub pacing_delay: Duration,
    /// Return once every target was loaded instead of idling until the server
    /// closes the connection.
    pub stop_when_exhausted: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_secs(1),
            stop_when_exhausted: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionReport {
    pub events_seen: usize,
    pub commands_sent: usize,
    pub pauses: usize,
    pub sink_failures: usize,
    pub shops_requested: Vec<ShopId>,
    pub final_phase: Phase,
}

/// Drives one connection: events in, listeners, sequencer, commands out.
pub struct SessionRunner {
    state: SessionState,
    listeners: Vec<Box<dyn Listener>>,
    pacer: Box<dyn Pacer>,
    settings: SessionSettings,
}

impl SessionRunner {
    pub fn new(targets: impl IntoIterator<Item = ShopId>, settings: SessionSettings) -> Self {
        let pacer = Box::new(SleepPacer::new(settings.pacing_delay));
        Self {
            state: SessionState::new(targets),
            listeners: Vec::new(),
            pacer,
            settings,
        }
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn register(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs until the connection closes, a transport error occurs, or (when
    /// configured) every target has been loaded.
    pub fn run(
        &mut self,
        transport: &mut dyn SessionTransport,
    ) -> Result<SessionReport, TransportError> {
        transport.connect()?;
        miner_info!(
            "Session connected, {} shops queued",
            self.state.remaining().len()
        );

        let mut report = SessionReport::default();
        while let Some(event) = transport.recv()? {
            report.events_seen += 1;
            miner_debug!("event {}", event.label());

            for listener in &mut self.listeners {
                if let Err(err) = listener.listen(&event, &self.state) {
                    miner_error!("listener failed on {}: {}", event.label(), err);
                    report.sink_failures += 1;
                }
            }

            let (state, effects) = update(std::mem::take(&mut self.state), &event);
            self.state = state;

            for effect in effects {
                match effect {
                    Effect::Pace => {
                        miner_debug!("pacing {:?} before next shop", self.settings.pacing_delay);
                        self.pacer.pause();
                        report.pauses += 1;
                    }
                    Effect::Send(command) => {
                        miner_debug!("sending {:?}", command);
                        transport.send(&command)?;
                        report.commands_sent += 1;
                    }
                }
            }

            if self.state.is_exhausted() && self.settings.stop_when_exhausted {
                miner_info!("All {} shops loaded", self.state.requested().len());
                break;
            }
        }

        report.shops_requested = self.state.requested().to_vec();
        report.final_phase = self.state.phase();
        Ok(report)
    }
}
