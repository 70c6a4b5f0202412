use crate::ClientCommand;

/// Work the session driver must perform, in order, after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Blocking stall before the next command is issued.
    Pace,
    /// Transmit a command to the server.
    Send(ClientCommand),
}
