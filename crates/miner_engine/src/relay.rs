use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use miner_core::{ClientCommand, ServerEvent};
use miner_logging::{miner_info, miner_warn};

use crate::{SessionTransport, TransportError};

/// Transport over a decoded-event relay: one JSON event per inbound line,
/// one JSON command per outbound line.
///
/// Lines that do not decode, including lines that are not UTF-8, are surfaced
/// as `Unrecognized` events so that the sequencer simply does not advance on
/// them.
pub struct JsonLinesTransport<R, W> {
    reader: R,
    writer: W,
    line: Vec<u8>,
}

impl<R: BufRead, W: Write> JsonLinesTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

fn malformed() -> ServerEvent {
    ServerEvent::Unrecognized {
        kind: "malformed".to_string(),
    }
}

impl<R: BufRead, W: Write> SessionTransport for JsonLinesTransport<R, W> {
    fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<ServerEvent>, TransportError> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.line)
                .map_err(|err| TransportError::Receive(err.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text,
                Err(err) => {
                    miner_warn!("event line is not UTF-8 ({}), {} bytes", err, read);
                    return Ok(Some(malformed()));
                }
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            return match serde_json::from_str(trimmed) {
                Ok(event) => Ok(Some(event)),
                Err(err) => {
                    miner_warn!("undecodable event line ({}): {}", err, trimmed);
                    Ok(Some(malformed()))
                }
            };
        }
    }

    fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError> {
        let encoded =
            serde_json::to_string(command).map_err(|err| TransportError::Send(err.to_string()))?;
        writeln!(self.writer, "{encoded}")
            .and_then(|_| self.writer.flush())
            .map_err(|err| TransportError::Send(err.to_string()))
    }
}

type TcpLines = JsonLinesTransport<BufReader<TcpStream>, TcpStream>;

/// JSON-lines relay reached over TCP. Nothing is dialed until `connect`.
pub struct TcpRelayTransport {
    addr: String,
    inner: Option<TcpLines>,
}

impl TcpRelayTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            inner: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }

    fn connected(&mut self) -> Result<&mut TcpLines, TransportError> {
        match self.inner.as_mut() {
            Some(inner) => Ok(inner),
            None => Err(TransportError::Connect(format!(
                "{}: not connected",
                self.addr
            ))),
        }
    }
}

impl SessionTransport for TcpRelayTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let stream = TcpStream::connect(&self.addr)
            .map_err(|err| TransportError::Connect(format!("{}: {err}", self.addr)))?;
        let reader = stream
            .try_clone()
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        miner_info!("Connected to relay {}", self.addr);
        self.inner = Some(JsonLinesTransport::new(BufReader::new(reader), stream));
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<ServerEvent>, TransportError> {
        self.connected()?.recv()
    }

    fn send(&mut self, command: &ClientCommand) -> Result<(), TransportError> {
        self.connected()?.send(command)
    }
}
