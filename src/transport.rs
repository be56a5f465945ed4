use std::io::{self, Read, Write};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::codec;
use crate::config::SessionConfig;
use crate::error::SessionError;

/// Opens the configured serial port. The returned handle owns the port
/// exclusively; dropping it releases the device on every exit path.
pub fn open(config: &SessionConfig) -> Result<Box<dyn SerialPort>, SessionError> {
    serialport::new(&config.port, config.baud_rate)
        .timeout(Duration::from_millis(config.read_timeout_ms))
        .open()
        .map_err(|source| SessionError::TransportOpen {
            port: config.port.clone(),
            source,
        })
}

/// Write phase: encodes every sample and writes all frames before returning.
/// The link is used strictly half-duplex, so no read may happen until this
/// has completed.
pub fn transmit<L: Write>(link: &mut L, samples: &[i16]) -> Result<(), SessionError> {
    let mut wire = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        wire.extend_from_slice(&codec::encode(sample));
    }
    debug!("transmitting {} bytes", wire.len());
    link.write_all(&wire)
        .and_then(|()| link.flush())
        .map_err(|source| SessionError::TransportIo {
            phase: "transmit",
            source,
        })
}

/// Read phase: reads exactly `response_len` 2-byte frames, each read blocking
/// until its full frame arrives (bounded by the port's read timeout).
pub fn receive<L: Read>(link: &mut L, response_len: usize) -> Result<Vec<i16>, SessionError> {
    let mut magnitudes = Vec::with_capacity(response_len);
    let mut frame = [0u8; 2];
    for _ in 0..response_len {
        link.read_exact(&mut frame)
            .map_err(|source| SessionError::TransportIo {
                phase: "receive",
                source,
            })?;
        magnitudes.push(codec::decode(frame[0], frame[1]));
    }
    debug!("received {} magnitudes", magnitudes.len());
    Ok(magnitudes)
}

/// In-memory link useful for tests and dry runs without hardware: records
/// everything written and replays a scripted response on read.
pub struct ScriptedLink {
    written: Vec<u8>,
    response: io::Cursor<Vec<u8>>,
    fail_reads: bool,
}

impl ScriptedLink {
    pub fn new(response: Vec<u8>) -> Self {
        Self {
            written: Vec::new(),
            response: io::Cursor::new(response),
            fail_reads: false,
        }
    }

    /// A link that accepts writes but fails every read, mimicking a device
    /// that goes silent after receiving its input.
    pub fn unresponsive() -> Self {
        Self {
            written: Vec::new(),
            response: io::Cursor::new(Vec::new()),
            fail_reads: true,
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "device silent"));
        }
        self.response.read(buf)
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
