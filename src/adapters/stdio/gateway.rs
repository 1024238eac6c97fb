use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use crate::domain::{Lifespan, OrderId, Price, Side, Volume};
use crate::ports::{GatewayError, OrderCommand, OrderGateway};

/// Writes every order command as one JSON line, flushed immediately
#[derive(Debug)]
pub struct JsonLinesGateway<W: Write> {
    writer: W,
    written: u64,
}

impl JsonLinesGateway<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonLinesGateway<BufWriter<File>> {
    /// Create (or truncate) a command log at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesGateway<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of commands written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_command(&mut self, command: &OrderCommand) -> Result<(), GatewayError> {
        let mut line = serde_json::to_vec(command)?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| match e.kind() {
                io::ErrorKind::BrokenPipe => GatewayError::Disconnected(e.to_string()),
                _ => GatewayError::Io(e),
            })?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> OrderGateway for JsonLinesGateway<W> {
    fn submit_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) -> Result<(), GatewayError> {
        self.write_command(&OrderCommand::InsertOrder {
            order_id,
            side,
            price,
            volume,
            lifespan,
        })
    }

    fn submit_hedge_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    ) -> Result<(), GatewayError> {
        self.write_command(&OrderCommand::HedgeOrder {
            order_id,
            side,
            price,
            volume,
        })
    }
}
