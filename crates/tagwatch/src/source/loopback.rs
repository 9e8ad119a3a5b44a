//! Loopback data source for development and tests.

use rustc_hash::FxHashMap;

use crate::error::ClientError;
use crate::source::{DataSource, NodeAddress};

/// Echoes the last written value per node; reads 0.0 before any write.
#[derive(Debug, Default)]
pub struct LoopbackSource {
    connected: bool,
    last_written: FxHashMap<NodeAddress, f64>,
}

impl LoopbackSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSource for LoopbackSource {
    fn connect(&mut self, _endpoint: &str) -> Result<(), ClientError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read_value(&mut self, node_id: &str) -> Result<f64, ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        let address = NodeAddress::parse(node_id)?;
        Ok(self.last_written.get(&address).copied().unwrap_or(0.0))
    }

    fn write_value(&mut self, node_id: &str, value: f64) -> Result<(), ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        let address = NodeAddress::parse(node_id)?;
        self.last_written.insert(address, value);
        Ok(())
    }
}
