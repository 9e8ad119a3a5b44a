//! Simulated data source for development.

use rand::RngExt;
use rustc_hash::FxHashMap;

use crate::error::ClientError;
use crate::source::{DataSource, NodeAddress};

/// Random-walk simulation of a process-value server.
///
/// Each node wanders inside a band derived from its numeric id; manual
/// writes move the walk to the written value.
#[derive(Debug, Default)]
pub struct SimulatedSource {
    connected: bool,
    state: FxHashMap<NodeAddress, f64>,
}

impl SimulatedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSource for SimulatedSource {
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
        let span = band_for(address);
        let mut rng = rand::rng();
        let value = self
            .state
            .entry(address)
            .or_insert_with(|| rng.random_range(0.0..span));
        *value += rng.random_range(-span..span) * 0.02;
        *value = value.clamp(0.0, span);
        Ok(*value)
    }

    fn write_value(&mut self, node_id: &str, value: f64) -> Result<(), ClientError> {
        if !self.connected {
            return Err(ClientError::NotConnected);
        }
        let address = NodeAddress::parse(node_id)?;
        self.state.insert(address, value);
        Ok(())
    }
}

// Node id 2 is the demo voltage node; everything else reads on a 0..100 band.
fn band_for(address: NodeAddress) -> f64 {
    match address.id {
        2 => 500.0,
        _ => 100.0,
    }
}
