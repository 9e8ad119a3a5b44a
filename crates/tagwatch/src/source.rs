//! Data-source adapters.

#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use smol_str::SmolStr;

mod loopback;
pub use loopback::LoopbackSource;
mod registry;
pub use registry::{SourceRegistry, SourceSpec};
mod sim;
pub use sim::SimulatedSource;

use crate::error::ClientError;

/// Seam to the external process-value server.
///
/// `Err` is the adapter's way of reporting "not ok"; adapters never panic.
/// Any time bound on a call is the adapter's own responsibility.
pub trait DataSource: Send {
    /// Establish a session with the server at `endpoint`.
    fn connect(&mut self, endpoint: &str) -> Result<(), ClientError>;

    /// Tear the session down; always safe to call.
    fn disconnect(&mut self);

    /// Whether a session is currently established.
    fn is_connected(&self) -> bool;

    /// Read the current value behind `node_id`.
    fn read_value(&mut self, node_id: &str) -> Result<f64, ClientError>;

    /// Write `value` to the node behind `node_id`.
    fn write_value(&mut self, node_id: &str, value: f64) -> Result<(), ClientError>;

    /// Enumerate server-side tags, if the source supports browsing.
    fn discover(&mut self) -> Vec<TagSpec> {
        Vec::new()
    }
}

/// Shared, lockable handle to a data source.
pub type SharedSource = Arc<Mutex<Box<dyn DataSource>>>;

/// Wrap a concrete adapter for shared use by the registry and poller.
pub fn shared(source: impl DataSource + 'static) -> SharedSource {
    Arc::new(Mutex::new(Box::new(source)))
}

/// A tag advertised by a data source or listed in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSpec {
    pub name: SmolStr,
    pub node_id: SmolStr,
    pub unit: SmolStr,
    pub min_hint: f64,
    pub max_hint: f64,
}

/// Fallback tag set for servers without browsing support.
#[must_use]
pub fn demo_tags() -> Vec<TagSpec> {
    vec![
        TagSpec {
            name: SmolStr::new_static("Temperature"),
            node_id: SmolStr::new_static("ns=2;i=1"),
            unit: SmolStr::new_static("C"),
            min_hint: 0.0,
            max_hint: 100.0,
        },
        TagSpec {
            name: SmolStr::new_static("Voltage"),
            node_id: SmolStr::new_static("ns=2;i=2"),
            unit: SmolStr::new_static("V"),
            min_hint: 0.0,
            max_hint: 500.0,
        },
    ]
}

/// Numeric node address in `ns=<namespace>;i=<id>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub namespace: u16,
    pub id: u32,
}

impl NodeAddress {
    /// Parse `ns=2;i=3`. Surrounding whitespace is tolerated.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let trimmed = text.trim();
        let rest = trimmed
            .strip_prefix("ns=")
            .ok_or_else(|| invalid(trimmed))?;
        let (namespace, id) = rest.split_once(';').ok_or_else(|| invalid(trimmed))?;
        let id = id.strip_prefix("i=").ok_or_else(|| invalid(trimmed))?;
        let namespace = namespace
            .parse::<u16>()
            .map_err(|_| invalid(trimmed))?;
        let id = id.parse::<u32>().map_err(|_| invalid(trimmed))?;
        Ok(Self { namespace, id })
    }
}

fn invalid(text: &str) -> ClientError {
    ClientError::InvalidNodeId(text.into())
}
