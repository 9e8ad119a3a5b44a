#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tagwatch::error::ClientError;
use tagwatch::source::{shared, DataSource, SharedSource};

/// Observable adapter state shared with the test body.
#[derive(Default)]
pub struct FakeState {
    pub values: HashMap<String, f64>,
    pub fail_reads: HashSet<String>,
    pub fail_writes: bool,
    pub reads: u32,
    pub writes: u32,
}

/// Scriptable data source in the spirit of a hardware test driver.
pub struct FakeSource {
    state: Arc<Mutex<FakeState>>,
}

impl DataSource for FakeSource {
    fn connect(&mut self, _endpoint: &str) -> Result<(), ClientError> {
        Ok(())
    }

    fn disconnect(&mut self) {}

    fn is_connected(&self) -> bool {
        true
    }

    fn read_value(&mut self, node_id: &str) -> Result<f64, ClientError> {
        let mut state = self.state.lock().expect("fake state lock");
        state.reads += 1;
        if state.fail_reads.contains(node_id) {
            return Err(ClientError::Transport("injected read failure".into()));
        }
        Ok(state.values.get(node_id).copied().unwrap_or(0.0))
    }

    fn write_value(&mut self, node_id: &str, value: f64) -> Result<(), ClientError> {
        let mut state = self.state.lock().expect("fake state lock");
        state.writes += 1;
        if state.fail_writes {
            return Err(ClientError::Transport("injected write failure".into()));
        }
        state.values.insert(node_id.to_string(), value);
        Ok(())
    }
}

/// Fake adapter plus a handle onto its observable state.
pub fn fake_source() -> (Arc<Mutex<FakeState>>, SharedSource) {
    let state = Arc::new(Mutex::new(FakeState::default()));
    let source = shared(FakeSource {
        state: Arc::clone(&state),
    });
    (state, source)
}

pub fn set_value(state: &Arc<Mutex<FakeState>>, node_id: &str, value: f64) {
    state
        .lock()
        .expect("fake state lock")
        .values
        .insert(node_id.to_string(), value);
}

pub fn written_value(state: &Arc<Mutex<FakeState>>, node_id: &str) -> Option<f64> {
    state
        .lock()
        .expect("fake state lock")
        .values
        .get(node_id)
        .copied()
}

pub fn fail_read(state: &Arc<Mutex<FakeState>>, node_id: &str) {
    state
        .lock()
        .expect("fake state lock")
        .fail_reads
        .insert(node_id.to_string());
}

pub fn clear_read_failure(state: &Arc<Mutex<FakeState>>, node_id: &str) {
    state
        .lock()
        .expect("fake state lock")
        .fail_reads
        .remove(node_id);
}

pub fn fail_writes(state: &Arc<Mutex<FakeState>>) {
    state.lock().expect("fake state lock").fail_writes = true;
}

pub fn reads(state: &Arc<Mutex<FakeState>>) -> u32 {
    state.lock().expect("fake state lock").reads
}

pub fn writes(state: &Arc<Mutex<FakeState>>) -> u32 {
    state.lock().expect("fake state lock").writes
}
