//! Tag registry and override engine.

use std::sync::Mutex;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::history::{TagHistory, DEFAULT_HISTORY_CAP};
use crate::source::SharedSource;
use crate::tag::{timestamp_now, Quality, Tag};

/// Authoritative, concurrency-safe store of tag state and history.
///
/// Two independent lock domains: one for the tag list and per-tag state,
/// one for the history map, so history reads never serialize against tag
/// reads. The order is tags-then-histories and the two guards are never
/// held at the same time. No guard is held across a data-source call; the
/// external write in [`Self::write`] happens between the existence check
/// and the local merge.
///
/// Read accessors hand out independent copies, so callers can iterate or
/// render without holding any lock. Name uniqueness is not enforced;
/// every name-keyed operation resolves to the first match in insertion
/// order (observed reference behavior, preserved).
pub struct TagRegistry {
    tags: Mutex<Vec<Tag>>,
    histories: Mutex<FxHashMap<SmolStr, TagHistory>>,
    history_cap: usize,
    source: SharedSource,
}

impl TagRegistry {
    /// Registry with the default history cap.
    #[must_use]
    pub fn new(source: SharedSource) -> Self {
        Self::with_history_cap(source, DEFAULT_HISTORY_CAP)
    }

    /// Registry retaining at most `history_cap` samples per tag.
    #[must_use]
    pub fn with_history_cap(source: SharedSource, history_cap: usize) -> Self {
        Self {
            tags: Mutex::new(Vec::new()),
            histories: Mutex::new(FxHashMap::default()),
            history_cap,
            source,
        }
    }

    /// Register a tag. Duplicate names are allowed and become separately
    /// addressable entries; lookups resolve to the first match.
    ///
    /// The initial value is the midpoint of the range hints, with quality
    /// derived from it like any other merge.
    pub fn add(
        &self,
        name: impl Into<SmolStr>,
        node_id: impl Into<SmolStr>,
        unit: impl Into<SmolStr>,
        min_hint: f64,
        max_hint: f64,
    ) {
        let value = (min_hint + max_hint) / 2.0;
        let tag = Tag::new(name, node_id, unit, value);
        self.tags
            .lock()
            .expect("tag state lock poisoned")
            .push(tag);
    }

    /// Snapshot of all tags in insertion order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Tag> {
        self.tags.lock().expect("tag state lock poisoned").clone()
    }

    /// Number of registered tags (duplicates included).
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.lock().expect("tag state lock poisoned").len()
    }

    /// Copy of the first tag with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Tag> {
        self.tags
            .lock()
            .expect("tag state lock poisoned")
            .iter()
            .find(|tag| tag.name == name)
            .cloned()
    }

    /// Merge a fresh value into the first tag with the given name.
    ///
    /// The superseded (value, stamp) pair is appended to the tag's history
    /// before overwriting, so the timeline includes the initial state.
    /// Quality is recomputed from the new value; `written` marks a manual
    /// override. Unknown names are a silent no-op.
    pub fn update(&self, name: &str, value: f64, written: bool) {
        let previous = {
            let mut tags = self.tags.lock().expect("tag state lock poisoned");
            let Some(tag) = tags.iter_mut().find(|tag| tag.name == name) else {
                debug!("update for unknown tag '{name}' dropped");
                return;
            };
            let previous = (tag.value, tag.stamp.clone());
            tag.value = value;
            tag.written = written;
            tag.quality = Quality::from_value(value);
            tag.stamp = timestamp_now();
            previous
        };
        let mut histories = self.histories.lock().expect("history lock poisoned");
        histories
            .entry(SmolStr::new(name))
            .or_insert_with(|| TagHistory::new(self.history_cap))
            .push(previous.0, previous.1);
    }

    /// Manually write a tag, taking it out of automatic polling.
    ///
    /// Returns `false` if no tag has this name; nothing is created and the
    /// data source is not touched. Otherwise the external write is
    /// attempted and the local merge is applied regardless of its outcome
    /// (local truth wins; the failure is only logged).
    pub fn write(&self, name: &str, value: f64) -> bool {
        let node_id = {
            let tags = self.tags.lock().expect("tag state lock poisoned");
            match tags.iter().find(|tag| tag.name == name) {
                Some(tag) => tag.node_id.clone(),
                None => return false,
            }
        };
        let result = {
            let mut source = self.source.lock().expect("source lock poisoned");
            source.write_value(&node_id, value)
        };
        if let Err(err) = result {
            warn!("external write of '{name}' ({node_id}) failed: {err}");
        }
        self.update(name, value, true);
        true
    }

    /// Return an overridden tag to automatic polling.
    ///
    /// Fails if the tag is unknown or not currently written.
    pub fn reset_to_auto(&self, name: &str) -> bool {
        let mut tags = self.tags.lock().expect("tag state lock poisoned");
        match tags.iter_mut().find(|tag| tag.name == name) {
            Some(tag) if tag.written => {
                tag.written = false;
                true
            }
            _ => false,
        }
    }

    /// Return every overridden tag to automatic polling.
    ///
    /// Reports how many were reset; idempotent.
    pub fn reset_all_written(&self) -> usize {
        let mut tags = self.tags.lock().expect("tag state lock poisoned");
        let mut count = 0;
        for tag in tags.iter_mut().filter(|tag| tag.written) {
            tag.written = false;
            count += 1;
        }
        count
    }

    /// Set quality on the first tag with the given name, leaving value,
    /// stamp and history untouched. This is the failed-read path.
    pub fn set_quality(&self, name: &str, quality: Quality) {
        let mut tags = self.tags.lock().expect("tag state lock poisoned");
        if let Some(tag) = tags.iter_mut().find(|tag| tag.name == name) {
            tag.quality = quality;
        }
    }

    /// Copy of the history recorded for a tag name, if any yet.
    #[must_use]
    pub fn history_of(&self, name: &str) -> Option<TagHistory> {
        self.histories
            .lock()
            .expect("history lock poisoned")
            .get(name)
            .cloned()
    }

    /// Configured per-tag history cap.
    #[must_use]
    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    /// Drop all tags and histories (reconnect/rediscovery rebuild).
    pub fn clear(&self) {
        self.tags.lock().expect("tag state lock poisoned").clear();
        self.histories
            .lock()
            .expect("history lock poisoned")
            .clear();
    }

    /// CRC32 over the observable tag state, for change-only notification.
    ///
    /// Stamps are excluded so a re-read of an identical value does not
    /// count as a change.
    #[must_use]
    pub fn fingerprint(&self) -> u32 {
        let tags = self.tags.lock().expect("tag state lock poisoned");
        let mut hasher = crc32fast::Hasher::new();
        for tag in tags.iter() {
            hasher.update(tag.name.as_bytes());
            hasher.update(&tag.value.to_bits().to_le_bytes());
            hasher.update(&[tag.quality as u8, u8::from(tag.written)]);
        }
        hasher.finalize()
    }
}
