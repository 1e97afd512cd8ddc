use indexmap::IndexMap;

use super::{InstanceId, SchemaKind};

/// Runtime metrics exposed by the payload cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// `instanceId + variant`; an element switching between chart and diagram
/// never reuses the other variant's payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub instance_id: InstanceId,
    pub variant: SchemaKind,
}

impl ContentKey {
    #[must_use]
    pub fn new(instance_id: InstanceId, variant: SchemaKind) -> Self {
        Self {
            instance_id,
            variant,
        }
    }
}

/// Last produced data URL per element.
///
/// Bounded; once full, an insert first drops the other variants of the same
/// element, then the least recently used entry.
#[derive(Debug)]
pub struct ContentCache {
    entries: IndexMap<ContentKey, String>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }
}

impl ContentCache {
    pub const DEFAULT_MAX_ENTRIES: usize = 1024;

    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &ContentKey) -> Option<String> {
        let Some(index) = self.entries.get_index_of(key) else {
            self.misses = self.misses.saturating_add(1);
            return None;
        };
        self.hits = self.hits.saturating_add(1);
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, value)| value.clone())
    }

    pub fn insert(&mut self, key: ContentKey, data_url: String) {
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.max_entries {
            self.entries.retain(|cached, _| cached.instance_id != key.instance_id);
            while self.entries.len() >= self.max_entries {
                if self.entries.shift_remove_index(0).is_none() {
                    break;
                }
            }
        }
        self.entries.insert(key, data_url);
    }

    /// Drops every variant cached for `instance_id`.
    pub fn remove_instance(&mut self, instance_id: &InstanceId) {
        self.entries.retain(|key, _| &key.instance_id != instance_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn stats(&self) -> ContentCacheStats {
        ContentCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentCache, ContentKey};
    use crate::api::{InstanceId, SchemaKind};

    #[test]
    fn variants_are_cached_separately() {
        let id = InstanceId::from("chart-1");
        let mut cache = ContentCache::default();
        cache.insert(
            ContentKey::new(id.clone(), SchemaKind::Chart),
            "data:image/png;base64,AA".to_owned(),
        );
        assert!(cache.get(&ContentKey::new(id.clone(), SchemaKind::Diagram)).is_none());
        assert!(cache.get(&ContentKey::new(id.clone(), SchemaKind::Chart)).is_some());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);

        cache.remove_instance(&id);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn capacity_is_never_below_one() {
        let mut cache = ContentCache::with_max_entries(0);
        cache.insert(
            ContentKey::new(InstanceId::from("a"), SchemaKind::Chart),
            "data:image/png;base64,AA".to_owned(),
        );
        assert_eq!(cache.stats().size, 1);
    }
}
