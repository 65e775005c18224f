//! Hint storage and watcher dispatch.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Watcher callback: `(name, old_value, new_value)`.
///
/// On subscription the callback fires once with `old_value == new_value ==`
/// the current value, so a watcher can install its initial state without a
/// separate read.
pub type HintCallback = Arc<dyn Fn(&str, Option<&str>, Option<&str>) + Send + Sync>;

/// Identifies one watcher subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HintWatchId(u64);

#[derive(Default)]
struct HintEntry {
    value: Option<String>,
    watchers: Vec<(HintWatchId, HintCallback)>,
}

/// Named string values with change-callback subscription.
///
/// # Thread Safety
///
/// All operations are safe from any thread. Watchers are invoked outside the
/// registry lock, so a watcher may call back into the registry.
pub struct HintRegistry {
    entries: RwLock<HashMap<String, HintEntry>>,
    next_watch_id: AtomicU64,
}

impl Default for HintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HintRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_watch_id: AtomicU64::new(1),
        }
    }

    /// Read the current value of a hint.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let entries = self.entries.read();
        entries.get(name).and_then(|entry| entry.value.clone())
    }

    /// Set a hint value, notifying watchers if it changed.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set(&self, name: &str, value: &str) -> bool {
        let (old, watchers) = {
            let mut entries = self.entries.write();
            let entry = entries.entry(name.to_string()).or_default();
            if entry.value.as_deref() == Some(value) {
                return false;
            }
            let old = entry.value.replace(value.to_string());
            let watchers: Vec<HintCallback> =
                entry.watchers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
            (old, watchers)
        };

        for watcher in watchers {
            watcher(name, old.as_deref(), Some(value));
        }
        true
    }

    /// Subscribe a watcher to a hint.
    ///
    /// The watcher is invoked once immediately with the current value, then
    /// again on every subsequent change until removed.
    pub fn add_callback<F>(&self, name: &str, callback: F) -> HintWatchId
    where
        F: Fn(&str, Option<&str>, Option<&str>) + Send + Sync + 'static,
    {
        let callback: HintCallback = Arc::new(callback);
        let id = HintWatchId(self.next_watch_id.fetch_add(1, Ordering::Relaxed));

        let current = {
            let mut entries = self.entries.write();
            let entry = entries.entry(name.to_string()).or_default();
            entry.watchers.push((id, Arc::clone(&callback)));
            entry.value.clone()
        };

        callback(name, current.as_deref(), current.as_deref());
        id
    }

    /// Remove a watcher subscription.
    ///
    /// Removing an unknown id is a no-op.
    pub fn remove_callback(&self, name: &str, id: HintWatchId) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(name) {
            entry.watchers.retain(|(watch_id, _)| *watch_id != id);
        }
    }
}

impl std::fmt::Debug for HintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintRegistry")
            .field("hints", &self.entries.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_get_unset_hint() {
        let registry = HintRegistry::new();
        assert_eq!(registry.get("MISSING"), None);
    }

    #[test]
    fn test_set_and_get() {
        let registry = HintRegistry::new();
        assert!(registry.set("NAME", "value"));
        assert_eq!(registry.get("NAME"), Some("value".to_string()));
    }

    #[test]
    fn test_set_same_value_reports_unchanged() {
        let registry = HintRegistry::new();
        assert!(registry.set("NAME", "value"));
        assert!(!registry.set("NAME", "value"));
        assert!(registry.set("NAME", "other"));
    }

    #[test]
    fn test_callback_fires_immediately_with_current_value() {
        let registry = HintRegistry::new();
        registry.set("NAME", "initial");

        let seen: Arc<Mutex<Vec<(Option<String>, Option<String>)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.add_callback("NAME", move |_, old, new| {
            sink.lock()
                .unwrap()
                .push((old.map(String::from), new.map(String::from)));
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            (Some("initial".to_string()), Some("initial".to_string()))
        );
    }

    #[test]
    fn test_callback_fires_on_change_with_old_and_new() {
        let registry = HintRegistry::new();

        let seen: Arc<Mutex<Vec<(Option<String>, Option<String>)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.add_callback("NAME", move |_, old, new| {
            sink.lock()
                .unwrap()
                .push((old.map(String::from), new.map(String::from)));
        });

        registry.set("NAME", "first");
        registry.set("NAME", "second");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (None, None));
        assert_eq!(seen[1], (None, Some("first".to_string())));
        assert_eq!(
            seen[2],
            (Some("first".to_string()), Some("second".to_string()))
        );
    }

    #[test]
    fn test_removed_callback_stops_firing() {
        let registry = HintRegistry::new();

        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        let id = registry.add_callback("NAME", move |_, _, _| {
            *sink.lock().unwrap() += 1;
        });
        assert_eq!(*count.lock().unwrap(), 1);

        registry.remove_callback("NAME", id);
        registry.set("NAME", "value");
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_remove_unknown_callback_is_noop() {
        let registry = HintRegistry::new();
        registry.remove_callback("NAME", HintWatchId(42));
    }

    #[test]
    fn test_watcher_may_reenter_registry() {
        let registry = Arc::new(HintRegistry::new());
        let inner = Arc::clone(&registry);
        registry.add_callback("NAME", move |_, _, _| {
            let _ = inner.get("OTHER");
        });
        registry.set("NAME", "value");
    }
}
