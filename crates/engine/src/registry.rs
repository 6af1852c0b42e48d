//! Name-keyed registries shared by the dispatch loop and the router

use dashmap::DashMap;
use parking_lot::Mutex;
use relay_core::{FetchParams, RequestName};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::request::CompletionHandler;

/// Completion handler per request name
///
/// Not request-scoped: every reply for a name goes to that name's handler.
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: DashMap<RequestName, CompletionHandler>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler it replaced, if any
    pub fn set(&self, name: RequestName, handler: CompletionHandler) -> Option<CompletionHandler> {
        self.handlers.insert(name, handler)
    }

    /// Cloned out so callers never run a handler while holding a map shard
    pub fn get(&self, name: &RequestName) -> Option<CompletionHandler> {
        self.handlers.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &RequestName) -> bool {
        self.handlers.contains_key(name)
    }
}

/// Fetch parameters per request name, versioned by generation
///
/// Every `set` bumps a global generation so a finishing fetch can tell whether
/// the parameters it ran with were replaced in the meantime.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    entries: DashMap<RequestName, (u64, FetchParams)>,
    generation: AtomicU64,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `params` for `name`, returning the new generation
    pub fn set(&self, name: RequestName, params: FetchParams) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(name, (generation, params));
        generation
    }

    pub fn get(&self, name: &RequestName) -> Option<(u64, FetchParams)> {
        self.entries.get(name).map(|entry| *entry.value())
    }

    /// Clear `name` only if it still holds `generation`
    pub fn clear_if_current(&self, name: &RequestName, generation: u64) -> bool {
        self.entries
            .remove_if(name, |_, (current, _)| *current == generation)
            .is_some()
    }
}

/// Bounded FIFO that drops its oldest entry when full
pub struct BoundedBuffer<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Returns the entry evicted to make room
    pub fn push(&self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let mut items = self.items.lock();
        let evicted = if items.len() >= self.capacity {
            items.pop_front()
        } else {
            None
        };
        items.push_back(item);
        evicted
    }

    /// Remove every entry matching `predicate`, oldest first
    pub fn take_where(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        let mut items = self.items.lock();
        let mut taken = Vec::new();
        let mut kept = VecDeque::with_capacity(items.len());
        for item in items.drain(..) {
            if predicate(&item) {
                taken.push(item);
            } else {
                kept.push_back(item);
            }
        }
        *items = kept;
        taken
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_callback_registry_replaces() {
        let registry = CallbackRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let name = RequestName::new("stock_info");

        assert!(registry.set(name.clone(), Arc::new(|_| {})).is_none());
        assert!(
            registry
                .set(
                    name.clone(),
                    Arc::new(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .is_some()
        );
        assert!(registry.contains(&name));
        assert!(registry.get(&RequestName::new("other")).is_none());
    }

    #[test]
    fn test_params_cleared_only_for_current_generation() {
        let registry = ParameterRegistry::new();
        let name = RequestName::new("minute_chart");

        let first = registry.set(name.clone(), FetchParams::capped(10));
        let second = registry.set(name.clone(), FetchParams::capped(20));
        assert!(second > first);

        assert!(!registry.clear_if_current(&name, first));
        assert_eq!(registry.get(&name), Some((second, FetchParams::capped(20))));

        assert!(registry.clear_if_current(&name, second));
        assert_eq!(registry.get(&name), None);
    }

    #[test]
    fn test_bounded_buffer_evicts_oldest() {
        let buffer = BoundedBuffer::new(2);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), Some(1));
        assert_eq!(buffer.snapshot(), vec![2, 3]);

        assert_eq!(buffer.take_where(|n| n % 2 == 1), vec![3]);
        assert_eq!(buffer.len(), 1);

        let disabled = BoundedBuffer::new(0);
        assert_eq!(disabled.push("x"), Some("x"));
        assert!(disabled.is_empty());
    }
}
