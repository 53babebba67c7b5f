//! In-memory subscription registry
//!
//! Subscriptions live only as long as the process. Ids are handed out from a
//! counter, so two registrations never share one even when they race.

use common::{PushSubscription, RecipientId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

#[derive(Default)]
struct RegistryInner {
    last_id: u64,
    subscriptions: HashMap<RecipientId, PushSubscription>,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `subscription` under a fresh id and return that id
    pub fn register(&self, subscription: PushSubscription) -> RecipientId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.last_id += 1;
        let id = RecipientId::new(inner.last_id.to_string());
        debug!(recipient = %id, endpoint = %subscription.endpoint(), "Registered subscription");
        inner.subscriptions.insert(id.clone(), subscription);
        id
    }

    pub fn lookup(&self, id: &RecipientId) -> Option<PushSubscription> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{SubscriptionKeys, SubscriptionRequest};
    use std::collections::HashSet;

    fn subscription(path: &str) -> PushSubscription {
        PushSubscription::try_from(SubscriptionRequest {
            endpoint: format!("https://push.example.net/{}", path),
            keys: SubscriptionKeys {
                p256dh: "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4".to_string(),
                auth: "BTBZMqHH6r4Tts7J_aSIgg".to_string(),
            },
        })
        .unwrap()
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.is_empty());

        let first = registry.register(subscription("a"));
        let second = registry.register(subscription("b"));

        assert_eq!(first.as_str(), "1");
        assert_eq!(second.as_str(), "2");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&first).unwrap(), subscription("a"));
        assert_eq!(registry.lookup(&second).unwrap(), subscription("b"));
    }

    #[test]
    fn test_same_subscription_twice_gets_two_ids() {
        let registry = SubscriptionRegistry::new();
        let a = registry.register(subscription("same"));
        let b = registry.register(subscription("same"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let registry = SubscriptionRegistry::new();
        registry.register(subscription("a"));
        assert!(registry.lookup(&RecipientId::new("99")).is_none());
        assert!(registry.lookup(&RecipientId::new("")).is_none());
    }

    #[test]
    fn test_concurrent_registrations_get_distinct_ids() {
        let registry = SubscriptionRegistry::new();

        let ids: Vec<RecipientId> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let registry = &registry;
                    scope.spawn(move || {
                        (0..50)
                            .map(|i| registry.register(subscription(&format!("{}-{}", t, i))))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<_> = ids.iter().cloned().collect();
        assert_eq!(unique.len(), 400);
        assert_eq!(registry.len(), 400);
        assert!(ids.iter().all(|id| registry.lookup(id).is_some()));
    }
}
