//! Change notification - observer registration for tracker state changes

use std::fmt;
use uuid::Uuid;

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(Uuid);

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

type Observer = Box<dyn Fn() + Send + Sync>;

/// Fires a zero-argument "changed" signal to every registered observer.
///
/// Observers are invoked synchronously, in subscription order, on the
/// thread that performed the mutation.
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Vec<(Subscription, Observer)>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe<F>(&mut self, observer: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let subscription = Subscription(Uuid::new_v4());
        self.observers.push((subscription, Box::new(observer)));
        subscription
    }

    /// Remove an observer. Returns false if the handle was not registered.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| s != subscription);
        self.observers.len() != before
    }

    /// Invoke every observer
    pub fn notify(&self) {
        for (_, observer) in &self.observers {
            observer();
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}
