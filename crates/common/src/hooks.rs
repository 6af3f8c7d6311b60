use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    tracing::{debug, warn},
};

/// Application lifecycle events that components can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Fired once per process after the database tables have been created.
    AfterCreateDb,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterCreateDb => "afterCreateDb",
        }
    }
}

/// A component reacting to a lifecycle event.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Hook identifier used in logs.
    fn name(&self) -> &str;

    async fn on_event(&self, event: LifecycleEvent) -> Result<()>;
}

/// Ordered list of hooks, keyed by the event they subscribed to.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<(LifecycleEvent, Arc<dyn LifecycleHook>)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `hook` to `event`. Hooks run in registration order.
    pub fn on(&mut self, event: LifecycleEvent, hook: Arc<dyn LifecycleHook>) {
        debug!(event = event.as_str(), hook = hook.name(), "hook registered");
        self.hooks.push((event, hook));
    }

    /// Number of hooks subscribed to `event`.
    pub fn count(&self, event: LifecycleEvent) -> usize {
        self.hooks.iter().filter(|(e, _)| *e == event).count()
    }

    /// Run every hook subscribed to `event`.
    ///
    /// Failures are logged and do not stop later hooks. Returns how many hooks
    /// completed successfully.
    pub async fn dispatch(&self, event: LifecycleEvent) -> usize {
        let mut ok = 0;
        for (_, hook) in self.hooks.iter().filter(|(e, _)| *e == event) {
            match hook.on_event(event).await {
                Ok(()) => {
                    debug!(event = event.as_str(), hook = hook.name(), "hook completed");
                    ok += 1;
                },
                Err(e) => {
                    warn!(event = event.as_str(), hook = hook.name(), error = %e, "hook failed");
                },
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    struct Counter {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl LifecycleHook for Counter {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_event(&self, _event: LifecycleEvent) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_runs_all_hooks_even_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HookRegistry::new();
        registry.on(
            LifecycleEvent::AfterCreateDb,
            Arc::new(Counter {
                name: "first",
                calls: Arc::clone(&calls),
                fail: true,
            }),
        );
        registry.on(
            LifecycleEvent::AfterCreateDb,
            Arc::new(Counter {
                name: "second",
                calls: Arc::clone(&calls),
                fail: false,
            }),
        );

        assert_eq!(registry.count(LifecycleEvent::AfterCreateDb), 2);
        let ok = registry.dispatch(LifecycleEvent::AfterCreateDb).await;
        assert_eq!(ok, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dispatch_without_hooks_is_noop() {
        let registry = HookRegistry::new();
        assert_eq!(registry.dispatch(LifecycleEvent::AfterCreateDb).await, 0);
    }
}
