//! Lazily initialised, shared model handles
//!
//! A [`ModelProvider`] owns the recipe for loading one model and runs it at
//! most once per provider, on first use, even when several workers ask for
//! the model at the same time. A failed load is remembered: the provider
//! reports the model as unavailable from then on and the failure is logged
//! only once.

use crate::error::Result;
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

type Loader<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

pub struct ModelProvider<T: ?Sized + Send + Sync> {
    name: String,
    loader: Option<Loader<T>>,
    cell: OnceCell<Option<Arc<T>>>,
}

impl<T: ?Sized + Send + Sync> ModelProvider<T> {
    /// Load on first use with `loader`
    pub fn lazy<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            loader: Some(Box::new(loader)),
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already loaded model
    pub fn ready(name: impl Into<String>, model: Arc<T>) -> Self {
        Self {
            name: name.into(),
            loader: None,
            cell: OnceCell::with_value(Some(model)),
        }
    }

    /// A provider that never yields a model, e.g. switched off in config
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader: None,
            cell: OnceCell::with_value(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared model, loading it on the first call
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell
            .get_or_init(|| {
                let Some(loader) = &self.loader else {
                    return None;
                };
                match loader() {
                    Ok(model) => {
                        info!("Loaded model '{}'", self.name);
                        Some(model)
                    }
                    Err(e) => {
                        warn!("Model '{}' unavailable, continuing without it: {}", self.name, e);
                        None
                    }
                }
            })
            .clone()
    }

    /// Whether initialisation has already run (successfully or not)
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized + Send + Sync> fmt::Debug for ModelProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Some(_)) => "loaded",
            Some(None) => "unavailable",
        };
        f.debug_struct("ModelProvider")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreenerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_loader_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider: ModelProvider<String> = ModelProvider::lazy("greeting", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new("hello".to_string()))
        });

        assert!(!provider.is_initialized());
        assert_eq!(provider.get().as_deref().map(String::as_str), Some("hello"));
        assert_eq!(provider.get().as_deref().map(String::as_str), Some("hello"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_remembered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider: ModelProvider<String> = ModelProvider::lazy("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ScreenerError::ModelUnavailable("missing weights".to_string()))
        });

        assert!(provider.get().is_none());
        assert!(provider.get().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(provider.is_initialized());
    }

    #[test]
    fn test_concurrent_first_use_initializes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider: Arc<ModelProvider<usize>> = Arc::new(ModelProvider::lazy("shared", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(42))
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                std::thread::spawn(move || provider.get().map(|v| *v))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_and_ready() {
        let disabled: ModelProvider<u8> = ModelProvider::disabled("off");
        assert!(disabled.get().is_none());

        let ready = ModelProvider::ready("on", Arc::new(7u8));
        assert_eq!(ready.get().map(|v| *v), Some(7));
        assert_eq!(ready.name(), "on");
    }
}
