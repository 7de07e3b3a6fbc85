// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lazily constructed recognizer
//!
//! The engine is built on first use. The build runs as its own task and every
//! caller awaits the same in-flight load, so at most one model instance is
//! ever loaded even when a waiting request is cancelled. A failed
//! initialization is forgotten and the next request retries.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use image::GrayImage;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::info;

use super::recognizer::{RecognitionError, TextFragment, TextRecognizer};

type EngineResult = Result<Arc<dyn TextRecognizer>, RecognitionError>;

type RecognizerFactory = Box<dyn Fn() -> BoxFuture<'static, EngineResult> + Send + Sync>;

type PendingEngine = Shared<BoxFuture<'static, EngineResult>>;

/// Recognizer that builds its engine on first use
pub struct LazyRecognizer {
    name: String,
    factory: RecognizerFactory,
    ready: Arc<OnceLock<Arc<dyn TextRecognizer>>>,
    pending: Mutex<Option<PendingEngine>>,
}

impl std::fmt::Debug for LazyRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRecognizer")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl LazyRecognizer {
    pub fn new<F, Fut>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EngineResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move || Box::pin(factory())),
            ready: Arc::new(OnceLock::new()),
            pending: Mutex::new(None),
        }
    }

    /// Whether the engine has been constructed
    pub fn is_initialized(&self) -> bool {
        self.ready.get().is_some()
    }

    /// Get the engine, constructing it if this is the first use
    pub async fn get(&self) -> EngineResult {
        if let Some(engine) = self.ready.get() {
            return Ok(Arc::clone(engine));
        }

        let pending = self.pending();
        let result = pending.clone().await;

        if result.is_err() {
            let mut slot = self.slot();
            if slot
                .as_ref()
                .is_some_and(|current| Shared::ptr_eq(current, &pending))
            {
                *slot = None;
            }
        }

        result
    }

    /// The load in progress or finished, starting one if there is none
    fn pending(&self) -> PendingEngine {
        let mut slot = self.slot();
        if let Some(pending) = slot.as_ref() {
            return pending.clone();
        }

        info!("Initializing {} recognizer on first use", self.name);
        let name = self.name.clone();
        let ready = Arc::clone(&self.ready);
        let build = (self.factory)();
        let task = tokio::spawn(async move {
            let engine = build.await?;
            let _ = ready.set(Arc::clone(&engine));
            info!("✅ {} recognizer ready", name);
            Ok::<_, RecognitionError>(engine)
        });

        let pending = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(RecognitionError::WorkerFailed(e.to_string())),
            }
        }
        .boxed()
        .shared();

        *slot = Some(pending.clone());
        pending
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<PendingEngine>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TextRecognizer for LazyRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize(&self, image: GrayImage) -> Result<Vec<TextFragment>, RecognitionError> {
        self.get().await?.recognize(image).await
    }
}
