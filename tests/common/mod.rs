// Shared test doubles
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use folio_gateway::error::{GatewayError, Result};
use folio_gateway::gemini::TextGenerator;
use futures::future::{BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Generator that replays scripted outcomes and counts calls.
///
/// When the script is exhausted it echoes the prompt back.
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<String>>>,
    delay: Duration,
    configured: bool,
}

impl ScriptedGenerator {
    pub fn echo() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            configured: true,
        }
    }

    pub fn with_outcomes(outcomes: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Self::echo()
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::with_outcomes(vec![Err(error)])
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(format!("answer to: {}", prompt)))
        }
        .boxed()
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
