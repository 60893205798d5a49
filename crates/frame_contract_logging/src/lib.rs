//! Logging utilities for programs and tests that use frame_contract.
//!
//! Contract violations in log modes are emitted as `tracing` events under the
//! `frame_contract::mode` target; this crate installs a subscriber that shows
//! them, or captures them in memory for assertions.

use anyhow::{anyhow, Result};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "frame_contract=warn";
const VERBOSE_LOG_FILTER: &str = "frame_contract=debug";

/// Logging configuration.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

impl<'a> LogConfig<'a> {
    pub fn new(app_name: &'a str) -> Self {
        Self {
            app_name,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> String {
        let level = if self.verbose { "debug" } else { "warn" };
        let base = if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };
        format!("{},{}={}", base, sanitize_name(self.app_name), level)
    }
}

/// Install a global stderr subscriber. `RUST_LOG` overrides the default
/// filter unless `verbose` is set.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = if config.verbose {
        EnvFilter::new(config.default_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter()))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install subscriber for {}: {}", config.app_name, e))?;

    tracing::debug!(app = config.app_name, "logging initialized");
    Ok(())
}

/// In-memory log sink. Clones share one buffer.
#[derive(Clone, Default)]
pub struct LogCapture {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        String::from_utf8_lossy(&guard).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.clear();
        }
    }
}

pub struct LogCaptureGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for LogCaptureGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log capture lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Subscriber writing plain-text records (no ANSI, no timestamps) into a
/// fresh [`LogCapture`]. Install it with `tracing::subscriber::with_default`.
pub fn capture_subscriber(
    filter: &str,
) -> (impl tracing::Subscriber + Send + Sync + 'static, LogCapture) {
    let capture = LogCapture::new();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_target(true)
        .without_time()
        .finish();
    (subscriber, capture)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect()
}
