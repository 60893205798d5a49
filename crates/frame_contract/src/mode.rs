//! Violation handling modes.
//!
//! The process-wide mode starts from `FRAME_CONTRACT_MODE` (see
//! [`crate::config`]) and defaults to [`Mode::Silent`], so contracts are
//! attached but never evaluated unless a program opts in.
//!
//! Scoped overrides ([`scoped_mode`], [`raise_scope`], [`silent_scope`],
//! [`with_mode`]) apply to the current thread only and are undone when the
//! guard drops, including during unwinding.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, error, info, trace, warn};

use crate::config::ContractConfig;
use crate::error::{ContractError, Result};

/// How contract violations are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Mode {
    /// Contracts are not attached at all; decided when a contract is applied.
    Skip = 0,
    /// Contracts are attached but not evaluated.
    Silent = 1,
    Trace = 2,
    Debug = 3,
    Info = 4,
    #[serde(alias = "warning")]
    Warn = 5,
    Error = 6,
    Critical = 7,
    /// Violations are returned as [`ContractError::Violation`].
    Raise = 8,
}

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Skip,
        Mode::Silent,
        Mode::Trace,
        Mode::Debug,
        Mode::Info,
        Mode::Warn,
        Mode::Error,
        Mode::Critical,
        Mode::Raise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Skip => "skip",
            Mode::Silent => "silent",
            Mode::Trace => "trace",
            Mode::Debug => "debug",
            Mode::Info => "info",
            Mode::Warn => "warn",
            Mode::Error => "error",
            Mode::Critical => "critical",
            Mode::Raise => "raise",
        }
    }

    fn from_u8(raw: u8) -> Mode {
        Mode::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(Mode::Silent)
    }

    /// True for modes that never evaluate checks.
    pub fn no_handling(&self) -> bool {
        matches!(self, Mode::Skip | Mode::Silent)
    }

    /// Dispose of violation messages. Each message is prefixed with `prefix`.
    ///
    /// Log modes emit one event per message under the `frame_contract::mode`
    /// target and never fail. Raise mode fails with all messages joined by
    /// newlines; an empty list passes.
    pub fn handle(&self, errors: &[String], prefix: &str) -> Result<()> {
        if self.no_handling() || errors.is_empty() {
            return Ok(());
        }
        if *self == Mode::Raise {
            let msg = errors
                .iter()
                .map(|err| format!("{}{}", prefix, err))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ContractError::Violation(msg));
        }
        for err in errors {
            let message = format!("{}{}", prefix, err);
            match self {
                Mode::Trace => trace!(target: "frame_contract::mode", "{}", message),
                Mode::Debug => debug!(target: "frame_contract::mode", "{}", message),
                Mode::Info => info!(target: "frame_contract::mode", "{}", message),
                Mode::Warn => warn!(target: "frame_contract::mode", "{}", message),
                Mode::Error => error!(target: "frame_contract::mode", "{}", message),
                Mode::Critical => {
                    error!(target: "frame_contract::mode", severity = "critical", "{}", message)
                }
                Mode::Skip | Mode::Silent | Mode::Raise => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ContractError;

    fn from_str(raw: &str) -> Result<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower == "warning" {
            return Ok(Mode::Warn);
        }
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| ContractError::InvalidMode(raw.to_string()))
    }
}

impl PartialEq<str> for Mode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Mode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Anything [`set_mode`] accepts.
pub trait IntoMode {
    fn into_mode(self) -> Result<Mode>;
}

impl IntoMode for Mode {
    fn into_mode(self) -> Result<Mode> {
        Ok(self)
    }
}

impl IntoMode for &str {
    fn into_mode(self) -> Result<Mode> {
        self.parse()
    }
}

impl IntoMode for String {
    fn into_mode(self) -> Result<Mode> {
        self.parse()
    }
}

static GLOBAL_MODE: Lazy<AtomicU8> =
    Lazy::new(|| AtomicU8::new(ContractConfig::from_env().mode as u8));

thread_local! {
    static OVERRIDES: RefCell<Vec<Mode>> = const { RefCell::new(Vec::new()) };
}

fn innermost_override() -> Option<Mode> {
    OVERRIDES
        .try_with(|stack| stack.borrow().last().copied())
        .ok()
        .flatten()
}

/// Current mode for this thread.
pub fn get_mode() -> Mode {
    innermost_override().unwrap_or_else(|| Mode::from_u8(GLOBAL_MODE.load(Ordering::SeqCst)))
}

/// Set the mode and return it.
///
/// Inside a scoped override this replaces the override, which the enclosing
/// guard still undoes; otherwise it sets the process-wide mode.
pub fn set_mode(mode: impl IntoMode) -> Result<Mode> {
    let mode = mode.into_mode()?;
    let replaced = OVERRIDES
        .try_with(|stack| match stack.borrow_mut().last_mut() {
            Some(top) => {
                *top = mode;
                true
            }
            None => false,
        })
        .unwrap_or(false);
    if !replaced {
        set_global_mode(mode);
    }
    Ok(mode)
}

/// Set the process-wide mode, ignoring any scoped override.
pub(crate) fn set_global_mode(mode: Mode) {
    GLOBAL_MODE.store(mode as u8, Ordering::SeqCst);
}

/// Restores the previous mode on drop. Bound to the thread that created it.
#[must_use = "the mode reverts as soon as the guard is dropped"]
pub struct ModeGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ModeGuard {
    fn drop(&mut self) {
        let _ = OVERRIDES.try_with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Override the mode on this thread until the guard drops.
///
/// Accepts a [`Mode`] or a mode name; unknown names fail with
/// [`ContractError::InvalidMode`] before anything is pushed.
pub fn scoped_mode(mode: impl IntoMode) -> Result<ModeGuard> {
    Ok(push_override(mode.into_mode()?))
}

fn push_override(mode: Mode) -> ModeGuard {
    let depth = OVERRIDES
        .try_with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(mode);
            stack.len() - 1
        })
        .unwrap_or(0);
    ModeGuard {
        depth,
        _not_send: PhantomData,
    }
}

pub fn raise_scope() -> ModeGuard {
    push_override(Mode::Raise)
}

pub fn silent_scope() -> ModeGuard {
    push_override(Mode::Silent)
}

/// Run `f` with `mode` in effect on this thread.
pub fn with_mode<R>(mode: Mode, f: impl FnOnce() -> R) -> R {
    let _guard = push_override(mode);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_contract_logging::capture_subscriber;

    fn msgs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_modes() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!("RAISE".parse::<Mode>().unwrap(), Mode::Raise);
        assert_eq!("warning".parse::<Mode>().unwrap(), Mode::Warn);
        let err = "loud".parse::<Mode>().unwrap_err();
        assert!(matches!(err, ContractError::InvalidMode(ref m) if m == "loud"));
    }

    #[test]
    fn test_compare_with_str() {
        assert!(Mode::Raise == "raise");
        assert!(Mode::Warn != "warning");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Critical).unwrap(), "\"critical\"");
        let mode: Mode = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(mode, Mode::Warn);
    }

    #[test]
    fn test_raise_joins_prefixed_messages() {
        let err = Mode::Raise
            .handle(&msgs(&["a", "b"]), "f: Output: ")
            .unwrap_err();
        assert_eq!(err.to_string(), "f: Output: a\nf: Output: b");
        assert!(Mode::Raise.handle(&[], "f: Output: ").is_ok());
    }

    #[test]
    fn test_silent_and_skip_ignore_everything() {
        let (subscriber, capture) = capture_subscriber("trace");
        tracing::subscriber::with_default(subscriber, || {
            assert!(Mode::Silent.handle(&msgs(&["x"]), "p: ").is_ok());
            assert!(Mode::Skip.handle(&msgs(&["x"]), "p: ").is_ok());
        });
        assert!(capture.is_empty());
    }

    #[test]
    fn test_log_modes_emit_one_event_per_message() {
        let (subscriber, capture) = capture_subscriber("trace");
        tracing::subscriber::with_default(subscriber, || {
            Mode::Warn.handle(&msgs(&["a", "b"]), "f: Output: ").unwrap();
            Mode::Trace.handle(&msgs(&["t"]), "").unwrap();
            Mode::Critical.handle(&msgs(&["c"]), "").unwrap();
        });
        let lines = capture.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("WARN") && lines[0].contains("f: Output: a"));
        assert!(lines[1].contains("f: Output: b"));
        assert!(lines[2].contains("TRACE"));
        assert!(lines[3].contains("ERROR") && lines[3].contains("severity=\"critical\""));
        assert!(lines.iter().all(|l| l.contains("frame_contract::mode")));
    }

    #[test]
    fn test_scoped_modes_nest_and_restore() {
        let before = get_mode();
        {
            let _outer = scoped_mode(Mode::Warn).unwrap();
            assert_eq!(get_mode(), Mode::Warn);
            {
                let _inner = raise_scope();
                assert_eq!(get_mode(), Mode::Raise);
                set_mode("info").unwrap();
                assert_eq!(get_mode(), Mode::Info);
            }
            assert_eq!(get_mode(), Mode::Warn);
            assert_eq!(with_mode(Mode::Debug, get_mode), Mode::Debug);
            let _silent = silent_scope();
            assert_eq!(get_mode(), Mode::Silent);
        }
        assert_eq!(get_mode(), before);
    }

    #[test]
    fn test_invalid_set_mode_changes_nothing() {
        let _guard = scoped_mode(Mode::Error).unwrap();
        assert!(set_mode("bogus").is_err());
        assert_eq!(get_mode(), Mode::Error);
    }

    #[test]
    fn test_scoped_mode_by_name() {
        let before = get_mode();
        {
            let _guard = scoped_mode("Warning").unwrap();
            assert_eq!(get_mode(), Mode::Warn);
        }
        assert!(matches!(
            scoped_mode("loud"),
            Err(ContractError::InvalidMode(name)) if name == "loud"
        ));
        assert_eq!(get_mode(), before);
    }
}
