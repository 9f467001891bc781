//! Wrap-event recording.
//!
//! Every successful wrap hands one [`ErrorEvent`] to a [`Recorder`],
//! synchronously, before the new node is returned. The default recorder
//! is [`LogRecorder`], which emits a `tracing` event on target `bizcode`.
//!
//! # Process-wide binding
//!
//! [`Code::wrap`](crate::Code::wrap) and
//! [`Code::wrap_with`](crate::Code::wrap_with) use the recorder installed
//! with [`set_recorder`]. Install it once during startup, before worker
//! threads begin wrapping. Replacing it later is safe (the binding sits
//! behind an `RwLock` and readers clone an `Arc`), but wraps already in
//! flight finish with the old recorder.
//!
//! [`Code::wrap_using`](crate::Code::wrap_using) bypasses the binding and
//! takes the recorder as an argument.
//!
//! # Environment Variables
//!
//! Read by [`LogRecorderConfig::from_env`]:
//!
//! - `BIZCODE_LOG_LEVEL=<level>` - off, error, warn, info, debug, trace (or 0-5)
//! - `BIZCODE_CAUSE_CHAIN=1` - log the full `source()` chain of each cause

use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{Level, Span};

use crate::chain;
use crate::CorrelationId;
use crate::Origin;

/// Everything known about one wrap, borrowed for the duration of
/// [`Recorder::record`].
pub struct ErrorEvent<'a> {
    /// Key of the code doing the wrapping.
    pub key: &'a str,
    /// Span attached to the code with `Code::with_context`, if any.
    pub context: Option<&'a Span>,
    /// The error being wrapped.
    pub cause: &'a (dyn Error + 'static),
    /// Chain origin (first wrap). Identical for every event of one chain.
    pub origin: &'a Origin,
    /// Call site of this particular wrap.
    pub site: &'static Location<'static>,
    /// Auxiliary values passed to the wrap.
    pub values: &'a [&'a dyn fmt::Debug],
    pub correlation_id: CorrelationId,
}

impl fmt::Debug for ErrorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorEvent")
            .field("key", &self.key)
            .field("context", &self.context)
            .field("cause", &format_args!("{}", self.cause))
            .field("origin", &format_args!("{}", self.origin))
            .field("site", &format_args!("{}", self.site))
            .field("values", &self.values)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

/// Consumer of wrap events.
///
/// Implementations must be cheap and must not wrap errors themselves
/// with the process-wide recorder (that would recurse).
pub trait Recorder: Send + Sync {
    fn record(&self, event: &ErrorEvent<'_>);
}

impl<F> Recorder for F
where
    F: Fn(&ErrorEvent<'_>) + Send + Sync,
{
    fn record(&self, event: &ErrorEvent<'_>) {
        self(event)
    }
}

/// Recorder that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Recorder for Discard {
    #[inline]
    fn record(&self, _event: &ErrorEvent<'_>) {}
}

// ── LogRecorder ───────────────────────────────────────────────────

/// Configuration for [`LogRecorder`].
#[derive(Debug, Clone)]
pub struct LogRecorderConfig {
    /// Level of the emitted events. `None` disables output.
    pub level: Option<Level>,

    /// Render the cause's whole `source()` chain (`a: b: c`) instead of
    /// only its own message.
    pub with_cause_chain: bool,

    /// Include auxiliary values.
    pub with_values: bool,
}

impl Default for LogRecorderConfig {
    fn default() -> Self {
        Self {
            level: Some(Level::ERROR),
            with_cause_chain: false,
            with_values: true,
        }
    }
}

impl LogRecorderConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `BIZCODE_LOG_LEVEL` and `BIZCODE_CAUSE_CHAIN`.
    /// Unparseable values leave the default in place.
    pub fn from_env() -> Self {
        let level = std::env::var("BIZCODE_LOG_LEVEL").ok();
        let cause_chain = std::env::var("BIZCODE_CAUSE_CHAIN").ok();
        Self::from_vars(level.as_deref(), cause_chain.as_deref())
    }

    fn from_vars(level: Option<&str>, cause_chain: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(level) = level.and_then(parse_level) {
            config.level = level;
        }

        if let Some(val) = cause_chain {
            config.with_cause_chain = matches!(val.trim(), "1" | "true" | "yes" | "on");
        }

        config
    }

    /// Set the event level
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Disable output entirely
    pub fn off(mut self) -> Self {
        self.level = None;
        self
    }

    /// Log the whole cause chain
    pub fn with_cause_chain(mut self, enable: bool) -> Self {
        self.with_cause_chain = enable;
        self
    }

    /// Log auxiliary values
    pub fn with_values(mut self, enable: bool) -> Self {
        self.with_values = enable;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.level.is_none() && self.with_cause_chain {
            return Err("with_cause_chain set on a disabled recorder");
        }
        Ok(())
    }
}

/// `off`/`0` → `Some(None)`, a level name or `1..=5` → `Some(Some(level))`.
fn parse_level(val: &str) -> Option<Option<Level>> {
    let level = match val.trim().to_lowercase().as_str() {
        "off" | "0" => return Some(None),
        "error" | "1" => Level::ERROR,
        "warn" | "2" => Level::WARN,
        "info" | "3" => Level::INFO,
        "debug" | "4" => Level::DEBUG,
        "trace" | "5" => Level::TRACE,
        _ => return None,
    };
    Some(Some(level))
}

/// Default recorder: one `tracing` event per wrap, target `bizcode`.
///
/// Fields: `key`, `correlation_id`, `origin`, `site`, `values`, `cause`.
/// When the code carries a span context, the event is emitted inside it.
/// The library never installs a subscriber; without one the events are
/// discarded by `tracing` itself.
#[derive(Debug, Clone, Default)]
pub struct LogRecorder {
    config: LogRecorderConfig,
}

impl LogRecorder {
    pub fn new(config: LogRecorderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogRecorderConfig {
        &self.config
    }

    /// Text logged for the cause, per `with_cause_chain`.
    pub fn render_cause(&self, cause: &(dyn Error + 'static)) -> String {
        if !self.config.with_cause_chain {
            return cause.to_string();
        }
        let mut out = String::new();
        for (i, err) in chain::iter(cause).enumerate() {
            if i > 0 {
                out.push_str(": ");
            }
            out.push_str(&err.to_string());
        }
        out
    }

    /// Text logged for the auxiliary values, per `with_values`.
    pub fn render_values(&self, values: &[&dyn fmt::Debug]) -> String {
        if self.config.with_values {
            format!("{:?}", values)
        } else {
            String::new()
        }
    }

    fn emit(&self, level: Level, event: &ErrorEvent<'_>) {
        let cause = self.render_cause(event.cause);
        let values = self.render_values(event.values);

        macro_rules! emit_at {
            ($mac:ident) => {
                tracing::$mac!(
                    target: "bizcode",
                    key = event.key,
                    correlation_id = %event.correlation_id,
                    origin = %event.origin,
                    site = %event.site,
                    values = %values,
                    cause = %cause,
                    "business error"
                )
            };
        }

        if level == Level::ERROR {
            emit_at!(error)
        } else if level == Level::WARN {
            emit_at!(warn)
        } else if level == Level::INFO {
            emit_at!(info)
        } else if level == Level::DEBUG {
            emit_at!(debug)
        } else {
            emit_at!(trace)
        }
    }
}

impl Recorder for LogRecorder {
    fn record(&self, event: &ErrorEvent<'_>) {
        let Some(level) = self.config.level else {
            return;
        };
        match event.context {
            Some(span) => span.in_scope(|| self.emit(level, event)),
            None => self.emit(level, event),
        }
    }
}

// ── Process-wide binding ──────────────────────────────────────────

static RECORDER: RwLock<Option<Arc<dyn Recorder>>> = RwLock::new(None);
static DEFAULT: OnceLock<Arc<dyn Recorder>> = OnceLock::new();

fn default_recorder() -> Arc<dyn Recorder> {
    DEFAULT
        .get_or_init(|| Arc::new(LogRecorder::default()))
        .clone()
}

/// Install `recorder` as the process-wide recorder.
pub fn set_recorder<R>(recorder: R)
where
    R: Recorder + 'static,
{
    set_recorder_arc(Arc::new(recorder));
}

/// Install an already-shared recorder as the process-wide recorder.
pub fn set_recorder_arc(recorder: Arc<dyn Recorder>) {
    let mut slot = RECORDER.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(recorder);
}

/// Restore the default [`LogRecorder`]. Returns the recorder that was
/// installed, if any.
pub fn reset_recorder() -> Option<Arc<dyn Recorder>> {
    let mut slot = RECORDER.write().unwrap_or_else(PoisonError::into_inner);
    slot.take()
}

/// The recorder `wrap` and `wrap_with` currently report to.
pub fn current() -> Arc<dyn Recorder> {
    let slot = RECORDER.read().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(recorder) => Arc::clone(recorder),
        None => default_recorder(),
    }
}
