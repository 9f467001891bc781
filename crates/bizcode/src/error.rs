use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::chain;
use crate::CorrelationId;
use crate::Origin;

/// A wrapped error stamped with a business code key.
///
/// Produced only by [`Code::wrap`](crate::Code::wrap) and its variants.
/// Immutable once built. Owns its cause; the cause may itself be (or
/// contain) a `CodedError`, which is how chains are formed:
///
/// ```text
/// CodedError("order.invalid") ── source ──► CodedError("payment.failed") ── source ──► io::Error
///        │                                          │
///        └──── same correlation_id, same Arc<Origin> ┘
/// ```
///
/// # Formatting
///
/// | Form          | Output                                           |
/// |---------------|--------------------------------------------------|
/// | `{}`          | key                                              |
/// | `{:#}`        | key, origin, backtrace (`backtrace` feature)     |
/// | `.quoted()`   | key in double quotes                             |
/// | `{:?}`        | structured: key, correlation id, origin, cause   |
///
/// The cause's message is never part of `Display`; walk
/// [`source()`](Error::source) or use [`chain::iter`] for diagnostics.
pub struct CodedError {
    key: Cow<'static, str>,
    cause: Box<dyn Error + Send + Sync + 'static>,
    correlation_id: CorrelationId,
    origin: Arc<Origin>,
}

// ── Construction ──────────────────────────────────────────────────

impl CodedError {
    pub(crate) fn new(
        key: Cow<'static, str>,
        cause: Box<dyn Error + Send + Sync + 'static>,
        correlation_id: CorrelationId,
        origin: Arc<Origin>,
    ) -> Self {
        Self {
            key,
            cause,
            correlation_id,
            origin,
        }
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl CodedError {
    /// The key of the code that produced this node.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The wrapped error.
    #[inline]
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.cause
    }

    /// Correlation id shared by every node of this chain.
    #[inline]
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Where the chain was first classified.
    #[inline]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Shared handle to the chain origin.
    #[inline]
    pub fn origin_arc(&self) -> &Arc<Origin> {
        &self.origin
    }

    /// Consume this node and return the wrapped error.
    pub fn into_cause(self) -> Box<dyn Error + Send + Sync + 'static> {
        self.cause
    }

    /// Display adapter that renders the key in double quotes.
    ///
    /// ```
    /// use bizcode::{Code, Discard};
    /// let err = Code::new("user.not_found").wrap_using(&Discard, "no row", &[]);
    /// assert_eq!(err.quoted().to_string(), "\"user.not_found\"");
    /// ```
    pub fn quoted(&self) -> Quoted<'_> {
        Quoted(self)
    }
}

// ── Matching ──────────────────────────────────────────────────────

impl CodedError {
    /// Single-level match predicate.
    ///
    /// Finds the nearest `CodedError` in `target`'s own chain and compares
    /// keys. Does not look at `self`'s cause; [`chain::contains`] applies
    /// this at every level of a chain.
    pub fn is(&self, target: &(dyn Error + 'static)) -> bool {
        chain::find::<CodedError>(target).is_some_and(|t| t.key == self.key)
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for CodedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.cause as &(dyn Error + 'static))
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        if f.alternate() {
            write!(f, "\n    at {}", self.origin)?;
            self.origin.fmt_backtrace(f)?;
        }
        Ok(())
    }
}

/// Quoted display form of a [`CodedError`]; see [`CodedError::quoted`].
pub struct Quoted<'a>(&'a CodedError);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.key())
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodedError")
            .field("key", &self.key())
            .field("correlation_id", &self.correlation_id)
            .field("origin", &format_args!("{}", self.origin))
            .field("cause", &self.cause)
            .finish()
    }
}
