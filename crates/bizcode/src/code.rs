use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::sync::Arc;

use tracing::Span;

use crate::chain;
use crate::recorder::{self, ErrorEvent, Recorder};
use crate::{CodedError, CorrelationId, Origin};

/// A business error code.
///
/// A code is an immutable label: its `key` is fixed by [`Code::new`] or by
/// the tree initializer, and never changes once the code is used to wrap.
/// Attaching a [`tracing::Span`] with [`with_context`](Code::with_context)
/// returns a new code; the span travels with wrap events but plays no part
/// in identity (`==`, `Hash` and [`matches`](Code::matches) compare keys
/// only).
///
/// ```
/// use std::io;
/// use bizcode::{Code, Discard};
///
/// const NOT_FOUND: Code = Code::new("user.not_found");
///
/// let err = NOT_FOUND.wrap_using(&Discard, io::Error::new(io::ErrorKind::NotFound, "no row"), &[]);
/// assert_eq!(err.to_string(), "user.not_found");
/// assert!(NOT_FOUND.matches(&err));
/// ```
#[derive(Clone, Default)]
pub struct Code {
    key: Cow<'static, str>,
    context: Option<Span>,
}

// ── Construction ──────────────────────────────────────────────────

impl Code {
    /// Construct a code with a static key.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
            context: None,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Used by the tree initializer.
    pub(crate) fn set_key(&mut self, key: String) {
        self.key = Cow::Owned(key);
    }

    /// The attached span, if any.
    #[inline]
    pub fn context(&self) -> Option<&Span> {
        self.context.as_ref()
    }

    /// Same key, with `span` attached. `self` is unchanged.
    pub fn with_context(&self, span: Span) -> Code {
        Code {
            key: self.key.clone(),
            context: Some(span),
        }
    }

    /// Same key, attached to the caller's current span.
    pub fn in_current_span(&self) -> Code {
        self.with_context(Span::current())
    }
}

impl From<&'static str> for Code {
    fn from(key: &'static str) -> Self {
        Code::new(key)
    }
}

impl From<String> for Code {
    fn from(key: String) -> Self {
        Code {
            key: Cow::Owned(key),
            context: None,
        }
    }
}

// ── Wrapping ──────────────────────────────────────────────────────

impl Code {
    /// Attach this code to `cause`, reporting to the process-wide recorder.
    ///
    /// If `cause`'s chain already holds a [`CodedError`], the new node
    /// inherits its correlation id and origin. Otherwise a fresh id is
    /// generated and the caller's location becomes the chain origin.
    #[track_caller]
    pub fn wrap<E>(&self, cause: E) -> CodedError
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        self.wrap_with(cause, &[])
    }

    /// [`wrap`](Code::wrap) with auxiliary values for the recorder.
    #[track_caller]
    pub fn wrap_with<E>(&self, cause: E, values: &[&dyn fmt::Debug]) -> CodedError
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        let recorder = recorder::current();
        self.wrap_using(&*recorder, cause, values)
    }

    /// [`wrap_with`](Code::wrap_with) reporting to an explicit recorder
    /// instead of the process-wide one.
    #[track_caller]
    pub fn wrap_using<E>(
        &self,
        recorder: &dyn Recorder,
        cause: E,
        values: &[&dyn fmt::Debug],
    ) -> CodedError
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        let site = Location::caller();
        let cause: Box<dyn Error + Send + Sync + 'static> = cause.into();

        let (correlation_id, origin) = match chain::find::<CodedError>(&*cause) {
            Some(inner) => (inner.correlation_id(), Arc::clone(inner.origin_arc())),
            None => (CorrelationId::new(), Arc::new(Origin::at(site))),
        };

        recorder.record(&ErrorEvent {
            key: &self.key,
            context: self.context.as_ref(),
            cause: &*cause,
            origin: &origin,
            site,
            values,
            correlation_id,
        });

        CodedError::new(self.key.clone(), cause, correlation_id, origin)
    }

    /// Wrap an optional cause. `None` yields `None` and records nothing.
    #[track_caller]
    pub fn wrap_opt<E>(&self, cause: Option<E>) -> Option<CodedError>
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        match cause {
            Some(cause) => Some(self.wrap_with(cause, &[])),
            None => None,
        }
    }
}

// ── Matching ──────────────────────────────────────────────────────

impl Code {
    /// True when any classified node in `err`'s chain carries this key.
    ///
    /// Starting from `err`, find the nearest [`CodedError`]. Same key:
    /// match. Different key: start again from that node's cause. No node
    /// left: no match. A closer node with another key therefore never
    /// hides a deeper match.
    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        let mut next = Some(err);
        while let Some(err) = next {
            let Some(node) = chain::find::<CodedError>(err) else {
                return false;
            };
            if node.key() == self.key() {
                return true;
            }
            next = node.source();
        }
        false
    }

    /// `Ok` never matches; `Err(e)` matches per [`matches`](Code::matches).
    pub fn matches_result<T, E>(&self, result: &Result<T, E>) -> bool
    where
        E: Error + 'static,
    {
        match result {
            Ok(_) => false,
            Err(err) => self.matches(err),
        }
    }
}

// ── Identity ──────────────────────────────────────────────────────

impl PartialEq for Code {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Code {}

impl Hash for Code {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(span) => f
                .debug_struct("Code")
                .field("key", &self.key())
                .field("context", span)
                .finish(),
            None => write!(f, "Code({:?})", self.key()),
        }
    }
}
