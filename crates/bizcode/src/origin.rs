//! Call-site capture for the first wrap of a chain.
//!
//! An `Origin` is taken once per chain, at the deepest classified wrap,
//! and shared by every outer node through an `Arc`:
//!
//! ```text
//! inner.wrap(io_err)   ──► Origin::capture()  ──► Arc<Origin> ─┐
//! middle.wrap(inner)   ──► reuse ─────────────────────────────►├─ same allocation
//! outer.wrap(middle)   ──► reuse ─────────────────────────────►┘
//! ```
//!
//! Frame skipping is done with `#[track_caller]`: every wrapping entry
//! point is annotated, so the recorded location is the first frame outside
//! this crate.

use std::panic::Location;

cfg_if::cfg_if! {
    if #[cfg(feature = "backtrace")] {
        use std::backtrace::{Backtrace, BacktraceStatus};

        /// Captured stack, honouring `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
        struct Trace(Backtrace);

        impl Trace {
            fn capture() -> Self {
                Trace(Backtrace::capture())
            }

            fn is_captured(&self) -> bool {
                self.0.status() == BacktraceStatus::Captured
            }
        }

        impl core::fmt::Display for Trace {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    } else {
        struct Trace;

        impl Trace {
            #[inline]
            fn capture() -> Self {
                Trace
            }

            #[inline]
            fn is_captured(&self) -> bool {
                false
            }
        }

        impl core::fmt::Display for Trace {
            fn fmt(&self, _f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                Ok(())
            }
        }
    }
}

/// Where a chain was first classified.
pub struct Origin {
    location: &'static Location<'static>,
    trace: Trace,
}

impl Origin {
    /// Capture the location of the nearest caller that is not itself
    /// `#[track_caller]`. Cannot fail.
    ///
    /// ```
    /// use bizcode::Origin;
    /// let line = line!() + 1;
    /// let origin = Origin::capture();
    /// assert_eq!(origin.file(), file!());
    /// assert_eq!(origin.line(), line);
    /// ```
    #[track_caller]
    pub fn capture() -> Self {
        Self::at(Location::caller())
    }

    /// Build an origin for an already-known location.
    pub fn at(location: &'static Location<'static>) -> Self {
        Self {
            location,
            trace: Trace::capture(),
        }
    }

    #[inline]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    #[inline]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column()
    }

    /// True when a backtrace was captured (`backtrace` feature and
    /// backtraces enabled in the environment).
    #[inline]
    pub fn has_backtrace(&self) -> bool {
        self.trace.is_captured()
    }

    /// Write the captured backtrace, if any. Used by the verbose format.
    pub(crate) fn fmt_backtrace(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.trace.is_captured() {
            write!(f, "\n{}", self.trace)?;
        }
        Ok(())
    }
}

impl core::fmt::Display for Origin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.location.file(),
            self.location.line(),
            self.location.column()
        )
    }
}

impl core::fmt::Debug for Origin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Origin")
            .field("file", &self.file())
            .field("line", &self.line())
            .field("column", &self.column())
            .field("backtrace", &self.has_backtrace())
            .finish()
    }
}
