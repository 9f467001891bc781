use std::error::Error;
use std::fmt;
use std::io;

use crate::chain;
use crate::{Code, CodedError, CodedResult};

// ── Into<io::Error> ───────────────────────────────────────────────

impl From<CodedError> for io::Error {
    /// Convert a `CodedError` into an `io::Error`.
    ///
    /// The kind is taken from the first `io::Error` in the chain, or
    /// `Other` when there is none. The `CodedError` is kept whole as the
    /// custom payload, so codes still match through the result.
    fn from(err: CodedError) -> Self {
        let kind = chain::find::<io::Error>(&err)
            .map(io::Error::kind)
            .unwrap_or(io::ErrorKind::Other);
        io::Error::new(kind, err)
    }
}

// ── ResultExt: classify errors in place ───────────────────────────

/// Extension trait for wrapping the error of any `Result` with a [`Code`].
///
/// ```ignore
/// use bizcode::ResultExt;
///
/// let row = db.fetch(id).wrap_code(&CODES.user.not_found)?;
///
/// let order = repo.load(order_id)
///     .wrap_code_with(&CODES.order.invalid, &[&"order id", &order_id])?;
/// ```
///
/// `Ok` passes through untouched and records nothing. Like
/// [`Code::wrap`], the reported origin is the caller's line.
pub trait ResultExt<T> {
    /// Wrap `Err(e)` as `code.wrap(e)`.
    #[track_caller]
    fn wrap_code(self, code: &Code) -> CodedResult<T>;

    /// Wrap `Err(e)` as `code.wrap_with(e, values)`.
    #[track_caller]
    fn wrap_code_with(self, code: &Code, values: &[&dyn fmt::Debug]) -> CodedResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    #[track_caller]
    fn wrap_code(self, code: &Code) -> CodedResult<T> {
        // map_err would report the closure as the caller.
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(code.wrap_with(e, &[])),
        }
    }

    #[track_caller]
    fn wrap_code_with(self, code: &Code, values: &[&dyn fmt::Debug]) -> CodedResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(code.wrap_with(e, values)),
        }
    }
}
