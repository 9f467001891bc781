//! Generic walks over `std::error::Error::source()` chains.
//!
//! Every lookup in this crate reduces to [`find_node`]: walk the chain one
//! `source()` at a time, downcast each level, test a predicate. These
//! functions work on any `&dyn Error`, so code that never names
//! [`Code`](crate::Code) can still find classified errors anywhere in a
//! chain.

use std::error::Error;
use std::io;

use crate::CodedError;

/// Iterator over an error and all of its transitive sources.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match io_payload(current) {
            Some(node) => Some(node),
            None => current.source(),
        };
        Some(current)
    }
}

/// `io::Error::source` skips its custom payload; a classified payload is
/// stepped into so that converted errors keep their codes visible.
fn io_payload<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
    let inner = err.downcast_ref::<io::Error>()?.get_ref()?;
    if inner.is::<CodedError>() {
        Some(inner as &(dyn Error + 'static))
    } else {
        None
    }
}

/// Iterate `err` followed by each of its sources, outermost first.
pub fn iter<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Nearest error of type `T` in the chain, starting with `err` itself.
///
/// ```
/// use std::io;
/// use bizcode::{chain, Code, CodedError, Discard};
///
/// let code = Code::new("storage");
/// let err = code.wrap_using(&Discard, io::Error::new(io::ErrorKind::Other, "disk"), &[]);
///
/// assert!(chain::find::<io::Error>(&err).is_some());
/// assert_eq!(chain::find::<CodedError>(&err).map(|n| n.key()), Some("storage"));
/// ```
pub fn find<'a, T>(err: &'a (dyn Error + 'static)) -> Option<&'a T>
where
    T: Error + 'static,
{
    iter(err).find_map(|e| e.downcast_ref::<T>())
}

/// Nearest classified node in the chain accepted by `predicate`.
pub fn find_node<'a, P>(err: &'a (dyn Error + 'static), mut predicate: P) -> Option<&'a CodedError>
where
    P: FnMut(&CodedError) -> bool,
{
    iter(err)
        .filter_map(|e| e.downcast_ref::<CodedError>())
        .find(|node| predicate(node))
}

/// Every classified node in the chain, outermost first.
pub fn nodes<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a CodedError> + 'a {
    iter(err).filter_map(|e| e.downcast_ref::<CodedError>())
}

/// True when some level of `err`'s chain is `target` itself, or is a
/// classified node that [`CodedError::is`] `target`.
pub fn contains(err: &(dyn Error + 'static), target: &(dyn Error + 'static)) -> bool {
    iter(err).any(|e| {
        same_object(e, target)
            || e.downcast_ref::<CodedError>()
                .is_some_and(|node| node.is(target))
    })
}

/// Deepest error in the chain (the original cause).
pub fn root<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    iter(err).last().unwrap_or(err)
}

#[inline]
fn same_object(a: &(dyn Error + 'static), b: &(dyn Error + 'static)) -> bool {
    core::ptr::eq(
        a as *const dyn Error as *const (),
        b as *const dyn Error as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Code, Discard};
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct Context {
        msg: &'static str,
        source: Box<dyn Error + Send + Sync>,
    }

    impl fmt::Display for Context {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl Error for Context {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&*self.source as &(dyn Error + 'static))
        }
    }

    fn base() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "row missing")
    }

    #[test]
    fn iter_walks_outermost_first() {
        let inner = Code::new("inner").wrap_using(&Discard, base(), &[]);
        let outer = Code::new("outer").wrap_using(&Discard, inner, &[]);
        let rendered: Vec<String> = iter(&outer).map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["outer", "inner", "row missing"]);
    }

    #[test]
    fn find_by_type() {
        let err = Code::new("db").wrap_using(&Discard, base(), &[]);
        let io_err = find::<io::Error>(&err);
        assert_eq!(io_err.map(|e| e.kind()), Some(io::ErrorKind::NotFound));
        assert!(find::<fmt::Error>(&err).is_none());
    }

    #[test]
    fn find_node_through_foreign_wrapper() {
        let node = Code::new("db").wrap_using(&Discard, base(), &[]);
        let wrapped = Context { msg: "loading user", source: Box::new(node) };
        let found = find_node(&wrapped, |n| n.key() == "db");
        assert_eq!(found.map(|n| n.key()), Some("db"));
        assert!(find_node(&wrapped, |n| n.key() == "cache").is_none());
    }

    #[test]
    fn nodes_lists_every_classified_level() {
        let a = Code::new("a").wrap_using(&Discard, base(), &[]);
        let b = Context { msg: "ctx", source: Box::new(a) };
        let c = Code::new("c").wrap_using(&Discard, b, &[]);
        let keys: Vec<&str> = nodes(&c).map(|n| n.key()).collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn contains_at_any_depth() {
        let inner = Code::new("inner").wrap_using(&Discard, base(), &[]);
        let middle = Code::new("middle").wrap_using(&Discard, inner, &[]);
        let outer = Code::new("outer").wrap_using(&Discard, middle, &[]);

        for key in ["outer", "middle", "inner"] {
            let target = Code::from(key.to_string()).wrap_using(&Discard, "target", &[]);
            assert!(contains(&outer, &target), "should find {}", key);
        }
        let missing = Code::new("nonexist").wrap_using(&Discard, "target", &[]);
        assert!(!contains(&outer, &missing));
    }

    #[test]
    fn contains_identity() {
        let err = base();
        assert!(contains(&err, &err));
        let other = base();
        assert!(!contains(&err, &other));
    }

    #[test]
    fn root_is_deepest() {
        let inner = Code::new("inner").wrap_using(&Discard, base(), &[]);
        let outer = Code::new("outer").wrap_using(&Discard, inner, &[]);
        assert_eq!(root(&outer).to_string(), "row missing");
        let plain = base();
        assert_eq!(root(&plain).to_string(), "row missing");
    }

    #[test]
    fn steps_into_classified_io_payload() {
        let node = Code::new("io.wrapped").wrap_using(&Discard, base(), &[]);
        let io_err = io::Error::new(io::ErrorKind::NotFound, node);
        let keys: Vec<&str> = nodes(&io_err).map(|n| n.key()).collect();
        assert_eq!(keys, vec!["io.wrapped"]);
        assert_eq!(root(&io_err).to_string(), "row missing");
    }
}
