//! Hierarchical key assignment for trees of codes.
//!
//! A code tree is a struct whose fields are codes, nested code trees, or
//! anything else. [`CodeTree::fields`] describes the shape of one level;
//! [`init_module`] walks it and assigns `prefix + tag` to every tagged
//! code, extending the prefix at every tagged subtree:
//!
//! ```text
//! init_module("app", &mut codes)
//!   common           key "common"      → "appcommon"
//!   user             prefix "user"
//!     not_found      key "notFound"    → "appusernotFound"
//!   order            prefix "order"
//!     payment        prefix "payment"
//!       failed       key "failed"      → "apporderpaymentfailed"
//!   shared           (no prefix)
//!     timeout        key "timeout"     → "apptimeout"
//! ```
//!
//! Most trees are declared with [`code_tree!`](crate::code_tree), which
//! writes the [`CodeTree`] impl. Hand-written impls work the same way.

use std::borrow::Cow;

use crate::Code;

/// One field of a code tree, as seen by the initializer.
pub enum Field<'a> {
    /// A code. Assigned `prefix + key` when `key` is a non-empty tag.
    Code {
        name: &'static str,
        key: Option<&'static str>,
        code: &'a mut Code,
    },
    /// A nested tree. Walked with `prefix + prefix-tag` (or `prefix` when
    /// untagged).
    Tree {
        name: &'static str,
        prefix: Option<&'static str>,
        tree: &'a mut dyn CodeTree,
    },
    /// Anything else. Ignored.
    Other { name: &'static str },
}

impl Field<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Code { name, .. } | Field::Tree { name, .. } | Field::Other { name } => *name,
        }
    }
}

/// Shape of a struct holding codes: its fields in declaration order.
///
/// ```
/// use bizcode::{Code, CodeTree, Field};
///
/// #[derive(Default)]
/// struct Auth {
///     denied: Code,
///     expired: Code,
/// }
///
/// impl CodeTree for Auth {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![
///             Field::Code { name: "denied", key: Some("denied"), code: &mut self.denied },
///             Field::Code { name: "expired", key: Some("expired"), code: &mut self.expired },
///         ]
///     }
/// }
///
/// let mut auth = Auth::default();
/// auth.init_codes("auth.");
/// assert_eq!(auth.denied.key(), "auth.denied");
/// assert_eq!(auth.expired.key(), "auth.expired");
/// ```
pub trait CodeTree {
    fn fields(&mut self) -> Vec<Field<'_>>;

    /// Assign keys to every tagged code below `self`.
    fn init_codes(&mut self, prefix: &str) {
        init_module(prefix, self);
    }
}

/// An absent subtree has no fields.
impl<T: CodeTree> CodeTree for Option<T> {
    fn fields(&mut self) -> Vec<Field<'_>> {
        match self {
            Some(tree) => vec![Field::Tree {
                name: "",
                prefix: None,
                tree,
            }],
            None => Vec::new(),
        }
    }
}

/// Assign keys to every tagged code in `target`.
///
/// An optional tree is a tree too: `&mut None::<Codes>` is a no-op.
/// Never fails: untagged codes, fields of other types and absent
/// subtrees are left as they are.
pub fn init_module<T>(prefix: &str, target: &mut T)
where
    T: CodeTree + ?Sized,
{
    assign(prefix, target.fields());
}

fn assign(prefix: &str, fields: Vec<Field<'_>>) {
    for field in fields {
        match field {
            Field::Code { key: Some(key), code, .. } if !key.is_empty() => {
                code.set_key(format!("{}{}", prefix, key));
            }
            Field::Tree { prefix: tag, tree, .. } => {
                let child: Cow<'_, str> = match tag {
                    Some(tag) if !tag.is_empty() => Cow::Owned(format!("{}{}", prefix, tag)),
                    _ => Cow::Borrowed(prefix),
                };
                assign(&child, tree.fields());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Payment {
        failed: Code,
        canceled: Code,
    }

    impl CodeTree for Payment {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::Code { name: "failed", key: Some("failed"), code: &mut self.failed },
                Field::Code { name: "canceled", key: Some("canceled"), code: &mut self.canceled },
            ]
        }
    }

    #[derive(Default)]
    struct Order {
        not_found: Code,
        payment: Payment,
        untagged: Code,
        retries: u32,
    }

    impl CodeTree for Order {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::Code { name: "not_found", key: Some("notFound"), code: &mut self.not_found },
                Field::Tree { name: "payment", prefix: Some("payment"), tree: &mut self.payment },
                Field::Code { name: "untagged", key: None, code: &mut self.untagged },
                Field::Other { name: "retries" },
            ]
        }
    }

    #[test]
    fn nested_prefixes_compose() {
        let mut order = Order::default();
        init_module("apporder", &mut order);
        assert_eq!(order.not_found.key(), "appordernotFound");
        assert_eq!(order.payment.failed.key(), "apporderpaymentfailed");
        assert_eq!(order.payment.canceled.key(), "apporderpaymentcanceled");
    }

    #[test]
    fn untagged_and_other_fields_untouched() {
        let mut order = Order { retries: 3, ..Default::default() };
        order.init_codes("x");
        assert_eq!(order.untagged.key(), "");
        assert_eq!(order.retries, 3);
    }

    #[test]
    fn none_target_is_noop() {
        init_module("prefix_", &mut None::<Order>);
        init_module("prefix_", &mut None::<Payment>);
    }

    #[test]
    fn optional_tree_at_top_level() {
        let mut opt: Option<Payment> = Some(Payment::default());
        init_module("x.", &mut opt);
        assert_eq!(opt.as_ref().map(|p| p.canceled.key()), Some("x.canceled"));

        let mut opt: Option<Payment> = None;
        init_module("x.", &mut opt);
        assert!(opt.is_none());
    }

    #[test]
    fn dyn_target() {
        let mut payment = Payment::default();
        let tree: &mut dyn CodeTree = &mut payment;
        init_module("dyn.", tree);
        assert_eq!(payment.failed.key(), "dyn.failed");
    }

    #[test]
    fn empty_tags_behave_as_untagged() {
        struct Blank {
            code: Code,
            inner: Payment,
        }
        impl CodeTree for Blank {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![
                    Field::Code { name: "code", key: Some(""), code: &mut self.code },
                    Field::Tree { name: "inner", prefix: Some(""), tree: &mut self.inner },
                ]
            }
        }
        let mut blank = Blank { code: Code::new("keep"), inner: Payment::default() };
        blank.init_codes("p.");
        assert_eq!(blank.code.key(), "keep");
        assert_eq!(blank.inner.failed.key(), "p.failed");
    }

    #[test]
    fn optional_subtree() {
        let mut present: Option<Payment> = Some(Payment::default());
        present.init_codes("opt.");
        assert_eq!(present.as_ref().map(|p| p.failed.key()), Some("opt.failed"));

        let mut absent: Option<Payment> = None;
        absent.init_codes("opt.");
        assert!(absent.is_none());
    }

    #[test]
    fn reinitialization_overwrites() {
        let mut payment = Payment::default();
        payment.init_codes("a.");
        payment.init_codes("b.");
        assert_eq!(payment.failed.key(), "b.failed");
    }

    #[test]
    fn field_names() {
        let mut order = Order::default();
        let names: Vec<&str> = order.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["not_found", "payment", "untagged", "retries"]);
    }
}
