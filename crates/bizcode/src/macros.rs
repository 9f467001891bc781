/// Declare one or more code trees.
///
/// Each field may carry a tag after `=>`:
///
/// | Tag               | Field type      | Effect at initialization            |
/// |-------------------|-----------------|-------------------------------------|
/// | `key "k"`         | `Code`          | key becomes `prefix + "k"`          |
/// | `prefix "p"`      | a code tree     | walked with `prefix + "p"`          |
/// | `tree`            | a code tree     | walked with `prefix` unchanged      |
/// | (none)            | anything        | ignored                             |
///
/// An untagged field is never descended into, even when its type is a
/// code tree: its codes keep empty keys. Write `=> tree` to walk a nested
/// tree with the prefix unchanged.
///
/// The macro emits each struct with `#[derive(Clone, Debug, Default)]`
/// plus its [`CodeTree`](crate::CodeTree) impl, so every field type must
/// implement those three traits.
///
/// ```
/// use bizcode::{code_tree, init_module, Code};
///
/// code_tree! {
///     pub struct PaymentCodes {
///         pub failed: Code => key "failed",
///         pub canceled: Code => key "canceled",
///     }
///
///     pub struct OrderCodes {
///         pub not_found: Code => key "notFound",
///         pub payment: PaymentCodes => prefix "payment",
///     }
///
///     pub struct AppCodes {
///         pub common: Code => key "common",
///         pub order: OrderCodes => prefix "order",
///         /// Not a code; left alone.
///         pub max_retries: u32,
///     }
/// }
///
/// let mut codes = AppCodes::default();
/// init_module("app", &mut codes);
/// assert_eq!(codes.common.key(), "appcommon");
/// assert_eq!(codes.order.not_found.key(), "appordernotFound");
/// assert_eq!(codes.order.payment.failed.key(), "apporderpaymentfailed");
/// ```
#[macro_export]
macro_rules! code_tree {
    ($(
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(=> $kind:ident $($tag:literal)?)?
            ),* $(,)?
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::CodeTree for $name {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                ::std::vec![
                    $( $crate::__code_tree_field!(&mut self.$field, $field $(, $kind $($tag)?)?) ),*
                ]
            }
        }
    )*};
}

/// Internal helper for code_tree!: one `Field` per declared field.
#[doc(hidden)]
#[macro_export]
macro_rules! __code_tree_field {
    ($slot:expr, $field:ident) => {
        $crate::Field::Other { name: ::core::stringify!($field) }
    };

    ($slot:expr, $field:ident, key $key:literal) => {
        $crate::Field::Code {
            name: ::core::stringify!($field),
            key: ::core::option::Option::Some($key),
            code: $slot,
        }
    };

    ($slot:expr, $field:ident, prefix $prefix:literal) => {
        $crate::Field::Tree {
            name: ::core::stringify!($field),
            prefix: ::core::option::Option::Some($prefix),
            tree: $slot,
        }
    };

    ($slot:expr, $field:ident, tree) => {
        $crate::Field::Tree {
            name: ::core::stringify!($field),
            prefix: ::core::option::Option::None,
            tree: $slot,
        }
    };
}

/// Wrap with auxiliary values, reporting to the process-wide recorder.
///
/// ```ignore
/// // Same as CODES.user.not_found.wrap(err):
/// return Err(wrap!(CODES.user.not_found, err));
///
/// // Values go to the recorder as `&dyn Debug`:
/// return Err(wrap!(CODES.order.invalid, err, "order id", order_id));
/// ```
///
/// The chain origin is the line of the `wrap!` invocation.
#[macro_export]
macro_rules! wrap {
    ($code:expr, $cause:expr $(,)?) => {
        $code.wrap($cause)
    };

    ($code:expr, $cause:expr, $($value:expr),+ $(,)?) => {
        $code.wrap_with($cause, &[$( &$value as &dyn ::core::fmt::Debug ),+])
    };
}

/// Pick the first arm whose code matches anywhere in an error chain.
///
/// ```ignore
/// let status = match_code!(&err, {
///     CODES.user.not_found => 404,
///     CODES.order.invalid  => 422,
///     _                    => 500,
/// });
/// ```
///
/// Arms are tried top to bottom with [`Code::matches`](crate::Code::matches),
/// so a deeper match in an earlier arm wins over a shallower match in a
/// later one. The `_` arm is required and must come last.
#[macro_export]
macro_rules! match_code {
    ($error:expr, {
        $($arms:tt)*
    }) => {{
        let __e: &(dyn ::std::error::Error + 'static) = $error;
        $crate::__match_code_arms!(__e; $($arms)*)
    }};
}

/// Internal helper for match_code!: peels one arm at a time.
#[doc(hidden)]
#[macro_export]
macro_rules! __match_code_arms {
    // Fallback arm
    ($e:ident; _ => $handler:expr $(,)?) => {
        $handler
    };

    ($e:ident; $code:expr => $handler:expr, $($rest:tt)+) => {
        if $code.matches($e) {
            $handler
        } else {
            $crate::__match_code_arms!($e; $($rest)+)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{init_module, Code, CodeTree, CodedError, Discard, Field};
    use std::io;

    code_tree! {
        /// Leaf level.
        pub struct PaymentCodes {
            pub failed: Code => key "failed",
            pub canceled: Code => key "canceled",
        }

        pub struct UserCodes {
            pub not_found: Code => key "notFound",
            pub invalid: Code => key "invalid",
        }

        pub struct OrderCodes {
            pub not_found: Code => key "notFound",
            pub invalid: Code => key "invalid",
            pub payment: PaymentCodes => prefix "payment",
        }

        pub struct SharedCodes {
            pub timeout: Code => key "timeout",
        }

        pub struct TestCodes {
            pub common: Code => key "common",
            pub auth: Code => key "auth",
            pub user: UserCodes => prefix "user",
            pub order: OrderCodes => prefix "order",
            pub shared: SharedCodes => tree,
            pub spare: Code,
            pub label: String,
        }
    }

    fn codes() -> TestCodes {
        let mut codes = TestCodes::default();
        init_module("app", &mut codes);
        codes
    }

    fn base() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "assert.AnError general error for testing")
    }

    #[test]
    fn code_tree_keys() {
        let codes = codes();
        assert_eq!(codes.common.key(), "appcommon");
        assert_eq!(codes.auth.key(), "appauth");
        assert_eq!(codes.user.not_found.key(), "appusernotFound");
        assert_eq!(codes.user.invalid.key(), "appuserinvalid");
        assert_eq!(codes.order.not_found.key(), "appordernotFound");
        assert_eq!(codes.order.invalid.key(), "apporderinvalid");
        assert_eq!(codes.order.payment.failed.key(), "apporderpaymentfailed");
        assert_eq!(codes.order.payment.canceled.key(), "apporderpaymentcanceled");
        assert_eq!(codes.shared.timeout.key(), "apptimeout");
    }

    #[test]
    fn code_tree_ignores_untagged() {
        let codes = codes();
        assert_eq!(codes.spare.key(), "");
        assert_eq!(codes.label, "");
    }

    code_tree! {
        struct Mixed {
            walked: SharedCodes => tree,
            skipped: SharedCodes,
        }
    }

    #[test]
    fn code_tree_untagged_subtree_is_skipped() {
        let mut mixed = Mixed::default();
        init_module("m.", &mut mixed);
        assert_eq!(mixed.walked.timeout.key(), "m.timeout");
        assert_eq!(mixed.skipped.timeout.key(), "");
    }

    #[test]
    fn code_tree_field_order() {
        let mut codes = TestCodes::default();
        let names: Vec<&str> = codes.fields().iter().map(Field::name).collect();
        assert_eq!(
            names,
            vec!["common", "auth", "user", "order", "shared", "spare", "label"]
        );
    }

    #[test]
    fn wrap_and_match_through_tree() {
        let codes = codes();
        let err = codes.user.not_found.wrap_using(&Discard, base(), &[&"user id", &12345]);
        assert!(codes.user.not_found.matches(&err));
        assert!(!codes.user.invalid.matches(&err));
    }

    #[test]
    fn nested_wrap_through_tree() {
        let codes = codes();
        let payment = codes.order.payment.failed.wrap_using(&Discard, base(), &[&"payment id", &"P12345"]);
        let order = codes.order.invalid.wrap_using(&Discard, payment, &[&"order id", &"O98765"]);

        assert!(codes.order.invalid.matches(&order));
        assert!(codes.order.payment.failed.matches(&order));
        assert!(!codes.user.not_found.matches(&order));
    }

    #[test]
    fn same_suffix_different_prefix_do_not_collide() {
        let codes = codes();
        let err = codes.user.not_found.wrap_using(&Discard, base(), &[]);
        assert!(!codes.order.not_found.matches(&err));
    }

    #[test]
    fn wrap_macro_forms() {
        let code = Code::new("macro");
        let line = line!() + 1;
        let plain: CodedError = wrap!(code, base());
        assert_eq!(plain.key(), "macro");
        assert_eq!(plain.origin().line(), line);

        let with_values: CodedError = wrap!(code, base(), "id", 7, vec![1, 2]);
        assert_eq!(with_values.key(), "macro");
    }

    #[test]
    fn match_code_picks_first_matching_arm() {
        let codes = codes();
        let payment = codes.order.payment.failed.wrap_using(&Discard, base(), &[]);
        let order = codes.order.invalid.wrap_using(&Discard, payment, &[]);

        let status = match_code!(&order, {
            codes.user.not_found => 404,
            codes.order.payment.failed => 402,
            codes.order.invalid => 422,
            _ => 500,
        });
        assert_eq!(status, 402);

        let plain = base();
        let status = match_code!(&plain, {
            codes.order.invalid => 422,
            _ => 500,
        });
        assert_eq!(status, 500);
    }

    #[test]
    fn match_code_fallback_only() {
        let err = base();
        let hit = match_code!(&err, { _ => "fallback" });
        assert_eq!(hit, "fallback");
    }
}
