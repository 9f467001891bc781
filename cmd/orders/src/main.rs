//! Order-service walkthrough
//!
//! Declares a code tree, wraps a payment failure into an order failure,
//! and shows every way to render and match the resulting chain.
//!
//! # Environment Variables
//!
//! - `RUST_LOG=bizcode=debug` - Filter for the tracing subscriber (default `bizcode=info`)
//! - `BIZCODE_LOG_LEVEL=warn` - Level of wrap events (off, error, warn, info, debug, trace)
//! - `BIZCODE_CAUSE_CHAIN=1` - Log each cause with its full source chain

use std::io;

use bizcode::{chain, code_tree, init_module, match_code, set_recorder, wrap};
use bizcode::{Code, CodedError, CodedResult, LogRecorder, LogRecorderConfig, ResultExt};
use tracing_subscriber::{fmt, EnvFilter};

code_tree! {
    pub struct UserCodes {
        pub not_found: Code => key "notFound",
        pub invalid: Code => key "invalid",
    }

    pub struct PaymentCodes {
        pub failed: Code => key "failed",
        pub canceled: Code => key "canceled",
    }

    pub struct OrderCodes {
        pub not_found: Code => key "notFound",
        pub invalid: Code => key "invalid",
        pub payment: PaymentCodes => prefix "payment.",
    }

    pub struct AppCodes {
        pub common: Code => key "common",
        pub auth: Code => key "auth",
        pub user: UserCodes => prefix "user.",
        pub order: OrderCodes => prefix "order.",
    }
}

fn charge(codes: &AppCodes, order_id: &str) -> CodedResult<()> {
    let gateway = io::Error::new(io::ErrorKind::ConnectionRefused, "gateway unreachable");
    Err(wrap!(codes.order.payment.failed, gateway, "payment id", format!("P-{}", order_id)))
}

fn place_order(codes: &AppCodes, order_id: &str) -> CodedResult<()> {
    let _span = tracing::info_span!("place_order", order_id).entered();
    let order_invalid = codes.order.invalid.in_current_span();
    charge(codes, order_id).wrap_code_with(&order_invalid, &[&"order id", &order_id])
}

fn status_for(codes: &AppCodes, err: &CodedError) -> u16 {
    match_code!(err, {
        codes.user.not_found => 404,
        codes.order.payment.failed => 402,
        codes.order.invalid => 422,
        codes.auth => 401,
        _ => 500,
    })
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bizcode=info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = LogRecorderConfig::from_env();
    if let Err(msg) = config.validate() {
        tracing::warn!("recorder config: {}", msg);
    }
    set_recorder(LogRecorder::new(config));

    let mut codes = AppCodes::default();
    init_module("app.", &mut codes);

    println!("=== bizcode orders ===\n");
    println!("user.not_found   = {}", codes.user.not_found);
    println!("payment.failed   = {}", codes.order.payment.failed);

    let err = match place_order(&codes, "O-98765") {
        Ok(()) => return,
        Err(err) => err,
    };

    println!("\ncompact:   {}", err);
    println!("quoted:    {}", err.quoted());
    println!("verbose:   {:#}", err);
    println!("id:        {}", err.correlation_id());

    println!("\nchain:");
    for (depth, e) in chain::iter(&err).enumerate() {
        println!("  {}{}", "  ".repeat(depth), e);
    }

    println!("\nmatches:");
    for code in [
        &codes.order.invalid,
        &codes.order.payment.failed,
        &codes.order.payment.canceled,
        &codes.user.not_found,
    ] {
        println!("  {:<28} {}", code.key(), code.matches(&err));
    }

    println!("\nstatus:    {}", status_for(&codes, &err));

    let io_err: io::Error = err.into();
    println!("as io:     {:?} ({})", io_err.kind(), codes.order.invalid.matches(&io_err));

    // Nothing to wrap: no node, no event.
    if let Some(e) = codes.common.wrap_opt(None::<io::Error>) {
        println!("unexpected: {}", e);
    }
}
