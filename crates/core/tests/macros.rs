//! Integration tests for the macro-string expander.

mod common;

use common::{ids, request_context, request_context_with_trail};
use spf_toolchain_core::{Span, codes, expand_macro_string};

#[test]
fn sender_letters() {
    let ctx = request_context();
    assert_eq!(
        expand_macro_string(&ctx, "%{s}").expanded,
        "strong-bad@email.example.com"
    );
    assert_eq!(expand_macro_string(&ctx, "%{l}").expanded, "strong-bad");
    assert_eq!(
        expand_macro_string(&ctx, "%{o}").expanded,
        "email.example.com"
    );
    assert_eq!(expand_macro_string(&ctx, "%{i}").expanded, "192.0.2.3");
    assert_eq!(expand_macro_string(&ctx, "%{v}").expanded, "in-addr");
}

#[test]
fn requester_letters() {
    let ctx = request_context();
    assert_eq!(expand_macro_string(&ctx, "%{c}").expanded, "203.0.113.1");
    assert_eq!(
        expand_macro_string(&ctx, "%{r}").expanded,
        "mta.example.org"
    );
}

#[test]
fn timestamp_letter_is_numeric() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{t}");
    assert!(!out.expanded.is_empty());
    assert!(out.expanded.bytes().all(|b| b.is_ascii_digit()));
}

#[test]
fn domain_falls_back_to_the_sender() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{d}");
    assert_eq!(out.expanded, "email.example.com");
    assert!(out.diagnostics.is_empty());
    assert!(!out.error_is_fatal);
}

#[test]
fn domain_follows_the_requested_trail() {
    let ctx = request_context_with_trail();
    assert_eq!(
        expand_macro_string(&ctx, "%{d}").expanded,
        "mail.example.com"
    );
}

#[test]
fn truncation_keeps_the_last_labels() {
    let ctx = request_context_with_trail();
    assert_eq!(expand_macro_string(&ctx, "%{d2}").expanded, "example.com");
}

#[test]
fn reversal() {
    let ctx = request_context_with_trail();
    assert_eq!(
        expand_macro_string(&ctx, "%{dr}").expanded,
        "com.example.mail"
    );
}

#[test]
fn reversal_then_truncation() {
    let ctx = request_context_with_trail();
    assert_eq!(expand_macro_string(&ctx, "%{d2r}").expanded, "example.mail");
}

#[test]
fn zero_truncation_yields_the_empty_string() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{d0}");
    assert_eq!(out.expanded, "");
    assert!(out.diagnostics.is_empty());
}

#[test]
fn custom_delimiter_without_transform_normalizes_to_dots() {
    let ctx = request_context();
    assert_eq!(expand_macro_string(&ctx, "%{l-}").expanded, "strong.bad");
}

#[test]
fn mixed_literals_and_macros() {
    let ctx = request_context_with_trail();
    let out = expand_macro_string(&ctx, "%{i}.sbl.%{d2}");
    assert_eq!(out.expanded, "192.0.2.3.sbl.example.com");
    assert!(out.diagnostics.is_empty());
    assert!(!out.error_is_fatal);
}

#[test]
fn escape_sequences() {
    let ctx = request_context();
    assert_eq!(expand_macro_string(&ctx, "a%%b").expanded, "a%b");
    assert_eq!(expand_macro_string(&ctx, "a%_b").expanded, "a b");
    assert_eq!(expand_macro_string(&ctx, "a%-b").expanded, "a%20b");
    assert!(expand_macro_string(&ctx, "a%%b").diagnostics.is_empty());
}

#[test]
fn trailing_percent_is_kept() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "abc%");
    assert_eq!(out.expanded, "abc%");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_TRAILING_PERCENT]);
    assert!(!out.error_is_fatal);
}

#[test]
fn unknown_special_escape_is_fatal() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%q");
    assert_eq!(out.expanded, "%q");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_UNKNOWN_SPECIAL]);
    assert!(out.error_is_fatal);
}

#[test]
fn empty_braces_are_fatal() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{}");
    assert_eq!(out.expanded, "%{}");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_EMPTY_EXPAND]);
    assert!(out.error_is_fatal);
}

#[test]
fn unknown_letter_substitutes_verbatim() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "x.%{q}.y");
    assert_eq!(out.expanded, "x.%{q}.y");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_UNKNOWN_LETTER]);
    assert!(out.error_is_fatal);
}

#[test]
fn unterminated_brace() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{s");
    assert_eq!(out.expanded, "%{s");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_UNKNOWN_SPECIAL]);
    assert!(out.error_is_fatal);
}

#[test]
fn swapped_transformer_recovers_but_is_fatal() {
    let ctx = request_context_with_trail();
    let out = expand_macro_string(&ctx, "%{dr2}");
    // Same result as the well-formed %{d2r}, flagged as untrustworthy.
    assert_eq!(out.expanded, "example.mail");
    assert_eq!(
        ids(&out.diagnostics),
        vec![codes::MACRO_SWAPPED_TRANSFORMER]
    );
    assert!(out.error_is_fatal);
}

#[test]
fn unknown_transformer_command() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{d2x}");
    assert_eq!(out.expanded, "%{d2x}");
    assert_eq!(
        ids(&out.diagnostics),
        vec![codes::MACRO_INVALID_TRANSFORMER_COMMAND]
    );
    assert!(out.error_is_fatal);
}

#[test]
fn unintelligible_transformer_substitutes_verbatim() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{d2r3}");
    assert_eq!(out.expanded, "%{d2r3}");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_INVALID_TRANSFORMER]);
    assert!(out.error_is_fatal);
}

#[test]
fn invalid_delimiter_is_cosmetic() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{o*}");
    assert_eq!(out.expanded, "email.example.com");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_INVALID_DELIMITER]);
    assert!(!out.error_is_fatal);
}

#[test]
fn non_printable_literal_is_cosmetic() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "a b");
    assert_eq!(out.expanded, "a b");
    assert_eq!(ids(&out.diagnostics), vec![codes::MACRO_INVALID_LITERAL]);
    assert_eq!(out.diagnostics[0].span, Some(Span::new(0, 3)));
    assert!(!out.error_is_fatal);
}

#[test]
fn errors_accumulate_across_one_expansion() {
    let ctx = request_context();
    let out = expand_macro_string(&ctx, "%{q} %j");
    assert_eq!(out.expanded, "%{q} %j");
    assert_eq!(
        ids(&out.diagnostics),
        vec![
            codes::MACRO_UNKNOWN_LETTER,
            codes::MACRO_INVALID_LITERAL,
            codes::MACRO_UNKNOWN_SPECIAL
        ]
    );
    assert!(out.error_is_fatal);
}
