//! Round-trip guarantees: the parsed term sequence reconstructs the input
//! byte-for-byte, however malformed, and re-parsing the reconstruction
//! reports the same diagnostics at the same positions.

use spf_toolchain_core::{Span, parse_record};

fn assert_roundtrip(input: &str) {
    let record = parse_record(input);
    assert_eq!(record.source(), input, "source() must reproduce the input");
}

#[test]
fn clean_record() {
    assert_roundtrip("v=spf1 mx a:example.com/24 ip4:192.0.2.0/24 -all");
}

#[test]
fn leading_and_trailing_spaces() {
    assert_roundtrip("  v=spf1  -all   ");
}

#[test]
fn malformed_soup() {
    assert_roundtrip("v=spf1  ip4:999.9/99 %%junk ??? a:x/007 redirect= 99bad");
}

#[test]
fn empty_and_blank_inputs() {
    assert_roundtrip("");
    assert_roundtrip(" ");
    assert_roundtrip("     ");
}

#[test]
fn wrong_version_and_junk() {
    assert_roundtrip("spf2.0/pra mx -all");
}

#[test]
fn non_ascii_tokens_survive() {
    assert_roundtrip("v=spf1 büg -all");
}

#[test]
fn every_term_text_matches_its_span() {
    let input = "v=spf1  a:x/33 foo=bar ??? ~all";
    let record = parse_record(input);
    for term in &record.terms {
        let Span { start, end } = term.span;
        assert_eq!(&input[start..end], term.text, "span/text mismatch");
    }
}

#[test]
fn reparse_reports_identical_diagnostics() {
    for input in [
        "v=spf1 ip4:banana/99 include 99bad",
        "v=spf2 all:x redirect=",
        "   ",
    ] {
        let first = parse_record(input);
        let second = parse_record(&first.source());
        let fingerprint = |r: &spf_toolchain_core::SpfRecord| {
            r.diagnostics()
                .map(|d| (d.id.to_string(), d.span))
                .collect::<Vec<_>>()
        };
        assert_eq!(fingerprint(&first), fingerprint(&second));
        assert_eq!(first.terms.len(), second.terms.len());
    }
}
