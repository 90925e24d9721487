//! cidr-length sub-grammar: `/<n>`, and the dual form `/<n>/<m>`.
//!
//! The parser never aborts: every entry point returns a [`CidrLengths`]
//! holding a best-effort value per requested address family plus an ordered
//! diagnostic list. Malformed input resynchronizes (missing `/` resumes at
//! the next digit, invalid character runs are skipped) so one mistake never
//! hides the rest of the suffix.

use serde::{Deserialize, Serialize};

use super::cursor::CursorStr;
use super::diag::{Diagnostic, Span, codes};
use super::ctx;

const IP4_KIND: &str = "ip4-cidr-length";
const IP6_KIND: &str = "ip6-cidr-length";
const DUAL_KIND: &str = "dual-cidr-length";

/// Parsed cidr-lengths: the `/n` (and `/n/m`) suffix a mechanism may carry.
///
/// A field is populated only when that address family was requested from the
/// parser. An out-of-range value is recorded in its diagnostic but the field
/// itself is clamped to the family bound, so consumers always see a usable
/// prefix length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrLengths {
    /// IPv4 prefix length, clamped to `[0, 32]`.
    pub ip4: Option<u8>,
    /// IPv6 prefix length, clamped to `[0, 128]`.
    pub ip6: Option<u8>,
    /// Everything that went wrong while parsing, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse an IPv4 cidr-length (`/24`).
pub fn parse_ip4_cidr(input: &str) -> CidrLengths {
    CidrParser::IP4.parse(input)
}

/// Parse an IPv6 cidr-length (`/64`).
pub fn parse_ip6_cidr(input: &str) -> CidrLengths {
    CidrParser::IP6.parse(input)
}

/// Parse a dual cidr-length (`/24`, `/24/64`, or `//64`).
pub fn parse_dual_cidr(input: &str) -> CidrLengths {
    CidrParser::DUAL.parse(input)
}

/// Family selection for one cidr-length parse.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CidrParser {
    ip4: bool,
    ip6: bool,
}

/// A half of the grammar: the raw digits and their location, if any matched.
struct Half {
    value: Option<u64>,
    digits: Option<Span>,
}

impl Half {
    const NONE: Self = Self {
        value: None,
        digits: None,
    };
}

impl CidrParser {
    pub(crate) const IP4: Self = Self {
        ip4: true,
        ip6: false,
    };
    pub(crate) const IP6: Self = Self {
        ip4: false,
        ip6: true,
    };
    pub(crate) const DUAL: Self = Self {
        ip4: true,
        ip6: true,
    };

    /// Parse `input` as spans relative to `input` itself.
    pub(crate) fn parse(self, input: &str) -> CidrLengths {
        let mut view = CursorStr::new(input);
        let mut out = CidrLengths::default();

        if self.ip4 {
            let kind = if self.ip6 { DUAL_KIND } else { IP4_KIND };
            let half = parse_half(kind, &mut view, self.ip6, &mut out.diagnostics);
            out.ip4 = clamp_family(IP4_KIND, &half, 32, &mut out.diagnostics);

            if view.is_empty() {
                return out;
            }
            if !self.ip6 {
                out.diagnostics.push(junked_end(IP4_KIND, &view));
                return out;
            }
            if view.first() != Some(b'/') {
                // The separator between the halves is structurally distinct
                // from the leading slash, hence its own diagnostic kind.
                let found = view.rest().chars().next().unwrap_or(' ');
                out.diagnostics.push(
                    Diagnostic::error(
                        codes::CIDR_INVALID_DUAL_SEPARATOR,
                        format!("expected '/' before the ip6 half, found '{found}'"),
                        Some(Span::new(view.offset(), view.offset() + found.len_utf8())),
                    )
                    .with_context(ctx!("kind" => DUAL_KIND, "found" => found.to_string())),
                );
                return out;
            }
            // Leave the '/' in place: the ip6 half consumes it as its lead.
        }

        if self.ip6 {
            let half = parse_half(IP6_KIND, &mut view, false, &mut out.diagnostics);
            out.ip6 = clamp_family(IP6_KIND, &half, 128, &mut out.diagnostics);
            if !view.is_empty() {
                out.diagnostics.push(junked_end(IP6_KIND, &view));
            }
        }

        out
    }

    /// Parse a slice taken from a larger record: spans are shifted by `base`
    /// so they land in record coordinates.
    pub(crate) fn parse_at(self, input: &str, base: usize) -> CidrLengths {
        let mut out = self.parse(input);
        out.diagnostics = out
            .diagnostics
            .into_iter()
            .map(|d| d.shift_span(base))
            .collect();
        out
    }
}

/// Parse one `"/" digits` half.
///
/// `tok_continue` allows an empty half continued by another `/` (the `//64`
/// dual form): the second `/` is left unconsumed and no value is produced.
fn parse_half(
    kind: &'static str,
    view: &mut CursorStr<'_>,
    tok_continue: bool,
    diags: &mut Vec<Diagnostic>,
) -> Half {
    if view.is_empty() {
        diags.push(empty(kind, view.offset()));
        return Half::NONE;
    }

    if view.first() == Some(b'/') {
        view.advance(1);
        if view.is_empty() {
            diags.push(empty(kind, view.offset()));
            return Half::NONE;
        }
    } else {
        // Missing lead: flag it, then resynchronize at the next digit (or
        // give up at end of input) so the rest of the suffix still parses.
        let found = view.rest().chars().next().unwrap_or(' ');
        diags.push(
            Diagnostic::error(
                codes::CIDR_INVALID_START,
                format!("cidr-length must start with '/', found '{found}'"),
                Some(Span::new(view.offset(), view.offset() + found.len_utf8())),
            )
            .with_context(ctx!("kind" => kind, "found" => found.to_string())),
        );
        while view.first().is_some_and(|b| !b.is_ascii_digit()) {
            view.advance(1);
        }
        if view.is_empty() {
            return Half::NONE;
        }
    }

    match view.first() {
        Some(b'0') => {
            view.advance(1);
            match view.first() {
                Some(b) if b.is_ascii_digit() => {
                    // Un-consume the zero and let the digit-run parser flag
                    // the whole pad run.
                    view.advance(-1);
                    parse_digit_run(view, diags)
                }
                _ => Half {
                    value: Some(0),
                    digits: Some(Span::new(view.offset() - 1, view.offset())),
                },
            }
        }
        Some(b) if b.is_ascii_digit() => parse_digit_run(view, diags),
        Some(b'/') if tok_continue => Half::NONE,
        _ => {
            // A run of characters that are neither digits nor separators.
            // Skip the whole run, then resume at a digit if one follows.
            let start = view.offset();
            while view
                .first()
                .is_some_and(|b| !b.is_ascii_digit() && b != b'/')
            {
                view.advance(1);
            }
            let len = view.offset() - start;
            diags.push(
                Diagnostic::error(
                    codes::CIDR_INVALID_CHARACTERS,
                    format!("expected a prefix length, found {len} invalid character(s)"),
                    Some(Span::new(start, view.offset())),
                )
                .with_context(ctx!("kind" => kind, "len" => len.to_string())),
            );
            if view.first().is_some_and(|b| b.is_ascii_digit()) {
                parse_digit_run(view, diags)
            } else {
                Half::NONE
            }
        }
    }
}

/// Consume a run of ASCII digits, flagging zero-padding.
fn parse_digit_run(view: &mut CursorStr<'_>, diags: &mut Vec<Diagnostic>) -> Half {
    let mut n = 0;
    while view.byte(n).is_some_and(|b| b.is_ascii_digit()) {
        n += 1;
    }
    let run = view.slice(0, n);
    let start = view.offset();
    view.advance(n as isize);

    if run.len() > 1 && run.starts_with('0') {
        // Pad run = leading zeros; an all-zero run keeps its last digit.
        let pad = run
            .bytes()
            .take_while(|b| *b == b'0')
            .count()
            .min(run.len() - 1);
        diags.push(
            Diagnostic::warn(
                codes::CIDR_ZERO_PADDING,
                format!("prefix length is zero-padded by {pad} digit(s)"),
                Some(Span::new(start, start + pad)),
            )
            .with_context(ctx!("pad" => pad.to_string())),
        );
    }

    Half {
        // Absurdly long runs overflow u64; saturate, range clamping will
        // flag and bound them anyway.
        value: Some(run.parse::<u64>().unwrap_or(u64::MAX)),
        digits: Some(Span::new(start, start + run.len())),
    }
}

/// Range-check a parsed half against its family bound, clamping on violation.
fn clamp_family(
    kind: &'static str,
    half: &Half,
    max: u64,
    diags: &mut Vec<Diagnostic>,
) -> Option<u8> {
    let value = half.value?;
    if value > max {
        diags.push(
            Diagnostic::error(
                codes::CIDR_INVALID_RANGE,
                format!("prefix length {value} is outside the valid range [0..{max}]"),
                half.digits,
            )
            .with_context(ctx!(
                "kind" => kind,
                "value" => value.to_string(),
                "min" => "0",
                "max" => max.to_string(),
            )),
        );
        return Some(max as u8);
    }
    Some(value as u8)
}

fn empty(kind: &'static str, offset: usize) -> Diagnostic {
    Diagnostic::error(
        codes::CIDR_EMPTY,
        "empty cidr-length",
        Some(Span::empty(offset)),
    )
    .with_context(ctx!("kind" => kind))
}

fn junked_end(kind: &'static str, view: &CursorStr<'_>) -> Diagnostic {
    Diagnostic::error(
        codes::CIDR_JUNKED_END,
        format!("trailing input after cidr-length: '{}'", view.rest()),
        Some(Span::new(view.offset(), view.offset() + view.len())),
    )
    .with_context(ctx!("kind" => kind))
}
