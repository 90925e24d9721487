//! Diagnostic ID constants.
//!
//! The taxonomy is flat and fixed by RFC 7208's grammar, so the constants
//! and their explanations are written out by hand rather than generated.
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete.
//!
//! Numbering: `SPF01xx` cidr-length grammar, `SPF02xx` record/term grammar,
//! `SPF03xx` macro-string grammar.

// ── cidr-length (SPF01xx) ───────────────────────────────────────────────

/// Empty cidr-length where one was expected.
pub const CIDR_EMPTY: &str = "SPF0101";
/// Missing leading `/` at the start of a cidr-length.
pub const CIDR_INVALID_START: &str = "SPF0102";
/// Non-digit character run where a prefix length was expected.
pub const CIDR_INVALID_CHARACTERS: &str = "SPF0103";
/// Prefix length outside the valid range for its address family.
pub const CIDR_INVALID_RANGE: &str = "SPF0104";
/// Zero-padded prefix length (e.g. `/007`).
pub const CIDR_ZERO_PADDING: &str = "SPF0105";
/// Unexpected separator between the halves of a dual cidr-length.
pub const CIDR_INVALID_DUAL_SEPARATOR: &str = "SPF0106";
/// Trailing input after a fully matched cidr-length.
pub const CIDR_JUNKED_END: &str = "SPF0107";

// ── record terms (SPF02xx) ──────────────────────────────────────────────

/// Token matches neither the directive nor the modifier shape.
pub const TERM_UNKNOWN: &str = "SPF0201";
/// First token of the record is not exactly `v=spf1`.
pub const VERSION_INVALID: &str = "SPF0202";
/// Directive name is not a known mechanism.
pub const DIRECTIVE_UNKNOWN: &str = "SPF0203";
/// Modifier name is not a known modifier.
pub const MODIFIER_UNKNOWN: &str = "SPF0204";
/// Directive argument present where disallowed, or absent where mandatory.
pub const DIRECTIVE_ARGUMENT: &str = "SPF0205";
/// Modifier with an empty argument.
pub const MODIFIER_ARGUMENT: &str = "SPF0206";
/// Unparseable IP address literal in an `ip4:`/`ip6:` argument.
pub const IP_INVALID_ADDRESS: &str = "SPF0207";
/// IP address literal of the wrong family for its mechanism.
pub const IP_WRONG_FAMILY: &str = "SPF0208";

// ── macro-string (SPF03xx) ──────────────────────────────────────────────

/// `%` followed by a character that is not `%`, `_`, `-`, or `{`.
pub const MACRO_UNKNOWN_SPECIAL: &str = "SPF0301";
/// `%` at the very end of a macro-string.
pub const MACRO_TRAILING_PERCENT: &str = "SPF0302";
/// `%{x...}` where `x` is not a known macro letter.
pub const MACRO_UNKNOWN_LETTER: &str = "SPF0303";
/// `%{}` with an empty letter slot.
pub const MACRO_EMPTY_EXPAND: &str = "SPF0304";
/// Transformer with the command before the digits (e.g. `%{dr2}`).
pub const MACRO_SWAPPED_TRANSFORMER: &str = "SPF0305";
/// Transformer pattern that cannot be made sense of.
pub const MACRO_INVALID_TRANSFORMER: &str = "SPF0306";
/// Transformer command other than `r`.
pub const MACRO_INVALID_TRANSFORMER_COMMAND: &str = "SPF0307";
/// Delimiter character outside the set `.-+,/_=`.
pub const MACRO_INVALID_DELIMITER: &str = "SPF0308";
/// Literal character outside printable ASCII `[0x21,0x7E]` (excluding `%`).
pub const MACRO_INVALID_LITERAL: &str = "SPF0309";

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    Some(match id {
        CIDR_EMPTY => "A cidr-length was expected but the input ended. Write a prefix length such as /24 (IPv4) or /64 (IPv6).",
        CIDR_INVALID_START => "A cidr-length must begin with a slash. Parsing resumed at the next digit.",
        CIDR_INVALID_CHARACTERS => "A prefix length must be a decimal number. The highlighted run was skipped.",
        CIDR_INVALID_RANGE => "The prefix length is outside the valid range (0-32 for IPv4, 0-128 for IPv6). The stored value was clamped to the nearest bound.",
        CIDR_ZERO_PADDING => "Prefix lengths must not be zero-padded; write /7 rather than /007. The numeric value was still used.",
        CIDR_INVALID_DUAL_SEPARATOR => "The two halves of a dual cidr-length must be separated by a slash, as in /24/64. The IPv6 half was abandoned.",
        CIDR_JUNKED_END => "Unexpected trailing input after a complete cidr-length.",
        TERM_UNKNOWN => "The token is neither a directive (name[:arg]) nor a modifier (name=arg). It was preserved verbatim so the record still round-trips.",
        VERSION_INVALID => "An SPF record must start with exactly v=spf1.",
        DIRECTIVE_UNKNOWN => "The directive name is not one of: all, include, a, mx, ptr, ip4, ip6, exists.",
        MODIFIER_UNKNOWN => "The modifier name is not one of: redirect, exp.",
        DIRECTIVE_ARGUMENT => "This directive's argument arity was violated: an argument was given where none is allowed, or a mandatory argument is missing.",
        MODIFIER_ARGUMENT => "A modifier requires a non-empty argument after the equals sign.",
        IP_INVALID_ADDRESS => "The address literal could not be parsed as an IP address.",
        IP_WRONG_FAMILY => "ip4: takes an IPv4 address and ip6: takes an IPv6 address.",
        MACRO_UNKNOWN_SPECIAL => "After %, only %%, %_, %-, or %{...} are valid. The expansion of this macro-string is not trustworthy.",
        MACRO_TRAILING_PERCENT => "A macro-string must not end with a bare %.",
        MACRO_UNKNOWN_LETTER => "The macro letter is not one of s, l, o, d, i, p, v, h, c, r, t. Macro letters are case-sensitive.",
        MACRO_EMPTY_EXPAND => "%{} has an empty macro letter slot.",
        MACRO_SWAPPED_TRANSFORMER => "The transformer digits must come before the r command, as in %{d2r}. The located number and command were still applied.",
        MACRO_INVALID_TRANSFORMER => "The transformer could not be parsed; the macro was substituted verbatim.",
        MACRO_INVALID_TRANSFORMER_COMMAND => "The only valid transformer command is r (reverse); the macro was substituted verbatim.",
        MACRO_INVALID_DELIMITER => "Macro delimiters must come from the set . - + , / _ =. Invalid characters were ignored.",
        MACRO_INVALID_LITERAL => "Macro-string literals must be printable ASCII (0x21-0x7E) other than %.",
        _ => return None,
    })
}
