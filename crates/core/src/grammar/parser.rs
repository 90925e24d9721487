//! SPF record parser.
//!
//! Tokenizes a record into whitespace-delimited terms and classifies each
//! one independently: modifier shape first, then directive shape, else
//! unknown. Diagnostics never stop the loop — every token produces exactly
//! one term, and the concatenation of all term texts reproduces the input
//! byte-for-byte.

use std::net::IpAddr;
use std::str::FromStr;

use super::cidr::CidrParser;
use super::ctx;
use super::diag::{Diagnostic, Span, codes};
use super::term::{DirectiveArg, Qualifier, SpfRecord, Term, TermKind};

/// The exact version marker an SPF record must start with.
pub const SPF_VERSION: &str = "v=spf1";

const MODIFIER_NAMES: &[&str] = &["redirect", "exp"];

/// Whether a directive's argument is mandatory, optional, or disallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Disallowed,
    Optional,
    Mandatory,
}

/// Which sub-grammar parses a directive's argument.
#[derive(Debug, Clone, Copy)]
enum ArgGrammar {
    /// No argument grammar (`all`).
    Bare,
    /// Domain-spec / macro-string, kept raw for on-demand expansion.
    DomainSpec,
    /// Domain-spec optionally followed by a dual cidr-length (`a`, `mx`).
    DomainCidr,
    /// IPv4 address literal plus optional cidr-length.
    Ip4Cidr,
    /// IPv6 address literal plus optional cidr-length.
    Ip6Cidr,
}

/// Read-only mechanism table: name, argument arity, argument sub-grammar.
const DIRECTIVES: &[(&str, Arity, ArgGrammar)] = &[
    ("all", Arity::Disallowed, ArgGrammar::Bare),
    ("include", Arity::Mandatory, ArgGrammar::DomainSpec),
    ("a", Arity::Optional, ArgGrammar::DomainCidr),
    ("mx", Arity::Optional, ArgGrammar::DomainCidr),
    ("ptr", Arity::Optional, ArgGrammar::DomainSpec),
    ("ip4", Arity::Mandatory, ArgGrammar::Ip4Cidr),
    ("ip6", Arity::Mandatory, ArgGrammar::Ip6Cidr),
    ("exists", Arity::Mandatory, ArgGrammar::DomainSpec),
];

/// Parse an SPF record string into a round-trip-preserving term sequence.
pub fn parse_record(input: &str) -> SpfRecord {
    Parser::new(input).parse()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    terms: Vec<Term>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            terms: Vec::new(),
        }
    }

    fn parse(mut self) -> SpfRecord {
        // A record with no tokens at all cannot carry a version marker;
        // the whole input becomes one unknown term rather than a hard error.
        if self.input.bytes().all(|b| b == b' ') {
            let span = Span::new(0, self.input.len());
            self.terms.push(
                Term::new(self.input, span, TermKind::Unknown).with_diagnostics(vec![
                    Diagnostic::error(codes::TERM_UNKNOWN, "empty SPF record", Some(span)),
                ]),
            );
            return SpfRecord { terms: self.terms };
        }

        let bytes = self.input.as_bytes();
        let mut first = true;
        while self.pos < bytes.len() {
            // Space run (leading or between tokens) becomes a Spacing term
            // so the concatenation invariant holds.
            let sp_start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos] == b' ' {
                self.pos += 1;
            }
            if self.pos > sp_start {
                let span = Span::new(sp_start, self.pos);
                self.terms
                    .push(Term::new(&self.input[sp_start..self.pos], span, TermKind::Spacing));
            }
            if self.pos >= bytes.len() {
                break;
            }

            let tok_start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos] != b' ' {
                self.pos += 1;
            }
            let token = &self.input[tok_start..self.pos];
            let span = Span::new(tok_start, self.pos);

            let term = if first {
                first = false;
                version_term(token, span)
            } else {
                classify(token, span)
            };
            self.terms.push(term);
        }

        SpfRecord { terms: self.terms }
    }
}

/// The first token always becomes a Version term; a mismatch is diagnosed,
/// not fatal, so the rest of the record still parses.
fn version_term(token: &str, span: Span) -> Term {
    let mut diagnostics = Vec::new();
    if token != SPF_VERSION {
        diagnostics.push(
            Diagnostic::error(
                codes::VERSION_INVALID,
                format!("record must start with '{SPF_VERSION}', found '{token}'"),
                Some(span),
            )
            .with_context(ctx!("found" => token)),
        );
    }
    Term::new(token, span, TermKind::Version).with_diagnostics(diagnostics)
}

/// Classify one token. Modifier shape wins over directive shape: a token
/// matching both (an `=` inside what could be a directive argument) is a
/// modifier.
fn classify(token: &str, span: Span) -> Term {
    if let Some((name, arg)) = split_modifier(token) {
        return modifier_term(token, span, name, arg);
    }
    if let Some((qualifier, name, arg_part)) = split_directive(token) {
        return directive_term(token, span, qualifier, name, arg_part);
    }
    Term::new(token, span, TermKind::Unknown).with_diagnostics(vec![
        Diagnostic::error(
            codes::TERM_UNKNOWN,
            format!("'{token}' is neither a directive nor a modifier"),
            Some(span),
        )
        .with_context(ctx!("token" => token)),
    ])
}

/// Length of a leading `NAME = [a-zA-Z][a-zA-Z0-9-_.]*` match, 0 if none.
fn name_shape_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_alphabetic()) {
        return 0;
    }
    let mut len = 1;
    while bytes
        .get(len)
        .is_some_and(|&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
    {
        len += 1;
    }
    len
}

/// `NAME "=" ARG` — the modifier token shape. `ARG` may be empty here;
/// emptiness is diagnosed, not a shape mismatch.
fn split_modifier(token: &str) -> Option<(&str, &str)> {
    let name_len = name_shape_len(token);
    if name_len == 0 {
        return None;
    }
    let rest = &token[name_len..];
    rest.strip_prefix('=')
        .map(|arg| (&token[..name_len], arg))
}

/// `qualifier? NAME ((":"|"/") ARG)?` — the directive token shape.
///
/// Returns the argument as `(delimiter, text, byte offset of the delimiter
/// within the token)`; the offset lets cidr arguments be re-sliced with
/// their leading `/` intact.
#[allow(clippy::type_complexity)]
fn split_directive(token: &str) -> Option<(Option<Qualifier>, &str, Option<(u8, &str, usize)>)> {
    let qualifier = token.as_bytes().first().copied().and_then(Qualifier::from_byte);
    let name_start = usize::from(qualifier.is_some());
    let name_len = name_shape_len(&token[name_start..]);
    if name_len == 0 {
        return None;
    }
    let name = &token[name_start..name_start + name_len];
    let rest = &token[name_start + name_len..];
    if rest.is_empty() {
        return Some((qualifier, name, None));
    }
    let delim = rest.as_bytes()[0];
    if delim == b':' || delim == b'/' {
        let delim_idx = name_start + name_len;
        return Some((qualifier, name, Some((delim, &rest[1..], delim_idx))));
    }
    None
}

fn modifier_term(token: &str, span: Span, name: &str, arg: &str) -> Term {
    let mut diagnostics = Vec::new();
    if !MODIFIER_NAMES.contains(&name) {
        diagnostics.push(
            Diagnostic::warn(
                codes::MODIFIER_UNKNOWN,
                format!("unknown modifier '{name}'"),
                Some(Span::new(span.start, span.start + name.len())),
            )
            .with_context(ctx!("name" => name)),
        );
    }
    if arg.is_empty() {
        diagnostics.push(Diagnostic::error(
            codes::MODIFIER_ARGUMENT,
            format!("modifier '{name}' has an empty argument"),
            Some(Span::new(span.start + name.len(), span.end)),
        ));
    }
    Term::new(
        token,
        span,
        TermKind::Modifier {
            name: name.to_string(),
            arg: arg.to_string(),
        },
    )
    .with_diagnostics(diagnostics)
}

fn directive_term(
    token: &str,
    span: Span,
    qualifier: Option<Qualifier>,
    name: &str,
    arg_part: Option<(u8, &str, usize)>,
) -> Term {
    let mut diagnostics = Vec::new();
    let name_start = span.start + usize::from(qualifier.is_some());
    let name_span = Span::new(name_start, name_start + name.len());

    let entry = DIRECTIVES.iter().find(|(n, _, _)| *n == name);

    let arg = match entry {
        None => {
            // Unknown mechanism: keep the raw argument so the term still
            // round-trips and downstream tooling can inspect it.
            diagnostics.push(
                Diagnostic::warn(
                    codes::DIRECTIVE_UNKNOWN,
                    format!("unknown directive '{name}'"),
                    Some(name_span),
                )
                .with_context(ctx!("name" => name)),
            );
            arg_part.map(|(_, text, _)| DirectiveArg::DomainSpec {
                domain: text.to_string(),
            })
        }
        Some(&(_, arity, grammar)) => match arg_part {
            None => {
                if arity == Arity::Mandatory {
                    diagnostics.push(
                        Diagnostic::error(
                            codes::DIRECTIVE_ARGUMENT,
                            format!("directive '{name}' requires an argument"),
                            Some(span),
                        )
                        .with_context(ctx!("name" => name)),
                    );
                }
                None
            }
            Some((delim, text, delim_idx)) => {
                if arity == Arity::Disallowed {
                    diagnostics.push(
                        Diagnostic::error(
                            codes::DIRECTIVE_ARGUMENT,
                            format!("directive '{name}' takes no argument"),
                            Some(Span::new(span.start + delim_idx, span.end)),
                        )
                        .with_context(ctx!("name" => name)),
                    );
                    None
                } else if text.is_empty() {
                    // Delimiter present but nothing after it.
                    diagnostics.push(
                        Diagnostic::error(
                            codes::DIRECTIVE_ARGUMENT,
                            format!("directive '{name}' has an empty argument"),
                            Some(Span::new(span.start + delim_idx, span.end)),
                        )
                        .with_context(ctx!("name" => name)),
                    );
                    None
                } else {
                    parse_directive_arg(
                        token,
                        span,
                        grammar,
                        delim,
                        text,
                        delim_idx,
                        &mut diagnostics,
                    )
                }
            }
        },
    };

    Term::new(
        token,
        span,
        TermKind::Directive {
            qualifier,
            name: name.to_string(),
            arg,
        },
    )
    .with_diagnostics(diagnostics)
}

/// Dispatch a present, non-empty directive argument to its sub-grammar.
/// Sub-parse diagnostics are merged into the owning term's list, spans
/// already shifted to record coordinates.
fn parse_directive_arg(
    token: &str,
    span: Span,
    grammar: ArgGrammar,
    delim: u8,
    text: &str,
    delim_idx: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<DirectiveArg> {
    match grammar {
        // `all` never reaches here (argument disallowed).
        ArgGrammar::Bare => None,
        ArgGrammar::DomainSpec => Some(DirectiveArg::DomainSpec {
            domain: text.to_string(),
        }),
        ArgGrammar::DomainCidr => {
            if delim == b'/' {
                // `a/24`: the delimiter doubles as the cidr lead.
                let base = span.start + delim_idx;
                let mut cidr = CidrParser::DUAL.parse_at(&token[delim_idx..], base);
                diagnostics.append(&mut cidr.diagnostics);
                return Some(DirectiveArg::DomainCidr {
                    domain: None,
                    cidr: Some(cidr),
                });
            }
            // `a:domain[/24[/64]]`
            match text.find('/') {
                Some(slash) => {
                    let domain = &text[..slash];
                    let base = span.start + delim_idx + 1 + slash;
                    let mut cidr = CidrParser::DUAL.parse_at(&text[slash..], base);
                    diagnostics.append(&mut cidr.diagnostics);
                    Some(DirectiveArg::DomainCidr {
                        domain: (!domain.is_empty()).then(|| domain.to_string()),
                        cidr: Some(cidr),
                    })
                }
                None => Some(DirectiveArg::DomainCidr {
                    domain: Some(text.to_string()),
                    cidr: None,
                }),
            }
        }
        ArgGrammar::Ip4Cidr | ArgGrammar::Ip6Cidr => {
            let want_v4 = matches!(grammar, ArgGrammar::Ip4Cidr);
            let family = if want_v4 {
                CidrParser::IP4
            } else {
                CidrParser::IP6
            };

            if delim == b'/' {
                // `ip4/24`: a cidr with no address at all.
                diagnostics.push(Diagnostic::error(
                    codes::IP_INVALID_ADDRESS,
                    "missing IP address before cidr-length",
                    Some(Span::empty(span.start + delim_idx)),
                ));
                let base = span.start + delim_idx;
                let mut cidr = family.parse_at(&token[delim_idx..], base);
                diagnostics.append(&mut cidr.diagnostics);
                return Some(DirectiveArg::IpCidr {
                    addr: None,
                    cidr: Some(cidr),
                });
            }

            let (addr_text, cidr_rel) = match text.find('/') {
                Some(slash) => (&text[..slash], Some(slash)),
                None => (text, None),
            };
            let addr_start = span.start + delim_idx + 1;
            let addr_span = Span::new(addr_start, addr_start + addr_text.len());

            let addr = match IpAddr::from_str(addr_text) {
                Ok(addr) => {
                    if addr.is_ipv4() != want_v4 {
                        let (want, got) = if want_v4 {
                            ("IPv4", "IPv6")
                        } else {
                            ("IPv6", "IPv4")
                        };
                        diagnostics.push(
                            Diagnostic::error(
                                codes::IP_WRONG_FAMILY,
                                format!("expected an {want} address, '{addr_text}' is {got}"),
                                Some(addr_span),
                            )
                            .with_context(ctx!("address" => addr_text)),
                        );
                    }
                    Some(addr)
                }
                Err(_) => {
                    diagnostics.push(
                        Diagnostic::error(
                            codes::IP_INVALID_ADDRESS,
                            format!("'{addr_text}' is not a valid IP address"),
                            Some(addr_span),
                        )
                        .with_context(ctx!("address" => addr_text)),
                    );
                    None
                }
            };

            let cidr = cidr_rel.map(|slash| {
                let base = span.start + delim_idx + 1 + slash;
                let mut cidr = family.parse_at(&text[slash..], base);
                diagnostics.append(&mut cidr.diagnostics);
                cidr
            });

            Some(DirectiveArg::IpCidr { addr, cidr })
        }
    }
}
