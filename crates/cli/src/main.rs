//! `spf` — command-line front end for the SPF toolchain.

mod render;

use std::fs;
use std::net::IpAddr;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use spf_toolchain_core::{
    Domain, MacroExpansion, RequestContext, Sender, expand_macro_string, parse_dual_cidr,
    parse_ip4_cidr, parse_ip6_cidr, parse_record, to_pretty_json,
};
use spf_toolchain_diagnostics::{Diagnostic, Severity, codes};

use crate::render::{Format, Reporter};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "spf",
    version,
    about = "SPF toolchain — parse, lint, and expand Sender Policy Framework records"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse an SPF record and print its term list.
    Parse {
        /// The record text, or a file path when --file is given.
        record: String,
        /// Treat RECORD as a path and parse the file's contents.
        #[arg(long)]
        file: bool,
    },

    /// Parse a standalone cidr-length suffix (e.g. "/24" or "/24/64").
    Cidr {
        /// Which address family grammar to apply.
        #[arg(value_enum)]
        kind: CidrKind,
        /// The suffix to parse.
        length: String,
    },

    /// Expand a macro-string against a request context.
    Expand {
        /// The macro-string, e.g. "%{i}.sbl.%{d2}".
        macro_string: String,
        /// Envelope sender as local@domain.
        #[arg(long)]
        sender: String,
        /// IP address the sender domain resolved to.
        #[arg(long)]
        sender_ip: IpAddr,
        /// Domain of the party requesting the check.
        #[arg(long)]
        domain: String,
        /// IP address of the requesting party (defaults to --sender-ip).
        #[arg(long)]
        ip: Option<IpAddr>,
        /// Domain(s) requested so far in this evaluation, oldest first.
        /// The last one becomes %{d}.
        #[arg(long)]
        requested: Vec<String>,
    },

    /// Explain a diagnostic ID (e.g. SPF0104).
    Explain { id: String },
}

/// Address family selection for the `cidr` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CidrKind {
    /// IPv4 prefix length, `/0` to `/32`.
    Ip4,
    /// IPv6 prefix length, `/0` to `/128`.
    Ip6,
    /// Dual form: `/24`, `/24/64`, or `//64`.
    Dual,
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Parse { record, file } => cmd_parse(&record, file, format)?,
        Cmd::Cidr { kind, length } => cmd_cidr(kind, &length, format),
        Cmd::Expand {
            macro_string,
            sender,
            sender_ip,
            domain,
            ip,
            requested,
        } => cmd_expand(
            &macro_string,
            &sender,
            sender_ip,
            &domain,
            ip,
            &requested,
            format,
        )?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(record: &str, from_file: bool, format: Format) -> Result<()> {
    let owned;
    let (input, name) = if from_file {
        owned = fs::read_to_string(record)
            .with_context(|| format!("failed to read record file '{record}'"))?;
        // Records are single-line; published ones often end with a newline.
        (owned.trim_end_matches(['\r', '\n']), record)
    } else {
        (record, "<record>")
    };

    let parsed = parse_record(input);
    let diagnostics: Vec<Diagnostic> = parsed.diagnostics().cloned().collect();

    match format {
        Format::Json => {
            // Single valid JSON object to stdout.
            let out = serde_json::json!({
                "record": parsed,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Term list to stdout, diagnostics to stderr.
            println!("{}", to_pretty_json(&parsed));
            Reporter::new(input, name, format).emit(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_cidr(kind: CidrKind, length: &str, format: Format) {
    let out = match kind {
        CidrKind::Ip4 => parse_ip4_cidr(length),
        CidrKind::Ip6 => parse_ip6_cidr(length),
        CidrKind::Dual => parse_dual_cidr(length),
    };

    match format {
        Format::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&out).expect("CidrLengths serialization cannot fail")
            );
        }
        Format::Pretty => {
            let show = |v: Option<u8>| v.map_or_else(|| "-".to_string(), |n| format!("/{n}"));
            println!("ip4={} ip6={}", show(out.ip4), show(out.ip6));
            Reporter::new(length, "<cidr-length>", format).emit(&out.diagnostics);
        }
    }

    exit_on_errors(&out.diagnostics);
}

#[allow(clippy::too_many_arguments)]
fn cmd_expand(
    macro_string: &str,
    sender: &str,
    sender_ip: IpAddr,
    requester: &str,
    requester_ip: Option<IpAddr>,
    requested: &[String],
    format: Format,
) -> Result<()> {
    let Some(sender) = Sender::from_address(sender, sender_ip) else {
        bail!("--sender must be of the form local@domain, got '{sender}'");
    };
    let requester = Domain::new(requester, requester_ip.unwrap_or(sender_ip));
    let mut ctx = RequestContext::new(sender, requester);
    for name in requested {
        ctx.push_requested(Domain::new(name, sender_ip));
    }

    let expansion: MacroExpansion = expand_macro_string(&ctx, macro_string);

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&expansion)?);
        }
        Format::Pretty => {
            println!("{}", expansion.expanded);
            Reporter::new(macro_string, "<macro-string>", format).emit(&expansion.diagnostics);
            if expansion.error_is_fatal {
                eprintln!("expansion is not trustworthy (fatal error)");
            }
        }
    }

    if expansion.error_is_fatal {
        process::exit(1);
    }
    exit_on_errors(&expansion.diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": codes::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // The explanation is the expected output — stdout, not stderr.
            if let Some(text) = codes::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
