//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};

use spf_toolchain_core::{Diagnostic, Domain, RequestContext, Sender, Severity};

/// The context most macro tests expand against: a sender at
/// `email.example.com` checked by an MTA at `mta.example.org`.
pub fn request_context() -> RequestContext {
    let sender_ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 3));
    let sender =
        Sender::from_address("strong-bad@email.example.com", sender_ip).expect("address has an @");
    let requester = Domain::new("mta.example.org", IpAddr::V4(Ipv4Addr::new(203, 0, 113, 1)));
    RequestContext::new(sender, requester)
}

/// Same context, with `mail.example.com` already on the requested trail.
pub fn request_context_with_trail() -> RequestContext {
    let mut ctx = request_context();
    let ip = ctx.sender.domain.ip;
    ctx.push_requested(Domain::new("mail.example.com", ip));
    ctx
}

pub fn ids(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.id.as_ref()).collect()
}

pub fn error_count<'a>(diags: impl IntoIterator<Item = &'a Diagnostic>) -> usize {
    diags
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}
