//! Address-literal analysis
//!
//! Runs when `]` closes a domain literal that is still clean enough to be an
//! RFC 5321 address-literal, and decides which flavor it actually is:
//!
//! ```text
//! address-literal = "[" ( IPv4-address-literal /
//!                         IPv6-address-literal /
//!                         General-address-literal ) "]"
//! ```
//!
//! (RFC 5321 sections 4.1.2 and 4.1.3, group counting per RFC 4291.)

use once_cell::sync::Lazy;
use regex::Regex;

use crate::status::Status;

// Snum = 1*3DIGIT, value 0 through 255, anchored to the end of the literal
static IPV4_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

fn is_ipv6_group(group: &str) -> bool {
    group.len() <= 4 && group.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Classifies the body of a domain literal.
///
/// An IPv4 tail is first reduced to the two zero groups it stands for, so
/// v4-in-v6 forms flow through the same group counting as pure IPv6.
pub(super) fn analyze(literal: &str) -> Vec<Status> {
    let mut found = Vec::new();

    let rewritten;
    let address = match IPV4_TAIL.find(literal) {
        Some(tail) if tail.start() == 0 => {
            // nothing but a well-formed dotted quad
            found.push(Status::Rfc5321AddressLiteral);
            return found;
        }
        Some(tail) => {
            rewritten = format!("{}0:0", &literal[..tail.start()]);
            rewritten.as_str()
        }
        None => literal,
    };

    let ipv6 = match address.get(..5) {
        Some(tag) if tag.eq_ignore_ascii_case("IPv6:") => &address[5..],
        _ => {
            found.push(Status::Rfc5322DomainLiteral);
            return found;
        }
    };

    let groups: Vec<&str> = ipv6.split(':').collect();
    let mut max_groups = 8;

    match ipv6.find("::") {
        None => {
            if groups.len() != max_groups {
                found.push(Status::Rfc5322Ipv6GroupCount);
            }
        }
        Some(index) if ipv6.rfind("::") != Some(index) => {
            found.push(Status::Rfc5322Ipv6DoubleDoubleColon);
        }
        Some(index) => {
            if index == 0 || index == ipv6.len() - 2 {
                // RFC 4291 allows "::" at either end of an address with
                // seven other groups
                max_groups += 1;
            }
            if groups.len() > max_groups {
                found.push(Status::Rfc5322Ipv6MaxGroups);
            } else if groups.len() == max_groups {
                // "::" eliding a single zero group
                found.push(Status::Rfc5321Ipv6Deprecated);
            }
        }
    }

    if ipv6.len() > 1 {
        if ipv6.starts_with(':') && !ipv6[1..].starts_with(':') {
            found.push(Status::Rfc5322Ipv6ColonStart);
        } else if ipv6.ends_with(':') && !ipv6[..ipv6.len() - 1].ends_with(':') {
            found.push(Status::Rfc5322Ipv6ColonEnd);
        }
    } else if ipv6 == ":" {
        found.push(Status::Rfc5322Ipv6ColonStart);
    }

    if groups.iter().any(|group| !is_ipv6_group(group)) {
        found.push(Status::Rfc5322Ipv6BadChar);
    } else {
        found.push(Status::Rfc5321AddressLiteral);
    }

    found
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn worst(literal: &str) -> Status {
        analyze(literal).into_iter().max().unwrap()
    }

    #[test]
    fn dotted_quads() {
        assert_eq!(worst("255.255.255.255"), Status::Rfc5321AddressLiteral);
        assert_eq!(worst("0.0.0.0"), Status::Rfc5321AddressLiteral);
        // 1-3 digit octets may carry leading zeros
        assert_eq!(worst("013.092.001.255"), Status::Rfc5321AddressLiteral);
        // out-of-range octet is not an IPv4 tail at all
        assert_eq!(worst("255.255.255.256"), Status::Rfc5322DomainLiteral);
        assert_eq!(worst("1.2.3.4.5"), Status::Rfc5322DomainLiteral);
    }

    #[test]
    fn full_ipv6() {
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777:8888"),
            Status::Rfc5321AddressLiteral
        );
        assert_eq!(
            worst("ipv6:1111:2222:3333:4444:5555:6666:7777:8888"),
            Status::Rfc5321AddressLiteral
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777"),
            Status::Rfc5322Ipv6GroupCount
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777:8888:9999"),
            Status::Rfc5322Ipv6GroupCount
        );
    }

    #[test]
    fn compressed_ipv6() {
        assert_eq!(worst("IPv6:1::1"), Status::Rfc5321AddressLiteral);
        assert_eq!(worst("IPv6:::1"), Status::Rfc5321AddressLiteral);
        assert_eq!(worst("IPv6:1::"), Status::Rfc5321AddressLiteral);
        assert_eq!(worst("IPv6:::"), Status::Rfc5321AddressLiteral);
        // a "::" that elides a single group is deprecated
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777::"),
            Status::Rfc5321Ipv6Deprecated
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666::8888"),
            Status::Rfc5321Ipv6Deprecated
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777::8888"),
            Status::Rfc5322Ipv6MaxGroups
        );
    }

    #[test]
    fn malformed_ipv6() {
        assert_eq!(worst("IPv6:1::1::1"), Status::Rfc5322Ipv6DoubleDoubleColon);
        assert_eq!(worst("IPv6::1"), Status::Rfc5322Ipv6ColonStart);
        assert_eq!(worst("IPv6:1:"), Status::Rfc5322Ipv6ColonEnd);
        assert_eq!(worst("IPv6::"), Status::Rfc5322Ipv6ColonStart);
        assert_eq!(worst("IPv6:1111:2222:333x:4444"), Status::Rfc5322Ipv6BadChar);
        assert_eq!(worst("IPv6:11111:2222:3333:4444"), Status::Rfc5322Ipv6BadChar);
    }

    #[test]
    fn v4_in_v6_reduces_to_groups() {
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:1.2.3.4"),
            Status::Rfc5321AddressLiteral
        );
        assert_eq!(worst("IPv6:::1.2.3.4"), Status::Rfc5321AddressLiteral);
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666:7777:1.2.3.4"),
            Status::Rfc5322Ipv6GroupCount
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555::1.2.3.4"),
            Status::Rfc5321Ipv6Deprecated
        );
        assert_eq!(
            worst("IPv6:1111:2222:3333:4444:5555:6666::1.2.3.4"),
            Status::Rfc5322Ipv6MaxGroups
        );
    }

    #[test]
    fn anything_else_is_a_5322_literal() {
        assert_eq!(worst("iana.org"), Status::Rfc5322DomainLiteral);
        assert_eq!(worst(""), Status::Rfc5322DomainLiteral);
        assert_eq!(worst("IPv4:1.2.3.4x"), Status::Rfc5322DomainLiteral);
    }
}
