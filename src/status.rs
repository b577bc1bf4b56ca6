//! Diagnostic status codes and their severity categories
//!
//! Every validation produces one [`Status`] per observation made while
//! scanning the address; the final verdict is the numerically largest one.
//! The integer values are stable and shared with other implementations of
//! the same taxonomy, so they must never be renumbered.

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Severity band of a [`Status`].
///
/// The discriminant of each band is its highest possible code, so raw code
/// comparisons against a `Category` test "is the observation below this
/// band".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Category {
    /// Address is valid
    Valid = 1,
    /// Address is valid but a DNS check was not successful
    DnsWarn = 7,
    /// Address is valid for SMTP but has unusual elements
    Rfc5321 = 15,
    /// Address is valid within the message but cannot be used unmodified
    /// for the envelope
    Cfws = 31,
    /// Address contains deprecated elements but may still be valid in
    /// restricted contexts
    Deprec = 63,
    /// Address is only valid according to the broad definition of RFC 5322,
    /// and is otherwise invalid
    Rfc5322 = 127,
    /// Address is invalid for any purpose
    Err = 255,
}

/// A single diagnostic observation.
///
/// Codes are ordered by severity: comparing two statuses compares their
/// integer codes, and each code falls in exactly one [`Category`] band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Status {
    /// Address is valid
    Valid = 0,

    /// No MX record for the domain
    DnsWarnNoMxRecord = 5,
    /// No MX, A or CNAME record for the domain
    DnsWarnNoRecord = 6,

    /// The domain is a top-level domain
    Rfc5321Tld = 9,
    /// The last label of the domain begins with a digit
    Rfc5321TldNumeric = 10,
    /// The local part is a quoted string
    Rfc5321QuotedString = 11,
    /// The domain is an address literal
    Rfc5321AddressLiteral = 12,
    /// The IPv6 literal elides a single zero group
    Rfc5321Ipv6Deprecated = 13,

    /// The address contains a comment
    CfwsComment = 17,
    /// The address contains folding white space
    CfwsFws = 18,

    /// The local part is in a deprecated form
    DeprecLocalPart = 33,
    /// The address contains an obsolete form of folding white space
    DeprecFws = 34,
    /// A quoted string contains a deprecated character
    DeprecQtext = 35,
    /// A quoted pair contains a deprecated character
    DeprecQuotedPair = 36,
    /// A comment is in a deprecated position
    DeprecComment = 37,
    /// A comment contains a deprecated character
    DeprecCtext = 38,
    /// The address contains comment or folding white space around the `@`
    DeprecCfwsNearAt = 49,

    /// The domain is syntactically valid for RFC 5322 only
    Rfc5322Domain = 65,
    /// The address exceeds 254 octets
    Rfc5322TooLong = 66,
    /// The local part exceeds 64 octets
    Rfc5322LocalTooLong = 67,
    /// The domain exceeds 255 octets
    Rfc5322DomainTooLong = 68,
    /// A domain label exceeds 63 octets
    Rfc5322LabelTooLong = 69,
    /// The domain literal is not a valid RFC 5321 address literal
    Rfc5322DomainLiteral = 70,
    /// The domain literal contains obsolete dtext
    Rfc5322DomainLiteralObsDtext = 71,
    /// The IPv6 literal has the wrong number of groups
    Rfc5322Ipv6GroupCount = 72,
    /// The IPv6 literal contains more than one `::`
    Rfc5322Ipv6DoubleDoubleColon = 73,
    /// The IPv6 literal contains a character outside the hex alphabet
    Rfc5322Ipv6BadChar = 74,
    /// The IPv6 literal has too many groups next to its `::`
    Rfc5322Ipv6MaxGroups = 75,
    /// The IPv6 literal starts with a lone colon
    Rfc5322Ipv6ColonStart = 76,
    /// The IPv6 literal ends with a lone colon
    Rfc5322Ipv6ColonEnd = 77,

    /// A domain literal contains a character that is not dtext
    ErrExpectingDtext = 129,
    /// The address has no local part
    ErrNoLocalPart = 130,
    /// The address has no domain
    ErrNoDomain = 131,
    /// The address must not contain consecutive dots
    ErrConsecutiveDots = 132,
    /// Address contains text after a comment or folding white space
    ErrAtextAfterCfws = 133,
    /// Address contains text after a quoted string
    ErrAtextAfterQuotedString = 134,
    /// Extra characters found after the domain literal
    ErrAtextAfterDomainLiteral = 135,
    /// The address contains a character that is not valid in a quoted pair
    ErrExpectingQuotedPair = 136,
    /// The address contains a character that is not valid atext
    ErrExpectingAtext = 137,
    /// A quoted string contains a character that is not qtext
    ErrExpectingQtext = 138,
    /// A comment contains a character that is not ctext
    ErrExpectingCtext = 139,
    /// The address cannot end with a backslash
    ErrBackslashEnd = 140,
    /// An element must not begin with a dot
    ErrDotStart = 141,
    /// An element must not end with a dot
    ErrDotEnd = 142,
    /// A domain label must not begin with a hyphen
    ErrDomainHyphenStart = 143,
    /// A domain label must not end with a hyphen
    ErrDomainHyphenEnd = 144,
    /// Unclosed quoted string
    ErrUnclosedQuotedString = 145,
    /// Unclosed comment
    ErrUnclosedComment = 146,
    /// Unclosed domain literal
    ErrUnclosedDomainLiteral = 147,
    /// Folding white space contains consecutive CRLF sequences
    ErrFwsCrlfX2 = 148,
    /// Folding white space ends with a CRLF sequence
    ErrFwsCrlfEnd = 149,
    /// A CR must be followed by an LF
    ErrCrNoLf = 150,
    /// An LF must be preceded by a CR
    ErrLfNoCr = 151,
}

impl Status {
    /// The stable integer code of this status.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The severity band this status belongs to.
    pub fn category(self) -> Category {
        match self as u8 {
            0 => Category::Valid,
            1..=7 => Category::DnsWarn,
            8..=15 => Category::Rfc5321,
            16..=31 => Category::Cfws,
            32..=63 => Category::Deprec,
            64..=127 => Category::Rfc5322,
            _ => Category::Err,
        }
    }

    /// Whether this status terminates the parse.
    pub fn is_fatal(self) -> bool {
        self as u8 > Category::Rfc5322 as u8
    }

    /// The canonical name of this status, shared across implementations.
    pub fn name(self) -> &'static str {
        use Status::*;
        match self {
            Valid => "VALID",
            DnsWarnNoMxRecord => "DNSWARN_NO_MX_RECORD",
            DnsWarnNoRecord => "DNSWARN_NO_RECORD",
            Rfc5321Tld => "RFC5321_TLD",
            Rfc5321TldNumeric => "RFC5321_TLDNUMERIC",
            Rfc5321QuotedString => "RFC5321_QUOTEDSTRING",
            Rfc5321AddressLiteral => "RFC5321_ADDRESSLITERAL",
            Rfc5321Ipv6Deprecated => "RFC5321_IPV6DEPRECATED",
            CfwsComment => "CFWS_COMMENT",
            CfwsFws => "CFWS_FWS",
            DeprecLocalPart => "DEPREC_LOCALPART",
            DeprecFws => "DEPREC_FWS",
            DeprecQtext => "DEPREC_QTEXT",
            DeprecQuotedPair => "DEPREC_QP",
            DeprecComment => "DEPREC_COMMENT",
            DeprecCtext => "DEPREC_CTEXT",
            DeprecCfwsNearAt => "DEPREC_CFWS_NEAR_AT",
            Rfc5322Domain => "RFC5322_DOMAIN",
            Rfc5322TooLong => "RFC5322_TOOLONG",
            Rfc5322LocalTooLong => "RFC5322_LOCAL_TOOLONG",
            Rfc5322DomainTooLong => "RFC5322_DOMAIN_TOOLONG",
            Rfc5322LabelTooLong => "RFC5322_LABEL_TOOLONG",
            Rfc5322DomainLiteral => "RFC5322_DOMAINLITERAL",
            Rfc5322DomainLiteralObsDtext => "RFC5322_DOMLIT_OBSDTEXT",
            Rfc5322Ipv6GroupCount => "RFC5322_IPV6_GRPCOUNT",
            Rfc5322Ipv6DoubleDoubleColon => "RFC5322_IPV6_2X2XCOLON",
            Rfc5322Ipv6BadChar => "RFC5322_IPV6_BADCHAR",
            Rfc5322Ipv6MaxGroups => "RFC5322_IPV6_MAXGRPS",
            Rfc5322Ipv6ColonStart => "RFC5322_IPV6_COLONSTRT",
            Rfc5322Ipv6ColonEnd => "RFC5322_IPV6_COLONEND",
            ErrExpectingDtext => "ERR_EXPECTING_DTEXT",
            ErrNoLocalPart => "ERR_NOLOCALPART",
            ErrNoDomain => "ERR_NODOMAIN",
            ErrConsecutiveDots => "ERR_CONSECUTIVEDOTS",
            ErrAtextAfterCfws => "ERR_ATEXT_AFTER_CFWS",
            ErrAtextAfterQuotedString => "ERR_ATEXT_AFTER_QS",
            ErrAtextAfterDomainLiteral => "ERR_ATEXT_AFTER_DOMLIT",
            ErrExpectingQuotedPair => "ERR_EXPECTING_QPAIR",
            ErrExpectingAtext => "ERR_EXPECTING_ATEXT",
            ErrExpectingQtext => "ERR_EXPECTING_QTEXT",
            ErrExpectingCtext => "ERR_EXPECTING_CTEXT",
            ErrBackslashEnd => "ERR_BACKSLASHEND",
            ErrDotStart => "ERR_DOT_START",
            ErrDotEnd => "ERR_DOT_END",
            ErrDomainHyphenStart => "ERR_DOMAINHYPHENSTART",
            ErrDomainHyphenEnd => "ERR_DOMAINHYPHENEND",
            ErrUnclosedQuotedString => "ERR_UNCLOSEDQUOTEDSTR",
            ErrUnclosedComment => "ERR_UNCLOSEDCOMMENT",
            ErrUnclosedDomainLiteral => "ERR_UNCLOSEDDOMLIT",
            ErrFwsCrlfX2 => "ERR_FWS_CRLF_X2",
            ErrFwsCrlfEnd => "ERR_FWS_CRLF_END",
            ErrCrNoLf => "ERR_CR_NO_LF",
            ErrLfNoCr => "ERR_LF_NO_CR",
        }
    }

    pub(crate) const ALL: [Status; 53] = {
        use Status::*;
        [
            Valid,
            DnsWarnNoMxRecord,
            DnsWarnNoRecord,
            Rfc5321Tld,
            Rfc5321TldNumeric,
            Rfc5321QuotedString,
            Rfc5321AddressLiteral,
            Rfc5321Ipv6Deprecated,
            CfwsComment,
            CfwsFws,
            DeprecLocalPart,
            DeprecFws,
            DeprecQtext,
            DeprecQuotedPair,
            DeprecComment,
            DeprecCtext,
            DeprecCfwsNearAt,
            Rfc5322Domain,
            Rfc5322TooLong,
            Rfc5322LocalTooLong,
            Rfc5322DomainTooLong,
            Rfc5322LabelTooLong,
            Rfc5322DomainLiteral,
            Rfc5322DomainLiteralObsDtext,
            Rfc5322Ipv6GroupCount,
            Rfc5322Ipv6DoubleDoubleColon,
            Rfc5322Ipv6BadChar,
            Rfc5322Ipv6MaxGroups,
            Rfc5322Ipv6ColonStart,
            Rfc5322Ipv6ColonEnd,
            ErrExpectingDtext,
            ErrNoLocalPart,
            ErrNoDomain,
            ErrConsecutiveDots,
            ErrAtextAfterCfws,
            ErrAtextAfterQuotedString,
            ErrAtextAfterDomainLiteral,
            ErrExpectingQuotedPair,
            ErrExpectingAtext,
            ErrExpectingQtext,
            ErrExpectingCtext,
            ErrBackslashEnd,
            ErrDotStart,
            ErrDotEnd,
            ErrDomainHyphenStart,
            ErrDomainHyphenEnd,
            ErrUnclosedQuotedString,
            ErrUnclosedComment,
            ErrUnclosedDomainLiteral,
            ErrFwsCrlfX2,
            ErrFwsCrlfEnd,
            ErrCrNoLf,
            ErrLfNoCr,
        ]
    };
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(String);

impl Display for ParseStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "unknown status name: {}", self.0)
    }
}

impl Error for ParseStatusError {}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .find(|status| status.name() == name)
            .copied()
            .ok_or_else(|| ParseStatusError(name.to_owned()))
    }
}
