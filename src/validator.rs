//! Validation entry points
//!
//! [`EmailValidator`] ties the pieces together: pre-filter the input, run
//! the parser, optionally consult a [`Resolver`], apply the top-level domain
//! policy, then reduce the observation set to a single verdict.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{
    decode::decode,
    parser::{Outcome, Parser},
    resolver::{Lookup, RecordType, Resolver},
    status::{Category, Status},
};

/// Highest code still considered deliverable in boolean mode.
///
/// Everything below the CFWS band is valid for an RFC 5321 envelope; from
/// CFWS up the address needs rewriting before it can go on the wire.
const BOOLEAN_THRESHOLD: u8 = 16;

/// How many times a timed-out DNS query is retried.
const TIMEOUT_RETRIES: usize = 3;

/// How picky [`EmailValidator::diagnose`] is when collapsing low-severity
/// statuses to [`Status::Valid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorLevel {
    /// Every observation surfaces, threshold 0
    #[default]
    Error,
    /// Only observations from the CFWS band up surface, threshold 16
    Warning,
    /// An explicit code used verbatim as the threshold
    Threshold(u8),
}

impl ErrorLevel {
    fn threshold(self) -> u8 {
        match self {
            ErrorLevel::Error => 0,
            ErrorLevel::Warning => BOOLEAN_THRESHOLD,
            ErrorLevel::Threshold(threshold) => threshold,
        }
    }
}

/// The outcome of diagnosing one address.
///
/// Carries the final status, every deduplicated observation in ascending
/// code order, and the components the parser accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    status: Status,
    statuses: Vec<Status>,
    local_part: String,
    domain: String,
    domain_literal: String,
    local_atoms: Vec<String>,
    domain_atoms: Vec<String>,
}

impl Report {
    /// The verdict: the most severe observation, collapsed to
    /// [`Status::Valid`] when it falls below the configured error level.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Every observation made during the scan, in ascending code order.
    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    /// The local part, with quoted strings and quoted pairs still quoted.
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// The domain, including the brackets of a domain literal.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The body of the domain literal, empty if there was none.
    pub fn domain_literal(&self) -> &str {
        &self.domain_literal
    }

    /// The dot-separated elements of the local part.
    pub fn local_atoms(&self) -> &[String] {
        &self.local_atoms
    }

    /// The dot-separated elements of the domain.
    pub fn domain_atoms(&self) -> &[String] {
        &self.domain_atoms
    }
}

/// Checks that an email address conforms to RFCs 5321, 5322 and others.
///
/// An RFC 5321 Mailbox and an RFC 5322 addr-spec can both be regarded as a
/// valid email address depending on the context; the Mailbox specification
/// is the more restrictive one (no comments, no white space, no obsolete
/// forms). The validator therefore never answers with a bare yes or no but
/// with the most severe [`Status`] it observed, and [`is_valid`] draws the
/// line at the envelope-safe bands.
///
/// # Examples
///
/// ```
/// use mailcheck::{EmailValidator, Status};
///
/// let validator = EmailValidator::new();
/// assert_eq!(validator.diagnose("test@iana.org").status(), Status::Valid);
/// assert_eq!(
///     validator.diagnose("test@[255.255.255.255]").status(),
///     Status::Rfc5321AddressLiteral,
/// );
/// assert!(validator.is_valid("test@iana.org"));
/// ```
///
/// [`is_valid`]: EmailValidator::is_valid
#[derive(Clone, Copy, Default)]
pub struct EmailValidator<'a> {
    resolver: Option<&'a dyn Resolver>,
    error_level: ErrorLevel,
}

impl<'a> EmailValidator<'a> {
    /// Creates a validator with DNS checks off and every status surfaced.
    pub fn new() -> Self {
        EmailValidator {
            resolver: None,
            error_level: ErrorLevel::Error,
        }
    }

    /// Enables DNS checks through the given resolver.
    pub fn resolver(mut self, resolver: &'a dyn Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the error level [`diagnose`](EmailValidator::diagnose) reports
    /// at.
    pub fn error_level(mut self, error_level: ErrorLevel) -> Self {
        self.error_level = error_level;
        self
    }

    /// Diagnoses `email` and reports the full outcome.
    pub fn diagnose(&self, email: &str) -> Report {
        let outcome = self.evaluate(email);
        let worst = outcome.worst();
        let status = if worst.code() < self.error_level.threshold() {
            Status::Valid
        } else {
            worst
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("diagnosed {:?} as {}", email, status);

        let mut statuses: Vec<Status> = outcome.statuses.into_iter().collect();
        if statuses.is_empty() {
            statuses.push(Status::Valid);
        }
        let parsed = outcome.parsed;
        Report {
            status,
            statuses,
            local_part: parsed.local_part,
            domain: parsed.domain,
            domain_literal: parsed.literal,
            local_atoms: parsed.local_atoms,
            domain_atoms: parsed.domain_atoms,
        }
    }

    /// Whether `email` is usable as an envelope address.
    ///
    /// Equivalent to diagnosing and comparing against the fixed boolean
    /// threshold; the configured error level plays no part here.
    pub fn is_valid(&self, email: &str) -> bool {
        self.evaluate(email).worst().code() < BOOLEAN_THRESHOLD
    }

    fn evaluate(&self, email: &str) -> Outcome {
        let decoded = decode(email);
        let mut outcome = Parser::new(&decoded).run();

        let mut dns_checked = false;
        if let Some(resolver) = self.resolver {
            if outcome.worst().code() < Category::DnsWarn as u8 {
                dns_checked = check_dns(resolver, &mut outcome);
            }
        }

        // TLD addresses are specifically allowed by RFC 5321 but are more
        // likely to be typos than genuine addresses, unless DNS already
        // established that the domain has an MX record
        if !dns_checked && outcome.worst().code() < Category::DnsWarn as u8 {
            if outcome.parsed.domain_atoms.len() == 1 {
                outcome.statuses.insert(Status::Rfc5321Tld);
            }
            let last_atom = outcome.parsed.domain_atoms.last();
            if last_atom.is_some_and(|atom| atom.starts_with(|c: char| c.is_ascii_digit())) {
                // a valid host name can never have the dotted-decimal form,
                // since the highest-level label cannot start with a digit
                // (RFC 1123 erratum 1353)
                outcome.statuses.insert(Status::Rfc5321TldNumeric);
            }
        }

        outcome
    }
}

impl Debug for EmailValidator<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EmailValidator")
            .field("dns", &self.resolver.is_some())
            .field("error_level", &self.error_level)
            .finish()
    }
}

/// Convenience wrapper: boolean verdict, DNS checks off.
///
/// # Examples
///
/// ```
/// assert!(mailcheck::is_email("test@iana.org"));
/// assert!(!mailcheck::is_email("test..test@iana.org"));
/// ```
pub fn is_email(email: &str) -> bool {
    EmailValidator::new().is_valid(email)
}

/// The MX, A, CNAME ladder. Returns whether an MX record was found.
fn check_dns(resolver: &dyn Resolver, outcome: &mut Outcome) -> bool {
    let mut query = outcome.parsed.domain.clone();
    if outcome.parsed.domain_atoms.len() == 1 {
        // a dotless name only resolves reliably from the root
        query.push('.');
    }

    match resolve_with_retry(resolver, &query, RecordType::Mx) {
        Some(ref lookup) if lookup.has_records() => true,
        Some(Lookup::NxDomain | Lookup::NoNameservers) => {
            outcome.statuses.insert(Status::DnsWarnNoRecord);
            false
        }
        Some(_) => {
            // the domain exists but receives no mail directly; an A or
            // CNAME record is still evidence the domain is real
            #[cfg(feature = "tracing")]
            tracing::debug!("no MX record for {}", query);
            outcome.statuses.insert(Status::DnsWarnNoMxRecord);

            let found = [RecordType::A, RecordType::Cname].iter().any(|&record| {
                resolve_with_retry(resolver, &query, record)
                    .is_some_and(|lookup| lookup.has_records())
            });
            if !found {
                outcome.statuses.insert(Status::DnsWarnNoRecord);
            }
            false
        }
        // a persistent timeout raises no status at all
        None => false,
    }
}

fn resolve_with_retry(
    resolver: &dyn Resolver,
    domain: &str,
    record: RecordType,
) -> Option<Lookup> {
    let mut lookup = resolver.resolve(domain, record);
    let mut retries = 0;
    while lookup == Lookup::Timeout && retries < TIMEOUT_RETRIES {
        retries += 1;
        lookup = resolver.resolve(domain, record);
    }
    match lookup {
        Lookup::Timeout => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::resolver::StubResolver;

    use super::*;

    fn diagnose(email: &str) -> Status {
        EmailValidator::new().diagnose(email).status()
    }

    #[test]
    fn scenarios_without_dns() {
        assert_eq!(diagnose("test@iana.org"), Status::Valid);
        assert_eq!(diagnose("first.last@iana.org"), Status::Valid);
        assert_eq!(diagnose("test..test@iana.org"), Status::ErrConsecutiveDots);
        assert_eq!(diagnose("@iana.org"), Status::ErrNoLocalPart);
        assert_eq!(diagnose("test@"), Status::ErrNoDomain);
        assert_eq!(diagnose("test@iana"), Status::Rfc5321Tld);
        assert_eq!(diagnose("test@123"), Status::Rfc5321TldNumeric);
        assert_eq!(diagnose("\"test\"@iana.org"), Status::Rfc5321QuotedString);
        assert_eq!(
            diagnose("test@[255.255.255.255]"),
            Status::Rfc5321AddressLiteral
        );
        assert_eq!(diagnose("test@[IPv6:1::1]"), Status::Rfc5321AddressLiteral);
        assert_eq!(
            diagnose("test@[IPv6:1::1::1]"),
            Status::Rfc5322Ipv6DoubleDoubleColon
        );
        assert_eq!(diagnose("(comment)test@iana.org"), Status::CfwsComment);
        assert_eq!(diagnose("test@iana.org "), Status::CfwsFws);
    }

    #[test]
    fn numeric_last_label_is_flagged_even_with_dots() {
        assert_eq!(diagnose("test@255.255.255.255"), Status::Rfc5321TldNumeric);
    }

    #[test]
    fn length_caps_fire_exactly_at_their_boundary() {
        let local_64 = "a".repeat(64);
        let local_65 = "a".repeat(65);
        assert_eq!(diagnose(&format!("{local_64}@iana.org")), Status::Valid);
        assert_eq!(
            diagnose(&format!("{local_65}@iana.org")),
            Status::Rfc5322LocalTooLong
        );

        let label_63 = "a".repeat(63);
        let label_64 = "a".repeat(64);
        assert_eq!(diagnose(&format!("test@{label_63}.com")), Status::Valid);
        assert_eq!(
            diagnose(&format!("test@{label_64}.com")),
            Status::Rfc5322LabelTooLong
        );
        // the cap also applies to the final label
        assert_eq!(
            diagnose(&format!("test@com.{label_64}")),
            Status::Rfc5322LabelTooLong
        );

        // four dots and five labels of 63+63+63+51+12 octets: 256 in all
        let domain_256 = format!(
            "{}.{}.{}.{}.{}",
            "a".repeat(63),
            "a".repeat(63),
            "a".repeat(63),
            "a".repeat(51),
            "a".repeat(12),
        );
        assert_eq!(domain_256.len(), 256);
        let domain_255 = &domain_256[1..];
        assert_eq!(diagnose(&format!("test@{domain_255}")), Status::Valid);
        assert_eq!(
            diagnose(&format!("test@{domain_256}")),
            Status::Rfc5322DomainTooLong
        );

        // 64 + 1 + 190 octets: 255 in all, one over the Mailbox cap
        let domain_190 = format!("{}.{}.{}", "a".repeat(63), "a".repeat(63), "a".repeat(62));
        assert_eq!(domain_190.len(), 190);
        assert_eq!(
            diagnose(&format!("{local_64}@{domain_190}")),
            Status::Rfc5322TooLong
        );
        let domain_189 = &domain_190[1..];
        assert_eq!(diagnose(&format!("{local_64}@{domain_189}")), Status::Valid);
    }

    #[test]
    fn diagnose_is_deterministic() {
        let validator = EmailValidator::new();
        let first = validator.diagnose("test@(comment)iana.org");
        let second = validator.diagnose("test@(comment)iana.org");
        assert_eq!(first, second);
    }

    #[test]
    fn error_level_collapses_codes_below_the_threshold() {
        let address = "(comment)test@iana.org";
        let raw = EmailValidator::new().diagnose(address).status();
        assert_eq!(raw, Status::CfwsComment);

        let warning = EmailValidator::new().error_level(ErrorLevel::Warning);
        assert_eq!(warning.diagnose(address).status(), Status::CfwsComment);
        assert_eq!(warning.diagnose("test@iana").status(), Status::Valid);

        let above = EmailValidator::new().error_level(ErrorLevel::Threshold(18));
        assert_eq!(above.diagnose(address).status(), Status::Valid);

        let exactly = EmailValidator::new().error_level(ErrorLevel::Threshold(17));
        assert_eq!(exactly.diagnose(address).status(), Status::CfwsComment);
    }

    #[test]
    fn boolean_mode_draws_the_line_below_cfws() {
        assert!(is_email("test@iana.org"));
        assert!(is_email("test@iana"));
        assert!(is_email("\"test\"@iana.org"));
        assert!(!is_email("(comment)test@iana.org"));
        assert!(!is_email("test..test@iana.org"));
    }

    #[test]
    fn report_exposes_the_components() {
        let report = EmailValidator::new().diagnose("first.last@[IPv6:1::1]");
        assert_eq!(report.local_part(), "first.last");
        assert_eq!(report.domain(), "[IPv6:1::1]");
        assert_eq!(report.domain_literal(), "IPv6:1::1");
        assert_eq!(report.local_atoms(), ["first", "last"]);
        assert_eq!(report.domain_atoms(), ["[IPv6:1::1]"]);
        assert_eq!(
            report.statuses(),
            [Status::Rfc5321AddressLiteral]
        );
    }

    #[test]
    fn valid_reports_list_a_single_valid_status() {
        let report = EmailValidator::new().diagnose("test@iana.org");
        assert_eq!(report.statuses(), [Status::Valid]);

        // Valid never pads a non-empty observation list
        let report = EmailValidator::new().diagnose("test@iana");
        assert_eq!(report.statuses(), [Status::Rfc5321Tld]);
    }

    #[test]
    fn mx_record_found_means_no_warning() {
        let resolver = StubResolver::default().answer(
            "iana.org",
            RecordType::Mx,
            Lookup::Records(vec!["mx.iana.org".into()]),
        );
        let validator = EmailValidator::new().resolver(&resolver);
        assert_eq!(validator.diagnose("test@iana.org").status(), Status::Valid);
        assert_eq!(resolver.calls(), 1);
    }

    #[test]
    fn missing_mx_falls_back_to_a_then_cname() {
        let resolver = StubResolver::new(Lookup::Empty)
            .answer("iana.org", RecordType::A, Lookup::Records(vec!["192.0.2.1".into()]));
        let validator = EmailValidator::new().resolver(&resolver);
        let report = validator.diagnose("test@iana.org");
        assert_eq!(report.status(), Status::DnsWarnNoMxRecord);
        assert_eq!(resolver.calls(), 2);

        let resolver = StubResolver::new(Lookup::Empty);
        let validator = EmailValidator::new().resolver(&resolver);
        let report = validator.diagnose("test@iana.org");
        assert_eq!(report.status(), Status::DnsWarnNoRecord);
        assert_eq!(
            report.statuses(),
            [Status::DnsWarnNoMxRecord, Status::DnsWarnNoRecord]
        );
        assert_eq!(resolver.calls(), 3);
    }

    #[test]
    fn unknown_domains_warn_without_an_mx_status() {
        let resolver = StubResolver::default();
        let validator = EmailValidator::new().resolver(&resolver);
        let report = validator.diagnose("test@iana.org");
        assert_eq!(report.status(), Status::DnsWarnNoRecord);
        assert_eq!(report.statuses(), [Status::DnsWarnNoRecord]);
    }

    #[test]
    fn timeouts_are_retried_then_absorbed() {
        let resolver = StubResolver::default()
            .answer("iana.org", RecordType::Mx, Lookup::Timeout)
            .answer(
                "iana.org",
                RecordType::Mx,
                Lookup::Records(vec!["mx.iana.org".into()]),
            );
        let validator = EmailValidator::new().resolver(&resolver);
        assert_eq!(validator.diagnose("test@iana.org").status(), Status::Valid);
        assert_eq!(resolver.calls(), 2);

        let resolver = StubResolver::new(Lookup::Timeout);
        let validator = EmailValidator::new().resolver(&resolver);
        assert_eq!(validator.diagnose("test@iana.org").status(), Status::Valid);
        // one attempt plus three retries, then silence
        assert_eq!(resolver.calls(), 4);
    }

    #[test]
    fn dns_warnings_do_not_suppress_the_tld_policy() {
        // warning-band codes sit below the DnsWarn gate themselves, so a
        // failed lookup still leaves the TLD checks to run; the numeric
        // maximum wins
        let resolver = StubResolver::default();
        let validator = EmailValidator::new().resolver(&resolver);
        let report = validator.diagnose("test@iana");
        assert_eq!(
            report.statuses(),
            [Status::DnsWarnNoRecord, Status::Rfc5321Tld]
        );
        assert_eq!(report.status(), Status::Rfc5321Tld);

        let resolver = StubResolver::new(Lookup::Empty);
        let validator = EmailValidator::new().resolver(&resolver);
        let report = validator.diagnose("test@123");
        assert_eq!(
            report.statuses(),
            [
                Status::DnsWarnNoMxRecord,
                Status::DnsWarnNoRecord,
                Status::Rfc5321Tld,
                Status::Rfc5321TldNumeric,
            ]
        );
        assert_eq!(report.status(), Status::Rfc5321TldNumeric);
    }

    #[test]
    fn dotless_domains_are_queried_from_the_root() {
        let resolver = StubResolver::default().answer(
            "iana.",
            RecordType::Mx,
            Lookup::Records(vec!["mx.iana.org".into()]),
        );
        let validator = EmailValidator::new().resolver(&resolver);
        // the MX record suppresses the TLD status
        assert_eq!(validator.diagnose("test@iana").status(), Status::Valid);
    }

    #[test]
    fn dns_is_skipped_once_the_verdict_is_warning_or_worse() {
        let resolver = StubResolver::default();
        let validator = EmailValidator::new().resolver(&resolver);
        assert_eq!(
            validator.diagnose("test@[255.255.255.255]").status(),
            Status::Rfc5321AddressLiteral
        );
        assert_eq!(resolver.calls(), 0);
    }
}
