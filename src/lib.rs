//! # Email address validation with diagnostics
//!
//! This crate checks a single string against the grammars and operational
//! rules for Internet email addresses: the envelope Mailbox of
//! [RFC 5321](https://tools.ietf.org/html/rfc5321), the message header
//! addr-spec of [RFC 5322](https://tools.ietf.org/html/rfc5322) including
//! its obsolete forms, IPv6 address literals
//! ([RFC 4291](https://tools.ietf.org/html/rfc4291)), and the DNS label
//! rules of RFCs 1035 and 1123.
//!
//! Rather than a bare yes or no, validation produces a [`Status`]: the most
//! severe observation a single pass over the address turned up. Statuses
//! fall into seven severity bands ([`Category`]), from `Valid` through
//! warnings and deprecated-but-parseable forms up to hard errors, so a
//! caller can draw the valid/invalid line wherever its context demands.
//!
//! ## Usage
//!
//! The one-call form answers the common question directly:
//!
//! ```
//! assert!(mailcheck::is_email("first.last@iana.org"));
//! assert!(!mailcheck::is_email("first..last@iana.org"));
//! ```
//!
//! For the full diagnosis, build an [`EmailValidator`]:
//!
//! ```
//! use mailcheck::{EmailValidator, ErrorLevel, Status};
//!
//! let validator = EmailValidator::new();
//!
//! let report = validator.diagnose("\"quoted\"@iana.org");
//! assert_eq!(report.status(), Status::Rfc5321QuotedString);
//! assert_eq!(report.local_part(), "\"quoted\"");
//!
//! // collapse everything below the CFWS band to Valid
//! let lenient = validator.error_level(ErrorLevel::Warning);
//! assert_eq!(lenient.diagnose("test@iana").status(), Status::Valid);
//! assert_eq!(
//!     lenient.diagnose("(comment)test@iana.org").status(),
//!     Status::CfwsComment,
//! );
//! ```
//!
//! DNS checks are off by default; supply a [`Resolver`] to enable them.
//! Lookup outcomes only ever add warning-band statuses:
//!
//! ```
//! use mailcheck::{EmailValidator, Lookup, Status, StubResolver};
//!
//! let resolver = StubResolver::new(Lookup::Empty);
//! let validator = EmailValidator::new().resolver(&resolver);
//! assert_eq!(
//!     validator.diagnose("test@iana.org").status(),
//!     Status::DnsWarnNoRecord,
//! );
//! ```
//!
//! Inputs are expected to be US-ASCII; HTML character references and the
//! Unicode control pictures (U+2400 and friends) are decoded before
//! parsing, and anything else above 127 is rejected by the grammar.
//! Internationalized (SMTPUTF8) addresses are out of scope, as is any
//! repair or normalization of what was parsed.
//!
//! ## Optional features
//!
//! * **serde**: `Serialize`/`Deserialize` for [`Status`] using its
//!   canonical name
//! * **tracing**: debug events for verdicts and DNS lookups

#![doc(html_root_url = "https://docs.rs/mailcheck/0.1.0")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod decode;
mod parser;
mod resolver;
#[cfg(feature = "serde")]
mod serde;
mod status;
mod validator;

pub use crate::resolver::{Lookup, RecordType, Resolver, StubResolver};
pub use crate::status::{Category, ParseStatusError, Status};
pub use crate::validator::{is_email, EmailValidator, ErrorLevel, Report};
