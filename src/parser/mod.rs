//! Single-pass addr-spec / Mailbox parser
//!
//! The parser walks the input one character at a time, dispatching on the
//! production it is currently inside. Nested productions (comments, quoted
//! strings, quoted pairs, folding white space) are tracked with an explicit
//! context stack rather than recursion, so "return to the enclosing
//! production" is a pop. Everything the parser notices about the address is
//! recorded as a [`Status`]; the worst one decides the verdict.

mod literal;

use std::collections::BTreeSet;

use crate::status::{Category, Status};

/// US-ASCII visible characters not valid for atext
/// (RFC 5322 section 3.2.3).
const SPECIALS: &str = "()<>[]:;@\\,.\"";

/// The production the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    LocalPart,
    Domain,
    /// Inside `[...]`
    Literal,
    /// Inside `(...)`
    Comment,
    /// Inside `"..."`
    QuotedString,
    /// After a backslash
    QuotedPair,
    /// Folding white space run
    Fws,
}

/// Components accumulated while scanning.
///
/// The atom lists hold the dot-separated elements of the local part and the
/// domain; joining them with dots reproduces the component, except for dots
/// embedded in quoted strings or literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Parsed {
    pub local_part: String,
    pub domain: String,
    /// Body of the most recent domain literal
    pub literal: String,
    pub local_atoms: Vec<String>,
    pub domain_atoms: Vec<String>,
}

/// Everything the scan produced: the observation set and the components.
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub statuses: BTreeSet<Status>,
    pub parsed: Parsed,
}

impl Outcome {
    /// The most severe observation so far, `Valid` if there were none.
    pub(crate) fn worst(&self) -> Status {
        self.statuses.iter().next_back().copied().unwrap_or(Status::Valid)
    }
}

pub(crate) struct Parser {
    chars: Vec<char>,
    i: usize,
    /// The current character, for the end-of-input checks
    token: Option<char>,
    context: Context,
    stack: Vec<Context>,
    /// The context most recently exited
    context_prior: Context,
    /// The previous character, only maintained around white space runs
    token_prior: char,
    /// Index of the current dot-atom element
    element_count: usize,
    /// Length in octets of the current dot-atom element
    element_len: usize,
    wsp_before: bool,
    wsp_after: bool,
    /// CRLF folds seen, never reset within one parse
    fws_count: u32,
    /// The previous domain character was a hyphen
    hyphen_flag: bool,
    /// The current element is closed, only CFWS may follow
    end_or_die: bool,
    /// Hand the current character back to the parent context
    redispatch: bool,
    parsed: Parsed,
    statuses: BTreeSet<Status>,
    worst: Status,
}

impl Parser {
    pub(crate) fn new(input: &str) -> Parser {
        Parser {
            chars: input.chars().collect(),
            i: 0,
            token: None,
            context: Context::LocalPart,
            stack: vec![Context::LocalPart],
            context_prior: Context::LocalPart,
            token_prior: '\0',
            element_count: 0,
            element_len: 0,
            wsp_before: false,
            wsp_after: false,
            fws_count: 0,
            hyphen_flag: false,
            end_or_die: false,
            redispatch: false,
            parsed: Parsed {
                local_atoms: vec![String::new()],
                domain_atoms: vec![String::new()],
                ..Parsed::default()
            },
            statuses: BTreeSet::new(),
            worst: Status::Valid,
        }
    }

    pub(crate) fn run(mut self) -> Outcome {
        while self.i < self.chars.len() {
            let c = self.chars[self.i];
            self.token = Some(c);

            match self.context {
                Context::LocalPart => self.local_part(c),
                Context::Domain => self.domain(c),
                Context::Literal => self.literal(c),
                Context::QuotedString => self.quoted_string(c),
                Context::QuotedPair => self.quoted_pair(c),
                Context::Comment => self.comment(c),
                Context::Fws => self.fws(c),
            }

            if self.worst.is_fatal() {
                break;
            }
            if self.redispatch {
                self.redispatch = false;
            } else {
                self.i += 1;
            }
        }
        self.finish()
    }

    fn record(&mut self, status: Status) {
        self.statuses.insert(status);
        if status > self.worst {
            self.worst = status;
        }
    }

    fn worst_below(&self, category: Category) -> bool {
        (self.worst as u8) < category as u8
    }

    fn push(&mut self, next: Context) {
        self.stack.push(self.context);
        self.context = next;
    }

    fn pop(&mut self) {
        self.context = self.stack.pop().expect("context stack underflow");
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).copied()
    }

    fn next_is(&self, expected: char) -> bool {
        self.peek(1) == Some(expected)
    }

    fn at_last_char(&self) -> bool {
        self.i + 1 == self.chars.len()
    }

    fn local_push(&mut self, c: char) {
        self.parsed.local_part.push(c);
        self.parsed.local_atoms[self.element_count].push(c);
    }

    fn domain_push(&mut self, c: char) {
        self.parsed.domain.push(c);
        self.parsed.domain_atoms[self.element_count].push(c);
    }

    /// local-part = dot-atom / quoted-string / obs-local-part
    /// (RFC 5322 section 3.4.1)
    fn local_part(&mut self, c: char) {
        match c {
            '(' => {
                if self.element_len == 0 {
                    // comments are OK at the beginning of an element
                    self.record(if self.element_count == 0 {
                        Status::CfwsComment
                    } else {
                        Status::DeprecComment
                    });
                } else {
                    self.record(Status::CfwsComment);
                    // a comment cannot open mid-element, so the element is over
                    self.end_or_die = true;
                }
                self.push(Context::Comment);
            }
            '.' => {
                if self.element_len == 0 {
                    self.record(if self.element_count == 0 {
                        Status::ErrDotStart
                    } else {
                        Status::ErrConsecutiveDots
                    });
                } else {
                    // the whole local part may be one quoted string; a quoted
                    // string as just one atom among several is obsolete
                    if self.end_or_die {
                        self.record(Status::DeprecLocalPart);
                    }
                    self.end_or_die = false;
                    self.element_len = 0;
                    self.element_count += 1;
                    self.parsed.local_part.push('.');
                    self.parsed.local_atoms.push(String::new());
                }
            }
            '"' => {
                if self.element_len == 0 {
                    self.record(if self.element_count == 0 {
                        Status::Rfc5321QuotedString
                    } else {
                        Status::DeprecLocalPart
                    });
                    self.local_push('"');
                    self.element_len += 1;
                    // the quoted string must be the entire element
                    self.end_or_die = true;
                    self.push(Context::QuotedString);
                } else {
                    self.record(Status::ErrExpectingAtext);
                }
            }
            '\r' | ' ' | '\t' => {
                if c == '\r' && !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                if self.element_len == 0 {
                    self.record(if self.element_count == 0 {
                        Status::CfwsFws
                    } else {
                        Status::DeprecFws
                    });
                } else {
                    // FWS cannot open mid-element either
                    self.end_or_die = true;
                }
                self.push(Context::Fws);
                self.token_prior = c;
            }
            '@' => {
                debug_assert_eq!(
                    self.stack.len(),
                    1,
                    "unexpected item on the context stack at '@'"
                );
                if self.parsed.local_part.is_empty() {
                    self.record(Status::ErrNoLocalPart);
                } else if self.element_len == 0 {
                    self.record(Status::ErrDotEnd);
                } else if self.parsed.local_part.len() > 64 {
                    // RFC 5321 section 4.5.3.1.1, 64 octets
                    self.record(Status::Rfc5322LocalTooLong);
                } else if matches!(self.context_prior, Context::Comment | Context::Fws) {
                    // RFC 5322 section 3.4.1: CFWS SHOULD NOT be used
                    // around the "@"
                    self.record(Status::DeprecCfwsNearAt);
                }

                // clear everything down for the domain
                self.context = Context::Domain;
                self.stack = vec![Context::Domain];
                self.element_count = 0;
                self.element_len = 0;
                self.end_or_die = false;
            }
            _ => {
                if self.end_or_die {
                    // atext where the element is already closed
                    match self.context_prior {
                        Context::Comment | Context::Fws => {
                            self.record(Status::ErrAtextAfterCfws);
                        }
                        Context::QuotedString => {
                            self.record(Status::ErrAtextAfterQuotedString);
                        }
                        prior => unreachable!("atext after {prior:?}"),
                    }
                } else {
                    self.context_prior = self.context;
                    let ord = c as u32;
                    if !(33..=126).contains(&ord) || SPECIALS.contains(c) {
                        self.record(Status::ErrExpectingAtext);
                    }
                    self.local_push(c);
                    self.element_len += 1;
                }
            }
        }
    }

    /// domain = dot-atom / domain-literal / obs-domain
    ///
    /// Addressing information must comply with RFC 5321 (and in turn
    /// RFC 1035); anything semantically invisible need only comply with
    /// RFC 5322.
    fn domain(&mut self, c: char) {
        match c {
            '(' => {
                if self.element_len == 0 {
                    // comments at the start of the domain are deprecated in
                    // the text; comments at the start of a subdomain are
                    // obs-domain
                    self.record(if self.element_count == 0 {
                        Status::DeprecCfwsNearAt
                    } else {
                        Status::DeprecComment
                    });
                } else {
                    self.record(Status::CfwsComment);
                    self.end_or_die = true;
                }
                self.push(Context::Comment);
            }
            '.' => {
                if self.element_len == 0 {
                    self.record(if self.element_count == 0 {
                        Status::ErrDotStart
                    } else {
                        Status::ErrConsecutiveDots
                    });
                } else if self.hyphen_flag {
                    self.record(Status::ErrDomainHyphenEnd);
                } else {
                    // RFC 1035 section 2.3.4: labels are 63 octets or less;
                    // RFC 5321 domains inherit the DNS label rules
                    if self.element_len > 63 {
                        self.record(Status::Rfc5322LabelTooLong);
                    }
                    self.end_or_die = false;
                    self.element_len = 0;
                    self.element_count += 1;
                    self.parsed.domain_atoms.push(String::new());
                    self.parsed.domain.push('.');
                }
            }
            '[' => {
                if self.parsed.domain.is_empty() {
                    // a domain literal must be the only component
                    self.end_or_die = true;
                    self.element_len += 1;
                    self.push(Context::Literal);
                    self.domain_push('[');
                    self.parsed.literal.clear();
                } else {
                    self.record(Status::ErrExpectingAtext);
                }
            }
            '\r' | ' ' | '\t' => {
                if c == '\r' && !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                if self.element_len == 0 {
                    self.record(if self.element_count == 0 {
                        Status::DeprecCfwsNearAt
                    } else {
                        Status::DeprecFws
                    });
                } else {
                    self.record(Status::CfwsFws);
                    self.end_or_die = true;
                }
                self.push(Context::Fws);
                self.token_prior = c;
            }
            _ => {
                if self.end_or_die {
                    match self.context_prior {
                        Context::Comment | Context::Fws => {
                            self.record(Status::ErrAtextAfterCfws);
                        }
                        Context::Literal => {
                            self.record(Status::ErrAtextAfterDomainLiteral);
                        }
                        prior => unreachable!("atext after {prior:?}"),
                    }
                }

                let ord = c as u32;
                self.hyphen_flag = false;

                if !(33..=126).contains(&ord) || SPECIALS.contains(c) {
                    self.record(Status::ErrExpectingAtext);
                } else if c == '-' {
                    if self.element_len == 0 {
                        // hyphens cannot start a subdomain
                        self.record(Status::ErrDomainHyphenStart);
                    }
                    self.hyphen_flag = true;
                } else if !c.is_ascii_alphanumeric() {
                    // RFC 5322 allows any atext, but RFC 5321 subdomains are
                    // letter-digit-hyphen only (RFCs 1034 and 1123)
                    self.record(Status::Rfc5322Domain);
                }

                self.domain_push(c);
                self.element_len += 1;
            }
        }
    }

    /// domain-literal = [CFWS] "[" *([FWS] dtext) [FWS] "]" [CFWS]
    fn literal(&mut self, c: char) {
        match c {
            ']' => {
                if self.worst_below(Category::Deprec) {
                    // could still be a valid RFC 5321 address literal
                    let found = literal::analyze(&self.parsed.literal);
                    for status in found {
                        self.record(status);
                    }
                }
                self.domain_push(']');
                self.element_len += 1;
                self.context_prior = Context::Literal;
                self.pop();
            }
            '\\' => {
                self.record(Status::Rfc5322DomainLiteralObsDtext);
                self.push(Context::QuotedPair);
            }
            '\r' | ' ' | '\t' => {
                if c == '\r' && !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                self.record(Status::CfwsFws);
                self.push(Context::Fws);
                self.token_prior = c;
            }
            _ => {
                // dtext = %d33-90 / %d94-126 / obs-dtext
                let ord = c as u32;
                if ord > 127 || ord == 0 || c == '[' {
                    self.record(Status::ErrExpectingDtext);
                    return;
                } else if ord < 33 || ord == 127 {
                    // obs-NO-WS-CTL
                    self.record(Status::Rfc5322DomainLiteralObsDtext);
                }
                self.parsed.literal.push(c);
                self.domain_push(c);
                self.element_len += 1;
            }
        }
    }

    /// quoted-string = [CFWS] DQUOTE *([FWS] qcontent) [FWS] DQUOTE [CFWS]
    fn quoted_string(&mut self, c: char) {
        match c {
            '\\' => self.push(Context::QuotedPair),
            '\r' | '\t' => {
                // inside a quoted string, a space is an ordinary character;
                // only HTAB or CRLF make this FWS
                if c == '\r' && !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                // FWS inside the quoted string is semantically invisible and
                // collapses to a single space (RFC 5322 sections 3.2.2, 3.2.4)
                self.local_push(' ');
                self.element_len += 1;
                self.record(Status::CfwsFws);
                self.push(Context::Fws);
                self.token_prior = c;
            }
            '"' => {
                self.local_push('"');
                self.element_len += 1;
                self.context_prior = Context::QuotedString;
                self.pop();
            }
            _ => {
                // qtext = %d33 / %d35-91 / %d93-126 / obs-qtext
                let ord = c as u32;
                if ord > 127 || ord == 0 || ord == 10 {
                    self.record(Status::ErrExpectingQtext);
                } else if ord < 32 || ord == 127 {
                    self.record(Status::DeprecQtext);
                }
                self.local_push(c);
                self.element_len += 1;
            }
        }
    }

    /// quoted-pair = ("\" (VCHAR / WSP)) / obs-qp
    ///
    /// Consumes the one character after the backslash, then pops back to
    /// whichever production the pair occurred in.
    fn quoted_pair(&mut self, c: char) {
        let ord = c as u32;
        if ord > 127 {
            self.record(Status::ErrExpectingQuotedPair);
        } else if (ord < 31 && ord != 9) || ord == 127 {
            // SP and HTAB are plain WSP; anything else below 31 is obs-qp
            self.record(Status::DeprecQuotedPair);
        }

        self.context_prior = Context::QuotedPair;
        self.pop();

        match self.context {
            Context::Comment => {}
            Context::QuotedString => {
                self.local_push('\\');
                self.local_push(c);
                // RFC 5321 maximum sizes are octet counts, so the backslash
                // counts too
                self.element_len += 2;
            }
            Context::Literal => {
                self.domain_push('\\');
                self.domain_push(c);
                self.element_len += 2;
            }
            parent => unreachable!("quoted pair inside {parent:?}"),
        }
    }

    /// comment = "(" *([FWS] ccontent) [FWS] ")"
    fn comment(&mut self, c: char) {
        match c {
            '(' => {
                // nested comments are OK
                self.push(Context::Comment);
            }
            ')' => {
                self.context_prior = Context::Comment;
                self.pop();
            }
            '\\' => self.push(Context::QuotedPair),
            '\r' | ' ' | '\t' => {
                if c == '\r' && !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                self.record(Status::CfwsFws);
                self.push(Context::Fws);
                self.token_prior = c;
            }
            _ => {
                // ctext = %d33-39 / %d42-91 / %d93-126 / obs-ctext
                // comment text never reaches a component accumulator
                let ord = c as u32;
                if ord > 127 || ord == 0 || ord == 10 {
                    self.record(Status::ErrExpectingCtext);
                    return;
                } else if ord < 32 || ord == 127 {
                    self.record(Status::DeprecCtext);
                }
            }
        }
    }

    /// FWS = ([*WSP CRLF] 1*WSP) / obs-FWS
    fn fws(&mut self, c: char) {
        match c {
            ' ' | '\t' => {
                self.wsp_after = self.token_prior == '\n';
                self.wsp_before = !self.wsp_after;
                // more than one fold is obs-FWS
                if self.at_last_char() && self.fws_count > 1 {
                    self.record(Status::DeprecFws);
                }
            }
            '\r' => {
                if !self.next_is('\n') {
                    self.record(Status::ErrCrNoLf);
                    return;
                }
                if self.peek(2) == Some('\r') {
                    self.record(Status::ErrFwsCrlfX2);
                }
            }
            '\n' => {
                if self.token_prior != '\r' {
                    self.record(Status::ErrLfNoCr);
                    return;
                }
                if matches!(self.peek(1), Some('\r') | Some('\n')) {
                    self.record(Status::ErrFwsCrlfX2);
                } else if !self.wsp_before && !matches!(self.peek(1), Some(' ') | Some('\t')) {
                    self.record(Status::ErrFwsCrlfEnd);
                }
                self.fws_count += 1;
                self.wsp_before = false;
            }
            _ => {
                if !self.wsp_after
                    && self.token_prior == '\n'
                    && self.context_prior == Context::Fws
                {
                    self.record(Status::ErrFwsCrlfEnd);
                } else if self.fws_count > 1 {
                    self.record(Status::DeprecFws);
                }
                self.context_prior = Context::Fws;
                self.pop();
                // the parent context re-reads this character
                self.redispatch = true;
                self.wsp_before = false;
                self.wsp_after = false;
            }
        }
        self.token_prior = c;
    }

    /// Terminal checks once the input is exhausted.
    fn finish(mut self) -> Outcome {
        if self.worst_below(Category::Rfc5322) {
            if self.context == Context::QuotedString {
                self.record(Status::ErrUnclosedQuotedString);
            } else if self.context == Context::QuotedPair {
                self.record(Status::ErrBackslashEnd);
            } else if self.context == Context::Comment {
                self.record(Status::ErrUnclosedComment);
            } else if self.context == Context::Literal {
                self.record(Status::ErrUnclosedDomainLiteral);
            } else if self.token == Some('\r') {
                self.record(Status::ErrFwsCrlfEnd);
            } else if self.parsed.domain.is_empty() {
                self.record(Status::ErrNoDomain);
            } else if self.element_len == 0 {
                self.record(Status::ErrDotEnd);
            } else if self.hyphen_flag {
                self.record(Status::ErrDomainHyphenEnd);
            } else if self.parsed.domain.len() > 255 {
                // RFC 5321 section 4.5.3.1.2, 255 octets
                self.record(Status::Rfc5322DomainTooLong);
            } else if self.parsed.local_part.len() + 1 + self.parsed.domain.len() > 254 {
                // a forward-path is capped at 256 octets including the
                // punctuation, leaving 254 for the Mailbox itself
                // (RFC 5321 section 4.5.3.1.3 and RFC 3696 erratum 1690)
                self.record(Status::Rfc5322TooLong);
            } else if self.element_len > 63 {
                self.record(Status::Rfc5322LabelTooLong);
            }
        }

        Outcome {
            statuses: self.statuses,
            parsed: self.parsed,
        }
    }
}
