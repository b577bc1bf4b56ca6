//! DNS collaborator interface
//!
//! The validator never opens a socket itself. When a DNS check is requested
//! it goes through a [`Resolver`], and only ever asks three questions: is
//! there an MX record, failing that an A record, failing that a CNAME. The
//! answers can only ever add warning-band statuses to the verdict.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

/// DNS record types the validator may query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Mail exchanger
    Mx,
    /// IPv4 host address
    A,
    /// Canonical name
    Cname,
}

/// Outcome of a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The records found for the queried name and type
    Records(Vec<String>),
    /// The name exists but has no records of the queried type
    Empty,
    /// The name does not exist
    NxDomain,
    /// No nameservers answered for the zone
    NoNameservers,
    /// The query timed out
    Timeout,
}

impl Lookup {
    pub(crate) fn has_records(&self) -> bool {
        match self {
            Lookup::Records(records) => !records.is_empty(),
            _ => false,
        }
    }
}

/// A DNS resolver the validator can consult.
///
/// Implementations are expected to be internally thread safe; the validator
/// calls `resolve` with a bare domain name (a trailing dot is already
/// appended for dotless domains) and never retries anything except
/// [`Lookup::Timeout`].
pub trait Resolver {
    /// Looks up `domain` for records of the given type.
    fn resolve(&self, domain: &str, record: RecordType) -> Lookup;
}

/// A scripted resolver for tests.
///
/// Answers are queued per `(domain, record type)` pair and popped one per
/// query, so timeout-then-success sequences can be exercised; once a queue
/// runs dry the fallback answer is returned. The default fallback is
/// [`Lookup::NxDomain`].
#[derive(Debug)]
pub struct StubResolver {
    scripted: RefCell<HashMap<(String, RecordType), Vec<Lookup>>>,
    fallback: Lookup,
    calls: Cell<usize>,
}

impl Default for StubResolver {
    fn default() -> Self {
        StubResolver {
            scripted: RefCell::new(HashMap::new()),
            fallback: Lookup::NxDomain,
            calls: Cell::new(0),
        }
    }
}

impl StubResolver {
    /// Creates a resolver that answers every query with `fallback`.
    pub fn new(fallback: Lookup) -> Self {
        StubResolver {
            fallback,
            ..StubResolver::default()
        }
    }

    /// Queues `answer` for the next unanswered query on `(domain, record)`.
    pub fn answer(self, domain: &str, record: RecordType, answer: Lookup) -> Self {
        self.scripted
            .borrow_mut()
            .entry((domain.to_owned(), record))
            .or_default()
            .push(answer);
        self
    }

    /// How many queries this resolver has served.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Resolver for StubResolver {
    fn resolve(&self, domain: &str, record: RecordType) -> Lookup {
        self.calls.set(self.calls.get() + 1);
        let mut scripted = self.scripted.borrow_mut();
        match scripted.get_mut(&(domain.to_owned(), record)) {
            Some(answers) if !answers.is_empty() => answers.remove(0),
            _ => self.fallback.clone(),
        }
    }
}
