use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use im::{OrdMap, Vector};

/// An uppercase placeholder symbol with a finite domain of replacements.
pub type Variable = char;

/// Per-variable domains of literal candidate strings.
///
/// The candidate order inside each domain is fixed by the simplifier and is
/// the order in which the search branches, so single-task runs are
/// reproducible.
pub type Domains = OrdMap<Variable, Vector<Arc<str>>>;

/// A chosen replacement for each variable; partial during search.
///
/// Iteration is in variable order, which is also the reporting order of a
/// solution.
pub type Assignment = OrdMap<Variable, Arc<str>>;

/// One anchor slot per clause: the offset in the master string where the
/// clause's embedding starts, or `None` while the clause is unanchored.
pub type Positions = Vector<Option<usize>>;

/// One element of a clause template: either a literal lowercase letter or an
/// uppercase variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Literal(char),
    Var(Variable),
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Symbol> {
        if c.is_ascii_lowercase() {
            Some(Symbol::Literal(c))
        } else if c.is_ascii_uppercase() {
            Some(Symbol::Var(c))
        } else {
            None
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Literal(c) | Symbol::Var(c) => *c,
        }
    }
}

/// A pattern of literals and variables that must become a substring of the
/// master string after substitution.
///
/// Two clauses with identical symbol sequences are interchangeable, so
/// structural equality is also semantic equality and drives deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Clause(Vec<Symbol>);

impl Clause {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The variables referenced by this clause, in symbol order, with
    /// repeats.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.iter().filter_map(|symbol| match symbol {
            Symbol::Var(v) => Some(*v),
            Symbol::Literal(_) => None,
        })
    }

    /// Expands every variable occurrence through `assignment`, yielding the
    /// literal string this clause requires as a substring.
    ///
    /// Fails with the offending variable if the assignment does not bind it.
    pub fn substitute(&self, assignment: &Assignment) -> Result<String, Variable> {
        let mut expansion = String::with_capacity(self.0.len());
        for symbol in &self.0 {
            match symbol {
                Symbol::Literal(c) => expansion.push(*c),
                Symbol::Var(v) => expansion.push_str(assignment.get(v).ok_or(*v)?),
            }
        }
        Ok(expansion)
    }
}

/// The character outside `[a-zA-Z]` that made a clause template invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid character {0:?} in clause template")]
pub struct InvalidSymbol(pub char);

impl FromStr for Clause {
    type Err = InvalidSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| Symbol::from_char(c).ok_or(InvalidSymbol(c)))
            .collect::<Result<Vec<_>, _>>()
            .map(Clause)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

/// A validated problem instance: the master string, the clause templates and
/// the variable domains.
///
/// Built once from input, reshaped by the simplifier, then shared read-only
/// (behind an `Arc`) across all search tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub s: Arc<str>,
    pub clauses: Vec<Clause>,
    pub domains: Domains,
}

impl Problem {
    pub fn new(s: impl Into<Arc<str>>, clauses: Vec<Clause>, domains: Domains) -> Self {
        Self {
            s: s.into(),
            clauses,
            domains,
        }
    }

    /// The first variable encountered scanning clauses left to right; the
    /// coordinator fans out over this variable's candidates.
    pub fn seed_variable(&self) -> Option<Variable> {
        self.clauses.iter().flat_map(Clause::variables).next()
    }

    /// An all-unanchored position vector, one slot per clause.
    pub fn initial_positions(&self) -> Positions {
        self.clauses.iter().map(|_| None).collect()
    }

    /// Product of the domain sizes: the number of total assignments the
    /// search space contains. Diagnostic only.
    pub fn difficulty(&self) -> u128 {
        self.domains
            .values()
            .fold(1u128, |acc, candidates| acc.saturating_mul(candidates.len() as u128))
    }
}
