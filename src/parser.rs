//! Adapter for the textual SWE problem format.
//!
//! The format is line-oriented: an integer clause count `k`, the master
//! string, `k` clause templates, then one `VARIABLE:cand1,cand2,...` line per
//! variable domain. All input validation happens here; the solver core never
//! observes a malformed problem.

use std::sync::Arc;

use im::Vector;
use tracing::info;

use crate::problem::{Clause, Domains, Problem, Variable};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("first line must contain an integer clause count")]
    MissingClauseCount,
    #[error("master string must be a non-empty run of lowercase letters")]
    InvalidMasterString,
    #[error("expected {expected} clause templates, found {found}")]
    MissingClauses { expected: usize, found: usize },
    #[error("clause template must not be empty")]
    EmptyClause,
    #[error("invalid character {0:?} in clause template")]
    InvalidClauseCharacter(char),
    #[error("malformed domain line {0:?}, expected VARIABLE:cand1,cand2,...")]
    MalformedDomainLine(String),
    #[error("domain line must name a single uppercase variable, got {0:?}")]
    InvalidVariable(String),
    #[error("candidates for variable {variable} must be non-empty runs of lowercase letters")]
    InvalidCandidate { variable: Variable },
    #[error("variable {0} is referenced by a clause but has no domain declaration")]
    UndeclaredVariable(Variable),
}

/// Decodes the lines of an SWE file into a validated [`Problem`].
pub fn parse_swe<I, S>(lines: I) -> Result<Problem, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter();

    let k: usize = lines
        .next()
        .ok_or(ParseError::MissingClauseCount)?
        .as_ref()
        .trim()
        .parse()
        .map_err(|_| ParseError::MissingClauseCount)?;

    let s_line = lines.next().ok_or(ParseError::InvalidMasterString)?;
    let s = s_line.as_ref().trim().to_string();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ParseError::InvalidMasterString);
    }

    let mut clauses = Vec::with_capacity(k);
    for found in 0..k {
        let line = lines
            .next()
            .ok_or(ParseError::MissingClauses { expected: k, found })?;
        let template = line.as_ref().trim();
        if template.is_empty() {
            return Err(ParseError::EmptyClause);
        }
        let clause: Clause = template
            .parse()
            .map_err(|e: crate::problem::InvalidSymbol| ParseError::InvalidClauseCharacter(e.0))?;
        clauses.push(clause);
    }

    let mut domains = Domains::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let (lhs, rhs) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedDomainLine(line.to_string()))?;

        let mut lhs_chars = lhs.chars();
        let variable = match (lhs_chars.next(), lhs_chars.next()) {
            (Some(v), None) if v.is_ascii_uppercase() => v,
            _ => return Err(ParseError::InvalidVariable(lhs.to_string())),
        };

        let mut candidates: Vector<Arc<str>> = Vector::new();
        for candidate in rhs.split(',') {
            if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(ParseError::InvalidCandidate { variable });
            }
            candidates.push_back(Arc::from(candidate));
        }
        domains.insert(variable, candidates);
    }

    for clause in &clauses {
        for variable in clause.variables() {
            if !domains.contains_key(&variable) {
                return Err(ParseError::UndeclaredVariable(variable));
            }
        }
    }

    info!(
        master_len = s.len(),
        clauses = clauses.len(),
        variables = domains.len(),
        "parsed problem"
    );
    Ok(Problem::new(s, clauses, domains))
}
