//! Dependency-expression grammar and the version total order used to
//! resolve it (spec §4.5). Deliberately hand-written rather than built on a
//! SemVer crate: the grammar this crate accepts is looser than SemVer (any
//! digit-run/lexical-run version string is valid), and re-implementing the
//! parser explicitly makes the failure modes of §7 visible at the call site
//! instead of hiding behind a regex.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::utils::DependencyParseError;

/// A version string compared by [`version_compare`] rather than parsed as
/// SemVer: runs of ASCII digits compare numerically, runs of anything else
/// compare lexicographically, and differing run kinds at the same position
/// make the run of digits the greater one (a permissive, widely-used
/// "natural sort" rule — the exact one spec §4.5 asks for).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(pub String);

impl Version {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        version_compare(self.as_str(), other.as_str())
    }
}

/// Splits a version string into alternating digit/non-digit runs, then
/// compares run by run: numeric runs compare by numeric value (so `"9"` <
/// `"10"`), non-numeric runs compare lexicographically, and if the two
/// strings run out of runs at different lengths the shorter one sorts first
/// (matching the common "natural sort" / `strverscmp` convention).
pub fn version_compare(a: &str, b: &str) -> Ordering {
    let mut a_runs = split_runs(a).into_iter();
    let mut b_runs = split_runs(b).into_iter();

    loop {
        match (a_runs.next(), b_runs.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ra), Some(rb)) => {
                let ord = compare_run(&ra, &rb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[derive(Debug)]
enum Run {
    Digits(String),
    Other(String),
}

fn split_runs(s: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(&c) = chars.peek() {
        let is_digit = c.is_ascii_digit();
        let mut run = String::new();

        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() == is_digit {
                run.push(c);
                chars.next();
            } else {
                break;
            }
        }

        runs.push(if is_digit {
            Run::Digits(run)
        } else {
            Run::Other(run)
        });
    }

    runs
}

fn compare_run(a: &Run, b: &Run) -> Ordering {
    match (a, b) {
        (Run::Digits(a), Run::Digits(b)) => {
            let a_trimmed = a.trim_start_matches('0');
            let b_trimmed = b.trim_start_matches('0');
            a_trimmed
                .len()
                .cmp(&b_trimmed.len())
                .then_with(|| a_trimmed.cmp(b_trimmed))
        }
        (Run::Other(a), Run::Other(b)) => a.cmp(b),
        // A digit run and a non-digit run never occupy the same position
        // for two well-formed comparisons, but keep a total order anyway:
        // numeric runs are treated as greater so "1" > "rc".
        (Run::Digits(_), Run::Other(_)) => Ordering::Greater,
        (Run::Other(_), Run::Digits(_)) => Ordering::Less,
    }
}

/// The six comparator tokens of spec §4.5, in the order they must be tried
/// when scanning an atom (`<=` before `<`, `==` before `=` is irrelevant
/// since both are checked, but `>=` must be tried before `>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparator {
    const TOKENS: [(&'static str, Comparator); 6] = [
        ("<=", Comparator::Le),
        ("<", Comparator::Lt),
        ("==", Comparator::Eq),
        ("=", Comparator::Eq),
        (">=", Comparator::Ge),
        (">", Comparator::Gt),
    ];

    fn token(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ge => ">=",
            Comparator::Gt => ">",
        }
    }

    /// Does `ordering` (the result of comparing a candidate version against
    /// the atom's version) keep the atom satisfied?
    pub fn keeps(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Ge => ordering != Ordering::Less,
            Comparator::Gt => ordering == Ordering::Greater,
        }
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A single `id [op version]` atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyAtom {
    pub id: String,
    pub constraint: Option<(Comparator, Version)>,
}

impl Display for DependencyAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.constraint {
            Some((op, version)) => write!(f, "{}{op}{version}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A disjunction of atoms separated by `|` — one entry of
/// `PluginInfo::dependencies` (spec §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyExpr {
    pub atoms: Vec<DependencyAtom>,
}

impl Display for DependencyExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.atoms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|")
        )
    }
}

impl FromStr for DependencyExpr {
    type Err = DependencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DependencyParseError::Empty);
        }

        let atoms = s
            .split('|')
            .map(parse_atom)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { atoms })
    }
}

/// Scans `atom` for the first occurrence of a comparator token and splits
/// there. The id is whatever precedes the earliest-occurring operator
/// (spec §6: "the identifier matches greedily up to the first operator
/// character").
fn parse_atom(atom: &str) -> Result<DependencyAtom, DependencyParseError> {
    let atom = atom.trim();

    let earliest = Comparator::TOKENS
        .iter()
        .filter_map(|&(token, op)| atom.find(token).map(|idx| (idx, token, op)))
        .min_by_key(|&(idx, token, _)| (idx, std::cmp::Reverse(token.len())));

    match earliest {
        None => {
            if atom.is_empty() {
                Err(DependencyParseError::MissingId(atom.to_string()))
            } else {
                Ok(DependencyAtom {
                    id: atom.to_string(),
                    constraint: None,
                })
            }
        }
        Some((idx, token, op)) => {
            let id = atom[..idx].trim();
            let version = atom[idx + token.len()..].trim();

            if id.is_empty() {
                return Err(DependencyParseError::MissingId(atom.to_string()));
            }
            if version.is_empty() {
                return Err(DependencyParseError::MissingVersion(atom.to_string()));
            }

            Ok(DependencyAtom {
                id: id.to_string(),
                constraint: Some((op, Version::new(version))),
            })
        }
    }
}

impl DependencyAtom {
    /// Does `candidate_id`/`candidate_version` satisfy this atom?
    pub fn matches(&self, candidate_id: &str, candidate_version: &Version) -> bool {
        if self.id != candidate_id {
            return false;
        }

        match &self.constraint {
            None => true,
            Some((op, version)) => {
                op.keeps(version_compare(candidate_version.as_str(), version.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_compare_numeric_runs() {
        assert_eq!(version_compare("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(version_compare("2.0.0", "2.0.0"), Ordering::Equal);
        assert_eq!(version_compare("2.1.0", "2.0.9"), Ordering::Greater);
    }

    #[test]
    fn version_compare_lexical_runs() {
        assert_eq!(version_compare("1.0.0-alpha", "1.0.0-beta"), Ordering::Less);
    }

    #[test]
    fn parse_simple_atom() {
        let expr: DependencyExpr = "demo/lib".parse().unwrap();
        assert_eq!(expr.atoms.len(), 1);
        assert_eq!(expr.atoms[0].id, "demo/lib");
        assert!(expr.atoms[0].constraint.is_none());
    }

    #[test]
    fn parse_constrained_atom() {
        let expr: DependencyExpr = "demo/lib>=2.0".parse().unwrap();
        assert_eq!(expr.atoms[0].id, "demo/lib");
        let (op, version) = expr.atoms[0].constraint.as_ref().unwrap();
        assert_eq!(*op, Comparator::Ge);
        assert_eq!(version.as_str(), "2.0");
    }

    #[test]
    fn parse_disjunction() {
        let expr: DependencyExpr = "demo/a>=3|demo/b".parse().unwrap();
        assert_eq!(expr.atoms.len(), 2);
        assert_eq!(expr.atoms[1].id, "demo/b");
        assert!(expr.atoms[1].constraint.is_none());
    }

    #[test]
    fn parse_rejects_missing_version() {
        let err = "demo/lib>=".parse::<DependencyExpr>().unwrap_err();
        assert!(matches!(err, DependencyParseError::MissingVersion(_)));
    }

    #[test]
    fn atom_matches_by_comparator() {
        let atom = DependencyAtom {
            id: "demo/lib".to_string(),
            constraint: Some((Comparator::Ge, Version::new("2.0"))),
        };
        assert!(atom.matches("demo/lib", &Version::new("2.1")));
        assert!(!atom.matches("demo/lib", &Version::new("1.5")));
        assert!(!atom.matches("other", &Version::new("2.1")));
    }
}
