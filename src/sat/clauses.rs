//! Clauses, the append-only clause sink and the finished CNF instance

use super::literal::{Literal, Term, Variable};
use super::variables::VariableAllocator;

/// A disjunction of literals
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: Literal) -> Self {
        Self { literals: vec![literal] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Largest variable id mentioned by the clause
    pub fn max_variable(&self) -> u32 {
        self.literals.iter().map(|l| l.variable().id()).max().unwrap_or(0)
    }

    /// Evaluate under a total assignment
    pub fn is_satisfied_by<F: Fn(Variable) -> bool>(&self, value: F) -> bool {
        self.literals.iter().any(|&l| value(l.variable()) == l.is_positive())
    }
}

/// Append-only list of clauses with the implication helper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSink {
    clauses: Vec<Clause>,
}

impl ClauseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one clause verbatim
    pub fn clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) {
        self.clauses.push(Clause::new(literals.into_iter().collect()));
    }

    /// Append `(a1 & ... & an) -> (c1 | ... | ck)`.
    ///
    /// Nothing is emitted when an antecedent is `False` or a consequent is
    /// `True`; `True` antecedents and `False` consequents are dropped.
    pub fn implication(&mut self, antecedents: &[Term], consequents: &[Term]) {
        if antecedents.contains(&Term::False) || consequents.contains(&Term::True) {
            return;
        }

        let negated = antecedents.iter().filter_map(|&t| match t {
            Term::Lit(literal) => Some(-literal),
            _ => None,
        });
        let kept = consequents.iter().filter_map(|&t| match t {
            Term::Lit(literal) => Some(literal),
            _ => None,
        });

        self.clause(negated.chain(kept));
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Move every clause of `other` to the end of this sink
    pub fn append(&mut self, mut other: ClauseSink) {
        self.clauses.append(&mut other.clauses);
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }
}

impl Extend<Clause> for ClauseSink {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        self.clauses.extend(iter);
    }
}

/// Owns the variable counter and the clause list while an instance is built
#[derive(Debug, Default)]
pub struct CnfBuilder {
    allocator: VariableAllocator,
    sink: ClauseSink,
}

impl CnfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_variable(&mut self) -> Variable {
        self.allocator.new_variable()
    }

    pub fn allocator_mut(&mut self) -> &mut VariableAllocator {
        &mut self.allocator
    }

    pub fn sink_mut(&mut self) -> &mut ClauseSink {
        &mut self.sink
    }

    pub fn clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) {
        self.sink.clause(literals);
    }

    pub fn implication(&mut self, antecedents: &[Term], consequents: &[Term]) {
        self.sink.implication(antecedents, consequents);
    }

    pub fn variable_count(&self) -> usize {
        self.allocator.variable_count()
    }

    pub fn clause_count(&self) -> usize {
        self.sink.len()
    }

    pub fn append(&mut self, clauses: ClauseSink) {
        self.sink.append(clauses);
    }

    pub fn finish(self) -> Cnf {
        Cnf {
            variable_count: self.allocator.variable_count(),
            clauses: self.sink.into_clauses(),
        }
    }
}

/// A finished CNF instance: variable count and ordered clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    variable_count: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(variable_count: usize, clauses: Vec<Clause>) -> Self {
        Self { variable_count, clauses }
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Return a copy with extra clauses appended (used to pin a known solution)
    pub fn with_clauses<I: IntoIterator<Item = Clause>>(&self, extra: I) -> Self {
        let mut clauses = self.clauses.clone();
        clauses.extend(extra);
        Self { variable_count: self.variable_count, clauses }
    }

    /// Largest variable id used by any clause
    pub fn max_variable(&self) -> u32 {
        self.clauses.iter().map(Clause::max_variable).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_dimacs(v).unwrap()
    }

    fn dimacs(sink: &ClauseSink) -> Vec<Vec<i32>> {
        sink.clauses()
            .iter()
            .map(|c| c.literals.iter().map(|l| l.to_dimacs()).collect())
            .collect()
    }

    #[test]
    fn test_clause_constructors() {
        assert!(Clause::unit(lit(1)).is_unit());
        assert_eq!(Clause::new(vec![lit(1), lit(-2)]).len(), 2);
        assert!(Clause::new(vec![]).is_empty());
        assert_eq!(Clause::new(vec![lit(3), lit(-9), lit(4)]).max_variable(), 9);
    }

    #[test]
    fn test_implication_order() {
        let mut sink = ClauseSink::new();
        sink.implication(&[lit(1).into(), lit(-2).into()], &[lit(3).into(), lit(4).into()]);
        assert_eq!(dimacs(&sink), vec![vec![-1, 2, 3, 4]]);
    }

    #[test]
    fn test_implication_short_circuit() {
        let mut sink = ClauseSink::new();
        sink.implication(&[Term::False, lit(1).into()], &[lit(2).into()]);
        sink.implication(&[lit(1).into()], &[Term::True]);
        assert!(sink.is_empty());

        sink.implication(&[Term::True, lit(1).into()], &[Term::False, lit(2).into()]);
        assert_eq!(dimacs(&sink), vec![vec![-1, 2]]);

        // everything stripped: the empty clause is emitted
        sink.implication(&[Term::True], &[Term::False]);
        assert!(sink.clauses()[1].is_empty());
    }

    #[test]
    fn test_builder_counts() {
        let mut builder = CnfBuilder::new();
        let a = builder.new_variable();
        let b = builder.new_variable();
        builder.clause([a.positive(), b.negative()]);

        let mut extra = ClauseSink::new();
        extra.clause([b.positive()]);
        builder.append(extra);

        let cnf = builder.finish();
        assert_eq!(cnf.variable_count(), 2);
        assert_eq!(cnf.clause_count(), 2);
        assert_eq!(cnf.max_variable(), 2);
        assert!(cnf.clauses()[0].is_satisfied_by(|v| v == a));
        assert_eq!(cnf.with_clauses([Clause::unit(a.negative())]).clause_count(), 3);
    }
}
