//! Typed variables, literals and the two sentinel terms

use std::fmt;
use std::ops::Neg;

/// A boolean variable, identified by a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(u32);

impl Variable {
    pub fn new(id: u32) -> Self {
        assert!(id > 0 && id <= i32::MAX as u32, "variable id {} out of range", id);
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn positive(self) -> Literal {
        Literal(self.0 as i32)
    }

    pub fn negative(self) -> Literal {
        Literal(-(self.0 as i32))
    }
}

/// A signed reference to a variable: positive means true, negative means false
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Build a literal from its DIMACS form; zero is the clause terminator, not a literal
    pub fn from_dimacs(value: i32) -> Option<Self> {
        (value != 0 && value != i32::MIN).then_some(Self(value))
    }

    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    pub fn variable(self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Neg for Literal {
    type Output = Literal;

    fn neg(self) -> Literal {
        Literal(-self.0)
    }
}

impl From<Variable> for Literal {
    fn from(variable: Variable) -> Self {
        variable.positive()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Either a literal or one of the two constants used at counter boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Lit(Literal),
    True,
    False,
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Lit(literal)
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Lit(variable.positive())
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        match self {
            Term::Lit(literal) => Term::Lit(-literal),
            Term::True => Term::False,
            Term::False => Term::True,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_polarity() {
        let v = Variable::new(7);
        assert_eq!(v.positive().to_dimacs(), 7);
        assert_eq!(v.negative().to_dimacs(), -7);
        assert_eq!(-v.positive(), v.negative());
        assert_eq!(v.negative().variable(), v);
        assert!(!v.negative().is_positive());
    }

    #[test]
    fn test_from_dimacs() {
        assert_eq!(Literal::from_dimacs(0), None);
        assert_eq!(Literal::from_dimacs(-3).map(|l| l.variable().id()), Some(3));
    }

    #[test]
    fn test_term_negation() {
        assert_eq!(-Term::True, Term::False);
        assert_eq!(-Term::False, Term::True);
        let v = Variable::new(2);
        assert_eq!(-Term::from(v), Term::Lit(v.negative()));
    }

    #[test]
    #[should_panic]
    fn test_zero_variable_panics() {
        Variable::new(0);
    }
}
