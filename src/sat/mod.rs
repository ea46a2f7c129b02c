//! SAT encoding: literals, variable layout, clause families and DIMACS output

pub mod cardinality;
pub mod clauses;
pub mod constraints;
pub mod dimacs;
pub mod encoder;
pub mod literal;
pub mod symmetry;
pub mod variables;

pub use clauses::{Clause, ClauseSink, Cnf, CnfBuilder};
pub use constraints::ConstraintGenerator;
pub use dimacs::{save_dimacs, to_dimacs_string, write_dimacs};
pub use encoder::{Encoding, EncodingOptions, EncodingStatistics, MolsEncoder};
pub use literal::{Literal, Term, Variable};
pub use symmetry::{SymmetryBreaker, SymmetryCounts};
pub use variables::{VariableAllocator, VariableKind, VariableLayout, VariableStatistics};
