//! Sinz sequential counter: "at least l and at most s of these literals are true"

use super::clauses::CnfBuilder;
use super::literal::{Literal, Term};

/// Encode `at_least <= |{x in literals : x}| <= at_most`.
///
/// `S[i][j]` reads "at least j of the first i literals are true". Boundary
/// cells are constants; every other cell is a fresh variable, allocated row by
/// row before any clause is emitted.
pub fn at_least_at_most(builder: &mut CnfBuilder, literals: &[Literal], at_least: usize, at_most: usize) {
    let n = literals.len();
    let width = at_most + 1;

    let mut grid: Vec<Vec<Option<Term>>> = vec![vec![None; width + 1]; n + 1];
    for row in grid.iter_mut() {
        row[0] = Some(Term::True);
    }
    for j in 1..=width {
        grid[0][j] = Some(Term::False);
    }
    for j in 1..=at_least.min(width) {
        grid[n][j] = Some(Term::True);
    }
    for row in grid.iter_mut().skip(1) {
        row[width] = Some(Term::False);
    }

    let mut cells: Vec<Vec<Term>> = Vec::with_capacity(n + 1);
    for row in grid {
        let mut filled = Vec::with_capacity(width + 1);
        for cell in row {
            filled.push(match cell {
                Some(constant) => constant,
                None => builder.new_variable().into(),
            });
        }
        cells.push(filled);
    }
    let grid = cells;

    for i in 1..=n {
        let x = Term::Lit(literals[i - 1]);
        for j in 1..=width {
            builder.implication(&[grid[i - 1][j]], &[grid[i][j]]);
            builder.implication(&[x, grid[i - 1][j - 1]], &[grid[i][j]]);
            if j <= at_least {
                builder.implication(&[grid[i][j]], &[grid[i - 1][j], x]);
                builder.implication(&[grid[i][j]], &[grid[i - 1][j - 1]]);
            }
        }
    }
}

/// Exactly one of `literals` is true
pub fn exactly_one(builder: &mut CnfBuilder, literals: &[Literal]) {
    at_least_at_most(builder, literals, 1, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clauses::Cnf;
    use crate::sat::literal::Variable;
    use cadical::Solver;

    fn counter(n: usize, at_least: usize, at_most: usize) -> (Vec<Variable>, Cnf) {
        let mut builder = CnfBuilder::new();
        let inputs: Vec<Variable> = (0..n).map(|_| builder.new_variable()).collect();
        let literals: Vec<Literal> = inputs.iter().map(|v| v.positive()).collect();
        at_least_at_most(&mut builder, &literals, at_least, at_most);
        (inputs, builder.finish())
    }

    fn solver_for(cnf: &Cnf) -> Solver {
        let mut solver: Solver = Solver::new();
        for clause in cnf.clauses() {
            solver.add_clause(clause.literals.iter().map(|l| l.to_dimacs()));
        }
        solver
    }

    fn satisfiable_under(solver: &mut Solver, assumptions: &[Literal]) -> bool {
        match solver.solve_with(assumptions.iter().map(|l| l.to_dimacs())) {
            Some(result) => result,
            None => panic!("solver gave up"),
        }
    }

    fn fix_inputs(inputs: &[Variable], mask: u32) -> Vec<Literal> {
        inputs
            .iter()
            .enumerate()
            .map(|(bit, v)| if mask >> bit & 1 == 1 { v.positive() } else { v.negative() })
            .collect()
    }

    #[test]
    fn test_exactly_one_sizes() {
        let (_, cnf) = counter(10, 1, 1);
        assert_eq!(cnf.variable_count(), 19);
        assert_eq!(cnf.clause_count(), 36);
    }

    #[test]
    fn test_exactly_one_accepts_only_unit_vectors() {
        for n in [1usize, 2, 3, 10] {
            let (inputs, cnf) = counter(n, 1, 1);
            let mut solver = solver_for(&cnf);
            for mask in 0u32..(1 << n) {
                let consistent = satisfiable_under(&mut solver, &fix_inputs(&inputs, mask));
                assert_eq!(consistent, mask.count_ones() == 1, "n = {}, mask = {:b}", n, mask);
            }
        }
    }

    #[test]
    fn test_generic_bounds() {
        for (n, at_least, at_most) in [(4, 0, 2), (4, 2, 3), (5, 1, 4), (3, 3, 3), (5, 2, 2)] {
            let (inputs, cnf) = counter(n, at_least, at_most);
            let mut solver = solver_for(&cnf);
            for mask in 0u32..(1 << n) {
                let m = mask.count_ones() as usize;
                let consistent = satisfiable_under(&mut solver, &fix_inputs(&inputs, mask));
                assert_eq!(consistent, at_least <= m && m <= at_most, "({}, {}, {}) mask {:b}", n, at_least, at_most, mask);
            }
        }
    }

    #[test]
    fn test_negative_literals() {
        let mut builder = CnfBuilder::new();
        let inputs: Vec<Variable> = (0..3).map(|_| builder.new_variable()).collect();
        let literals: Vec<Literal> = inputs.iter().map(|v| v.negative()).collect();
        exactly_one(&mut builder, &literals);
        let mut solver = solver_for(&builder.finish());

        // exactly one input false
        assert!(satisfiable_under(&mut solver, &fix_inputs(&inputs, 0b110)));
        assert!(!satisfiable_under(&mut solver, &fix_inputs(&inputs, 0b111)));
        assert!(!satisfiable_under(&mut solver, &fix_inputs(&inputs, 0b100)));
        assert_eq!(solver.solve(), Some(true));
    }
}
