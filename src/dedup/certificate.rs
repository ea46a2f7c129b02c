//! Canonical certificates of colored graphs, equal exactly for isomorphic graphs

use super::graph::{ColoredGraph, GraphError};
use crate::mols::{CELLS, ORDER, PARALLEL_CLASSES};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

/// Opaque canonical form: the lexicographically least relabelled orthogonal array
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Certificate([u8; 2 * CELLS]);

impl Certificate {
    /// Certificate of the graph of a pair of squares
    pub fn of(graph: &ColoredGraph) -> Result<Self, GraphError> {
        let blocks = graph.orthogonal_array()?;
        Ok(Self::of_blocks(&blocks))
    }

    /// Minimum over every axis order, anchor row and column, and generating
    /// sequence of the loop the anchors induce on the third axis.
    ///
    /// Each choice labels all four axes from the structure alone, so an
    /// isomorphic array offers exactly the same set of candidates.
    fn of_blocks(blocks: &[[usize; PARALLEL_CLASSES]]) -> Self {
        let mut best = [u8::MAX; 2 * CELLS];

        for axes in (0..PARALLEL_CLASSES).permutations(PARALLEL_CLASSES) {
            let mut s = [[0u8; ORDER]; ORDER];
            let mut t = [[0u8; ORDER]; ORDER];
            for block in blocks {
                s[block[axes[0]]][block[axes[1]]] = block[axes[2]] as u8;
                t[block[axes[0]]][block[axes[1]]] = block[axes[3]] as u8;
            }

            for (r0, c0) in itertools::iproduct!(0..ORDER, 0..ORDER) {
                let anchored = AnchoredLoop::new(&s, r0, c0);
                anchored.for_each_labeling(&mut |labels: &[u8; ORDER]| {
                    let candidate = relabel(&s, &t, r0, c0, labels);
                    if candidate < best {
                        best = candidate;
                    }
                });
            }
        }

        Self(best)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate(")?;
        for byte in &self.0[..16] {
            write!(f, "{}", byte)?;
        }
        write!(f, "..)")
    }
}

/// Write the array with every axis relabelled from the loop labelling
fn relabel(
    s: &[[u8; ORDER]; ORDER],
    t: &[[u8; ORDER]; ORDER],
    r0: usize,
    c0: usize,
    labels: &[u8; ORDER],
) -> [u8; 2 * CELLS] {
    let row_labels: [u8; ORDER] = std::array::from_fn(|r| labels[s[r][c0] as usize]);
    let col_labels: [u8; ORDER] = std::array::from_fn(|c| labels[s[r0][c] as usize]);
    let mut t_labels = [0u8; ORDER];
    for c in 0..ORDER {
        t_labels[t[r0][c] as usize] = col_labels[c];
    }

    let mut candidate = [0u8; 2 * CELLS];
    for r in 0..ORDER {
        for c in 0..ORDER {
            let index = 2 * (row_labels[r] as usize * ORDER + col_labels[c] as usize);
            candidate[index] = labels[s[r][c] as usize];
            candidate[index + 1] = t_labels[t[r][c] as usize];
        }
    }
    candidate
}

/// `x * y = S(row holding x in column c0, column holding y in row r0)`, a loop
/// whose identity is `S(r0, c0)`
struct AnchoredLoop {
    table: [[u8; ORDER]; ORDER],
    identity: u8,
}

impl AnchoredLoop {
    fn new(s: &[[u8; ORDER]; ORDER], r0: usize, c0: usize) -> Self {
        let mut row_of = [0usize; ORDER];
        let mut col_of = [0usize; ORDER];
        for i in 0..ORDER {
            row_of[s[i][c0] as usize] = i;
            col_of[s[r0][i] as usize] = i;
        }
        let table: [[u8; ORDER]; ORDER] = std::array::from_fn(|x| std::array::from_fn(|y| s[row_of[x]][col_of[y]]));
        Self { table, identity: s[r0][c0] }
    }

    fn product(&self, x: u8, y: u8) -> u8 {
        self.table[x as usize][y as usize]
    }

    /// Visit the labelling `element -> position` of every generating sequence
    fn for_each_labeling(&self, visit: &mut dyn FnMut(&[u8; ORDER])) {
        let mut seen = [false; ORDER];
        seen[self.identity as usize] = true;
        self.extend(vec![self.identity], seen, 0, visit);
    }

    /// Close `order` under products, then branch on the next generator
    fn extend(&self, mut order: Vec<u8>, mut seen: [bool; ORDER], mut closed: usize, visit: &mut dyn FnMut(&[u8; ORDER])) {
        while closed < order.len() {
            for earlier in 0..=closed {
                for product in [self.product(order[earlier], order[closed]), self.product(order[closed], order[earlier])] {
                    if !seen[product as usize] {
                        seen[product as usize] = true;
                        order.push(product);
                    }
                }
            }
            closed += 1;
        }

        if order.len() == ORDER {
            let mut labels = [0u8; ORDER];
            for (position, &element) in order.iter().enumerate() {
                labels[element as usize] = position as u8;
            }
            visit(&labels);
            return;
        }

        for generator in 0..ORDER as u8 {
            if !seen[generator as usize] {
                let mut next = order.clone();
                next.push(generator);
                let mut next_seen = seen;
                next_seen[generator as usize] = true;
                self.extend(next, next_seen, closed, visit);
            }
        }
    }
}

/// Whether a graph was seen before
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    New { distinct: usize },
    Duplicate { of: usize },
}

/// Single-pass map certificate -> number of the first graph that produced it
#[derive(Debug, Default)]
pub struct CertificateRegistry {
    first_seen: HashMap<Certificate, usize>,
}

impl CertificateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, certificate: Certificate, graph_number: usize) -> Registration {
        if let Some(&of) = self.first_seen.get(&certificate) {
            return Registration::Duplicate { of };
        }
        self.first_seen.insert(certificate, graph_number);
        Registration::New { distinct: self.first_seen.len() }
    }

    pub fn distinct(&self) -> usize {
        self.first_seen.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;
    use crate::mols::MolsPair;

    /// A pair of orthogonal squares not isomorphic to the relation pair
    pub(crate) const OTHER_PAIR: &str = "\
0 9 7 8 1 2 3 6 4 5
4 5 1 0 6 9 2 7 3 8
5 0 6 2 3 4 7 9 8 1
6 3 0 4 8 1 5 2 7 9
3 4 8 1 2 7 6 5 9 0
1 2 5 9 4 3 8 0 6 7
2 7 3 6 9 5 1 8 0 4
8 1 9 5 7 0 4 3 2 6
9 6 2 7 5 8 0 4 1 3
7 8 4 3 0 6 9 1 5 2

0 6 4 5 7 8 9 1 2 3
4 7 2 8 5 1 0 3 6 9
5 9 8 3 0 6 2 7 1 4
6 1 7 9 3 0 4 5 8 2
7 5 0 6 2 9 3 8 4 1
8 4 6 0 1 3 7 2 9 5
9 0 5 4 8 2 1 6 3 7
2 3 9 1 6 5 8 4 7 0
3 2 1 7 9 4 6 0 5 8
1 8 3 2 4 7 5 9 0 6
";

    fn certificate(pair: &MolsPair) -> Certificate {
        Certificate::of(&ColoredGraph::from_pair(pair)).unwrap()
    }

    #[test]
    fn test_invariant_under_isomorphism() {
        let pair = relation_pair();
        let reference = certificate(&pair);

        let mut map = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        map.swap(0, 1);
        assert_eq!(certificate(&MolsPair::new(pair.a.relabel(&map), pair.b)), reference);
        assert_eq!(certificate(&pair.swap()), reference);
        assert_eq!(certificate(&pair.transpose()), reference);

        let order = [3, 1, 4, 0, 2, 9, 5, 8, 6, 7];
        let permute = |square: &crate::mols::Square| {
            let mut out = crate::mols::Square::new();
            for (r, &source) in order.iter().enumerate() {
                for c in 0..ORDER {
                    out.set(r, c, square.get(source, c));
                }
            }
            out
        };
        assert_eq!(certificate(&MolsPair::new(permute(&pair.a), permute(&pair.b))), reference);
    }

    #[test]
    fn test_distinguishes_non_isomorphic_pairs() {
        let other = MolsPair::parse(OTHER_PAIR).unwrap();
        assert_ne!(certificate(&relation_pair()), certificate(&other));
    }

    #[test]
    fn test_registry() {
        let mut registry = CertificateRegistry::new();
        let first = certificate(&relation_pair());
        assert_eq!(registry.register(first.clone(), 1), Registration::New { distinct: 1 });
        assert_eq!(registry.register(certificate(&relation_pair().swap()), 2), Registration::Duplicate { of: 1 });
        let other = certificate(&MolsPair::parse(OTHER_PAIR).unwrap());
        assert_eq!(registry.register(other, 3), Registration::New { distinct: 2 });
        assert_eq!(registry.distinct(), 2);
    }

    #[test]
    fn test_identity_lands_in_first_cell() {
        let pair = relation_pair();
        // the least candidate always puts the identity in cell (0, 0)
        assert_eq!(certificate(&pair).as_bytes()[0], 0);
    }
}
