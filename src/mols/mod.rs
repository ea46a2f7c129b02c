//! Domain types for pairs of orthogonal Latin squares of order 10

pub mod classes;
pub mod io;
pub mod relation;
pub mod square;

pub use classes::ClassPartition;
pub use io::{create_example_descriptors, load_descriptor_from_file, load_pair_from_file, save_pair_to_file};
pub use relation::{Axis, DescriptorError, RelationDescriptor};
pub use square::{MolsPair, PairParseError, Square};

/// Order of the Latin squares
pub const ORDER: usize = 10;

/// Number of parallel classes (rows, columns, symbols of A, symbols of B)
pub const PARALLEL_CLASSES: usize = 4;

/// Number of columns of the incidence / adjacency matrix
pub const INCIDENCE_COLUMNS: usize = ORDER * PARALLEL_CLASSES;

/// Number of cells of a square, i.e. rows of the incidence matrix
pub const CELLS: usize = ORDER * ORDER;
