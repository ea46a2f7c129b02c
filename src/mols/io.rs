//! File I/O for relation descriptors and `.sol` square files

use super::{MolsPair, RelationDescriptor};
use anyhow::{Context, Result};
use std::path::Path;

/// Load a relation descriptor from a JSON file
pub fn load_descriptor_from_file<P: AsRef<Path>>(path: P) -> Result<RelationDescriptor> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read relation file: {}", path.as_ref().display()))?;

    RelationDescriptor::from_json(&content)
        .with_context(|| format!("Invalid relation descriptor in {}", path.as_ref().display()))
}

/// Load a pair of squares from a `.sol` file
pub fn load_pair_from_file<P: AsRef<Path>>(path: P) -> Result<MolsPair> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read square file: {}", path.as_ref().display()))?;

    MolsPair::parse(&content)
        .with_context(|| format!("Failed to parse squares from file: {}", path.as_ref().display()))
}

/// Save a pair of squares as a `.sol` file
pub fn save_pair_to_file<P: AsRef<Path>>(pair: &MolsPair, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, pair.to_sol_string())
        .with_context(|| format!("Failed to write squares to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Write a few example descriptor files
pub fn create_example_descriptors<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let examples = [
        ("delisle.json", "[[1,3,3],[1,3,3],[1,3,3],[1,3,3]]"),
        ("single_class.json", "[[10,0,0],[10,0,0],[10,0,0],[10,0,0]]"),
        ("mixed.json", "[[1,3,3],[2,2,2],[0,5,1],[4,0,3]]"),
    ];

    for (name, content) in examples {
        std::fs::write(dir.join(name), format!("{}\n", content))
            .with_context(|| format!("Failed to write {}", name))?;
    }

    Ok(())
}
