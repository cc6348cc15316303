use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("serialised relation value {0} does not fit into 16 bits")]
    RelationBitsOutOfRange(i32),

    #[error("relation matrix is not square: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        found: usize,
        expected: usize,
    },
}
