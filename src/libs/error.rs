/// Errors raised by the scoring, alignment and binding-site engine.
///
/// All variants describe malformed input or misconfiguration; none of them
/// is transient, so callers never retry.
#[derive(thiserror::Error, Debug)]
pub enum BindError {
    /// The score table has a column count with no known layout.
    #[error("unsupported score table layout: {columns} columns")]
    UnsupportedLayout { columns: usize },

    /// The detected layout does not carry the requested score kind.
    #[error("no {kind} score in a {columns}-column table")]
    UnknownScoreKind { kind: String, columns: usize },

    /// Bad cell, ragged row or empty input in a score table.
    #[error("malformed score table: {0}")]
    MalformedTable(String),

    /// A window k-mer has no entry in the score table.
    #[error("k-mer {kmer} is missing from the score table")]
    MissingKmer { kmer: String },

    /// A motif matrix failed probability validation.
    #[error("invalid probability matrix: {0}")]
    InvalidProbabilityMatrix(String),

    /// A base outside ACGT was seen while scoring with a motif matrix.
    #[error("invalid base '{base}' at position {pos}")]
    InvalidBase { base: char, pos: usize },

    /// A mutant name whose suffix is not one of `m`, `i` or `d`.
    #[error("invalid mutation name: {0}")]
    InvalidMutationName(String),

    /// Identification was requested without any threshold.
    #[error("either an absolute or a rank threshold must be provided")]
    NoThresholdProvided,

    /// A threshold was given for a matrix that was never loaded.
    #[error("no {0} matrix is loaded")]
    MissingIdentityMatrix(&'static str),

    /// A FASTA record holds bytes outside ASCII.
    #[error("sequence {0} has non-ASCII characters")]
    MalformedSequence(String),

    /// The reference sequence is not among the inputs.
    #[error("sequence {0} not found")]
    MissingSequence(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BindError>;
