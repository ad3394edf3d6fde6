use thiserror::Error;

/// Parameters rejected before any search starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("variable count must be >= 1")]
    NoVariables,
    #[error("variable count {0} exceeds the largest signed literal")]
    TooManyVariables(u32),
    #[error("clause length must be >= 1")]
    ZeroClauseLength,
    #[error("max_tries must be >= 1")]
    ZeroTries,
    #[error("noise must be in [0,1], got {0}")]
    Noise(f64),
    #[error("sweep parameter '{0}' has no values")]
    EmptySweepAxis(&'static str),
    #[error("num_seeds must be >= 1")]
    NoSeeds,
    #[error("clause/variable ratio must be positive, got {0}")]
    Ratio(f64),
    #[error("unknown policy '{0}', expected gsat|walksat|noisy-gsat")]
    UnknownPolicy(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedFormulaError {
    #[error("clause {clause} is empty")]
    EmptyClause { clause: usize },
    #[error("clause {clause} contains literal 0")]
    ZeroLiteral { clause: usize },
    #[error("clause {clause} references variable {var} but the formula has {num_vars}")]
    VarOutOfRange {
        clause: usize,
        var: u32,
        num_vars: u32,
    },
    #[error("clause {clause} has {found} literals, expected {expected}")]
    ClauseLength {
        clause: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} clauses, found {found}")]
    ClauseCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to spawn generator '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("generator exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("generator output is not utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("generator output has {found} lines, the header alone needs 6")]
    ShortHeader { found: usize },
    #[error("line {line}: invalid literal token '{token}'")]
    Token { line: usize, token: String },
    #[error(transparent)]
    Malformed(#[from] MalformedFormulaError),
    #[error(transparent)]
    Params(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum FlipsatError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Formula(#[from] MalformedFormulaError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
