/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("malformed input{}: {reason}", line_suffix(.line))]
    MalformedInput { line: Option<usize>, reason: String },
    #[error("invalid unit: {0}")]
    InvalidUnit(String),
    #[error("internal failure: {0}")]
    Internal(String),
    #[error("document formatting failed")]
    Format(#[from] std::fmt::Error),
}

impl StageError {
    pub fn malformed_at(line: usize, reason: impl Into<String>) -> Self {
        StageError::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        StageError::MalformedInput {
            line: None,
            reason: reason.into(),
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(number) => format!(" at line {}", number),
        None => String::new(),
    }
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the configurable stages of the conversion pipeline.
///
/// A stage is initialized once per run, may execute any number of inputs,
/// and drops its configuration on cleanup.
pub trait ProcessingStage {
    type Config;
    type Input;
    type Output;

    fn initialize(&mut self, config: &Self::Config) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
