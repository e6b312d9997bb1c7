use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{ERROR_PREFIX, SUCCESS_PREFIX};

/// One file's unit of work: where to read from and where the result goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl Task {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Result of processing a single [`Task`].
///
/// Exactly one is produced per task handed to the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        input_path: PathBuf,
        /// May differ from the task's output path when the extension was rewritten.
        output_path: PathBuf,
        original_size: u64,
        compressed_size: u64,
    },
    Failure {
        input_path: PathBuf,
        cause: String,
    },
}

impl Outcome {
    pub fn failure(input_path: impl Into<PathBuf>, cause: impl fmt::Display) -> Self {
        Outcome::Failure {
            input_path: input_path.into(),
            cause: cause.to_string(),
        }
    }

    pub fn input_path(&self) -> &Path {
        match self {
            Outcome::Success { input_path, .. } | Outcome::Failure { input_path, .. } => input_path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Outcome::Success { output_path, .. } => Some(output_path),
            Outcome::Failure { .. } => None,
        }
    }
}

/// Renders the single console line reported for each finished task.
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success {
                input_path,
                output_path,
                ..
            } => write!(
                f,
                "{} {} → {}",
                SUCCESS_PREFIX,
                input_path.display(),
                output_path.display()
            ),
            Outcome::Failure { input_path, cause } => {
                write!(f, "{} {}: {}", ERROR_PREFIX, input_path.display(), cause)
            }
        }
    }
}
