//! Stage-tagged pipeline errors

use std::fmt;
use thiserror::Error;

use crate::imaging::ImageError;

/// The five steps of the upload pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decode,
    Resize,
    Composite,
    Encode,
    Write,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Decode,
        Stage::Resize,
        Stage::Composite,
        Stage::Encode,
        Stage::Write,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Resize => "resize",
            Stage::Composite => "composite",
            Stage::Encode => "encode",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one upload, naming the stage it happened in
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ImageError,
    },

    #[error("processing cancelled before {stage} stage")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    pub fn at(stage: Stage, source: ImageError) -> Self {
        PipelineError::Stage { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } | PipelineError::Cancelled { stage } => *stage,
        }
    }

    pub fn image_error(&self) -> Option<&ImageError> {
        match self {
            PipelineError::Stage { source, .. } => Some(source),
            PipelineError::Cancelled { .. } => None,
        }
    }

    /// HTTP status for the boundary layer; cancellation means the request
    /// deadline passed (504)
    pub fn to_http_status(&self) -> u16 {
        match self {
            PipelineError::Stage { source, .. } => source.to_http_status(),
            PipelineError::Cancelled { .. } => 504,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.to_http_status())
    }
}
