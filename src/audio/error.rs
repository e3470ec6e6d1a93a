use thiserror::Error;

/// Errors raised at the boundaries of the analysis pipeline.
///
/// Numerical degeneracies inside a descriptor (zero denominators, empty
/// buffers) never show up here; they resolve to documented fallback values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A frame size of zero was requested.
    #[error("frame size must be greater than zero, got {0}")]
    InvalidFrameSize(usize),

    /// A sample rate of zero was requested.
    #[error("sample rate must be greater than zero, got {0} Hz")]
    InvalidSampleRate(u32),

    /// A mel filterbank with no filters was requested.
    #[error("number of cepstral coefficients must be greater than zero, got {0}")]
    InvalidCoefficientCount(usize),

    /// An ingested frame does not match the configured frame size.
    #[error("expected frame of length {expected}, got {got}")]
    FrameSizeMismatch { expected: usize, got: usize },

    /// A spectrum handed to a stateful or precomputed component has the wrong length.
    #[error("expected spectrum of length {expected}, got {got}")]
    SpectrumLengthMismatch { expected: usize, got: usize },

    /// A descriptor was requested before any frame was ingested.
    #[error("no audio frame has been processed yet")]
    NoFrame,
}
