/// Failures surfaced by the curve and rotation batch engine.
///
/// Configuration and curve errors are setup failures raised at the call site
/// that detects them. Element-level failures inside a batch fail the whole
/// batch; there is no partial result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid curve: {0}")]
    InvalidCurve(String),
    #[error("failed to allocate {label} buffer of {elements} elements")]
    AllocationFailure { label: &'static str, elements: usize },
    #[error("numeric degeneracy at flat index {index}: {detail}")]
    NumericDegeneracy { index: usize, detail: String },
    #[error("strategy '{strategy}' deviates from the reference by {deviation:e}")]
    StrategyMismatch { strategy: &'static str, deviation: f32 },
}

impl CurveError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn invalid_curve(msg: impl Into<String>) -> Self {
        Self::InvalidCurve(msg.into())
    }
}

pub type CurveResult<T> = Result<T, CurveError>;

#[cfg(test)]
mod tests {
    use super::CurveError;

    #[test]
    fn messages_name_the_failure() {
        let err = CurveError::invalid_configuration("number_of_keys must be at least 2");
        assert_eq!(err.to_string(), "invalid configuration: number_of_keys must be at least 2");

        let err = CurveError::AllocationFailure { label: "angle_x", elements: 12 };
        assert!(err.to_string().contains("angle_x"));
        assert!(err.to_string().contains("12"));
    }
}
