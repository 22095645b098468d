use thiserror::Error;

/// Configuration errors, raised at construction or on dynamic re-binding.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown motion model `{0}` (valid options: DiffDrive, Omni, Ackermann)")]
    UnknownMotionModel(String),

    #[error("Unknown critic `{0}`")]
    UnknownCritic(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error(
        "Controller period {period} s is shorter than model_dt {model_dt} s; set controller_frequency to 1/model_dt or lower"
    )]
    PeriodShorterThanModelDt { period: f64, model_dt: f64 },
}

/// Runtime errors surfaced to the host by the optimizer.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Optimizer failed to find a usable trajectory after {attempts} consecutive failing ticks"
    )]
    OptimizationFailed { attempts: u32 },
}

impl ConfigError {
    /// Shorthand for a range violation on a named numeric parameter.
    pub fn out_of_range(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_motion_model_names_offender() {
        let err = ConfigError::UnknownMotionModel("Hovercraft".into());
        let msg = err.to_string();
        assert!(msg.contains("Hovercraft"));
        assert!(msg.contains("DiffDrive"));
    }

    #[test]
    fn optimizer_error_from_config_error() {
        let err = ConfigError::out_of_range("batch_size", "must be >= 1");
        let opt_err: OptimizerError = err.into();
        assert!(matches!(opt_err, OptimizerError::Config(_)));
        assert!(opt_err.to_string().contains("batch_size"));
    }

    #[test]
    fn optimization_failed_reports_attempts() {
        let err = OptimizerError::OptimizationFailed { attempts: 3 };
        assert!(err.to_string().contains('3'));
    }
}
