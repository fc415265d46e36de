use crate::camera::CalibrationModel;
use crate::flags::CalibrationFlag;

/// Errors raised by the numerical solver library.
///
/// Solver implementations report failures through this type; the backend
/// hands them back to the caller without rewording them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Input shapes do not match: {0}")]
    ShapeMismatch(String),
    #[error("Solver did not converge: {0}")]
    NonConvergence(String),
    #[error("Singular system")]
    SingularSystem,
    #[error("Unsupported flag combination: {0}")]
    UnsupportedFlags(String),
    #[error("Solver failure: {0}")]
    Other(String),
}

#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("Unknown calibration model: {0:?}")]
    UnknownModel(String),
    #[error("Unsupported solver library version for stereo calibration: {0:?}")]
    UnsupportedSolverVersion(String),
    #[error("Flags were computed for the {flags} model but the backend uses {backend}")]
    FlagModelMismatch {
        flags: CalibrationModel,
        backend: CalibrationModel,
    },
    #[error("{flag:?} is not available in the {model} model")]
    UnsupportedFlag {
        flag: CalibrationFlag,
        model: CalibrationModel,
    },
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("IO Error: {0}")]
    IOError(String),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl From<std::io::Error> for CalibrationError {
    fn from(err: std::io::Error) -> Self {
        CalibrationError::IOError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CalibrationError {
    fn from(err: serde_yaml::Error) -> Self {
        CalibrationError::YamlError(err.to_string())
    }
}
