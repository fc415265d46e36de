//! Calibration Backend Library
//!
//! A model-agnostic façade over pinhole and fisheye camera calibration
//! solvers. Calling code picks a [`CalibrationModel`] once and then
//! calibrates, rectifies, undistorts and stereo-calibrates through a
//! [`CalibrationBackend`] without branching on the lens type:
//! - Flag computation: high-level [`CalibrationOptions`] become the
//!   model-specific [`CalibrationFlags`] mask the solver understands.
//! - Dispatch: every operation is routed to the solver family of the model.
//! - Stereo argument ordering: the positional layout expected by the linked
//!   solver version is resolved once and applied on every call.
//!
//! The numerical solver itself is an external collaborator described by the
//! [`SolverLibrary`] trait.

pub mod backend;
pub mod camera;
pub mod error;
pub mod flags;
pub mod options;
pub mod solver;

// Re-export commonly used types
pub use backend::CalibrationBackend;
pub use camera::{CalibrationModel, Intrinsics, Resolution};
pub use error::{CalibrationError, SolverError};
pub use flags::{CalibrationFlag, CalibrationFlags};
pub use options::CalibrationOptions;
pub use solver::{
    CalibrationInput, CalibrationResult, MapType, SolverLibrary, SolverVersion, StereoArg,
    StereoCalibrationInput, StereoCalibrationResult, StereoConvention, TermCriteria,
    UndistortMaps,
};
