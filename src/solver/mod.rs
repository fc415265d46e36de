//! The `solver` module describes the numerical calibration library the
//! backend forwards to.
//!
//! The library itself lives outside this crate. It is modelled by the
//! [`SolverLibrary`] trait, which exposes one entry point per operation and
//! lens family, plus the version string used to pick the stereo calling
//! convention. Flags cross this boundary as raw bits in the vocabulary of the
//! family being called.

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x4, Vector2, Vector3};
use serde::{Deserialize, Serialize};

pub mod stereo;

pub use stereo::{
    SolverVersion, StereoArg, StereoCalibrationInput, StereoCalibrationResult, StereoConvention,
};

use crate::camera::{Intrinsics, Resolution};
use crate::error::SolverError;

/// Stopping rule for the iterative solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermCriteria {
    pub max_iterations: u32,
    pub epsilon: f64,
}

impl Default for TermCriteria {
    fn default() -> Self {
        TermCriteria {
            max_iterations: 30,
            epsilon: 1e-6,
        }
    }
}

/// Representation of the rectification maps produced by
/// [`SolverLibrary::init_undistort_rectify_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapType {
    /// Separate floating point x and y maps.
    Float32,
    /// Fixed-point maps: integer coordinates plus interpolation table indices.
    Fixed16,
}

/// Pixel lookup tables for remapping a distorted image, in the layout
/// selected by [`MapType`].
#[derive(Debug, Clone, PartialEq)]
pub enum UndistortMaps {
    Float32 {
        map_x: DMatrix<f32>,
        map_y: DMatrix<f32>,
    },
    Fixed16 {
        /// Integer source column of each destination pixel.
        map_x: DMatrix<i16>,
        /// Integer source row of each destination pixel.
        map_y: DMatrix<i16>,
        /// Index into the solver's bilinear interpolation table.
        interpolation: DMatrix<u16>,
    },
}

impl UndistortMaps {
    pub fn map_type(&self) -> MapType {
        match self {
            UndistortMaps::Float32 { .. } => MapType::Float32,
            UndistortMaps::Fixed16 { .. } => MapType::Fixed16,
        }
    }

    /// `(rows, cols)` of the maps, i.e. the rectified image size.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            UndistortMaps::Float32 { map_x, .. } => map_x.shape(),
            UndistortMaps::Fixed16 { map_x, .. } => map_x.shape(),
        }
    }
}

/// Observations and optional initial estimates for a single-camera
/// calibration.
///
/// The initial camera matrix is what the solver starts from when the mask
/// holds [`crate::CalibrationFlag::UseIntrinsicGuess`], and what
/// `FixPrincipalPoint` and `FixAspectRatio` keep fixed.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationInput<'a> {
    pub object_points: &'a [Vec<Vector3<f64>>],
    pub image_points: &'a [Vec<Vector2<f64>>],
    pub image_size: Resolution,
    pub camera_matrix: Option<&'a Matrix3<f64>>,
    pub distortion: Option<&'a DVector<f64>>,
}

impl<'a> CalibrationInput<'a> {
    /// Input without an initial guess.
    pub fn new(
        object_points: &'a [Vec<Vector3<f64>>],
        image_points: &'a [Vec<Vector2<f64>>],
        image_size: Resolution,
    ) -> Self {
        CalibrationInput {
            object_points,
            image_points,
            image_size,
            camera_matrix: None,
            distortion: None,
        }
    }

    pub fn with_initial_guess(
        self,
        camera_matrix: &'a Matrix3<f64>,
        distortion: &'a DVector<f64>,
    ) -> Self {
        CalibrationInput {
            camera_matrix: Some(camera_matrix),
            distortion: Some(distortion),
            ..self
        }
    }
}

/// Output of a single-camera calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    /// RMS reprojection error in pixels.
    pub reprojection_error: f64,
    pub camera_matrix: Matrix3<f64>,
    /// Distortion coefficients in the solver's own ordering for the model.
    pub distortion: DVector<f64>,
    /// Per-view rotation vectors (axis-angle).
    pub rotations: Vec<Vector3<f64>>,
    /// Per-view translations.
    pub translations: Vec<Vector3<f64>>,
}

impl CalibrationResult {
    pub fn intrinsics(&self) -> Intrinsics {
        Intrinsics::from_camera_matrix(&self.camera_matrix)
    }
}

/// Entry points of the numerical calibration library.
///
/// Each operation comes in a pinhole flavour and a `fisheye_` flavour. The
/// backend guarantees it only ever calls the family matching its model.
pub trait SolverLibrary {
    /// Version string of the linked library, e.g. `"4.5.1"`.
    fn version(&self) -> &str;

    fn calibrate_camera(
        &self,
        input: &CalibrationInput<'_>,
        flags: u32,
        criteria: &TermCriteria,
    ) -> Result<CalibrationResult, SolverError>;

    fn fisheye_calibrate(
        &self,
        input: &CalibrationInput<'_>,
        flags: u32,
        criteria: &TermCriteria,
    ) -> Result<CalibrationResult, SolverError>;

    fn init_undistort_rectify_map(
        &self,
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: &Matrix3<f64>,
        new_camera_matrix: &Matrix3x4<f64>,
        image_size: Resolution,
        map_type: MapType,
    ) -> Result<UndistortMaps, SolverError>;

    fn fisheye_init_undistort_rectify_map(
        &self,
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: &Matrix3<f64>,
        new_camera_matrix: &Matrix3x4<f64>,
        image_size: Resolution,
        map_type: MapType,
    ) -> Result<UndistortMaps, SolverError>;

    fn undistort_points(
        &self,
        points: &[Vector2<f64>],
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: Option<&Matrix3<f64>>,
        projection: Option<&Matrix3x4<f64>>,
    ) -> Result<Vec<Vector2<f64>>, SolverError>;

    fn fisheye_undistort_points(
        &self,
        points: &[Vector2<f64>],
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: Option<&Matrix3<f64>>,
        projection: Option<&Matrix3x4<f64>>,
    ) -> Result<Vec<Vector2<f64>>, SolverError>;

    /// Joint stereo solve. `args` is the positional argument list in the
    /// order this library version expects.
    fn stereo_calibrate(
        &self,
        args: &[StereoArg<'_>],
        flags: u32,
        criteria: &TermCriteria,
    ) -> Result<StereoCalibrationResult, SolverError>;

    /// Joint fisheye stereo solve. Always takes the image size after the
    /// intrinsics.
    fn fisheye_stereo_calibrate(
        &self,
        args: &[StereoArg<'_>],
        flags: u32,
        criteria: &TermCriteria,
    ) -> Result<StereoCalibrationResult, SolverError>;
}
