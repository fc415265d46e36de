//! Model-agnostic calibration backend.
//!
//! [`CalibrationBackend`] binds one [`CalibrationModel`] to a
//! [`SolverLibrary`] and routes every operation to the solver family of that
//! model, so calling code never branches on the lens type itself.

use log::{debug, info, warn};
use nalgebra::{DVector, Matrix3, Matrix3x4, Vector2};

use crate::camera::{CalibrationModel, Resolution};
use crate::error::CalibrationError;
use crate::flags::{CalibrationFlag, CalibrationFlags};
use crate::options::CalibrationOptions;
use crate::solver::{
    CalibrationInput, CalibrationResult, MapType, SolverLibrary, SolverVersion,
    StereoCalibrationInput, StereoCalibrationResult, StereoConvention, TermCriteria,
    UndistortMaps,
};

/// Calibration façade over the pinhole and fisheye solver families.
///
/// The model is fixed at construction. The stereo calling convention is
/// resolved once from [`SolverLibrary::version`]; an unrecognised version
/// leaves mono operations usable and makes pinhole
/// [`stereo_calibrate`](Self::stereo_calibrate) fail.
///
/// # Examples
///
/// ```ignore
/// use calib_backend::{
///     CalibrationBackend, CalibrationInput, CalibrationModel, CalibrationOptions,
/// };
///
/// let backend = CalibrationBackend::with_model(solver, CalibrationModel::Fisheye);
/// let flags = backend.compute_flags(&CalibrationOptions::default());
/// let input = CalibrationInput::new(&object_points, &image_points, size);
/// let result = backend.calibrate(&input, flags, &Default::default())?;
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationBackend<S> {
    model: CalibrationModel,
    solver: S,
    stereo_convention: Option<StereoConvention>,
}

impl<S: SolverLibrary> CalibrationBackend<S> {
    /// Creates a pinhole backend.
    pub fn new(solver: S) -> Self {
        Self::with_model(solver, CalibrationModel::default())
    }

    pub fn with_model(solver: S, model: CalibrationModel) -> Self {
        let stereo_convention = match solver
            .version()
            .parse::<SolverVersion>()
            .and_then(|version| StereoConvention::from_version(&version))
        {
            Ok(convention) => {
                info!(
                    "Solver library {} uses the {:?} stereo convention",
                    solver.version(),
                    convention
                );
                Some(convention)
            }
            Err(err) => {
                warn!("{err}; pinhole stereo calibration is unavailable");
                None
            }
        };

        CalibrationBackend {
            model,
            solver,
            stereo_convention,
        }
    }

    pub fn model(&self) -> CalibrationModel {
        self.model
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Calling convention of the pinhole stereo routine.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::UnsupportedSolverVersion`] if the linked library
    /// belongs to neither the 2.x nor the 3.x/4.x family.
    pub fn stereo_convention(&self) -> Result<StereoConvention, CalibrationError> {
        self.stereo_convention.ok_or_else(|| {
            CalibrationError::UnsupportedSolverVersion(self.solver.version().to_string())
        })
    }

    /// Translates `options` into the constraint mask of this backend's model.
    pub fn compute_flags(&self, options: &CalibrationOptions) -> CalibrationFlags {
        CalibrationFlags::from_options(self.model, options)
    }

    fn check_flags(&self, flags: &CalibrationFlags) -> Result<(), CalibrationError> {
        if flags.model() != self.model {
            return Err(CalibrationError::FlagModelMismatch {
                flags: flags.model(),
                backend: self.model,
            });
        }
        Ok(())
    }

    /// Calibrates a single camera from per-view 3D-2D correspondences.
    ///
    /// The initial camera matrix and distortion in `input`, when present, are
    /// forwarded unchanged. Point counts and image size are not checked here;
    /// the solver reports any shape mismatch.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::FlagModelMismatch`] if `flags` were built for the
    ///   other model. This is raised by the backend itself, before the solver
    ///   is called, because a mask only has meaning in its own model's
    ///   vocabulary.
    /// * [`CalibrationError::Solver`] carrying the solver's own error.
    pub fn calibrate(
        &self,
        input: &CalibrationInput<'_>,
        flags: CalibrationFlags,
        criteria: &TermCriteria,
    ) -> Result<CalibrationResult, CalibrationError> {
        self.check_flags(&flags)?;
        debug!(
            "Calibrating {} camera from {} views with flags {}",
            self.model,
            input.object_points.len(),
            flags
        );
        if flags.contains(CalibrationFlag::UseIntrinsicGuess) && input.camera_matrix.is_none() {
            warn!("UseIntrinsicGuess is set but no initial camera matrix was supplied");
        }

        let result = match self.model {
            CalibrationModel::Pinhole => {
                self.solver.calibrate_camera(input, flags.bits(), criteria)
            }
            CalibrationModel::Fisheye => {
                self.solver.fisheye_calibrate(input, flags.bits(), criteria)
            }
        }?;
        Ok(result)
    }

    /// Builds the undistortion and rectification maps for one camera.
    pub fn init_undistort_rectify_map(
        &self,
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: &Matrix3<f64>,
        new_camera_matrix: &Matrix3x4<f64>,
        image_size: Resolution,
        map_type: MapType,
    ) -> Result<UndistortMaps, CalibrationError> {
        debug!("Building {} rectification maps ({:?})", self.model, map_type);

        let maps = match self.model {
            CalibrationModel::Pinhole => self.solver.init_undistort_rectify_map(
                camera_matrix,
                distortion,
                rectification,
                new_camera_matrix,
                image_size,
                map_type,
            ),
            CalibrationModel::Fisheye => self.solver.fisheye_init_undistort_rectify_map(
                camera_matrix,
                distortion,
                rectification,
                new_camera_matrix,
                image_size,
                map_type,
            ),
        }?;
        Ok(maps)
    }

    /// Removes lens distortion from observed pixel coordinates.
    ///
    /// Without `projection` the output is in normalized camera coordinates.
    pub fn undistort_points(
        &self,
        points: &[Vector2<f64>],
        camera_matrix: &Matrix3<f64>,
        distortion: &DVector<f64>,
        rectification: Option<&Matrix3<f64>>,
        projection: Option<&Matrix3x4<f64>>,
    ) -> Result<Vec<Vector2<f64>>, CalibrationError> {
        debug!("Undistorting {} points with the {} model", points.len(), self.model);

        let undistorted = match self.model {
            CalibrationModel::Pinhole => self.solver.undistort_points(
                points,
                camera_matrix,
                distortion,
                rectification,
                projection,
            ),
            CalibrationModel::Fisheye => self.solver.fisheye_undistort_points(
                points,
                camera_matrix,
                distortion,
                rectification,
                projection,
            ),
        }?;
        Ok(undistorted)
    }

    /// Jointly refines both cameras of a stereo rig and their relative pose.
    ///
    /// The input is reordered into the positional layout the linked solver
    /// expects before it is forwarded.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::FlagModelMismatch`] if `flags` were built for the
    ///   other model. Like the version check below, this is raised by the
    ///   backend itself before the solver is called.
    /// * [`CalibrationError::UnsupportedSolverVersion`] for a pinhole backend
    ///   whose solver version has no known stereo convention.
    /// * [`CalibrationError::Solver`] carrying the solver's own error.
    pub fn stereo_calibrate(
        &self,
        input: &StereoCalibrationInput<'_>,
        flags: CalibrationFlags,
        criteria: &TermCriteria,
    ) -> Result<StereoCalibrationResult, CalibrationError> {
        self.check_flags(&flags)?;

        let result = match self.model {
            CalibrationModel::Pinhole => {
                let convention = self.stereo_convention()?;
                debug!(
                    "Stereo calibrating pinhole rig ({:?}) with flags {}",
                    convention, flags
                );
                let args = input.positional_args(convention);
                self.solver.stereo_calibrate(&args, flags.bits(), criteria)
            }
            CalibrationModel::Fisheye => {
                debug!("Stereo calibrating fisheye rig with flags {}", flags);
                let args = input.positional_args(StereoConvention::ImageSizeAfterIntrinsics);
                self.solver
                    .fisheye_stereo_calibrate(&args, flags.bits(), criteria)
            }
        }?;
        Ok(result)
    }
}
