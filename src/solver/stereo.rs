//! Stereo calibration inputs and the positional calling conventions of the
//! solver library.
//!
//! The joint stereo routine takes ten positional inputs. Where the image size
//! sits among them depends on the library: the 2.x family expects it right
//! after the image points, while 3.x/4.x and the fisheye routine expect it
//! after the four intrinsics/distortion arguments. Callers of the backend
//! always fill in a [`StereoCalibrationInput`]; the backend flattens it into
//! the [`StereoArg`] list the linked library wants.

use nalgebra::{DVector, Matrix3, Vector2, Vector3};
use std::fmt;
use std::str::FromStr;

use crate::camera::Resolution;
use crate::error::CalibrationError;

/// `major.minor.patch` of the linked solver library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SolverVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for SolverVersion {
    type Err = CalibrationError;

    /// Accepts `"4"`, `"3.4"`, `"4.5.1"`, `"2.4.13.7"` or `"4.8.0-dev"`.
    /// Components past the patch level and any pre-release suffix are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalibrationError::UnsupportedSolverVersion(s.to_string());
        let core = s.trim().split(['-', '+', ' ']).next().unwrap_or("");

        let mut parts = core.split('.').map(|part| part.parse::<u32>());
        let major = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let minor = parts.next().transpose().map_err(|_| invalid())?.unwrap_or(0);
        let patch = parts.next().transpose().map_err(|_| invalid())?.unwrap_or(0);

        Ok(SolverVersion {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for SolverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Where the pinhole stereo routine expects the image size argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoConvention {
    /// 2.x: object, left, right, size, K1, D1, K2, D2, R, T.
    ImageSizeBeforeIntrinsics,
    /// 3.x and 4.x: object, left, right, K1, D1, K2, D2, size, R, T.
    ImageSizeAfterIntrinsics,
}

impl StereoConvention {
    /// Maps a library version onto its calling convention.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::UnsupportedSolverVersion`] for any major version
    /// outside the 2.x and 3.x/4.x families.
    pub fn from_version(version: &SolverVersion) -> Result<Self, CalibrationError> {
        match version.major {
            2 => Ok(StereoConvention::ImageSizeBeforeIntrinsics),
            3 | 4 => Ok(StereoConvention::ImageSizeAfterIntrinsics),
            _ => Err(CalibrationError::UnsupportedSolverVersion(
                version.to_string(),
            )),
        }
    }
}

/// One positional argument of the stereo routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StereoArg<'a> {
    ObjectPoints(&'a [Vec<Vector3<f64>>]),
    LeftImagePoints(&'a [Vec<Vector2<f64>>]),
    RightImagePoints(&'a [Vec<Vector2<f64>>]),
    ImageSize(Resolution),
    LeftCameraMatrix(&'a Matrix3<f64>),
    LeftDistortion(&'a DVector<f64>),
    RightCameraMatrix(&'a Matrix3<f64>),
    RightDistortion(&'a DVector<f64>),
    Rotation(&'a Matrix3<f64>),
    Translation(&'a Vector3<f64>),
}

impl StereoArg<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            StereoArg::ObjectPoints(_) => "object_points",
            StereoArg::LeftImagePoints(_) => "left_image_points",
            StereoArg::RightImagePoints(_) => "right_image_points",
            StereoArg::ImageSize(_) => "image_size",
            StereoArg::LeftCameraMatrix(_) => "left_camera_matrix",
            StereoArg::LeftDistortion(_) => "left_distortion",
            StereoArg::RightCameraMatrix(_) => "right_camera_matrix",
            StereoArg::RightDistortion(_) => "right_distortion",
            StereoArg::Rotation(_) => "rotation",
            StereoArg::Translation(_) => "translation",
        }
    }
}

/// Observations and initial estimates for a stereo calibration.
#[derive(Debug, Clone, Copy)]
pub struct StereoCalibrationInput<'a> {
    pub object_points: &'a [Vec<Vector3<f64>>],
    pub left_image_points: &'a [Vec<Vector2<f64>>],
    pub right_image_points: &'a [Vec<Vector2<f64>>],
    pub image_size: Resolution,
    pub left_camera_matrix: &'a Matrix3<f64>,
    pub left_distortion: &'a DVector<f64>,
    pub right_camera_matrix: &'a Matrix3<f64>,
    pub right_distortion: &'a DVector<f64>,
    /// Initial rotation from the left to the right camera.
    pub rotation: &'a Matrix3<f64>,
    /// Initial translation from the left to the right camera.
    pub translation: &'a Vector3<f64>,
}

impl<'a> StereoCalibrationInput<'a> {
    /// Flattens the input into positional arguments for `convention`.
    pub fn positional_args(&self, convention: StereoConvention) -> Vec<StereoArg<'a>> {
        let observations = [
            StereoArg::ObjectPoints(self.object_points),
            StereoArg::LeftImagePoints(self.left_image_points),
            StereoArg::RightImagePoints(self.right_image_points),
        ];
        let intrinsics = [
            StereoArg::LeftCameraMatrix(self.left_camera_matrix),
            StereoArg::LeftDistortion(self.left_distortion),
            StereoArg::RightCameraMatrix(self.right_camera_matrix),
            StereoArg::RightDistortion(self.right_distortion),
        ];
        let extrinsics = [
            StereoArg::Rotation(self.rotation),
            StereoArg::Translation(self.translation),
        ];
        let size = StereoArg::ImageSize(self.image_size);

        let mut args = Vec::with_capacity(10);
        args.extend(observations);
        match convention {
            StereoConvention::ImageSizeBeforeIntrinsics => {
                args.push(size);
                args.extend(intrinsics);
            }
            StereoConvention::ImageSizeAfterIntrinsics => {
                args.extend(intrinsics);
                args.push(size);
            }
        }
        args.extend(extrinsics);
        args
    }
}

/// Output of a joint stereo calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoCalibrationResult {
    /// RMS reprojection error over both cameras, in pixels.
    pub reprojection_error: f64,
    pub left_camera_matrix: Matrix3<f64>,
    pub left_distortion: DVector<f64>,
    pub right_camera_matrix: Matrix3<f64>,
    pub right_distortion: DVector<f64>,
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Essential matrix. The fisheye routine does not produce one.
    pub essential: Option<Matrix3<f64>>,
    /// Fundamental matrix. The fisheye routine does not produce one.
    pub fundamental: Option<Matrix3<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4.5.1", 4, 5, 1)]
    #[case("2.4.13.7", 2, 4, 13)]
    #[case("3.4.0-dev", 3, 4, 0)]
    #[case("4.10.0+ubuntu", 4, 10, 0)]
    #[case("3", 3, 0, 0)]
    #[case(" 4.2 ", 4, 2, 0)]
    fn test_parse_version(
        #[case] text: &str,
        #[case] major: u32,
        #[case] minor: u32,
        #[case] patch: u32,
    ) {
        let version: SolverVersion = text.parse().unwrap();
        assert_eq!(
            version,
            SolverVersion {
                major,
                minor,
                patch
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("opencv")]
    #[case("v4.5.1")]
    #[case("4.x.1")]
    fn test_parse_invalid_version(#[case] text: &str) {
        let err = text.parse::<SolverVersion>().unwrap_err();
        assert!(matches!(err, CalibrationError::UnsupportedSolverVersion(ref s) if s == text));
    }

    #[rstest]
    #[case("2.4.13", StereoConvention::ImageSizeBeforeIntrinsics)]
    #[case("3.4.0", StereoConvention::ImageSizeAfterIntrinsics)]
    #[case("4.5.1", StereoConvention::ImageSizeAfterIntrinsics)]
    fn test_convention_for_version(#[case] text: &str, #[case] expected: StereoConvention) {
        let version: SolverVersion = text.parse().unwrap();
        assert_eq!(StereoConvention::from_version(&version).unwrap(), expected);
    }

    #[rstest]
    #[case("1.0.0")]
    #[case("5.0.0")]
    fn test_convention_for_unknown_family(#[case] text: &str) {
        let version: SolverVersion = text.parse().unwrap();
        let err = StereoConvention::from_version(&version).unwrap_err();
        assert!(matches!(err, CalibrationError::UnsupportedSolverVersion(_)));
    }

    fn arg_names(args: &[StereoArg<'_>]) -> Vec<&'static str> {
        args.iter().map(StereoArg::name).collect()
    }

    #[test]
    fn test_positional_args_order() {
        let object_points = vec![vec![Vector3::new(0.0, 0.0, 0.0)]];
        let left_points = vec![vec![Vector2::new(10.0, 20.0)]];
        let right_points = vec![vec![Vector2::new(12.0, 20.0)]];
        let k = Matrix3::identity();
        let d = DVector::zeros(5);
        let r = Matrix3::identity();
        let t = Vector3::new(-0.1, 0.0, 0.0);
        let input = StereoCalibrationInput {
            object_points: &object_points,
            left_image_points: &left_points,
            right_image_points: &right_points,
            image_size: Resolution {
                width: 752,
                height: 480,
            },
            left_camera_matrix: &k,
            left_distortion: &d,
            right_camera_matrix: &k,
            right_distortion: &d,
            rotation: &r,
            translation: &t,
        };

        let legacy = input.positional_args(StereoConvention::ImageSizeBeforeIntrinsics);
        assert_eq!(
            arg_names(&legacy),
            vec![
                "object_points",
                "left_image_points",
                "right_image_points",
                "image_size",
                "left_camera_matrix",
                "left_distortion",
                "right_camera_matrix",
                "right_distortion",
                "rotation",
                "translation",
            ]
        );

        let modern = input.positional_args(StereoConvention::ImageSizeAfterIntrinsics);
        assert_eq!(
            arg_names(&modern),
            vec![
                "object_points",
                "left_image_points",
                "right_image_points",
                "left_camera_matrix",
                "left_distortion",
                "right_camera_matrix",
                "right_distortion",
                "image_size",
                "rotation",
                "translation",
            ]
        );
        assert_eq!(
            modern[7],
            StereoArg::ImageSize(Resolution {
                width: 752,
                height: 480
            })
        );
    }
}
