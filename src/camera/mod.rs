//! Camera-side value types shared by every calibration backend.
//!
//! This module defines the [`CalibrationModel`] selector along with the
//! [`Intrinsics`] and [`Resolution`] records passed to and returned from the
//! solver library.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalibrationError;

/// Lens model used for a calibration session.
///
/// The model decides which solver family every backend operation is routed
/// to, and which flag vocabulary a [`crate::CalibrationFlags`] mask is
/// expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationModel {
    /// Perspective camera with polynomial radial/tangential distortion (up to K6).
    #[default]
    Pinhole,
    /// Wide field-of-view lens with the equidistant fisheye polynomial (up to K4).
    Fisheye,
}

impl CalibrationModel {
    /// Lowercase tag used in configuration files and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationModel::Pinhole => "pinhole",
            CalibrationModel::Fisheye => "fisheye",
        }
    }

    /// Highest radial coefficient index the model's distortion polynomial has.
    pub fn max_radial_coefficients(&self) -> i32 {
        match self {
            CalibrationModel::Pinhole => 6,
            CalibrationModel::Fisheye => 4,
        }
    }
}

impl fmt::Display for CalibrationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalibrationModel {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pinhole" => Ok(CalibrationModel::Pinhole),
            "fisheye" => Ok(CalibrationModel::Fisheye),
            _ => Err(CalibrationError::UnknownModel(s.to_string())),
        }
    }
}

/// Focal lengths and principal point of a camera, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    /// Builds the 3x3 camera matrix `[fx 0 cx; 0 fy cy; 0 0 1]`.
    pub fn to_camera_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Reads the intrinsics back out of a camera matrix. Skew is dropped.
    pub fn from_camera_matrix(camera_matrix: &Matrix3<f64>) -> Self {
        Intrinsics {
            fx: camera_matrix[(0, 0)],
            fy: camera_matrix[(1, 1)],
            cx: camera_matrix[(0, 2)],
            cy: camera_matrix[(1, 2)],
        }
    }
}

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("pinhole", CalibrationModel::Pinhole)]
    #[case("fisheye", CalibrationModel::Fisheye)]
    #[case("  Fisheye ", CalibrationModel::Fisheye)]
    #[case("PINHOLE", CalibrationModel::Pinhole)]
    fn test_parse_model(#[case] text: &str, #[case] expected: CalibrationModel) {
        assert_eq!(text.parse::<CalibrationModel>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let err = "fishey".parse::<CalibrationModel>().unwrap_err();
        assert!(matches!(err, CalibrationError::UnknownModel(ref s) if s == "fishey"));
    }

    #[test]
    fn test_default_model_is_pinhole() {
        assert_eq!(CalibrationModel::default(), CalibrationModel::Pinhole);
    }

    #[test]
    fn test_model_display_round_trips_through_from_str() {
        for model in [CalibrationModel::Pinhole, CalibrationModel::Fisheye] {
            assert_eq!(model.to_string().parse::<CalibrationModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_intrinsics_camera_matrix() {
        let intrinsics = Intrinsics {
            fx: 461.629,
            fy: 460.152,
            cx: 362.680,
            cy: 246.049,
        };
        let k = intrinsics.to_camera_matrix();
        assert_relative_eq!(k[(0, 0)], 461.629);
        assert_relative_eq!(k[(1, 2)], 246.049);
        assert_relative_eq!(k[(2, 2)], 1.0);
        assert_eq!(k[(0, 1)], 0.0);

        let back = Intrinsics::from_camera_matrix(&k);
        assert_eq!(back, intrinsics);
    }
}
