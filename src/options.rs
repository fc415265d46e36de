//! High-level calibration options.
//!
//! [`CalibrationOptions`] is the model-independent description of which
//! parameters a calibration run should leave free. The backend turns it into
//! a model-specific [`crate::CalibrationFlags`] mask.

use serde::{Deserialize, Serialize};
use std::{fs, io::Write};

use crate::error::CalibrationError;

/// Options that drive flag computation.
///
/// No invariants are enforced: a negative `k_coefficients` fixes every
/// radial coefficient and a value above the model's maximum fixes none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationOptions {
    /// Number of radial distortion coefficients left free in the solve.
    pub k_coefficients: i32,
    /// Hold the principal point at its initial value.
    pub fix_principal_point: bool,
    /// Hold fx/fy at their initial ratio. Pinhole only.
    pub fix_aspect_ratio: bool,
    /// Force the tangential coefficients to zero. Pinhole only.
    pub zero_tangential_distortion: bool,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        CalibrationOptions {
            k_coefficients: 2,
            fix_principal_point: false,
            fix_aspect_ratio: false,
            zero_tangential_distortion: false,
        }
    }
}

impl CalibrationOptions {
    /// Loads options from a YAML file. Missing keys take their default value.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::IOError`] if the file cannot be read.
    /// * [`CalibrationError::YamlError`] if the content is not valid YAML for
    ///   this structure.
    pub fn load_from_yaml(path: &str) -> Result<Self, CalibrationError> {
        let contents = fs::read_to_string(path)?;
        let options: CalibrationOptions = serde_yaml::from_str(&contents)?;
        Ok(options)
    }

    /// Writes the options to a YAML file, overwriting it.
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CalibrationError> {
        let yaml_string = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml_string.as_bytes())?;
        Ok(())
    }
}
