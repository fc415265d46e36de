//! Solver constraint flags and their per-model bit vocabularies.
//!
//! The pinhole and fisheye solvers name overlapping concepts (fix K1, fix the
//! principal point, ...) with different bit values, and each supports flags
//! the other lacks. A [`CalibrationFlags`] mask therefore always carries the
//! [`CalibrationModel`] it was built for; the same bit pattern means
//! different things under the two models.

use log::warn;
use std::fmt;

use crate::camera::CalibrationModel;
use crate::error::CalibrationError;
use crate::options::CalibrationOptions;

/// A single named solver constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CalibrationFlag {
    /// Start from the supplied camera matrix instead of estimating one.
    UseIntrinsicGuess,
    /// Keep fx/fy at their initial ratio.
    FixAspectRatio,
    /// Keep the principal point at its initial value.
    FixPrincipalPoint,
    /// Force p1 = p2 = 0.
    ZeroTangentialDistortion,
    /// Hold both cameras' intrinsics during stereo calibration.
    FixIntrinsic,
    FixK1,
    FixK2,
    FixK3,
    FixK4,
    FixK5,
    FixK6,
    /// Enable the rational pinhole polynomial, which unlocks K4..K6.
    RationalModel,
}

impl CalibrationFlag {
    pub const ALL: [CalibrationFlag; 12] = [
        CalibrationFlag::UseIntrinsicGuess,
        CalibrationFlag::FixAspectRatio,
        CalibrationFlag::FixPrincipalPoint,
        CalibrationFlag::ZeroTangentialDistortion,
        CalibrationFlag::FixIntrinsic,
        CalibrationFlag::FixK1,
        CalibrationFlag::FixK2,
        CalibrationFlag::FixK3,
        CalibrationFlag::FixK4,
        CalibrationFlag::FixK5,
        CalibrationFlag::FixK6,
        CalibrationFlag::RationalModel,
    ];

    /// The "fix radial coefficient" flag for coefficient `index` (1-based).
    pub fn fix_radial(index: i32) -> Option<Self> {
        match index {
            1 => Some(CalibrationFlag::FixK1),
            2 => Some(CalibrationFlag::FixK2),
            3 => Some(CalibrationFlag::FixK3),
            4 => Some(CalibrationFlag::FixK4),
            5 => Some(CalibrationFlag::FixK5),
            6 => Some(CalibrationFlag::FixK6),
            _ => None,
        }
    }

    /// Bit value of this flag in the solver vocabulary of `model`, or `None`
    /// if that solver has no such constraint.
    pub fn bits(self, model: CalibrationModel) -> Option<u32> {
        use CalibrationFlag::*;
        match model {
            CalibrationModel::Pinhole => Some(match self {
                UseIntrinsicGuess => 0x0001,
                FixAspectRatio => 0x0002,
                FixPrincipalPoint => 0x0004,
                ZeroTangentialDistortion => 0x0008,
                FixK1 => 0x0020,
                FixK2 => 0x0040,
                FixK3 => 0x0080,
                FixIntrinsic => 0x0100,
                FixK4 => 0x0800,
                FixK5 => 0x1000,
                FixK6 => 0x2000,
                RationalModel => 0x4000,
            }),
            CalibrationModel::Fisheye => match self {
                UseIntrinsicGuess => Some(0x0001),
                FixK1 => Some(0x0010),
                FixK2 => Some(0x0020),
                FixK3 => Some(0x0040),
                FixK4 => Some(0x0080),
                FixIntrinsic => Some(0x0100),
                FixPrincipalPoint => Some(0x0200),
                FixAspectRatio | ZeroTangentialDistortion | FixK5 | FixK6 | RationalModel => None,
            },
        }
    }
}

/// A set of [`CalibrationFlag`]s encoded for one model's solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalibrationFlags {
    model: CalibrationModel,
    bits: u32,
}

impl CalibrationFlags {
    /// A mask with no constraints.
    pub fn empty(model: CalibrationModel) -> Self {
        CalibrationFlags { model, bits: 0 }
    }

    /// Builds a mask from explicit flags.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::UnsupportedFlag`] if one of the flags does not
    /// exist in the solver vocabulary of `model`.
    pub fn from_flags(
        model: CalibrationModel,
        flags: &[CalibrationFlag],
    ) -> Result<Self, CalibrationError> {
        let mut mask = CalibrationFlags::empty(model);
        for &flag in flags {
            mask.insert(flag)?;
        }
        Ok(mask)
    }

    /// Translates high-level options into the constraint mask for `model`.
    ///
    /// Every radial coefficient above `k_coefficients` is fixed. Rules are
    /// evaluated independently from the highest coefficient down, so several
    /// fix flags combine in one mask.
    pub fn from_options(model: CalibrationModel, options: &CalibrationOptions) -> Self {
        match model {
            CalibrationModel::Pinhole => pinhole_flags(options),
            CalibrationModel::Fisheye => fisheye_flags(options),
        }
    }

    /// Adds a flag to the mask.
    pub fn insert(&mut self, flag: CalibrationFlag) -> Result<(), CalibrationError> {
        let bit = flag.bits(self.model).ok_or(CalibrationError::UnsupportedFlag {
            flag,
            model: self.model,
        })?;
        self.bits |= bit;
        Ok(())
    }

    pub fn contains(&self, flag: CalibrationFlag) -> bool {
        flag.bits(self.model)
            .is_some_and(|bit| self.bits & bit == bit)
    }

    /// Iterates the named flags set in this mask, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = CalibrationFlag> + '_ {
        CalibrationFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Raw bits as the solver expects them.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Model whose vocabulary the bits are expressed in.
    pub fn model(&self) -> CalibrationModel {
        self.model
    }

    // Only called with flags known to exist in `self.model`.
    fn set(&mut self, flag: CalibrationFlag) {
        if let Some(bit) = flag.bits(self.model) {
            self.bits |= bit;
        }
    }
}

impl fmt::Display for CalibrationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|flag| format!("{flag:?}")).collect();
        write!(f, "{}[{}] (0x{:04x})", self.model, names.join(" | "), self.bits)
    }
}

fn fix_unused_coefficients(flags: &mut CalibrationFlags, k_coefficients: i32) {
    for index in (1..=flags.model.max_radial_coefficients()).rev() {
        if k_coefficients < index {
            if let Some(flag) = CalibrationFlag::fix_radial(index) {
                flags.set(flag);
            }
        }
    }
}

fn pinhole_flags(options: &CalibrationOptions) -> CalibrationFlags {
    let mut flags = CalibrationFlags::empty(CalibrationModel::Pinhole);

    if options.k_coefficients > 3 {
        flags.set(CalibrationFlag::RationalModel);
    }
    fix_unused_coefficients(&mut flags, options.k_coefficients);

    if options.fix_principal_point {
        flags.set(CalibrationFlag::FixPrincipalPoint);
    }
    if options.fix_aspect_ratio {
        flags.set(CalibrationFlag::FixAspectRatio);
    }
    if options.zero_tangential_distortion {
        flags.set(CalibrationFlag::ZeroTangentialDistortion);
    }
    flags
}

fn fisheye_flags(options: &CalibrationOptions) -> CalibrationFlags {
    let mut flags = CalibrationFlags::empty(CalibrationModel::Fisheye);

    fix_unused_coefficients(&mut flags, options.k_coefficients);

    if options.fix_principal_point {
        flags.set(CalibrationFlag::FixPrincipalPoint);
    }
    // The fisheye solver has neither constraint; both options are no-ops.
    if options.fix_aspect_ratio {
        warn!("fix_aspect_ratio is not supported by the fisheye model, ignoring it");
    }
    if options.zero_tangential_distortion {
        warn!("zero_tangential_distortion is not supported by the fisheye model, ignoring it");
    }
    flags
}
