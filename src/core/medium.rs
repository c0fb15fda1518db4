use crate::core::vector::{self, Vector};
use crate::error::{Error, Result};

/// The carrier fluid (SI units). Its velocity field lives on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidMedium {
    pub name: String,
    /// Mass density (kg/m^3).
    pub density: f64,
    /// Dynamic viscosity (Pa s).
    pub viscosity: f64,
    /// Relative permittivity at the driving frequency.
    pub relative_permittivity: f64,
}

impl FluidMedium {
    /// Errors:
    /// - `Error::InvalidParam` if `viscosity` is not finite and > 0, or any value is NaN/inf.
    pub fn new(
        name: impl Into<String>,
        density: f64,
        viscosity: f64,
        relative_permittivity: f64,
    ) -> Result<Self> {
        if !viscosity.is_finite() || viscosity <= 0.0 {
            return Err(Error::InvalidParam(
                "viscosity must be finite and > 0".into(),
            ));
        }
        if !density.is_finite() || !relative_permittivity.is_finite() {
            return Err(Error::InvalidParam(
                "fluid density and permittivity must be finite".into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            density,
            viscosity,
            relative_permittivity,
        })
    }
}

impl Default for FluidMedium {
    fn default() -> Self {
        Self {
            name: "fluid".into(),
            density: 1.0,
            viscosity: 1.0,
            relative_permittivity: 81.0,
        }
    }
}

/// Physical constants for one run (SI units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants<const D: usize> {
    /// Gravitational acceleration vector (m/s^2).
    pub gravity: Vector<D>,
    /// Boltzmann constant (J/K).
    pub boltzmann: f64,
    /// Vacuum permittivity (F/m).
    pub vacuum_permittivity: f64,
}

impl<const D: usize> PhysicalConstants<D> {
    /// Re-dimension the constants, truncating or zero-padding the gravity vector.
    pub fn project<const E: usize>(&self) -> PhysicalConstants<E> {
        PhysicalConstants {
            gravity: vector::from_slice(&self.gravity),
            boltzmann: self.boltzmann,
            vacuum_permittivity: self.vacuum_permittivity,
        }
    }
}

impl<const D: usize> Default for PhysicalConstants<D> {
    /// Gravity of 9.8 m/s^2 along -y, `k_B = 1.38e-23`, `eps_0 = 8.85e-12`.
    fn default() -> Self {
        Self {
            gravity: vector::from_slice(&[0.0, -9.8]),
            boltzmann: 1.38e-23,
            vacuum_permittivity: 8.85e-12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_viscosity_rejected() {
        let err = FluidMedium::new("water", 1000.0, 0.0, 81.0).unwrap_err();
        assert!(err.to_string().contains("viscosity"));
    }

    #[test]
    fn constants_project_between_dimensions() {
        let c2 = PhysicalConstants::<2>::default();
        assert_eq!(c2.gravity, [0.0, -9.8]);
        let c3: PhysicalConstants<3> = c2.project();
        assert_eq!(c3.gravity, [0.0, -9.8, 0.0]);
        assert_eq!(c3.vacuum_permittivity, 8.85e-12);
    }
}
