//! # Materials
//!
//! Material definitions referenced by bars, slabs and panels. The
//! interchange format stores each material once, with its elastic
//! properties in a child element named after the material family.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::materials::Material;
//!
//! let steel = Material::steel_s355();
//! let stiffer = steel.with_elasticity_modulus(2.2e8)?;
//!
//! assert_eq!(steel.id(), stiffer.id());
//! assert_eq!(steel.e_modulus.value(), 2.1e8);
//! assert_eq!(stiffer.e_modulus.value(), 2.2e8);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta};
use crate::errors::StruxResult;
use crate::restricted::{MaterialFamily, NonNegMax1e15, NonNegMax1e5, Ratio01};

/// Default design standard of new materials
pub const DEFAULT_STANDARD: &str = "EC";
/// Default national annex of new materials
pub const DEFAULT_COUNTRY: &str = "S";

/// Isotropic linear-elastic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub standard: String,
    pub country: String,
    pub family: MaterialFamily,
    /// Modulus of elasticity E [kN/m²]
    pub e_modulus: NonNegMax1e15,
    /// Poisson's ratio ν
    pub poisson: Ratio01,
    /// Density [t/m³]
    pub density: NonNegMax1e5,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        family: MaterialFamily,
        e_modulus: f64,
        poisson: f64,
        density: f64,
    ) -> StruxResult<Self> {
        Ok(Material {
            meta: EntityMeta::created(),
            name: name.into(),
            standard: DEFAULT_STANDARD.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            family,
            e_modulus: NonNegMax1e15::new(e_modulus)?,
            poisson: Ratio01::new(poisson)?,
            density: NonNegMax1e5::new(density)?,
        })
    }

    /// Structural steel S355
    pub fn steel_s355() -> Self {
        Material::preset("S 355", MaterialFamily::Steel, 2.1e8, 0.3, 7.85)
    }

    /// Concrete C30/37
    pub fn concrete_c30_37() -> Self {
        Material::preset("C30/37", MaterialFamily::Concrete, 3.3e7, 0.2, 2.5)
    }

    /// Glulam GL28h
    pub fn timber_gl28h() -> Self {
        Material::preset("GL28h", MaterialFamily::Timber, 1.26e7, 0.0, 0.5)
    }

    fn preset(name: &str, family: MaterialFamily, e: f64, nu: f64, density: f64) -> Self {
        Material {
            meta: EntityMeta::created(),
            name: name.to_string(),
            standard: DEFAULT_STANDARD.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            family,
            e_modulus: NonNegMax1e15::from_const(e),
            poisson: Ratio01::from_const(nu),
            density: NonNegMax1e5::from_const(density),
        }
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    /// Copy with a different standard and national annex
    pub fn with_standard(&self, standard: impl Into<String>, country: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.standard = standard.into();
        m.country = country.into();
        m.meta.touch();
        m
    }

    /// Copy with a different modulus of elasticity; the identity is kept
    pub fn with_elasticity_modulus(&self, e_modulus: f64) -> StruxResult<Self> {
        let mut m = self.clone();
        m.e_modulus = NonNegMax1e15::new(e_modulus)?;
        m.meta.touch();
        Ok(m)
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for m in [Material::steel_s355(), Material::concrete_c30_37(), Material::timber_gl28h()] {
            assert!(Material::new(m.name.clone(), m.family, m.e_modulus.value(), m.poisson.value(), m.density.value())
                .is_ok());
        }
    }

    #[test]
    fn test_elasticity_update_is_out_of_place() {
        let c = Material::concrete_c30_37();
        let cracked = c.with_elasticity_modulus(1.1e7).unwrap();
        assert_eq!(c.e_modulus.value(), 3.3e7);
        assert_eq!(cracked.e_modulus.value(), 1.1e7);
        assert_eq!(cracked.id(), c.id());
        assert!(c.with_elasticity_modulus(-1.0).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Material::steel_s355().to_string(), "S 355 (steel)");
    }
}
