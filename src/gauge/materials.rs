//! Ultrasonic velocity table and calibration factors
//!
//! The gauge computes thickness from time-of-flight assuming a fixed sound
//! velocity of 6400 m/s. Readings taken on any other material are rescaled by
//! `velocity(material) / 6400`.

use super::constants::REFERENCE_VELOCITY;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Built-in longitudinal sound velocities (m/s)
const STANDARD_MATERIALS: &[(&str, f64)] = &[
    ("aluminium alloy", 6380.0),
    ("aluminium 2014", 6320.0),
    ("aluminium 2024 T4", 6370.0),
    ("aluminium 2117 T4", 6500.0),
    ("brass CuZn40", 4400.0),
    ("brass naval", 4330.0),
    ("brass CuZn30", 4700.0),
    ("copper", 4850.0),
    ("grey cast iron", 4600.0),
    ("inconel", 5700.0),
    ("lead", 2150.0),
    ("monel", 5400.0),
    ("nickel", 5630.0),
    ("phosphor bronze", 3530.0),
    ("mild steel", 5920.0),
    ("stainless steel 302", 5660.0),
    ("stainless steel 347", 5790.0),
    ("stainless steel 314", 5715.0),
    ("stainless steel 316", 5750.0),
    ("f51 duplex steel", 5725.0), // UNS S31803
    ("core ten steel", 5920.0), // EN12223 S355-J0
    ("tin", 3320.0),
    ("titanium", 6165.0),
    ("tungsten carbide", 6660.0),
    ("epoxy resin", 2500.0),
    ("acrylic", 2730.0),
    ("nylon polyamide", 2620.0),
];

/// Ratio correcting the gauge's assumed velocity to a material's true velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFactor(f64);

impl CalibrationFactor {
    /// Factor for a material with the given sound velocity
    pub fn from_velocity(velocity: f64) -> Self {
        Self(velocity / REFERENCE_VELOCITY)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Rescale a raw gauge value
    #[inline]
    pub fn apply(self, raw: f64) -> f64 {
        raw * self.0
    }
}

/// Immutable mapping from material name to sound velocity
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    velocities: BTreeMap<String, f64>,
}

impl MaterialLibrary {
    /// Library holding only the built-in table
    pub fn standard() -> Self {
        Self {
            velocities: STANDARD_MATERIALS
                .iter()
                .map(|&(name, velocity)| (name.to_string(), velocity))
                .collect(),
        }
    }

    /// Built-in table extended with additional materials
    ///
    /// Entries replace built-ins of the same name. Every velocity must be a
    /// positive finite number.
    pub fn with_extra<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut library = Self::standard();
        for (name, velocity) in extra {
            let name = name.into();
            if !velocity.is_finite() || velocity <= 0.0 {
                return Err(Error::Config(format!(
                    "material {:?} has non-positive velocity {}",
                    name, velocity
                )));
            }
            if library.velocities.insert(name.clone(), velocity).is_some() {
                log::info!("Material {:?} overridden: {} m/s", name, velocity);
            }
        }
        Ok(library)
    }

    /// Tabulated velocity for `name`
    pub fn velocity_of(&self, name: &str) -> Result<f64> {
        self.velocities
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownMaterial(name.to_string()))
    }

    /// `velocity_of(name) / 6400`
    pub fn calibration_factor(&self, name: &str) -> Result<CalibrationFactor> {
        self.velocity_of(name).map(CalibrationFactor::from_velocity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.velocities.contains_key(name)
    }

    /// Material names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.velocities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.velocities.iter().map(|(name, &v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
