// Boundary condition set for the transport solvers
//
// Conditions are held in an ordered list; solvers apply only active entries,
// in list order, so a later entry for the same face wins. Faces without a
// condition fall back to zero-gradient extrapolation inside each solver.

use crate::math_utils::interpolate_table;
use serde::{Deserialize, Serialize};

/// Which face of the domain a condition is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryLocation {
    XMin,
    XMax,
    YMin,
    YMax,
    ZMin,
    ZMax,
}

/// Which physical variable a condition constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryVariable {
    Temperature,
    Pressure,
    Concentration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    FixedValue,
    FixedFlux,
}

/// A constant or time-dependent condition value
///
/// Tables are `(time_s, value)` pairs sorted ascending, evaluated by linear
/// interpolation and clamped outside their range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundaryValue {
    Constant(f64),
    Table(Vec<(f64, f64)>),
}

impl BoundaryValue {
    pub fn value_at(&self, time_s: f64) -> f64 {
        match self {
            BoundaryValue::Constant(v) => *v,
            BoundaryValue::Table(table) => interpolate_table(table, time_s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub location: BoundaryLocation,
    pub variable: BoundaryVariable,
    pub kind: BoundaryKind,
    pub value: BoundaryValue,
    /// Species name for concentration conditions
    pub species: Option<String>,
    pub active: bool,
}

impl BoundaryCondition {
    /// Fixed-temperature condition on one face
    pub fn fixed_temperature(location: BoundaryLocation, kelvin: f64) -> Self {
        Self {
            location,
            variable: BoundaryVariable::Temperature,
            kind: BoundaryKind::FixedValue,
            value: BoundaryValue::Constant(kelvin),
            species: None,
            active: true,
        }
    }

    /// Fixed concentration of a named species on one face
    pub fn fixed_concentration(location: BoundaryLocation, species: &str, value: f64) -> Self {
        Self {
            location,
            variable: BoundaryVariable::Concentration,
            kind: BoundaryKind::FixedValue,
            value: BoundaryValue::Constant(value),
            species: Some(species.to_string()),
            active: true,
        }
    }

    /// True when this condition names a gas-like species the flow solver
    /// treats as the transported gas phase
    pub fn is_gas_species(&self) -> bool {
        match &self.species {
            Some(name) => matches!(name.as_str(), "Gas" | "NCG" | "Methane"),
            None => false,
        }
    }
}
