// src/mineral.rs - Mineral system with growth and solubility properties

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MineralType {
    Quartz,
    Calcite,
    Anhydrite,
    Pyrite,
}

impl MineralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MineralType::Quartz => "quartz",
            MineralType::Calcite => "calcite",
            MineralType::Anhydrite => "anhydrite",
            MineralType::Pyrite => "pyrite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "quartz" => Some(MineralType::Quartz),
            "calcite" => Some(MineralType::Calcite),
            "anhydrite" => Some(MineralType::Anhydrite),
            "pyrite" => Some(MineralType::Pyrite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MineralProfile {
    pub kind: MineralType,
    pub density_kg_m3: f64,
    pub molar_volume_m3_mol: f64,
    /// Aqueous solubility used as the supersaturation reference
    pub equilibrium_concentration_mol_l: f64,
    /// Reference face growth rate under sustained supersaturation
    pub growth_rate_m_per_s: f64,
}

pub static MINERAL_PROFILES: Lazy<HashMap<MineralType, MineralProfile>> = Lazy::new(|| {
    use MineralType::*;
    let mut m = HashMap::new();

    m.insert(Quartz, MineralProfile {
        kind: Quartz,
        density_kg_m3: 2650.0,
        molar_volume_m3_mol: 2.27e-5,
        equilibrium_concentration_mol_l: 1.0e-4,
        growth_rate_m_per_s: 1.0e-11,
    });

    m.insert(Calcite, MineralProfile {
        kind: Calcite,
        density_kg_m3: 2710.0,
        molar_volume_m3_mol: 3.69e-5,
        equilibrium_concentration_mol_l: 5.0e-4,
        growth_rate_m_per_s: 5.0e-11,
    });

    m.insert(Anhydrite, MineralProfile {
        kind: Anhydrite,
        density_kg_m3: 2970.0,
        molar_volume_m3_mol: 4.59e-5,
        equilibrium_concentration_mol_l: 2.0e-2,
        growth_rate_m_per_s: 8.0e-11,
    });

    m.insert(Pyrite, MineralProfile {
        kind: Pyrite,
        density_kg_m3: 5010.0,
        molar_volume_m3_mol: 2.39e-5,
        equilibrium_concentration_mol_l: 1.0e-6,
        growth_rate_m_per_s: 2.0e-12,
    });

    m
});

pub fn get_profile(kind: MineralType) -> Option<&'static MineralProfile> {
    MINERAL_PROFILES.get(&kind)
}
