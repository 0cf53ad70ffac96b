pub mod boundary;
pub mod config;
pub mod constants;
pub mod constitutive;
pub mod field;
pub mod grid_state;
pub mod heat_transfer;
pub mod math_utils;
pub mod mineral;
pub mod multiphase_flow;
pub mod nucleation;
pub mod nucleus;
