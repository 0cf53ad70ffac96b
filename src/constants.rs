// Physical constants for the transport solvers (grid-independent)

pub const GRAVITY_M_S2: f64 = 9.81;
pub const GAS_CONSTANT_J_MOL_K: f64 = 8.314;
pub const TO_KELVIN: f64 = 273.15;

// Default pore-fluid properties at reservoir conditions
pub const WATER_DENSITY_KG_M3: f64 = 1000.0;
pub const GAS_DENSITY_KG_M3: f64 = 100.0; // compressed methane-like gas at depth
pub const VAPOR_DENSITY_KG_M3: f64 = 10.0;
pub const WATER_VISCOSITY_PA_S: f64 = 1.0e-3;
pub const GAS_VISCOSITY_PA_S: f64 = 1.5e-5;

// Default rock thermal properties
pub const ROCK_DENSITY_KG_M3: f64 = 2500.0;
pub const ROCK_SPECIFIC_HEAT_J_KG_K: f64 = 1000.0;
pub const ROCK_CONDUCTIVITY_W_M_K: f64 = 2.0;

// Default van Genuchten shape parameters for reservoir sandstone
pub const DEFAULT_VAN_GENUCHTEN_M: f64 = 0.457;
pub const DEFAULT_VAN_GENUCHTEN_ALPHA_PER_PA: f64 = 1.0e-4;
pub const DEFAULT_RESIDUAL_LIQUID_SATURATION: f64 = 0.15;
pub const DEFAULT_RESIDUAL_GAS_SATURATION: f64 = 0.05;

// Solver guard values
pub const CONDUCTIVITY_EPSILON: f64 = 1e-20; // keeps harmonic means finite at zero conductivity
pub const MIN_ACTIVE_POROSITY: f64 = 0.01; // cells below this are skipped by the flow solver
pub const MIN_POROSITY: f64 = 0.01; // crystal growth never seals a cell past this
pub const GAS_PRESENCE_THRESHOLD: f64 = 1e-10; // saturation above this triggers the multiphase path
pub const MIN_MOBILE_SATURATION: f64 = 0.01; // below this the bulk velocity is left unchanged
pub const CAPILLARY_DRY_SENTINEL_PA: f64 = 1e8; // finite stand-in for the dry-cell singularity

// Heuristic isothermal compressibility feedback: dP = -S_gas * feedback * dt.
// A local nudge, not a pressure solve.
pub const GAS_PRESSURE_FEEDBACK_PA_PER_S: f64 = 1000.0 * 0.01;

// Explicit diffusion stability limit: dt <= factor * dx^2 / alpha
pub const DIFFUSION_CFL_FACTOR: f64 = 0.25;
