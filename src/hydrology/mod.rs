//! Hydrology engine
//!
//! Three passes over the elevation grid, run in this order:
//! - **Precipitation**: prevailing-wind moisture transport along both axes
//! - **Rivers**: river trees grown inland from coastal seeds
//! - **Erosion**: flow-direction sediment transport and mudslide smoothing

pub mod erosion;
pub mod precipitation;
pub mod rivers;

pub use erosion::{simulate_erosion, ErosionStats};
pub use precipitation::simulate_precipitation;
pub use rivers::{build_river_network, RiverStats, RiverSystem};

/// Per-cell flow record shared by the river builder and the erosion passes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellFlow {
    /// Steepest-descent neighbor (see `tilemap::DIR_OFFSETS`), 0 = none
    pub flow_dir: u8,
    /// Steepest-ascent neighbor, 0 = none
    pub rising_dir: u8,
    /// Height drop toward `flow_dir`, scaled by 1/sqrt(2) on diagonals
    pub slope: f32,
    /// Id of the river that first claimed the cell, 0 = none
    pub river_id: u16,
}
