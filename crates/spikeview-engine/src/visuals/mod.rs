//! Spike-sorting plots built on [`BakeVisual`](crate::bake::BakeVisual).
//!
//! Every visual validates setter input up front, records what changed, and
//! uploads it to its program on the next bake.

mod colors;
mod correlograms;
mod grid;
mod spikes;

pub use self::correlograms::{tessellate_histogram, CorrelogramState, CorrelogramVisual};
pub use self::grid::{
    AxisGrid, AxisVisual, BoxGrid, BoxVisual, GridGeometry, GridState, GridVisual,
};
pub use self::spikes::{SpikeState, SpikeVisual};
