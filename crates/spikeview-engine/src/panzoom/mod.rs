//! Pan/zoom transform.
//!
//! Logical scene coordinates map to NDC as `(position + pan) * effective_zoom`,
//! where the effective zoom folds the canvas aspect correction and the declared
//! scene aspect into the scalar zoom. The transform pushes `u_pan` and `u_zoom`
//! to every registered program synchronously with each change.

mod config;
mod events;
mod transform;

pub use config::PanZoomConfig;
pub use events::{DragEvent, WheelEvent};
pub use transform::Transform2D;
