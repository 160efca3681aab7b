//! Time-range segmentation and the two-pointer sweep over a date-sorted
//! transaction list.

mod segmentation;
mod sweep;

pub use segmentation::{Density, SegmentStep, Segmentation};
pub use sweep::{Dated, SweepSection, SweepSegment, TimelineSweep};
