//! Reusable widgets.

pub mod slider;

pub use slider::{Handle, RangeSlider, RangeSliderView};
