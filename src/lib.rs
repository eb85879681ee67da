#![doc = include_str!("../README.md")]

pub(crate) mod ansi;
pub(crate) mod log;
pub(crate) mod progress;
pub(crate) mod runner;
pub(crate) mod spinner;
pub(crate) mod theme;

#[cfg(test)]
mod test;

/// Re-exports of all public types and traits.
pub mod prelude {
    pub use crate::ansi::Color;
    pub use crate::progress::{ProgressBar, ProgressBuilder, ProgressOptions, ProgressSnapshot};
    pub use crate::runner::{Frame, RenderLoop};
    pub use crate::spinner::{Spinner, SpinnerBuilder, SpinnerGuard, SpinnerOptions, SpinnerState};
    pub use crate::theme::{AnimationTheme, BarStyle, BarTheme, SpinnerStyle};
}

pub use crate::prelude::*;
