//! Building blocks shared by the screen state machines.

pub mod container;
pub mod debounce;
pub mod loading;

pub use container::{Projection, StateContainer, UiStateObserver};
pub use debounce::debounce;
pub use loading::ensure_minimum_loading_time;
