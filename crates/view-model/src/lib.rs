//! Multiview Model
//!
//! Defines the data contracts consumed by the composer:
//! - **Cameras:** nominal resolution, rotation, and centermark flags
//! - **Layouts:** named n-ary trees of horizontal/vertical junctions over camera leaves
//! - **Overlays:** templated text with variables, color rules, and visibility conditions
//! - **Values:** the scalar type flowing through templates and the sensor snapshot
//!
//! Loading validates structure up front so that the rest of the pipeline can
//! assume a well-formed configuration.

pub mod camera;
pub mod layout;
pub mod ordered;
pub mod overlay;
pub mod sensor;
pub mod value;
pub mod viewer;

pub use camera::*;
pub use layout::*;
pub use ordered::OrderedMap;
pub use overlay::*;
pub use sensor::*;
pub use value::*;
pub use viewer::*;
