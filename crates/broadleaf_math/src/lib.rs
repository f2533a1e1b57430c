//! 3D Mathematics Library
//!
//! Vector and axis types shared by the Broadleaf physics and entity crates.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Axis`] - One of the three coordinate axes

mod vec3;

pub use vec3::{Axis, Vec3};
