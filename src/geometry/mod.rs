//! Edge-point resolution and connection routing.
//!
//! All geometry is computed in the diagram's fixed logical coordinate space.

pub(crate) mod edge;
pub(crate) mod route;
