//! Dashboard measures over a filtered view.
//!
//! Everything here is a pure function of the view it is given. Empty views
//! yield zeros, `None` averages and empty groupings, never an error.

pub mod aggregate;
pub mod types;
pub mod utility;
