//! Configuration types and defaults.

mod defaults;
mod options;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use options::*;
