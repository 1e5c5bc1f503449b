//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the software from the `SWERVE_SW_ROOT`
/// environment variable.
pub fn get_swerve_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("SWERVE_SW_ROOT")?))
}
