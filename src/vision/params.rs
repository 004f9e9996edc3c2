//! Color parameter files
//!
//! A parameter file holds six whitespace-separated integers:
//!
//! ```text
//! red green blue hue_tol sat_tol val_tol
//! ```

use std::path::Path;

use super::color::ColorSpec;
use crate::{Result, RigError};

const PARAM_COUNT: usize = 6;

/// Read a [`ColorSpec`] from a parameter file
pub fn read_params(path: impl AsRef<Path>) -> Result<ColorSpec> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| RigError::from_io(path, e))?;
    parse_params(&content, path)
}

/// Render a [`ColorSpec`] in parameter file form
pub fn format_params(spec: &ColorSpec) -> String {
    let [r, g, b] = spec.color;
    format!(
        "{} {} {}\n{} {} {}\n",
        r, g, b, spec.hue_tol, spec.sat_tol, spec.val_tol
    )
}

/// Save a [`ColorSpec`] so [`read_params`] can load it back
pub fn write_params(path: impl AsRef<Path>, spec: &ColorSpec) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format_params(spec)).map_err(|e| RigError::from_io(path, e))?;
    log::info!("Wrote color parameters to {}", path.display());
    Ok(())
}

/// Parse parameter file contents; `path` is only used in error messages
pub fn parse_params(content: &str, path: &Path) -> Result<ColorSpec> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != PARAM_COUNT {
        return Err(RigError::param_read(
            path,
            format!(
                "expected {} integers, found {} tokens",
                PARAM_COUNT,
                tokens.len()
            ),
        ));
    }

    let mut values = [0i32; PARAM_COUNT];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = token
            .parse()
            .map_err(|_| RigError::param_read(path, format!("'{}' is not an integer", token)))?;
    }

    let mut color = [0u8; 3];
    for (channel, &value) in color.iter_mut().zip(&values[..3]) {
        *channel = u8::try_from(value).map_err(|_| {
            RigError::param_read(path, format!("color channel {} is outside 0-255", value))
        })?;
    }

    ColorSpec::new(color, values[3], values[4], values[5])
}
