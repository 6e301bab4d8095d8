//! TOML file source.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add the TOML file at `path`. A missing file is skipped.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        File::from(path.to_path_buf())
            .format(FileFormat::Toml)
            .required(false),
    ))
}
