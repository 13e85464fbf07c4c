use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid worldgen config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("worldgen references unknown voxel `{0}`")]
    UnknownVoxel(String),
}
