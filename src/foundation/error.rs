use crate::foundation::path::ConfigPath;

/// Result alias used across the crate.
pub type FxResult<T> = Result<T, FxError>;

/// Every failure the runtime, evaluator or GPU pipeline can report.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// Malformed config node or a value failing its type's validator.
    #[error("configuration error at {path}: {message}")]
    Configuration {
        /// Location of the offending node, relative to the evaluation root.
        path: ConfigPath,
        /// Human readable reason.
        message: String,
    },

    /// A graph config references a module type the registry does not know.
    #[error("graph definition error: {0}")]
    GraphDefinition(String),

    /// Shader compile/link failure, incomplete framebuffer, bad texture upload.
    #[error("gpu resource error: {0}")]
    GpuResource(String),

    /// A module instance failed inside `update`.
    #[error("module error: {0}")]
    Module(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Configuration`] value.
    pub fn configuration(path: &ConfigPath, msg: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.clone(),
            message: msg.into(),
        }
    }

    /// Build a [`FxError::GraphDefinition`] value.
    pub fn graph_definition(msg: impl Into<String>) -> Self {
        Self::GraphDefinition(msg.into())
    }

    /// Build a [`FxError::GpuResource`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::GpuResource(msg.into())
    }

    /// Build a [`FxError::Module`] value.
    pub fn module(msg: impl Into<String>) -> Self {
        Self::Module(msg.into())
    }

    /// Build a [`FxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<serde_json::Error> for FxError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
