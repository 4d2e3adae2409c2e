//! Configuration system

pub use serde::{Serialize, Deserialize};

use crate::physics::{SlideConfig, WorldConfig};
use crate::spatial::OctreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Format follows the extension
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            Self::from_ron_str(&contents)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse TOML text
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse RON text
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Every tunable of the crate, loadable as one file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Broad-phase tree settings
    pub octree: OctreeConfig,
    /// Integrator settings
    pub world: WorldConfig,
    /// Collide-and-slide settings
    pub slide: SlideConfig,
}

impl PhysicsConfig {
    /// Reject values the octree, integrator or slide loop cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| {
            log::error!("Invalid configuration {}: {}", field, reason);
            Err(ConfigError::Invalid { field, reason })
        };

        let min_node_size = self.octree.min_node_size;
        if !min_node_size.is_finite() || min_node_size <= 0.0 {
            return invalid("octree.min_node_size", format!("{min_node_size} must be positive"));
        }

        let gravity = self.world.gravity;
        if gravity.iter().any(|component| !component.is_finite()) {
            return invalid("world.gravity", format!("{gravity:?} must be finite"));
        }
        let stiffness = self.world.soft_stiffness;
        if !(stiffness > 0.0 && stiffness <= 1.0) {
            return invalid("world.soft_stiffness", format!("{stiffness} must lie in (0, 1]"));
        }
        let sleep_speed = self.world.sleep_speed;
        if !sleep_speed.is_finite() || sleep_speed < 0.0 {
            return invalid("world.sleep_speed", format!("{sleep_speed} must be non-negative"));
        }

        let epsilon = self.slide.slide_epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return invalid("slide.slide_epsilon", format!("{epsilon} must be positive"));
        }
        if self.slide.max_slide_iterations == 0 {
            return invalid("slide.max_slide_iterations", "must be at least 1".to_string());
        }

        Ok(())
    }

    /// Load from a `.toml` or `.ron` file and validate
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        log::info!("Loaded physics configuration from {}", path);
        Ok(config)
    }
}

impl Config for PhysicsConfig {}
