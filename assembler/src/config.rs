use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use core_types::Packing;

/// GLSL float/int precision qualifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Lowp,
    Mediump,
    #[default]
    Highp,
}

impl Precision {
    pub fn qualifier(self) -> &'static str {
        match self {
            Precision::Lowp => "lowp",
            Precision::Mediump => "mediump",
            Precision::Highp => "highp",
        }
    }
}

/// Settings shared by every kernel an assembler produces
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Emitted verbatim after `#version`
    pub glsl_version: String,
    pub precision: Precision,
    pub packing: Packing,
    /// Largest texture edge the target device accepts
    pub max_texture_size: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            glsl_version: "300 es".to_string(),
            precision: Precision::Highp,
            packing: Packing::Plain,
            max_texture_size: 4096,
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse compiler config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("invalid config in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = CompilerConfig::from_yaml_str("packing: channel_major\n").unwrap();
        assert_eq!(cfg.packing, Packing::ChannelMajor);
        assert_eq!(cfg.glsl_version, "300 es");
        assert_eq!(cfg.precision, Precision::Highp);
        assert_eq!(cfg.max_texture_size, 4096);
    }

    #[test]
    fn full_config_parses() {
        let yaml = "glsl_version: \"310 es\"\nprecision: mediump\npacking: plain\nmax_texture_size: 8192\n";
        let cfg = CompilerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            cfg,
            CompilerConfig {
                glsl_version: "310 es".into(),
                precision: Precision::Mediump,
                packing: Packing::Plain,
                max_texture_size: 8192,
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CompilerConfig::from_yaml_str("packign: plain\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CompilerConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
    }
}
