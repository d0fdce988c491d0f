//! 命令行配置

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use drawkit_geometry::config::SamplingConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub sampling: SamplingConfig,
    /// 块参照绘制结果是否写入渲染缓存
    pub use_block_cache: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            use_block_cache: true,
        }
    }
}

impl CliConfig {
    /// 读取配置文件，未指定时使用默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_uses_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert!(config.use_block_cache);
        assert_eq!(config.sampling.arc_segments, 100);
    }

    #[test]
    fn test_partial_config() {
        let config: CliConfig =
            serde_json::from_str(r#"{ "sampling": { "spline_samples": 32 } }"#).unwrap();
        assert!(config.use_block_cache);
        assert_eq!(config.sampling.spline_samples, 32);
        assert_eq!(config.sampling.arc_segments, 100);
    }
}
