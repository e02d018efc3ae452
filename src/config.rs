//! 配置文件加载与管理

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 主配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 渲染配置
    pub render: RenderConfig,
    /// 目录扫描配置
    pub scan: ScanConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 是否绘制空气方块
    pub show_air: bool,
    /// 层切片中每个方块的像素边长
    pub cell_size: u32,
    /// 自定义颜色规则，优先于内置规则
    pub colors: Vec<ColorRule>,
}

/// 方块名包含 `pattern`（不区分大小写）时使用 `color`（`#rrggbb`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRule {
    pub pattern: String,
    pub color: String,
}

/// 目录扫描配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 识别为 Schematic 的扩展名
    pub extensions: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 未设置 RUST_LOG 时使用的过滤级别
    pub level: String,
}

// ============== 默认值 ==============

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_air: false,
            cell_size: 8,
            colors: Vec::new(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["schem", "schematic", "nbt", "json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ============== 配置加载 ==============

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("schemgrid").join("config.toml"))
    }

    /// 按优先级加载配置：
    /// 1. 当前目录的 schemgrid.toml
    /// 2. 用户配置目录的 config.toml
    /// 3. 默认配置
    ///
    /// 此时日志尚未初始化，提示直接写到 stderr。
    pub fn load() -> Self {
        let local_config = PathBuf::from("schemgrid.toml");
        let candidates: Vec<PathBuf> = std::iter::once(local_config)
            .chain(Self::default_config_path())
            .collect();
        Self::load_first(&candidates)
    }

    /// 依次尝试候选文件，使用第一个能解析的；无法解析的给出警告后跳过
    pub fn load_first(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(config) => {
                    eprintln!("已加载配置: {}", path.display());
                    return config;
                }
                Err(e) => eprintln!("警告: 无法加载配置 {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    /// 扩展名是否属于 Schematic 文件（不区分大小写）
    pub fn is_schematic_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                self.scan
                    .extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r##"
            [render]
            show_air = true

            [[render.colors]]
            pattern = "concrete"
            color = "#112233"
            "##,
        )
        .unwrap();
        assert!(config.render.show_air);
        assert_eq!(config.render.cell_size, 8);
        assert_eq!(config.render.colors.len(), 1);
        assert_eq!(config.scan, ScanConfig::default());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn broken_candidate_is_skipped() {
        let dir = std::env::temp_dir().join(format!("schemgrid_config_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.toml");
        let valid = dir.join("valid.toml");
        fs::write(&broken, "[render\nshow_air = ").unwrap();
        fs::write(&valid, "[render]\ncell_size = 3\n").unwrap();

        let config = Config::load_first(&[dir.join("missing.toml"), broken.clone(), valid]);
        assert_eq!(config.render.cell_size, 3);

        assert_eq!(Config::load_first(&[broken]), Config::default());
    }

    #[test]
    fn extension_matching() {
        let config = Config::default();
        assert!(config.is_schematic_file(Path::new("house.SCHEM")));
        assert!(config.is_schematic_file(Path::new("dir/tower.nbt")));
        assert!(!config.is_schematic_file(Path::new("model.obj")));
        assert!(!config.is_schematic_file(Path::new("README")));
    }
}
