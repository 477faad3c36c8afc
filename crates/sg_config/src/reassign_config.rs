// crates/sg_config/src/reassign_config.rs

//! ReassignConfig - 坐标重赋值作业配置
//!
//! 默认值即单条测线处理时的约定：`Profile_19.sgy` + `profiles.shp`，
//! 选取 `N_PROF == "PR_19"`，输出 `seismic_with_coords.sgy`。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sample_format::OutputSampleFormat;

/// 道头长度
const TRACE_HEADER_LEN: u16 = 240;

/// 坐标重赋值作业配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignConfig {
    /// 输入
    #[serde(default)]
    pub input: InputConfig,
    /// 测线选择
    #[serde(default)]
    pub profile: ProfileSelection,
    /// 输出
    #[serde(default)]
    pub output: OutputConfig,
    /// 道头扫描
    #[serde(default)]
    pub scan: ScanConfig,
}

/// 输入配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// SEG-Y 文件
    #[serde(default = "default_segy")]
    pub segy: PathBuf,
    /// 测线 Shapefile
    #[serde(default = "default_shapefile")]
    pub shapefile: PathBuf,
    /// CDP 编号所在字节
    #[serde(default = "default_cdp_byte")]
    pub cdp_byte: u16,
}

fn default_segy() -> PathBuf {
    PathBuf::from("Profile_19.sgy")
}
fn default_shapefile() -> PathBuf {
    PathBuf::from("profiles.shp")
}
fn default_cdp_byte() -> u16 {
    21
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            segy: default_segy(),
            shapefile: default_shapefile(),
            cdp_byte: default_cdp_byte(),
        }
    }
}

/// 测线选择：`field == value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSelection {
    /// 属性字段
    #[serde(default = "default_field")]
    pub field: String,
    /// 属性值
    #[serde(default = "default_value")]
    pub value: String,
}

fn default_field() -> String {
    "N_PROF".to_string()
}
fn default_value() -> String {
    "PR_19".to_string()
}

impl Default for ProfileSelection {
    fn default() -> Self {
        Self {
            field: default_field(),
            value: default_value(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出 SEG-Y
    #[serde(default = "default_output")]
    pub segy: PathBuf,
    /// 坐标数组名 → 道头字节号
    #[serde(default = "default_header_map")]
    pub trace_header_map: BTreeMap<String, u16>,
    /// 坐标比例因子，缺省时自动选择
    #[serde(default)]
    pub coord_scalar: Option<i16>,
    /// 输出采样格式
    #[serde(default)]
    pub sample_format: OutputSampleFormat,
    /// 在文本头 C39 行记录来源
    #[serde(default = "default_true")]
    pub stamp_textual_header: bool,
    /// CDP 位置 GeoJSON
    #[serde(default)]
    pub geojson: Option<PathBuf>,
    /// CDP 位置点 Shapefile
    #[serde(default)]
    pub cdp_shapefile: Option<PathBuf>,
    /// 运行报告 (JSON)
    #[serde(default)]
    pub report: Option<PathBuf>,
}

fn default_output() -> PathBuf {
    PathBuf::from("seismic_with_coords.sgy")
}
fn default_header_map() -> BTreeMap<String, u16> {
    [("cdp", 21u16), ("cdp_x", 73), ("cdp_y", 77)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            segy: default_output(),
            trace_header_map: default_header_map(),
            coord_scalar: None,
            sample_format: OutputSampleFormat::default(),
            stamp_textual_header: default_true(),
            geojson: None,
            cdp_shapefile: None,
            report: None,
        }
    }
}

/// 道头扫描配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 输入扫描道数
    #[serde(default = "default_max_traces")]
    pub max_traces: usize,
    /// 输出校验时扫描全部道
    #[serde(default = "default_true")]
    pub verify_all_traces: bool,
}

fn default_max_traces() -> usize {
    1000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_traces: default_max_traces(),
            verify_all_traces: default_true(),
        }
    }
}

impl Default for ReassignConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            profile: ProfileSelection::default(),
            output: OutputConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl ReassignConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        let config: ReassignConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.cdp_byte == 0 || self.input.cdp_byte > TRACE_HEADER_LEN - 3 {
            return Err(ConfigError::invalid(
                "input.cdp_byte",
                self.input.cdp_byte,
                "4 字节字段须在 1..=237",
            ));
        }

        if self.profile.field.trim().is_empty() {
            return Err(ConfigError::Missing("profile.field".to_string()));
        }
        if self.profile.value.trim().is_empty() {
            return Err(ConfigError::Missing("profile.value".to_string()));
        }

        let map = &self.output.trace_header_map;
        for key in ["cdp_x", "cdp_y"] {
            if !map.contains_key(key) {
                return Err(ConfigError::Missing(format!("output.trace_header_map.{key}")));
            }
        }
        for (name, &byte) in map {
            if byte == 0 || byte > TRACE_HEADER_LEN - 1 {
                return Err(ConfigError::invalid(
                    format!("output.trace_header_map.{name}"),
                    byte,
                    "字节号须在 1..=239",
                ));
            }
        }

        if self.output.coord_scalar == Some(0) {
            return Err(ConfigError::invalid(
                "output.coord_scalar",
                0,
                "比例因子不能为 0 (负值为除数)",
            ));
        }

        if self.output.segy == self.input.segy {
            return Err(ConfigError::invalid(
                "output.segy",
                self.output.segy.display(),
                "输出不能覆盖输入文件",
            ));
        }

        if self.scan.max_traces == 0 {
            return Err(ConfigError::invalid(
                "scan.max_traces",
                0,
                "扫描道数必须为正",
            ));
        }
        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReassignConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.input.segy, PathBuf::from("Profile_19.sgy"));
        assert_eq!(config.input.shapefile, PathBuf::from("profiles.shp"));
        assert_eq!(config.input.cdp_byte, 21);
        assert_eq!(config.profile.field, "N_PROF");
        assert_eq!(config.profile.value, "PR_19");
        assert_eq!(config.output.segy, PathBuf::from("seismic_with_coords.sgy"));
        assert_eq!(config.output.trace_header_map["cdp"], 21);
        assert_eq!(config.output.trace_header_map["cdp_x"], 73);
        assert_eq!(config.output.trace_header_map["cdp_y"], 77);
        assert_eq!(config.scan.max_traces, 1000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "profile": { "value": "PR_07" }, "output": { "coord_scalar": -10 } }"#;
        let config: ReassignConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.profile.field, "N_PROF");
        assert_eq!(config.profile.value, "PR_07");
        assert_eq!(config.output.coord_scalar, Some(-10));
        assert_eq!(config.output.trace_header_map.len(), 3);
        assert!(config.output.stamp_textual_header);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_byte_map() {
        let mut config = ReassignConfig::default();
        config.output.trace_header_map.insert("cdp_x".into(), 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = ReassignConfig::default();
        config.output.trace_header_map.remove("cdp_y");
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ReassignConfig::default();
        config.output.coord_scalar = Some(0);
        assert!(config.validate().is_err());

        let mut config = ReassignConfig::default();
        config.output.segy = config.input.segy.clone();
        assert!(config.validate().is_err());

        let mut config = ReassignConfig::default();
        config.profile.value = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        let mut config = ReassignConfig::default();
        config.output.sample_format = OutputSampleFormat::Ibm;
        config.output.geojson = Some(PathBuf::from("cdp.geojson"));
        config.save_to_file(&path).unwrap();

        let loaded = ReassignConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ReassignConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
