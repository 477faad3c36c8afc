// crates/sg_io/src/shapefile/feature.rs

//! 要素集合：几何与属性按记录对齐

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sg_geo::{BoundingBox, Polyline};
use tracing::{info, warn};

use super::dbf::{read_dbf, DbfRecord, FieldDescriptor, FieldValue};
use super::shp::{read_shp, Shape, ShapeType};
use crate::error::{IoError, IoResult};

/// 单个要素
#[derive(Debug, Clone)]
pub struct Feature {
    /// 在文件中的序号（从 0 开始，含已删除记录）
    pub index: usize,
    /// 几何
    pub shape: Shape,
    /// 属性
    pub attributes: BTreeMap<String, FieldValue>,
}

impl Feature {
    /// 取属性值
    pub fn attribute(&self, field: &str) -> Option<&FieldValue> {
        self.attributes.get(field)
    }

    /// 转为折线；非线几何报错
    pub fn polyline(&self) -> IoResult<Polyline> {
        match &self.shape {
            Shape::PolyLine(parts) => Ok(Polyline::from_parts(parts.clone())?),
            other => Err(IoError::NotALine {
                index: self.index,
                shape_type: other.kind().to_string(),
            }),
        }
    }
}

/// 要素集合
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    /// .shp 路径
    pub path: PathBuf,
    /// 文件几何类型
    pub shape_type: ShapeType,
    /// 文件范围
    pub bbox: BoundingBox,
    /// 属性字段
    pub fields: Vec<FieldDescriptor>,
    /// 有效要素（已跳过删除记录）
    pub features: Vec<Feature>,
}

/// 查找同名的 .dbf（兼容大写扩展名）
fn sibling_dbf(shp: &Path) -> Option<PathBuf> {
    ["dbf", "DBF"]
        .iter()
        .map(|ext| shp.with_extension(ext))
        .find(|p| p.exists())
}

impl FeatureCollection {
    /// 读取 .shp 及同名 .dbf
    pub fn read(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let shp = read_shp(path)?;

        type Attributes = (Vec<FieldDescriptor>, Vec<Option<DbfRecord>>);
        let (fields, dbf_records): Attributes = match sibling_dbf(path) {
            Some(dbf_path) => {
                let table = read_dbf(&dbf_path)?;
                if table.records.len() != shp.records.len() {
                    return Err(IoError::dbf(
                        dbf_path.display().to_string(),
                        format!(
                            "记录数 {} 与 .shp 记录数 {} 不一致",
                            table.records.len(),
                            shp.records.len()
                        ),
                    ));
                }
                (table.fields, table.records.into_iter().map(Some).collect())
            }
            None => {
                warn!("{}: 缺少 .dbf 属性表，要素没有属性", path.display());
                (Vec::new(), vec![None; shp.records.len()])
            }
        };

        let mut features = Vec::with_capacity(shp.records.len());
        let shape_type = shp.shape_type;
        let records = shp.records.into_iter().zip(dbf_records);
        for (index, ((_, shape), record)) in records.enumerate() {
            let attributes = match record {
                Some(r) if r.deleted => continue,
                Some(r) => r.values,
                None => BTreeMap::new(),
            };
            features.push(Feature {
                index,
                shape,
                attributes,
            });
        }

        info!(
            "读取 Shapefile: {} ({} 个要素, 类型 {}, {} 个字段)",
            path.display(),
            features.len(),
            shape_type,
            fields.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            shape_type,
            bbox: shp.bbox,
            fields,
            features,
        })
    }

    /// 要素数
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// 字段名
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn check_field(&self, field: &str) -> IoResult<()> {
        if self.fields.iter().any(|f| f.name == field) {
            Ok(())
        } else {
            Err(IoError::FieldNotFound {
                field: field.to_string(),
                available: self.field_names(),
            })
        }
    }

    /// 所有 `field == value` 的要素
    pub fn select_all(&self, field: &str, value: &str) -> IoResult<Vec<&Feature>> {
        self.check_field(field)?;
        Ok(self
            .features
            .iter()
            .filter(|f| f.attribute(field).is_some_and(|v| v.matches(value)))
            .collect())
    }

    /// 选取第一个 `field == value` 的要素
    ///
    /// 没有匹配时报错；多个匹配时取第一个并告警。
    pub fn select(&self, field: &str, value: &str) -> IoResult<&Feature> {
        let matches = self.select_all(field, value)?;
        match matches.as_slice() {
            [] => Err(IoError::FeatureNotFound {
                field: field.to_string(),
                value: value.to_string(),
            }),
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    warn!(
                        "{} == \"{}\" 匹配 {} 个要素，使用第一个 (序号 {})",
                        field,
                        value,
                        matches.len(),
                        first.index
                    );
                }
                Ok(*first)
            }
        }
    }

    /// 选取要素并转为折线
    pub fn select_polyline(&self, field: &str, value: &str) -> IoResult<Polyline> {
        self.select(field, value)?.polyline()
    }

    /// 某字段的所有取值（按要素顺序）
    pub fn values(&self, field: &str) -> IoResult<Vec<&FieldValue>> {
        self.check_field(field)?;
        Ok(self
            .features
            .iter()
            .filter_map(|f| f.attribute(field))
            .collect())
    }
}
