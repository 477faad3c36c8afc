// crates/sg_io/src/exporters/shapefile.rs

//! Shapefile 导出器
//!
//! 写出 `.shp` / `.shx` / `.dbf` 三件套，支持点与折线。
//! 用于导出 CDP 位置，也用于构造测线文件。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use chrono::{Datelike, Local};
use sg_geo::{BoundingBox, Point2D};
use tracing::info;

use crate::error::{IoError, IoResult};
use crate::shapefile::dbf::{FieldDescriptor, FieldType, FieldValue};
use crate::shapefile::shp::{ShapeType, FILE_CODE, HEADER_LEN, VERSION};

/// 待写出的几何
#[derive(Debug, Clone, PartialEq)]
pub enum ExportShape {
    /// 点
    Point(Point2D),
    /// 折线（可多段）
    PolyLine(Vec<Vec<Point2D>>),
}

impl ExportShape {
    fn shape_type(&self) -> ShapeType {
        match self {
            Self::Point(_) => ShapeType::Point,
            Self::PolyLine(_) => ShapeType::PolyLine,
        }
    }

    fn points(&self) -> Box<dyn Iterator<Item = &Point2D> + '_> {
        match self {
            Self::Point(p) => Box::new(std::iter::once(p)),
            Self::PolyLine(parts) => Box::new(parts.iter().flatten()),
        }
    }

    /// 记录内容（小端）
    fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(self.shape_type().code())?;
        match self {
            Self::Point(p) => {
                buf.write_f64::<LittleEndian>(p.x)?;
                buf.write_f64::<LittleEndian>(p.y)?;
            }
            Self::PolyLine(parts) => {
                let bbox = BoundingBox::from_points(self.points())
                    .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));
                write_bbox(&mut buf, &bbox)?;
                let n_points: usize = parts.iter().map(Vec::len).sum();
                buf.write_i32::<LittleEndian>(parts.len() as i32)?;
                buf.write_i32::<LittleEndian>(n_points as i32)?;
                let mut start = 0i32;
                for part in parts {
                    buf.write_i32::<LittleEndian>(start)?;
                    start += part.len() as i32;
                }
                for p in parts.iter().flatten() {
                    buf.write_f64::<LittleEndian>(p.x)?;
                    buf.write_f64::<LittleEndian>(p.y)?;
                }
            }
        }
        Ok(buf)
    }
}

fn write_bbox(buf: &mut Vec<u8>, bbox: &BoundingBox) -> std::io::Result<()> {
    buf.write_f64::<LittleEndian>(bbox.min_x)?;
    buf.write_f64::<LittleEndian>(bbox.min_y)?;
    buf.write_f64::<LittleEndian>(bbox.max_x)?;
    buf.write_f64::<LittleEndian>(bbox.max_y)
}

/// Shapefile 导出器
#[derive(Debug, Clone)]
pub struct ShapefileWriter {
    shape_type: ShapeType,
    fields: Vec<FieldDescriptor>,
    records: Vec<(ExportShape, Vec<FieldValue>)>,
}

impl ShapefileWriter {
    /// 新建导出器，`shape_type` 须为 Point 或 PolyLine
    pub fn new(shape_type: ShapeType, fields: Vec<FieldDescriptor>) -> IoResult<Self> {
        if !matches!(shape_type, ShapeType::Point | ShapeType::PolyLine) {
            return Err(IoError::Export(format!("不支持导出几何类型 {shape_type}")));
        }
        Ok(Self {
            shape_type,
            fields,
            records: Vec::new(),
        })
    }

    /// 添加一条记录，属性按字段顺序给出
    pub fn add(&mut self, shape: ExportShape, values: Vec<FieldValue>) -> IoResult<()> {
        if shape.shape_type() != self.shape_type {
            return Err(IoError::Export(format!(
                "几何类型 {} 与文件类型 {} 不一致",
                shape.shape_type(),
                self.shape_type
            )));
        }
        if values.len() != self.fields.len() {
            return Err(IoError::Export(format!(
                "属性个数 {} 与字段数 {} 不一致",
                values.len(),
                self.fields.len()
            )));
        }
        self.records.push((shape, values));
        Ok(())
    }

    /// 记录数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 写出 `.shp` / `.shx` / `.dbf`（扩展名由 `path` 替换）
    pub fn write(&self, path: impl AsRef<Path>) -> IoResult<()> {
        let path = path.as_ref();
        let bbox = BoundingBox::from_points(self.records.iter().flat_map(|(s, _)| s.points()))
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));

        let contents = self
            .records
            .iter()
            .map(|(s, _)| s.encode())
            .collect::<std::io::Result<Vec<_>>>()?;

        let shp_len = HEADER_LEN + contents.iter().map(|c| 8 + c.len()).sum::<usize>();
        let shx_len = HEADER_LEN + 8 * contents.len();

        let mut shp = BufWriter::new(File::create(path.with_extension("shp"))?);
        let mut shx = BufWriter::new(File::create(path.with_extension("shx"))?);
        shp.write_all(&self.file_header(shp_len, &bbox)?)?;
        shx.write_all(&self.file_header(shx_len, &bbox)?)?;

        let mut offset = HEADER_LEN;
        for (i, content) in contents.iter().enumerate() {
            let words = (content.len() / 2) as i32;
            shp.write_i32::<BigEndian>(i as i32 + 1)?;
            shp.write_i32::<BigEndian>(words)?;
            shp.write_all(content)?;
            shx.write_i32::<BigEndian>((offset / 2) as i32)?;
            shx.write_i32::<BigEndian>(words)?;
            offset += 8 + content.len();
        }
        shp.flush()?;
        shx.flush()?;

        self.write_dbf(&path.with_extension("dbf"))?;
        info!(
            "导出 Shapefile: {} ({} 条记录, 类型 {})",
            path.with_extension("shp").display(),
            self.records.len(),
            self.shape_type
        );
        Ok(())
    }

    fn file_header(&self, total_len: usize, bbox: &BoundingBox) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        buf.write_i32::<BigEndian>(FILE_CODE)?;
        buf.extend_from_slice(&[0u8; 20]);
        buf.write_i32::<BigEndian>((total_len / 2) as i32)?;
        buf.write_i32::<LittleEndian>(VERSION)?;
        buf.write_i32::<LittleEndian>(self.shape_type.code())?;
        write_bbox(&mut buf, bbox)?;
        // Z 与 M 范围
        buf.extend_from_slice(&[0u8; 32]);
        Ok(buf)
    }

    fn write_dbf(&self, path: &Path) -> IoResult<()> {
        let header_len = 32 + 32 * self.fields.len() + 1;
        let record_len = 1 + self
            .fields
            .iter()
            .map(|f| usize::from(f.length))
            .sum::<usize>();
        let mut w = BufWriter::new(File::create(path)?);

        let today = Local::now().date_naive();
        w.write_u8(0x03)?;
        w.write_u8((today.year() - 1900).clamp(0, 255) as u8)?;
        w.write_u8(today.month() as u8)?;
        w.write_u8(today.day() as u8)?;
        w.write_u32::<LittleEndian>(self.records.len() as u32)?;
        w.write_u16::<LittleEndian>(header_len as u16)?;
        w.write_u16::<LittleEndian>(record_len as u16)?;
        w.write_all(&[0u8; 20])?;

        for f in &self.fields {
            let mut d = [0u8; 32];
            let name = f.name.as_bytes();
            let n = name.len().min(10);
            d[..n].copy_from_slice(&name[..n]);
            d[11] = f.field_type.to_byte();
            d[16] = f.length;
            d[17] = f.decimals;
            w.write_all(&d)?;
        }
        w.write_u8(0x0D)?;

        for (_, values) in &self.records {
            w.write_u8(b' ')?;
            for (f, v) in self.fields.iter().zip(values) {
                w.write_all(&format_cell(f, v)?)?;
            }
        }
        w.write_u8(0x1A)?;
        w.flush()?;
        Ok(())
    }
}

/// 按字段宽度格式化一个单元格
fn format_cell(field: &FieldDescriptor, value: &FieldValue) -> IoResult<Vec<u8>> {
    let width = usize::from(field.length);
    let text = match (field.field_type, value) {
        (_, FieldValue::Null) => String::new(),
        (FieldType::Numeric | FieldType::Float, FieldValue::Number(n)) => {
            format!("{:>width$.prec$}", n, width = width, prec = usize::from(field.decimals))
        }
        (FieldType::Logical, FieldValue::Logical(b)) => String::from(if *b { "T" } else { "F" }),
        (FieldType::Date, FieldValue::Date(d)) => d.format("%Y%m%d").to_string(),
        (_, v) => v.to_string(),
    };
    let bytes = text.into_bytes();
    if bytes.len() > width {
        return Err(IoError::Export(format!(
            "字段 {} 的值 \"{}\" 超过宽度 {width}",
            field.name, value
        )));
    }
    let mut cell = vec![b' '; width];
    match field.field_type {
        FieldType::Numeric | FieldType::Float => cell[width - bytes.len()..].copy_from_slice(&bytes),
        _ => cell[..bytes.len()].copy_from_slice(&bytes),
    }
    Ok(cell)
}
