// crates/sg_io/src/segy/reader.rs

//! SEG-Y 读取
//!
//! [`SegyReader`] 负责文件布局（头、道长、道数），按道随机读取；
//! [`ProfileLoader`] 在其上加载完整的 [`SeismicProfile`]。

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::binary_header::{BinaryHeader, BINARY_HEADER_LEN};
use super::format::{Endianness, SampleFormat};
use super::profile::{SeismicProfile, CDP_X, CDP_Y};
use super::textual::{TextualHeader, TEXTUAL_HEADER_LEN};
use super::trace_header::{field_width, TraceHeader, COORDINATE_SCALAR_BYTE, TRACE_HEADER_LEN};
use crate::error::{IoError, IoResult};

/// 文件头总长（不含扩展文本头）
const FILE_HEADER_LEN: u64 = (TEXTUAL_HEADER_LEN + BINARY_HEADER_LEN) as u64;

/// SEG-Y 读取器
pub struct SegyReader {
    path: PathBuf,
    reader: BufReader<File>,
    textual: TextualHeader,
    binary: BinaryHeader,
    extended: Vec<Vec<u8>>,
    endian: Endianness,
    format: SampleFormat,
    n_samples: usize,
    data_start: u64,
    n_traces: usize,
}

impl SegyReader {
    /// 打开文件并解析文件头
    pub fn open(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let name = path.display().to_string();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len < FILE_HEADER_LEN {
            return Err(IoError::segy(
                &name,
                file_len,
                format!("文件长度 {file_len} 小于文件头长度 {FILE_HEADER_LEN}"),
            ));
        }
        let mut reader = BufReader::new(file);

        let mut text = vec![0u8; TEXTUAL_HEADER_LEN];
        reader.read_exact(&mut text)?;
        let textual = TextualHeader::from_bytes(&text);

        let mut bin = [0u8; BINARY_HEADER_LEN];
        reader.read_exact(&mut bin)?;
        let binary = BinaryHeader::from_bytes(bin);

        let endian = binary.detect_endianness();
        let format = SampleFormat::from_code(binary.format_code(endian))?;

        let n_ext = binary.extended_textual_headers(endian);
        let mut extended = Vec::with_capacity(n_ext);
        let ext_end = FILE_HEADER_LEN + (n_ext * TEXTUAL_HEADER_LEN) as u64;
        if ext_end > file_len {
            return Err(IoError::segy(
                &name,
                FILE_HEADER_LEN,
                format!("声明了 {n_ext} 个扩展文本头，但文件长度不足"),
            ));
        }
        for _ in 0..n_ext {
            let mut block = vec![0u8; TEXTUAL_HEADER_LEN];
            reader.read_exact(&mut block)?;
            extended.push(block);
        }
        let data_start = ext_end;

        let mut n_samples = usize::from(binary.samples_per_trace(endian));
        if n_samples == 0 && file_len >= data_start + TRACE_HEADER_LEN as u64 {
            // 二进制头未填写时取第一道道头
            let mut first = [0u8; TRACE_HEADER_LEN];
            reader.read_exact(&mut first)?;
            n_samples = usize::from(TraceHeader::from_bytes(first).sample_count(endian));
            reader.seek(SeekFrom::Start(data_start))?;
        }
        if n_samples == 0 {
            return Err(IoError::segy(&name, 3220, "每道采样点数为 0"));
        }

        let trace_len = (TRACE_HEADER_LEN + n_samples * format.bytes_per_sample()) as u64;
        let payload = file_len - data_start;
        let n_traces = (payload / trace_len) as usize;
        let remainder = payload % trace_len;
        if remainder != 0 {
            warn!(
                "{}: 数据区末尾有 {} 字节不足一道，已忽略",
                name, remainder
            );
        }

        info!(
            "打开 SEG-Y: {} ({} 道, {} 采样/道, 格式 {}, {} 字节序)",
            name, n_traces, n_samples, format, endian
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            textual,
            binary,
            extended,
            endian,
            format,
            n_samples,
            data_start,
            n_traces,
        })
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文本头
    pub fn textual(&self) -> &TextualHeader {
        &self.textual
    }

    /// 二进制头
    pub fn binary(&self) -> &BinaryHeader {
        &self.binary
    }

    /// 扩展文本头数量
    pub fn extended_count(&self) -> usize {
        self.extended.len()
    }

    /// 字节序
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// 采样格式
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// 每道采样点数
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// 道数
    pub fn n_traces(&self) -> usize {
        self.n_traces
    }

    fn trace_len(&self) -> u64 {
        (TRACE_HEADER_LEN + self.n_samples * self.format.bytes_per_sample()) as u64
    }

    fn trace_offset(&self, index: usize) -> IoResult<u64> {
        if index >= self.n_traces {
            return Err(IoError::Foundation(sg_foundation::SgError::index_out_of_bounds(
                "trace",
                index,
                self.n_traces,
            )));
        }
        Ok(self.data_start + index as u64 * self.trace_len())
    }

    /// 读取第 `index` 道道头
    pub fn read_trace_header(&mut self, index: usize) -> IoResult<TraceHeader> {
        let offset = self.trace_offset(index)?;
        self.reader.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; TRACE_HEADER_LEN];
        self.reader.read_exact(&mut buf)?;
        Ok(TraceHeader::from_bytes(buf))
    }

    /// 顺序读取前 `max` 道道头（`None` 读取全部）
    pub fn headers(&mut self, max: Option<usize>) -> IoResult<Vec<TraceHeader>> {
        let count = max.map_or(self.n_traces, |m| m.min(self.n_traces));
        let skip = (self.trace_len() - TRACE_HEADER_LEN as u64) as i64;
        let mut headers = Vec::with_capacity(count);
        if count == 0 {
            return Ok(headers);
        }
        self.reader.seek(SeekFrom::Start(self.data_start))?;
        let mut buf = [0u8; TRACE_HEADER_LEN];
        for _ in 0..count {
            self.reader.read_exact(&mut buf)?;
            headers.push(TraceHeader::from_bytes(buf));
            self.reader.seek_relative(skip)?;
        }
        debug!("读取 {} 道道头", headers.len());
        Ok(headers)
    }

    /// 读取第 `index` 道道头与采样
    pub fn read_trace(&mut self, index: usize) -> IoResult<(TraceHeader, Vec<f64>)> {
        let header = self.read_trace_header(index)?;
        let mut raw = vec![0u8; self.n_samples * self.format.bytes_per_sample()];
        self.reader.read_exact(&mut raw)?;
        let mut samples = Vec::with_capacity(self.n_samples);
        self.format.decode(self.endian, &raw, &mut samples);
        Ok((header, samples))
    }

    /// 读取全部道，组装剖面
    fn into_profile(mut self, cdp_byte: u16) -> IoResult<SeismicProfile> {
        let n = self.n_traces;
        let sample_bytes = self.n_samples * self.format.bytes_per_sample();
        let mut headers = Vec::with_capacity(n);
        let mut cdp = Vec::with_capacity(n);
        let mut data = Vec::with_capacity(n * self.n_samples);
        let mut raw = vec![0u8; sample_bytes];
        let mut hbuf = [0u8; TRACE_HEADER_LEN];
        let cdp_width = field_width(cdp_byte);

        self.reader.seek(SeekFrom::Start(self.data_start))?;
        for _ in 0..n {
            self.reader.read_exact(&mut hbuf)?;
            let header = TraceHeader::from_bytes(hbuf);
            cdp.push(header.get(self.endian, cdp_byte, cdp_width)?);
            headers.push(header);
            self.reader.read_exact(&mut raw)?;
            self.format.decode(self.endian, &raw, &mut data);
        }

        Ok(SeismicProfile::from_parts(
            self.textual,
            self.binary,
            self.extended,
            headers,
            self.endian,
            self.format,
            self.n_samples,
            cdp,
            data,
        ))
    }
}

/// 对道头值应用 SEG-Y 坐标比例因子（负值为除数）
pub fn unscale(value: i32, scalar: i16) -> f64 {
    let v = f64::from(value);
    match scalar {
        0 | 1 => v,
        s if s > 0 => v * f64::from(s),
        s => v / f64::from(s).abs(),
    }
}

/// 剖面加载配置
#[derive(Debug, Clone, Copy)]
pub struct ProfileLoader {
    cdp_byte: u16,
    coord_bytes: Option<(u16, u16)>,
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self {
            cdp_byte: 21,
            coord_bytes: None,
        }
    }
}

impl ProfileLoader {
    /// 默认配置：CDP 取自字节 21
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 CDP 所在字节
    pub fn with_cdp_byte(mut self, byte: u16) -> Self {
        self.cdp_byte = byte;
        self
    }

    /// 同时读取已有坐标（按字节 71 的比例因子还原）
    pub fn with_coordinates(mut self, x_byte: u16, y_byte: u16) -> Self {
        self.coord_bytes = Some((x_byte, y_byte));
        self
    }

    /// 加载剖面
    pub fn load(&self, path: impl AsRef<Path>) -> IoResult<SeismicProfile> {
        let reader = SegyReader::open(path.as_ref())?;
        let endian = reader.endian();
        let mut profile = reader.into_profile(self.cdp_byte)?;

        if let Some((xb, yb)) = self.coord_bytes {
            let (xw, yw) = (field_width(xb), field_width(yb));
            let mut xs = Vec::with_capacity(profile.n_traces());
            let mut ys = Vec::with_capacity(profile.n_traces());
            for h in &profile.trace_headers {
                let scalar = h.coordinate_scalar(endian);
                xs.push(unscale(h.get(endian, xb, xw)?, scalar));
                ys.push(unscale(h.get(endian, yb, yw)?, scalar));
            }
            profile.assign_xy(xs, ys)?;
            debug!("从字节 {}/{} 读取已有坐标 (比例因子字节 {})", xb, yb, COORDINATE_SCALAR_BYTE);
        }

        let dups = profile.duplicate_cdps();
        if !dups.is_empty() {
            warn!(
                "{} 个 CDP 编号重复出现 (字节 {})，例如 {:?}",
                dups.len(),
                self.cdp_byte,
                &dups[..dups.len().min(5)]
            );
        }
        info!(
            "加载剖面: {} 道 × {} 采样",
            profile.n_traces(),
            profile.n_samples()
        );
        Ok(profile)
    }
}
