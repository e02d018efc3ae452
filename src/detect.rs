//! 尺寸提取与格式识别

use crate::error::SchematicError;
use crate::tag::{array_len, as_integer, field, get_tag, unwrap_value, SchematicRoot};
use fastnbt::Value;
use tracing::debug;

const BLOCKS_KEYS: &[&str] = &["Blocks", "blocks"];
const PALETTE_KEYS: &[&str] = &["Palette", "palette"];
const BLOCK_DATA_KEYS: &[&str] = &["BlockData", "blockData"];
const BLOCK_STATES_KEYS: &[&str] = &["BlockStates", "blockStates"];
/// Sponge v3 的 `Blocks` 容器中索引数组名为 `Data`
const CONTAINER_DATA_KEYS: &[&str] = &["BlockData", "blockData", "Data"];

/// 单个网格允许的最大体素数，超出时拒绝分配
pub const MAX_VOLUME: usize = 1 << 30;

/// 区域尺寸，缺失或为假值时为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: i64,
    pub height: i64,
    pub length: i64,
}

impl Dimensions {
    pub fn new(width: i64, height: i64, length: i64) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// 三个维度是否都为正
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0 && self.length > 0
    }

    /// 体素总数，溢出或超过 [`MAX_VOLUME`] 时报错
    pub fn volume(&self) -> Result<usize, SchematicError> {
        let too_large = || SchematicError::VolumeTooLarge {
            width: self.width,
            height: self.height,
            length: self.length,
        };
        let axis = |v: i64| usize::try_from(v).map_err(|_| too_large());
        axis(self.width)?
            .checked_mul(axis(self.height)?)
            .and_then(|v| v.checked_mul(axis(self.length).ok()?))
            .filter(|v| *v <= MAX_VOLUME)
            .ok_or_else(too_large)
    }
}

/// 识别出的编码结构
#[derive(Debug, Clone, Copy)]
pub enum Format<'a> {
    /// 经典格式：每个体素一个字节 id
    Legacy { blocks: &'a Value },
    /// 调色板格式
    Palette(PaletteLayout<'a>),
}

/// 调色板格式下的相关字段
#[derive(Debug, Clone, Copy)]
pub struct PaletteLayout<'a> {
    pub palette: &'a Value,
    pub block_data: Option<&'a Value>,
    pub block_states: Option<&'a Value>,
}

/// 读取一个维度，后一个拼写只在前一个为假值时生效
fn dimension(root: &SchematicRoot, upper: &str, lower: &str) -> i64 {
    [(root.schematic, upper), (root.schematic, lower), (root.outer, upper)]
        .into_iter()
        .filter_map(|(node, name)| get_tag(node, name))
        .map(dimension_value)
        .find(|v| *v != 0)
        .unwrap_or(0)
}

/// Sponge 以无符号 short 存尺寸
fn dimension_value(node: &Value) -> i64 {
    match unwrap_value(node) {
        Value::Short(v) => i64::from(*v as u16),
        other => as_integer(other).unwrap_or(0),
    }
}

/// 提取 Width/Height/Length
pub fn extract_dimensions(root: &SchematicRoot) -> Dimensions {
    Dimensions::new(
        dimension(root, "Width", "width"),
        dimension(root, "Height", "height"),
        dimension(root, "Length", "length"),
    )
}

/// 按优先级识别格式：经典 Blocks 优先，其次调色板
pub fn classify<'a>(
    root: &SchematicRoot<'a>,
    dims: Dimensions,
) -> Result<Format<'a>, SchematicError> {
    if !dims.is_positive() {
        debug!(?dims, "尺寸无效");
        return Err(SchematicError::UnsupportedFormat);
    }

    let schematic = root.schematic;
    let blocks = field(schematic, BLOCKS_KEYS);

    if let Some(blocks) = blocks {
        if array_len(blocks).map_or(false, |len| len > 0) {
            debug!("识别为经典 Blocks 格式");
            return Ok(Format::Legacy { blocks });
        }
    }

    if let Some(layout) = palette_layout(schematic, BLOCK_DATA_KEYS) {
        debug!("识别为调色板格式");
        return Ok(Format::Palette(layout));
    }

    // Sponge v3: Palette 与 Data 嵌在 Blocks 容器里
    if let Some(container) = blocks.filter(|b| matches!(b, Value::Compound(_))) {
        if let Some(layout) = palette_layout(container, CONTAINER_DATA_KEYS) {
            debug!("识别为调色板格式 (Blocks 容器)");
            return Ok(Format::Palette(layout));
        }
    }

    Err(SchematicError::UnsupportedFormat)
}

fn palette_layout<'a>(node: &'a Value, data_keys: &[&str]) -> Option<PaletteLayout<'a>> {
    let palette = field(node, PALETTE_KEYS)?;
    let block_data = field(node, data_keys);
    let block_states = field(node, BLOCK_STATES_KEYS);
    if block_data.is_none() && block_states.is_none() {
        return None;
    }
    Some(PaletteLayout {
        palette,
        block_data,
        block_states,
    })
}
