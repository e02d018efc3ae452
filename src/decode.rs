//! 体素 id 解码
//!
//! 三种来源布局：经典字节数组、逐体素整数索引、按位打包在 64 位字里的
//! 调色板索引。输出都是按 `x + z*width + y*width*length` 排列的扁平数组。

use crate::detect::PaletteLayout;
use crate::error::BitUnpackError;
use crate::tag::{array_len, as_integer, unwrap_value};
use fastnbt::Value;
use serde::Serialize;
use tracing::{debug, warn};

/// 实际产生 id 的解码路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// 经典字节 id
    LegacyBytes,
    /// 每个体素一个调色板索引
    PaletteIndices,
    /// Sponge v2 的 varint 索引
    VarIntIndices,
    /// 打包在 64 位字中的调色板索引
    PackedStates,
    /// 有调色板但索引无法解读，全部为 0
    Unresolved,
}

/// 读取数组第 `index` 个元素的整数值
fn element(node: &Value, index: usize) -> Option<i64> {
    match node {
        Value::ByteArray(arr) => arr.get(index).map(|v| i64::from(*v)),
        Value::IntArray(arr) => arr.get(index).map(|v| i64::from(*v)),
        Value::LongArray(arr) => arr.get(index).copied(),
        Value::List(items) => items.get(index).and_then(as_integer),
        _ => None,
    }
}

/// 经典格式：字节 id 零扩展到 u32
///
/// 源数组短于体积时补零，长于体积时截断。
pub fn decode_legacy(blocks: &Value, volume: usize) -> Vec<u32> {
    let blocks = unwrap_value(blocks);
    let len = array_len(blocks).unwrap_or(0);
    if len != volume {
        warn!(len, volume, "Blocks 长度与尺寸不符，按体积截断或补零");
    }
    (0..volume)
        .map(|i| element(blocks, i).map_or(0, |v| u32::from(v as u8)))
        .collect()
}

/// 调色板格式：索引数组长度恰好等于体积时逐个照搬
pub fn copy_indices(data: &Value, volume: usize) -> Option<Vec<u32>> {
    let data = unwrap_value(data);
    if array_len(data)? != volume {
        return None;
    }
    let blocks = match data {
        Value::ByteArray(arr) => arr.iter().map(|v| u32::from(*v as u8)).collect(),
        Value::IntArray(arr) => arr.iter().map(|v| *v as u32).collect(),
        Value::LongArray(arr) => arr.iter().map(|v| *v as u32).collect(),
        Value::List(items) => items
            .iter()
            .map(|item| as_integer(item).map_or(0, |v| v as u32))
            .collect(),
        _ => return None,
    };
    Some(blocks)
}

/// 按 LEB128 varint 解码索引，结果个数必须恰好等于体积
pub fn decode_varints(data: &Value, volume: usize) -> Option<Vec<u32>> {
    let Value::ByteArray(bytes) = unwrap_value(data) else {
        return None;
    };
    let mut out = Vec::with_capacity(volume);
    let mut value = 0u32;
    let mut shift = 0u32;
    for byte in bytes.iter().map(|b| *b as u8) {
        if shift >= 32 {
            return None;
        }
        value |= u32::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            out.push(value);
            value = 0;
            shift = 0;
        } else {
            shift += 7;
        }
    }
    (shift == 0 && out.len() == volume).then_some(out)
}

/// 表示 `palette_size` 个索引所需的最少位数，至少 1 位
pub fn bit_width(palette_size: usize) -> u32 {
    let size = palette_size.max(1);
    (usize::BITS - (size - 1).leading_zeros()).max(1)
}

/// 打包字的几种存储形状
enum Words<'a> {
    Longs(&'a [i64]),
    Ints(&'a [i32]),
    Bytes(&'a [i8]),
    Nodes(&'a [Value]),
}

impl<'a> Words<'a> {
    fn new(node: &'a Value) -> Result<Self, BitUnpackError> {
        match unwrap_value(node) {
            Value::LongArray(arr) => Ok(Words::Longs(&arr[..])),
            Value::IntArray(arr) => Ok(Words::Ints(&arr[..])),
            Value::ByteArray(arr) => Ok(Words::Bytes(&arr[..])),
            Value::List(items) => Ok(Words::Nodes(items)),
            _ => Err(BitUnpackError::NotAnArray),
        }
    }

    fn len(&self) -> usize {
        match self {
            Words::Longs(w) => w.len(),
            Words::Ints(w) => w.len(),
            Words::Bytes(w) => w.len(),
            Words::Nodes(w) => w.len(),
        }
    }

    fn get(&self, index: usize) -> Result<u64, BitUnpackError> {
        let word = match self {
            Words::Longs(w) => Some(w[index]),
            Words::Ints(w) => Some(i64::from(w[index])),
            Words::Bytes(w) => Some(i64::from(w[index])),
            Words::Nodes(w) => node_word(&w[index]),
        };
        word.map(|w| w as u64)
            .ok_or(BitUnpackError::NonNumericWord { index })
    }
}

/// 单个字节点：数值、信封、数字字符串，或 `[高 32 位, 低 32 位]` 整数对
fn node_word(node: &Value) -> Option<i64> {
    match unwrap_value(node) {
        Value::List(pair) => match pair.as_slice() {
            [hi, lo] => {
                let hi = as_integer(hi)?;
                let lo = as_integer(lo)?;
                Some((hi << 32) | (lo & 0xffff_ffff))
            }
            _ => None,
        },
        other => as_integer(other),
    }
}

/// 从打包的 64 位字中解出调色板索引
///
/// 每个字从第 0 位开始取 `bit_width` 位一组，组不跨字；位宽不整除 64 时
/// 最后一组只含剩余的高位。数据不足时其余位置补 0。
pub fn unpack_block_states(
    states: &Value,
    palette_size: usize,
    volume: usize,
) -> Result<Vec<u32>, BitUnpackError> {
    let bits = bit_width(palette_size);
    if bits > u32::BITS {
        return Err(BitUnpackError::BitWidth(bits));
    }
    let mask = (1u64 << bits) - 1;
    let words = Words::new(states)?;

    let mut out = Vec::with_capacity(volume);
    for index in 0..words.len() {
        if out.len() >= volume {
            break;
        }
        let word = words.get(index)?;
        let mut shift = 0;
        while shift < u64::BITS && out.len() < volume {
            out.push(((word >> shift) & mask) as u32);
            shift += bits;
        }
    }
    out.resize(volume, 0);
    Ok(out)
}

/// 调色板格式的索引解码：直接索引 -> 打包字 -> varint -> 全零
pub fn decode_palette_indices(
    layout: &PaletteLayout,
    palette_size: usize,
    volume: usize,
) -> (Vec<u32>, Encoding) {
    if let Some(blocks) = layout.block_data.and_then(|data| copy_indices(data, volume)) {
        return (blocks, Encoding::PaletteIndices);
    }

    if let Some(states) = layout.block_states {
        return match unpack_block_states(states, palette_size, volume) {
            Ok(blocks) => (blocks, Encoding::PackedStates),
            Err(e) => {
                warn!("BlockStates 解码失败，以空气填充: {}", e);
                (vec![0; volume], Encoding::Unresolved)
            }
        };
    }

    if let Some(blocks) = layout.block_data.and_then(|data| decode_varints(data, volume)) {
        debug!("BlockData 按 varint 解码");
        return (blocks, Encoding::VarIntIndices);
    }

    warn!("BlockData 长度与体积不符，以空气填充");
    (vec![0; volume], Encoding::Unresolved)
}
