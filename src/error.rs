//! 解码错误类型

use thiserror::Error;

/// Schematic 解码失败，调用方直接向用户展示其消息
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchematicError {
    #[error("未知或不支持的 Schematic 格式（未找到 Blocks/Palette 结构）")]
    UnsupportedFormat,

    #[error("体积过大: {width}x{height}x{length}")]
    VolumeTooLarge { width: i64, height: i64, length: i64 },
}

/// 位解包失败，只在解码器内部使用，外部只看到全零网格
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitUnpackError {
    #[error("BlockStates 不是数组")]
    NotAnArray,

    #[error("第 {index} 个字不是数值")]
    NonNumericWord { index: usize },

    #[error("位宽 {0} 超出方块 id 范围")]
    BitWidth(u32),
}
