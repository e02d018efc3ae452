//! Schematic 解码流程：定位根 -> 识别格式 -> 解码 id 与调色板 -> 组装网格

use crate::decode::{decode_legacy, decode_palette_indices, Encoding};
use crate::detect::{classify, extract_dimensions, Format};
use crate::error::SchematicError;
use crate::grid::VoxelGrid;
use crate::palette::{build_palette, Palette};
use crate::source::read_tree;
use crate::tag::resolve_root;
use anyhow::{Context, Result};
use fastnbt::Value;
use std::path::Path;
use tracing::debug;

/// 把已解析的标签树解码为体素网格
pub fn decode(tree: &Value) -> Result<VoxelGrid, SchematicError> {
    let root = resolve_root(tree);
    let dims = extract_dimensions(&root);
    let format = classify(&root, dims)?;
    let volume = dims.volume()?;

    let (blocks, palette, encoding) = match format {
        Format::Legacy { blocks } => (
            decode_legacy(blocks, volume),
            Palette::default(),
            Encoding::LegacyBytes,
        ),
        Format::Palette(layout) => {
            let palette = build_palette(layout.palette);
            let (blocks, encoding) = decode_palette_indices(&layout, palette.len(), volume);
            (blocks, palette, encoding)
        }
    };

    debug!(?dims, ?encoding, palette = palette.len(), "解码完成");

    // volume 已校验过，三个维度都能放进 usize
    Ok(VoxelGrid::new(
        dims.width as usize,
        dims.height as usize,
        dims.length as usize,
        blocks,
        palette,
        encoding,
    ))
}

/// 读取并解码 Schematic 文件
pub fn load_schematic(path: &Path) -> Result<VoxelGrid> {
    let tree = read_tree(path)?;
    let grid = decode(&tree).with_context(|| format!("解析 Schematic 失败: {}", path.display()))?;
    Ok(grid)
}
