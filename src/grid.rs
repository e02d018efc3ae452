//! 解码结果：稠密体素网格

use crate::decode::Encoding;
use crate::palette::Palette;
use serde::Serialize;
use std::collections::BTreeMap;

/// 稠密体素网格
///
/// `blocks` 按 x 最快、其次 z、最后 y 的顺序排列，长度恒为
/// `width * height * length`。构造后不可变。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoxelGrid {
    width: usize,
    height: usize,
    length: usize,
    encoding: Encoding,
    palette: Palette,
    blocks: Vec<u32>,
}

impl VoxelGrid {
    /// `blocks` 长度必须等于体积，由解码器保证
    pub(crate) fn new(
        width: usize,
        height: usize,
        length: usize,
        blocks: Vec<u32>,
        palette: Palette,
        encoding: Encoding,
    ) -> Self {
        debug_assert_eq!(blocks.len(), width * height * length);
        Self {
            width,
            height,
            length,
            encoding,
            palette,
            blocks,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn volume(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    /// 经典格式下为空
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// 坐标转扁平索引，不做越界检查
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.width + y * self.width * self.length
    }

    /// 带越界检查的读取
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u32> {
        if x >= self.width || y >= self.height || z >= self.length {
            return None;
        }
        self.blocks.get(self.index(x, y, z)).copied()
    }

    pub fn block_name(&self, id: u32) -> Option<&str> {
        self.palette.get(id)
    }

    /// 各 id 出现次数
    pub fn histogram(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for id in &self.blocks {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    }
}
