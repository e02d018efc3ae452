//! 单层切片渲染为 PNG

use crate::grid::VoxelGrid;
use crate::style::{BlockStyle, AIR_COLOR};
use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// 默认输出文件名
pub fn layer_file_name(y: usize) -> PathBuf {
    PathBuf::from(format!("layer-{}.png", y))
}

/// 渲染第 `y` 层：x 向右，z 向下，每个方块 `cell_size` 像素
pub fn render_layer(
    grid: &VoxelGrid,
    y: usize,
    style: &BlockStyle,
    cell_size: u32,
) -> Result<RgbImage> {
    if y >= grid.height() {
        bail!("层 {} 超出范围 (高度 {})", y, grid.height());
    }
    if cell_size == 0 {
        bail!("cell_size 必须大于 0");
    }
    let width = u32::try_from(grid.width())
        .ok()
        .and_then(|w| w.checked_mul(cell_size))
        .context("图像宽度过大")?;
    let height = u32::try_from(grid.length())
        .ok()
        .and_then(|l| l.checked_mul(cell_size))
        .context("图像高度过大")?;

    let mut image = RgbImage::from_pixel(width, height, AIR_COLOR);
    for z in 0..grid.length() {
        for x in 0..grid.width() {
            let id = grid.blocks()[grid.index(x, y, z)];
            if !style.is_visible(id) {
                continue;
            }
            let color = style.color(id);
            let (px, pz) = (x as u32 * cell_size, z as u32 * cell_size);
            for dz in 0..cell_size {
                for dx in 0..cell_size {
                    image.put_pixel(px + dx, pz + dz, color);
                }
            }
        }
    }
    Ok(image)
}

/// 渲染并保存为 PNG
pub fn save_layer(
    grid: &VoxelGrid,
    y: usize,
    style: &BlockStyle,
    cell_size: u32,
    output: &Path,
) -> Result<()> {
    let image = render_layer(grid, y, style, cell_size)?;
    image
        .save(output)
        .with_context(|| format!("无法写入图像: {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Encoding;
    use crate::palette::Palette;
    use image::Rgb;

    fn grid() -> VoxelGrid {
        // 2x2x1，第 0 层 [空气, 石头]，第 1 层 [羊毛, 未知]
        VoxelGrid::new(2, 2, 1, vec![0, 1, 35, 99], Palette::default(), Encoding::LegacyBytes)
    }

    #[test]
    fn renders_cells() {
        let grid = grid();
        let empty = Palette::default();
        let style = BlockStyle::new(&empty, false);
        let image = render_layer(&grid, 0, &style, 2).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(*image.get_pixel(0, 0), AIR_COLOR);
        assert_eq!(*image.get_pixel(3, 1), Rgb([0x8a, 0x8a, 0x8a]));

        let image = render_layer(&grid, 1, &style, 1).unwrap();
        assert_eq!(*image.get_pixel(0, 0), Rgb([0xff, 0x7f, 0x50]));
        assert_eq!(*image.get_pixel(1, 0), Rgb([0x99, 0x99, 0x99]));
    }

    #[test]
    fn rejects_out_of_range_layer() {
        let grid = grid();
        let empty = Palette::default();
        let style = BlockStyle::new(&empty, true);
        assert!(render_layer(&grid, 2, &style, 1).is_err());
        assert!(render_layer(&grid, 0, &style, 0).is_err());
    }

    #[test]
    fn default_file_name() {
        assert_eq!(layer_file_name(3), PathBuf::from("layer-3.png"));
    }
}
