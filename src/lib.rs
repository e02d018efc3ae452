//! Minecraft Schematic 体素网格解码工具
//!
//! 将多种 Schematic 编码（经典字节 id、调色板索引、按位打包的调色板索引）
//! 统一解码为稠密体素网格，供渲染使用

pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub mod grid;
pub mod json_tree;
pub mod layer;
pub mod palette;
pub mod schematic;
pub mod source;
pub mod style;
pub mod tag;

pub use config::Config;
pub use decode::{bit_width, unpack_block_states, Encoding};
pub use detect::{classify, extract_dimensions, Dimensions, Format};
pub use error::SchematicError;
pub use grid::VoxelGrid;
pub use json_tree::json_to_tag;
pub use layer::{render_layer, save_layer};
pub use palette::{build_palette, Palette};
pub use schematic::{decode, load_schematic};
pub use source::{parse_tree, read_tree};
pub use style::BlockStyle;
pub use tag::{get_tag, resolve_root, SchematicRoot};
