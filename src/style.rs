//! 方块分类与配色
//!
//! 有调色板名时按名字的子串匹配；没有时退回数值 id 表（经典格式）。

use crate::config::{ColorRule, RenderConfig};
use crate::palette::Palette;
use image::Rgb;
use tracing::warn;

pub const DEFAULT_COLOR: Rgb<u8> = Rgb([0x99, 0x99, 0x99]);
pub const AIR_COLOR: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// 内置名字规则，按顺序匹配
const NAME_COLORS: &[(&str, [u8; 3])] = &[
    ("air", [0xff, 0xff, 0xff]),
    ("stone", [0x8a, 0x8a, 0x8a]),
    ("dirt", [0x8b, 0x5a, 0x2b]),
    ("grass", [0x66, 0xaa, 0x44]),
    ("planks", [0xd2, 0xa6, 0x79]),
    ("log", [0x6f, 0x4a, 0x2f]),
    ("glass", [0xaa, 0xdd, 0xff]),
    ("wool", [0xff, 0x7f, 0x50]),
    ("gold", [0xff, 0xd7, 0x00]),
    ("diamond", [0x6e, 0xe7, 0xff]),
];

/// 经典数值 id 的颜色
const NUMERIC_COLORS: &[(u32, [u8; 3])] = &[
    (0, [0xff, 0xff, 0xff]),
    (1, [0x8a, 0x8a, 0x8a]),
    (2, [0x66, 0xaa, 0x44]),
    (3, [0x8b, 0x5a, 0x2b]),
    (4, [0x6f, 0x6f, 0x6f]),
    (17, [0x8b, 0x5a, 0x2b]),
    (20, [0xaa, 0xd0, 0xff]),
    (35, [0xff, 0x7f, 0x50]),
];

/// 解析 `#rrggbb` / `rrggbb`
pub fn parse_hex_color(text: &str) -> Option<Rgb<u8>> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// 一次渲染所用的分类与配色
#[derive(Debug, Clone)]
pub struct BlockStyle<'a> {
    palette: &'a Palette,
    rules: Vec<(String, Rgb<u8>)>,
    show_air: bool,
}

impl<'a> BlockStyle<'a> {
    pub fn new(palette: &'a Palette, show_air: bool) -> Self {
        Self {
            palette,
            rules: Vec::new(),
            show_air,
        }
    }

    /// 使用配置中的空气开关与自定义规则
    pub fn from_config(palette: &'a Palette, config: &RenderConfig) -> Self {
        Self::new(palette, config.show_air).with_rules(&config.colors)
    }

    /// 追加自定义规则，无法解析的颜色被跳过
    pub fn with_rules(mut self, rules: &[ColorRule]) -> Self {
        for rule in rules {
            match parse_hex_color(&rule.color) {
                Some(color) => self.rules.push((rule.pattern.to_lowercase(), color)),
                None => warn!("忽略无效颜色 {:?} (规则 {:?})", rule.color, rule.pattern),
            }
        }
        self
    }

    fn name(&self, id: u32) -> Option<String> {
        self.palette
            .get(id)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    /// 名字含 `air`，或没有名字且 id 为 0
    pub fn is_air(&self, id: u32) -> bool {
        match self.name(id) {
            Some(name) => name.contains("air"),
            None => id == 0,
        }
    }

    /// 空气且不显示空气时跳过
    pub fn is_visible(&self, id: u32) -> bool {
        self.show_air || !self.is_air(id)
    }

    pub fn color(&self, id: u32) -> Rgb<u8> {
        match self.name(id) {
            Some(name) => self.color_for_name(&name),
            None => NUMERIC_COLORS
                .iter()
                .find(|(known, _)| *known == id)
                .map_or(DEFAULT_COLOR, |(_, rgb)| Rgb(*rgb)),
        }
    }

    fn color_for_name(&self, name: &str) -> Rgb<u8> {
        if let Some((_, color)) = self.rules.iter().find(|(pattern, _)| name.contains(pattern.as_str())) {
            return *color;
        }
        NAME_COLORS
            .iter()
            .find(|(pattern, _)| name.contains(*pattern))
            .map_or(DEFAULT_COLOR, |(_, rgb)| Rgb(*rgb))
    }
}
