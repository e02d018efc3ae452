//! 读取原始文件并解析为标签树

use crate::json_tree::json_to_tag;
use anyhow::{Context, Result};
use fastnbt::Value;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZLIB_MAGIC: u8 = 0x78;

/// 按魔数解压；未压缩的数据原样返回
fn decompress(raw: &[u8]) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if raw.starts_with(&GZIP_MAGIC) {
        flate2::read::GzDecoder::new(raw)
            .read_to_end(&mut data)
            .context("gzip 解压失败")?;
    } else if raw.first() == Some(&ZLIB_MAGIC) {
        flate2::read::ZlibDecoder::new(raw)
            .read_to_end(&mut data)
            .context("zlib 解压失败")?;
    } else {
        data.extend_from_slice(raw);
    }
    Ok(data)
}

/// 第一个非空白字节是 `{` 时视为 JSON 转储
fn looks_like_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |b| *b == b'{')
}

/// 将整个文件内容解析为标签树
pub fn parse_tree(raw: &[u8]) -> Result<Value> {
    let data = decompress(raw)?;
    if looks_like_json(&data) {
        let json: JsonValue = serde_json::from_slice(&data).context("JSON 解析失败")?;
        return json_to_tag(&json);
    }
    let value: Value = fastnbt::from_bytes(&data).context("NBT 解析失败")?;
    Ok(value)
}

/// 一次性读入文件并解析
pub fn read_tree(path: &Path) -> Result<Value> {
    let raw = fs::read(path).with_context(|| format!("无法读取文件: {}", path.display()))?;
    parse_tree(&raw).with_context(|| format!("无法解析文件: {}", path.display()))
}
