//! 调色板解析：id -> 方块名

use crate::tag::{as_integer, as_str, get_tag, unwrap_value, ENVELOPE_KEY};
use fastnbt::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// 调色板，解码完成后不再修改
///
/// 经典字节格式没有调色板，此时为空表，调用方应按数值 id 处理。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    names: BTreeMap<u32, String>,
}

impl Palette {
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// 不同 id 的数量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl FromIterator<(u32, String)> for Palette {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// 显式 id：信封中的整数或裸整数
fn explicit_id(entry: &Value) -> Option<u32> {
    let raw = match entry {
        Value::Compound(map) => map.get(ENVELOPE_KEY)?,
        other => other,
    };
    match raw {
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) => {
            as_integer(raw).and_then(|v| u32::try_from(v).ok())
        }
        _ => None,
    }
}

/// 列表形式调色板的条目名
fn entry_name(entry: &Value) -> Option<String> {
    as_str(entry)
        .or_else(|| get_tag(unwrap_value(entry), "Name").and_then(as_str))
        .map(str::to_string)
}

/// 构建 id -> 方块名映射
///
/// 复合标签的键是方块名，值是（或包含）id；没有数值 id 的条目按遍历顺序
/// 从 0 递增分配。id 冲突时后者覆盖前者。
pub fn build_palette(node: &Value) -> Palette {
    let mut names = BTreeMap::new();
    let mut fallback = 0u32;
    let mut next_fallback = || {
        let id = fallback;
        fallback += 1;
        id
    };

    match unwrap_value(node) {
        Value::Compound(map) => {
            // HashMap 不保留插入顺序，按键排序保证结果稳定
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (name, entry) in entries {
                let id = explicit_id(entry).unwrap_or_else(&mut next_fallback);
                names.insert(id, name.clone());
            }
        }
        Value::List(items) => {
            for item in items {
                let id = next_fallback();
                if let Some(name) = entry_name(item) {
                    names.insert(id, name);
                }
            }
        }
        _ => {}
    }

    Palette { names }
}
