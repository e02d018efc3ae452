//! 标签树导航
//!
//! 同一个逻辑字段在不同的 NBT 生成器里形状不同：可能直接是值，
//! 也可能被包在 `{ "type": ..., "value": ... }` 信封里。这里的访问器
//! 对每种形状显式匹配，找不到时返回 `None`，从不报错。

use fastnbt::Value;

/// 信封中存放真实值的键
pub const ENVELOPE_KEY: &str = "value";

/// 解析结果顶层可能出现的信封键（按优先级）
const TOP_LEVEL_KEYS: &[&str] = &["parsed", ENVELOPE_KEY];

/// 包裹 Schematic 根的键
const SCHEMATIC_KEYS: &[&str] = &["Schematic", "schematic"];

/// 选定的 Schematic 根
#[derive(Debug, Clone, Copy)]
pub struct SchematicRoot<'a> {
    /// 实际解码对象
    pub schematic: &'a Value,
    /// 外层节点，尺寸字段的后备来源
    pub outer: &'a Value,
}

/// 剥掉一层信封；不是信封时原样返回
pub fn unwrap_value(node: &Value) -> &Value {
    match node {
        Value::Compound(map) => map.get(ENVELOPE_KEY).unwrap_or(node),
        _ => node,
    }
}

/// 定位 Schematic 根，兼容裸根与 `Schematic` 包裹两种约定
pub fn resolve_root(tree: &Value) -> SchematicRoot<'_> {
    let top = match tree {
        Value::Compound(map) => TOP_LEVEL_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .unwrap_or(tree),
        _ => tree,
    };
    let outer = unwrap_value(top);

    let schematic = match outer {
        Value::Compound(map) => SCHEMATIC_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map(unwrap_value)
            .unwrap_or(outer),
        _ => outer,
    };

    SchematicRoot { schematic, outer }
}

/// 数组元素个数，非数组返回 `None`
pub fn array_len(node: &Value) -> Option<usize> {
    match node {
        Value::List(items) => Some(items.len()),
        Value::ByteArray(arr) => Some(arr.len()),
        Value::IntArray(arr) => Some(arr.len()),
        Value::LongArray(arr) => Some(arr.len()),
        _ => None,
    }
}

/// 读取字段：依次尝试信封中的值、数组本身、标量本身
pub fn get_tag<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    let Value::Compound(map) = node else {
        return None;
    };
    match map.get(name)? {
        Value::Compound(inner) => inner.get(ENVELOPE_KEY),
        child => Some(child),
    }
}

/// 按拼写顺序找到第一个存在的子节点，并剥掉一层信封
pub fn field<'a>(node: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let Value::Compound(map) = node else {
        return None;
    };
    names
        .iter()
        .find_map(|name| map.get(*name))
        .map(unwrap_value)
}

/// 把节点强制转换为整数；非数值返回 `None`
pub fn as_integer(node: &Value) -> Option<i64> {
    match unwrap_value(node) {
        Value::Byte(v) => Some(i64::from(*v)),
        Value::Short(v) => Some(i64::from(*v)),
        Value::Int(v) => Some(i64::from(*v)),
        Value::Long(v) => Some(*v),
        Value::Float(v) if v.is_finite() => Some(*v as i64),
        Value::Double(v) if v.is_finite() => Some(*v as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 读取字符串标量
pub fn as_str(node: &Value) -> Option<&str> {
    match unwrap_value(node) {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// 标签类型名与元素个数，例如 `byte[12]`
fn kind(node: &Value) -> String {
    match node {
        Value::Byte(v) => format!("byte {}", v),
        Value::Short(v) => format!("short {}", v),
        Value::Int(v) => format!("int {}", v),
        Value::Long(v) => format!("long {}", v),
        Value::Float(v) => format!("float {}", v),
        Value::Double(v) => format!("double {}", v),
        Value::String(s) => format!("string {:?}", s),
        Value::ByteArray(arr) => format!("byte[{}]", arr.len()),
        Value::IntArray(arr) => format!("int[{}]", arr.len()),
        Value::LongArray(arr) => format!("long[{}]", arr.len()),
        Value::List(items) => format!("list[{}]", items.len()),
        Value::Compound(map) => format!("compound{{{}}}", map.len()),
    }
}

/// 生成标签树的缩进概览，只展开复合标签，最多 `depth` 层
pub fn outline(node: &Value, depth: usize) -> String {
    fn walk(out: &mut String, name: &str, node: &Value, indent: usize, depth: usize) {
        out.push_str(&format!("{}{}: {}\n", "  ".repeat(indent), name, kind(node)));
        if let Value::Compound(map) = node {
            if indent >= depth {
                return;
            }
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            for key in keys {
                walk(out, key, &map[key], indent + 1, depth);
            }
        }
    }

    let mut out = String::new();
    walk(&mut out, "<root>", node, 0, depth);
    out
}
