//! JSON 形式的标签树转换为 fastnbt Value
//!
//! 支持两类来源：带 `{"type", "value"}` 信封的通用 NBT 转储（信封原样保留，
//! 由导航器剥离），以及 `mcj` 的紧凑格式（`12b`、`3s`、`B;<base64>` 等）。

use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use fastnbt::{ByteArray, IntArray, LongArray, Value};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// 将 JSON 转换为标签树
pub fn json_to_tag(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Object(obj) => {
            let mut map = HashMap::with_capacity(obj.len());
            for (k, v) in obj {
                map.insert(k.clone(), json_to_tag(v)?);
            }
            Ok(Value::Compound(map))
        }
        JsonValue::Array(arr) => {
            let list: Result<Vec<Value>> = arr.iter().map(json_to_tag).collect();
            Ok(Value::List(list?))
        }
        JsonValue::String(s) => parse_string_value(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(v) => Ok(Value::Int(v)),
                    Err(_) => Ok(Value::Long(i)),
                }
            } else if let Some(u) = n.as_u64() {
                // 超出 i64 的无符号数按位保留，打包字会用到
                Ok(Value::Long(u as i64))
            } else {
                Ok(Value::Double(n.as_f64().unwrap_or(0.0)))
            }
        }
        JsonValue::Bool(b) => Ok(Value::Byte(i8::from(*b))),
        JsonValue::Null => Ok(Value::Byte(0)),
    }
}

/// 解析 `B;`/`I;`/`L;` 前缀的 base64 数组
fn parse_array(prefix: u8, b64: &str) -> Result<Value> {
    let bytes = BASE64.decode(b64)?;
    let value = match prefix {
        b'B' => Value::ByteArray(ByteArray::new(bytes.iter().map(|&b| b as i8).collect())),
        b'I' => {
            if bytes.len() % 4 != 0 {
                bail!("I; 数组长度不是 4 的倍数: {}", bytes.len());
            }
            Value::IntArray(IntArray::new(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ))
        }
        _ => {
            if bytes.len() % 8 != 0 {
                bail!("L; 数组长度不是 8 的倍数: {}", bytes.len());
            }
            Value::LongArray(LongArray::new(
                bytes
                    .chunks_exact(8)
                    .map(|c| i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ))
        }
    };
    Ok(value)
}

/// 解析字符串值（可能带类型后缀）
fn parse_string_value(s: &str) -> Result<Value> {
    if let Some(raw) = s.strip_suffix("\\0") {
        return Ok(Value::String(raw.to_string()));
    }

    let bytes = s.as_bytes();
    if bytes.len() > 2 && bytes[1] == b';' && matches!(bytes[0], b'B' | b'I' | b'L') {
        return parse_array(bytes[0], &s[2..]);
    }

    if s.len() >= 2 && s.is_char_boundary(s.len() - 1) {
        let (number, suffix) = s.split_at(s.len() - 1);
        let parsed = match suffix {
            "b" => number.parse().ok().map(Value::Byte),
            "s" => number.parse().ok().map(Value::Short),
            "L" => number.parse().ok().map(Value::Long),
            "f" => number.parse().ok().map(Value::Float),
            _ => None,
        };
        if let Some(value) = parsed {
            return Ok(value);
        }
    }

    Ok(Value::String(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_strings() {
        assert_eq!(json_to_tag(&json!("5b")).unwrap(), Value::Byte(5));
        assert_eq!(json_to_tag(&json!("-12s")).unwrap(), Value::Short(-12));
        assert_eq!(json_to_tag(&json!("7L")).unwrap(), Value::Long(7));
        assert_eq!(json_to_tag(&json!("1.5f")).unwrap(), Value::Float(1.5));
        assert_eq!(
            json_to_tag(&json!("minecraft:stone")).unwrap(),
            Value::String("minecraft:stone".into())
        );
        assert_eq!(json_to_tag(&json!("12b\\0")).unwrap(), Value::String("12b".into()));
    }

    #[test]
    fn base64_arrays() {
        // [0, 1] 作为字节数组
        assert_eq!(
            json_to_tag(&json!("B;AAE=")).unwrap(),
            Value::ByteArray(ByteArray::new(vec![0, 1]))
        );
        // 单个 long 值 1
        assert_eq!(
            json_to_tag(&json!("L;AAAAAAAAAAE=")).unwrap(),
            Value::LongArray(LongArray::new(vec![1]))
        );
        assert!(json_to_tag(&json!("I;AAE=")).is_err());
        assert_eq!(json_to_tag(&json!("x;y")).unwrap(), Value::String("x;y".into()));
    }

    #[test]
    fn numbers_pick_narrowest_integer() {
        assert_eq!(json_to_tag(&json!(3)).unwrap(), Value::Int(3));
        assert_eq!(json_to_tag(&json!(5_000_000_000i64)).unwrap(), Value::Long(5_000_000_000));
        assert_eq!(json_to_tag(&json!(u64::MAX)).unwrap(), Value::Long(-1));
        assert_eq!(json_to_tag(&json!(0.5)).unwrap(), Value::Double(0.5));
        assert_eq!(json_to_tag(&json!(true)).unwrap(), Value::Byte(1));
    }

    #[test]
    fn envelopes_are_kept() {
        let value = json_to_tag(&json!({"type": "short", "value": 4})).unwrap();
        let Value::Compound(map) = value else {
            panic!("expected compound");
        };
        assert_eq!(map.get("value"), Some(&Value::Int(4)));
        assert_eq!(map.get("type"), Some(&Value::String("short".into())));
    }
}
