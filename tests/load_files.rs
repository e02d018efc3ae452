use fastnbt::{ByteArray, IntArray, LongArray, Value};
use flate2::write::GzEncoder;
use flate2::Compression;
use schemgrid::{load_schematic, Encoding, SchematicError};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn compound(entries: Vec<(&str, Value)>) -> Value {
    Value::Compound(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
    )
}

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("schemgrid_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_gzip_nbt(name: &str, tree: &Value) -> PathBuf {
    let path = temp_file(name);
    let bytes = fastnbt::to_bytes(tree).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

#[test]
fn legacy_schematic_file() {
    // 2x2x2，x 最快，其次 z，最后 y
    let tree = compound(vec![
        ("Width", Value::Short(2)),
        ("Height", Value::Short(2)),
        ("Length", Value::Short(2)),
        ("Materials", Value::String("Alpha".into())),
        ("Blocks", Value::ByteArray(ByteArray::new(vec![1, 2, 3, 4, 5, 6, 7, 8]))),
        ("Data", Value::ByteArray(ByteArray::new(vec![0; 8]))),
    ]);
    let path = write_gzip_nbt("legacy.schematic", &tree);
    let grid = load_schematic(&path).unwrap();

    assert_eq!(grid.encoding(), Encoding::LegacyBytes);
    assert!(grid.palette().is_empty());
    assert_eq!(grid.get(1, 0, 0), Some(2));
    assert_eq!(grid.get(0, 0, 1), Some(3));
    assert_eq!(grid.get(0, 1, 0), Some(5));
    assert_eq!(grid.get(1, 1, 1), Some(8));
}

#[test]
fn sponge_v2_file() {
    let tree = compound(vec![
        ("Version", Value::Int(2)),
        ("Width", Value::Short(3)),
        ("Height", Value::Short(1)),
        ("Length", Value::Short(1)),
        ("PaletteMax", Value::Int(2)),
        (
            "Palette",
            compound(vec![
                ("minecraft:air", Value::Int(0)),
                ("minecraft:oak_planks", Value::Int(1)),
            ]),
        ),
        ("BlockData", Value::ByteArray(ByteArray::new(vec![1, 0, 1]))),
    ]);
    let path = write_gzip_nbt("v2.schem", &tree);
    let grid = load_schematic(&path).unwrap();

    assert_eq!(grid.blocks(), &[1, 0, 1]);
    assert_eq!(grid.encoding(), Encoding::PaletteIndices);
    assert_eq!(grid.block_name(1), Some("minecraft:oak_planks"));
}

#[test]
fn sponge_v3_file() {
    let tree = compound(vec![(
        "Schematic",
        compound(vec![
            ("Version", Value::Int(3)),
            ("Width", Value::Short(2)),
            ("Height", Value::Short(1)),
            ("Length", Value::Short(1)),
            (
                "Blocks",
                compound(vec![
                    (
                        "Palette",
                        compound(vec![
                            ("minecraft:air", Value::Int(0)),
                            ("minecraft:stone", Value::Int(1)),
                        ]),
                    ),
                    ("Data", Value::ByteArray(ByteArray::new(vec![0, 1]))),
                ]),
            ),
        ]),
    )]);
    let path = write_gzip_nbt("v3.schem", &tree);
    let grid = load_schematic(&path).unwrap();

    assert_eq!(grid.blocks(), &[0, 1]);
    assert_eq!(grid.block_name(grid.blocks()[1]), Some("minecraft:stone"));
}

#[test]
fn packed_block_states_file() {
    // 3 种方块 -> 2 位，每字 32 组
    let indices: Vec<u64> = (0..40).map(|i| i % 3).collect();
    let words: Vec<i64> = indices
        .chunks(32)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u64, |w, (i, idx)| w | (*idx << (2 * i))) as i64
        })
        .collect();
    let tree = compound(vec![
        ("Width", Value::Short(5)),
        ("Height", Value::Short(2)),
        ("Length", Value::Short(4)),
        (
            "Palette",
            compound(vec![
                ("minecraft:air", Value::Int(0)),
                ("minecraft:dirt", Value::Int(1)),
                ("minecraft:glass", Value::Int(2)),
            ]),
        ),
        ("BlockStates", Value::LongArray(LongArray::new(words))),
    ]);
    let path = write_gzip_nbt("packed.nbt", &tree);
    let grid = load_schematic(&path).unwrap();

    let expected: Vec<u32> = indices.iter().map(|v| *v as u32).collect();
    assert_eq!(grid.blocks(), &expected[..]);
    assert_eq!(grid.encoding(), Encoding::PackedStates);
}

#[test]
fn enveloped_json_dump() {
    let path = temp_file("dump.json");
    fs::write(
        &path,
        r#"{
            "type": "compound",
            "name": "",
            "value": {
                "Schematic": {
                    "type": "compound",
                    "value": {
                        "Width": {"type": "short", "value": 1},
                        "Height": {"type": "short", "value": 1},
                        "Length": {"type": "short", "value": 2},
                        "Palette": {
                            "type": "compound",
                            "value": {
                                "minecraft:air": {"type": "int", "value": 0},
                                "minecraft:gold_block": {"type": "int", "value": 1}
                            }
                        },
                        "BlockStates": {"type": "longArray", "value": [[0, 2]]}
                    }
                }
            }
        }"#,
    )
    .unwrap();
    let grid = load_schematic(&path).unwrap();

    assert_eq!((grid.width(), grid.height(), grid.length()), (1, 1, 2));
    assert_eq!(grid.blocks(), &[0, 1]);
    assert_eq!(grid.block_name(1), Some("minecraft:gold_block"));
}

#[test]
fn unsupported_file_reports_format_error() {
    let tree = compound(vec![(
        "Data",
        compound(vec![("LevelName", Value::String("world".into()))]),
    )]);
    let path = write_gzip_nbt("level.dat", &tree);
    let err = load_schematic(&path).unwrap_err();

    assert_eq!(
        err.downcast_ref::<SchematicError>(),
        Some(&SchematicError::UnsupportedFormat)
    );
}

#[test]
fn grid_serializes_to_json() {
    let tree = compound(vec![
        ("Width", Value::Short(2)),
        ("Height", Value::Short(1)),
        ("Length", Value::Short(1)),
        ("Palette", compound(vec![("minecraft:stone", Value::Int(0))])),
        ("BlockData", Value::IntArray(IntArray::new(vec![0, 0]))),
    ]);
    let path = write_gzip_nbt("json_out.schem", &tree);
    let grid = load_schematic(&path).unwrap();
    let json = serde_json::to_value(&grid).unwrap();

    assert_eq!(json["width"], 2);
    assert_eq!(json["encoding"], "palette_indices");
    assert_eq!(json["palette"]["0"], "minecraft:stone");
    assert_eq!(json["blocks"], serde_json::json!([0, 0]));
}
