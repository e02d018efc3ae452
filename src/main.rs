//! Minecraft Schematic 体素网格解码工具

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use schemgrid::layer::layer_file_name;
use schemgrid::tag::outline;
use schemgrid::{load_schematic, read_tree, save_layer, BlockStyle, Config, VoxelGrid};

/// Minecraft Schematic 体素网格解码工具
#[derive(Parser)]
#[command(name = "schemgrid", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示 Schematic 的尺寸、编码与方块统计
    Info {
        /// 文件或文件夹（递归扫描）
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// 列出的方块种类上限
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// 将某一层渲染为 PNG
    Layer {
        /// Schematic 文件
        file: PathBuf,
        /// 层高度
        #[arg(short, long, conflicts_with = "all")]
        y: Option<usize>,
        /// 导出所有层
        #[arg(long)]
        all: bool,
        /// 输出文件（单层）或文件夹（--all）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 绘制空气方块
        #[arg(long)]
        air: bool,
        /// 每个方块的像素边长
        #[arg(long)]
        cell_size: Option<u32>,
    },
    /// 导出体素网格为 JSON
    Export {
        /// Schematic 文件
        file: PathBuf,
        /// 输出路径（默认: <文件名>.grid.json）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 格式化输出
        #[arg(long)]
        pretty: bool,
    },
    /// 打印标签树概览，用于排查无法识别的文件
    Tree {
        /// Schematic 文件
        file: PathBuf,
        /// 展开的层数
        #[arg(short, long, default_value_t = 3)]
        depth: usize,
    },
    /// 生成默认配置文件
    Config {
        /// 输出路径（默认: schemgrid.toml）
        #[arg(short, long, default_value = "schemgrid.toml")]
        output: PathBuf,
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

fn load_config(config_path: Option<PathBuf>) -> Config {
    if let Some(path) = config_path {
        match Config::load_from_file(&path) {
            Ok(config) => {
                eprintln!("已加载配置: {}", path.display());
                return config;
            }
            Err(e) => {
                eprintln!("警告: 无法加载配置 {}: {}", path.display(), e);
            }
        }
    }
    Config::load()
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 展开文件夹，按扩展名筛选
fn collect_files(paths: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| config.is_schematic_file(p)),
            );
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files
}

fn print_summary(path: &Path, grid: &VoxelGrid, style: &BlockStyle, top: usize) {
    println!("{}", path.display());
    println!(
        "  尺寸: {} x {} x {} ({} 个体素)",
        grid.width(),
        grid.height(),
        grid.length(),
        grid.volume()
    );
    println!("  编码: {:?}", grid.encoding());
    println!("  调色板: {} 项", grid.palette().len());

    let mut counts: Vec<(u32, usize)> = grid.histogram().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let solid: usize = counts
        .iter()
        .filter(|(id, _)| !style.is_air(*id))
        .map(|(_, n)| n)
        .sum();
    println!("  非空气方块: {}", solid);

    for (id, count) in counts.iter().take(top) {
        let name = grid.block_name(*id).unwrap_or("?");
        println!("    {:>6}  #{:<4} {}", count, id, name);
    }
    if counts.len() > top {
        println!("    ... 另有 {} 种", counts.len() - top);
    }
}

fn write_grid_json(grid: &VoxelGrid, output: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("无法创建文件: {}", output.display()))?,
    );
    if pretty {
        serde_json::to_writer_pretty(writer, grid)?;
    } else {
        serde_json::to_writer(writer, grid)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config);
    init_logging(&config);

    match cli.command {
        Commands::Info { paths, top } => {
            let files = collect_files(&paths, &config);
            if files.is_empty() {
                anyhow::bail!("没有找到 Schematic 文件");
            }

            let start = Instant::now();
            let results: Vec<_> = files
                .par_iter()
                .map(|path| (path, load_schematic(path)))
                .collect();

            let mut failed = 0;
            for (path, result) in &results {
                match result {
                    Ok(grid) => {
                        let style = BlockStyle::from_config(grid.palette(), &config.render);
                        print_summary(path, grid, &style, top);
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("失败 {}: {:#}", path.display(), e);
                    }
                }
            }
            println!(
                "\n共 {} 个文件，失败 {} 个，耗时: {:.2}s",
                results.len(),
                failed,
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Layer {
            file,
            y,
            all,
            output,
            air,
            cell_size,
        } => {
            let grid = load_schematic(&file)?;

            // 命令行参数优先于配置
            let mut render = config.render.clone();
            render.show_air |= air;
            let cell_size = cell_size.unwrap_or(render.cell_size);
            let style = BlockStyle::from_config(grid.palette(), &render);

            if all {
                let dir = output.unwrap_or_else(|| PathBuf::from("layers"));
                fs::create_dir_all(&dir)?;
                (0..grid.height()).into_par_iter().try_for_each(|y| {
                    save_layer(&grid, y, &style, cell_size, &dir.join(layer_file_name(y)))
                })?;
                println!("已导出 {} 层到 {:?}", grid.height(), dir);
            } else {
                let y = y.unwrap_or(0);
                let output = output.unwrap_or_else(|| layer_file_name(y));
                save_layer(&grid, y, &style, cell_size, &output)?;
                println!("已导出第 {} 层: {:?}", y, output);
            }
        }

        Commands::Export {
            file,
            output,
            pretty,
        } => {
            let grid = load_schematic(&file)?;
            let output = output.unwrap_or_else(|| file.with_extension("grid.json"));
            write_grid_json(&grid, &output, pretty)?;
            println!(
                "已导出 {} x {} x {} 网格: {:?}",
                grid.width(),
                grid.height(),
                grid.length(),
                output
            );
        }

        Commands::Tree { file, depth } => {
            let tree = read_tree(&file)?;
            print!("{}", outline(&tree, depth));
        }

        Commands::Config { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("文件已存在: {:?}\n使用 --force 覆盖", output);
            }

            let default_config = Config::default();
            default_config.save_to_file(&output)?;
            println!("已生成配置文件: {:?}", output);
            println!("\n配置项说明:");
            println!("  [render]");
            println!(
                "    show_air = {}     # 绘制空气方块",
                default_config.render.show_air
            );
            println!(
                "    cell_size = {}        # 层切片中每个方块的像素边长",
                default_config.render.cell_size
            );
            println!("    [[render.colors]]     # 自定义颜色: pattern = \"concrete\", color = \"#aabbcc\"");
            println!("  [scan]");
            println!("    extensions = [...]    # 扫描文件夹时识别的扩展名");
            println!("  [logging]");
            println!(
                "    level = \"{}\"       # 未设置 RUST_LOG 时的日志级别",
                default_config.logging.level
            );
        }
    }

    Ok(())
}
