//! sortmerge CLI: run a merge join over two sorted CSV files.

mod input;

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sortmerge_core::config::EngineConfig;
use sortmerge_core::manifest::now_ms;
use sortmerge_core::prelude::{DataType, JoinComparison, Schema};
use sortmerge_operators::{KeyColumn, MergeDriver, MergeJoin, MergeKernel, Operator};

#[derive(Parser)]
#[command(name = "sortmerge")]
#[command(about = "Sort-merge join over pre-sorted inputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    /// One `{"left": i, "right": j}` object per matched row pair
    Pairs,
    /// One joined row per match, left columns then right columns
    Rows,
}

#[derive(Subcommand)]
enum Commands {
    /// Join two CSV files sorted ascending on their key columns
    Join {
        /// Left input CSV (header row required)
        #[arg(long)]
        left: PathBuf,

        /// Right input CSV (header row required)
        #[arg(long)]
        right: PathBuf,

        /// Key column in the left input
        #[arg(long)]
        left_key: String,

        /// Key column in the right input
        #[arg(long)]
        right_key: String,

        /// Join comparison: =, <, <=, >, >=
        #[arg(long, default_value = "=")]
        op: String,

        /// Key type, e.g. i64, u32, f64
        #[arg(long, default_value = "i64")]
        key_type: String,

        /// Pairs per merge call (overrides SORTMERGE_VECTOR_SIZE)
        #[arg(long)]
        vector_size: Option<usize>,

        #[arg(long, value_enum, default_value = "pairs")]
        output: OutputMode,

        /// Print the join manifest as JSON to stderr when done (pairs output only)
        #[arg(long)]
        manifest: bool,
    },

    /// Show which merge kernel a comparison resolves to
    Explain {
        #[arg(long)]
        op: String,

        #[arg(long, default_value = "i64")]
        key_type: String,

        /// Pairs per merge call (overrides SORTMERGE_VECTOR_SIZE)
        #[arg(long)]
        vector_size: Option<usize>,
    },
}

struct JoinArgs {
    left: PathBuf,
    right: PathBuf,
    left_key: String,
    right_key: String,
    comparison: JoinComparison,
    key_type: DataType,
    output: OutputMode,
    manifest: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Join {
            left,
            right,
            left_key,
            right_key,
            op,
            key_type,
            vector_size,
            output,
            manifest,
        } => {
            let run = || -> Result<(), Box<dyn std::error::Error>> {
                let cfg = build_config(vector_size)?;
                let args = JoinArgs {
                    left,
                    right,
                    left_key,
                    right_key,
                    comparison: op.parse()?,
                    key_type: key_type.parse()?,
                    output,
                    manifest,
                };
                run_join(&args, &cfg)
            };
            if let Err(e) = run() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Explain {
            op,
            key_type,
            vector_size,
        } => {
            if let Err(e) = explain(&op, &key_type, vector_size) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Environment defaults, then command-line overrides.
fn build_config(vector_size: Option<usize>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut cfg = EngineConfig::from_env();
    if let Some(n) = vector_size {
        cfg.vector_size = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_join(args: &JoinArgs, cfg: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    if args.manifest && args.output != OutputMode::Pairs {
        return Err("--manifest needs --output pairs".into());
    }
    let left = input::load_csv(&args.left, &args.left_key, args.key_type)?;
    let right = input::load_csv(&args.right, &args.right_key, args.key_type)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.output {
        OutputMode::Pairs => {
            let started = now_ms();
            let lkeys = key_column(&left, &args.left_key, args.key_type, cfg)?;
            let rkeys = key_column(&right, &args.right_key, args.key_type, cfg)?;
            let mut driver =
                MergeDriver::for_columns(&lkeys, &rkeys, args.comparison, cfg.vector_size)?;
            while let Some(batch) = driver.next_batch()? {
                for (l, r) in batch.pairs() {
                    serde_json::to_writer(&mut out, &serde_json::json!({ "left": l, "right": r }))?;
                    writeln!(out)?;
                }
            }
            out.flush()?;
            let manifest = driver.manifest(started).with_config(cfg)?;
            tracing::info!(
                matches = manifest.matches,
                calls = manifest.calls,
                duration_ms = manifest.duration_ms(),
                "join finished"
            );
            if args.manifest {
                eprintln!("{}", serde_json::to_string_pretty(&manifest)?);
            }
        }
        OutputMode::Rows => {
            let op = MergeJoin::new(&args.left_key, &args.right_key, args.comparison)
                .with_config(cfg.clone());
            op.plan(&[
                input_schema(&left, &args.left_key, args.key_type),
                input_schema(&right, &args.right_key, args.key_type),
            ])?;
            for block in op.eval_batches(&left, &right)? {
                for row in 0..block.num_rows() {
                    serde_json::to_writer(&mut out, &input::row_json(&block, row))?;
                    writeln!(out)?;
                }
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn key_column(
    batch: &sortmerge_core::types::RowBatch,
    key: &str,
    key_type: DataType,
    cfg: &EngineConfig,
) -> Result<KeyColumn, Box<dyn std::error::Error>> {
    let col = batch
        .column(key)
        .ok_or_else(|| format!("no column named '{}'", key))?;
    Ok(KeyColumn::from_column(col, key_type, cfg.exclude_nulls)?)
}

/// Schema of a loaded CSV: the key column typed, everything else text.
fn input_schema(batch: &sortmerge_core::types::RowBatch, key: &str, key_type: DataType) -> Schema {
    use sortmerge_core::prelude::Field;
    Schema::new(
        batch
            .columns
            .iter()
            .map(|c| {
                let dt = if c.name == key { key_type } else { DataType::Utf8 };
                Field::new(c.name.clone(), dt, true)
            })
            .collect(),
    )
}

fn explain(
    op: &str,
    key_type: &str,
    vector_size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let comparison: JoinComparison = op.parse()?;
    let key_type: DataType = key_type.parse()?;
    let cfg = build_config(vector_size)?;
    let kernel = MergeKernel::resolve(key_type, comparison)?;

    println!("Merge Join Kernel");
    println!("=================");
    println!("  Comparison:  left {} right", kernel.comparison());
    println!("  Key type:    {}", kernel.key_type());
    println!("  Algorithm:   {}", kernel.algorithm().name());
    if kernel.swapped() {
        println!(
            "  Operands:    swapped (runs right {} left)",
            kernel.comparison().flip()
        );
    } else {
        println!("  Operands:    as given");
    }
    println!("  Capacity:    {} pairs per call", cfg.vector_size);
    println!("  Workers:     {} max parallel partitions", cfg.max_parallel_tasks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortmerge_core::prelude::Scalar;

    fn write_tmp(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sortmerge-cli-{}-{}", std::process::id(), name));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn vector_size_flag_overrides_env_default() {
        let cfg = build_config(Some(7)).unwrap();
        assert_eq!(cfg.vector_size, 7);
        assert!(build_config(Some(0)).is_err());
    }

    #[test]
    fn load_csv_types_only_the_key() {
        let path = write_tmp("load.csv", "id,name\n1,a\n,b\n3,\n");
        let batch = input::load_csv(&path, "id", DataType::Int32).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(
            batch.column("id").unwrap().values,
            vec![Scalar::I32(1), Scalar::Null, Scalar::I32(3)]
        );
        assert_eq!(batch.column("name").unwrap().values[2], Scalar::Null);
    }

    #[test]
    fn load_csv_rejects_missing_key_and_bad_cells() {
        let path = write_tmp("bad.csv", "id,name\nx,a\n");
        assert!(input::load_csv(&path, "nope", DataType::Int64).is_err());
        assert!(input::load_csv(&path, "id", DataType::Int64).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rows_render_as_json_objects() {
        let path = write_tmp("rows.csv", "k,v\n2,x\n");
        let batch = input::load_csv(&path, "k", DataType::Float64).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            input::row_json(&batch, 0),
            serde_json::json!({ "k": 2.0, "v": "x" })
        );
    }

    #[test]
    fn input_schema_matches_operator_plan() {
        let path = write_tmp("schema.csv", "k,v\n1,x\n");
        let batch = input::load_csv(&path, "k", DataType::Int64).unwrap();
        let _ = std::fs::remove_file(&path);
        let schema = input_schema(&batch, "k", DataType::Int64);
        let op = MergeJoin::new("k", "k", JoinComparison::LessThan);
        let plan = op.plan(&[schema.clone(), schema]).unwrap();
        let names: Vec<_> = plan.output_schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["k", "v", "k_right", "v_right"]);
    }
}
