//! jsnorm: the command-line front end.
//!
//! Usage:
//!   jsnorm [options] [file...]
//!
//! Renames every locally-declared name so that no two declarations in a
//! module share a textual name (`--inline` for unconditional suffixes), or
//! strips the suffixes again with `--invert`.

use clap::Parser as ClapParser;
use jsnorm_compiler::Program;
use jsnorm_options::{parse_config_file, CompilerOptions};
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser, Debug)]
#[command(
    name = "jsnorm",
    about = "Make JavaScript declared names unique, or undo it",
    version
)]
struct Cli {
    /// JavaScript files to process.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Use the inline renamer: suffix every declaration unconditionally.
    #[arg(long)]
    inline: bool,

    /// Prefix spliced into inline suffixes (e.g. `unique_`).
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Invert a previous renaming instead of renaming.
    #[arg(long)]
    invert: bool,

    /// Strip const-ness annotations while inline-renaming.
    #[arg(long = "remove-const")]
    remove_const: bool,

    /// Emit compact output without indentation.
    #[arg(long)]
    compact: bool,

    /// Path to a jsnorm.json config file.
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<String>,

    /// Write outputs into this directory instead of stdout.
    #[arg(long = "out-dir", value_name = "DIR")]
    out_dir: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("JSNORM_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let (mut options, config_files) = resolve_options(cli);

    // Command-line flags win over the config file.
    if cli.inline {
        options.use_default_renamer = false;
    }
    if cli.invert {
        options.invert = true;
    }
    if cli.remove_const {
        options.remove_const = true;
    }
    if cli.compact {
        options.pretty = false;
    }
    if let Some(ref prefix) = cli.prefix {
        options.local_name_prefix = prefix.clone();
        options.use_default_renamer = false;
    }
    if cli.out_dir.is_some() {
        options.out_dir = cli.out_dir.clone();
    }

    let files = if cli.files.is_empty() {
        config_files
    } else {
        cli.files.clone()
    };
    if files.is_empty() {
        eprintln!("error: no input files");
        return 1;
    }

    let out_dir = options.out_dir.clone();
    let mut program = Program::new(options);
    if let Err(e) = program.load_root_files(&files) {
        eprintln!("error: {}", e);
        return 1;
    }

    let result = match program.compile() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    for diagnostic in result.diagnostics.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    if result.diagnostics.has_errors() {
        let count = result.diagnostics.error_count();
        eprintln!(
            "Found {} error{}.",
            count,
            if count == 1 { "" } else { "s" }
        );
        return 2;
    }

    match out_dir {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("error: cannot create {}: {}", dir.display(), e);
                return 1;
            }
            for output in &result.outputs {
                let file_name = Path::new(&output.name)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| output.name.clone());
                let path = dir.join(file_name);
                if let Err(e) = std::fs::write(&path, &output.text) {
                    eprintln!("error: cannot write {}: {}", path.display(), e);
                    return 1;
                }
            }
        }
        None => {
            let many = result.outputs.len() > 1;
            for output in &result.outputs {
                if many {
                    println!("// {}", output.name);
                }
                print!("{}", output.text);
            }
        }
    }
    0
}

/// Options from `--config`, an ambient `jsnorm.json`, or the defaults.
fn resolve_options(cli: &Cli) -> (CompilerOptions, Vec<String>) {
    let config_path = cli
        .config
        .clone()
        .or_else(|| Path::new("jsnorm.json").exists().then(|| "jsnorm.json".to_string()));
    match config_path {
        Some(path) => match parse_config_file(&path) {
            Ok(config) => (
                config.compiler_options.unwrap_or_default(),
                config.files.unwrap_or_default(),
            ),
            Err(e) => {
                eprintln!("warning: failed to read {}: {}", path, e);
                (CompilerOptions::default(), Vec::new())
            }
        },
        None => (CompilerOptions::default(), Vec::new()),
    }
}
