//! unoffice CLI - office document text extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use unoffice::render::{self, JsonFormat};
use unoffice::{parse_batch, parse_document, Input, ParseConfig};

#[derive(Parser)]
#[command(name = "unoffice")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Extract plain text from docx, pptx, xlsx, odt, odp, ods and pdf files",
    long_about = None
)]
struct Cli {
    /// Input documents
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Separator placed between lines of text
    #[arg(short, long, default_value = "\n")]
    delimiter: String,

    /// Drop presentation speaker notes
    #[arg(long)]
    ignore_notes: bool,

    /// Move presentation speaker notes after all slides
    #[arg(long)]
    notes_last: bool,

    /// Directory for unpacked archive contents
    #[arg(long, value_name = "DIR", env = "UNOFFICE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Keep unpacked archive contents after extraction
    #[arg(long)]
    keep_temp: bool,

    /// Print extraction errors as they happen
    #[arg(short, long)]
    verbose: bool,

    /// Output the text segments as JSON
    #[arg(long)]
    json: bool,

    /// Compact JSON output (with --json)
    #[arg(long, requires = "json")]
    compact: bool,

    /// Output file, or output directory when several files are given
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> ParseConfig {
        let mut config = ParseConfig::new()
            .with_newline_delimiter(self.delimiter.as_str())
            .with_ignore_notes(self.ignore_notes)
            .with_notes_at_last(self.notes_last)
            .with_preserve_temp_files(self.keep_temp)
            .with_output_error_to_console(self.verbose);
        if let Some(dir) = &self.temp_dir {
            config = config.with_temp_files_location(dir);
        }
        config
    }

    fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();

    let results = if cli.json {
        extract_json(&cli, &config)
    } else {
        extract_text(&cli, &config)
    };

    let mut failed = 0;
    let several = cli.files.len() > 1;
    for (path, result) in cli.files.iter().zip(results) {
        let written = result.and_then(|content| emit(&cli, path, several, &content));
        if let Err(e) = written {
            eprintln!("{} {}: {}", "Error".red().bold(), path.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        if several {
            eprintln!(
                "{} {} of {} file(s) failed",
                "Done.".yellow().bold(),
                failed,
                cli.files.len()
            );
        }
        std::process::exit(1);
    }
}

fn extract_text(cli: &Cli, config: &ParseConfig) -> Vec<CliResult<String>> {
    let inputs: Vec<Input> = cli.files.iter().map(Input::from).collect();
    parse_batch(inputs, config)
        .into_iter()
        .map(|r| r.map_err(Into::into))
        .collect()
}

fn extract_json(cli: &Cli, config: &ParseConfig) -> Vec<CliResult<String>> {
    cli.files
        .iter()
        .map(|path| -> CliResult<String> {
            let doc = parse_document(path.as_path(), config)?;
            Ok(render::to_json(&doc, config, cli.json_format())?)
        })
        .collect()
}

/// Print `content` or write it to the requested output location.
fn emit(cli: &Cli, input: &Path, several: bool, content: &str) -> CliResult<()> {
    let target = match (&cli.output, several) {
        (None, _) => {
            println!("{}", content);
            return Ok(());
        }
        (Some(path), false) => path.clone(),
        (Some(dir), true) => {
            fs::create_dir_all(dir)?;
            dir.join(output_name(input, cli.json))
        }
    };

    fs::write(&target, content)?;
    println!("{} {}", "Saved to".green(), target.display());
    Ok(())
}

/// Output file name for `input` inside an output directory.
fn output_name(input: &Path, json: bool) -> String {
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    format!("{}.{}", name, if json { "json" } else { "txt" })
}
