//! mailprep CLI - mail-safe HTML transcoding tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mailprep::{
    detect_markup, ConvertOptions, HtmlConverter, OutputFormat, Preset, TranscodeOptions,
    TranscodeStats,
};

#[derive(Parser)]
#[command(name = "mailprep")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Transcode editor HTML into markup that survives mail clients", long_about = None)]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Option preset
    #[arg(long, value_enum, global = true)]
    preset: Option<PresetLevel>,

    /// Minimum font size in pixels
    #[arg(long, value_name = "PX", global = true)]
    min_font_size: Option<u32>,

    /// JSON options file
    #[arg(long, value_name = "FILE", env = "MAILPREP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Emit only the transformed fragment, without the document shell
    #[arg(long, global = true)]
    fragment: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcode one HTML file
    Convert {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output JSON with statistics instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Transcode many HTML files into a directory
    Batch {
        /// Input HTML files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show what the transcoder would change
    Inspect {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PresetLevel {
    /// Typography only: colors, font tags, sizes, line heights
    Minimal,
    /// Every stage (default)
    Standard,
    /// Every stage with a 12px size floor
    Strict,
}

impl From<PresetLevel> for Preset {
    fn from(level: PresetLevel) -> Self {
        match level {
            PresetLevel::Minimal => Preset::Minimal,
            PresetLevel::Standard => Preset::Standard,
            PresetLevel::Strict => Preset::Strict,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            json,
        }) => cmd_convert(&input, output.as_deref(), &options, json),
        Some(Commands::Batch { inputs, output }) => cmd_batch(&inputs, output.as_deref(), &options),
        Some(Commands::Inspect { input, json }) => cmd_inspect(&input, &options, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &options, false)
            } else {
                println!("{}", "Usage: mailprep <FILE> [OUTPUT]".yellow());
                println!("       mailprep --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Options from the config file or preset, then command-line overrides.
fn build_options(cli: &Cli) -> CliResult<TranscodeOptions> {
    let mut options = match (&cli.config, cli.preset) {
        (Some(path), _) => {
            log::debug!("Loading options from {}", path.display());
            TranscodeOptions::from_json(&fs::read_to_string(path)?)?
        }
        (None, Some(level)) => TranscodeOptions::from_preset(level.into()),
        (None, None) => TranscodeOptions::default(),
    };

    if let Some(px) = cli.min_font_size {
        options = options.with_min_font_size(px);
    }
    if cli.fragment {
        options = options.with_template(false);
    }

    options.validate()?;
    Ok(options)
}

fn convert_options(options: &TranscodeOptions, json: bool) -> ConvertOptions {
    let format = if json {
        OutputFormat::Json
    } else if options.wrap_template {
        OutputFormat::Html
    } else {
        OutputFormat::Fragment
    };
    ConvertOptions::new()
        .with_transcode_options(options.clone())
        .with_format(format)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: &TranscodeOptions,
    json: bool,
) -> CliResult<()> {
    let converter = HtmlConverter::new(convert_options(options, json));
    let result = converter.convert_file(input)?;

    if result.stats.parse_failed {
        eprintln!(
            "{} {} could not be parsed; wrote an empty document",
            "Warning:".yellow().bold(),
            input.display()
        );
    }

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!(
            "{} {} ({} changes)",
            "Saved to".green(),
            path.display(),
            result.stats.total_changes()
        );
    } else {
        print!("{}", result.content);
    }

    Ok(())
}

fn cmd_batch(inputs: &[PathBuf], output: Option<&Path>, options: &TranscodeOptions) -> CliResult<()> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("mailprep_output"));
    fs::create_dir_all(&output_dir)?;

    let converter = HtmlConverter::new(convert_options(options, false));

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("transcoding");

    // Files are transcoded in parallel; writing happens afterwards in input order.
    let results = converter.convert_files(inputs, |_| pb.inc(1));

    let mut totals = TranscodeStats::new();
    let mut failures = Vec::new();

    for (input, result) in inputs.iter().zip(results) {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.html".to_string());

        match result {
            Ok(result) => {
                fs::write(output_dir.join(&name), &result.content)?;
                totals.merge(&result.stats);
            }
            Err(e) => failures.push((input.clone(), e)),
        }
    }

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} files, {} changes -> {}",
        "Transcoded".green().bold(),
        inputs.len() - failures.len(),
        totals.total_changes(),
        output_dir.display()
    );
    for (path, e) in &failures {
        println!("  {} {}: {}", "└─".dimmed(), path.display().to_string().red(), e);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} files failed", failures.len()).into())
    }
}

fn cmd_inspect(input: &Path, options: &TranscodeOptions, json: bool) -> CliResult<()> {
    let html = fs::read_to_string(input)?;
    let kind = detect_markup(&html);
    let result = mailprep::transcode_with_stats(&html, options);
    let stats = &result.stats;

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "markup": kind.to_string(),
            "input_bytes": html.len(),
            "output_bytes": result.content_len(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Input".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Markup".bold(), kind);
    println!("{}: {}", "Elements".bold(), stats.element_count);
    println!("{}: {}", "Unparsable styles".bold(), stats.unparsable_styles);
    if stats.parse_failed {
        println!("{}: {}", "Parse".bold(), "failed".red());
    }

    println!();
    println!("{}", "Changes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let rows = [
        ("Colors rewritten", stats.colors_rewritten),
        ("Font tags rewritten", stats.font_tags_rewritten),
        ("Font sizes normalized", stats.font_sizes_normalized),
        ("Font sizes raised", stats.font_sizes_raised),
        ("Line heights normalized", stats.line_heights_normalized),
        ("Layout tables built", stats.layout_tables_built),
        ("Images normalized", stats.images_normalized),
        ("Heights computed", stats.heights_computed),
        ("Blocks defaulted", stats.blocks_defaulted),
    ];
    for (label, count) in rows {
        println!("{}: {}", label.bold(), count);
    }

    println!();
    println!(
        "{}: {} -> {} bytes",
        "Size".bold(),
        html.len(),
        result.content_len()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mailprep".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Mail-safe HTML transcoding tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/mailprep".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::parse_from(["mailprep", "--preset", "strict", "--fragment", "in.html"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.min_font_size_px, 12);
        assert!(!options.wrap_template);
    }

    #[test]
    fn test_min_font_size_overrides_preset() {
        let cli = Cli::parse_from(["mailprep", "convert", "in.html", "--min-font-size", "14"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.min_font_size_px, 14);
    }

    #[test]
    fn test_options_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opts.json");
        fs::write(&path, r#"{"fallback_image_width_px": 300, "wrap_template": false}"#).unwrap();

        let cli = Cli::parse_from([
            "mailprep",
            "--config",
            path.to_str().unwrap(),
            "in.html",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.fallback_image_width_px, 300);
        assert!(!options.wrap_template);
    }

    #[test]
    fn test_convert_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.html");
        let output = dir.path().join("out.html");
        fs::write(&input, "<p style=\"color:white\">Hi</p>").unwrap();

        cmd_convert(&input, Some(&output), &TranscodeOptions::default(), false).unwrap();
        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("color:#000000"));
        assert!(html.starts_with("<!DOCTYPE html"));
    }

    #[test]
    fn test_batch_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let inputs: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("issue{}.html", i));
                fs::write(&path, format!("<font size=\"1\">issue {}</font>", i)).unwrap();
                path
            })
            .collect();

        let options = TranscodeOptions::default().with_template(false);
        cmd_batch(&inputs, Some(&out), &options).unwrap();

        for i in 0..4 {
            let html = fs::read_to_string(out.join(format!("issue{}.html", i))).unwrap();
            assert_eq!(html, format!("<span style=\"font-size:10px\">issue {}</span>", i));
        }
    }

    #[test]
    fn test_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.html");
        fs::write(&good, "<p>ok</p>").unwrap();
        let inputs = vec![good, dir.path().join("notes.txt")];

        let err = cmd_batch(&inputs, Some(&dir.path().join("out")), &TranscodeOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "1 files failed");
        assert!(dir.path().join("out").join("good.html").exists());
    }
}
