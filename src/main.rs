//! bufresize CLI - Buffer-to-Buffer Image Resizer
//!
//! Resizes single files or whole directories to exact dimensions and times the
//! resizer against the `image` crate's own pipeline.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing::{debug, info, warn};

use bufresize::benchmark::{self, BenchmarkReport};
use bufresize::parallel::{discover_files, BatchProcessor, BatchSummary};
use bufresize::processing::formats::{detect_format_from_path, is_supported_output_format};
use bufresize::processing::validate_target;
use bufresize::{init_with_config, Config, Dimensions, FilterType, ImageFormat, ImageResizer, OutputFormat};

/// bufresize - resize encoded images to exact dimensions
#[derive(Parser)]
#[command(
    name = "bufresize",
    version,
    about = "Resize encoded images to exact dimensions",
    long_about = "bufresize decodes an image, resamples it to exactly the requested width and \
                  height, and re-encodes it. JPEG stays JPEG, PNG stays PNG, other inputs \
                  become PNG unless a format is given."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE", global = true, env = "BUFRESIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Options shared by commands that resize
#[derive(clap::Args)]
struct ResizeArgs {
    /// Target size as WIDTHxHEIGHT
    #[arg(short, long, value_name = "WxH", value_parser = parse_dimensions, conflicts_with = "profile")]
    size: Option<Dimensions>,

    /// Take size and settings from a named profile
    #[arg(short, long, value_name = "NAME")]
    profile: Option<String>,

    /// Resampling filter
    #[arg(long, value_enum, value_name = "FILTER")]
    filter: Option<CliFilter>,

    /// Output format
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    format: Option<CliOutputFormat>,

    /// JPEG quality (1-100)
    #[arg(short, long, value_name = "QUALITY")]
    quality: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize a single image file
    Resize {
        /// Input image
        input: PathBuf,
        /// Output image
        output: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Resize every image in a directory in parallel
    Batch {
        /// Input file or directory
        input: PathBuf,
        /// Output directory
        output: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
        /// Process directories recursively
        #[arg(short = 'R', long)]
        recursive: bool,
        /// Number of threads (default: auto-detect)
        #[arg(short, long, value_name = "COUNT")]
        threads: Option<usize>,
        /// Show what would be processed without actually processing
        #[arg(long)]
        dry_run: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Time resizes of an image against the image crate baseline
    Benchmark {
        /// Sample image
        input: PathBuf,
        /// Target sizes (default: 1024x768, 1920x1080, 3000x2000)
        #[arg(short, long = "size", value_name = "WxH", value_parser = parse_dimensions)]
        sizes: Vec<Dimensions>,
        /// Number of iterations per size
        #[arg(short, long, default_value = "10")]
        iterations: u32,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available resize profiles
    Profiles {
        /// Show detailed profile information
        #[arg(long)]
        detailed: bool,
    },
    /// Validate configuration file
    Config {
        /// Configuration file to validate
        file: PathBuf,
    },
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "bufresize.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
    /// Show system information and capabilities
    Info,
}

/// CLI-compatible filter enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFilter {
    Nearest,
    Box,
    Bilinear,
    Hamming,
    CatmullRom,
    Mitchell,
    Lanczos3,
}

impl From<CliFilter> for FilterType {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => FilterType::Nearest,
            CliFilter::Box => FilterType::Box,
            CliFilter::Bilinear => FilterType::Bilinear,
            CliFilter::Hamming => FilterType::Hamming,
            CliFilter::CatmullRom => FilterType::CatmullRom,
            CliFilter::Mitchell => FilterType::Mitchell,
            CliFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// CLI-compatible output format enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliOutputFormat {
    Preserve,
    Jpeg,
    Png,
    Bmp,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Preserve => OutputFormat::Preserve,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Bmp => OutputFormat::Bmp,
        }
    }
}

/// Parse dimension string (e.g., "1920x1080")
fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    s.parse::<Dimensions>().map_err(|e| e.user_message())
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    let mut log_config = config.clone();
    log_config.logging.level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else if cli.config.is_some() {
        config.logging.level.clone()
    } else {
        "warn".to_string()
    };

    if let Err(e) = init_with_config(&log_config) {
        eprintln!("{}: Failed to initialize bufresize: {}",
                 style("Error").red().bold(), e);
        process::exit(1);
    }

    if let Err(e) = run(cli.command, &config, cli.quiet) {
        eprintln!("{}: {:#}", style("Error").red().bold(), e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn run(command: Commands, config: &Config, quiet: bool) -> anyhow::Result<()> {
    match command {
        Commands::Resize { input, output, args } => {
            run_resize(&input, &output, &args, config, quiet)
        }
        Commands::Batch { input, output, args, recursive, threads, dry_run, json } => {
            run_batch(&input, &output, &args, config, BatchOptions {
                recursive: recursive || config.batch.recursive,
                threads: threads.or(config.batch.threads),
                dry_run,
                json,
                quiet,
            })
        }
        Commands::Benchmark { input, sizes, iterations, json } => {
            run_benchmark(&input, sizes, iterations, json, config)
        }
        Commands::Profiles { detailed } => {
            show_profiles(config, detailed);
            Ok(())
        }
        Commands::Config { file } => validate_config_file(&file),
        Commands::ExampleConfig { output, yaml } => generate_example_config(&output, yaml),
        Commands::Info => {
            show_system_info();
            Ok(())
        }
    }
}

/// Create resizer and target size from CLI arguments and configuration
fn build_resizer(args: &ResizeArgs, config: &Config) -> anyhow::Result<(ImageResizer, Dimensions)> {
    let (mut resizer, target) = match (&args.profile, args.size) {
        (Some(name), _) => config.profile_resizer(name)?,
        (None, Some(size)) => (config.resizer(), size),
        (None, None) => bail!("Must specify a target: --size WIDTHxHEIGHT or --profile NAME"),
    };

    if let Some(filter) = args.filter {
        resizer = resizer.filter(filter.into());
    }
    if let Some(format) = args.format {
        resizer = resizer.output_format(format.into());
    }
    if let Some(quality) = args.quality {
        if quality == 0 || quality > 100 {
            bail!("Quality must be between 1 and 100");
        }
        resizer = resizer.quality(quality);
    }

    let target = validate_target(target.width(), target.height(), resizer.resize_limits())?;
    Ok((resizer, target))
}

/// Format implied by an output file name, when it names one we can write
fn format_from_output_path(output: &Path) -> Option<OutputFormat> {
    let extension = output.extension()?.to_str()?;
    if !is_supported_output_format(extension) {
        return None;
    }

    match detect_format_from_path(output).ok()? {
        ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
        ImageFormat::Png => Some(OutputFormat::Png),
        ImageFormat::Bmp => Some(OutputFormat::Bmp),
        _ => None,
    }
}

/// `output`, with its extension replaced when it does not name `format`
fn output_path_matching(output: &Path, format: ImageFormat) -> PathBuf {
    if detect_format_from_path(output).ok() == Some(format) {
        return output.to_path_buf();
    }

    let fixed = output.with_extension(format.extension());
    warn!("{} cannot hold {:?} data, writing {} instead",
          output.display(), format, fixed.display());
    fixed
}

fn run_resize(
    input: &Path,
    output: &Path,
    args: &ResizeArgs,
    config: &Config,
    quiet: bool,
) -> anyhow::Result<()> {
    let (mut resizer, target) = build_resizer(args, config)?;

    if args.format.is_none() {
        if let Some(format) = format_from_output_path(output) {
            debug!("Output format {:?} taken from {}", format, output.display());
            resizer = resizer.output_format(format);
        }
    }

    let data = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let result = resizer
        .resize_detailed(&data, target.width(), target.height())
        .with_context(|| format!("Failed to resize {}", input.display()))?;

    let output = output_path_matching(output, result.format);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, &result.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !quiet {
        println!(
            "{} {} ({}x{} {:?}, {:.1} KB) -> {} ({} {:?}, {:.1} KB) in {:.2}ms",
            style("Resized").green().bold(),
            input.display(),
            result.source.width,
            result.source.height,
            result.source.format,
            result.source.byte_len as f64 / 1024.0,
            output.display(),
            target,
            result.format,
            result.bytes.len() as f64 / 1024.0,
            result.elapsed.as_secs_f64() * 1000.0,
        );
    }

    Ok(())
}

struct BatchOptions {
    recursive: bool,
    threads: Option<usize>,
    dry_run: bool,
    json: bool,
    quiet: bool,
}

fn run_batch(
    input: &Path,
    output: &Path,
    args: &ResizeArgs,
    config: &Config,
    options: BatchOptions,
) -> anyhow::Result<()> {
    let (resizer, target) = build_resizer(args, config)?;

    info!("Starting batch processing");
    info!("Input: {:?}", input);
    info!("Output: {:?}", output);
    info!("Target: {}", target);

    let files = discover_files(input, options.recursive)?;
    if files.is_empty() {
        bail!("No supported image files found in {}", input.display());
    }

    info!("Found {} files to process", files.len());

    if options.dry_run {
        println!("{} files would be processed:", style(files.len()).bold());
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let processor = BatchProcessor::new(resizer, options.threads)?
        .show_progress(!options.json && !options.quiet);
    let summary = processor.process(&files, input, output, target)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !options.quiet {
        print_summary(&summary);
    }

    if summary.processed == 0 {
        bail!("All {} files failed", summary.failed);
    }

    Ok(())
}

/// Print processing summary
fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", style("Processing Summary:").bold());
    println!("  {}: {}", style("Processed").green(), summary.processed);
    if summary.failed > 0 {
        println!("  {}: {}", style("Failed").red(), summary.failed);
        for failure in &summary.failures {
            println!("    {}: {}", failure.path.display(), failure.error);
        }
    }
    println!("  {}: {:.2}s", style("Duration").blue(), summary.elapsed_ms as f64 / 1000.0);

    if summary.processed > 0 {
        println!("  {}: {:.2}MB → {:.2}MB ({:.1}x)",
                 style("Size").cyan(),
                 summary.input_bytes as f64 / 1024.0 / 1024.0,
                 summary.output_bytes as f64 / 1024.0 / 1024.0,
                 summary.compression_ratio());
        println!("  {}: {:.1} files/sec", style("Speed").cyan(), summary.files_per_second());
    }
}

fn run_benchmark(
    input: &Path,
    sizes: Vec<Dimensions>,
    iterations: u32,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let data = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let targets = if sizes.is_empty() {
        benchmark::DEFAULT_TARGETS
            .iter()
            .map(|&(width, height)| Dimensions::new(width, height))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        sizes
    };

    let reports = benchmark::run(&config.resizer(), &data, &targets, iterations)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_benchmark(&reports);
    }

    Ok(())
}

fn print_benchmark(reports: &[BenchmarkReport]) {
    println!("{}", style("Resize benchmark").bold());
    println!();
    println!("  {:<12} {:>11} {:>10} {:>10} {:>10} {:>9} {:>10}",
             "candidate", "size", "mean ms", "min ms", "max ms", "ops/s", "bytes");

    for report in reports {
        println!("  {:<12} {:>11} {:>10.2} {:>10.2} {:>10.2} {:>9.2} {:>10}",
                 report.candidate.label(),
                 format!("{}x{}", report.width, report.height),
                 report.mean.as_secs_f64() * 1000.0,
                 report.min.as_secs_f64() * 1000.0,
                 report.max.as_secs_f64() * 1000.0,
                 report.ops_per_second(),
                 report.output_bytes);
    }
}

/// Show available profiles
fn show_profiles(config: &Config, detailed: bool) {
    println!("{}", style("Available Resize Profiles:").bold());
    println!();

    for name in config.profile_names() {
        println!("{}", style(name).cyan().bold());
        if detailed {
            if let Ok(profile) = config.get_profile(name) {
                println!("  {}", profile.describe());
                println!();
            }
        }
    }

    if !detailed {
        println!();
        println!("Use {} for detailed information", style("--detailed").dim());
    }
}

/// Validate configuration file
fn validate_config_file(file_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(file_path)?;
    config.validate()?;

    println!("{}: Configuration file is valid", style("Success").green().bold());
    println!("Profiles: {}", config.profiles.len());

    Ok(())
}

/// Generate example configuration file
fn generate_example_config(output_path: &Path, use_yaml: bool) -> anyhow::Result<()> {
    let output_path = if use_yaml {
        output_path.with_extension("yaml")
    } else {
        output_path.to_path_buf()
    };

    let config = Config::default();
    config.to_file(&output_path)?;

    let format = if use_yaml { "YAML" } else { "TOML" };
    println!("{}: Generated example {} configuration: {}",
             style("Success").green().bold(),
             format,
             output_path.display());

    Ok(())
}

/// Show system information
fn show_system_info() {
    use sysinfo::{CpuExt, System, SystemExt};

    println!("{}", style("bufresize System Information").bold());
    println!();

    println!("{}: {}", style("Version").bold(), bufresize::VERSION);
    println!();

    let mut system = System::new_all();
    system.refresh_all();

    println!("{}", style("System:").bold());
    if let Some(name) = system.name() {
        println!("  OS: {}", name);
    }
    if let Some(version) = system.os_version() {
        println!("  Version: {}", version);
    }
    println!("  CPUs: {}", system.cpus().len());
    if let Some(cpu) = system.cpus().first() {
        println!("  CPU: {} ({:.2} GHz)", cpu.brand(), cpu.frequency() as f64 / 1000.0);
    }
    println!("  Memory: {:.2} GB total, {:.2} GB available",
             system.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
             system.available_memory() as f64 / 1024.0 / 1024.0 / 1024.0);
    println!();

    println!("{}", style("Supported Formats:").bold());
    println!("  Input: JPEG, PNG, WebP, GIF, TIFF, BMP");
    println!("  Output: JPEG, PNG, BMP (other inputs are written as PNG)");
    println!();

    println!("{}", style("Filters:").bold());
    println!("  nearest, box, bilinear, hamming, catmull-rom, mitchell, lanczos3 (default)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1024x768").unwrap(), Dimensions::new(1024, 768).unwrap());
        assert!(parse_dimensions("0x768").is_err());
        assert!(parse_dimensions("1024").is_err());
    }

    #[test]
    fn test_format_from_output_path() {
        assert_eq!(format_from_output_path(Path::new("out.jpeg")), Some(OutputFormat::Jpeg));
        assert_eq!(format_from_output_path(Path::new("out.PNG")), Some(OutputFormat::Png));
        assert_eq!(format_from_output_path(Path::new("out.webp")), None);
        assert_eq!(format_from_output_path(Path::new("out")), None);
    }

    #[test]
    fn test_output_path_matching() {
        assert_eq!(output_path_matching(Path::new("out.jpeg"), ImageFormat::Jpeg), PathBuf::from("out.jpeg"));
        assert_eq!(output_path_matching(Path::new("out.webp"), ImageFormat::Png), PathBuf::from("out.png"));
        assert_eq!(output_path_matching(Path::new("dir/out.jpg"), ImageFormat::Png), PathBuf::from("dir/out.png"));
        assert_eq!(output_path_matching(Path::new("out"), ImageFormat::Bmp), PathBuf::from("out.bmp"));
    }

    #[test]
    fn test_build_resizer_target_budget() {
        let args = ResizeArgs {
            size: Some(Dimensions::new(32768, 32768).unwrap()),
            profile: None,
            filter: None,
            format: None,
            quality: None,
        };
        assert!(build_resizer(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_resizer_requires_target() {
        let args = ResizeArgs { size: None, profile: None, filter: None, format: None, quality: None };
        assert!(build_resizer(&args, &Config::default()).is_err());

        let args = ResizeArgs { profile: Some("xga".to_string()), quality: Some(70), ..args };
        let (resizer, target) = build_resizer(&args, &Config::default()).unwrap();
        assert_eq!(target, Dimensions::new(1024, 768).unwrap());
        assert_eq!(resizer.settings().quality, 70);
    }
}
