use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::fs;
use std::process::ExitCode;

use pdf_compressor::cli::{Args, Mode};
use pdf_compressor::compress::StatusLine;
use pdf_compressor::config::Settings;
use pdf_compressor::output::{prepare_output_dir, resolve_output_path};
use pdf_compressor::pipeline::{compress_file, CompressionSummary, ModeReport};
use pdf_compressor::render::{PdfiumBackend, RasterBackend};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn main() -> ExitCode {
    // Usage errors exit with 1 like every other rejected input
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let settings = match Settings::from_args(&args) {
        Ok(settings) => settings,
        Err(e) => {
            println!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_header(&settings);

    match run(&settings) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("\n{}", "!".repeat(60));
            println!("Compression Failed.");
            println!("  - Reason: {:#}", e);
            println!("{}", "!".repeat(60));
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<CompressionSummary> {
    if prepare_output_dir(&settings.output_dir)? {
        println!(
            "INFO: Created output directory: {}",
            settings.output_dir.display()
        );
    }
    let output_path = resolve_output_path(
        &settings.input,
        &settings.output_dir,
        &settings.profile_label,
        settings.quality,
    );
    log::info!("Writing to {}", output_path.display());

    let original_size = fs::metadata(&settings.input)
        .with_context(|| format!("Failed to read input file: {}", settings.input.display()))?
        .len();
    println!("Original file size: {:.2} MB", megabytes(original_size));

    // Pdfium is only needed (and only required to be installed) for aggressive mode
    let backend = match settings.mode {
        Mode::Smart => {
            println!("Running in Smart mode (preserving text)...");
            None
        }
        Mode::Aggressive => {
            println!("Running in Aggressive mode (image conversion)...");
            Some(PdfiumBackend::bind()?)
        }
    };
    let raster = backend.as_ref().map(|b| b as &dyn RasterBackend);

    let summary = compress_file(settings, &output_path, raster, &mut StatusLine::default())
        .with_context(|| format!("Failed to compress {}", settings.input.display()))?;

    if let ModeReport::Smart(report) = &summary.report {
        for skipped in &report.skipped {
            log::info!(
                "Left {} on page {} unchanged: {}",
                skipped.image,
                skipped.page,
                skipped.reason
            );
        }
        println!(
            "\nINFO: Re-compressed {} out of {} total images.",
            report.recompressed, report.total
        );
    }

    Ok(summary)
}

fn print_header(settings: &Settings) {
    let input_name = settings
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!("{}", "-".repeat(60));
    println!("PDF Compressor Initialized");
    println!("  - Input File:   {}", input_name);
    println!("  - Mode:         {}", capitalize(settings.mode.as_str()));
    println!("  - Profile:      {}", capitalize(&settings.profile_label));
    println!("  - Quality:      {}", settings.quality);
    println!("  - Output Dir:   {}", settings.output_dir.display());
    println!("{}", "-".repeat(60));
}

fn print_summary(summary: &CompressionSummary) {
    println!("\n{}", "=".repeat(60));
    println!("Compression Successful!");
    println!("  - Output File:    {}", summary.output_path.display());
    println!(
        "  - New Size:       {:.2} MB",
        megabytes(summary.compressed_size)
    );
    println!("  - Size Reduction: {:.1}%", summary.reduction_percent());
    println!(
        "  - Duration:       {:.2} seconds",
        summary.duration.as_secs_f64()
    );
    println!("{}", "=".repeat(60));
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
