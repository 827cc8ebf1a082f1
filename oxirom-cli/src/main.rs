//! OxiRom CLI - The Oxidized ROM Codec Toolbox
//!
//! A Pure Rust compression utility for the stream formats found in console
//! ROMs: LZ10, LZ11, Huffman, RLE, CRILAYLA, ARCH, and Racjin.

mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use dialoguer::Confirm;
use oxirom_arch::{compress_arch, decompress_arch};
use oxirom_crilayla::{compress_crilayla, decompress_crilayla, format::MAGIC, CrilaylaHeader};
use oxirom_nitro::lzss::{DEFAULT_DISP_EXTRA, DEFAULT_MIN_DISPLACEMENT};
use oxirom_nitro::{
    compress_huffman, compress_lz10, compress_lz11, compress_rle, decompress_huffman,
    decompress_lz10, decompress_lz11, decompress_rle, read_header, write_header, HuffmanBits,
    NitroMethod,
};
use oxirom_racjin::{compress_racjin, decompress_racjin};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use utils::{compressed_path, copy_mtime, create_progress_bar, decompressed_path, savings_percent};

#[derive(Parser)]
#[command(name = "oxirom")]
#[command(
    author,
    version,
    about = "The Oxidized ROM Codec Toolbox - Pure Rust stream compression"
)]
#[command(long_about = "
OxiRom is a Pure Rust implementation of the compression formats found in
console ROMs. Supported formats: LZ10, LZ11, Huffman (4/8-bit), RLE,
CRILAYLA, ARCH, Racjin

Examples:
  oxirom compress -f lz10 font.bin
  oxirom compress -f lz11 --min-disp 2 tiles.bin
  oxirom compress -f crilayla data.bin
  oxirom decompress font.bin.lz10
  oxirom decompress -f arch -e 4096 script.arch
  oxirom info font.bin.lz10
  oxirom info --json font.bin.lz10
  oxirom completions bash
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files into a chosen stream format
    #[command(alias = "c")]
    Compress {
        /// Files to compress
        files: Vec<PathBuf>,

        /// Stream format
        #[arg(short, long, value_enum)]
        format: StreamFormat,

        /// Exclusive displacement floor for lz10/lz11 matches (VRAM-safe streams use 2)
        #[arg(long)]
        min_disp: Option<usize>,

        /// Omit the 4-byte header on lz10/lz11/huff4/huff8/rle streams
        #[arg(long)]
        no_header: bool,

        /// Write outputs into this directory instead of next to the inputs
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Overwrite existing outputs without asking
        #[arg(short = 'F', long)]
        force: bool,

        /// Number of worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Show per-file sizes
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress files, detecting the format where possible
    #[command(alias = "d")]
    Decompress {
        /// Files to decompress
        files: Vec<PathBuf>,

        /// Stream format for headerless streams (detected from the content if omitted)
        #[arg(short, long, value_enum)]
        format: Option<StreamFormat>,

        /// Decompressed length for formats that do not carry one
        #[arg(short = 'e', long)]
        expected_length: Option<usize>,

        /// Additive displacement offset for lz10/lz11 back-references
        #[arg(long)]
        disp_extra: Option<usize>,

        /// Write outputs into this directory instead of next to the inputs
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Overwrite existing outputs without asking
        #[arg(short = 'F', long)]
        force: bool,

        /// Number of worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Show per-file sizes
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a compressed stream
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Stream compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StreamFormat {
    /// LZSS with 2-byte tokens (tag 0x10)
    Lz10,
    /// LZSS with variable-length tokens (tag 0x11)
    Lz11,
    /// Huffman over 4-bit symbols (tag 0x24)
    Huff4,
    /// Huffman over 8-bit symbols (tag 0x28)
    Huff8,
    /// Run-length coding (tag 0x30)
    Rle,
    /// CRI middleware CRILAYLA container
    Crilayla,
    /// ARCH byte-pair substitution blocks
    Arch,
    /// Racjin sequence-cache stream
    Racjin,
}

impl StreamFormat {
    /// File extension appended to compressed outputs.
    fn extension(self) -> &'static str {
        match self {
            Self::Lz10 => "lz10",
            Self::Lz11 => "lz11",
            Self::Huff4 => "huf4",
            Self::Huff8 => "huf8",
            Self::Rle => "rle",
            Self::Crilayla => "cri",
            Self::Arch => "arch",
            Self::Racjin => "rac",
        }
    }

    /// Framed-container method for the BIOS family, `None` otherwise.
    fn nitro_method(self) -> Option<NitroMethod> {
        match self {
            Self::Lz10 => Some(NitroMethod::Lz10),
            Self::Lz11 => Some(NitroMethod::Lz11),
            Self::Huff4 => Some(NitroMethod::Huff4),
            Self::Huff8 => Some(NitroMethod::Huff8),
            Self::Rle => Some(NitroMethod::Rle),
            Self::Crilayla | Self::Arch | Self::Racjin => None,
        }
    }
}

/// Flags shared by the compress and decompress batch drivers.
#[derive(Clone, Copy)]
struct BatchOptions<'a> {
    output_dir: Option<&'a Path>,
    force: bool,
    jobs: Option<usize>,
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            files,
            format,
            min_disp,
            no_header,
            output_dir,
            force,
            jobs,
            verbose,
        } => cmd_compress(
            &files,
            format,
            min_disp,
            no_header,
            BatchOptions {
                output_dir: output_dir.as_deref(),
                force,
                jobs,
                verbose,
            },
        ),
        Commands::Decompress {
            files,
            format,
            expected_length,
            disp_extra,
            output_dir,
            force,
            jobs,
            verbose,
        } => cmd_decompress(
            &files,
            format,
            expected_length,
            disp_extra,
            BatchOptions {
                output_dir: output_dir.as_deref(),
                force,
                jobs,
                verbose,
            },
        ),
        Commands::Info { file, json } => cmd_info(&file, json),
        Commands::Completions { shell } => cmd_completions(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_compress(
    files: &[PathBuf],
    format: StreamFormat,
    min_disp: Option<usize>,
    no_header: bool,
    options: BatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("No files specified".into());
    }
    if min_disp.is_some() && !matches!(format, StreamFormat::Lz10 | StreamFormat::Lz11) {
        return Err("--min-disp only applies to the lz10 and lz11 formats".into());
    }
    if no_header && format.nitro_method().is_none() {
        return Err("--no-header only applies to lz10, lz11, huff4, huff8, and rle".into());
    }

    let min_disp = min_disp.unwrap_or(DEFAULT_MIN_DISPLACEMENT);
    let pairs = select_outputs(files, options.force, |input| {
        compressed_path(input, format.extension(), options.output_dir)
    })?;
    run_batch(&pairs, options.jobs, !options.verbose, |input, output| {
        compress_file(input, output, format, min_disp, no_header, options.verbose)
    })?;
    println!("Compressed {} file(s)", pairs.len());
    Ok(())
}

fn cmd_decompress(
    files: &[PathBuf],
    format: Option<StreamFormat>,
    expected_length: Option<usize>,
    disp_extra: Option<usize>,
    options: BatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("No files specified".into());
    }
    if disp_extra.is_some()
        && !matches!(
            format,
            None | Some(StreamFormat::Lz10) | Some(StreamFormat::Lz11)
        )
    {
        return Err("--disp-extra only applies to the lz10 and lz11 formats".into());
    }

    let pairs = select_outputs(files, options.force, |input| {
        decompressed_path(input, options.output_dir)
    })?;
    run_batch(&pairs, options.jobs, !options.verbose, |input, output| {
        decompress_file(
            input,
            output,
            format,
            expected_length,
            disp_extra,
            options.verbose,
        )
    })?;
    println!("Decompressed {} file(s)", pairs.len());
    Ok(())
}

fn cmd_info(file: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(file)?;
    let report = inspect_stream(file, &data);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", report.file);
    println!("Size: {} bytes", report.size);
    match report.tag {
        Some(tag) => println!("Format: {} (tag 0x{:02X})", report.format, tag),
        None => println!("Format: {}", report.format),
    }
    if let Some(size) = report.decompressed_size {
        println!("Decompressed size: {} bytes", size);
    }
    if let Some(savings) = report.savings_percent {
        println!("Space savings: {:.1}%", savings);
    }
    if !report.supported {
        println!("Note: no codec is available for this stream");
    }
    Ok(())
}

fn cmd_completions(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "oxirom", &mut io::stdout());
    Ok(())
}

/// Stream facts reported by `info`, serializable for `--json`.
#[derive(Serialize)]
struct StreamReport {
    file: String,
    size: u64,
    format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decompressed_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    savings_percent: Option<f64>,
    supported: bool,
}

/// Classify `data` by its header without decompressing the payload.
fn inspect_stream(file: &Path, data: &[u8]) -> StreamReport {
    let file = file.display().to_string();
    let size = data.len() as u64;
    if let Ok(header) = CrilaylaHeader::parse(data) {
        let decompressed = header.output_size();
        return StreamReport {
            file,
            size,
            format: "crilayla".into(),
            tag: None,
            decompressed_size: Some(decompressed as u64),
            savings_percent: Some(savings_percent(decompressed, size as usize)),
            supported: true,
        };
    }
    match read_header(data) {
        Ok((method, decompressed)) => StreamReport {
            file,
            size,
            format: method.name().into(),
            tag: Some(method.tag()),
            decompressed_size: Some(decompressed as u64),
            savings_percent: Some(savings_percent(decompressed, size as usize)),
            supported: method.is_supported(),
        },
        Err(_) => StreamReport {
            file,
            size,
            format: "unknown".into(),
            tag: None,
            decompressed_size: None,
            savings_percent: None,
            supported: false,
        },
    }
}

/// Resolve output paths, asking before overwriting unless `force` is set.
/// Prompting happens before any worker threads start.
fn select_outputs(
    files: &[PathBuf],
    force: bool,
    mut output_for: impl FnMut(&Path) -> PathBuf,
) -> Result<Vec<(PathBuf, PathBuf)>, Box<dyn std::error::Error>> {
    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        let output = output_for(file);
        if output.exists() && !force {
            let overwrite = Confirm::new()
                .with_prompt(format!("{} exists, overwrite?", output.display()))
                .default(false)
                .interact()?;
            if !overwrite {
                println!("Skipping {}", file.display());
                continue;
            }
        }
        selected.push((file.clone(), output));
    }
    Ok(selected)
}

/// Run `work` over input/output pairs on a rayon pool, with a progress bar
/// when more than one file is queued.
fn run_batch<F>(
    pairs: &[(PathBuf, PathBuf)],
    jobs: Option<usize>,
    show_progress: bool,
    work: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Fn(&Path, &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    let progress = create_progress_bar(pairs.len() as u64, show_progress && pairs.len() > 1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .build()?;
    let result = pool.install(|| {
        pairs.par_iter().try_for_each(
            |(input, output)| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                work(input, output)
                    .map_err(|e| format!("{}: {}", input.display(), e))?;
                progress.inc(1);
                Ok(())
            },
        )
    });
    progress.finish_and_clear();
    result.map_err(|e| -> Box<dyn std::error::Error> { e })
}

fn compress_file(
    input: &Path,
    output: &Path,
    format: StreamFormat,
    min_disp: usize,
    no_header: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let data = fs::read(input)?;
    let compressed = encode_stream(&data, format, min_disp, no_header)?;
    fs::write(output, &compressed)?;
    copy_mtime(input, output)?;
    if verbose {
        println!(
            "  {} -> {} ({} -> {} bytes, {:.1}% saved)",
            input.display(),
            output.display(),
            data.len(),
            compressed.len(),
            savings_percent(data.len(), compressed.len())
        );
    }
    Ok(())
}

fn decompress_file(
    input: &Path,
    output: &Path,
    format: Option<StreamFormat>,
    expected_length: Option<usize>,
    disp_extra: Option<usize>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let data = fs::read(input)?;
    let out = decode_stream(&data, format, expected_length, disp_extra)?;
    fs::write(output, &out)?;
    copy_mtime(input, output)?;
    if verbose {
        println!(
            "  {} -> {} ({} -> {} bytes)",
            input.display(),
            output.display(),
            data.len(),
            out.len()
        );
    }
    Ok(())
}

/// Compress `data` into the chosen stream layout.
fn encode_stream(
    data: &[u8],
    format: StreamFormat,
    min_disp: usize,
    no_header: bool,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let payload = match format {
        StreamFormat::Lz10 => compress_lz10(data, min_disp),
        StreamFormat::Lz11 => compress_lz11(data, min_disp),
        StreamFormat::Huff4 => compress_huffman(data, HuffmanBits::Four, true)?,
        StreamFormat::Huff8 => compress_huffman(data, HuffmanBits::Eight, true)?,
        StreamFormat::Rle => compress_rle(data),
        StreamFormat::Crilayla => compress_crilayla(data)?,
        StreamFormat::Arch => compress_arch(data),
        StreamFormat::Racjin => compress_racjin(data),
    };
    match format.nitro_method() {
        Some(method) if !no_header => {
            let header = write_header(method, data.len())?;
            let mut out = Vec::with_capacity(4 + payload.len());
            out.extend_from_slice(&header);
            out.extend_from_slice(&payload);
            Ok(out)
        }
        _ => Ok(payload),
    }
}

/// Decompress one stream, detecting the layout when no format is given.
fn decode_stream(
    data: &[u8],
    format: Option<StreamFormat>,
    expected_length: Option<usize>,
    disp_extra: Option<usize>,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let Some(format) = format else {
        return detect_and_decode(data, disp_extra);
    };
    let extra = disp_extra.unwrap_or(DEFAULT_DISP_EXTRA);
    let need_length = || {
        expected_length.ok_or("--expected-length is required when --format names a headerless stream")
    };
    let out = match format {
        StreamFormat::Crilayla => decompress_crilayla(data)?,
        StreamFormat::Lz10 => decompress_lz10(data, need_length()?, extra)?,
        StreamFormat::Lz11 => decompress_lz11(data, need_length()?, extra)?,
        StreamFormat::Huff4 => decompress_huffman(data, need_length()?, HuffmanBits::Four, true)?,
        StreamFormat::Huff8 => decompress_huffman(data, need_length()?, HuffmanBits::Eight, true)?,
        StreamFormat::Rle => decompress_rle(data, need_length()?)?,
        StreamFormat::Arch => decompress_arch(data, need_length()?)?,
        StreamFormat::Racjin => decompress_racjin(data, need_length()?)?,
    };
    Ok(out)
}

/// Sniff the stream layout: CRILAYLA magic first, then the framed header.
fn detect_and_decode(
    data: &[u8],
    disp_extra: Option<usize>,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    if data.starts_with(MAGIC) {
        return Ok(decompress_crilayla(data)?);
    }
    let Ok((method, size)) = read_header(data) else {
        return Err(
            "cannot detect the stream format; pass --format (and --expected-length for headerless streams)"
                .into(),
        );
    };
    match (method, disp_extra) {
        (NitroMethod::Lz10, Some(extra)) => Ok(decompress_lz10(&data[4..], size, extra)?),
        (NitroMethod::Lz11, Some(extra)) => Ok(decompress_lz11(&data[4..], size, extra)?),
        _ => Ok(oxirom_nitro::decompress(data)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_framed_stream() {
        let data = b"abcabcabcabcabcabc".to_vec();
        let framed = encode_stream(&data, StreamFormat::Lz10, DEFAULT_MIN_DISPLACEMENT, false)
            .unwrap();
        assert_eq!(framed[0], 0x10);
        assert_eq!(framed[1] as usize, data.len());
        assert_eq!(decode_stream(&framed, None, None, None).unwrap(), data);
    }

    #[test]
    fn test_encode_headerless_stream() {
        let data = b"abcabcabcabcabcabc".to_vec();
        let framed = encode_stream(&data, StreamFormat::Lz10, DEFAULT_MIN_DISPLACEMENT, false)
            .unwrap();
        let raw = encode_stream(&data, StreamFormat::Lz10, DEFAULT_MIN_DISPLACEMENT, true)
            .unwrap();
        assert_eq!(raw.as_slice(), &framed[4..]);
        let out = decode_stream(&raw, Some(StreamFormat::Lz10), Some(data.len()), None).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_vram_safe_stream_stays_standard() {
        // A raised displacement floor changes match selection, not the
        // token layout, so the default decoder still applies.
        let data = vec![0x7Eu8; 512];
        let framed = encode_stream(&data, StreamFormat::Lz11, 2, false).unwrap();
        assert_eq!(decode_stream(&framed, None, None, None).unwrap(), data);
    }

    #[test]
    fn test_decode_requires_expected_length() {
        let err = decode_stream(&[0x00, 0x01], Some(StreamFormat::Arch), None, None).unwrap_err();
        assert!(err.to_string().contains("--expected-length"));
    }

    #[test]
    fn test_detect_crilayla() {
        let data = vec![0x5Au8; 0x180];
        let stream = encode_stream(&data, StreamFormat::Crilayla, 0, false).unwrap();
        assert_eq!(decode_stream(&stream, None, None, None).unwrap(), data);
    }

    #[test]
    fn test_detect_unknown_stream() {
        let err = decode_stream(b"\xFFnot a stream", None, None, None).unwrap_err();
        assert!(err.to_string().contains("--format"));
    }

    #[test]
    fn test_inspect_framed_stream() {
        let data = b"inspect me inspect me inspect me".to_vec();
        let framed = encode_stream(&data, StreamFormat::Rle, 0, false).unwrap();
        let report = inspect_stream(Path::new("x.bin.rle"), &framed);
        assert_eq!(report.format, "rle");
        assert_eq!(report.tag, Some(0x30));
        assert_eq!(report.decompressed_size, Some(data.len() as u64));
        assert!(report.supported);
    }

    #[test]
    fn test_inspect_unknown_stream() {
        let report = inspect_stream(Path::new("x.bin"), b"\x99\x01\x02\x03\x04");
        assert_eq!(report.format, "unknown");
        assert_eq!(report.tag, None);
        assert!(!report.supported);
    }
}
