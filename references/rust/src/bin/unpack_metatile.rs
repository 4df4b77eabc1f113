//! Unpacks every tile of a metatile into `<input>.<slot>.png`.
//!
//! Exit status: 0 on success, 1 when the input cannot be read, 2 on usage
//! errors, 3 when the header cannot be decoded (or a compressed metatile is
//! refused), 4 when any slot failed, and 255 after printing `--help`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use metatile::{
    decode_header, extract_tiles_with, ExtractOptions, FileSink, MagicKind, OffsetBase,
    SinkErrorPolicy, METATILE_HEADER_LENGTH,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: u8 = 0;
const EXIT_READ_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_DECODE_FAILED: u8 = 3;
const EXIT_SLOTS_FAILED: u8 = 4;
const EXIT_HELP: u8 = 255;

#[derive(Debug, Parser)]
#[command(name = "unpack-metatile", version, about = "Extract the tiles bundled in a metatile")]
struct Cli {
    /// Path to the metatile
    input: PathBuf,

    /// Keep extracting after a tile cannot be written
    #[arg(long)]
    keep_going: bool,

    /// Treat index offsets as relative to the start of the file
    #[arg(long)]
    file_relative_offsets: bool,

    /// Refuse METZ metatiles instead of writing their payloads as stored
    #[arg(long)]
    refuse_compressed: bool,

    /// Do not print the decoded header
    #[arg(short, long)]
    quiet: bool,

    /// Log every tile as it is written
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            on_sink_error: if self.keep_going {
                SinkErrorPolicy::Continue
            } else {
                SinkErrorPolicy::Abort
            },
            offset_base: if self.file_relative_offsets {
                OffsetBase::File
            } else {
                OffsetBase::Payload
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // The exit status carries the outcome even if stdout/stderr is gone.
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp => ExitCode::from(EXIT_HELP),
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_READ_FAILED)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the process exit status. `Err` means the input could not be read.
fn run(cli: &Cli) -> Result<u8> {
    let data = read_input(&cli.input)?;
    info!("Got {} bytes of data", data.len());

    let header = match decode_header(&data) {
        Ok(header) => header,
        Err(err) => {
            error!(code = %err.code(), "{err}");
            return Ok(EXIT_DECODE_FAILED);
        }
    };
    info!("Read {METATILE_HEADER_LENGTH} header bytes");

    if !cli.quiet {
        println!("{header}\n");
    }

    match header.magic_kind() {
        MagicKind::Plain => {}
        MagicKind::Compressed if cli.refuse_compressed => {
            error!("{} is compressed (METZ), refusing to extract", cli.input.display());
            return Ok(EXIT_DECODE_FAILED);
        }
        MagicKind::Compressed => warn!("METZ payloads are written as stored, not decompressed"),
        MagicKind::Unrecognized => {
            warn!(magic = %header.magic_str(), "Unrecognized magic, extracting anyway")
        }
    }

    info!("Writing files...");
    let report = extract_tiles_with(
        &data,
        &header,
        &cli.input,
        &mut FileSink,
        cli.extract_options(),
    );
    println!("{report}");

    if report.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_SLOTS_FAILED)
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut file =
        File::open(path).with_context(|| format!("Could not open file: {}", path.display()))?;

    let expected_len = file
        .metadata()
        .ok()
        .and_then(|meta| usize::try_from(meta.len()).ok())
        .unwrap_or(0);
    let mut data = Vec::with_capacity(expected_len);
    if let Err(err) = file.read_to_end(&mut data) {
        return Err(err).with_context(|| {
            format!(
                "Error occurred after reading {} bytes from {}",
                data.len(),
                path.display()
            )
        });
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn defaults_abort_and_use_payload_offsets() {
        let cli = Cli::try_parse_from(["unpack-metatile", "tile.meta"]).expect("parse args");
        assert_eq!(cli.input, PathBuf::from("tile.meta"));
        assert_eq!(cli.extract_options(), ExtractOptions::default());
    }

    #[test]
    fn flags_select_options() {
        let cli = Cli::try_parse_from([
            "unpack-metatile",
            "--keep-going",
            "--file-relative-offsets",
            "tile.meta",
        ])
        .expect("parse args");
        let options = cli.extract_options();
        assert_eq!(options.on_sink_error, SinkErrorPolicy::Continue);
        assert_eq!(options.offset_base, OffsetBase::File);
    }

    #[test]
    fn help_and_missing_input_are_errors() {
        let help = Cli::try_parse_from(["unpack-metatile", "--help"]).expect_err("help");
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let missing = Cli::try_parse_from(["unpack-metatile"]).expect_err("missing input");
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = read_input(&dir.path().join("absent.meta")).expect_err("should fail");
        assert!(err.to_string().starts_with("Could not open file: "));
    }

    #[test]
    fn reads_whole_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("tile.meta");
        std::fs::write(&path, vec![7_u8; 2048]).expect("write input");
        assert_eq!(read_input(&path).expect("read input"), vec![7_u8; 2048]);
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../test/fixtures")
            .join(name)
    }

    fn cli_for(input: &Path, flags: &[&str]) -> Cli {
        let mut args = vec![OsString::from("unpack-metatile"), OsString::from("-q")];
        args.extend(flags.iter().map(OsString::from));
        args.push(input.as_os_str().to_owned());
        Cli::try_parse_from(args).expect("parse args")
    }

    fn input_with(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).expect("write input");
        path
    }

    #[test]
    fn sample_extracts_with_success_status() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let bytes = std::fs::read(fixture("sample.meta")).expect("read sample fixture");
        let input = input_with(dir.path(), "sample.meta", &bytes);

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_SUCCESS);
        assert_eq!(
            std::fs::read(dir.path().join("sample.meta.1.png")).expect("read tile"),
            vec![0xbb; 3]
        );
    }

    #[test]
    fn truncated_input_is_a_decode_failure() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = input_with(dir.path(), "short.meta", &[0; METATILE_HEADER_LENGTH - 1]);

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_DECODE_FAILED);
    }

    #[test]
    fn compressed_input_is_refused_only_on_request() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let bytes =
            std::fs::read(fixture("sample-compressed.meta")).expect("read compressed fixture");
        let input = input_with(dir.path(), "sample.metz", &bytes);

        let refused = run(&cli_for(&input, &["--refuse-compressed"])).expect("run");
        assert_eq!(refused, EXIT_DECODE_FAILED);
        assert!(!dir.path().join("sample.metz.0.png").exists());

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_SUCCESS);
        assert!(dir.path().join("sample.metz.0.png").exists());
    }

    #[test]
    fn out_of_range_slot_fails_the_run() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut bytes = std::fs::read(fixture("sample.meta")).expect("read sample fixture");
        // Drops the last payload byte, which slot 2 points at.
        bytes.pop();
        let input = input_with(dir.path(), "short-payload.meta", &bytes);

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_SLOTS_FAILED);
        assert!(dir.path().join("short-payload.meta.1.png").exists());
        assert!(!dir.path().join("short-payload.meta.2.png").exists());
    }

    #[test]
    fn count_beyond_index_fails_the_run() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut bytes = std::fs::read(fixture("sample.meta")).expect("read sample fixture");
        bytes[4..8].copy_from_slice(&100_i32.to_le_bytes());
        let input = input_with(dir.path(), "big-count.meta", &bytes);

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_SLOTS_FAILED);
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("absent.meta");

        assert!(run(&cli_for(&input, &[])).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_input_path_is_extracted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join(OsStr::from_bytes(b"b\xff.meta"));
        std::fs::copy(fixture("sample.meta"), &input).expect("copy fixture");

        assert_eq!(run(&cli_for(&input, &[])).expect("run"), EXIT_SUCCESS);
        for (slot, expected) in [vec![0xaa; 2], vec![0xbb; 3], vec![0xcc; 1]]
            .into_iter()
            .enumerate()
        {
            let mut name = b"b\xff.meta.".to_vec();
            name.extend_from_slice(format!("{slot}.png").as_bytes());
            let tile = dir.path().join(OsStr::from_bytes(&name));
            assert_eq!(std::fs::read(&tile).expect("read extracted tile"), expected);
        }
    }
}
