use clap::Parser;
use ffmpeg_transcode::ffmpeg::FfmpegBackend;
use ffmpeg_transcode::{TranscodeError, TranscodeJob, TranscodeStats, transcode};

use crate::cli::Args;
use crate::config::{FileConfig, Settings};

mod cli;
mod config;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .filter_module("ffmpeg_transcode", level)
        .parse_default_env()
        .init();
}

fn run(args: &Args) -> anyhow::Result<TranscodeStats> {
    ffmpeg_transcode::init()?;

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, args)?;

    let mut backend = FfmpegBackend::new().with_input_options(settings.input_options);
    if let Some(format) = &settings.format {
        backend = backend.with_input_format(format);
    }

    let codec = settings.profile.codec.clone();
    let mut job = TranscodeJob::new(&args.input, &args.output, &codec, settings.profile);
    job.kind = settings.kind;
    job.preferred_stream = settings.stream;
    job.mux_options = settings.mux.to_options();

    Ok(transcode(&backend, &job)?)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match run(&args) {
        Ok(stats) => {
            log::info!(
                "{} -> {}: {} frames in, {} packets out",
                args.input.display(),
                args.output.display(),
                stats.frames_decoded,
                stats.packets_written
            );
            0
        }
        Err(e) => {
            log::error!("{:#}", e);
            e.downcast_ref::<TranscodeError>()
                .map_or(1, TranscodeError::exit_code)
        }
    };
    std::process::exit(code);
}
