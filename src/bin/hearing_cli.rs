use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hearing_check::analysis::{channel_peak, dominant_frequency, interpret, summarize};
use hearing_check::audio::{
    generate, write_wav, AudioSink, ChannelMask, MemorySink, ToneSpec, WavSink, STIMULUS_CHANNELS,
};
use hearing_check::session::{Ear, HearingLevel, PanSource, RandomPan, ScriptedPan};
use hearing_check::{init_logging, AppConfig, AppContext, StepOutcome, TestResult};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "hearing_cli", about = "Hearing self-test driver and stimulus tools")]
struct Cli {
    /// JSON configuration file (defaults to assets/hearing_config.json;
    /// built-in values fill missing keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log session events to stderr (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the descending frequency sweep
    Frequency(FrequencyArgs),
    /// Run the left/right discrimination test
    Stereo(StereoArgs),
    /// Write a single stimulus to a WAV file
    Render(RenderArgs),
    /// Report the dominant frequency of each channel of a WAV file
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
struct PlaybackArgs {
    /// Where stimuli go
    #[arg(long, value_enum, default_value_t = SinkKind::Cpal)]
    sink: SinkKind,
    /// Directory for `--sink wav` output
    #[arg(long, default_value = "hearing-stimuli")]
    wav_dir: PathBuf,
    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SinkKind {
    /// Default output device
    Cpal,
    /// Numbered WAV files
    Wav,
    /// Discard audio
    None,
}

#[derive(Args, Debug)]
struct FrequencyArgs {
    /// Scripted ratings, one per tone (n/f/c or 0/1/2). Prompts on stdin if absent.
    #[arg(long, value_delimiter = ',')]
    responses: Option<Vec<HearingLevel>>,
    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Args, Debug)]
struct StereoArgs {
    /// Scripted answers, one per trial (l/r). Prompts on stdin if absent.
    #[arg(long, value_delimiter = ',')]
    answers: Option<Vec<Ear>>,
    /// Seed for the channel coin flips
    #[arg(long, conflicts_with = "pans")]
    seed: Option<u64>,
    /// Fixed channel sequence (l/r), repeated if shorter than the run
    #[arg(long, value_delimiter = ',')]
    pans: Option<Vec<Ear>>,
    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long, default_value_t = 1000)]
    frequency: u32,
    #[arg(long, default_value_t = 1000)]
    duration_ms: u32,
    #[arg(long, default_value_t = 0.3)]
    amplitude: f64,
    /// left, right or both
    #[arg(long, default_value = "both", value_parser = parse_channel)]
    channel: ChannelMask,
    /// Overrides the configured sample rate
    #[arg(long)]
    sample_rate: Option<u32>,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    input: PathBuf,
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(log_level(cli.verbose, cli.quiet));

    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Command::Frequency(args) => run_frequency(config, args),
        Command::Stereo(args) => run_stereo(config, args),
        Command::Render(args) => run_render(&config, args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn log_level(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    }
}

fn run_frequency(config: AppConfig, args: FrequencyArgs) -> Result<ExitCode> {
    let sink = open_sink(&args.playback, "sweep")?;
    let mut ctx = AppContext::new(config, sink);

    let mut current = ctx.start_frequency_test()?;
    let mut scripted = args.responses.map(Vec::into_iter);

    let result = loop {
        let level = match scripted.as_mut() {
            Some(responses) => match responses.next() {
                Some(level) => level,
                None => {
                    ctx.abandon();
                    bail!("ran out of scripted responses before the sweep finished");
                }
            },
            None => {
                let progress = ctx.progress().map(|p| p.to_string()).unwrap_or_default();
                let prompt = format!(
                    "[{}] {} Hz - (c)lear, (f)aint, (n)ot heard, re(p)lay, (q)uit: ",
                    progress,
                    current.frequency_hz()
                );
                match prompt_line(&prompt)? {
                    Prompt::Answer(line) => match line.parse::<HearingLevel>() {
                        Ok(level) => level,
                        Err(err) => {
                            eprintln!("{err}");
                            continue;
                        }
                    },
                    Prompt::Replay => {
                        ctx.replay()?;
                        continue;
                    }
                    Prompt::Quit => {
                        ctx.abandon();
                        eprintln!("Test abandoned");
                        return Ok(ExitCode::from(1));
                    }
                }
            }
        };

        match ctx.respond_frequency(level)? {
            StepOutcome::Next(spec) => current = spec,
            StepOutcome::Completed(result) => break result,
        }
    };

    warn_unused(scripted.map(|rest| rest.count()).unwrap_or(0));
    report_playback(&ctx);
    emit_result(&result, args.playback.json)?;
    Ok(ExitCode::SUCCESS)
}

fn run_stereo(config: AppConfig, args: StereoArgs) -> Result<ExitCode> {
    let sink = open_sink(&args.playback, "stereo")?;
    let pans = args.pans.clone();
    let seed = args.seed;
    let mut ctx = AppContext::new(config, sink).with_pan_factory(move || -> Box<dyn PanSource> {
        match (&pans, seed) {
            (Some(pans), _) => Box::new(ScriptedPan::new(
                pans.iter().map(|ear| ear.is_left()).collect(),
            )),
            (None, Some(seed)) => Box::new(RandomPan::seeded(seed)),
            (None, None) => Box::new(RandomPan::new()),
        }
    });

    ctx.start_stereo_test()?;
    let mut scripted = args.answers.map(Vec::into_iter);

    let result = loop {
        let ear = match scripted.as_mut() {
            Some(answers) => match answers.next() {
                Some(ear) => ear,
                None => {
                    ctx.abandon();
                    bail!("ran out of scripted answers before the trials finished");
                }
            },
            None => {
                let progress = ctx.progress().map(|p| p.to_string()).unwrap_or_default();
                let prompt = format!(
                    "[{}] Which side? (l)eft, (r)ight, re(p)lay, (q)uit: ",
                    progress
                );
                match prompt_line(&prompt)? {
                    Prompt::Answer(line) => match line.parse::<Ear>() {
                        Ok(ear) => ear,
                        Err(err) => {
                            eprintln!("{err}");
                            continue;
                        }
                    },
                    Prompt::Replay => {
                        ctx.replay()?;
                        continue;
                    }
                    Prompt::Quit => {
                        ctx.abandon();
                        eprintln!("Test abandoned");
                        return Ok(ExitCode::from(1));
                    }
                }
            }
        };

        if let StepOutcome::Completed(result) = ctx.answer_stereo(ear)? {
            break result;
        }
    };

    warn_unused(scripted.map(|rest| rest.count()).unwrap_or(0));
    report_playback(&ctx);
    emit_result(&result, args.playback.json)?;
    Ok(ExitCode::SUCCESS)
}

fn run_render(config: &AppConfig, args: RenderArgs) -> Result<ExitCode> {
    let sample_rate = args.sample_rate.unwrap_or(config.audio.sample_rate_hz);
    let spec = ToneSpec::new(
        args.frequency,
        args.duration_ms,
        sample_rate,
        args.amplitude,
        args.channel,
    )?;

    let samples = generate(&spec);
    write_wav(&args.output, &samples, sample_rate)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} frames ({} Hz, {:?}) to {}",
        spec.frame_count(),
        spec.frequency_hz(),
        spec.channel(),
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Serialize)]
struct ChannelReport {
    channel: &'static str,
    dominant_frequency_hz: Option<f32>,
    peak: i16,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    sample_rate: u32,
    frames: usize,
    channels: Vec<ChannelReport>,
}

fn run_inspect(args: InspectArgs) -> Result<ExitCode> {
    let report = inspect_wav(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: {} frames at {} Hz",
            args.input.display(),
            report.frames,
            report.sample_rate
        );
        for channel in &report.channels {
            match channel.dominant_frequency_hz {
                Some(hz) => println!(
                    "  {:<5} {:>8.1} Hz (peak {})",
                    channel.channel, hz, channel.peak
                ),
                None => println!("  {:<5}   silent", channel.channel),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn inspect_wav(path: &Path) -> Result<InspectReport> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != STIMULUS_CHANNELS
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        bail!(
            "{} is not 16-bit stereo PCM ({} ch, {} bit)",
            path.display(),
            spec.channels,
            spec.bits_per_sample
        );
    }

    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading samples from {}", path.display()))?;

    let channels = ["left", "right"]
        .iter()
        .enumerate()
        .map(|(index, &name)| ChannelReport {
            channel: name,
            dominant_frequency_hz: dominant_frequency(&samples, spec.sample_rate, index),
            peak: channel_peak(&samples, index),
        })
        .collect();

    Ok(InspectReport {
        sample_rate: spec.sample_rate,
        frames: samples.len() / STIMULUS_CHANNELS as usize,
        channels,
    })
}

fn open_sink(args: &PlaybackArgs, prefix: &str) -> Result<Box<dyn AudioSink>> {
    let sink: Box<dyn AudioSink> = match args.sink {
        SinkKind::None => Box::new(MemorySink::new()),
        SinkKind::Wav => Box::new(
            WavSink::new(&args.wav_dir, prefix)
                .with_context(|| format!("creating {}", args.wav_dir.display()))?,
        ),
        SinkKind::Cpal => cpal_sink()?,
    };
    Ok(sink)
}

#[cfg(not(target_os = "android"))]
fn cpal_sink() -> Result<Box<dyn AudioSink>> {
    Ok(Box::new(hearing_check::audio::CpalSink::new()))
}

#[cfg(target_os = "android")]
fn cpal_sink() -> Result<Box<dyn AudioSink>> {
    bail!("cpal playback is not available on this platform; use --sink wav or --sink none")
}

enum Prompt {
    Answer(String),
    Replay,
    Quit,
}

fn prompt_line(prompt: &str) -> Result<Prompt> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(Prompt::Quit);
    }

    Ok(match line.trim().to_ascii_lowercase().as_str() {
        "p" | "replay" => Prompt::Replay,
        "q" | "quit" => Prompt::Quit,
        other => Prompt::Answer(other.to_string()),
    })
}

fn parse_channel(value: &str) -> Result<ChannelMask, String> {
    match value.to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(ChannelMask::Left),
        "right" | "r" => Ok(ChannelMask::Right),
        "both" | "b" => Ok(ChannelMask::Both),
        other => Err(format!("unknown channel '{other}' (expected left, right or both)")),
    }
}

fn warn_unused(remaining: usize) {
    if remaining > 0 {
        tracing::warn!("Ignored {} scripted inputs after the test completed", remaining);
    }
}

fn report_playback<S: AudioSink>(ctx: &AppContext<S>) {
    if let Some(err) = ctx.last_playback_error() {
        eprintln!("Warning: audio playback failed: {err}");
    }
}

#[derive(Serialize)]
struct ResultPayload<'a> {
    #[serde(flatten)]
    result: &'a TestResult,
    summary: &'static str,
}

fn emit_result(result: &TestResult, json: bool) -> Result<()> {
    if json {
        let payload = ResultPayload {
            result,
            summary: interpret(result),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", result.kind().display_name());
        println!("{}", summarize(result));
    }
    Ok(())
}
