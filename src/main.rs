use subsync::player::{IncomingFile, ManualClock, Player, Renderer, UploadSlot};
use subsync::{format_time, format_timestamp, CaptionTrack};

use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser as ClapParser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Follow SRT subtitles along an audio recording")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The SRT file to read. Use '-' to read the subtitles from standard input."
    )]
    subtitles: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The audio file the subtitles belong to. Required for --at and --step."
    )]
    audio: Option<String>,
    #[arg(
        long,
        value_name = "MIME",
        help = "MIME type of the audio file. Guessed from its extension if not supplied."
    )]
    audio_type: Option<String>,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Seek to the given position and show the active subtitle. May be repeated."
    )]
    at: Vec<f64>,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Play from the start, advancing the clock in steps of this size, and show every subtitle change."
    )]
    step: Option<f64>,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Length of the recording. Defaults to the end of the last subtitle."
    )]
    duration: Option<f64>,
    #[arg(short, long, help = "List every subtitle with its timing.")]
    list: bool,
    #[arg(short, long, help = "Report subtitle blocks that could not be read.")]
    diagnostics: bool,
    #[arg(short, long, help = "Log what is going on to standard error.")]
    verbose: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut player = Player::new(ManualClock::new());

    let subtitles = read_subtitles(&cli.subtitles)?;
    player
        .upload(UploadSlot::Subtitles, subtitles)
        .context("Failed to load subtitles")?;

    if let Some(duration) = cli.duration {
        if !(duration.is_finite() && duration >= 0.0) {
            bail!("--duration must be a non-negative number of seconds, got {}", duration);
        }
    }
    let length = cli
        .duration
        .or_else(|| player.track().and_then(CaptionTrack::end_time))
        .unwrap_or(0.0);
    player.playback_mut().set_duration(length);

    if let Some(path) = &cli.audio {
        let audio = read_audio(path, cli.audio_type.as_deref())?;
        if let Err(err) = player.upload(UploadSlot::Audio, audio) {
            warn!("{}", err);
        }
        player.loaded_metadata();
    }

    let loaded = player
        .subtitles()
        .ok_or_else(|| anyhow!("No subtitle file loaded"))?;
    println!("{} subtitles loaded", loaded.track().len());

    if cli.diagnostics {
        for diagnostic in loaded.diagnostics() {
            println!("{}", diagnostic);
        }
    }

    if cli.list {
        for entry in loaded.track() {
            let seq = entry
                .sequence_number
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            println!(
                "{:>4}  {} --> {}",
                seq,
                format_timestamp(entry.start_time),
                format_timestamp(entry.end_time)
            );
            for line in entry.lines() {
                println!("      {}", line);
            }
        }
    }

    if cli.at.is_empty() && cli.step.is_none() {
        return Ok(());
    }
    if !player.is_ready() {
        bail!("--at and --step need an audio file (--audio)");
    }

    let mut out = LineRenderer;

    for &time in &cli.at {
        if !(time.is_finite() && time >= 0.0) {
            bail!("--at must be a non-negative number of seconds, got {}", time);
        }
        player.seek(time)?;
        print_position(&player);
        player.render(&mut out);
    }

    if let Some(step) = cli.step {
        if !(step.is_finite() && step > 0.0) {
            bail!("--step must be a positive number of seconds, got {}", step);
        }
        player.seek(0.0)?;
        print_position(&player);
        player.render(&mut out);

        player.toggle_play()?;
        loop {
            let playing = player.playback_mut().advance(step);
            if player.time_update() {
                print_position(&player);
                player.render(&mut out);
            }
            if !playing {
                player.on_pause();
                break;
            }
        }
        println!(
            "{} / {}",
            format_time(player.current_time()),
            format_time(player.duration())
        );
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_subtitles(input: &str) -> Result<IncomingFile> {
    let (name, data) = if input == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        ("stdin.srt".to_string(), buffer)
    } else {
        let data = std::fs::read(input)
            .context(format!("Failed to open subtitle file: '{}'", input))?;
        (file_name(input), data)
    };
    Ok(IncomingFile::new(name, "application/x-subrip", data))
}

fn read_audio(path: &str, mime_type: Option<&str>) -> Result<IncomingFile> {
    let data =
        std::fs::read(path).context(format!("Failed to open audio file: '{}'", path))?;
    let mime_type = mime_type.unwrap_or_else(|| audio_mime_type(Path::new(path)));
    Ok(IncomingFile::new(file_name(path), mime_type, data))
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

fn audio_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("weba") => "audio/webm",
        _ => "application/octet-stream",
    }
}

fn print_position(player: &Player<ManualClock>) {
    print!("{:>7}  ", format_time(player.current_time()));
}

/// Prints the active cue on the current line, multi-line text joined by `/`.
struct LineRenderer;

impl Renderer for LineRenderer {
    fn render(&mut self, track: &CaptionTrack, active: Option<usize>) {
        match active.and_then(|i| track.get(i).map(|entry| (i, entry))) {
            Some((i, entry)) => {
                let text: Vec<&str> = entry.lines().collect();
                println!("[{}/{}] {}", i + 1, track.len(), text.join(" / "));
            }
            None => println!("-"),
        }
    }
}
