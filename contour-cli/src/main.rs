//! Command-line front end for the pitch-contour analyzer.
//!
//! Presentation only: decoding, analysis, note mapping and playback all
//! live in `contour-core`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use contour_core::audio::BufferRenderSink;
use contour_core::playback::spawn_ticker;
use contour_core::store::RecordingStore;
use contour_core::{
    AnalysisConfig, PitchContour, PlaybackCursor, PlaybackState, SystemClock, YinEstimator, analyze,
    decode, live::LiveSession, note,
};

#[derive(Parser, Debug)]
#[command(name = "contour", about = "Pitch contour analysis for audio recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a recording and print its pitch contour summary
    Analyze {
        /// Input audio file (WAV, MP3, FLAC, OGG)
        input: PathBuf,

        /// Dump the full contour as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Disable the 5 kHz low-pass pre-filter
        #[arg(long)]
        no_lowpass: bool,
    },
    /// Play a recording while printing the pitch at the playback cursor
    Play {
        /// Input audio file
        input: PathBuf,

        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
    },
    /// Monitor the microphone and print live frequency and note readings
    Live,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Analyze {
            input,
            json,
            no_lowpass,
        } => run_analyze(&input, json, no_lowpass),
        Command::Play { input, from } => run_play(&input, from),
        Command::Live => run_live(),
    }
}

fn run_analyze(input: &PathBuf, json: bool, no_lowpass: bool) -> Result<()> {
    let mut config = AnalysisConfig::default();
    if no_lowpass {
        config.lowpass_cutoff_hz = None;
    }

    let (_store, _id, contour) = load_and_analyze(input, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&contour)?);
    } else {
        print_summary(&contour);
    }
    Ok(())
}

fn run_play(input: &PathBuf, from: f64) -> Result<()> {
    let (store, id, contour) = load_and_analyze(input, &AnalysisConfig::default())?;
    let recording = store.get(id).expect("recording was just created");

    // Playback renders the original buffer; the analysis copy was the only
    // thing low-pass filtered.
    let sink = BufferRenderSink::new(Arc::clone(&recording.samples), recording.sample_rate);
    let mut cursor = PlaybackCursor::new(SystemClock::default(), Some(Box::new(sink)));
    cursor.load(contour.duration_secs);
    cursor.seek(from)?;
    cursor.play(None)?;

    let cursor = Arc::new(Mutex::new(cursor));
    let ticker = spawn_ticker(Arc::clone(&cursor), Duration::from_millis(30));

    loop {
        std::thread::sleep(Duration::from_millis(100));
        let mut cursor = cursor.lock().expect("cursor lock");
        if cursor.state() == PlaybackState::Stopped {
            break;
        }
        let time = cursor.current_time_secs();
        match cursor.current_measurement(&contour) {
            Some(m) if m.has_pitch() => {
                let label = note::note_label(m.frequency_hz).unwrap_or_default();
                println!("{time:6.2}s  {:7.1} Hz  {label}", m.frequency_hz);
            }
            _ => println!("{time:6.2}s      --"),
        }
    }

    ticker.cancel();
    Ok(())
}

fn run_live() -> Result<()> {
    let session = LiveSession::start(&AnalysisConfig::default(), Box::new(YinEstimator::default()))
        .context("could not start live monitoring")?;
    log::info!("listening at {} Hz; press Ctrl+C to stop", session.sample_rate());

    loop {
        if let Some(reading) = session.next_reading(Duration::from_millis(500)) {
            match reading.note {
                Some(label) => println!("{:7.1} Hz  {label}", reading.frequency_hz),
                None => println!("     --"),
            }
        }
    }
}

/// Decodes `input` into a fresh store entry and analyzes it.
fn load_and_analyze(
    input: &PathBuf,
    config: &AnalysisConfig,
) -> Result<(RecordingStore, u64, PitchContour)> {
    let audio = decode::decode_file(input)
        .with_context(|| format!("cannot analyze {}", input.display()))?;
    let sample_rate = audio.sample_rate;

    let mut store = RecordingStore::new();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let id = store.create(name, audio.samples, sample_rate);
    let recording = store.get(id).expect("recording was just created");

    let contour = analyze(&recording.samples, sample_rate, config)?;
    Ok((store, id, contour))
}

fn print_summary(contour: &PitchContour) {
    let s = &contour.summary;
    println!("frames:   {} ({} pitched)", contour.measurements.len(), contour.pitched_frames());
    println!("duration: {:.2}s", contour.duration_secs);
    println!("min:      {:.1} Hz ({})", s.min_hz, label_or_dash(s.min_hz));
    println!("max:      {:.1} Hz ({})", s.max_hz, label_or_dash(s.max_hz));
    println!("avg:      {:.1} Hz ({})", s.avg_hz, label_or_dash(s.avg_hz));
}

fn label_or_dash(freq: f32) -> String {
    note::note_label(freq).unwrap_or_else(|| "--".to_string())
}
