//! Example: Feed a clip through the live analyzer frame by frame
//!
//! Usage: `cargo run --example live_tone [file.wav] [config.toml]`
//!
//! Without a WAV file a short synthetic phrase (low melody plus a plucked
//! pulse at 100 BPM) is analysed instead.

use stratum_live::{
    run_session, AnalysisConfig, AnalysisSink, FrameAnalysis, HarmonyType, LiveAnalyzer,
    ProcessingState, SampleFrameSource,
};

/// ~60 frames per second at 44.1 kHz
const HOP: usize = 735;

/// Prints a line whenever the state, notes or key change
struct ChangePrinter {
    last: Option<(ProcessingState, Vec<String>, Vec<String>, Option<String>)>,
}

impl AnalysisSink for ChangePrinter {
    fn consume(&mut self, analysis: &FrameAnalysis) {
        let key = analysis.key.map(|k| k.key.name());
        let current = (
            analysis.state,
            analysis.harmony.melody_notes.clone(),
            analysis.harmony.chord_notes.clone(),
            key.clone(),
        );
        if self.last.as_ref() == Some(&current) {
            return;
        }

        let harmony = match analysis.harmony.harmony_type {
            HarmonyType::None => String::from("-"),
            _ => format!(
                "{:?} melody={:?} chord={:?}",
                analysis.harmony.harmony_type,
                analysis.harmony.melody_notes,
                analysis.harmony.chord_notes
            ),
        };
        println!(
            "{:>8.0} ms  {:<14} {:>6.1} dB  {:<40} key={:<4} {:>5.1} BPM beat {}",
            analysis.timestamp_ms,
            format!("{:?}", analysis.state),
            analysis.amplitude_db,
            harmony,
            key.unwrap_or_else(|| "-".to_string()),
            analysis.rhythm.tempo_bpm,
            analysis.rhythm.current_beat
        );
        self.last = Some(current);
    }
}

/// Load a WAV file as mono f32
fn load_wav(path: &str) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    // Average channels down to mono
    let channels = spec.channels.max(1) as usize;
    let mono = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok((mono, spec.sample_rate))
}

/// A2-E3 phrase over a plucked pulse
fn synthetic_phrase(sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let notes = [110.0f32, 130.81, 146.83, 164.81, 146.83, 130.81, 110.0, 110.0];
    let note_len = (0.6 * sr) as usize;
    let beat_len = (0.6 * sr) as usize;

    let mut samples = Vec::with_capacity(notes.len() * note_len);
    for (n, freq) in notes.iter().enumerate() {
        for i in 0..note_len {
            let t = (n * note_len + i) as f32 / sr;
            let since_beat = ((n * note_len + i) % beat_len) as f32 / sr;
            let pluck = (-since_beat * 6.0).exp();
            samples.push(0.5 * pluck * (2.0 * std::f32::consts::PI * freq * t).sin());
        }
    }
    samples
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match args.get(2) {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let samples = match args.get(1) {
        Some(path) => {
            let (samples, sample_rate) = load_wav(path)?;
            config.sample_rate = sample_rate;
            println!("Analysing {} ({} samples at {} Hz)", path, samples.len(), sample_rate);
            samples
        }
        None => {
            println!("Analysing synthetic phrase at {} Hz", config.sample_rate);
            synthetic_phrase(config.sample_rate)
        }
    };

    let mut analyzer = LiveAnalyzer::new(config.clone())?;
    let mut source = SampleFrameSource::new(samples, &config, HOP)?;
    let mut sink = ChangePrinter { last: None };

    let start = std::time::Instant::now();
    let frames = run_session(&mut analyzer, &mut source, &mut sink);
    let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;

    println!();
    println!("Frames: {} ({:.3} ms per frame)", frames, elapsed_ms / frames.max(1) as f32);
    match analyzer.current_key() {
        Some(key) => println!("Key: {} (confidence: {:.2})", key.key.name(), key.confidence),
        None => println!("Key: -"),
    }
    println!("Tempo: {:.1} BPM", analyzer.tempo_bpm());

    Ok(())
}
