use std::io::{BufRead, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parlo_coach::session::CaptureSource;
use parlo_coach::voice::{AudioCapture, AudioPlayback, SpeechSynthesizer};
use parlo_coach::{
    AnalysisClient, Config, SessionController, SessionState, SpeechOutput, TerminalRenderer,
};

/// Scenarios offered by the interactive picker
const SCENARIOS: &[&str] = &["Free Talk", "Cafe", "Job Interview", "Supermarket", "Doctor"];

/// Parlo - spoken-language practice coach
#[derive(Parser)]
#[command(name = "parlo", version, about)]
struct Cli {
    /// Scenario label for the practice turn (e.g. "Cafe")
    #[arg(short, long, env = "PARLO_SCENARIO")]
    scenario: Option<String>,

    /// Skip spoken playback of the coach's response
    #[arg(long)]
    no_playback: bool,

    /// Run a single turn and exit
    #[arg(long)]
    once: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Synthesize and play a phrase through the configured voice
    Say {
        /// Text to speak
        #[arg(default_value = "Dag! Dit is een test van de spraakweergave.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,parlo_coach=info",
        1 => "info,parlo_coach=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(mut cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command.take() {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::Say { text } => say(&text).await,
        };
    }

    run_practice(cli).await
}

/// Interactive practice loop: one session per turn
#[allow(clippy::future_not_send)]
async fn run_practice(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if let Some(scenario) = cli.scenario {
        config.scenario = scenario;
    } else if std::io::stdin().is_terminal() {
        config.scenario = pick_scenario(&config.scenario)?;
    }
    if cli.no_playback {
        config.playback_enabled = false;
    }

    tracing::debug!(?config, "loaded configuration");

    let capture = AudioCapture::new();
    let analyzer = AnalysisClient::new(&config.service_url, config.request_timeout)?;
    let renderer = TerminalRenderer::new();

    let mut controller = SessionController::new(
        Box::new(capture),
        Box::new(analyzer),
        Box::new(renderer),
        config.scenario.clone(),
    );

    if config.playback_enabled {
        match SpeechSynthesizer::new(&config.service_url, &config.locale_tags).await {
            Ok(speech) => controller = controller.with_speech(Box::new(speech)),
            Err(e) => tracing::warn!(error = %e, "playback unavailable, continuing without"),
        }
    }

    println!("Scenario: {}", config.scenario);
    println!("Press Enter to record, Enter again to analyze. Ctrl-D quits.");

    loop {
        prompt("\n[Enter] to record... ")?;
        if !wait_for_enter() {
            break;
        }

        if controller.start_turn() != SessionState::Capturing {
            // The failure has been rendered; an unsupported platform won't
            // get better by retrying.
            controller.reset();
            if !controller.capture_supported() {
                anyhow::bail!("audio capture unavailable");
            }
            continue;
        }

        prompt("Speak now. [Enter] to analyze... ")?;
        if !wait_for_enter() {
            controller.cancel_turn();
            break;
        }

        print!("Analyzing...");
        std::io::stdout().flush()?;
        controller.finish_turn().await;
        controller.reset();

        if cli.once {
            break;
        }
    }

    Ok(())
}

/// Let the user pick a scenario; `current` preselects the matching entry
fn pick_scenario(current: &str) -> anyhow::Result<String> {
    let default = SCENARIOS.iter().position(|s| *s == current).unwrap_or(0);

    let index = dialoguer::Select::new()
        .with_prompt("Scenario")
        .items(SCENARIOS)
        .default(default)
        .interact()?;

    Ok(SCENARIOS[index].to_string())
}

/// Print without a trailing newline and flush
fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

/// Block until the user presses Enter; false on EOF
fn wait_for_enter() -> bool {
    let mut line = String::new();
    matches!(std::io::stdin().lock().read_line(&mut line), Ok(n) if n > 0)
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new();
    if !capture.is_supported() {
        anyhow::bail!("no usable audio input device");
    }
    capture.begin()?;

    println!("Sample rate: {} Hz", parlo_coach::voice::SAMPLE_RATE);
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        capture.clear_buffer();
    }

    capture.cancel();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    let sample_rate = 24_000_u32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(samples).await?;

    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Synthesize one phrase through the configured voice chain
#[allow(clippy::future_not_send)]
async fn say(text: &str) -> anyhow::Result<()> {
    let config = Config::load()?;

    println!("Synthesizing: \"{text}\"");
    let mut speech = SpeechSynthesizer::new(&config.service_url, &config.locale_tags).await?;
    speech.speak(text).await?;

    Ok(())
}
