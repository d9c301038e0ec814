//! PodcastAI CLI - AI Podcast Generator
//!
//! A command-line tool for generating scripted two-party podcast episodes:
//! an AI host interviews an AI guest expert on a chosen or generated topic,
//! and the dialogue is synthesized into one audio file with a transcript.

use clap::Parser;
use colored::Colorize;
use podcastai_core::{
    Config, KokoroSynthesizer, OpenAiGenerator, Pipeline, PodcastEvent, default_config,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "podcastai",
    version,
    about = "AI Podcast Generator - scripted host/guest episodes",
    long_about = "Generates a podcast episode: an AI host interviews an AI guest expert, \
                  the dialogue is synthesized to speech, and the turns are stitched into \
                  one audio file with natural pauses."
)]
struct Cli {
    /// Topic for the episode (generated automatically when omitted)
    #[arg(short, long, value_name = "TOPIC")]
    topic: Option<String>,

    /// Number of conversation turns
    #[arg(long, default_value = "20", value_name = "TURNS")]
    turns: usize,

    /// Voice for the host
    #[arg(long, value_name = "VOICE")]
    host_voice: Option<String>,

    /// Voice for the guest
    #[arg(long, value_name = "VOICE")]
    guest_voice: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for the episode artifacts
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Model to use for text generation
    #[arg(short, long, default_value = "gpt-4o", value_name = "MODEL")]
    model: String,

    /// Seed for the silence-gap randomization (reproducible pacing)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// List available TTS voices and exit
    #[arg(long)]
    list_voices: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize the TTS engine first: --list-voices needs it, and a broken
    // engine should fail before any API spend
    let synthesizer = KokoroSynthesizer::new().await?;

    if cli.list_voices {
        println!("{}", "Available voices:".bold());
        println!("{}", synthesizer.format_available_voices());
        return Ok(());
    }

    if cli.turns < 1 {
        return Err("--turns must be at least 1".into());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };

    if let Some(voice) = &cli.host_voice {
        config.voices.host_voice = voice.clone();
    }
    if let Some(voice) = &cli.guest_voice {
        config.voices.guest_voice = voice.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }

    config.validate()?;
    synthesizer.validate_voice(&config.voices.host_voice)?;
    synthesizer.validate_voice(&config.voices.guest_voice)?;

    // Get API configuration from environment
    let api_base = env::var("OPENAI_API_BASE")
        .or_else(|_| env::var("OPENAI_BASE_URL"))
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
        String::new()
    });

    // Print header
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  PodcastAI - Episode Generator".bright_blue().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    match &cli.topic {
        Some(topic) => println!("{} {}", "Topic:".bold(), topic.bright_white()),
        None => println!("{} {}", "Topic:".bold(), "(generated)".dimmed()),
    }
    println!("{} {}", "Turns:".bold(), cli.turns);
    println!(
        "{} host={} guest={}",
        "Voices:".bold(),
        config.voices.host_voice.bright_cyan(),
        config.voices.guest_voice.bright_cyan()
    );
    println!();
    println!("{}", "─".repeat(70).dimmed());

    let generator = OpenAiGenerator::new(api_base, api_key, cli.model.clone());

    let mut pipeline = Pipeline::new(config, Box::new(generator), Box::new(synthesizer))
        .with_callback(create_console_callback());
    if let Some(seed) = cli.seed {
        pipeline = pipeline.with_seed(seed);
    }

    let output = pipeline.run(cli.turns, cli.topic.as_deref()).await?;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  Episode ready.".bright_green().bold());
    println!(
        "  {} {}",
        "Audio:".bold(),
        output.audio_path.display().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Transcript:".bold(),
        output.transcript_path.display().to_string().bright_white()
    );
    println!(
        "  {} {:.1}s",
        "Duration:".bold(),
        output.duration_secs
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Create a callback that prints run progress to the console.
fn create_console_callback() -> Box<dyn Fn(PodcastEvent) + Send + Sync> {
    Box::new(move |event| match event {
        PodcastEvent::TopicSelected { title } => {
            println!();
            println!(
                "{}",
                format!("  📻 TOPIC: {}", title).bright_magenta().bold()
            );
            println!();
        }
        PodcastEvent::GuestIntroduced { name, background } => {
            println!(
                "{} {} {}",
                "  Guest:".bold(),
                name.bright_cyan(),
                format!("({})", background).dimmed()
            );
            println!();
        }
        PodcastEvent::SpeakerStart { name, role } => {
            println!(
                "{} {} {}",
                "▶".bright_cyan(),
                name.bright_cyan().bold(),
                format!("({})", role.display_name()).yellow()
            );
        }
        PodcastEvent::UtteranceReady { text, .. } => {
            let wrapped = textwrap(&text, 66);
            for line in wrapped.lines() {
                println!("  {}", line);
            }
            println!();
        }
        PodcastEvent::SynthesisProgress { turn_index, total } => {
            println!(
                "{}",
                format!("  Synthesizing turn {}/{}...", turn_index + 1, total).dimmed()
            );
        }
        PodcastEvent::EpisodeAssembled { .. } => {
            // Handled in run
        }
    })
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
