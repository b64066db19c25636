use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use audito_core::{FetchConfig, SynthConfig, assemble_article, synthesize_to_file};
use clap::Parser;
use owo_colors::OwoColorize;

mod echo;

use echo::{format_size, print_banner, print_error, print_info, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn paginated web articles into audio
#[derive(Parser, Debug)]
#[command(name = "audito")]
#[command(author = "Audito Contributors")]
#[command(version = VERSION)]
#[command(about = "Turn paginated web articles into audio", long_about = None)]
struct Args {
    /// First page of the article to read
    #[arg(value_name = "URL")]
    url: String,

    /// Directory the MP3 artifact is written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// Print the assembled article text instead of synthesizing
    #[arg(short, long)]
    text: bool,

    /// HTTP timeout in seconds for page fetches
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for page fetches
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Synthesis backend endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Segment length in characters
    #[arg(long, default_value = "500", value_name = "CHARS")]
    segment_len: usize,

    /// Speech speed
    #[arg(long, default_value = "10", value_name = "NUM")]
    speed: u32,

    /// Voice id
    #[arg(long, default_value = "5118", value_name = "NUM")]
    voice: u32,

    /// Volume
    #[arg(long, default_value = "8", value_name = "NUM")]
    volume: u32,

    /// Enable progress output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        print_banner();
    }

    let fetch_config = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.unwrap_or_else(|| FetchConfig::default().user_agent),
    };

    if args.verbose {
        print_step(1, 2, &format!("Assembling article from {}", args.url.bright_white().underline()));
    }

    let article = assemble_article(&args.url, &fetch_config)
        .await
        .context("Failed to assemble article")?;

    if args.verbose {
        eprintln!("  {} {}", "Title:".dimmed(), article.title.bright_white());
        eprintln!(
            "  {} {}",
            "Text:".dimmed(),
            format_size(article.text_content.len()).bright_white()
        );
        eprintln!();
    }

    if args.text {
        println!("{}", article.text_content);
        return Ok(());
    }

    let mut synth_config = SynthConfig {
        speed: args.speed,
        voice: args.voice,
        volume: args.volume,
        segment_len: args.segment_len,
        ..Default::default()
    };
    if let Some(endpoint) = args.endpoint {
        synth_config.endpoint = endpoint;
    }

    if args.verbose {
        print_step(2, 2, "Synthesizing audio");
        print_info(&format!(
            "{} segments of up to {} characters",
            article.text_content.chars().count().div_ceil(synth_config.segment_len.max(1)),
            synth_config.segment_len
        ));
    }

    let name = synthesize_to_file(&article.text_content, &args.output_dir, &synth_config)
        .await
        .context("Failed to synthesize audio")?;

    print_success(&format!(
        "Audio written to {}",
        args.output_dir.join(name).display().bright_white()
    ));

    Ok(())
}
