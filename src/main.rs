use anyhow::Result;
use clap::Parser;
use social_post_generator::clipboard::SystemClipboard;
use social_post_generator::dashboard::Dashboard;
use social_post_generator::image::UploadedFile;
use social_post_generator::models::{Config, Platform, PostStyle};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "social-post-generator")]
#[command(about = "Generate social media posts with AI captions and images")]
struct CliArgs {
    /// What the post is about.
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Target platform (Twitter, Instagram, LinkedIn, Facebook).
    #[arg(long, default_value = "LinkedIn", value_parser = parse_platform_arg)]
    platform: Platform,

    /// Post style, e.g. Personal, Promotional, Meme.
    #[arg(long, default_value = "Personal", value_parser = parse_style_arg)]
    style: PostStyle,

    /// Image to caption instead of generating one.
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// Also generate an illustration (ignored with --image).
    #[arg(long)]
    want_image: bool,

    /// Save the post's image into this directory.
    #[arg(long, value_name = "DIR")]
    download: Option<PathBuf>,

    /// Copy the caption to the system clipboard.
    #[arg(long)]
    copy: bool,

    /// Print the preview as JSON instead of a text card.
    #[arg(long)]
    json: bool,
}

fn parse_platform_arg(input: &str) -> std::result::Result<Platform, String> {
    input.parse()
}

fn parse_style_arg(input: &str) -> std::result::Result<PostStyle, String> {
    input.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_post_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting social-post-generator");

    let args = CliArgs::parse();
    let dashboard = Dashboard::from_config(&Config::from_env());

    if let Err(e) = run(&dashboard, args).await {
        error!("Generation failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(dashboard: &Dashboard, args: CliArgs) -> social_post_generator::Result<()> {
    dashboard.set_prompt(args.prompt)?;
    dashboard.set_platform(args.platform)?;
    dashboard.set_style(args.style)?;
    dashboard.set_want_image(args.want_image)?;

    if let Some(path) = &args.image {
        let file = UploadedFile::from_path(path).await?;
        let reference = dashboard.attach_image(file)?;
        info!("Attached {} as {}", path.display(), reference);
    }

    dashboard.generate().await?;

    let mut copied = false;
    if args.copy {
        match dashboard.copy_caption(&SystemClipboard) {
            Ok(()) => copied = dashboard.is_copied(),
            Err(e) => warn!("Could not copy caption: {}", e),
        }
    }

    if let Some(preview) = dashboard.preview() {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            print!("{}", preview.to_terminal(copied));
        }
    }

    if let Some(dir) = &args.download {
        let path = dashboard.download_image(dir).await?;
        println!("Saved image to {}", path.display());
    }

    info!("Generation completed successfully");
    Ok(())
}
