mod config;
mod logging;
mod model;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use config::Config;
use model::{
    Channel, FeedEngine, JsonVideoStore, SortOrder, Video, VideoFilter, WatchStatus,
    YouTubeClient,
};

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Track your YouTube subscriptions and watch state", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch subscriptions and videos from YouTube, merging local watch state
    Sync,
    /// Show the filtered video list
    List {
        /// Include watched videos
        #[arg(long)]
        watched: bool,
        /// Include skipped videos
        #[arg(long)]
        skipped: bool,
        /// Exclude unwatched videos (shown by default)
        #[arg(long)]
        no_unwatched: bool,
        /// Include every status
        #[arg(long, conflicts_with_all = ["watched", "skipped", "no_unwatched"])]
        all: bool,
        /// Only videos from this channel id
        #[arg(long)]
        channel: Option<String>,
        /// Case-insensitive text search over title, channel and description
        #[arg(long)]
        search: Option<String>,
        /// Sort oldest first instead of newest first
        #[arg(long)]
        oldest: bool,
    },
    /// Show subscribed channels
    Channels,
    /// Set the watch status of a video
    Mark {
        video_id: String,
        status: StatusArg,
    },
    /// Toggle a video between watched and unwatched
    Toggle { video_id: String },
    /// Store the YouTube API key in the preferences file
    SetKey { api_key: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusArg {
    Watched,
    Skipped,
    Unwatched,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load();

    // No engine needed to update preferences, so handle this before setup.
    if let Command::SetKey { api_key } = &args.command {
        config.api_key = Some(api_key.clone());
        config.save()?;
        println!("API key saved.");
        return Ok(());
    }

    let data_dir: PathBuf = config
        .data_dir
        .clone()
        .or_else(model::default_data_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    if let Err(e) = logging::init_logging(Some(data_dir.clone())) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let client = match &config.api_base_url {
        Some(base) => YouTubeClient::with_base_url(config.api_key.clone(), base.clone()),
        None => YouTubeClient::new(config.api_key.clone()),
    };
    let store = JsonVideoStore::new(data_dir.join("store"));
    let engine = FeedEngine::new(Arc::new(client), Arc::new(store));

    engine.load_from_storage().await;
    if let Some(message) = engine.last_error().await {
        eprintln!("Warning: {}", message);
    }

    match args.command {
        Command::Sync => run_sync(&engine).await,
        Command::List {
            watched,
            skipped,
            no_unwatched,
            all,
            channel,
            search,
            oldest,
        } => {
            let filter = VideoFilter {
                show_unwatched: all || !no_unwatched,
                show_watched: all || watched,
                show_skipped: all || skipped,
                selected_channel_id: channel,
                sort_order: if oldest {
                    SortOrder::OldestFirst
                } else {
                    SortOrder::NewestFirst
                },
            };
            engine.set_filter(filter).await;
            engine.set_search_text(search.unwrap_or_default()).await;
            run_list(&engine).await;
            Ok(())
        }
        Command::Channels => {
            print_channels(&engine.channels().await);
            Ok(())
        }
        Command::Mark { video_id, status } => {
            match status {
                StatusArg::Watched => engine.mark_watched(&video_id).await,
                StatusArg::Skipped => engine.mark_skipped(&video_id).await,
                StatusArg::Unwatched => engine.mark_unwatched(&video_id).await,
            }
            report_mutation(&engine, &video_id).await;
            Ok(())
        }
        Command::Toggle { video_id } => {
            engine.toggle_watched(&video_id).await;
            report_mutation(&engine, &video_id).await;
            Ok(())
        }
        // Handled before engine setup.
        Command::SetKey { .. } => Ok(()),
    }
}

async fn run_sync(engine: &FeedEngine) -> Result<()> {
    println!("Syncing subscriptions...");
    // On failure the reason propagates as the process error; the engine has
    // already recorded it as the failed sync state.
    engine.sync().await?;

    let (channels, videos, unwatched) = futures::join!(
        engine.channels(),
        engine.videos(),
        engine.unwatched_count()
    );
    println!(
        "Synced {} channels, {} videos ({} unwatched).",
        channels.len(),
        videos.len(),
        unwatched
    );
    Ok(())
}

async fn run_list(engine: &FeedEngine) {
    let filter = engine.filter().await;
    if !filter.has_active_status_filter() {
        println!("No status filters active; nothing to show.");
        return;
    }

    let videos = engine.filtered_videos().await;
    if videos.is_empty() {
        println!("No videos match the current filter. Run `tubefeed sync` to refresh.");
        return;
    }

    for video in &videos {
        print_video_row(video);
    }
    println!(
        "\n{} shown, {} unwatched in total.",
        videos.len(),
        engine.unwatched_count().await
    );
}

fn print_video_row(video: &Video) {
    let marker = match video.watch_status {
        WatchStatus::Unwatched => " ",
        WatchStatus::Watched => "x",
        WatchStatus::Skipped => ">",
    };
    println!(
        "[{}] {:>9}  {:>8}  {:<20.20}  {}  ({})",
        marker,
        video.formatted_duration(),
        video.relative_published_time(),
        video.channel_title,
        video.title,
        video.id
    );
}

fn print_channels(channels: &[Channel]) {
    if channels.is_empty() {
        println!("No channels. Run `tubefeed sync` first.");
        return;
    }
    for channel in channels {
        println!("{}  {}", channel.id, channel.title);
    }
}

async fn report_mutation(engine: &FeedEngine, video_id: &str) {
    if let Some(message) = engine.last_error().await {
        eprintln!("Warning: {}", message);
    }
    match engine.videos().await.iter().find(|v| v.id == video_id) {
        Some(video) => println!(
            "{}: {}",
            video.watch_status.display_name(),
            video.title
        ),
        None => println!("No video with id {} (it may have been dropped by a sync).", video_id),
    }
}
