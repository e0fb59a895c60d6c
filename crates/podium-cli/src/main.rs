//! podium - スケジュールファイルと状態ファイルでエンジンを動かす CLI
//!
//! チャットサーバーには接続せず、全アクションを tracing でログに出す。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use podium_core::app::PendingTaskView;
use podium_core::domain::{self, AuditoriumId, Talk};
use podium_core::impls::{
    InMemoryCheckinRegistry, InMemoryScheduleSource, JsonFileStateStore, StaticPeopleDirectory,
    StaticRoomDirectory, TracingActionSink,
};
use podium_core::ports::{Clock, ScheduleSource, SystemClock};
use podium_core::{Scheduler, SchedulerBuilder, SchedulerConfig, SchedulerLoop};

#[derive(Debug, Parser)]
#[command(name = "podium", about = "Run conference talk schedules as timed chat actions")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "podium.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scheduling loop until Ctrl-C.
    Run {
        /// Extra auditoriums to watch (`all` watches every auditorium).
        #[arg(long = "watch")]
        watch: Vec<String>,
    },
    /// Run one generation pass without dispatching and print pending tasks.
    Inspect,
    /// Print completed task ids, oldest first.
    Completed,
    /// Forget completed task ids so their actions can run again.
    Reset,
    /// Start watching an auditorium.
    Watch { auditorium: String },
    /// Stop watching every auditorium.
    Stop,
}

/// CLI 設定ファイル
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CliConfig {
    /// JSON array of talks. Re-read on every query.
    schedule_file: PathBuf,
    state_file: PathBuf,
    #[serde(default)]
    watch: Vec<AuditoriumId>,
    #[serde(default)]
    scheduler: SchedulerConfig,
    rooms: StaticRoomDirectory,
    #[serde(default)]
    people: StaticPeopleDirectory,
}

impl CliConfig {
    fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("cannot parse CLI config")
    }

    async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)?;

        // 相対パスは設定ファイルの場所から解決する
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.schedule_file = base.join(&config.schedule_file);
        config.state_file = base.join(&config.state_file);
        Ok(config)
    }
}

/// ScheduleSource backed by a JSON file that is re-read for every query,
/// so schedule edits are picked up without a restart.
struct FileScheduleSource {
    path: PathBuf,
    talks: InMemoryScheduleSource,
}

impl FileScheduleSource {
    fn new(path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            path,
            talks: InMemoryScheduleSource::new(clock, Vec::new()),
        }
    }

    async fn reload(&self) -> domain::Result<()> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| domain::ScheduleError::Source(format!("{}: {e}", self.path.display())))?;
        let talks: Vec<Talk> = serde_json::from_str(&raw)
            .map_err(|e| domain::ScheduleError::Source(format!("{}: {e}", self.path.display())))?;
        self.talks.replace(talks).await;
        Ok(())
    }
}

#[async_trait]
impl ScheduleSource for FileScheduleSource {
    async fn talks_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> domain::Result<Vec<Talk>> {
        self.reload().await?;
        self.talks
            .talks_starting_within(minutes_ahead, minutes_behind)
            .await
    }

    async fn talks_with_qa_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> domain::Result<Vec<Talk>> {
        self.reload().await?;
        self.talks
            .talks_with_qa_starting_within(minutes_ahead, minutes_behind)
            .await
    }

    async fn talks_ending_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> domain::Result<Vec<Talk>> {
        self.reload().await?;
        self.talks
            .talks_ending_within(minutes_ahead, minutes_behind)
            .await
    }
}

async fn build_scheduler(config: CliConfig) -> Result<Arc<Scheduler>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = SchedulerBuilder::new(config.scheduler)
        .clock(clock.clone())
        .schedule_source(Arc::new(FileScheduleSource::new(
            config.schedule_file,
            clock.clone(),
        )))
        .state_store(Arc::new(JsonFileStateStore::new(config.state_file)))
        .action_sink(Arc::new(TracingActionSink))
        .room_directory(Arc::new(config.rooms))
        .people_directory(Arc::new(config.people))
        .checkin_registry(Arc::new(InMemoryCheckinRegistry::new(clock)))
        .build()
        .context("cannot build scheduler")?;

    scheduler
        .load_state()
        .await
        .context("cannot load scheduler state")?;
    Ok(Arc::new(scheduler))
}

async fn run(scheduler: Arc<Scheduler>, watch: Vec<AuditoriumId>) -> Result<()> {
    for auditorium in watch {
        scheduler.add_auditorium(auditorium).await?;
    }

    let handle = SchedulerLoop::spawn(Arc::clone(&scheduler));
    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for Ctrl-C")?;
    info!("shutdown requested");
    handle.shutdown_and_join().await;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config).await?;
    let configured_watch = config.watch.clone();
    let scheduler = build_scheduler(config).await?;

    match cli.command {
        Command::Run { watch } => {
            let mut auditoriums = configured_watch;
            auditoriums.extend(watch.into_iter().map(AuditoriumId::from));
            run(scheduler, auditoriums).await?;
        }
        Command::Inspect => {
            scheduler
                .generate()
                .await
                .context("cannot read the schedule")?;
            let qa_buffer = scheduler.config().qa_buffer();
            for task in scheduler.inspect().await {
                print_json(&PendingTaskView::from_task(&task, qa_buffer))?;
            }
            print_json(&scheduler.status().await)?;
        }
        Command::Completed => {
            for id in scheduler.inspect_completed().await {
                println!("{id}");
            }
        }
        Command::Reset => scheduler.reset().await?,
        Command::Watch { auditorium } => scheduler.add_auditorium(auditorium.into()).await?,
        Command::Stop => scheduler.stop().await?,
    }
    Ok(())
}
