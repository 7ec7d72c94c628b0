use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use gantt_layout::chart::{self, Arrow, DragAction, DragContext, Layout};
use gantt_layout::config::ChartConfig;
use gantt_layout::io;
use gantt_layout::model::{DateAxis, Direction, Task, TimelineScale, WorkCalendar};
use gantt_layout::{GanttError, Result};

#[derive(Parser, Debug)]
#[command(name = "gantt-layout", version, about = "Gantt bar layout and drag geometry")]
struct Cli {
    /// Chart config file (JSON). Defaults to the user config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Excluded weekdays, Sunday = 0 (e.g. "0,6"). Overrides the config.
    #[arg(long, global = true, value_delimiter = ',')]
    exclude: Option<Vec<u8>>,

    /// Lay the chart out right to left.
    #[arg(long, global = true)]
    rtl: bool,

    /// Axis granularity: day, week or month. Overrides the config.
    #[arg(long, global = true)]
    scale: Option<TimelineScale>,

    /// Debug level: -d, -dd, -ddd.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a task file and print bars and date patches as JSON.
    Layout {
        /// Task list (.json or .csv).
        tasks: PathBuf,
        /// Include dependency arrow routes.
        #[arg(long)]
        arrows: bool,
    },
    /// Interpret one drag step on a laid-out bar and print the outcome.
    Drag {
        tasks: PathBuf,
        /// Id of the task being dragged.
        #[arg(long)]
        task: String,
        /// move, start, end or progress.
        #[arg(long)]
        action: DragAction,
        /// Pointer x in chart coordinates.
        #[arg(long, allow_hyphen_values = true)]
        pointer_x: f64,
        /// Pointer distance from the bar's x1 when the drag began.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        grab_offset: f64,
    },
    /// Write the calendar-corrected tasks to a .csv or .json file.
    Export {
        tasks: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct LayoutReport {
    #[serde(flatten)]
    layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    arrows: Option<Vec<Arrow>>,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = ChartConfig::load_or_default(cli.config.as_deref())?;
    if let Some(days) = &cli.exclude {
        config.exclude_weekdays = WorkCalendar::new(days);
    }
    if cli.rtl {
        config.direction = Direction::Rtl;
    }
    if let Some(scale) = cli.scale {
        config.scale = scale;
    }

    match &cli.command {
        Commands::Layout { tasks, arrows } => {
            let (tasks, axis) = load_chart(tasks, &config)?;
            let layout = chart::layout(&tasks, &axis, &config.layout_config());
            let arrows = arrows.then(|| {
                chart::route_all(
                    &layout.bars,
                    config.row_height,
                    config.task_height(),
                    &config.arrow,
                    config.direction,
                )
            });
            print_json(&LayoutReport { layout, arrows })
        }
        Commands::Drag {
            tasks,
            task,
            action,
            pointer_x,
            grab_offset,
        } => {
            let (tasks, axis) = load_chart(tasks, &config)?;
            let layout_config = config.layout_config();
            let layout = chart::layout(&tasks, &axis, &layout_config);
            let bar = layout
                .bar(task)
                .ok_or_else(|| GanttError::UnknownTask(task.clone()))?;
            let ctx = DragContext::new(&axis, &layout_config, config.time_step_ms);
            let outcome = chart::interpret(*pointer_x, *action, bar, &ctx, *grab_offset);
            tracing::info!(task = %task, %action, changed = outcome.changed, "drag interpreted");
            print_json(&outcome)
        }
        Commands::Export { tasks, out } => {
            let (mut tasks, axis) = load_chart(tasks, &config)?;
            let layout = chart::layout(&tasks, &axis, &config.layout_config());
            let changed = chart::apply_patches(&mut tasks, &layout.patches);
            tracing::info!(changed, "applied calendar corrections");
            write_tasks(&tasks, out)
        }
    }
}

/// Load, filter and order the task rows, and seed an axis around them.
fn load_chart(path: &Path, config: &ChartConfig) -> Result<(Vec<Task>, DateAxis)> {
    let tasks = chart::prepare(&io::load_any(path)?);
    let axis = seed_axis(&tasks, config)?;
    Ok((tasks, axis))
}

fn seed_axis(tasks: &[Task], config: &ChartConfig) -> Result<DateAxis> {
    let start = tasks.iter().map(|t| t.start.date()).min();
    let end = tasks.iter().map(|t| t.end.date()).max();
    let (Some(start), Some(end)) = (start, end) else {
        return Err(GanttError::NoTasks { skipped: 0 });
    };
    let pad = config.scale.approx_step() * config.pre_steps as i32;
    let first = start.checked_sub_signed(pad).unwrap_or(start);
    let last = end.checked_add_signed(pad).unwrap_or(end);
    DateAxis::seed(first, last, config.scale)
}

fn write_tasks(tasks: &[Task], out: &Path) -> Result<()> {
    let is_csv = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        io::export_csv(tasks, out)?;
    } else {
        io::save_tasks(tasks, out)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
