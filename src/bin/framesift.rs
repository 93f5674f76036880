use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::Env;
use framesift::{
    AestheticModelKind, BanList, CommandScorer, CommandTagger, FfmpegLogLevel, Frame,
    ModelRegistry, ProgressCallback, ProgressInfo, ScoreRange, Selection, Session, SiftError,
    SiftOptions, TaggerModel, VideoFile, VideoInfo, archive,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framesift info input.mp4 --json\n  framesift preview input.mp4 --out preview --every 30\n  framesift extract input.mp4 --tagger wd14-tag --scorer laion-score --out exports --progress\n  framesift completions zsh > _framesift";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Sample video frames and sort them into kept and excluded sets",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while classifying.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the length and frame count of a video.
    #[command(
        about = "Print video length and frame count",
        after_help = "Examples:\n  framesift info input.mp4\n  framesift info input.mp4 --json"
    )]
    Info {
        /// Input video path.
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Save the first 12 sampled frames without running any model.
    #[command(
        about = "Preview sampled frames",
        after_help = "Examples:\n  framesift preview input.mp4 --out preview --every 30"
    )]
    Preview {
        /// Input video path.
        input: PathBuf,
        /// Output directory for the preview images.
        #[arg(long)]
        out: PathBuf,
        /// Sample every Nth frame.
        #[arg(long, default_value_t = 60)]
        every: u64,
    },

    /// Classify sampled frames and optionally export them as a zip.
    #[command(
        about = "Classify frames into kept and excluded",
        after_help = "Examples:\n  framesift extract input.mp4 --tagger wd14-tag --scorer laion-score\n  framesift extract input.mp4 --tagger wd14-tag --scorer laion-score --ban \"blurry, text\" --min-score 6 --out exports --select kept"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Tagger program. Prints a JSON object of tag confidences for the image path it is given.
        #[arg(long)]
        tagger: OsString,
        /// Extra argument passed to the tagger program (repeatable).
        #[arg(long = "tagger-arg")]
        tagger_args: Vec<OsString>,
        /// Aesthetic scorer program. Prints one score for the image path it is given.
        #[arg(long)]
        scorer: OsString,
        /// Extra argument passed to the scorer program (repeatable).
        #[arg(long = "scorer-arg")]
        scorer_args: Vec<OsString>,
        /// Tagger speed: faster (wd14-vit-v2) or slower (wd14-swinv2-v2).
        #[arg(long, default_value = "faster")]
        speed: String,
        /// Aesthetic model name.
        #[arg(long, default_value = "sac+logos+ava1-l14-linearMSE")]
        aesthetic_model: String,
        /// Comma-separated tags that exclude a frame.
        #[arg(long, default_value = BanList::DEFAULT_TEXT)]
        ban: String,
        /// Confidence at which a banned tag excludes a frame.
        #[arg(long, default_value_t = BanList::DEFAULT_THRESHOLD)]
        threshold: f32,
        /// Lowest accepted aesthetic score (inclusive).
        #[arg(long, default_value_t = 5.0)]
        min_score: f32,
        /// Highest accepted aesthetic score (inclusive).
        #[arg(long, default_value_t = 10.0)]
        max_score: f32,
        /// Sample every Nth frame.
        #[arg(long, default_value_t = 60)]
        every: u64,
        /// Stop after this many sampled frames.
        #[arg(long)]
        max_frames: Option<u64>,
        /// Directory to write the zip archive into.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Frames to export: kept, excluded or all.
        #[arg(long, default_value = "all")]
        select: String,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_selection(value: &str) -> Option<Selection> {
    match value.trim().to_ascii_lowercase().as_str() {
        "kept" | "extracted" => Some(Selection::Kept),
        "excluded" => Some(Selection::Excluded),
        "all" | "both" => Some(Selection::All),
        _ => None,
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "warn" => Some(FfmpegLogLevel::Warning),
        other => other.parse().ok(),
    }
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(level) => {
            parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?
        }
        None => FfmpegLogLevel::default(),
    };
    framesift::set_ffmpeg_log_level(level);
    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total.max(info.processed()));
        self.bar.set_position(info.processed());
        self.bar
            .set_message(format!("{} kept, {} excluded", info.kept, info.excluded));
        if info.finished {
            self.bar.finish_with_message("done");
        }
    }
}

fn register_models(
    models: &mut ModelRegistry,
    tagger: &TaggerModel,
    aesthetic_model: &str,
    tagger_program: OsString,
    tagger_args: Vec<OsString>,
    scorer_program: OsString,
    scorer_args: Vec<OsString>,
) {
    let tagger_name = tagger.name();
    models.register_tagger(tagger_name, move || {
        let command = tagger_args
            .iter()
            .fold(CommandTagger::new(tagger_program.clone()), |command, arg| {
                command.arg(arg.clone())
            })
            .arg("--model")
            .arg(tagger_name);
        Ok(Box::new(command))
    });

    let model = aesthetic_model.to_string();
    models.register_scorer(aesthetic_model, move || {
        let command = scorer_args
            .iter()
            .fold(CommandScorer::new(scorer_program.clone(), model.clone()), |command, arg| {
                command.arg(arg.clone())
            });
        Ok(Box::new(command))
    });
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            if !input.exists() {
                return Err(SiftError::VideoNotFound(input).into());
            }
            let video = VideoFile::open(&input)?;
            let metadata = video.metadata();
            let info = VideoInfo::from(metadata);
            if json {
                let payload = json!({
                    "duration_seconds": info.duration_seconds,
                    "frame_count": info.frame_count,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{info}");
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
            }
        }
        Commands::Preview { input, out, every } => {
            if every == 0 {
                return Err("--every must be greater than 0".into());
            }
            ensure_writable_path(&out, cli.global.overwrite)?;

            let report = Session::new().preview(&input, every);
            let Some(images) = report.payload else {
                return Err(report.status.into());
            };

            let frames: Vec<Frame> = images
                .into_iter()
                .zip(0..)
                .map(|(image, index)| Frame { index, image })
                .collect();
            archive::write_frames(&frames, &out)?;

            println!(
                "{} {}",
                "success:".green().bold(),
                format!("{} ({} frame(s) in {})", report.status, frames.len(), out.display())
                    .green()
            );
        }
        Commands::Extract {
            input,
            tagger,
            tagger_args,
            scorer,
            scorer_args,
            speed,
            aesthetic_model,
            ban,
            threshold,
            min_score,
            max_score,
            every,
            max_frames,
            out,
            select,
        } => {
            if every == 0 {
                return Err("--every must be greater than 0".into());
            }
            let tagger_model = TaggerModel::from_speed(&speed)
                .ok_or(format!("unsupported --speed: {speed} (use faster or slower)"))?;
            if AestheticModelKind::from_name(&aesthetic_model).is_none() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{aesthetic_model} is not a known aesthetic model").yellow()
                );
            }
            let selection =
                parse_selection(&select).ok_or(format!("unsupported --select: {select}"))?;

            let mut options = SiftOptions::new()
                .with_stride(every)
                .with_ban_list(BanList::parse(&ban, threshold))
                .with_score_range(ScoreRange::new(min_score, max_score)?)
                .with_tagger_model(tagger_model.name())
                .with_aesthetic_model(aesthetic_model.clone());
            if let Some(max) = max_frames {
                options = options.with_max_frames(max);
            }
            if cli.global.progress {
                options = options.with_progress(Arc::new(TerminalProgress::new()?));
            }

            let mut models = ModelRegistry::new();
            register_models(
                &mut models,
                &tagger_model,
                &aesthetic_model,
                tagger,
                tagger_args,
                scorer,
                scorer_args,
            );

            let mut session = Session::new();
            let report = session.extract(&input, &options, &mut models);
            session.unload(&mut models);

            if report.payload.is_none() {
                return Err(report.status.into());
            }
            println!("{} {}", "success:".green().bold(), report.status.green());
            if let Some(extraction) = session.last_extraction() {
                println!("{}", extraction.summary());
            }

            if let Some(out) = out {
                let stem = input
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "frames".to_string());
                ensure_writable_path(&out.join(format!("{stem}.zip")), cli.global.overwrite)?;
                std::fs::create_dir_all(&out)?;

                let report = session.export(selection, &out);
                let Some(zip_path) = report.payload else {
                    return Err(report.status.into());
                };
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("{} {}", report.status, zip_path.display()).green()
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesift", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, parse_log_level, parse_selection};
    use clap::CommandFactory;
    use framesift::{FfmpegLogLevel, Selection};

    #[test]
    fn parse_selection_aliases() {
        assert_eq!(parse_selection("kept"), Some(Selection::Kept));
        assert_eq!(parse_selection("Extracted"), Some(Selection::Kept));
        assert_eq!(parse_selection("excluded"), Some(Selection::Excluded));
        assert_eq!(parse_selection("all"), Some(Selection::All));
        assert!(parse_selection("some").is_none());
    }

    #[test]
    fn parse_log_level_aliases() {
        assert_eq!(parse_log_level("warn"), Some(FfmpegLogLevel::Warning));
        assert_eq!(parse_log_level("QUIET"), Some(FfmpegLogLevel::Quiet));
        assert!(parse_log_level("loud").is_none());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
