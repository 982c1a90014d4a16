use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use dsviewer_core::config_file::{self, Settings};
use dsviewer_core::session::{EMPTY_SPLIT_WARNING, not_found_message};
use dsviewer_core::source::{SourceKind, build_source};
use dsviewer_core::{
    CoreError, DatasetKind, DatasetSource, Event, ImageListing, Record, Session, browse_images,
};

mod output;

use output::ColorMode;

/// dsviewer: inspect question-answering and multimodal datasets from the shell
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Dataset source: hub or local
    #[arg(long, global = true)]
    source: Option<String>,

    /// Root directory of local datasets (<root>/<name>/<split>.jsonl)
    #[arg(long, global = true)]
    local_root: Option<PathBuf>,

    /// Hub dataset config (subset) to use
    #[arg(long, global = true)]
    config_name: Option<String>,

    /// Maximum rows fetched per split from the hub
    #[arg(long, global = true)]
    max_rows: Option<usize>,

    /// Read settings from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the splits of a dataset
    Splits {
        /// Dataset name
        name: String,
    },

    /// Show one record the way the viewer renders it
    Show {
        /// Dataset name
        name: String,

        /// Split to read (defaults to the first available)
        #[arg(long)]
        split: Option<String>,

        /// Record index within the split
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Dataset kind: qa or multimodal
        #[arg(long, default_value = "qa")]
        kind: String,

        /// Folder of images to pair with a multimodal record
        #[arg(long)]
        image_folder: Option<String>,

        /// Print the raw record as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Build a word cloud from every context in a split
    Wordcloud {
        /// Dataset name
        name: String,

        /// Split to read (defaults to the first available)
        #[arg(long)]
        split: Option<String>,

        /// Write the cloud as SVG to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of top words to print
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// List the supported images in a folder
    Images {
        /// Folder to scan
        folder: String,

        /// Mark the image at this position
        #[arg(long)]
        index: Option<usize>,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("DSVIEWER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve settings: CLI flags > env vars > config file > defaults.
fn resolve_settings(args: &GlobalArgs) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let file = match &args.config {
        Some(path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };
    settings.apply_file(&file);
    settings.apply_env();

    if let Some(source) = &args.source {
        settings.source.kind = SourceKind::parse(source)
            .ok_or_else(|| anyhow::anyhow!("unknown source '{}': use hub or local", source))?;
    }
    if let Some(root) = &args.local_root {
        settings.source.local_root = Some(root.clone());
    }
    if let Some(name) = &args.config_name {
        settings.source.config_name = Some(name.clone());
    }
    if let Some(rows) = args.max_rows {
        settings.source.max_rows = rows.max(1);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let settings = resolve_settings(&cli.global)?;
    tracing::info!("using {} source", settings.source.kind.as_str());
    let color = ColorMode(!cli.global.no_color);
    let mut out = std::io::stdout();
    let mut err = std::io::stderr();

    match cli.command {
        Command::Splits { name } => {
            let source = build_source(&settings.source)?;
            match list_splits(source.as_ref(), &name).await {
                Ok(splits) => {
                    output::print_list(&mut out, &splits, None, color)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(msg) => {
                    output::print_error(&mut err, &msg, color)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Show {
            name,
            split,
            index,
            kind,
            image_folder,
            json,
        } => {
            let kind = DatasetKind::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("unknown kind '{}': use qa or multimodal", kind))?;
            let source = build_source(&settings.source)?;
            if json {
                return match fetch_record(source.as_ref(), &name, split, index).await {
                    Ok(Some(record)) => {
                        writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
                        Ok(ExitCode::SUCCESS)
                    }
                    Ok(None) => {
                        output::print_warning(&mut err, EMPTY_SPLIT_WARNING, color)?;
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(msg) => {
                        output::print_error(&mut err, &msg, color)?;
                        Ok(ExitCode::FAILURE)
                    }
                };
            }

            let mut session = Session::new(&settings);
            session.handle(Event::SetKind(kind));
            session.handle(Event::SetName(name));
            if let Some(split) = split {
                session.handle(Event::SetSplit(split));
            }
            session.handle(Event::SetIndex(index));
            if let Some(folder) = image_folder {
                session.handle(Event::SetImageFolder(folder));
            }
            let plan = session.render(source.as_ref()).await;
            output::print_plan(&mut out, &mut err, &plan, color)?;
            Ok(exit_code(plan.has_error()))
        }

        Command::Wordcloud {
            name,
            split,
            output: svg_path,
            top,
        } => {
            let source = build_source(&settings.source)?;
            let mut session = Session::new(&settings);
            session.handle(Event::SetName(name));
            if let Some(split) = split {
                session.handle(Event::SetSplit(split));
            }
            session.handle(Event::SetWordCloud(true));
            let plan = session.render(source.as_ref()).await;

            for msg in plan.errors() {
                output::print_error(&mut err, msg, color)?;
            }
            for msg in plan.warnings() {
                output::print_warning(&mut err, msg, color)?;
            }
            let Some(cloud) = plan.wordcloud() else {
                return Ok(exit_code(plan.has_error()));
            };
            output::print_top_words(&mut out, cloud, top, color)?;
            if let Some(path) = svg_path {
                std::fs::write(&path, cloud.to_svg())?;
                writeln!(out, "Wrote {}", path.display())?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Images { folder, index } => {
            let listing = browse_images(&folder);
            if let Some(msg) = listing.warning() {
                output::print_warning(&mut err, msg, color)?;
                return Ok(ExitCode::SUCCESS);
            }
            let selected = index.map(|i| i.min(listing.files().len().saturating_sub(1)));
            output::print_list(&mut out, listing.files(), selected, color)?;
            if let ImageListing::Found(files) = &listing {
                writeln!(out, "{} image(s)", files.len())?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Split names of `name`, or the message to report.
async fn list_splits(source: &dyn DatasetSource, name: &str) -> Result<Vec<String>, String> {
    match source.splits(name).await {
        Ok(splits) if !splits.is_empty() => Ok(splits),
        Ok(_) => Err(not_found_message(
            name,
            &CoreError::DatasetNotFound(name.to_string()),
        )),
        Err(e) => Err(e.to_string()),
    }
}

/// The record at `index` (clamped to the split), `None` when the split is
/// empty. Errors come back as the message to report.
async fn fetch_record(
    source: &dyn DatasetSource,
    name: &str,
    split: Option<String>,
    index: usize,
) -> Result<Option<Record>, String> {
    let split = match split {
        Some(split) => split,
        None => list_splits(source, name).await?.swap_remove(0),
    };
    let dataset = source
        .load(name, &split)
        .await
        .map_err(|e| not_found_message(name, &e))?;
    Ok(dataset
        .get(index.min(dataset.len().saturating_sub(1)))
        .cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsviewer_core::LocalSource;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let qa = dir.path().join("qa");
        std::fs::create_dir_all(&qa).unwrap();
        std::fs::write(qa.join("train.jsonl"), "{}\n[1]\n").unwrap();
        std::fs::write(
            qa.join("validation.jsonl"),
            "{\"question\": \"a\"}\n{\"question\": \"b\"}\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("empty/train.json"), "[]").unwrap();
        dir
    }

    #[tokio::test]
    async fn malformed_split_reports_the_cause() {
        let dir = fixture();
        let source = LocalSource::new(dir.path());
        let msg = fetch_record(&source, "qa", None, 0).await.unwrap_err();
        assert!(msg.starts_with("Dataset 'qa' not found."), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }

    #[tokio::test]
    async fn record_index_is_clamped() {
        let dir = fixture();
        let source = LocalSource::new(dir.path());
        let record = fetch_record(&source, "qa", Some("validation".into()), 9)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.get("question").unwrap(), "b");
        assert!(
            fetch_record(&source, "empty", None, 0)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn missing_dataset_names_the_error() {
        let dir = fixture();
        let source = LocalSource::new(dir.path());
        assert_eq!(
            list_splits(&source, "nope").await.unwrap_err(),
            "dataset 'nope' not found"
        );
        assert_eq!(
            list_splits(&source, "qa").await.unwrap(),
            vec!["train", "validation"]
        );
    }
}
