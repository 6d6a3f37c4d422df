//! # Doc Intake CLI (`intake`)
//!
//! Every command starts from an empty in-memory collection, uploads the
//! given files and directories, and then runs one workflow over them.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `intake groups <paths..>` | Show the classification plan |
//! | `intake classify <paths..>` | Label each group, then browse the result |
//! | `intake search-image <query> <paths..>` | Find documents "similar" to a reference image |
//! | `intake search-prompt "<prompt>" <paths..>` | Find documents for a text prompt |
//! | `intake export <paths..> --out <dir>` | Label, then write files and a manifest |
//!
//! ## Examples
//!
//! ```bash
//! # Interactive labeling of a scan folder
//! intake classify ./scans
//!
//! # Scripted labeling, then list only the IDs
//! intake classify ./scans --label "ID" --label "Personal" --classification ID
//!
//! # Search by reference image without the artificial delay
//! intake search-image ./query/us3.jpg ./scans --no-delay
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use doc_intake::acquire::{acquire_paths, read_upload};
use doc_intake::config::{self, Config, SearchConfig};
use doc_intake::export::export_collection;
use doc_intake::logging;
use doc_intake::session::IntakeSession;
use doc_intake_core::blob::BlobRegistry;
use doc_intake_core::error::SequencerError;
use doc_intake_core::models::{DocumentSummary, Mode};
use doc_intake_core::sequencer::StepState;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Doc Intake — upload scans, label them in guided batches, browse and
/// search the collection.
#[derive(Parser)]
#[command(
    name = "intake",
    about = "Doc Intake — upload scans, label them in guided batches, browse and search the collection",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/intake.toml")]
    config: PathBuf,

    /// Log debug output to stderr (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how the uploaded files split into classification steps.
    Groups {
        /// Files or directories to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Label each classification group, then browse the result.
    ///
    /// Labels are taken from `--label` in step order; without them each
    /// step is prompted on stdin.
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Label for the next step. Repeat once per step.
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Only show documents whose filename contains this text.
        #[arg(long)]
        search: Option<String>,

        /// Only show documents with exactly this classification.
        #[arg(long)]
        classification: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Search the uploaded documents by a reference image.
    SearchImage {
        /// The reference image file.
        query: PathBuf,

        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Skip the artificial search delay.
        #[arg(long)]
        no_delay: bool,

        #[arg(long)]
        json: bool,
    },

    /// Search the uploaded documents by a text prompt.
    SearchPrompt {
        prompt: String,

        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        no_delay: bool,

        #[arg(long)]
        json: bool,
    },

    /// Label the uploaded files, then export them with a manifest.
    Export {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output directory.
        #[arg(long)]
        out: PathBuf,

        /// Label for the next step. Repeat once per step.
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Export without running classification.
        #[arg(long)]
        skip_classify: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Groups { paths, json } => {
            let mut session = open_session(&cfg, &paths)?;
            let groups = session.preview_groups();
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
                return Ok(());
            }
            if groups.is_empty() {
                println!("No classification groups matched the uploaded documents.");
            }
            for (i, group) in groups.iter().enumerate() {
                println!(
                    "Step {}: {} ({} documents)",
                    i + 1,
                    group.label,
                    group.len()
                );
                for doc in session.store().query_by_ids(&group.member_ids) {
                    println!("  {}", doc.name());
                }
            }
            let unmatched =
                doc_intake_core::grouping::unmatched(session.store().documents(), session.rules());
            if !unmatched.is_empty() {
                println!("Not grouped ({}):", unmatched.len());
                for doc in unmatched {
                    println!("  {}", doc.name());
                }
            }
        }
        Commands::Classify {
            paths,
            labels,
            search,
            classification,
            json,
        } => {
            let mut session = open_session(&cfg, &paths)?;
            run_classification(&mut session, labels)?;

            session.set_mode(Mode::Browse)?;
            {
                let browse = session.browse_mut();
                browse.filter.search_term = search.unwrap_or_default();
                browse.filter.classification = classification;
            }
            let visible: Vec<DocumentSummary> = session
                .visible_documents()
                .iter()
                .map(|d| d.summary())
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_documents(&visible);
                println!("Classifications: {}", session.classifications().join(", "));
                println!("{}", session.browse_summary());
            }
        }
        Commands::SearchImage {
            query,
            paths,
            no_delay,
            json,
        } => {
            if no_delay {
                cfg.search = SearchConfig::immediate();
            }
            let reference = read_upload(&query, &BlobRegistry::new())?;
            let mut session = open_session(&cfg, &paths)?;
            session.set_mode(Mode::SearchImage)?;

            let pending = session.search_by_image(&reference.name);
            if !pending.delay().is_zero() {
                eprintln!("Searching...");
            }
            let results = pending.wait().await;
            session.record_image_results(results);

            if let Some(found) = session.image_results() {
                if json {
                    println!("{}", serde_json::to_string_pretty(found)?);
                } else {
                    println!("Results ({})", found.documents.len());
                    print_documents(&found.documents);
                }
            }
        }
        Commands::SearchPrompt {
            prompt,
            paths,
            no_delay,
            json,
        } => {
            if no_delay {
                cfg.search = SearchConfig::immediate();
            }
            let mut session = open_session(&cfg, &paths)?;
            session.set_mode(Mode::SearchPrompt)?;

            let pending = session.search_by_prompt(&prompt)?;
            if !pending.delay().is_zero() {
                eprintln!("Searching...");
            }
            let results = pending.wait().await;
            session.record_prompt_results(results);

            let found = session.prompt_results().unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(found)?);
            } else {
                println!("Results ({})", found.len());
                if found.is_empty() {
                    println!("No documents match your search");
                }
                print_documents(found);
            }
        }
        Commands::Export {
            paths,
            out,
            labels,
            skip_classify,
        } => {
            let mut session = open_session(&cfg, &paths)?;
            if !skip_classify {
                run_classification(&mut session, labels)?;
            }
            let manifest = export_collection(session.store(), &out)?;
            println!(
                "Exported {} documents to {}",
                manifest.documents.len(),
                out.display()
            );
        }
    }

    Ok(())
}

/// Create a session and upload `paths` into it.
fn open_session(cfg: &Config, paths: &[PathBuf]) -> Result<IntakeSession> {
    let mut session = IntakeSession::new(cfg)?;
    let files = acquire_paths(paths, &cfg.intake, session.store().blobs())?;
    let added = session.upload(files);
    eprintln!(
        "Uploaded {} document(s) ({} bytes)",
        added,
        session.store().blobs().live_bytes()
    );
    Ok(session)
}

/// Walk the sequencer to completion.
///
/// Scripted labels are consumed in order; once they run out, steps are
/// prompted on stdin. A blank scripted label is fatal, a blank typed label
/// is asked again. An empty collection or one no rule matches is reported
/// and skipped, so the caller still browses or exports what was uploaded.
fn run_classification(session: &mut IntakeSession, labels: Vec<String>) -> Result<()> {
    if let Err(err) = session.proceed_to_classify() {
        if err.is_empty_collection() {
            eprintln!("{}", err);
            return Ok(());
        }
        return Err(err.into());
    }

    let mut scripted = labels.into_iter();
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(sequencer) = session.sequencer() else {
            bail!("classification is not active");
        };
        let StepState::AwaitingInput(step) = sequencer.state() else {
            break;
        };
        let total = sequencer.total_steps();
        let Some(group) = sequencer.current_group() else {
            break;
        };
        let sample = session
            .store()
            .get(&group.sample_id)
            .map(|d| d.name().to_string())
            .unwrap_or_default();
        eprintln!(
            "Step {}/{}: {} ({} documents, sample: {})",
            step + 1,
            total,
            group.label,
            group.len(),
            sample
        );

        let (label, from_script) = match scripted.next() {
            Some(label) => (label, true),
            None => {
                if interactive {
                    eprint!("Classification type: ");
                    std::io::stderr().flush()?;
                }
                match lines.next() {
                    Some(line) => (line?, false),
                    None => bail!("classification incomplete: no label for step {}", step + 1),
                }
            }
        };

        match session.submit_label(&label) {
            Ok(outcome) => {
                eprintln!(
                    "Applied \"{}\" to {} documents",
                    outcome.label, outcome.labeled
                );
            }
            Err(SequencerError::EmptyLabel) if !from_script => {
                eprintln!("{}", SequencerError::EmptyLabel);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let unused = scripted.count();
    if unused > 0 {
        eprintln!("Warning: ignoring {} unused --label value(s)", unused);
    }

    eprintln!("Classification complete!");
    Ok(())
}

fn print_documents(docs: &[DocumentSummary]) {
    if docs.is_empty() {
        return;
    }
    println!("{:<42} {:<32} CLASSIFICATION", "ID", "NAME");
    for doc in docs {
        println!(
            "{:<42} {:<32} {}",
            doc.id,
            doc.name,
            doc.classification.as_deref().unwrap_or("-")
        );
    }
}
