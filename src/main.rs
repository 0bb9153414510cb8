use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use meroku::io::download::working_group_prefix;
use meroku::io::{load_working_groups, write_json, COUNCIL_INDEX_URL};
use meroku::{
    execute_stage0, execute_stage1, execute_stage2, execute_stage3, load_member_list_file, resolve,
    DocumentKind, DownloadConfig, Downloader, Rosters, Stage1Config, Stage3Config,
};

#[derive(Parser)]
#[command(name = "meroku")]
#[command(author, version, about = "Committee minutes parser with speaker name resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse downloaded minutes and export JSON, CSV and KH Coder files
    Parse {
        /// Input directory containing html/ and html_from_pdf/
        #[arg(short, long, default_value = "./data/example")]
        dir: PathBuf,

        /// Output root; results go to <out>/output_<timestamp>
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also parse rosters in html/memberlist/ and resolve speakers
        #[arg(long)]
        memberlist: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve one speaker label against a roster file
    Resolve {
        /// Roster HTML file
        #[arg(short, long)]
        memberlist: PathBuf,

        /// Speaker label as written in the transcript, without brackets
        #[arg(short, long)]
        label: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Download working-group transcripts, or arbitrary pages, to files
    Download {
        /// Three-digit id of the working group to download
        #[arg(long, conflicts_with = "all")]
        wgid: Option<String>,

        /// Download every working group
        #[arg(long)]
        all: bool,

        /// Also download roster pages into html/memberlist/
        #[arg(long)]
        memberlist: bool,

        /// Council index page listing the working groups
        #[arg(long, default_value = COUNCIL_INDEX_URL)]
        root_url: String,

        /// URL to fetch (repeatable)
        #[arg(short, long)]
        url: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        list: Option<PathBuf>,

        /// Directory to save into (default ./data/download_<timestamp>)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Prefix for saved file names, e.g. "no03wg057-"
        #[arg(long, default_value = "")]
        prefix: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Settings for one batch parse run
#[derive(Debug, Clone)]
struct ParseConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    with_member_list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            dir,
            out,
            memberlist,
            verbose,
        } => {
            setup_logging(verbose);
            let stamp = chrono::Local::now().format("%Y-%m-%dT%H%M%S");
            let out_root = out.unwrap_or_else(|| dir.join("json"));
            let config = ParseConfig {
                output_dir: out_root.join(format!("output_{}", stamp)),
                input_dir: dir,
                with_member_list: memberlist,
            };
            parse_minutes(&config)
        }
        Commands::Resolve {
            memberlist,
            label,
            verbose,
        } => {
            setup_logging(verbose);
            resolve_label(&memberlist, &label)
        }
        Commands::Download {
            wgid,
            all,
            memberlist,
            root_url,
            url,
            list,
            dir,
            prefix,
            verbose,
        } => {
            setup_logging(verbose);
            let dir = dir.unwrap_or_else(|| {
                let stamp = chrono::Local::now().format("%Y-%m-%dT%H%M%S");
                PathBuf::from("./data").join(format!("download_{}", stamp))
            });
            if wgid.is_some() || all {
                let target = match wgid {
                    Some(id) => WorkingGroupTarget::One(id),
                    None => WorkingGroupTarget::All,
                };
                download_working_groups(&root_url, target, memberlist, dir).await
            } else {
                download_pages(url, list, dir, &prefix).await
            }
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn parse_minutes(config: &ParseConfig) -> Result<()> {
    let mut sources = Vec::new();
    for (sub, kind) in [("html", DocumentKind::Html), ("html_from_pdf", DocumentKind::Scanned)] {
        let dir = config.input_dir.join(sub);
        if dir.is_dir() {
            sources.push((dir, kind));
        }
    }
    if sources.is_empty() {
        bail!(
            "No html/ or html_from_pdf/ directory in {:?}",
            config.input_dir
        );
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;
    info!("Writing results to {:?}", config.output_dir);

    let working_groups_path = config.input_dir.join("working-groups.json");
    let working_groups = if working_groups_path.is_file() {
        match load_working_groups(&working_groups_path) {
            Ok(list) => Some(list),
            Err(e) => {
                warn!("Ignoring working-group list: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Stage 1: Segment transcripts
    info!("Stage 1: Segmenting transcripts...");
    let stage1_config = Stage1Config {
        per_file_output: Some(config.output_dir.clone()),
        ..Default::default()
    };
    let mut stage1_result = execute_stage1(&sources, &stage1_config)?;

    // Stage 0 & 2: Rosters and resolution (only with --memberlist)
    let mut rosters = Rosters::new();
    let mut roster_files = Vec::new();
    if config.with_member_list {
        let roster_dir = config.input_dir.join("html").join("memberlist");
        if roster_dir.is_dir() {
            info!("Stage 0: Loading rosters...");
            let stage0_result = execute_stage0(&roster_dir)?;
            rosters = stage0_result.rosters;
            roster_files = stage0_result.files;

            info!("Stage 2: Resolving speakers...");
            execute_stage2(&mut stage1_result.minutes, &rosters);
        } else {
            warn!("No roster directory at {:?}", roster_dir);
        }
    }

    // Stage 3: Rendering
    info!("Stage 3: Rendering output...");
    let stage3_result = execute_stage3(
        &stage1_result.minutes,
        &rosters,
        &roster_files,
        working_groups.as_ref(),
        &config.output_dir,
        &Stage3Config::default(),
    )?;

    info!(
        "Complete: {} transcripts, {} skipped, {} rosters exported",
        stage1_result.minutes.len(),
        stage1_result.skipped.len(),
        stage3_result.roster_paths.len()
    );
    Ok(())
}

fn resolve_label(memberlist: &Path, label: &str) -> Result<()> {
    let member_list = load_member_list_file(memberlist)
        .with_context(|| format!("Failed to load roster {:?}", memberlist))?;
    let resolution = resolve(&member_list, label);

    println!("Resolution for {}", label);
    println!("==================");
    match resolution.check() {
        Ok((person, score)) => println!("Best match: {} ({}) score {:.4}", person.label, person.id, score),
        Err(e) => println!("{}", e),
    }
    println!();
    println!("Similarities");
    println!("------------");
    for similarity in &resolution.similarities {
        println!(
            "{:.4}  {}  {}",
            similarity.score, similarity.target.label, similarity.target.affiliation
        );
    }

    Ok(())
}

/// Which working groups a download run covers
enum WorkingGroupTarget {
    One(String),
    All,
}

fn is_working_group_id(id: &str) -> bool {
    id.len() == 3 && id.chars().all(|c| c.is_ascii_digit())
}

async fn download_working_groups(
    root_url: &str,
    target: WorkingGroupTarget,
    with_member_list: bool,
    dir: PathBuf,
) -> Result<()> {
    if let WorkingGroupTarget::One(id) = &target {
        if !is_working_group_id(id) {
            bail!("{} is not a working-group id (three digits)", id);
        }
    }

    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let config = DownloadConfig {
        dir: dir.clone(),
        ..Default::default()
    };
    let downloader = Downloader::new(config)?;

    info!("Reading working groups from {}", root_url);
    let groups = downloader.discover_working_groups(root_url).await?;
    let groups_path = dir.join("working-groups.json");
    write_json(&groups, &groups_path)?;
    info!("Saved working-group list to {:?}", groups_path);

    let mut targets: Vec<_> = match &target {
        WorkingGroupTarget::All => groups.values().collect(),
        WorkingGroupTarget::One(id) => groups.values().filter(|wg| wg.id == *id).collect(),
    };
    if targets.is_empty() {
        if let WorkingGroupTarget::One(id) = &target {
            bail!("No working group with id {}", id);
        }
    }
    targets.sort_by(|a, b| a.order.cmp(&b.order));

    for wg in targets {
        let report = downloader.download_working_group(wg, with_member_list).await?;
        let name = format!("report_{}", working_group_prefix(wg).trim_end_matches('-'));
        report.save_named(&dir, &name)?;
    }
    Ok(())
}

async fn download_pages(
    mut urls: Vec<String>,
    list: Option<PathBuf>,
    dir: PathBuf,
    prefix: &str,
) -> Result<()> {
    if let Some(list) = list {
        let content = std::fs::read_to_string(&list)
            .with_context(|| format!("Failed to read URL list {:?}", list))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }
    if urls.is_empty() {
        bail!("No URLs given (use --url or --list)");
    }

    let config = DownloadConfig {
        dir: dir.clone(),
        ..Default::default()
    };
    let downloader = Downloader::new(config)?;
    let report = downloader.download_all(&urls, prefix).await?;
    let report_path = report.save(&dir)?;

    info!(
        "Downloaded {} of {} pages, report at {:?}",
        report.downloaded.len(),
        urls.len(),
        report_path
    );
    Ok(())
}
