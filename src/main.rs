//! gtftree: query GTF/BED-derived feature tuples with interval trees
//!
//! Usage: gtftree <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;

use gtftree::config::{self, QueryOptions};
use gtftree::ingest::{self, IngestError, QueryRegion};
use gtftree::output::MatchWriter;
use gtftree::{AnnotationIndex, MatchType, Strand, StrandType};

#[derive(Parser)]
#[command(name = "gtftree")]
#[command(version)]
#[command(about = "gtftree: interval-tree overlap queries over transcript/feature annotations", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Minimum work size (entries or queries) before work is spread across threads
    #[arg(long, global = true)]
    parallel_threshold: Option<usize>,

    /// Log debug messages (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report entries overlapping a single region
    Query {
        /// Entry tuples: chrom, start, end, name, strand, group (tab-separated)
        #[arg(short, long)]
        entries: PathBuf,

        /// Group labels, one per line (default: the group number)
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Query region as chrom:start-end (0-based, half-open)
        #[arg(short, long)]
        region: QueryRegion,

        /// Query strand: +, - or . (unspecified)
        #[arg(short, long, default_value = ".", allow_hyphen_values = true)]
        strand: Strand,

        /// Match type: any, exact, contain, within, start, end
        #[arg(short = 'm', long = "match", default_value = "any")]
        match_type: MatchType,

        /// Strand type: ignore, same, opposite, exact-same
        #[arg(short = 'S', long, default_value = "ignore")]
        strand_type: StrandType,
    },

    /// Report overlaps for every region in a query file
    Batch {
        /// Entry tuples: chrom, start, end, name, strand, group (tab-separated)
        #[arg(short, long)]
        entries: PathBuf,

        /// Group labels, one per line (default: the group number)
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Queries: chrom, start, end and optional strand (tab-separated)
        #[arg(short, long)]
        queries: PathBuf,

        /// Match type: any, exact, contain, within, start, end
        #[arg(short = 'm', long = "match", default_value = "any")]
        match_type: MatchType,

        /// Strand type: ignore, same, opposite, exact-same
        #[arg(short = 'S', long, default_value = "ignore")]
        strand_type: StrandType,
    },

    /// Print entry counts and tree heights per chromosome
    Stats {
        /// Entry tuples: chrom, start, end, name, strand, group (tab-separated)
        #[arg(short, long)]
        entries: PathBuf,
    },

    /// Print the balanced tree of every chromosome
    Dump {
        /// Entry tuples: chrom, start, end, name, strand, group (tab-separated)
        #[arg(short, long)]
        entries: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .expect("Failed to initialize thread pool");
    }
    if let Some(threshold) = cli.parallel_threshold {
        config::set_parallel_threshold(threshold);
    }

    let result = match cli.command {
        Commands::Query {
            entries,
            labels,
            region,
            strand,
            match_type,
            strand_type,
        } => run_query(entries, labels, region, strand, match_type, strand_type),
        Commands::Batch {
            entries,
            labels,
            queries,
            match_type,
            strand_type,
        } => run_batch(
            entries,
            labels,
            queries,
            QueryOptions::new(match_type, strand_type),
        ),
        Commands::Stats { entries } => run_stats(entries),
        Commands::Dump { entries } => run_dump(entries),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load(entries: PathBuf, labels: Option<PathBuf>) -> Result<AnnotationIndex, IngestError> {
    log::debug!("Loading entries from {}", entries.display());
    let (index, stats) = ingest::load_index_path(entries, labels)?;
    log::debug!("Index ready: {}", stats);
    Ok(index)
}

fn run_query(
    entries: PathBuf,
    labels: Option<PathBuf>,
    region: QueryRegion,
    strand: Strand,
    match_type: MatchType,
    strand_type: StrandType,
) -> Result<(), IngestError> {
    let index = load(entries, labels)?;
    let hits = index.find_overlaps(
        &region.chrom,
        region.start,
        region.end,
        strand,
        match_type,
        strand_type,
    )?;

    let stdout = io::stdout();
    let mut writer = MatchWriter::new(stdout.lock());
    for hit in &hits {
        writer.write_match(&region.chrom, hit)?;
    }
    writer.flush()?;
    Ok(())
}

fn run_batch(
    entries: PathBuf,
    labels: Option<PathBuf>,
    queries: PathBuf,
    options: QueryOptions,
) -> Result<(), IngestError> {
    let index = load(entries, labels)?;
    let queries = ingest::read_queries(File::open(queries)?)?;
    log::debug!("Running {} queries", queries.len());

    let results = index.forest.find_overlaps_batch(&queries, options)?;

    let stdout = io::stdout();
    let mut writer = MatchWriter::new(stdout.lock());
    for (i, (query, matches)) in queries.iter().zip(&results).enumerate() {
        for hit in index.label_matches(matches)? {
            writer.write_batch_match(i, &query.chrom, &hit)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn run_stats(entries: PathBuf) -> Result<(), IngestError> {
    let index = load(entries, None)?;
    let forest = &index.forest;

    let stdout = io::stdout();
    let mut writer = MatchWriter::new(stdout.lock());
    writer.write_line(&format!("entries\t{}", forest.count_entries()))?;
    for chrom in forest.chromosomes() {
        if let Some(tree) = forest.tree(chrom)? {
            writer.write_line(&format!("{}\t{}\t{}", chrom, tree.len(), tree.height()))?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn run_dump(entries: PathBuf) -> Result<(), IngestError> {
    let index = load(entries, None)?;
    let stdout = io::stdout();
    let mut handle = io::BufWriter::new(stdout.lock());
    index.forest.write_tree(&mut handle)?;
    io::Write::flush(&mut handle)?;
    Ok(())
}
