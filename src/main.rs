use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::{error, info, Level};
use polars::prelude::*;
use simple_logger::init_with_level;

use sjnest::intervals::{ContainmentResult, GenomicInterval, IntervalCollection};
use sjnest::nested::find_nested;
use sjnest::sj::{load_interval_records, load_sj_file, SjFilter};

/// Detect splice junctions / introns nested strictly inside other introns.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input with the candidate outer intervals
    outer: PathBuf,

    /// Input with the candidate nested intervals; when omitted, the outer
    /// set is queried against itself
    inner: Option<PathBuf>,

    /// Format of the outer input
    #[arg(long, value_enum, default_value = "sj")]
    outer_format: InputFormat,

    /// Format of the inner input
    #[arg(long, value_enum, default_value = "sj")]
    inner_format: InputFormat,

    /// Minimum unique-mapping read support for a splice junction
    #[arg(long, default_value_t = 5)]
    min_unique_reads: i64,

    /// Minimum spliced-alignment overhang for a splice junction
    #[arg(long, default_value_t = 20)]
    min_overhang: i64,

    /// Output TSV path
    #[arg(short = 'o', long, default_value = "nested_introns.tsv")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// STAR SJ.out.tab splice junction file
    Sj,
    /// Tab-separated chromosome/start/end/strand records
    Records,
}

fn main() {
    let start = Instant::now();
    init_with_level(Level::Info).unwrap();

    let args = Args::parse();
    run(&args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    info!("Elapsed time: {:?}", start.elapsed());
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let filter = SjFilter {
        min_unique_reads: args.min_unique_reads,
        min_overhang: args.min_overhang,
    };

    let outer = load_collection(&args.outer, args.outer_format, &filter)?;
    let results = match &args.inner {
        Some(path) => {
            let inner = load_collection(path, args.inner_format, &filter)?;
            find_nested(&outer, &inner)?
        }
        None => find_nested(&outer, &outer)?,
    };

    let with_nested = results.iter().filter(|r| r.has_nested).count();
    info!(
        "{} of {} outer intervals contain nested junctions",
        with_nested,
        outer.len()
    );

    write_results(&outer, &results, &args.output)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}

fn load_collection(
    path: &Path,
    format: InputFormat,
    filter: &SjFilter,
) -> Result<IntervalCollection<()>, Box<dyn Error>> {
    let collection = match format {
        InputFormat::Sj => coordinates_only(load_sj_file(path, filter)?),
        InputFormat::Records => load_interval_records(path)?,
    };
    Ok(collection)
}

/// The containment query and the output only need coordinates; payloads of
/// whatever input format are dropped after loading.
fn coordinates_only<P>(collection: IntervalCollection<P>) -> IntervalCollection<()> {
    IntervalCollection::new(
        collection
            .into_iter()
            .map(|record| GenomicInterval {
                chromosome: record.chromosome,
                start: record.start,
                end: record.end,
                strand: record.strand,
                payload: (),
            })
            .collect(),
    )
}

/// Write the outer records augmented with `has_nested` and the comma-joined
/// nested identifiers.
fn write_results(
    outer: &IntervalCollection<()>,
    results: &[ContainmentResult],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut chromosomes = Vec::with_capacity(outer.len());
    let mut starts = Vec::with_capacity(outer.len());
    let mut ends = Vec::with_capacity(outer.len());
    let mut strands = Vec::with_capacity(outer.len());
    let mut has_nested = Vec::with_capacity(outer.len());
    let mut nested_ids = Vec::with_capacity(outer.len());

    for ((_, record), result) in outer.iter().zip(results.iter()) {
        chromosomes.push(record.chromosome.as_str());
        starts.push(record.start);
        ends.push(record.end);
        strands.push(record.strand.symbol());
        has_nested.push(result.has_nested);
        nested_ids.push(
            result
                .nested_identifiers
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    let mut df = df!(
        "chromosome" => chromosomes,
        "start" => starts,
        "end" => ends,
        "strand" => strands,
        "has_nested" => has_nested,
        "nested_ids" => nested_ids,
    )?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(&mut df)?;

    Ok(())
}
