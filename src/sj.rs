use std::path::Path;
use std::sync::Arc;

use log::info;
use polars::prelude::*;

use crate::intervals::{GenomicInterval, IntervalCollection, Strand};

/// Payload of one STAR `SJ.out.tab` record, past the interval coordinates.
///
/// Carried through the containment algorithms unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceJunction {
    /// Motif code as written by STAR: 0 non-canonical, 1/2 GT-AG, 3/4 GC-AG,
    /// 5/6 AT-AC.
    pub intron_motif: i32,
    pub annotated: bool,
    pub reads_unique: i64,
    pub reads_multimapped: i64,
    pub max_overhang: i64,
}

/// Quality thresholds applied to splice junctions after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SjFilter {
    pub min_unique_reads: i64,
    pub min_overhang: i64,
}

impl Default for SjFilter {
    fn default() -> Self {
        SjFilter {
            min_unique_reads: 5,
            min_overhang: 20,
        }
    }
}

impl SjFilter {
    #[inline]
    pub fn passes(&self, junction: &SpliceJunction) -> bool {
        junction.reads_unique >= self.min_unique_reads
            && junction.max_overhang >= self.min_overhang
    }
}

fn sj_schema() -> Schema {
    Schema::from_iter(vec![
        Field::new("chromosome".into(), DataType::String),
        Field::new("start".into(), DataType::Int64),
        Field::new("end".into(), DataType::Int64),
        Field::new("strand".into(), DataType::Int32),
        Field::new("intron_motif".into(), DataType::Int32),
        Field::new("annotated".into(), DataType::Int32),
        Field::new("reads_unique".into(), DataType::Int64),
        Field::new("reads_multimapped".into(), DataType::Int64),
        Field::new("max_overhang".into(), DataType::Int64),
    ])
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> PolarsResult<T> {
    value.ok_or_else(|| {
        PolarsError::ComputeError(format!("missing value in column '{column}' at row {row}").into())
    })
}

/// Load a STAR `SJ.out.tab` file into an interval collection.
///
/// STAR SJ files are 1-based with inclusive interval ends, while this crate
/// uses 0-based half-open coordinates, so the start is shifted down by one
/// (the end value is unchanged: the 0-/1- indexing shift cancels out with
/// inclusiveness / exclusiveness). Junctions with undefined strand (code 0)
/// are omitted, as are junctions failing the quality thresholds.
pub fn load_sj_file(
    path: &Path,
    filter: &SjFilter,
) -> PolarsResult<IntervalCollection<SpliceJunction>> {
    let parse_options = CsvParseOptions::default().with_separator(b'\t');
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(sj_schema())))
        .with_rechunk(true)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let records = sj_records_from_dataframe(&df, filter)?;
    info!(
        "{}: kept {} of {} splice junctions",
        path.display(),
        records.len(),
        df.height()
    );
    Ok(IntervalCollection::new(records))
}

/// Convert a dataframe with the `SJ.out.tab` column layout into splice
/// junction interval records, applying strand translation, coordinate
/// normalization, and the quality thresholds.
pub fn sj_records_from_dataframe(
    df: &DataFrame,
    filter: &SjFilter,
) -> PolarsResult<Vec<GenomicInterval<SpliceJunction>>> {
    let chromosomes = df.column("chromosome")?.str()?;
    let starts = df.column("start")?.i64()?;
    let ends = df.column("end")?.i64()?;
    let strands = df.column("strand")?.i32()?;
    let motifs = df.column("intron_motif")?.i32()?;
    let annotated = df.column("annotated")?.i32()?;
    let reads_unique = df.column("reads_unique")?.i64()?;
    let reads_multimapped = df.column("reads_multimapped")?.i64()?;
    let overhangs = df.column("max_overhang")?.i64()?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let strand = match required(strands.get(row), "strand", row)? {
            1 => Strand::Forward,
            2 => Strand::Reverse,
            // Undefined strand: the junction is unusable for strand-aware
            // containment and is dropped here.
            _ => continue,
        };

        let junction = SpliceJunction {
            intron_motif: required(motifs.get(row), "intron_motif", row)?,
            annotated: required(annotated.get(row), "annotated", row)? != 0,
            reads_unique: required(reads_unique.get(row), "reads_unique", row)?,
            reads_multimapped: required(reads_multimapped.get(row), "reads_multimapped", row)?,
            max_overhang: required(overhangs.get(row), "max_overhang", row)?,
        };
        if !filter.passes(&junction) {
            continue;
        }

        records.push(GenomicInterval {
            chromosome: required(chromosomes.get(row), "chromosome", row)?.to_string(),
            start: required(starts.get(row), "start", row)? - 1,
            end: required(ends.get(row), "end", row)?,
            strand,
            payload: junction,
        });
    }

    Ok(records)
}

/// Load a tab-separated interval record file into a payload-free collection.
///
/// The structural contract is four leading columns — chromosome, 0-based
/// start, exclusive end, `+`/`-` strand — with any further columns ignored.
/// Rows with any other strand symbol are dropped.
pub fn load_interval_records(path: &Path) -> PolarsResult<IntervalCollection<()>> {
    let fields = vec![
        Field::new("column_1".into(), DataType::String),
        Field::new("column_2".into(), DataType::Int64),
        Field::new("column_3".into(), DataType::Int64),
        Field::new("column_4".into(), DataType::String),
    ];
    let schema = Schema::from_iter(fields);

    let parse_options = CsvParseOptions::default().with_separator(b'\t');
    let mut df = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema_overwrite(Some(Arc::new(schema)))
        .with_projection(Some(Arc::new(vec![0, 1, 2, 3])))
        .with_rechunk(true)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    df.set_column_names(["chromosome", "start", "end", "strand"])?;

    let records = interval_records_from_dataframe(&df)?;
    info!(
        "{}: kept {} of {} interval records",
        path.display(),
        records.len(),
        df.height()
    );
    Ok(IntervalCollection::new(records))
}

/// Convert a dataframe with chromosome/start/end/strand columns into
/// payload-free interval records, dropping unstranded rows.
pub fn interval_records_from_dataframe(
    df: &DataFrame,
) -> PolarsResult<Vec<GenomicInterval<()>>> {
    let chromosomes = df.column("chromosome")?.str()?;
    let starts = df.column("start")?.i64()?;
    let ends = df.column("end")?.i64()?;
    let strands = df.column("strand")?.str()?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let symbol = required(strands.get(row), "strand", row)?;
        let Some(strand) = Strand::from_symbol(symbol) else {
            continue;
        };

        records.push(GenomicInterval {
            chromosome: required(chromosomes.get(row), "chromosome", row)?.to_string(),
            start: required(starts.get(row), "start", row)?,
            end: required(ends.get(row), "end", row)?,
            strand,
            payload: (),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sj_dataframe(rows: &[(&str, i64, i64, i32, i32, i32, i64, i64, i64)]) -> DataFrame {
        df!(
            "chromosome" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            "start" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            "end" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            "strand" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
            "intron_motif" => rows.iter().map(|r| r.4).collect::<Vec<_>>(),
            "annotated" => rows.iter().map(|r| r.5).collect::<Vec<_>>(),
            "reads_unique" => rows.iter().map(|r| r.6).collect::<Vec<_>>(),
            "reads_multimapped" => rows.iter().map(|r| r.7).collect::<Vec<_>>(),
            "max_overhang" => rows.iter().map(|r| r.8).collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn converts_coordinates_to_zero_based_half_open() {
        let df = sj_dataframe(&[("chr1", 1001, 2000, 1, 1, 0, 10, 2, 35)]);
        let records = sj_records_from_dataframe(&df, &SjFilter::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chromosome, "chr1");
        assert_eq!(records[0].start, 1000);
        assert_eq!(records[0].end, 2000);
        assert_eq!(records[0].strand, Strand::Forward);
        assert_eq!(
            records[0].payload,
            SpliceJunction {
                intron_motif: 1,
                annotated: false,
                reads_unique: 10,
                reads_multimapped: 2,
                max_overhang: 35,
            }
        );
    }

    #[test]
    fn translates_strand_codes_and_drops_unstranded() {
        let df = sj_dataframe(&[
            ("chr1", 100, 200, 1, 1, 0, 10, 0, 30),
            ("chr1", 300, 400, 2, 2, 1, 10, 0, 30),
            ("chr1", 500, 600, 0, 0, 0, 10, 0, 30),
        ]);
        let records = sj_records_from_dataframe(&df, &SjFilter::default()).unwrap();

        let strands: Vec<Strand> = records.iter().map(|r| r.strand).collect();
        assert_eq!(strands, vec![Strand::Forward, Strand::Reverse]);
    }

    #[rstest]
    #[case(4, 30, 0)] // too few unique reads
    #[case(5, 19, 0)] // overhang too short
    #[case(5, 20, 1)] // both thresholds met exactly
    fn quality_thresholds_are_inclusive(
        #[case] reads_unique: i64,
        #[case] max_overhang: i64,
        #[case] expected: usize,
    ) {
        let df = sj_dataframe(&[("chr1", 100, 200, 1, 1, 0, reads_unique, 0, max_overhang)]);
        let records = sj_records_from_dataframe(&df, &SjFilter::default()).unwrap();
        assert_eq!(records.len(), expected);
    }

    #[test]
    fn interval_records_keep_coordinates_verbatim() {
        let df = df!(
            "chromosome" => ["chr1", "chr1", "chrX"],
            "start" => [100i64, 300, 700],
            "end" => [200i64, 400, 900],
            "strand" => ["+", ".", "-"],
        )
        .unwrap();
        let records = interval_records_from_dataframe(&df).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start, 100);
        assert_eq!(records[0].strand, Strand::Forward);
        assert_eq!(records[1].chromosome, "chrX");
        assert_eq!(records[1].strand, Strand::Reverse);
    }
}
