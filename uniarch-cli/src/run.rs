//! Glue between the command line, the file inputs and the renderers.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use log::{debug, info};
use miette::{Context, IntoDiagnostic};
use uniarch_core::decoder::payload_offset;
use uniarch_core::source::resolve_definitions;
use uniarch_core::{
    create_inference, parse_table, ArchError, ArchiveKey, ArchiveSource, ColumnDefinition,
    DecodeOptions, FixedWidth, InferenceStrategy, RowWidthInference, Table,
};

use crate::input::{resolve_start, ColumnFile, FileArchive};
use crate::render;
use crate::{Cli, OutputFormat};

/// Outcome of decoding one archive file
#[derive(Debug)]
pub struct Decoded {
    /// Strategy that chose the width; `None` when `--width` was given
    pub strategy: Option<InferenceStrategy>,
    /// Raw row width, service fields included
    pub width: usize,
    /// Bytes skipped before the first row
    pub offset: usize,
    /// Size of the archive file
    pub bytes: usize,
    pub table: Table,
}

fn column_definitions(
    cli: &Cli,
    archive: &FileArchive,
    key: &ArchiveKey,
) -> Result<Option<Vec<ColumnDefinition>>, ArchError> {
    let Some(path) = &cli.columns else {
        return Ok(None);
    };
    let defs = match ColumnFile::load(path)? {
        ColumnFile::List(defs) => Some(defs).filter(|d| !d.is_empty()),
        keyed => resolve_definitions(archive, &keyed, key.record_id, key.archive_id),
    };
    Ok(defs)
}

/// Read, infer and decode the archive named on the command line.
pub fn decode_file(cli: &Cli) -> Result<Decoded, ArchError> {
    let archive = FileArchive::new(&cli.input, cli.header.clone());
    let key = archive.key(resolve_start(cli.start, archive.path()));
    let data = archive.read_archive(&key)?;

    let options = DecodeOptions {
        skip_marker_prefix: !cli.no_marker_prefix,
        service_fields: cli.service_fields,
        start: key.timestamp,
        period_ms: cli.period_ms,
        max_rows: cli.max_rows,
    };

    let (strategy, inference): (_, Box<dyn RowWidthInference>) = match cli.width {
        Some(width) => {
            debug!("Using fixed row width {}", width);
            (None, Box::new(FixedWidth::new(width)))
        }
        None => {
            let inference = create_inference(cli.strategy.into());
            (Some(inference.strategy()), inference)
        }
    };

    let defs = column_definitions(cli, &archive, &key)?;
    let table = parse_table(&data, inference.as_ref(), &options, defs.as_deref())?;
    let width = table.column_count() + options.service_fields;
    info!("{}: {} fields per row", key, width);

    Ok(Decoded {
        strategy,
        width,
        offset: payload_offset(&data, options.skip_marker_prefix),
        bytes: data.len(),
        table,
    })
}

fn write_output(cli: &Cli, decoded: &Decoded, out: &mut dyn Write) -> io::Result<()> {
    match cli.format {
        OutputFormat::Csv => render::write_csv(out, &decoded.table),
        OutputFormat::Json => render::write_json(out, &decoded.table),
        OutputFormat::Series => render::write_series(out, &decoded.table),
        OutputFormat::Summary => render::write_summary(out, decoded),
    }
}

/// Decode `cli.input` and write it in the requested format.
pub fn run(cli: Cli) -> miette::Result<()> {
    let decoded = decode_file(&cli)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot decode {}", cli.input.display()))?;

    info!(
        "{}: {} rows x {} columns",
        cli.input.display(),
        decoded.table.row_count(),
        decoded.table.column_count()
    );

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_output(&cli, &decoded, &mut out)
                .and_then(|_| out.flush())
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_output(&cli, &decoded, &mut out)
                .and_then(|_| out.flush())
                .into_diagnostic()
                .wrap_err("Cannot write to stdout")?;
        }
    }
    Ok(())
}
