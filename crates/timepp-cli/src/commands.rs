use anyhow::{Context, Result, bail};
use tracing::{debug, info, info_span};

use timepp_cli::output::{replace_column, write_frame};
use timepp_ingest::{CsvOptions, Dataset};
use timepp_model::{ComponentOutput, EncodingKind, HandleUnknown, Table};
use timepp_transform::{
    Decomposer, Encoder, NanReport, Normalizer, StlOptions, auto_fill_missing_time_steps,
    fill_missing_time_steps, nan_report,
};

use crate::cli::{
    DecomposeArgs, EncodeArgs, FillArgs, InputArgs, MethodArg, NanArgs, NormalizeArgs,
};
use crate::summary::{mapping_table, print_normalizer_params};

pub fn load_table(args: &InputArgs) -> Result<Table> {
    let delimiter = u8::try_from(args.delimiter)
        .with_context(|| format!("delimiter '{}' is not a single byte", args.delimiter))?;
    let mut options = CsvOptions::default().with_delimiter(delimiter);
    if let Some(index) = &args.index {
        options = options.with_index(index.as_str(), args.freq);
    } else if args.freq.is_some() {
        bail!("--freq needs --index");
    }
    let dataset = Dataset::from_csv(&args.input, &options)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    info!(
        path = %args.input.display(),
        rows = dataset.table().height(),
        columns = dataset.table().width(),
        "loaded table"
    );
    Ok(dataset.into_table())
}

pub fn run_nan(args: &NanArgs) -> Result<NanReport> {
    let _span = info_span!("nan", path = %args.input.input.display()).entered();
    let table = load_table(&args.input)?;
    nan_report(&table).context("failed to compute missing-value report")
}

pub fn run_fill(args: &FillArgs) -> Result<()> {
    let _span = info_span!("fill", path = %args.input.input.display()).entered();
    let table = load_table(&args.input)?;
    let freq = table
        .freq()
        .context("fill needs --freq or an index with a regular spacing")?;
    let filled = match (&args.start, &args.end) {
        (Some(start), Some(end)) => fill_missing_time_steps(&table, start, end, freq),
        _ => auto_fill_missing_time_steps(&table, freq),
    }
    .context("failed to fill missing time steps")?;
    let mut frame = filled.into_frame();
    write_frame(&mut frame, args.output.output.as_deref())
}

pub fn run_decompose(args: &DecomposeArgs) -> Result<()> {
    let _span = info_span!("decompose", column = %args.column).entered();
    let table = load_table(&args.input)?;
    let decomposer = Decomposer::new(&table, &args.column)?;
    let output = if args.append {
        ComponentOutput::AppendToCopy
    } else {
        ComponentOutput::ComponentsOnly
    };
    let result = match args.method {
        MethodArg::Classical => decomposer.classical(args.model.into(), args.period, output),
        MethodArg::Stl => {
            let mut options = StlOptions::new()
                .with_seasonal(args.seasonal)
                .with_robust(!args.no_robust);
            if let Some(period) = args.period {
                options = options.with_period(period);
            }
            decomposer.stl(&options, output)
        }
    }
    .with_context(|| format!("failed to decompose '{}'", args.column))?;
    let mut frame = result.into_frame();
    write_frame(&mut frame, args.output.output.as_deref())
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<()> {
    let _span = info_span!("normalize", column = %args.column).entered();
    let table = load_table(&args.input)?;
    let mut normalizer = Normalizer::new(&table);
    let params = match &args.params {
        Some(path) => normalizer
            .load(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => normalizer
            .fit(&args.column)
            .with_context(|| format!("failed to fit '{}'", args.column))?,
    };
    print_normalizer_params(&args.column, &params);
    if let Some(path) = &args.save {
        normalizer
            .save(path)
            .with_context(|| format!("failed to save parameters to {}", path.display()))?;
    }

    let scaled = if args.inverse {
        normalizer.inverse_transform(&args.column)?
    } else {
        normalizer.transform(&args.column)?
    };
    let mut frame = table.frame().clone();
    frame.with_column(scaled)?;
    write_frame(&mut frame, args.output.output.as_deref())
}

pub fn run_encode(args: &EncodeArgs) -> Result<()> {
    let _span = info_span!("encode", column = %args.column).entered();
    let table = load_table(&args.input)?;
    let handle_unknown = if args.ignore_unknown {
        HandleUnknown::Ignore
    } else {
        HandleUnknown::Error
    };
    let mut encoder =
        Encoder::new(&table, EncodingKind::from(args.kind)).with_handle_unknown(handle_unknown);
    match &args.load {
        Some(path) => {
            encoder
                .load(path)
                .with_context(|| format!("failed to load encoding from {}", path.display()))?;
        }
        None => {
            encoder
                .fit(&args.column)
                .with_context(|| format!("failed to fit '{}'", args.column))?;
        }
    }
    if let Some(path) = &args.save {
        encoder
            .save(path)
            .with_context(|| format!("failed to save encoding to {}", path.display()))?;
    }

    if args.mapping {
        println!("{}", mapping_table(&encoder.mapping()?));
        return Ok(());
    }

    let encoded = encoder
        .transform(&args.column)
        .with_context(|| format!("failed to encode '{}'", args.column))?;
    debug!(columns = encoded.width(), "encoded column");
    let mut frame = replace_column(table.frame(), &args.column, encoded)?;
    write_frame(&mut frame, args.output.output.as_deref())
}
