//! CLI argument definitions for timepp.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use timepp_cli::logging::LogFormat;
use timepp_model::{DecomposeMode, EncodingKind, Frequency};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "timepp",
    version,
    about = "Time-series preprocessing for CSV tables",
    long_about = "Preprocess time-indexed CSV tables.\n\n\
                  Reports missing values, fills gaps in the time index, decomposes\n\
                  series into seasonal/trend/residual parts, and normalizes or\n\
                  encodes columns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report the fraction of missing values per column.
    Nan(NanArgs),

    /// Insert zero rows for missing time steps.
    Fill(FillArgs),

    /// Split a column into seasonal, trend and residual components.
    Decompose(DecomposeArgs),

    /// Scale a column to zero mean and unit variance.
    Normalize(NormalizeArgs),

    /// Encode a categorical column.
    Encode(EncodeArgs),
}

/// Where and how to read the input table.
#[derive(Args, Clone)]
pub struct InputArgs {
    /// CSV file to read.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Column to use as the time index.
    #[arg(long = "index", value_name = "COLUMN")]
    pub index: Option<String>,

    /// Frequency of the time index (e.g. D, H, 15min, W, MS, ME, QE, YE).
    ///
    /// Inferred from the index values when omitted.
    #[arg(long = "freq", value_name = "FREQ")]
    pub freq: Option<Frequency>,

    /// Field delimiter.
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,
}

/// Where to write the resulting table.
#[derive(Args, Clone)]
pub struct OutputArgs {
    /// Output CSV path (stdout when omitted).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct NanArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct FillArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// First grid timestamp (defaults to the earliest index value).
    #[arg(long = "start", requires = "end")]
    pub start: Option<String>,

    /// Last grid timestamp (defaults to the latest index value).
    #[arg(long = "end", requires = "start")]
    pub end: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Column to decompose.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Decomposition method.
    #[arg(long = "method", value_enum, default_value = "classical")]
    pub method: MethodArg,

    /// Component model for classical decomposition.
    #[arg(long = "model", value_enum, default_value = "additive")]
    pub model: ModelArg,

    /// Seasonal period (derived from the index frequency when omitted).
    #[arg(long = "period")]
    pub period: Option<usize>,

    /// Disable STL's outlier-robust reweighting.
    #[arg(long = "no-robust")]
    pub no_robust: bool,

    /// STL seasonal smoother length (odd, at least 3).
    #[arg(long = "seasonal", default_value_t = 7)]
    pub seasonal: usize,

    /// Append components to the input columns instead of writing them alone.
    #[arg(long = "append")]
    pub append: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Column to normalize.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Use saved parameters instead of fitting.
    #[arg(long = "params", value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Save the fitted parameters.
    #[arg(long = "save", value_name = "JSON", conflicts_with = "params")]
    pub save: Option<PathBuf>,

    /// Undo a previous normalization (requires --params).
    #[arg(long = "inverse", requires = "params")]
    pub inverse: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Column to encode.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Encoding to apply.
    #[arg(long = "kind", value_enum, default_value = "one-hot")]
    pub kind: EncodingArg,

    /// Encode unseen categories as all zeros (one-hot only).
    #[arg(long = "ignore-unknown")]
    pub ignore_unknown: bool,

    /// Use a saved encoding instead of fitting.
    #[arg(long = "load", value_name = "JSON")]
    pub load: Option<PathBuf>,

    /// Save the fitted encoding.
    #[arg(long = "save", value_name = "JSON", conflicts_with = "load")]
    pub save: Option<PathBuf>,

    /// Print the category mapping instead of the encoded table.
    #[arg(long = "mapping")]
    pub mapping: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Classical,
    Stl,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModelArg {
    #[value(alias = "add")]
    Additive,
    #[value(alias = "mul")]
    Multiplicative,
}

impl From<ModelArg> for DecomposeMode {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Additive => DecomposeMode::Additive,
            ModelArg::Multiplicative => DecomposeMode::Multiplicative,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EncodingArg {
    #[value(alias = "onehot")]
    OneHot,
    Label,
}

impl From<EncodingArg> for EncodingKind {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::OneHot => EncodingKind::OneHot,
            EncodingArg::Label => EncodingKind::Label,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
