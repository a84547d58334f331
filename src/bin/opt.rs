use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use corrjet::cluster::{JetAlgorithm, RecombinationScheme};
use corrjet::compression::{
    Compression, GZIP_DEFAULT_LEVEL, LZ4_DEFAULT_LEVEL, ZSTD_DEFAULT_LEVEL,
};
use corrjet::config::JetType;
use corrjet::writer::OutputFormat;
use lazy_static::lazy_static;
use regex::Regex;
use strum::Display;
use thiserror::Error;

lazy_static! {
    static ref COMPRESSION_RE: Regex =
        Regex::new(r"^(?P<algo>[[:alnum:]]+)(?P<lvl>_\d+)?$").unwrap();
}

pub(crate) fn parse_compr(s: &str) -> Result<Compression, ParseCompressionErr> {
    use ParseCompressionErr::*;

    let lower_case = s.to_ascii_lowercase();
    let Some(captures) = COMPRESSION_RE.captures(&lower_case) else {
        return Err(UnknownAlgorithm(s.to_owned()));
    };
    let algo = &captures["algo"];
    let compression = match algo {
        "bzip2" | "bz2" => Compression::Bzip2,
        "gzip" | "gz" => Compression::Gzip(GZIP_DEFAULT_LEVEL),
        "lz4" => Compression::Lz4(LZ4_DEFAULT_LEVEL),
        "zstd" | "zstandard" => Compression::Zstd(ZSTD_DEFAULT_LEVEL),
        _ => return Err(UnknownAlgorithm(s.to_owned())),
    };
    let Some(lvl_str) = captures.name("lvl") else {
        return Ok(compression);
    };
    let unsupported = || UnsupportedLevel(lvl_str.as_str()[1..].to_owned(), algo.to_owned());
    let max_level = compression.max_level().ok_or_else(unsupported)?;
    let lvl: u8 = lvl_str.as_str()[1..].parse().map_err(|_| unsupported())?;
    if lvl > max_level {
        return Err(unsupported());
    }
    Ok(match compression {
        Compression::Gzip(_) => Compression::Gzip(lvl),
        Compression::Lz4(_) => Compression::Lz4(lvl),
        Compression::Zstd(_) => Compression::Zstd(lvl),
        Compression::Bzip2 => Compression::Bzip2,
    })
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub(crate) enum ParseCompressionErr {
    #[error("Unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Level {0} not supported for {1} compression")]
    UnsupportedLevel(String, String),
}

#[derive(Debug, Display, Default, Copy, Clone, ValueEnum)]
#[clap(rename_all = "lower")]
pub(crate) enum FileFormat {
    #[default]
    Records,
    Columns,
}

impl From<FileFormat> for OutputFormat {
    fn from(source: FileFormat) -> Self {
        match source {
            FileFormat::Records => OutputFormat::Records,
            FileFormat::Columns => OutputFormat::Columns,
        }
    }
}

/// Jet settings taking precedence over the configuration file
#[derive(Debug, Default, Copy, Clone, Parser)]
pub(crate) struct JetOverrides {
    #[clap(
        short = 'a',
        long,
        help = "Jet algorithm.\nPossible settings are 'anti-kt', 'kt', 'Cambridge-Aachen'."
    )]
    pub(crate) jetalgorithm: Option<JetAlgorithm>,
    /// Jet radius parameter.
    #[clap(short = 'R', long)]
    pub(crate) jetradius: Option<f64>,
    #[clap(
        long,
        help = "Recombination scheme.\nPossible settings are 'E', 'pt', 'pt2', 'Et', 'Et2'."
    )]
    pub(crate) recombination: Option<RecombinationScheme>,
    #[clap(
        long,
        help = "Particles included in jets.\nPossible settings are 'all', 'charged'."
    )]
    pub(crate) jettype: Option<JetType>,
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Output file.
    #[clap(long, short, value_parser)]
    pub(crate) outfile: PathBuf,

    /// Configuration file in YAML format.
    ///
    /// Settings that are not given take their default values.
    #[clap(long, short, value_parser)]
    pub(crate) config: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) jet: JetOverrides,

    /// Only build detector-level jets, even for simulated events.
    #[clap(long, default_value_t)]
    pub(crate) no_truth: bool,

    /// Output layout.
    #[clap(value_enum, long, default_value_t)]
    pub(crate) outformat: FileFormat,

    #[clap(long, value_parser = parse_compr,
                help = "Compress output file.
Possible settings are 'bzip2', 'gzip', 'zstd', 'lz4'.
Compression levels can be set with algorithm_level e.g. 'zstd_5'.
Maximum levels are 'gzip_9', 'zstd_19', 'lz4_16'.")]
    pub(crate) compression: Option<Compression>,

    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,

    #[clap(
        short,
        long,
        default_value_t = 1,
        help = "Number of threads.
If set to 0, a default number of threads is chosen.
The default can be set with the `RAYON_NUM_THREADS` environment
variable."
    )]
    pub(crate) threads: usize,

    /// Input event files in YAML format, optionally compressed.
    #[clap(name = "INFILES", value_parser, required = true)]
    pub(crate) infiles: Vec<PathBuf>,
}

#[derive(Debug, Clone, Error)]
pub(crate) enum ValidationError {
    #[error("Jet radius has to be positive, is {0}")]
    BadRadius(f64),
    #[error("Output file {0:?} is also an input file")]
    OverwritesInput(PathBuf),
}

impl Opt {
    pub(crate) fn validate(self) -> Result<Self, ValidationError> {
        if let Some(radius) = self.jet.jetradius {
            if !(radius > 0.) {
                return Err(ValidationError::BadRadius(radius));
            }
        }
        if self.infiles.contains(&self.outfile) {
            return Err(ValidationError::OverwritesInput(self.outfile));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression() {
        assert_eq!(parse_compr("bz2"), Ok(Compression::Bzip2));
        assert_eq!(parse_compr("gzip"), Ok(Compression::Gzip(GZIP_DEFAULT_LEVEL)));
        assert_eq!(parse_compr("ZSTD_5"), Ok(Compression::Zstd(5)));
        assert_eq!(parse_compr("lz4_16"), Ok(Compression::Lz4(16)));
        assert!(matches!(
            parse_compr("gzip_10"),
            Err(ParseCompressionErr::UnsupportedLevel(..))
        ));
        assert!(matches!(
            parse_compr("bzip2_3"),
            Err(ParseCompressionErr::UnsupportedLevel(..))
        ));
        assert!(matches!(
            parse_compr("xz"),
            Err(ParseCompressionErr::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn jet_options() {
        let opt = Opt::parse_from([
            "corrjet", "-o", "out.yaml", "-a", "kt", "-R", "0.7",
            "--recombination", "E", "--jettype", "charged", "in.yaml",
        ]);
        assert_eq!(opt.jet.jetalgorithm, Some(JetAlgorithm::Kt));
        assert_eq!(opt.jet.jetradius, Some(0.7));
        assert_eq!(opt.jet.recombination, Some(RecombinationScheme::E));
        assert_eq!(opt.jet.jettype, Some(JetType::Charged));
        assert!(opt.validate().is_ok());

        let opt = Opt::parse_from(["corrjet", "-o", "in.yaml", "in.yaml"]);
        assert!(matches!(
            opt.validate(),
            Err(ValidationError::OverwritesInput(_))
        ));
    }
}
