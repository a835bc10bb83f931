use crate::config::BenchConfigOverrides;
use crate::rotation::TransformStrategy;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const SUPPORTED_FLAGS: &str = "--config, --curves, --keys, --steps, --duration, --chunk-size, \
--keyframe-chunk-size, --seed, --strategies, --keyframes, --parallel-sampling, --report";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub overrides: BenchConfigOverrides,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cli = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Supported flags: {SUPPORTED_FLAGS}.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            let overrides = &mut cli.overrides;
            match key {
                "config" => cli.config_path = Some(PathBuf::from(value)),
                "report" => cli.report_path = Some(PathBuf::from(value)),
                "curves" => overrides.curve_count = Some(parse_number("curves", &value)?),
                "keys" => overrides.keys_per_curve = Some(parse_number("keys", &value)?),
                "steps" => overrides.step_count = Some(parse_number("steps", &value)?),
                "duration" => overrides.duration = Some(parse_number("duration", &value)?),
                "chunk-size" => overrides.chunk_size = Some(parse_number("chunk-size", &value)?),
                "keyframe-chunk-size" => {
                    overrides.keyframe_chunk_size = Some(parse_number("keyframe-chunk-size", &value)?);
                }
                "seed" => overrides.seed = Some(parse_number("seed", &value)?),
                "strategies" => overrides.strategies = Some(parse_strategies(&value)?),
                "keyframes" => overrides.build_keyframes = Some(parse_bool_flag("keyframes", &value)?),
                "parallel-sampling" => {
                    overrides.parallel_sampling = Some(parse_bool_flag("parallel-sampling", &value)?);
                }
                _ => bail!("Unknown flag '{flag}'. Supported flags: {SUPPORTED_FLAGS}."),
            }
        }
        Ok(cli)
    }
}

fn parse_number<T>(flag: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().with_context(|| format!("Invalid {flag} '{value}'"))
}

fn parse_strategies(value: &str) -> Result<Vec<TransformStrategy>> {
    let strategies = value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<TransformStrategy>().with_context(|| format!("Invalid strategies '{value}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if strategies.is_empty() {
        bail!("--strategies needs at least one of sequential, parallel, vectorized");
    }
    Ok(strategies)
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
