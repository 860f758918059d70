use crate::cli::{GenerateArgs, SplineMode};
use crate::error::{CliError, Result};
use crate::sim::flux::FluxSettings;
use crate::sim::geometry::GeometrySettings;
use crate::sim::physics::PhysicsSettings;
use fluxgen::engine::config::{JobConfig, JobConfigBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_EVENTS: u64 = 1000;
const DEFAULT_JOBS: usize = 1;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialJobSection {
    seed: Option<u64>,
    events: Option<u64>,
    jobs: Option<usize>,
    initial_pmax: Option<f64>,
    pmax_headroom: Option<f64>,
    splines: Option<SplineMode>,
}

/// A job file as written on disk; every section may still be overridden from the CLI.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialJobFile {
    job: Option<PartialJobSection>,
    flux: Option<FluxSettings>,
    geometry: Option<GeometrySettings>,
    physics: Option<PhysicsSettings>,
    tables: Option<BTreeMap<String, PathBuf>>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Fully resolved settings of a `generate` or `check` run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Settings of job 0; job `i` runs with `seed + i`.
    pub job: JobConfig,
    pub events: u64,
    pub jobs: usize,
    pub output: Option<PathBuf>,
    pub flux: FluxSettings,
    pub geometry: GeometrySettings,
    pub physics: PhysicsSettings,
    /// Fraction table files, with relative paths resolved against the job file.
    pub tables: BTreeMap<String, PathBuf>,
}

impl AppConfig {
    pub fn job_seed(&self, index: usize) -> u64 {
        self.job.seed.wrapping_add(index as u64)
    }

    /// Events assigned to job `index`; the remainder goes to the first jobs.
    pub fn job_events(&self, index: usize) -> u64 {
        let jobs = self.jobs as u64;
        let base = self.events / jobs;
        let extra = u64::from((index as u64) < self.events % jobs);
        base + extra
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}

impl PartialJobFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut file: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        file.base_dir = path.parent().map(Path::to_path_buf);
        Ok(file)
    }

    pub fn merge_with_cli(mut self, args: &GenerateArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let job = self.job.get_or_insert_with(Default::default);
        if let Some(seed) = args.seed {
            job.seed = Some(seed);
        }
        if let Some(events) = args.events {
            job.events = Some(events);
        }
        if let Some(jobs) = args.jobs {
            job.jobs = Some(jobs);
        }
        if let Some(mode) = args.splines {
            job.splines = Some(mode);
        }

        let mut config = self.resolve()?;
        config.output = args.output.clone();
        Ok(config)
    }

    /// Converts the file into run settings without any command-line overrides.
    pub fn resolve(self) -> Result<AppConfig> {
        let job_section = self.job.unwrap_or_default();

        let mut builder = JobConfigBuilder::new()
            .splines(job_section.splines.and_then(SplineMode::indexing));
        if let Some(seed) = job_section.seed {
            builder = builder.seed(seed);
        }
        if let Some(pmax) = job_section.initial_pmax {
            builder = builder.initial_pmax(pmax);
        }
        if let Some(headroom) = job_section.pmax_headroom {
            builder = builder.pmax_headroom(headroom);
        }
        let job = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        let jobs = job_section.jobs.unwrap_or(DEFAULT_JOBS);
        if jobs == 0 {
            return Err(CliError::Config("`job.jobs` must be at least 1".to_string()));
        }

        let flux = self
            .flux
            .ok_or_else(|| CliError::Config("`[flux]` section is required.".to_string()))?;
        let geometry = self
            .geometry
            .ok_or_else(|| CliError::Config("`[geometry]` section is required.".to_string()))?;

        let base_dir = self.base_dir;
        let tables = self
            .tables
            .unwrap_or_default()
            .into_iter()
            .map(|(name, path)| {
                let path = match &base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                };
                (name, path)
            })
            .collect();

        Ok(AppConfig {
            job,
            events: job_section.events.unwrap_or(DEFAULT_EVENTS),
            jobs,
            output: None,
            flux,
            geometry,
            physics: self.physics.unwrap_or_default(),
            tables,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            if let Some(field) = key.strip_prefix("job.") {
                let job = self.job.get_or_insert_with(Default::default);
                match field {
                    "seed" => job.seed = Some(parse_value(key, value)?),
                    "events" => job.events = Some(parse_value(key, value)?),
                    "jobs" => job.jobs = Some(parse_value(key, value)?),
                    "initial-pmax" => job.initial_pmax = Some(parse_value(key, value)?),
                    "pmax-headroom" => job.pmax_headroom = Some(parse_value(key, value)?),
                    "splines" => {
                        job.splines = Some(
                            <SplineMode as clap::ValueEnum>::from_str(value, true)
                                .map_err(|_| {
                                    CliError::Config(format!(
                                        "Invalid value for {}: '{}'",
                                        key, value
                                    ))
                                })?,
                        );
                    }
                    _ => return Err(unsupported(key)),
                }
                continue;
            }

            if let Some(field) = key.strip_prefix("flux.") {
                let flux = self.flux.as_mut().ok_or_else(|| {
                    CliError::Config(format!(
                        "Cannot set '{}': the job file has no [flux] section.",
                        key
                    ))
                })?;
                match field {
                    "weight" => flux.weight = parse_value(key, value)?,
                    "beam-radius" => flux.beam_radius = parse_value(key, value)?,
                    "max-probes" => flux.max_probes = Some(parse_value(key, value)?),
                    _ => return Err(unsupported(key)),
                }
                continue;
            }

            return Err(unsupported(key));
        }
        Ok(())
    }
}

fn unsupported(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use fluxgen::core::physics::spline::EnergyIndexing;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) const JOB_FILE: &str = r#"
[job]
seed = 42
events = 10
initial-pmax = 0.0
pmax-headroom = 1.1
splines = "log"

[flux]
species = 14
beam-radius = 5.0
spectrum = { type = "power-law", emin = 1.0, emax = 50.0, index = 1.5 }

[geometry]
z-start = 0.0

[[geometry.layers]]
name = "scintillator"
target = 1000060120
thickness = 100.0
half-width = 50.0

[[geometry.layers]]
name = "absorber"
target = 1000260560
thickness = 20.0
half-width = 50.0

[[physics.targets]]
target = 1000060120
channels = [
  { name = "cc", kind = "charged-current", slope = 1.0e-4 },
  { name = "nc", kind = "neutral-current", slope = 3.0e-5 },
]

[[physics.targets]]
target = 1000260560
channels = [
  { name = "cc", kind = "charged-current", slope = 1.0e-4 },
  { name = "charm", kind = "charm", slope = 1.0e-5, threshold = 5.0, table = "charm" },
]

[tables]
charm = "charm.toml"
"#;

    pub(crate) const CHARM_TABLE: &str = r#"
[[bins]]
emin = 0.0
emax = 1000.0
fractions = [{ pdg = 421, fraction = 0.6 }, { pdg = 411, fraction = 0.4 }]
"#;

    /// Writes the sample job and its table into `dir`, returning the job file path.
    pub(crate) fn write_job(dir: &Path, job: &str) -> PathBuf {
        fs::write(dir.join("charm.toml"), CHARM_TABLE).unwrap();
        let path = dir.join("job.toml");
        fs::write(&path, job).unwrap();
        path
    }

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["fluxgen", "generate", "-c", "job.toml"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Generate(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn file_values_are_resolved() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        let config = PartialJobFile::from_file(&path)
            .unwrap()
            .merge_with_cli(&generate_args(&[]))
            .unwrap();

        assert_eq!(config.job.seed, 42);
        assert_eq!(config.job.pmax_headroom, 1.1);
        assert_eq!(config.job.splines, Some(EnergyIndexing::Log));
        assert_eq!(config.events, 10);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.geometry.layers.len(), 2);
        assert_eq!(config.physics.targets.len(), 2);
        assert_eq!(config.tables["charm"], dir.path().join("charm.toml"));
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        let args = generate_args(&[
            "--seed", "7", "-n", "99", "--jobs", "3", "--splines", "off", "-S",
            "job.pmax-headroom=2.0", "-S", "flux.max-probes=500",
        ]);
        let config = PartialJobFile::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.job.seed, 7);
        assert_eq!(config.events, 99);
        assert_eq!(config.jobs, 3);
        assert_eq!(config.job.splines, None);
        assert_eq!(config.job.pmax_headroom, 2.0);
        assert_eq!(config.flux.max_probes, Some(500));
    }

    #[test]
    fn events_are_split_across_jobs_with_derived_seeds() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        let config = PartialJobFile::from_file(&path)
            .unwrap()
            .merge_with_cli(&generate_args(&["-n", "10", "--jobs", "3"]))
            .unwrap();

        let split: Vec<u64> = (0..3).map(|i| config.job_events(i)).collect();
        assert_eq!(split, vec![4, 3, 3]);
        assert_eq!(config.job_seed(0), 42);
        assert_eq!(config.job_seed(2), 44);
    }

    #[test]
    fn missing_seed_is_a_config_error() {
        let dir = tempdir().unwrap();
        let job = JOB_FILE.replace("seed = 42\n", "");
        let path = write_job(dir.path(), &job);
        let result = PartialJobFile::from_file(&path).unwrap().resolve();
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("seed")));
    }

    #[test]
    fn invalid_headroom_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        let result = PartialJobFile::from_file(&path)
            .unwrap()
            .merge_with_cli(&generate_args(&["-S", "job.pmax-headroom=0.5"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let dir = tempdir().unwrap();
        let job = JOB_FILE.replace("[job]\n", "[job]\nsed = 1\n");
        let path = write_job(dir.path(), &job);
        assert!(matches!(
            PartialJobFile::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn set_values_are_validated() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        for bad in ["job.seed", "job.seed=abc", "job.unknown=1", "physics.x=1"] {
            let result = PartialJobFile::from_file(&path)
                .unwrap()
                .merge_with_cli(&generate_args(&["-S", bad]));
            assert!(matches!(result, Err(CliError::Config(_))), "{}", bad);
        }
    }

    #[test]
    fn zero_jobs_and_missing_sections_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_job(dir.path(), JOB_FILE);
        assert!(matches!(
            PartialJobFile::from_file(&path)
                .unwrap()
                .merge_with_cli(&generate_args(&["--jobs", "0"])),
            Err(CliError::Config(_))
        ));

        let no_flux = "[job]\nseed = 1\n[[geometry.layers]]\nname = \"a\"\ntarget = 1000060120\nthickness = 1.0\nhalf-width = 1.0\n";
        let path = write_job(dir.path(), no_flux);
        assert!(matches!(
            PartialJobFile::from_file(&path).unwrap().resolve(),
            Err(CliError::Config(msg)) if msg.contains("[flux]")
        ));
    }
}
