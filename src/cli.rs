//! Command-line interface
//!
//! Provides subcommands for:
//! - Computing attribute maps from a declarative interval definition file
//! - Validating a definition file and printing the resolved interval groups
//! - Cleaning exported artifacts

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::RootConfig;
use crate::cube::CubeMap;
use crate::identity::Domain;
use crate::io;
use crate::resolve::{group_attributes_by_interval, populate_seismic_attributes, SurfaceMap};

#[derive(Parser)]
#[command(name = "seisattr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Seismic interval attribute extraction engine")]
#[command(
    long_about = "Seisattr - seismic interval attribute extraction and bookkeeping\n\n\
    Computes statistical attribute maps (rms, mean, min, max) over geological\n\
    intervals from 3D seismic cubes. Intervals are described declaratively: a\n\
    YAML file defines global defaults, per-cube name prefixes and per-formation\n\
    boundaries, with optional per-attribute overrides. Attributes resolving to\n\
    identical interval definitions are computed once and shared.\n\n\
    Examples:\n\
      seisattr compute -c attributes.yml -i ./cubes -o ./maps -d 20200101 -v\n\
      seisattr validate -c attributes.yml\n\
      seisattr clean -o ./maps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug-level logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute and export attribute maps for every configured interval
    Compute {
        /// Interval definition file (YAML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Directory holding the seismic cube files
        #[arg(short = 'i', long, value_name = "DIR")]
        cube_dir: PathBuf,

        /// Output directory for attribute maps and the manifest
        #[arg(short, long, default_value = "attribute_maps", value_name = "DIR")]
        output: PathBuf,

        /// Survey dates to include (YYYYMMDD, dashes allowed)
        #[arg(short, long, value_delimiter = ',')]
        dates: Vec<String>,

        /// Difference date pairs to include, as monitor_base tokens
        #[arg(long, value_delimiter = ',')]
        diff_dates: Vec<String>,

        /// Vertical domain of the cubes to read
        #[arg(long, default_value = "depth")]
        domain: String,
    },

    /// Validate an interval definition file and print the resolved groups
    Validate {
        /// Interval definition file (YAML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },

    /// Remove exported attribute maps
    Clean {
        /// Output directory to clean
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Only remove files starting with one of these prefixes
        #[arg(short, long, value_delimiter = ',')]
        prefixes: Vec<String>,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Compute {
            config,
            cube_dir,
            output,
            dates,
            diff_dates,
            domain,
        } => compute(&config, &cube_dir, &output, &dates, &diff_dates, &domain),
        Commands::Validate { config } => validate(&config),
        Commands::Clean { output, prefixes } => {
            let prefixes = (!prefixes.is_empty()).then_some(prefixes.as_slice());
            io::clear_results(&output, prefixes)?;
            Ok(())
        }
    }
}

fn compute(
    config_path: &Path,
    cube_dir: &Path,
    output: &Path,
    dates: &[String],
    diff_dates: &[String],
    domain: &str,
) -> anyhow::Result<()> {
    let config = RootConfig::from_yaml_file(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let domain: Domain = domain
        .parse()
        .with_context(|| format!("unknown domain '{domain}'"))?;
    let dates = io::normalize_dates(dates);
    let diff_pairs = io::parse_diff_pairs(&io::normalize_dates(diff_dates))?;

    let mut cubes = CubeMap::new();
    for cube_info in config.cubes.values() {
        let discovered = io::read_cubes(
            cube_dir,
            &cube_info.cube_prefix,
            domain,
            &dates,
            &diff_pairs,
        )?;
        cubes.extend(discovered);
    }
    let differences = io::build_difference_cubes(&cubes, &diff_pairs)?;
    cubes.extend(differences);
    tracing::info!(count = cubes.len(), "cubes loaded");

    let mut surfaces = SurfaceMap::new();
    let attributes = populate_seismic_attributes(&config, &cubes, &mut surfaces)?;
    tracing::info!(count = attributes.len(), "attributes resolved");

    let manifest = io::export_attributes(output, &attributes)?;
    println!(
        "Exported {} attribute maps to {}",
        manifest.entries.len(),
        output.display()
    );
    Ok(())
}

fn validate(config_path: &Path) -> anyhow::Result<()> {
    let config = RootConfig::from_yaml_file(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    for (cube_name, cube_info) in &config.cubes {
        for (formation_name, formation_settings) in &cube_info.formations {
            let groups = group_attributes_by_interval(
                formation_settings,
                &config.global_config,
                formation_name,
                cube_name,
            )?;
            println!("{cube_name}/{formation_name}: {} interval group(s)", groups.len());
            for (interval, calc_types) in &groups {
                let kinds: Vec<String> =
                    calc_types.iter().map(ToString::to_string).collect();
                println!(
                    "  [{}] top={} bottom={} window={:?} scale={}",
                    kinds.join(", "),
                    interval.top_horizon,
                    interval.bottom_horizon.as_deref().unwrap_or("-"),
                    interval.window_length,
                    interval.scale_factor
                );
            }
        }
    }
    println!("Configuration OK");
    Ok(())
}
