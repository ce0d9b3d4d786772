//! Discovery, bulk loading and persistence
//!
//! Cubes are discovered by scanning a directory for file names matching a
//! configured prefix, parsed into [`SeismicName`] identities and filtered by
//! domain and survey date. Surfaces load in bulk for depth-conversion
//! workflows. Computed attribute maps export as binary containers plus a
//! JSON manifest; intermediate objects can be dumped and retrieved for QC.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::attribute::{CalcType, SeismicAttribute};
use crate::cube::{Cube, CubeMap, DifferenceSeismic, SeismicCube, SingleSeismic};
use crate::error::{Error, Result};
use crate::identity::{Domain, SeismicDate, SeismicName};
use crate::resolve::SurfaceMap;
use crate::surface::RegularSurface;

/// Normalize a date list to `YYYYMMDD` tokens (dashes stripped)
pub fn normalize_dates(dates: &[String]) -> Vec<String> {
    dates.iter().map(|date| date.replace('-', "")).collect()
}

/// Render difference pairs as `monitor_base` tokens
pub fn diff_date_strings(diff_dates: &[(String, String)]) -> Vec<String> {
    diff_dates
        .iter()
        .map(|(monitor, base)| format!("{monitor}_{base}"))
        .collect()
}

/// Parse `monitor_base` tokens into normalized date pairs
///
/// Ordering is normalized through [`SeismicDate`], so the monitor (most
/// recent) date always comes first.
pub fn parse_diff_pairs(tokens: &[String]) -> Result<Vec<(String, String)>> {
    tokens
        .iter()
        .map(|token| {
            let date: SeismicDate = token.parse()?;
            match (date.monitor_date(), date.base_date()) {
                (Some(monitor), Some(base)) => Ok((monitor, base)),
                _ => Err(Error::InvalidDate {
                    date: token.clone(),
                    reason: "expected a monitor_base difference pair".to_string(),
                }),
            }
        })
        .collect()
}

/// Discover and load the cubes matching a prefix, domain and date set
///
/// File names that carry the prefix and domain are parsed into identities;
/// cubes whose date is neither a requested vintage nor a requested
/// difference pair are skipped.
pub fn read_cubes(
    cube_dir: &Path,
    cube_prefix: &str,
    domain: Domain,
    dates: &[String],
    diff_dates: &[(String, String)],
) -> Result<CubeMap> {
    let domain_token = domain.to_string();
    let diff_strings = diff_date_strings(diff_dates);

    // Sorted walk keeps the cube map insertion order, and with it the
    // output order of attribute resolution, deterministic.
    let mut cube_map = CubeMap::new();
    for entry in WalkDir::new(cube_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| Error::Io(err.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.starts_with(cube_prefix) || !file_name.to_lowercase().contains(&domain_token)
        {
            continue;
        }
        let seis_name = SeismicName::parse_name(&file_name)?;
        let seis_date = seis_name.date.to_string();
        if !dates.contains(&seis_date) && !diff_strings.contains(&seis_date) {
            continue;
        }
        tracing::debug!(name = %seis_name, "loading cube");
        let single = SingleSeismic::new(
            cube_dir.to_path_buf(),
            seis_name.clone(),
            seis_name.date,
            Cube::from_file(entry.path())?,
        );
        cube_map.insert(seis_name, Rc::new(SeismicCube::Single(single)));
    }
    Ok(cube_map)
}

/// Derive difference cubes for the requested monitor/base date pairs
///
/// For every single-vintage cube carrying a pair's monitor date, the base
/// vintage with the same identity is looked up and a difference cube is
/// formed; a missing base vintage is a configuration error.
pub fn build_difference_cubes(
    cubes: &CubeMap,
    diff_dates: &[(String, String)],
) -> Result<CubeMap> {
    let mut diff_map = CubeMap::new();
    for (monitor_date, base_date) in diff_dates {
        for (name, cube) in cubes {
            let SeismicCube::Single(monitor) = cube.as_ref() else {
                continue;
            };
            if name.date.to_string() != *monitor_date {
                continue;
            }
            let base = cubes
                .iter()
                .find_map(|(base_name, candidate)| match candidate.as_ref() {
                    SeismicCube::Single(single)
                        if base_name.date.to_string() == *base_date
                            && base_name.compare_without_date(&name.to_string()) =>
                    {
                        Some(single)
                    }
                    _ => None,
                })
                .ok_or_else(|| Error::MissingBaseVintage {
                    monitor: name.to_string(),
                    base_date: base_date.clone(),
                })?;

            let mut diff_name = name.clone();
            diff_name.date = format!("{monitor_date}_{base_date}").parse()?;
            let difference = DifferenceSeismic::new(base.clone(), monitor.clone());
            diff_map.insert(diff_name, Rc::new(SeismicCube::Difference(difference)));
        }
    }
    Ok(diff_map)
}

/// Bulk-load horizon surfaces, keyed the way the resolution cache expects
///
/// File names are lowercased horizon names plus the suffix; cache keys keep
/// the configured spelling. Each surface is stamped with its bare horizon
/// name.
pub fn read_surfaces(
    horizon_dir: &Path,
    horizon_names: &[String],
    horizon_suffix: &str,
) -> Result<SurfaceMap> {
    let mut surface_map = SurfaceMap::new();
    for name in horizon_names {
        let file_name = format!("{}{horizon_suffix}", name.to_lowercase());
        let path = horizon_dir.join(&file_name);
        let mut surface = RegularSurface::from_file(&path).map_err(|err| match err {
            Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                Error::SurfaceNotFound { path: path.clone() }
            }
            other => other,
        })?;
        surface.name = name.clone();
        surface_map.insert(format!("{name}{horizon_suffix}"), Rc::new(surface));
    }
    Ok(surface_map)
}

/// Dump an intermediate result object for QC inspection
pub fn dump_results<T: Serialize>(output_path: &Path, file_name: &str, value: &T) -> Result<()> {
    fs::create_dir_all(output_path)?;
    let file = File::create(output_path.join(file_name))?;
    bincode::serialize_into(BufWriter::new(file), value)?;
    Ok(())
}

/// Retrieve a previously dumped result object
pub fn retrieve_results<T: DeserializeOwned>(input_path: &Path, file_name: &str) -> Result<T> {
    let file = File::open(input_path.join(file_name))?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}

/// Remove dumped artifacts, optionally restricted to name prefixes
pub fn clear_results(output_path: &Path, prefixes: Option<&[String]>) -> Result<()> {
    for entry in fs::read_dir(output_path)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(".bin") {
            continue;
        }
        let matches = match prefixes {
            None => true,
            Some(prefixes) => prefixes.iter().any(|prefix| file_name.starts_with(prefix)),
        };
        if matches {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// One exported attribute map
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportEntry {
    pub file: String,
    pub cube: String,
    pub date: String,
    pub calc_type: CalcType,
    pub scale_factor: f64,
}

/// Index of everything an export run produced
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExportManifest {
    pub entries: Vec<ExportEntry>,
}

/// Evaluate and export every attribute map, plus a JSON manifest
///
/// Files are named from the owning cube configuration's prefix, the cube's
/// date and the calculation kind, so all vintages of a cube type sort
/// together.
pub fn export_attributes(
    output_dir: &Path,
    attributes: &[SeismicAttribute],
) -> Result<ExportManifest> {
    fs::create_dir_all(output_dir)?;
    let mut manifest = ExportManifest::default();
    for attribute in attributes {
        let values = attribute.value();
        for (calc_type, surface) in attribute.calc_types().iter().zip(values) {
            let file_name = format!(
                "{}{}--{}.bin",
                attribute.info().cube_prefix,
                attribute.from_cube().date(),
                calc_type
            );
            surface.to_file(output_dir.join(&file_name))?;
            manifest.entries.push(ExportEntry {
                file: file_name,
                cube: attribute.from_cube().name().to_string(),
                date: attribute.from_cube().date(),
                calc_type: *calc_type,
                scale_factor: attribute.scale_factor(),
            });
        }
    }

    let manifest_file = File::create(output_dir.join("manifest.json"))?;
    serde_json::to_writer_pretty(BufWriter::new(manifest_file), &manifest)
        .map_err(|err| Error::Io(err.into()))?;
    Ok(manifest)
}
