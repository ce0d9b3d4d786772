//! Interval resolution engine
//!
//! Turns (validated config, available cubes, surface cache) into a flat list
//! of ready-to-evaluate attributes:
//!
//! - group attribute kinds by identical resolved interval definition
//! - load boundary surfaces through the shared cache, at most once each
//! - attach every cube matching the configured prefix, date-insensitively
//!
//! Everything is sequential and deterministic: cube configs, formations,
//! interval groups and matching cubes are all walked in insertion order.

use std::io::ErrorKind;
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::attribute::{CalcType, SeismicAttribute};
use crate::config::{CubeConfig, FormationSettings, GlobalConfig, IntervalConfig, RootConfig};
use crate::cube::{CubeMap, SeismicCube};
use crate::error::{Error, Result};
use crate::surface::RegularSurface;

/// Surface cache keyed by `horizon name + surface postfix`
///
/// Supplied fresh per invocation and populated as a side effect of
/// resolution; later formations referencing the same horizon reuse the
/// cached surface instead of re-reading it.
pub type SurfaceMap = IndexMap<String, Rc<RegularSurface>>;

/// Attribute kinds grouped by their resolved interval definition
pub type IntervalGroups = IndexMap<IntervalConfig, Vec<CalcType>>;

/// Create one `SeismicAttribute` per unique interval definition and
/// matching cube
///
/// The only signal for a prefix/attribute mismatch is an empty overall
/// result, which is an error; a single cube config matching zero available
/// cubes stays silent by design (e.g. a test subset of cubes).
pub fn populate_seismic_attributes(
    config: &RootConfig,
    cubes: &CubeMap,
    surfaces: &mut SurfaceMap,
) -> Result<Vec<SeismicAttribute>> {
    let mut seismic_attributes = Vec::new();
    for (cube_name, cube_info) in &config.cubes {
        for (formation_name, formation_settings) in &cube_info.formations {
            let formation_attributes = process_formation(
                cube_name,
                formation_name,
                formation_settings,
                cube_info,
                cubes,
                surfaces,
                &config.global_config,
            )?;
            seismic_attributes.extend(formation_attributes);
        }
    }

    if seismic_attributes.is_empty() {
        return Err(Error::NoAttributesGenerated);
    }
    Ok(seismic_attributes)
}

fn process_formation(
    cube_name: &str,
    formation_name: &str,
    formation_settings: &FormationSettings,
    cube_info: &CubeConfig,
    cubes: &CubeMap,
    surfaces: &mut SurfaceMap,
    global_config: &GlobalConfig,
) -> Result<Vec<SeismicAttribute>> {
    let interval_groups = group_attributes_by_interval(
        formation_settings,
        global_config,
        formation_name,
        cube_name,
    )?;
    create_formation_attributes(&interval_groups, cube_info, cubes, surfaces, global_config)
}

/// Group attribute kinds that share the same resolved interval definition
///
/// Every globally declared kind resolves its own `IntervalConfig`; kinds
/// whose configs are structurally identical become a single computation
/// unit. All validation happens here, before any surface I/O.
pub fn group_attributes_by_interval(
    formation_settings: &FormationSettings,
    global_config: &GlobalConfig,
    formation_name: &str,
    cube_name: &str,
) -> Result<IntervalGroups> {
    let mut interval_groups = IntervalGroups::new();
    for &attribute in &global_config.attributes {
        let interval_key = formation_settings.build_interval_config(
            attribute,
            global_config.scale_factor,
            formation_name,
            cube_name,
        )?;
        interval_groups.entry(interval_key).or_default().push(attribute);
    }
    Ok(interval_groups)
}

fn create_formation_attributes(
    interval_groups: &IntervalGroups,
    cube_info: &CubeConfig,
    cubes: &CubeMap,
    surfaces: &mut SurfaceMap,
    global_config: &GlobalConfig,
) -> Result<Vec<SeismicAttribute>> {
    let mut formation_attributes = Vec::new();
    for (interval_config, attributes) in interval_groups {
        for seismic_cube in matching_cubes(cubes, &cube_info.cube_prefix) {
            let attribute = create_seismic_attribute(
                interval_config,
                attributes,
                surfaces,
                global_config,
                cube_info,
                seismic_cube,
            )?;
            formation_attributes.push(attribute);
        }
    }
    Ok(formation_attributes)
}

/// All cubes whose name matches the prefix, ignoring the date segment, in
/// cube-dictionary insertion order
pub fn matching_cubes(cubes: &CubeMap, cube_prefix: &str) -> Vec<Rc<SeismicCube>> {
    cubes
        .iter()
        .filter(|(name, _)| name.compare_without_date(cube_prefix))
        .map(|(_, cube)| Rc::clone(cube))
        .collect()
}

fn create_seismic_attribute(
    interval_config: &IntervalConfig,
    attributes: &[CalcType],
    surfaces: &mut SurfaceMap,
    global_config: &GlobalConfig,
    cube_info: &CubeConfig,
    cube: Rc<SeismicCube>,
) -> Result<SeismicAttribute> {
    let top_surface = load_surface(
        &interval_config.top_horizon,
        surfaces,
        &global_config.surface_postfix,
        &global_config.gridhorizon_path,
    )?;
    let bottom_surface = if interval_config.window_length.is_some() {
        // Derived from the shifted top inside SeismicAttribute::new
        None
    } else {
        let Some(bottom_horizon) = interval_config.bottom_horizon.as_deref() else {
            // Unreachable after grouping validation
            return Err(Error::MissingBottomSurfaceOrWindow);
        };
        Some(load_surface(
            bottom_horizon,
            surfaces,
            &global_config.surface_postfix,
            &global_config.gridhorizon_path,
        )?)
    };

    SeismicAttribute::new(
        top_surface,
        bottom_surface,
        interval_config.window_length,
        interval_config.top_surface_shift,
        interval_config.bottom_surface_shift,
        attributes.to_vec(),
        interval_config.scale_factor,
        cube,
        cube_info.clone(),
    )
}

/// Fetch a surface from the cache, loading and inserting it on first use
///
/// The cache key is `surface_name + postfix`; the surface's own `name` is
/// stamped to the bare horizon name. A missing file is a configuration
/// error carrying the attempted path.
pub fn load_surface(
    surface_name: &str,
    surfaces: &mut SurfaceMap,
    horizon_postfix: &str,
    gridhorizon_path: &Path,
) -> Result<Rc<RegularSurface>> {
    let surface_key = format!("{surface_name}{horizon_postfix}");
    if let Some(existing) = surfaces.get_mut(&surface_key) {
        // Pre-seeded entries are stamped on first touch; once the surface
        // is shared the stamp has already been applied with this same name.
        if let Some(surface) = Rc::get_mut(existing) {
            surface.name = surface_name.to_string();
        }
        return Ok(Rc::clone(existing));
    }

    let path = gridhorizon_path.join(&surface_key);
    tracing::debug!(path = %path.display(), "loading surface");
    let mut surface = RegularSurface::from_file(&path).map_err(|err| match err {
        Error::Io(io_err) if io_err.kind() == ErrorKind::NotFound => {
            Error::SurfaceNotFound { path: path.clone() }
        }
        other => other,
    })?;
    surface.name = surface_name.to_string();
    let surface = Rc::new(surface);
    surfaces.insert(surface_key, Rc::clone(&surface));
    Ok(surface)
}
