use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use std::rc::Rc;

use seisattr::cube::{Cube, CubeMap, SeismicCube, SingleSeismic};
use seisattr::identity::{Domain, Process, SeismicName};
use seisattr::resolve::{populate_seismic_attributes, SurfaceMap};
use seisattr::surface::RegularSurface;
use seisattr::RootConfig;

const CONFIG_YAML: &str = r#"
global:
  gridhorizon_path: /grids
  attributes: [rms, mean, min, max]
  scale_factor: 1.0
  surface_postfix: "--depth.gri"
cubes:
  relai_depth:
    cube_prefix: "seismic--relai_depth--"
    formations:
      volantis:
        top_horizon: topvolantis
        bottom_horizon: basevolantis
        rms:
          scale_factor: 1.02
      therys:
        top_horizon: toptherys
        bottom_horizon: basetherys
        mean:
          top_surface_shift: -5.0
  amplitude_depth:
    cube_prefix: "seismic--amplitude_depth--"
    formations:
      volantis:
        top_horizon: topvolantis
        bottom_horizon: basevolantis
        window_length: 20.0
"#;

fn fixture() -> (RootConfig, CubeMap, SurfaceMap) {
    let config = RootConfig::from_yaml_str(CONFIG_YAML).unwrap();

    let mut cubes = CubeMap::new();
    for attribute in ["relai", "amplitude"] {
        for date in ["20180101", "20190101", "20200101"] {
            let name = SeismicName::new(
                Process::Seismic,
                attribute,
                Domain::Depth,
                None,
                date.parse().unwrap(),
            );
            let single = SingleSeismic::new(
                Path::new("/cubes").to_path_buf(),
                name.clone(),
                date.parse().unwrap(),
                Cube::new(10, 10, 20, 25.0, 25.0, 4.0),
            );
            cubes.insert(name, Rc::new(SeismicCube::Single(single)));
        }
    }

    let mut surfaces = SurfaceMap::new();
    for (key, level) in [
        ("topvolantis--depth.gri", 0.0),
        ("basevolantis--depth.gri", 40.0),
        ("toptherys--depth.gri", 40.0),
        ("basetherys--depth.gri", 76.0),
    ] {
        surfaces.insert(
            key.to_string(),
            Rc::new(RegularSurface::constant(10, 10, 25.0, 25.0, level)),
        );
    }
    (config, cubes, surfaces)
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let (config, cubes, surfaces) = fixture();

    group.bench_function("populate_seismic_attributes", |bencher| {
        bencher.iter(|| {
            let mut surfaces = surfaces.clone();
            populate_seismic_attributes(black_box(&config), black_box(&cubes), &mut surfaces)
                .unwrap()
        })
    });

    let attrs = {
        let mut surfaces = surfaces.clone();
        populate_seismic_attributes(&config, &cubes, &mut surfaces).unwrap()
    };
    group.bench_function("attribute_value", |bencher| {
        bencher.iter(|| black_box(&attrs[0]).value())
    });

    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
