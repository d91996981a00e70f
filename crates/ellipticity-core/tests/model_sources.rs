use ellipticity_core::common::{EllipticityConfig, ModelSource, load_config, reference_model};
use ellipticity_core::domain::{ArrivalRequest, EllipErrorCategory, WaveType};
use ellipticity_core::modules::paths::arrival_to_record;
use ellipticity_core::modules::{
    RayPathRecord, arrival_coefficients, load_ray_paths, write_ray_paths,
};
use ellipticity_core::raytrace::{LayeredRayTracer, RayTracer};
use std::borrow::Cow;
use std::fs;
use tempfile::TempDir;

const SMALL_PLANET: &str = "\
# depth vp vs rho
0.0    6.0  3.5  3.0
1000.0 8.0  4.5  4.0
1000.0 8.0  4.5  4.0
2000.0 10.0 5.5  5.0
outer-core
2000.0 9.0  0.0  10.0
3000.0 10.0 0.0  11.0
inner-core
3000.0 11.0 3.5  12.0
3500.0 11.2 3.6  12.5
";

fn write_planet(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("small_planet.nd");
    fs::write(&path, SMALL_PLANET).expect("model file should be written");
    path
}

#[test]
fn nd_files_resolve_into_traceable_models() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = write_planet(&temp);
    let argument = path.to_str().expect("temp path should be utf-8");

    let source = ModelSource::from_argument(argument);
    assert_eq!(source, ModelSource::File(path.clone()));
    let config = EllipticityConfig::default();
    let model = source.resolve(&config).expect("model file should load");
    assert!(matches!(model, Cow::Owned(_)));
    assert_eq!(model.name(), "small_planet");
    assert!((model.radius() - 3500.0).abs() < 1.0e-12);
    assert!((model.cmb_depth() - 2000.0).abs() < 1.0e-12);
    assert!((model.iocb_depth() - 3000.0).abs() < 1.0e-12);
    assert!(model.figure().surface_epsilon() > 0.0);

    let tracer = LayeredRayTracer::new(&model, config);
    let arrivals = tracer
        .arrivals(&ArrivalRequest::new("PcP", 10.0, 40.0))
        .expect("PcP search should succeed");
    assert_eq!(arrivals.len(), 1);
    let coefficients = arrival_coefficients(&arrivals[0], &model);
    assert!(!coefficients.is_zero());
    assert!(coefficients.sigma0() < 0.0);
}

#[test]
fn named_sources_share_the_bundled_model_until_sampling_changes() {
    let config = EllipticityConfig::default();
    let source = ModelSource::from_argument("PREM");
    assert_eq!(source, ModelSource::Named("prem".to_string()));
    let shared = source.resolve(&config).expect("PREM should resolve");
    assert!(matches!(shared, Cow::Borrowed(_)));

    let coarse = EllipticityConfig {
        max_layer_thickness: 200.0,
        ..config
    };
    let rebuilt = source.resolve(&coarse).expect("coarse PREM should build");
    assert!(matches!(rebuilt, Cow::Owned(_)));
    assert!(rebuilt.layers().len() < shared.layers().len());

    let error = ModelSource::from_argument("iasp91")
        .resolve(&config)
        .expect_err("unbundled model should be rejected");
    assert_eq!(error.category(), EllipErrorCategory::InputValidationError);
    assert!(error.message().contains("prem"));
}

#[test]
fn missing_model_files_are_io_errors() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("absent.nd");
    let error = ModelSource::File(missing)
        .resolve(&EllipticityConfig::default())
        .expect_err("missing file should fail");
    assert_eq!(error.category(), EllipErrorCategory::IoSystemError);
}

#[test]
fn stripped_wave_tags_are_recovered_from_exported_paths() {
    let model = reference_model("prem").expect("PREM should load");
    let tracer = LayeredRayTracer::new(model, EllipticityConfig::default());
    let arrivals = tracer
        .arrivals(&ArrivalRequest::new("ScS", 300.0, 60.0))
        .expect("ScS search should succeed");
    let traced = &arrivals[0];

    let temp = TempDir::new().expect("tempdir should be created");
    let tagged_path = temp.path().join("tagged.json");
    write_ray_paths(&tagged_path, &arrivals).expect("paths should be written");
    let tagged = load_ray_paths(&tagged_path, model).expect("tagged paths should load");
    assert_eq!(tagged.len(), 1);
    assert!(
        arrival_coefficients(&tagged[0], model)
            .max_abs_difference(&arrival_coefficients(traced, model))
            < 1.0e-9
    );

    let mut record: RayPathRecord = arrival_to_record(traced);
    for point in &mut record.path {
        point.wave = None;
    }
    let untagged_path = temp.path().join("untagged.json");
    fs::write(
        &untagged_path,
        serde_json::to_string(&record).expect("record should serialize"),
    )
    .expect("untagged paths should be written");

    let inferred = load_ray_paths(&untagged_path, model).expect("untagged paths should load");
    assert_eq!(inferred.len(), 1);
    assert!(inferred[0].path.iter().all(|sample| sample.wave == WaveType::S));
    assert!(
        arrival_coefficients(&inferred[0], model)
            .max_abs_difference(&arrival_coefficients(traced, model))
            < 1.0e-9
    );
}

#[test]
fn configuration_files_override_defaults() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("ellipticity.json");
    fs::write(&path, r#"{ "diffractionStepDeg": 0.5, "rayParameterSamples": 500 }"#)
        .expect("config should be written");

    let config = load_config(&path).expect("config should load");
    assert!((config.diffraction_step_deg - 0.5).abs() < 1.0e-12);
    assert_eq!(config.ray_parameter_samples, 500);
    assert_eq!(
        config.length_of_day,
        EllipticityConfig::default().length_of_day
    );

    fs::write(&path, r#"{ "lengthOfDay": -1.0 }"#).expect("config should be written");
    let error: ellipticity_core::EllipError = load_config(&path)
        .expect_err("negative length of day should be rejected")
        .into();
    assert_eq!(error.category(), EllipErrorCategory::InputValidationError);
}
