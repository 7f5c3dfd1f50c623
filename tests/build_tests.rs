//! End-to-end model construction from SWC files on disk.

use std::io::Write;

use neurocell::{
    BuildError, CellTemplate, Ion, MechanismKind, Model, ModelBuilder, MorphologyError, Offset,
    Region, Selector, SwcLoader,
};
use tempfile::NamedTempFile;

/// Soma, two basal branches off one trunk, an apical trunk and a source
/// axon that must be discarded.
const PYRAMIDAL: &str = "\
# synthetic pyramidal cell
1 1 0 0 0 6 -1
2 1 0 3 0 6 1
3 3 0 8 0 1 2
4 3 0 47 0 1 3
5 3 -20 47 0 0.5 4
6 3 20 47 0 0.5 4
7 4 0 -6 0 2 1
8 4 0 -126 0 1.5 7
9 4 0 -165 0 1 8
10 2 6 0 0 0.5 1
11 2 206 0 0 0.5 10
";

const ACTIVE: [MechanismKind; 11] = [
    MechanismKind::CaDynamics,
    MechanismKind::CaHva,
    MechanismKind::CaLva,
    MechanismKind::Ih,
    MechanismKind::ImV2,
    MechanismKind::KT,
    MechanismKind::Kd,
    MechanismKind::Kv2like,
    MechanismKind::Kv31,
    MechanismKind::NaV,
    MechanismKind::SK,
];

fn swc_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn build_default(file: &NamedTempFile) -> Model {
    Model::from_swc(file.path(), None, Offset::default()).unwrap()
}

#[test]
fn test_default_cell_end_to_end() {
    let file = swc_file(PYRAMIDAL);
    let model = build_default(&file);

    let soma: Vec<_> = model.region(Region::Soma).collect();
    assert_eq!(soma.len(), 1);
    assert_eq!(soma[0].get("gbar_NaV"), Some(0.127905));
    assert!(model.region(Region::Apic).all(|s| s.cm == 1.54));
    assert_eq!(model.to_string(), "Neuron472430904_instance");
}

#[test]
fn test_axon_is_always_the_two_section_stub() {
    let file = swc_file(PYRAMIDAL);
    let model = build_default(&file);

    let axon: Vec<_> = model.region(Region::Axon).collect();
    assert_eq!(axon.len(), 2);
    assert!(axon.iter().all(|s| s.length == 30.0 && s.diam == 1.0));

    let soma_id = model.section_id("soma[0]").unwrap();
    let first_id = model.section_id("axon[0]").unwrap();
    let first = axon[0].parent.unwrap();
    let second = axon[1].parent.unwrap();
    assert_eq!((first.parent, first.position), (soma_id, 0.5));
    assert_eq!((second.parent, second.position), (first_id, 1.0));

    // the 200 um source axon left no trace
    assert!(model.sections().iter().all(|s| s.length < 200.0));
}

#[test]
fn test_every_section_is_discretized() {
    let file = swc_file(PYRAMIDAL);
    let model = build_default(&file);

    for section in model.sections() {
        let expected = 1 + 2 * (section.length / 40.0).floor() as usize;
        assert_eq!(section.nseg, expected, "{}", section.name);
        assert_eq!(section.nseg % 2, 1);
    }
    // apical trunk: 120 um then 39 um
    assert_eq!(model.section("apic[0]").unwrap().nseg, 7);
    assert_eq!(model.section("dend[0]").unwrap().nseg, 1);
}

#[test]
fn test_shared_parameters_reach_every_region() {
    let file = swc_file(PYRAMIDAL);
    let model = build_default(&file);

    assert_eq!(model.region(Selector::All).count(), model.sections().len());
    for section in model.region(Selector::All) {
        assert_eq!(section.ra, 10.0, "{}", section.name);
        assert_eq!(section.get("e_pas"), Some(-85.2242126465));
    }
    for section in model.region(Region::Dend) {
        assert_eq!(section.cm, 1.54);
        assert_eq!(section.get("g_pas"), Some(0.000518771779351));
    }
}

#[test]
fn test_active_mechanisms_only_in_soma() {
    let file = swc_file(PYRAMIDAL);
    let model = build_default(&file);

    for section in model.sections() {
        let inserted: Vec<MechanismKind> = section.mechanisms().iter().map(|m| m.kind).collect();
        if section.region == Region::Soma {
            assert_eq!(inserted[0], MechanismKind::Pas);
            assert_eq!(&inserted[1..], &ACTIVE);
            assert_eq!(section.reversal(Ion::Na), Some(53.0));
            assert_eq!(section.reversal(Ion::K), Some(-107.0));
        } else {
            assert_eq!(inserted, [MechanismKind::Pas], "{}", section.name);
            assert!(!section.uses_ion(Ion::Na));
        }
    }
}

#[test]
fn test_builds_are_independent_and_identical() {
    let file = swc_file(PYRAMIDAL);
    let builder = ModelBuilder::default();
    let loader = SwcLoader::from_path(file.path());

    let first = builder.build(&loader, Some("cell"), Offset::new(10.0, 0.0, -5.0)).unwrap();
    let second = builder.build(&loader, Some("cell"), Offset::new(10.0, 0.0, -5.0)).unwrap();
    assert_eq!(first, second);

    assert_eq!(first.to_string(), "cell");
    assert_eq!(first.offset(), Offset::new(10.0, 0.0, -5.0));
    assert_eq!(first.section("soma[0]").unwrap().points[0].x, 10.0);
}

#[test]
fn test_alternative_parameter_set_from_json() {
    let mut template = CellTemplate::default();
    template.parameters[4]
        .values
        .insert("gbar_NaV".to_string(), 0.2);
    template.placeholder = "pyramidal".to_string();

    let mut json = NamedTempFile::new().unwrap();
    json.write_all(template.to_json().unwrap().as_bytes()).unwrap();
    json.flush().unwrap();

    let loaded = CellTemplate::from_path(json.path()).unwrap();
    let file = swc_file(PYRAMIDAL);
    let model = ModelBuilder::new(loaded)
        .unwrap()
        .build(&SwcLoader::from_path(file.path()), None, Offset::default())
        .unwrap();

    assert_eq!(model.section("soma[0]").unwrap().get("gbar_NaV"), Some(0.2));
    assert_eq!(model.to_string(), "pyramidal");
}

#[test]
fn test_missing_morphology_propagates_load_error() {
    let err = Model::from_swc("/nonexistent/cell.swc", None, Offset::default()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Morphology(MorphologyError::Io { .. })
    ));
}

#[test]
fn test_summary_serializes() {
    let file = swc_file(PYRAMIDAL);
    let summary = build_default(&file).summary();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["name"], "Neuron472430904_instance");
    let axon = json["regions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["region"] == "axon")
        .unwrap();
    assert_eq!(axon["sections"], 2);
    assert_eq!(axon["total_length"], 60.0);
}
