//! SWC loading from files on disk.

use std::io::Write;

use neurocell::{LoadOptions, MorphologyLoader, Offset, Region, SwcLoader};
use tempfile::NamedTempFile;

fn loader_for(text: &str) -> (NamedTempFile, SwcLoader) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    let loader = SwcLoader::from_path(file.path());
    (file, loader)
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let (_file, loader) = loader_for(
        "# header\n\n1 1 0 0 0 4 -1   # soma\n  \n2 3 0 4 0 1 1\n3 3 0 24 0 1 2 # tip\n",
    );
    let morphology = loader.load(&LoadOptions::default()).unwrap();

    assert_eq!(morphology.sections.len(), 2);
    assert_eq!(morphology.sections[1].name, "dend[0]");
    assert!((morphology.sections[1].length - 20.0).abs() < 1e-9);
}

#[test]
fn test_custom_types_load_as_basal_dendrite() {
    let (_file, loader) = loader_for("1 1 0 0 0 4 -1\n2 7 0 4 0 1 1\n3 7 0 14 0 1 2\n");
    let morphology = loader.load(&LoadOptions::default()).unwrap();

    assert_eq!(morphology.sections[1].region, Region::Dend);
    assert_eq!(morphology.sections[1].points.len(), 2);
}

#[test]
fn test_three_point_soma_spans_its_diameter() {
    let (_file, loader) = loader_for(
        "1 1 0 0 0 5 -1\n2 1 0 -5 0 5 1\n3 1 0 5 0 5 1\n4 4 0 10 0 1 3\n",
    );
    let morphology = loader.load(&LoadOptions {
        use_axon: false,
        offset: Offset::new(0.0, 0.0, 100.0),
    })
    .unwrap();

    let soma = &morphology.sections[0];
    assert_eq!(soma.points.len(), 3);
    assert!((soma.length - 10.0).abs() < 1e-9);
    assert_eq!(soma.diam, 10.0);
    assert!(soma.points.iter().all(|p| p.z == 100.0));

    let apic = &morphology.sections[1];
    assert_eq!(apic.parent.map(|a| (a.parent, a.position)), Some((0, 0.5)));
}

#[test]
fn test_soma_length_follows_tree_edges() {
    // both outer samples hang off the first one; walking them in file
    // order would add a 12 um jump between them
    let (_file, loader) = loader_for(
        "1 1 0 0 0 2 -1\n2 1 0 4 0 2 1\n3 1 0 -8 0 2 1\n4 3 0 16 0 1 2\n",
    );
    let morphology = loader.load(&LoadOptions::default()).unwrap();

    let soma = &morphology.sections[0];
    assert!((soma.length - 12.0).abs() < 1e-9);
    assert_eq!(soma.diam, 4.0);
}
