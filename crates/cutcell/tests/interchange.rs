mod support;

use cutcell::{
    calc_cut_info_all, CellGrid, CutBid5Array, CutBid8Array, CutInfoData, CutPos32Array, CutPos8Array, CutSettings,
    DEFAULT_TOLERANCE,
};
use cutcell_math::{Direction, Point3, Vec3};
use cutcell_polygon::PolygonStore;

use crate::support::add_sphere;

fn sphere_store() -> PolygonStore {
    let mut store = PolygonStore::new();
    let g = store.add_group(None, "ball", 12).unwrap();
    add_sphere(&mut store, g, Point3::new(0.52, 0.49, 0.5), 0.31, 10, 14);
    store.build_index();
    store
}

fn grid() -> CellGrid {
    CellGrid::new(Point3::origin(), Vec3::new(0.1, 0.1, 0.1))
}

fn reference(store: &PolygonStore) -> CutInfoData {
    let mut pos = CutPos32Array::new([10, 10, 10]);
    let mut bid = CutBid8Array::new([10, 10, 10]);
    calc_cut_info_all(&grid(), store, &mut pos, &mut bid, None, &CutSettings::default()).unwrap();
    CutInfoData::from_arrays(&pos, &bid).unwrap()
}

#[test]
fn test_file_round_trip() {
    let store = sphere_store();
    let data = reference(&store);
    assert!(data.cut_count() > 0);

    let path = std::env::temp_dir().join(format!("cutcell-interchange-{}.txt", std::process::id()));
    data.save(&path).unwrap();
    let loaded = CutInfoData::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.extent(), data.extent());
    assert_eq!(loaded.cut_count(), data.cut_count());
    let report = loaded.compare(&data, 0.0);
    assert!(report.passed(), "{report:?}");
}

#[test]
fn test_compact_encoding_within_tolerance() {
    let store = sphere_store();
    let expected = reference(&store);

    let mut pos = CutPos8Array::new([10, 10, 10]);
    let mut bid = CutBid5Array::new([10, 10, 10]);
    calc_cut_info_all(&grid(), &store, &mut pos, &mut bid, None, &CutSettings::default()).unwrap();
    let actual = CutInfoData::from_arrays(&pos, &bid).unwrap();

    let report = actual.compare(&expected, DEFAULT_TOLERANCE);
    assert!(report.passed(), "{report:?}");
    assert!(report.max_error <= 1.0 / 510.0 + 1e-6);
}

#[test]
fn test_detects_changed_geometry() {
    let expected = reference(&sphere_store());

    let mut moved = PolygonStore::new();
    let g = moved.add_group(None, "ball", 12).unwrap();
    add_sphere(&mut moved, g, Point3::new(0.52, 0.49, 0.5), 0.33, 10, 14);
    moved.build_index();
    let actual = reference(&moved);

    let report = actual.compare(&expected, DEFAULT_TOLERANCE);
    assert!(!report.passed());
    assert!(report.bid_differences > 0 || report.max_error > DEFAULT_TOLERANCE);

    let mut text = Vec::new();
    expected.write(&mut text).unwrap();
    let first_cut = String::from_utf8(text).unwrap().lines().nth(2).map(str::to_owned).unwrap();
    let fields: Vec<&str> = first_cut.split_whitespace().collect();
    let ijk: usize = fields[0].parse().unwrap();
    let dir = Direction::from_index(fields[1].parse().unwrap()).unwrap();
    assert_eq!(expected.bid().bid_at(ijk, dir), 12);
}
