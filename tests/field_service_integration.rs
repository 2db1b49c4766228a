//! Bundled compute service driven through the workbench with real files

mod common;

use std::fs;

use common::assert_float_eq;
use common::builders::{sine_rows, write_field_map};
use common::recording_host::RecordingHost;
use idanalysis_rs::backend::halbach_peak_field;
use idanalysis_rs::config::GridSpec;
use idanalysis_rs::workbench::{ChecklistItem, Severity};
use idanalysis_rs::{
    AnalysisKind, AnalysisParameters, FieldComputeService, ModelFamily, ProjectWorkbench,
};
use tempfile::TempDir;

/// Parameters matched to a 200 mm long measurement
fn short_parameters() -> AnalysisParameters {
    AnalysisParameters {
        energy_gev: 3.0,
        z_grid: GridSpec::new(-100.0, 100.0, 1.0),
        x_grid: GridSpec::new(-2.0, 2.0, 1.0),
        initial_state: [0.0, 0.0, -100.0, 0.0, 0.0, 1.0],
        z_max: 100.0,
        rk_step: 0.5,
        skip_poles: 4,
    }
}

fn workbench() -> ProjectWorkbench {
    ProjectWorkbench::new(Box::new(FieldComputeService::new()), short_parameters())
}

fn run(wb: &mut ProjectWorkbench, host: &mut RecordingHost, device: &str, items: &[ChecklistItem]) {
    let node = wb.current().tree.find_device(device).expect("device node");
    wb.toolbar.analysis = true;
    for &item in ChecklistItem::all() {
        wb.toolbar.set_checked(item, items.contains(&item));
    }
    wb.tree_item_clicked(node, host);
    wb.toolbar.analysis = false;
}

#[test]
fn test_sinusoidal_measurement_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_field_map(dir.path(), "meas1", &sine_rows(100, 20.0, 1.0));
    let mut wb = workbench();
    let mut host = RecordingHost::new();

    assert_eq!(wb.open_file(&path, &mut host).as_deref(), Some("meas1"));
    let raw = wb.current().registry.get("meas1").unwrap().raw_grid.clone().unwrap();
    assert_eq!(raw.len(), 201);

    run(
        &mut wb,
        &mut host,
        "meas1",
        &[
            ChecklistItem::MagneticField,
            ChecklistItem::Trajectory,
            ChecklistItem::PhaseError,
            ChecklistItem::FieldIntegrals,
            ChecklistItem::RollOffPeaks,
        ],
    );
    assert!(host.notices.is_empty(), "{:?}", host.titles());

    let cache = &wb.current().cache;
    let field = cache.get(AnalysisKind::MagneticField, "meas1").unwrap();
    let by = field.vector("By").unwrap();
    assert_eq!(by.len(), 201);
    assert_float_eq(by[100], 1.0, 1e-9);
    assert_float_eq(by[110], -1.0, 1e-9);

    let trajectory = cache.get(AnalysisKind::Trajectory, "meas1").unwrap();
    let z = trajectory.vector("z").unwrap();
    assert!(*z.last().unwrap() >= 100.0);
    let xp = trajectory.vector("x'").unwrap();
    assert!(xp.iter().all(|v| v.abs() < 1e-3));

    let phase = cache.get(AnalysisKind::PhaseError, "meas1").unwrap();
    assert!(phase.scalar("RMS").unwrap() < 0.5);
    assert_float_eq(phase.scalar("By_amp").unwrap(), 1.0, 1e-3);
    assert_float_eq(phase.scalar("Bx_amp").unwrap(), 0.0, 1e-12);
    assert_float_eq(phase.scalar("K_h").unwrap(), 0.09337 * 20.0, 1e-2);
    assert_float_eq(phase.scalar("K_v").unwrap(), 0.0, 1e-12);

    // Whole periods integrate to zero
    let integrals = cache.get(AnalysisKind::FieldIntegrals, "meas1").unwrap();
    assert!(integrals.scalar("IBy_end").unwrap().abs() < 1.0);
    assert_eq!(integrals.vector("IIBy").unwrap().len(), 201);

    // A single transverse sample has no roll-off
    let peaks = cache.get(AnalysisKind::RollOffPeaks, "meas1").unwrap();
    let ropy = peaks.vector("ROPy").unwrap();
    assert_eq!(ropy.len(), 5);
    assert!(ropy.iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn test_cross_talk_refreshes_raw_grid() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<[f64; 6]> = (-5..=5)
        .map(|z| [0.0, 0.0, z as f64, 1.0, 0.0, 0.0])
        .collect();
    let path = write_field_map(dir.path(), "meas1", &rows);
    let mut wb = workbench();
    let mut host = RecordingHost::new();
    wb.open_file(&path, &mut host).unwrap();

    run(&mut wb, &mut host, "meas1", &[ChecklistItem::CrossTalk]);
    assert!(host.notices.is_empty(), "{:?}", host.titles());

    let device = wb.current().registry.get("meas1 C").unwrap();
    let grid = device.raw_grid.as_ref().unwrap();
    // A pure Bx reading leaks into By and Bz through the probe angles and cross-talk
    assert!(grid.rows()[0][4].abs() > 1e-4);
    assert!(grid.rows()[0][5].abs() > 1e-4);
}

#[test]
fn test_malformed_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.dat");
    fs::write(&path, "X Y Z Bx By Bz\n0 0 0 1 2\n").unwrap();
    let mut wb = workbench();
    let mut host = RecordingHost::new();

    assert_eq!(wb.open_file(&path, &mut host), None);
    assert_eq!(host.titles(), ["Open File"]);
    assert_eq!(host.notices[0].severity, Severity::Error);
    assert!(host.notices[0].message.contains("line 2"));
    assert!(wb.current().registry.is_empty());
    assert_eq!(wb.current().tree.devices(idanalysis_rs::DeviceKind::Data).count(), 0);
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut wb = workbench();
    let mut host = RecordingHost::new();
    assert_eq!(wb.open_file(&dir.path().join("absent.dat"), &mut host), None);
    assert_eq!(host.titles(), ["Open File"]);
}

#[test]
fn test_generated_model_peak_field() {
    let mut wb = ProjectWorkbench::new(
        Box::new(FieldComputeService::new()),
        AnalysisParameters::default(),
    );
    let mut host = RecordingHost::new();
    let params = ModelFamily::AppleIISabia.default_parameters();
    let name = wb
        .generate_model(ModelFamily::AppleIISabia, &params, &mut host)
        .unwrap();

    run(&mut wb, &mut host, &name, &[ChecklistItem::MagneticField]);
    assert!(host.notices.is_empty(), "{:?}", host.titles());

    let field = wb
        .current()
        .cache
        .get(AnalysisKind::MagneticField, &name)
        .unwrap();
    let b0 = halbach_peak_field(&params);
    let peak = field
        .vector("By")
        .unwrap()
        .iter()
        .fold(0.0f64, |m, v| m.max(v.abs()));
    assert!(peak <= b0 * 1.0001, "peak {} above {}", peak, b0);
    assert!(peak >= b0 * 0.99, "peak {} far below {}", peak, b0);

    // Horizontal-polarization model has no Bx
    let bx = field.vector("Bx").unwrap();
    assert!(bx.iter().all(|v| v.abs() < 1e-12));

    // Models have no raw grid to correct
    run(&mut wb, &mut host, &name, &[ChecklistItem::CrossTalk]);
    assert_eq!(host.titles(), ["Not Implemented"]);
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let mut wb = workbench();
    let mut host = RecordingHost::new();
    let mut params = short_parameters();
    params.rk_step = 0.0;

    assert!(!wb.edit_analysis_parameters(params, &mut host));
    assert_eq!(host.titles(), ["Parameters"]);
    assert_eq!(wb.current().engine.parameters(), &short_parameters());

    let mut params = short_parameters();
    params.energy_gev = 1.5;
    assert!(wb.edit_analysis_parameters(params.clone(), &mut host));
    assert_eq!(wb.current().engine.parameters(), &params);
}
