//! Engine boundary behavior against a mocked compute service

mod common;

use std::path::Path;

use common::builders::workbench_with;
use common::fake_service::line_grid;
use common::recording_host::RecordingHost;
use idanalysis_rs::backend::{
    AngleCorrection, ComputeOutput, CrossTalkCoefficients, DeviceComputeService,
    FieldIntegralInputs, LoadedDevice, MagneticFieldInputs, PhaseErrorInputs, RollOffInputs,
    TrajectoryInputs,
};
use idanalysis_rs::config::{ModelFamily, ModelParameters};
use idanalysis_rs::types::{AnalysisResult, FieldGrid, PayloadId};
use idanalysis_rs::workbench::{
    ChecklistItem, Outcome, CROSS_TALK_ANGLES, CROSS_TALK_COEFFICIENTS,
};
use idanalysis_rs::{AnalysisKind, ProjectWorkbench, Result, WorkbenchError};
use mockall::{mock, predicate::eq, Sequence};

mock! {
    pub Service {}

    impl DeviceComputeService for Service {
        fn load_measurement(&mut self, path: &Path) -> Result<LoadedDevice>;
        fn build_model(&mut self, family: ModelFamily, params: &ModelParameters) -> Result<PayloadId>;
        fn raw_grid(&self, payload: PayloadId) -> Option<FieldGrid>;
        fn magnetic_field(&mut self, payload: PayloadId, inputs: &MagneticFieldInputs) -> Result<ComputeOutput>;
        fn trajectory(&mut self, payload: PayloadId, inputs: &TrajectoryInputs) -> Result<ComputeOutput>;
        fn phase_error(
            &mut self,
            payload: PayloadId,
            inputs: &PhaseErrorInputs,
            trajectory: &AnalysisResult,
        ) -> Result<ComputeOutput>;
        fn field_integrals(
            &mut self,
            payload: PayloadId,
            inputs: &FieldIntegralInputs,
            field: &AnalysisResult,
        ) -> Result<ComputeOutput>;
        fn roll_off_peaks(&mut self, payload: PayloadId, inputs: &RollOffInputs) -> Result<ComputeOutput>;
        fn roll_off_amp(&mut self, payload: PayloadId, inputs: &RollOffInputs) -> Result<ComputeOutput>;
        fn correct_angles(&mut self, payload: PayloadId, angles: &AngleCorrection) -> Result<()>;
        fn correct_cross_talk(&mut self, payload: PayloadId, coefficients: &CrossTalkCoefficients) -> Result<()>;
        fn restore_grid(&mut self, payload: PayloadId, grid: FieldGrid) -> Result<()>;
    }
}

const PAYLOAD: PayloadId = PayloadId(7);

fn with_measurement(mut service: MockService) -> (ProjectWorkbench, RecordingHost) {
    service
        .expect_load_measurement()
        .times(1)
        .returning(|_| {
            Ok(LoadedDevice {
                payload: PAYLOAD,
                grid: line_grid(11),
            })
        });
    let mut wb = workbench_with(Box::new(service));
    let mut host = RecordingHost::new();
    wb.open_file(Path::new("meas1.dat"), &mut host)
        .expect("meas1 opened");
    (wb, host)
}

fn click(wb: &mut ProjectWorkbench, host: &mut RecordingHost, items: &[ChecklistItem]) -> Vec<Outcome> {
    let tree = &wb.current().tree;
    let node = tree
        .find_device("meas1 C")
        .or_else(|| tree.find_device("meas1"))
        .expect("device node");
    wb.toolbar.analysis = true;
    for &item in ChecklistItem::all() {
        wb.toolbar.set_checked(item, items.contains(&item));
    }
    wb.tree_item_clicked(node, host)
        .analyses
        .into_iter()
        .map(|(_, outcome)| outcome)
        .collect()
}

fn field_output(inputs: &MagneticFieldInputs) -> ComputeOutput {
    let z = inputs.z.points();
    let n = z.len();
    ComputeOutput::new(vec![z, vec![0.0; n], vec![1.0; n], vec![0.0; n]])
}

#[test]
fn test_duplicate_request_calls_service_once() {
    let mut service = MockService::new();
    service
        .expect_magnetic_field()
        .withf(|payload, inputs| {
            *payload == PAYLOAD && inputs.x == 0.0 && inputs.y == 0.0 && inputs.z.len() == 11
        })
        .times(1)
        .returning(|_, inputs| Ok(field_output(inputs)));
    let (mut wb, mut host) = with_measurement(service);

    assert!(matches!(
        click(&mut wb, &mut host, &[ChecklistItem::MagneticField])[..],
        [Outcome::Computed(_)]
    ));
    assert_eq!(
        click(&mut wb, &mut host, &[ChecklistItem::MagneticField]),
        [Outcome::Failed]
    );
    assert_eq!(host.titles(), ["Magnetic Field"]);
    assert_eq!(wb.current().cache.len(), 1);
}

#[test]
fn test_service_error_leaves_state_untouched() {
    let mut service = MockService::new();
    service
        .expect_trajectory()
        .times(1)
        .returning(|_, _| Err(WorkbenchError::Compute("trajectory diverged".to_string())));
    let (mut wb, mut host) = with_measurement(service);
    let tree_len = wb.current().tree.len();

    assert_eq!(
        click(&mut wb, &mut host, &[ChecklistItem::Trajectory]),
        [Outcome::Failed]
    );
    assert_eq!(host.titles(), ["Computation Failed"]);
    assert!(host.notices[0].message.contains("trajectory diverged"));
    assert!(wb.current().cache.is_empty());
    assert_eq!(wb.current().tree.len(), tree_len);
}

#[test]
fn test_malformed_output_is_rejected() {
    let mut service = MockService::new();
    service
        .expect_roll_off_amp()
        .times(1)
        .returning(|_, _| Ok(ComputeOutput::new(vec![vec![0.0; 5]; 2])));
    let (mut wb, mut host) = with_measurement(service);

    click(&mut wb, &mut host, &[ChecklistItem::RollOffAmp]);
    assert_eq!(host.titles(), ["Computation Failed"]);
    assert!(!wb.current().cache.has(AnalysisKind::RollOffAmp, "meas1"));
    assert!(wb.current().tree.analysis_pairs().is_empty());
}

#[test]
fn test_prerequisite_result_is_passed_to_dependent() {
    let mut service = MockService::new();
    service
        .expect_magnetic_field()
        .times(1)
        .returning(|_, inputs| Ok(field_output(inputs)));
    service
        .expect_field_integrals()
        .withf(|_, _, field| field.kind == AnalysisKind::MagneticField && field.vector("By").is_some())
        .times(1)
        .returning(|_, inputs, _| Ok(ComputeOutput::new(vec![vec![2.0; inputs.z.len()]; 6])));
    let (mut wb, mut host) = with_measurement(service);

    click(
        &mut wb,
        &mut host,
        &[ChecklistItem::FieldIntegrals, ChecklistItem::MagneticField],
    );
    assert!(host.notices.is_empty(), "{:?}", host.titles());
    let integrals = wb
        .current()
        .cache
        .get(AnalysisKind::FieldIntegrals, "meas1")
        .expect("integrals");
    assert_eq!(integrals.scalar("IIBz_end"), Some(2.0));
}

#[test]
fn test_cross_talk_uses_fixed_coefficients_in_order() {
    let mut seq = Sequence::new();
    let mut service = MockService::new();
    service
        .expect_raw_grid()
        .with(eq(PAYLOAD))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Some(line_grid(11)));
    service
        .expect_correct_angles()
        .with(eq(PAYLOAD), eq(CROSS_TALK_ANGLES))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    service
        .expect_correct_cross_talk()
        .with(eq(PAYLOAD), eq(CROSS_TALK_COEFFICIENTS))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    service
        .expect_raw_grid()
        .with(eq(PAYLOAD))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Some(line_grid(3)));
    service.expect_restore_grid().never();
    let (mut wb, mut host) = with_measurement(service);

    click(&mut wb, &mut host, &[ChecklistItem::CrossTalk]);
    assert!(host.notices.is_empty(), "{:?}", host.titles());
    let device = wb.current().registry.get("meas1 C").expect("renamed");
    assert_eq!(device.raw_grid.as_ref().map(FieldGrid::len), Some(3));

    // Already corrected: no further service calls
    click(&mut wb, &mut host, &[ChecklistItem::CrossTalk]);
    assert_eq!(host.titles(), ["Cross Talk"]);
}

#[test]
fn test_failed_correction_keeps_the_name() {
    let mut service = MockService::new();
    service
        .expect_correct_angles()
        .times(1)
        .returning(|_, _| Err(WorkbenchError::Compute("probe table missing".to_string())));
    service.expect_correct_cross_talk().never();
    service
        .expect_raw_grid()
        .times(1)
        .returning(|_| Some(line_grid(11)));
    service
        .expect_restore_grid()
        .withf(|payload, grid| *payload == PAYLOAD && *grid == line_grid(11))
        .times(1)
        .returning(|_, _| Ok(()));
    let (mut wb, mut host) = with_measurement(service);

    click(&mut wb, &mut host, &[ChecklistItem::CrossTalk]);
    assert_eq!(host.titles(), ["Computation Failed"]);
    assert!(wb.current().registry.contains("meas1"));
    assert!(!wb.current().registry.contains("meas1 C"));
}

#[test]
fn test_partial_correction_is_rolled_back() {
    let mut seq = Sequence::new();
    let mut service = MockService::new();
    service
        .expect_raw_grid()
        .with(eq(PAYLOAD))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Some(line_grid(11)));
    service
        .expect_correct_angles()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    service
        .expect_correct_cross_talk()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(WorkbenchError::Compute("coefficient table missing".to_string())));
    service
        .expect_restore_grid()
        .withf(|payload, grid| *payload == PAYLOAD && *grid == line_grid(11))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    let (mut wb, mut host) = with_measurement(service);

    click(&mut wb, &mut host, &[ChecklistItem::CrossTalk]);
    assert_eq!(host.titles(), ["Computation Failed"]);
    assert!(host.notices[0].message.contains("coefficient table missing"));
    assert!(wb.current().registry.contains("meas1"));
    let device = wb.current().registry.get("meas1").expect("meas1");
    assert_eq!(device.raw_grid.as_ref().map(FieldGrid::len), Some(11));
}

#[test]
fn test_ragged_output_is_not_cached() {
    let mut service = MockService::new();
    service.expect_magnetic_field().times(1).returning(|_, _| {
        Ok(ComputeOutput::new(vec![
            vec![0.0; 3],
            vec![0.0; 1],
            vec![],
            vec![0.0; 2],
        ]))
    });
    let (mut wb, mut host) = with_measurement(service);

    assert_eq!(
        click(&mut wb, &mut host, &[ChecklistItem::MagneticField]),
        [Outcome::Failed]
    );
    assert_eq!(host.titles(), ["Computation Failed"]);
    assert!(wb.current().cache.is_empty());
    assert!(wb.current().tree.analysis_pairs().is_empty());
}

#[test]
fn test_rename_collision_is_rejected_before_correcting() {
    let mut service = MockService::new();
    let mut loaded = 0;
    service.expect_load_measurement().times(2).returning(move |_| {
        loaded += 1;
        Ok(LoadedDevice {
            payload: PayloadId(100 + loaded),
            grid: line_grid(3),
        })
    });
    service.expect_correct_angles().never();
    let mut wb = workbench_with(Box::new(service));
    let mut host = RecordingHost::new();
    wb.open_file(Path::new("meas1.dat"), &mut host).expect("first file");
    wb.open_file(Path::new("meas1 C.dat"), &mut host)
        .expect("second file");

    let node = wb.current().tree.find_device("meas1").expect("meas1");
    wb.toolbar.analysis = true;
    wb.toolbar.set_checked(ChecklistItem::CrossTalk, true);
    wb.tree_item_clicked(node, &mut host);

    assert_eq!(host.titles(), ["Name Collision"]);
    assert!(wb.current().registry.contains("meas1"));
    assert!(wb.current().registry.contains("meas1 C"));
}
