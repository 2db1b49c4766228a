//! Property tests over random sequences of workbench operations

mod common;

use std::collections::BTreeSet;
use std::path::Path;

use common::builders::fake_workbench;
use common::recording_host::RecordingHost;
use idanalysis_rs::workbench::{ChecklistItem, ClickEffects, NodeId, PlotMode, TableMode};
use idanalysis_rs::{AnalysisKind, DeviceKind, ModelFamily, ProjectWorkbench};
use proptest::prelude::*;
use proptest::sample::subsequence;

const FILES: [&str; 4] = ["meas1", "meas2", "meas1 C", "scan"];

#[derive(Debug, Clone)]
enum Op {
    Open(usize),
    Model(usize),
    Analyse(usize, Vec<ChecklistItem>),
    ApplyForAll(Vec<ChecklistItem>),
}

fn items() -> impl Strategy<Value = Vec<ChecklistItem>> {
    subsequence(ChecklistItem::all().to_vec(), 0..=ChecklistItem::all().len())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..FILES.len()).prop_map(Op::Open),
        (0..ModelFamily::all().len()).prop_map(Op::Model),
        (0..16usize, items()).prop_map(|(device, items)| Op::Analyse(device, items)),
        items().prop_map(Op::ApplyForAll),
    ]
}

fn device_nodes(wb: &ProjectWorkbench) -> Vec<NodeId> {
    let tree = &wb.current().tree;
    tree.devices(DeviceKind::Data)
        .chain(tree.devices(DeviceKind::Model))
        .map(|n| n.id)
        .collect()
}

fn set_checked(wb: &mut ProjectWorkbench, items: &[ChecklistItem]) {
    for &item in ChecklistItem::all() {
        wb.toolbar.set_checked(item, items.contains(&item));
    }
}

fn apply(wb: &mut ProjectWorkbench, host: &mut RecordingHost, op: &Op) {
    match op {
        Op::Open(i) => {
            let file = format!("{}.dat", FILES[*i]);
            wb.open_file(Path::new(&file), host);
        }
        Op::Model(i) => {
            let family = ModelFamily::all()[*i];
            wb.generate_model(family, &family.default_parameters(), host);
        }
        Op::Analyse(device, items) => {
            let devices = device_nodes(wb);
            if devices.is_empty() {
                return;
            }
            wb.toolbar.analysis = true;
            set_checked(wb, items);
            wb.tree_item_clicked(devices[device % devices.len()], host);
            wb.toolbar.analysis = false;
        }
        Op::ApplyForAll(items) => {
            wb.settings.apply_for_all = true;
            set_checked(wb, items);
            wb.confirm_analysis(host);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_device_names_stay_unique(ops in prop::collection::vec(op(), 0..24)) {
        let (mut wb, _log) = fake_workbench();
        let mut host = RecordingHost::new();
        for op in &ops {
            apply(&mut wb, &mut host, op);
        }

        let project = wb.current();
        let labels: Vec<String> = device_nodes(&wb)
            .into_iter()
            .filter_map(|id| project.tree.label(id).map(str::to_string))
            .collect();
        let unique: BTreeSet<&str> = labels.iter().map(String::as_str).collect();
        prop_assert_eq!(unique.len(), labels.len());

        let registered: BTreeSet<&str> = project.registry.names().collect();
        prop_assert_eq!(unique, registered);
        for device in project.registry.iter() {
            prop_assert_eq!(device.raw_grid.is_some(), device.kind == DeviceKind::Data);
        }
    }

    #[test]
    fn prop_tree_mirrors_cache(ops in prop::collection::vec(op(), 0..24)) {
        let (mut wb, _log) = fake_workbench();
        let mut host = RecordingHost::new();
        for op in &ops {
            apply(&mut wb, &mut host, op);
        }

        let project = wb.current();
        let pairs = project.tree.analysis_pairs();
        let in_tree: BTreeSet<(AnalysisKind, String)> = pairs
            .iter()
            .map(|(kind, device, _)| (*kind, device.clone()))
            .collect();
        prop_assert_eq!(in_tree.len(), pairs.len());

        let in_cache: BTreeSet<(AnalysisKind, String)> = project
            .cache
            .keys()
            .map(|(kind, device)| (kind, device.to_string()))
            .collect();
        prop_assert_eq!(&in_tree, &in_cache);

        for (kind, device, labels) in &pairs {
            let result = project.cache.get(*kind, device).expect("cached");
            let expected: Vec<&str> = result.labels().collect();
            prop_assert_eq!(labels.iter().map(String::as_str).collect::<Vec<_>>(), expected);
            prop_assert_eq!(&result.device_name, device);
        }
    }

    #[test]
    fn prop_clicks_without_toggles_change_nothing(
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..12),
        mode in prop::sample::select(PlotMode::all().to_vec()),
    ) {
        let (mut wb, _log) = fake_workbench();
        let mut host = RecordingHost::new();
        wb.open_file(Path::new("meas1.dat"), &mut host);
        let node = device_nodes(&wb)[0];
        wb.toolbar.analysis = true;
        set_checked(&mut wb, &[
            ChecklistItem::MagneticField,
            ChecklistItem::Trajectory,
            ChecklistItem::PhaseError,
        ]);
        wb.tree_item_clicked(node, &mut host);

        wb.toolbar.analysis = false;
        wb.set_plot_mode(mode);
        wb.toolbar.table_mode = TableMode::DeviceTable;
        // Checked analyses stay checked; only the buttons are off
        prop_assert!(!wb.toolbar.any_toggled());
        host.clear();

        let ids: Vec<NodeId> = wb.current().tree.iter().map(|n| n.id).collect();
        let labels_before: Vec<String> =
            wb.current().tree.iter().map(|n| n.label.clone()).collect();
        let cache_before = wb.current().cache.len();

        for pick in picks {
            let effects = wb.tree_item_clicked(*pick.get(&ids), &mut host);
            prop_assert_eq!(effects, ClickEffects::default());
        }

        let project = wb.current();
        let labels_after: Vec<String> = project.tree.iter().map(|n| n.label.clone()).collect();
        prop_assert_eq!(labels_before, labels_after);
        prop_assert_eq!(project.cache.len(), cache_before);
        prop_assert!(project.visuals.is_empty());
        prop_assert!(project.plots.pending().is_none());
        prop_assert!(host.notices.is_empty());
    }
}
