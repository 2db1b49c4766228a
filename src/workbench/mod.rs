//! Workbench core: projects, devices, cached analyses and the explore tree
//!
//! Everything here is GUI-agnostic. The frontend feeds user events into
//! [`ProjectWorkbench`] and renders the state it exposes; messages flow back
//! through the [`UiHost`] trait.
//!
//! # Components
//!
//! - [`ProjectWorkbench`] - Project tabs and event routing
//! - [`Project`] - Registry, cache, tree and visuals of one project
//! - [`DeviceRegistry`] - Unique device names and their payload handles
//! - [`AnalysisCache`] - `(kind, device)` → result, mirrored by the tree
//! - [`ExploreTree`] - Data/Models containers, devices, analyses and leaves
//! - [`AnalysisEngine`] - Runs analyses and cross-talk correction on a device
//! - [`PlotComposer`] / [`TableComposer`] - Build chart and table tabs
//!
//! # Example
//!
//! ```ignore
//! use idanalysis_rs::backend::FieldComputeService;
//! use idanalysis_rs::config::AnalysisParameters;
//! use idanalysis_rs::workbench::{ChecklistItem, ProjectWorkbench};
//!
//! let mut wb = ProjectWorkbench::new(
//!     Box::new(FieldComputeService::new()),
//!     AnalysisParameters::default(),
//! );
//! let name = wb.open_file("meas1.dat".as_ref(), &mut host).unwrap();
//! let node = wb.current().tree.find_device(&name).unwrap();
//!
//! wb.toolbar.analysis = true;
//! wb.toolbar.set_checked(ChecklistItem::MagneticField, true);
//! wb.tree_item_clicked(node, &mut host);
//! ```

pub mod cache;
pub mod engine;
pub mod explore_tree;
pub mod host;
pub mod id;
pub mod plot_composer;
pub mod project;
pub mod registry;
pub mod table_composer;
pub mod toolbar;
pub mod visuals;
#[allow(clippy::module_inception)]
pub mod workbench;

pub use cache::AnalysisCache;
pub use engine::{
    AnalysisContext, AnalysisEngine, DuplicatePolicy, Outcome, CROSS_TALK_ANGLES,
    CROSS_TALK_COEFFICIENTS, CROSS_TALK_SUFFIX,
};
pub use explore_tree::{ContainerKind, ExploreTree, ItemKind, LeafRef, NodeType, TreeNode};
pub use host::{Notice, Severity, UiHost};
pub use id::{NodeId, ProjectId, TabId};
pub use plot_composer::{Chart, Curve, PlotComposer, PlotMode, Selection};
pub use project::Project;
pub use registry::{DeviceRegistry, RenameHook};
pub use table_composer::{format_cell, Cell, TableComposer, TableKey, TableView};
pub use toolbar::{ChecklistItem, ConfirmIcon, TableMode, Toolbar};
pub use visuals::{VisualContent, VisualTab, Visuals};
pub use workbench::{ClickEffects, ProjectWorkbench, RenameEditor};
