//! A project: one registry, cache, tree and visuals panel, owned as a unit.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::backend::DeviceComputeService;
use crate::config::AnalysisParameters;

use super::cache::AnalysisCache;
use super::engine::{AnalysisContext, AnalysisEngine};
use super::explore_tree::ExploreTree;
use super::host::UiHost;
use super::id::ProjectId;
use super::plot_composer::{PlotComposer, PlotMode};
use super::registry::DeviceRegistry;
use super::table_composer::TableComposer;
use super::visuals::Visuals;

#[derive(Debug)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub registry: DeviceRegistry,
    pub cache: AnalysisCache,
    pub tree: ExploreTree,
    pub engine: AnalysisEngine,
    pub plots: PlotComposer,
    pub tables: TableComposer,
    pub visuals: Visuals,
    /// Measurement files opened in this project
    pub filenames: BTreeSet<PathBuf>,
}

impl Project {
    pub fn new(name: impl Into<String>, params: AnalysisParameters, plot_mode: PlotMode) -> Self {
        let mut plots = PlotComposer::new();
        plots.set_mode(plot_mode);
        Self {
            id: ProjectId::next(),
            name: name.into(),
            registry: DeviceRegistry::new(),
            cache: AnalysisCache::new(),
            tree: ExploreTree::new(),
            engine: AnalysisEngine::new(params),
            plots,
            tables: TableComposer::new(),
            visuals: Visuals::default(),
            filenames: BTreeSet::new(),
        }
    }

    /// Run `f` with the engine and a context over this project's state
    pub fn with_engine<R>(
        &mut self,
        service: &mut dyn DeviceComputeService,
        host: &mut dyn UiHost,
        f: impl FnOnce(&AnalysisEngine, &mut AnalysisContext<'_>) -> R,
    ) -> R {
        let mut ctx = AnalysisContext {
            registry: &mut self.registry,
            cache: &mut self.cache,
            tree: &mut self.tree,
            service,
            host,
        };
        f(&self.engine, &mut ctx)
    }
}
