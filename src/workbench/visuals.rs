//! Visuals panel model: the chart and table tabs of a project

use crate::error::{Result, WorkbenchError};

use super::id::TabId;
use super::plot_composer::Chart;
use super::table_composer::TableView;

#[derive(Debug, Clone, PartialEq)]
pub enum VisualContent {
    Chart(Chart),
    Table(TableView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualTab {
    pub id: TabId,
    pub title: String,
    pub content: VisualContent,
}

/// Open tabs in opening order
#[derive(Debug, Default)]
pub struct Visuals {
    tabs: Vec<VisualTab>,
}

impl Visuals {
    pub fn open(&mut self, title: impl Into<String>, content: VisualContent) -> TabId {
        let id = TabId::next();
        let title = title.into();
        tracing::debug!("Opening tab {:?} '{}'", id, title);
        self.tabs.push(VisualTab { id, title, content });
        id
    }

    /// Close and release a tab; false if it was not open
    pub fn close(&mut self, id: TabId) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|t| t.id != id);
        self.tabs.len() != before
    }

    pub fn get(&self, id: TabId) -> Option<&VisualTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut VisualTab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.get(id).is_some()
    }

    pub fn chart(&self, id: TabId) -> Option<&Chart> {
        match &self.get(id)?.content {
            VisualContent::Chart(chart) => Some(chart),
            VisualContent::Table(_) => None,
        }
    }

    pub fn chart_mut(&mut self, id: TabId) -> Option<&mut Chart> {
        match &mut self.get_mut(id)?.content {
            VisualContent::Chart(chart) => Some(chart),
            VisualContent::Table(_) => None,
        }
    }

    pub fn table(&self, id: TabId) -> Option<&TableView> {
        match &self.get(id)?.content {
            VisualContent::Table(table) => Some(table),
            VisualContent::Chart(_) => None,
        }
    }

    pub fn table_mut(&mut self, id: TabId) -> Option<&mut TableView> {
        match &mut self.get_mut(id)?.content {
            VisualContent::Table(table) => Some(table),
            VisualContent::Chart(_) => None,
        }
    }

    pub fn tabs(&self) -> &[VisualTab] {
        &self.tabs
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Serialize a chart tab to pretty JSON
    pub fn export_chart_json(&self, id: TabId) -> Result<String> {
        let chart = self
            .chart(id)
            .ok_or_else(|| WorkbenchError::InvalidParameter(format!("{:?} is not a chart", id)))?;
        Ok(serde_json::to_string_pretty(chart)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbench::plot_composer::Curve;

    #[test]
    fn test_open_and_close() {
        let mut visuals = Visuals::default();
        let a = visuals.open("a", VisualContent::Chart(Chart::new("a", "x", "y")));
        let b = visuals.open("b", VisualContent::Chart(Chart::new("b", "x", "y")));
        assert_eq!(visuals.ids(), vec![a, b]);
        assert!(visuals.close(a));
        assert!(!visuals.close(a));
        assert_eq!(visuals.len(), 1);
        assert!(visuals.table(b).is_none());
    }

    #[test]
    fn test_export_chart_json() {
        let mut visuals = Visuals::default();
        let chart = Chart::new("Bx vs z", "z", "Bx").with_curve(Curve {
            label: "meas1: Bx".to_string(),
            points: vec![[0.0, 1.0]],
        });
        let id = visuals.open("Bx vs z", VisualContent::Chart(chart.clone()));
        let json = visuals.export_chart_json(id).unwrap();
        let back: Chart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chart);
    }
}
