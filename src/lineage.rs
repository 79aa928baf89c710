//! Dependency lineage of a catalogue asset.
//!
//! The graph is one level deep: the asset is the root and every entry of
//! its `depends-on` list is a parent with an edge pointing at the root.

use crate::models::Asset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    pub root: String,
    pub parents: Vec<String>,
}

impl Lineage {
    /// Parents keep their declared order; repeats and blanks are dropped.
    pub fn of(asset: &Asset) -> Self {
        let mut parents: Vec<String> = Vec::with_capacity(asset.depends_on.len());
        for parent in &asset.depends_on {
            let parent = parent.trim();
            if !parent.is_empty() && !parents.iter().any(|p| p == parent) {
                parents.push(parent.to_string());
            }
        }
        Self {
            root: asset.name.clone(),
            parents,
        }
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.parents
            .iter()
            .map(|p| Edge {
                from: p.clone(),
                to: self.root.clone(),
            })
            .collect()
    }

    /// Render as an indented tree, root first.
    ///
    /// ```text
    /// orders
    /// ├── raw_orders
    /// └── customers
    /// ```
    pub fn render(&self) -> String {
        let mut out = self.root.clone();
        let last = self.parents.len().saturating_sub(1);
        for (i, parent) in self.parents.iter().enumerate() {
            let branch = if i == last { "└──" } else { "├──" };
            out.push('\n');
            out.push_str(&format!("{} {}", branch, parent));
        }
        out
    }
}
