//! Stage dependency graph.
//!
//! Two kinds of edges:
//!
//! - *requires*: running the stage pulls the dependency into the run
//!   (`build` requires every `:build` stage)
//! - *after*: ordering only, applied when both stages are in the same run
//!   (every `:build` stage runs after `clean:build`, but `styles:build` on
//!   its own does not empty `dist/`)
//!
//! [`StageGraph::levels`] resolves a target into levels with Kahn's
//! algorithm. Stages within a level are independent and may run in parallel.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::StageId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("stage `{0}` is not registered in the graph")]
    UnknownStage(StageId),

    #[error("dependency cycle between stages: {}", format_stages(.0))]
    Cycle(Vec<StageId>),
}

fn format_stages(stages: &[StageId]) -> String {
    stages
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default, Clone)]
struct Edges {
    requires: Vec<StageId>,
    after: Vec<StageId>,
}

#[derive(Debug, Default, Clone)]
pub struct StageGraph {
    nodes: FxHashMap<StageId, Edges>,
}

const BUILD_STAGES: [StageId; 5] = [
    StageId::HtmlBuild,
    StageId::StylesBuild,
    StageId::ScriptsBuild,
    StageId::ImagesBuild,
    StageId::FontsBuild,
];

impl StageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pipeline's stage graph.
    pub fn standard() -> Self {
        let mut graph = Self::new();
        for stage in [
            StageId::Copy,
            StageId::Styles,
            StageId::Scripts,
            StageId::Images,
            StageId::Clean,
            StageId::CleanBuild,
        ] {
            graph.add(stage, &[]);
        }
        for stage in BUILD_STAGES {
            graph.add(stage, &[]);
            graph.order(stage, &[StageId::CleanBuild]);
        }

        let mut build = vec![StageId::CleanBuild];
        build.extend(BUILD_STAGES);
        graph.add(StageId::Build, &build);
        graph
    }

    /// Register `stage`, pulling `requires` into every run of it.
    pub fn add(&mut self, stage: StageId, requires: &[StageId]) {
        self.nodes
            .entry(stage)
            .or_default()
            .requires
            .extend_from_slice(requires);
    }

    /// Order `stage` after `after` whenever both are part of a run.
    pub fn order(&mut self, stage: StageId, after: &[StageId]) {
        self.nodes
            .entry(stage)
            .or_default()
            .after
            .extend_from_slice(after);
    }

    /// Every stage a run of `target` executes, `target` included.
    pub fn closure(&self, target: StageId) -> Result<FxHashSet<StageId>, GraphError> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![target];
        while let Some(stage) = stack.pop() {
            let edges = self.nodes.get(&stage).ok_or(GraphError::UnknownStage(stage))?;
            if seen.insert(stage) {
                stack.extend(edges.requires.iter().copied());
            }
        }
        Ok(seen)
    }

    /// Stages `stage` waits for within the run `members`.
    pub fn predecessors(&self, stage: StageId, members: &FxHashSet<StageId>) -> Vec<StageId> {
        let Some(edges) = self.nodes.get(&stage) else {
            return Vec::new();
        };
        let mut preds: Vec<StageId> = edges
            .requires
            .iter()
            .chain(&edges.after)
            .copied()
            .filter(|dep| members.contains(dep))
            .collect();
        preds.sort();
        preds.dedup();
        preds
    }

    /// Resolve `target` into execution levels.
    ///
    /// Level `n` holds the stages whose predecessors all sit in levels
    /// before `n`. Stages within a level are sorted for stable output.
    pub fn levels(&self, target: StageId) -> Result<Vec<Vec<StageId>>, GraphError> {
        let members = self.closure(target)?;

        let mut in_degree: FxHashMap<StageId, usize> = FxHashMap::default();
        let mut dependents: FxHashMap<StageId, Vec<StageId>> = FxHashMap::default();
        for &stage in &members {
            let preds = self.predecessors(stage, &members);
            in_degree.insert(stage, preds.len());
            for pred in preds {
                dependents.entry(pred).or_default().push(stage);
            }
        }

        let mut ready: Vec<StageId> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&stage, _)| stage)
            .collect();

        let mut levels = Vec::new();
        let mut placed = 0;
        while !ready.is_empty() {
            ready.sort();
            let mut next = Vec::new();
            for stage in &ready {
                for dependent in dependents.get(stage).into_iter().flatten() {
                    if let Some(deg) = in_degree.get_mut(dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            next.push(*dependent);
                        }
                    }
                }
            }
            placed += ready.len();
            levels.push(std::mem::replace(&mut ready, next));
        }

        if placed != members.len() {
            let mut stuck: Vec<StageId> = in_degree
                .into_iter()
                .filter(|&(_, deg)| deg > 0)
                .map(|(stage, _)| stage)
                .collect();
            stuck.sort();
            return Err(GraphError::Cycle(stuck));
        }

        Ok(levels)
    }
}
