use crate::task::TaskDef;
use crate::workflow::{PlanError, Workflow};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{BTreeSet, HashMap};

/// Predecessor -> task edges of a workflow.
pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub name_to_index: HashMap<String, NodeIndex>,
    /// References to names that are not declared anywhere: (task, missing).
    pub dangling: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn build(tasks: &[TaskDef]) -> Self {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut name_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut dangling = Vec::new();

        for task in tasks {
            name_to_index
                .entry(task.name.clone())
                .or_insert_with(|| graph.add_node(task.name.clone()));
        }

        for task in tasks {
            let Some(&to) = name_to_index.get(&task.name) else {
                continue;
            };
            for pred in task.start.predecessors() {
                match name_to_index.get(pred) {
                    Some(&from) => {
                        graph.add_edge(from, to, ());
                    }
                    None => dangling.push((task.name.clone(), pred.to_string())),
                }
            }
        }

        Self {
            graph,
            name_to_index,
            dangling,
        }
    }

    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self::build(&workflow.tasks)
    }

    /// Confirms every reference points at a task declared earlier.
    pub fn check_order(&self, tasks: &[TaskDef]) -> Result<(), PlanError> {
        if let Some((task, predecessor)) = self.dangling.first() {
            return Err(PlanError::UnknownPredecessor {
                task: task.clone(),
                predecessor: predecessor.clone(),
            });
        }

        if let Err(cycle) = toposort(&self.graph, None) {
            let name = self.graph[cycle.node_id()].clone();
            return Err(PlanError::InvalidTask {
                task: name,
                reason: "dependency cycle".into(),
            });
        }

        let position: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.name.as_str(), idx))
            .collect();
        for (idx, task) in tasks.iter().enumerate() {
            for pred in task.start.predecessors() {
                if position.get(pred).is_some_and(|&p| p >= idx) {
                    return Err(PlanError::UnknownPredecessor {
                        task: task.name.clone(),
                        predecessor: pred.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn predecessors_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    pub fn successors_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.name_to_index.get(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every task reachable from `roots`, excluding the roots themselves.
    pub fn downstream<'a, I>(&self, roots: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let root_set: BTreeSet<&str> = roots.into_iter().collect();
        let mut reached = BTreeSet::new();
        for root in &root_set {
            let Some(&start) = self.name_to_index.get(*root) else {
                continue;
            };
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                let name = self.graph[node].as_str();
                if !root_set.contains(name) {
                    reached.insert(name.to_string());
                }
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn downstream_of_vendor_verification_reaches_storage() {
        let workflow = catalog::find("seed-procurement").unwrap();
        let dag = DependencyGraph::from_workflow(&workflow);
        let reached = dag.downstream(["Vendor Verification"]);
        assert!(reached.contains("Vendor Approval"));
        assert!(reached.contains("Storage Planning"));
        assert!(!reached.contains("Vendor Verification"));
        assert!(!reached.contains("Determine Sowing Window"));
        assert_eq!(reached.len(), 7);
    }

    #[test]
    fn check_order_flags_forward_and_dangling_references() {
        let forward = vec![
            TaskDef::new("B", "X", "A", 1.0),
            TaskDef::new("A", "X", 0.0, 1.0),
        ];
        let dag = DependencyGraph::build(&forward);
        assert!(matches!(
            dag.check_order(&forward),
            Err(PlanError::UnknownPredecessor { .. })
        ));

        let dangling = vec![TaskDef::new("B", "X", "Ghost", 1.0)];
        let dag = DependencyGraph::build(&dangling);
        assert!(matches!(
            dag.check_order(&dangling),
            Err(PlanError::UnknownPredecessor { predecessor, .. }) if predecessor == "Ghost"
        ));
    }

    #[test]
    fn cycles_are_reported() {
        let cyclic = vec![
            TaskDef::new("A", "X", "B", 1.0),
            TaskDef::new("B", "X", "A", 1.0),
        ];
        let dag = DependencyGraph::build(&cyclic);
        assert!(matches!(
            dag.check_order(&cyclic),
            Err(PlanError::InvalidTask { reason, .. }) if reason == "dependency cycle"
        ));
    }

    #[test]
    fn neighbors_are_sorted() {
        let workflow = catalog::find("unified").unwrap();
        let dag = DependencyGraph::from_workflow(&workflow);
        assert_eq!(
            dag.successors_of("Soil Testing"),
            vec!["NPK Balance", "Organic Carbon", "PH-Level"]
        );
        assert_eq!(dag.predecessors_of("Compost Mixing"), vec!["Gobar Procurement"]);
    }
}
