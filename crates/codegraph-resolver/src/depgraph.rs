use codegraph_core::ResolvedImport;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Build the file-level dependency graph (`f -> g` means `f` imports a
/// symbol defined in `g`), its strongly connected components, and a
/// topological order when the graph is acyclic. `file_imports` is keyed by
/// importing file path.
pub fn build_dependency_graph(
    file_imports: &HashMap<String, Vec<ResolvedImport>>,
) -> (Vec<(String, String)>, Vec<Vec<String>>, Vec<String>) {
    let mut graph = DiGraph::<String, ()>::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();
    let mut edge_set: HashSet<(String, String)> = HashSet::new();

    let mut node_index = |graph: &mut DiGraph<String, ()>, index_of: &mut HashMap<String, NodeIndex>, file: &str| -> NodeIndex {
        *index_of
            .entry(file.to_string())
            .or_insert_with(|| graph.add_node(file.to_string()))
    };

    for (file, imports) in file_imports {
        let from = node_index(&mut graph, &mut index_of, file);
        for import in imports {
            let Some(source_file) = &import.source_file else { continue };
            if source_file == file {
                continue;
            }
            if edge_set.insert((file.clone(), source_file.clone())) {
                let to = node_index(&mut graph, &mut index_of, source_file);
                graph.add_edge(from, to, ());
            }
        }
    }

    let sccs: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| component.into_iter().map(|idx| graph[idx].clone()).collect())
        .collect();

    let topological_order = if sccs.is_empty() {
        toposort(&graph, None)
            .map(|order| order.into_iter().map(|idx| graph[idx].clone()).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    (edge_set.into_iter().collect(), sccs, topological_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(source_file: &str) -> ResolvedImport {
        ResolvedImport {
            imported_fqn: "x".to_string(),
            resolved_fqn: Some("x".to_string()),
            source_file: Some(source_file.to_string()),
            is_external: false,
        }
    }

    #[test]
    fn acyclic_graph_has_topological_order() {
        let mut imports = HashMap::new();
        imports.insert("a.py".to_string(), vec![resolved("b.py")]);
        imports.insert("b.py".to_string(), vec![]);

        let (edges, sccs, topo) = build_dependency_graph(&imports);
        assert_eq!(edges.len(), 1);
        assert!(sccs.is_empty());
        assert_eq!(topo, vec!["a.py".to_string(), "b.py".to_string()]);
    }

    #[test]
    fn cycle_is_surfaced_and_suppresses_topological_order() {
        let mut imports = HashMap::new();
        imports.insert("a.py".to_string(), vec![resolved("b.py")]);
        imports.insert("b.py".to_string(), vec![resolved("a.py")]);

        let (_, sccs, topo) = build_dependency_graph(&imports);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 2);
        assert!(topo.is_empty());
    }
}
