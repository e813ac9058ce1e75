use crate::error::Result;
use crate::symbol_graph::SymbolGraph;
use codegraph_core::{NodeKind, Relation, RelationKind, Symbol};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

/// Persists a `SymbolGraph` as two relational tables and loads it back,
/// reconstructing the in-memory indices. Cross-process sharing only: the
/// in-memory `SymbolGraph` stays the primary representation.
pub struct SqliteSymbolStore {
    conn: Connection,
}

impl SqliteSymbolStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS symbols (
                id TEXT PRIMARY KEY,
                repo_id TEXT NOT NULL,
                snapshot_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                fqn TEXT NOT NULL,
                name TEXT NOT NULL,
                parent_id TEXT,
                signature_id TEXT,
                type_id TEXT,
                span_json TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_symbols_repo_snapshot ON symbols(repo_id, snapshot_id);

            CREATE TABLE IF NOT EXISTS relations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                repo_id TEXT NOT NULL,
                snapshot_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                span_json TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_relations_repo_snapshot ON relations(repo_id, snapshot_id);
            CREATE INDEX IF NOT EXISTS idx_relations_source ON relations(source_id);
            CREATE INDEX IF NOT EXISTS idx_relations_target ON relations(target_id);",
        )?;
        Ok(())
    }

    pub fn persist(&mut self, graph: &SymbolGraph, repo_id: &str, snapshot_id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        for symbol in graph.symbols() {
            tx.execute(
                "INSERT OR REPLACE INTO symbols
                 (id, repo_id, snapshot_id, kind, fqn, name, parent_id, signature_id, type_id, span_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    symbol.id.to_string(),
                    symbol.repo_id,
                    symbol.snapshot_id,
                    kind_to_text(symbol.kind),
                    symbol.fqn,
                    symbol.name,
                    symbol.parent_id.map(|id| id.to_string()),
                    symbol.signature_id.map(|id| id.to_string()),
                    symbol.type_id.map(|id| id.to_string()),
                    symbol.span.as_ref().map(|s| serde_json::to_string(s)).transpose()?,
                ],
            )?;
        }
        for relation in graph.relations() {
            tx.execute(
                "INSERT INTO relations (repo_id, snapshot_id, kind, source_id, target_id, span_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    repo_id,
                    snapshot_id,
                    relation_kind_to_text(relation.kind),
                    relation.source_id.to_string(),
                    relation.target_id.to_string(),
                    relation.span.as_ref().map(|s| serde_json::to_string(s)).transpose()?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load(&self, repo_id: &str, snapshot_id: &str) -> Result<(HashMap<String, Symbol>, Vec<Relation>)> {
        let mut symbol_stmt = self.conn.prepare(
            "SELECT id, repo_id, snapshot_id, kind, fqn, name, parent_id, signature_id, type_id, span_json
             FROM symbols WHERE repo_id = ?1 AND snapshot_id = ?2",
        )?;
        let rows = symbol_stmt
            .query_map(params![repo_id, snapshot_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, Option<String>>(9)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut by_fqn = HashMap::with_capacity(rows.len());
        for (id, repo_id, snapshot_id, kind, fqn, name, parent_id, signature_id, type_id, span_json) in rows {
            let span = span_json.map(|s| serde_json::from_str(&s)).transpose()?;
            let symbol = Symbol {
                id: id.parse().map_err(|_| crate::error::GraphError::MalformedBatch(format!("bad id {id}")))?,
                kind: text_to_kind(&kind),
                fqn: fqn.clone(),
                name,
                repo_id,
                snapshot_id,
                span,
                parent_id: optional_id(parent_id)?,
                signature_id: optional_id(signature_id)?,
                type_id: optional_id(type_id)?,
            };
            by_fqn.insert(fqn, symbol);
        }

        let mut relation_stmt = self
            .conn
            .prepare("SELECT kind, source_id, target_id, span_json FROM relations WHERE repo_id = ?1 AND snapshot_id = ?2")?;
        let relations = relation_stmt
            .query_map(params![repo_id, snapshot_id], |row| {
                let span_json: Option<String> = row.get(3)?;
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, span_json))
            })?
            .map(|r| {
                let (kind, source, target, span_json) = r?;
                Ok(Relation {
                    kind: text_to_relation_kind(&kind),
                    source_id: source.parse().map_err(|_| crate::error::GraphError::MalformedBatch(format!("bad id {source}")))?,
                    target_id: target.parse().map_err(|_| crate::error::GraphError::MalformedBatch(format!("bad id {target}")))?,
                    span: span_json.map(|s| serde_json::from_str(&s)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((by_fqn, relations))
    }
}

fn optional_id(text: Option<String>) -> Result<Option<codegraph_core::Id>> {
    text.map(|t| t.parse().map_err(|_| crate::error::GraphError::MalformedBatch(format!("bad id {t}"))))
        .transpose()
}

fn kind_to_text(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "File",
        NodeKind::Module => "Module",
        NodeKind::Class => "Class",
        NodeKind::Function => "Function",
        NodeKind::Method => "Method",
        NodeKind::Variable => "Variable",
        NodeKind::Parameter => "Parameter",
        NodeKind::Import => "Import",
        NodeKind::Expression => "Expression",
        NodeKind::External => "External",
    }
}

fn text_to_kind(text: &str) -> NodeKind {
    match text {
        "Module" => NodeKind::Module,
        "Class" => NodeKind::Class,
        "Function" => NodeKind::Function,
        "Method" => NodeKind::Method,
        "Variable" => NodeKind::Variable,
        "Parameter" => NodeKind::Parameter,
        "Import" => NodeKind::Import,
        "Expression" => NodeKind::Expression,
        "External" => NodeKind::External,
        _ => NodeKind::File,
    }
}

fn relation_kind_to_text(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Calls => "Calls",
        RelationKind::Imports => "Imports",
        RelationKind::Contains => "Contains",
        RelationKind::Inherits => "Inherits",
        RelationKind::References => "References",
    }
}

fn text_to_relation_kind(text: &str) -> RelationKind {
    match text {
        "Imports" => RelationKind::Imports,
        "Contains" => RelationKind::Contains,
        "Inherits" => RelationKind::Inherits,
        "References" => RelationKind::References,
        _ => RelationKind::Calls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::GraphDocument;
    use codegraph_core::{EdgeKind, IrDocument, IrEdge, IrNode, Language, Span};

    fn span() -> Span {
        Span::new("a.py", 0, 0, 0, 1, 0, 1)
    }

    #[test]
    fn round_trips_symbols_and_relations() {
        let caller = IrNode::new(NodeKind::Function, "caller", "pkg.caller", span(), "a.py", Language::Python);
        let callee = IrNode::new(NodeKind::Function, "callee", "pkg.callee", span(), "a.py", Language::Python);
        let (caller_id, callee_id) = (caller.id, callee.id);

        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.edges.push(IrEdge::new(EdgeKind::Calls, caller_id, callee_id));
        doc.nodes.push(caller);
        doc.nodes.push(callee);
        let graph_doc = GraphDocument::build(&[doc]);

        let mut table = HashMap::new();
        table.insert(
            "pkg.caller".to_string(),
            Symbol {
                id: caller_id,
                kind: NodeKind::Function,
                fqn: "pkg.caller".to_string(),
                name: "caller".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                span: Some(span()),
                parent_id: None,
                signature_id: None,
                type_id: None,
            },
        );
        let symbol_graph = SymbolGraph::project(&graph_doc, &table);

        let mut store = SqliteSymbolStore::open_in_memory().unwrap();
        store.persist(&symbol_graph, "repo", "snap").unwrap();
        let (symbols, relations) = store.load("repo", "snap").unwrap();

        assert_eq!(symbols.len(), 1);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].source_id, caller_id);
    }
}
