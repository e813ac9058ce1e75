use crate::cancellation::CancellationToken;
use crate::module_fqn::module_fqn_for_file;
use crate::summary::{BuildSummary, ErrorKind};
use codegraph_chunks::{build_file_chunks, refresh_build, ChunkManifest, RefreshDelta};
use codegraph_core::{FunctionFlowSummary, GlobalContext, IrDocument, NodeId, PipelineConfig, PipelineError, ResolverDiagnostic};
use codegraph_graph::{GraphDocument, SymbolGraph};
use codegraph_ir::IrBuilder;
use codegraph_parser::{collect_source_files, LanguageRegistry, SyntaxTree, TreeSitterParser};
use codegraph_resolver::{build_global_context, incremental_update};
use codegraph_semantic::{SemanticDocument, SemanticIrBuilder};
use codegraph_typeserver::{Present, TypeServerAdapter, TypeServerHandle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// The changed/deleted file set for an incremental run, matching
/// `index_repository`'s `incremental={false|changed_files+deleted_files}`
/// input shape.
#[derive(Debug, Clone, Default)]
pub struct IncrementalRequest {
    pub changed_files: Vec<PathBuf>,
    pub deleted_files: Vec<PathBuf>,
}

/// Every artifact a build hands to downstream collaborators, plus enough
/// of the intermediate state (IR Documents, parse trees are not retained)
/// to serve as the `prior` input to a later incremental run.
pub struct BuildArtifacts {
    pub ir_documents: HashMap<String, IrDocument>,
    pub flow_summaries: HashMap<String, HashMap<NodeId, FunctionFlowSummary>>,
    pub semantic_documents: HashMap<String, SemanticDocument>,
    pub global_context: GlobalContext,
    pub graph_document: GraphDocument,
    pub symbol_graph: SymbolGraph,
    pub chunk_manifest: ChunkManifest,
    pub refresh_delta: Option<RefreshDelta>,
    pub summary: BuildSummary,
}

/// The sole build entrypoint. A full build discovers every source file
/// under `repo_path`; an incremental run only touches `incremental`'s
/// changed/deleted files and requires the prior build's artifacts to
/// diff against.
#[allow(clippy::too_many_arguments)]
pub async fn index_repository(
    repo_path: &Path,
    repo_id: &str,
    snapshot_id: &str,
    config: &PipelineConfig,
    type_server: Option<Arc<TypeServerAdapter>>,
    incremental: Option<IncrementalRequest>,
    prior: Option<BuildArtifacts>,
    cancellation: &CancellationToken,
) -> BuildArtifacts {
    match (incremental, prior) {
        (Some(request), Some(prior)) => {
            incremental_build(repo_path, repo_id, snapshot_id, config, type_server, request, prior, cancellation).await
        }
        _ => full_build(repo_path, repo_id, snapshot_id, config, type_server, cancellation).await,
    }
}

fn resolve_type_handle(
    config: &PipelineConfig,
    type_server: Option<Arc<TypeServerAdapter>>,
    summary: &mut BuildSummary,
) -> TypeServerHandle<Present> {
    match (config.enable_external_type_analyzer, type_server) {
        (true, Some(adapter)) => TypeServerHandle::new(Some(adapter)),
        (true, None) => {
            warn!("external type analyzer enabled but no adapter was supplied; degrading to no enrichment");
            summary.record_diagnostic_kind(ErrorKind::ExternalAnalyzerUnavailable);
            TypeServerHandle::new(None)
        }
        (false, _) => TypeServerHandle::new(None),
    }
}

type Phase1Output = (Arc<SyntaxTree>, IrDocument, HashMap<NodeId, FunctionFlowSummary>);

fn parse_and_build_ir(parser: &TreeSitterParser, repo_path: &Path, path: &Path) -> Result<Phase1Output, PipelineError> {
    let tree = parser.parse(path)?;
    let module_fqn = module_fqn_for_file(repo_path, path);
    let (doc, flows) = IrBuilder::build(&tree, &module_fqn)?;
    Ok((tree, doc, flows))
}

struct Phase1Result {
    trees: HashMap<String, Arc<SyntaxTree>>,
    ir_documents: HashMap<String, IrDocument>,
    flow_summaries: HashMap<String, HashMap<NodeId, FunctionFlowSummary>>,
}

/// Phase 1: IR Generation per file. Parallel via `rayon`; neither parsing
/// nor IR building suspends, so there is no async boundary here. Each
/// file checks cancellation at its own processing boundary rather than
/// stopping the whole `par_iter`, so already-scheduled files still finish.
fn run_phase1(
    parser: &TreeSitterParser,
    repo_path: &Path,
    paths: &[PathBuf],
    summary: &mut BuildSummary,
    cancellation: &CancellationToken,
) -> Phase1Result {
    let outcomes: Vec<(PathBuf, Result<Phase1Output, PipelineError>)> = paths
        .par_iter()
        .map(|path| {
            let outcome = if cancellation.is_cancelled() {
                Err(PipelineError::Cancelled)
            } else {
                parse_and_build_ir(parser, repo_path, path)
            };
            (path.clone(), outcome)
        })
        .collect();

    let mut result = Phase1Result {
        trees: HashMap::new(),
        ir_documents: HashMap::new(),
        flow_summaries: HashMap::new(),
    };
    for (path, outcome) in outcomes {
        summary.files_processed += 1;
        match outcome {
            Ok((tree, doc, flows)) => {
                let key = doc.file_path.clone();
                result.trees.insert(key.clone(), tree);
                result.flow_summaries.insert(key.clone(), flows);
                result.ir_documents.insert(key, doc);
            }
            Err(e) => summary.record_failure(path.display().to_string(), &e),
        }
    }
    result
}

/// Phase 2's Semantic IR half: build each file's `SemanticDocument` in
/// turn, mutating its `IrDocument` in place to attach `signature_id`/
/// `declared_type_id`. Stops early at a file boundary once cancelled.
async fn run_semantic_phase(
    ir_documents: &mut HashMap<String, IrDocument>,
    trees: &HashMap<String, Arc<SyntaxTree>>,
    type_handle: &TypeServerHandle<Present>,
    cancellation: &CancellationToken,
) -> HashMap<String, SemanticDocument> {
    let mut semantic_documents = HashMap::new();
    for (path, doc) in ir_documents.iter_mut() {
        if cancellation.is_cancelled() {
            warn!("cancellation observed at a phase 2 file boundary");
            break;
        }
        let Some(tree) = trees.get(path) else { continue };
        let semantic_doc = SemanticIrBuilder::build(tree, doc, type_handle).await;
        semantic_documents.insert(path.clone(), semantic_doc);
    }
    semantic_documents
}

fn record_resolver_diagnostics(context: &GlobalContext, summary: &mut BuildSummary) {
    for diagnostic in &context.diagnostics {
        match diagnostic {
            ResolverDiagnostic::AmbiguousFqn { .. } => summary.record_diagnostic_kind(ErrorKind::CrossFileAmbiguity),
            ResolverDiagnostic::DependencyCycle { .. } => summary.record_diagnostic_kind(ErrorKind::DependencyCycle),
        }
    }
}

async fn full_build(
    repo_path: &Path,
    repo_id: &str,
    snapshot_id: &str,
    config: &PipelineConfig,
    type_server: Option<Arc<TypeServerAdapter>>,
    cancellation: &CancellationToken,
) -> BuildArtifacts {
    let mut summary = BuildSummary::default();
    let type_handle = resolve_type_handle(config, type_server, &mut summary);

    let registry = LanguageRegistry::new();
    let paths = match collect_source_files(repo_path, &registry) {
        Ok(paths) => paths,
        Err(e) => {
            summary.record_failure(repo_path.display().to_string(), &e);
            Vec::new()
        }
    };
    info!(count = paths.len(), "full build: discovered source files");

    let parser = TreeSitterParser::with_cache_capacity(codegraph_parser::DEFAULT_CACHE_CAPACITY);
    let mut phase1 = run_phase1(&parser, repo_path, &paths, &mut summary, cancellation);

    // The Cross-File Resolver reads this pre-semantic snapshot only, which
    // is what lets it run alongside Phase 2's Semantic IR building below.
    let pre_semantic: Vec<IrDocument> = phase1.ir_documents.values().cloned().collect();
    let repo_id_owned = repo_id.to_string();
    let snapshot_id_owned = snapshot_id.to_string();
    let resolver_task =
        tokio::task::spawn_blocking(move || build_global_context(&pre_semantic, &repo_id_owned, &snapshot_id_owned));

    let semantic_documents = run_semantic_phase(&mut phase1.ir_documents, &phase1.trees, &type_handle, cancellation).await;

    let global_context = resolver_task.await.unwrap_or_default();
    record_resolver_diagnostics(&global_context, &mut summary);

    let ir_doc_values: Vec<IrDocument> = phase1.ir_documents.values().cloned().collect();
    let graph_document = GraphDocument::build(&ir_doc_values);
    let symbol_graph = SymbolGraph::project(&graph_document, &global_context.symbol_table);

    let chunks: Vec<_> = phase1
        .ir_documents
        .par_iter()
        .flat_map(|(path, doc)| {
            if cancellation.is_cancelled() {
                return Vec::new();
            }
            let source = phase1.trees.get(path).map(|t| t.source.as_str()).unwrap_or("");
            build_file_chunks(doc, source, repo_id, snapshot_id, &config.chunk_kinds_enabled).unwrap_or_default()
        })
        .collect();
    let chunk_manifest = ChunkManifest::from_chunks(chunks);

    BuildArtifacts {
        ir_documents: phase1.ir_documents,
        flow_summaries: phase1.flow_summaries,
        semantic_documents,
        global_context,
        graph_document,
        symbol_graph,
        chunk_manifest,
        refresh_delta: None,
        summary,
    }
}

#[allow(clippy::too_many_arguments)]
async fn incremental_build(
    repo_path: &Path,
    repo_id: &str,
    snapshot_id: &str,
    config: &PipelineConfig,
    type_server: Option<Arc<TypeServerAdapter>>,
    request: IncrementalRequest,
    prior: BuildArtifacts,
    cancellation: &CancellationToken,
) -> BuildArtifacts {
    let mut summary = BuildSummary::default();
    let type_handle = resolve_type_handle(config, type_server, &mut summary);

    let deleted: Vec<String> = request.deleted_files.iter().map(|p| p.to_string_lossy().to_string()).collect();

    let parser = TreeSitterParser::with_cache_capacity(codegraph_parser::DEFAULT_CACHE_CAPACITY);
    let mut phase1 = run_phase1(&parser, repo_path, &request.changed_files, &mut summary, cancellation);

    let changed_pre_semantic: Vec<IrDocument> = phase1.ir_documents.values().cloned().collect();

    let semantic_documents_changed =
        run_semantic_phase(&mut phase1.ir_documents, &phase1.trees, &type_handle, cancellation).await;

    // `all_documents` represents the project's current IR, post-semantic
    // enrichment, needed so the resolver can reresolve unchanged files
    // that transitively imported from a changed one.
    let mut all_documents = prior.ir_documents.clone();
    for file in &deleted {
        all_documents.remove(file);
    }
    for (path, doc) in &phase1.ir_documents {
        all_documents.insert(path.clone(), doc.clone());
    }

    let mut global_context = prior.global_context.clone();
    incremental_update(&mut global_context, &changed_pre_semantic, &deleted, &all_documents, repo_id, snapshot_id);
    record_resolver_diagnostics(&global_context, &mut summary);

    let ir_doc_values: Vec<IrDocument> = all_documents.values().cloned().collect();
    let graph_document = GraphDocument::build(&ir_doc_values);
    let symbol_graph = SymbolGraph::project(&graph_document, &global_context.symbol_table);

    let changed_for_chunks: Vec<(IrDocument, String)> = phase1
        .ir_documents
        .iter()
        .map(|(path, doc)| {
            let source = phase1.trees.get(path).map(|t| t.source.clone()).unwrap_or_default();
            (doc.clone(), source)
        })
        .collect();
    let (chunk_manifest, refresh_delta) = refresh_build(
        &prior.chunk_manifest,
        &changed_for_chunks,
        &deleted,
        repo_id,
        snapshot_id,
        &config.chunk_kinds_enabled,
    )
    .unwrap_or_else(|_| (prior.chunk_manifest.clone(), RefreshDelta::default()));

    let mut semantic_documents = prior.semantic_documents;
    for file in &deleted {
        semantic_documents.remove(file);
    }
    semantic_documents.extend(semantic_documents_changed);

    let mut flow_summaries = prior.flow_summaries;
    for file in &deleted {
        flow_summaries.remove(file);
    }
    flow_summaries.extend(phase1.flow_summaries);

    BuildArtifacts {
        ir_documents: all_documents,
        flow_summaries,
        semantic_documents,
        global_context,
        graph_document,
        symbol_graph,
        chunk_manifest,
        refresh_delta: Some(refresh_delta),
        summary,
    }
}
