use codegraph_chunks::build_file_chunks;
use codegraph_core::{ChunkKind, ChunkKindConfig};
use codegraph_ir::IrBuilder;
use codegraph_parser::TreeSitterParser;
use std::collections::HashSet;
use std::io::Write;

fn enabled_all() -> HashSet<ChunkKindConfig> {
    [
        ChunkKindConfig::File,
        ChunkKindConfig::Module,
        ChunkKindConfig::Class,
        ChunkKindConfig::Function,
        ChunkKindConfig::Block,
    ]
    .into_iter()
    .collect()
}

#[test]
fn chunks_a_real_parsed_python_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod_a.py");
    let source = "class Greeter:\n    def hello(self):\n        return 'hi'\n";
    std::fs::File::create(&path).unwrap().write_all(source.as_bytes()).unwrap();

    let parser = TreeSitterParser::new();
    let tree = parser.parse(&path).unwrap();
    let (doc, _flow) = IrBuilder::build(&tree, "mod_a").unwrap();

    let chunks = build_file_chunks(&doc, source, "repo", "snap", &enabled_all()).unwrap();

    let file_chunk = chunks.iter().find(|c| c.kind == ChunkKind::File).expect("file chunk");
    let class_chunk = chunks.iter().find(|c| c.kind == ChunkKind::Class).expect("class chunk");
    let fn_chunk = chunks.iter().find(|c| c.kind == ChunkKind::Function).expect("function chunk");

    assert_eq!(file_chunk.content_hash, {
        let normalized = source.replace("\r\n", "\n");
        blake3::hash(normalized.as_bytes()).to_hex().to_string()
    });
    assert_eq!(class_chunk.parent_chunk_id, chunks.iter().find(|c| c.kind == ChunkKind::Module).map(|c| c.chunk_id));
    assert!(chunks.iter().find(|c| c.chunk_id == class_chunk.chunk_id).unwrap().child_chunk_ids.contains(&fn_chunk.chunk_id));
}
