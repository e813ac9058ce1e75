use crate::error::{GraphError, Result};
use arrow::array::{StringArray, UInt32Array, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use codegraph_core::{Relation, RelationKind};
use std::io::Cursor;
use std::sync::Arc;

/// Encode a batch of `Relation`s as an Arrow IPC stream for cross-process
/// transport, with the file-path column dictionary-encoded as a side table
/// of distinct paths plus a `file_id` index column (a relation has no file
/// path of its own; the path comes from its span, when present).
pub fn encode_relations(relations: &[Relation]) -> Result<(Vec<u8>, Vec<String>)> {
    let mut file_paths: Vec<String> = Vec::new();
    let mut file_id_of = |path: Option<&str>| -> u32 {
        let path = path.unwrap_or("");
        if let Some(pos) = file_paths.iter().position(|p| p == path) {
            pos as u32
        } else {
            file_paths.push(path.to_string());
            (file_paths.len() - 1) as u32
        }
    };

    let mut kinds = Vec::with_capacity(relations.len());
    let mut sources = Vec::with_capacity(relations.len());
    let mut targets = Vec::with_capacity(relations.len());
    let mut file_ids = Vec::with_capacity(relations.len());

    for relation in relations {
        kinds.push(relation_kind_u8(relation.kind));
        sources.push(relation.source_id.to_string());
        targets.push(relation.target_id.to_string());
        file_ids.push(file_id_of(relation.span.as_ref().map(|s| s.file_path.as_str())));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("kind", DataType::UInt8, false),
        Field::new("source_id", DataType::Utf8, false),
        Field::new("target_id", DataType::Utf8, false),
        Field::new("file_id", DataType::UInt32, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(UInt8Array::from(kinds)),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(targets)),
            Arc::new(UInt32Array::from(file_ids)),
        ],
    )?;

    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buf, &schema)?;
        writer.write(&batch)?;
        writer.finish()?;
    }

    Ok((buf, file_paths))
}

/// Decode an Arrow IPC stream produced by `encode_relations` back into
/// `Relation`s. Spans are reconstructed with the file path only (byte/line
/// coordinates are not part of the interchange format, matching the bulk
/// edge transport's reduced footprint).
pub fn decode_relations(bytes: &[u8], file_paths: &[String]) -> Result<Vec<Relation>> {
    let cursor = Cursor::new(bytes);
    let reader = StreamReader::try_new(cursor, None)?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch?;
        let kinds = downcast::<UInt8Array>(&batch, 0)?;
        let sources = downcast::<StringArray>(&batch, 1)?;
        let targets = downcast::<StringArray>(&batch, 2)?;
        let file_ids = downcast::<UInt32Array>(&batch, 3)?;

        for i in 0..batch.num_rows() {
            let source_id = sources
                .value(i)
                .parse()
                .map_err(|_| GraphError::MalformedBatch(format!("bad source id {}", sources.value(i))))?;
            let target_id = targets
                .value(i)
                .parse()
                .map_err(|_| GraphError::MalformedBatch(format!("bad target id {}", targets.value(i))))?;
            let file_id = file_ids.value(i) as usize;
            let file_path = file_paths.get(file_id).cloned().unwrap_or_default();
            let span = if file_path.is_empty() {
                None
            } else {
                Some(codegraph_core::Span::new(file_path, 0, 0, 0, 0, 0, 0))
            };
            out.push(Relation {
                kind: u8_to_relation_kind(kinds.value(i)),
                source_id,
                target_id,
                span,
            });
        }
    }
    Ok(out)
}

fn downcast<'a, T: 'static>(batch: &'a RecordBatch, column: usize) -> Result<&'a T> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| GraphError::MalformedBatch(format!("unexpected type in column {column}")))
}

fn relation_kind_u8(kind: RelationKind) -> u8 {
    match kind {
        RelationKind::Calls => 0,
        RelationKind::Imports => 1,
        RelationKind::Contains => 2,
        RelationKind::Inherits => 3,
        RelationKind::References => 4,
    }
}

fn u8_to_relation_kind(value: u8) -> RelationKind {
    match value {
        1 => RelationKind::Imports,
        2 => RelationKind::Contains,
        3 => RelationKind::Inherits,
        4 => RelationKind::References,
        _ => RelationKind::Calls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Id, Span};

    #[test]
    fn round_trips_relations_through_arrow_ipc() {
        let relations = vec![Relation {
            kind: RelationKind::Calls,
            source_id: Id::derive("Function", &["pkg.a"]),
            target_id: Id::derive("Function", &["pkg.b"]),
            span: Some(Span::new("a.py", 0, 0, 0, 1, 0, 1)),
        }];

        let (bytes, file_paths) = encode_relations(&relations).unwrap();
        let decoded = decode_relations(&bytes, &file_paths).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].kind, RelationKind::Calls);
        assert_eq!(decoded[0].source_id, relations[0].source_id);
        assert_eq!(decoded[0].span.as_ref().unwrap().file_path, "a.py");
    }
}
