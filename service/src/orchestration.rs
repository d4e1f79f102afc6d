//! The three orchestration entry points (§6): `get_violations`, `get_graph`, and
//! `random_walk`. Each wires a [`BlobStore`] fetch/put around the pure in-process work
//! done by `errspec-analysis`/`errspec-icfg`.
//!
//! Reading a [`Module`] out of a `bitcode_handle` blob is itself an external
//! collaborator's job (§1 "we assume an IR reader that yields a module-level object
//! model"); this crate never parses bitcode, so every entry point here takes a
//! [`ModuleLoader`] the caller supplies instead of hard-coding one.

use std::collections::BTreeMap;

use log::warn;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use errspec_analysis::{run_detectors, NameResolver, Specification, Violation};
use errspec_ir::{FuncId, Module};
use errspec_icfg::{build, random_walk as run_random_walk, Sentence, SentenceWriter, WalkConfig};

use crate::blob_store::{validate_scheme, BlobStore};
use crate::error::{Error, Result};
use crate::requests::{
    EdgeRecord, GetGraphRequest, GetViolationsRequest, GetViolationsResponse, GraphResponse, RandomWalkRequest,
    SentenceRecord, SpecificationRequest, ViolationRecord,
};

/// Turns a fetched bitcode blob into the object model the rest of the workspace
/// operates on. The only implementation this crate ships is a test double; a real
/// deployment supplies one backed by its actual IR reader.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, bitcode: &[u8]) -> Result<Module>;
}

fn require_handle(bitcode_handle: &str) -> Result<()> {
    if bitcode_handle.trim().is_empty() {
        return Err(Error::InvalidArgument("bitcode_handle has no authority".into()));
    }
    Ok(())
}

fn load_module(loader: &dyn ModuleLoader, blobs: &dyn BlobStore, bitcode_handle: &str) -> Result<Module> {
    require_handle(bitcode_handle)?;
    let bytes = blobs.get(bitcode_handle)?;
    loader.load(&bytes)
}

fn specifications_from(requested: &[SpecificationRequest]) -> Vec<Specification> {
    requested
        .iter()
        .map(|s| Specification::new(s.function.clone(), s.lattice_element))
        .collect()
}

fn violation_record(module: &Module, violation: &Violation) -> ViolationRecord {
    ViolationRecord {
        kind: violation.kind,
        file: violation.location.file.clone(),
        line: violation.location.line,
        parent: violation.parent.clone(),
        callee: violation.callee.clone(),
    }
    .resolve_tentative(module)
}

impl ViolationRecord {
    /// Placeholder hook for presenting `TENTATIVE_<name>` sentinel names (§6) once a
    /// violation carries an error-code value to look up; none of the current detectors
    /// attach one, so this is currently a no-op identity pass.
    fn resolve_tentative(self, _module: &Module) -> Self {
        self
    }
}

/// §6 `GetViolationsRequest` / `GetViolationsResponse`.
pub fn get_violations(
    loader: &dyn ModuleLoader,
    blobs: &dyn BlobStore,
    request: &GetViolationsRequest,
) -> Result<GetViolationsResponse> {
    let module = load_module(loader, blobs, &request.bitcode_handle)?;
    let names = NameResolver::resolve(&module);
    let specifications = specifications_from(&request.specifications);

    let violations = run_detectors(&module, &names, &specifications);
    let violations: Vec<_> = violations
        .iter()
        .filter(|v| request.violation_type.is_none_or(|kind| kind == v.kind))
        .map(|v| violation_record(&module, v))
        .collect();

    Ok(GetViolationsResponse { violations })
}

/// The top-level source folder a `/`-separated file path starts with, or `None` for a
/// bare filename with no folder component.
fn top_folder(file: &str) -> Option<&str> {
    file.split('/').next().filter(|s| !s.is_empty() && *s != file)
}

/// §6's `remove_cross_folder`: suppress a call edge when its caller and callee carry
/// debug locations in different top-level folders, except when either side is named
/// `include` (headers are shared across folders by design, not worth suppressing).
fn is_cross_folder(caller_file: &str, callee_file: &str) -> bool {
    match (top_folder(caller_file), top_folder(callee_file)) {
        (Some(a), Some(b)) if a != b => a != "include" && b != "include",
        _ => false,
    }
}

/// The file of a function's first instruction carrying known debug info, standing in
/// for "the file this function is defined in" since `Function` has no such field of its
/// own (only per-instruction `Location`s do).
fn file_of_function(module: &Module, func: FuncId) -> Option<String> {
    let function = module.function(func);
    function
        .instructions()
        .map(|(_, inst)| &function.inst(inst).location)
        .find(|loc| loc.is_known())
        .map(|loc| loc.file.clone())
}

/// Recovers the [`FuncId`] a call edge's target vertex names, by undoing
/// `NameResolver::call_name`'s `"{source_name}.0"` formatting (§4.9's `visit_call`
/// attaches that name to a resolved callee's vertex directly, with no other
/// transformation, so it's the only case this needs to invert).
fn resolve_callee(module: &Module, target_name: &str) -> Option<FuncId> {
    target_name
        .strip_suffix(".0")
        .and_then(|source_name| module.find_by_source_name(source_name))
        .or_else(|| module.find_by_source_name(target_name))
}

/// §6 `GetGraphRequest` / the ICFG edge-list serialization. `request.error_codes` is
/// merged into the loaded module's `ErrorCodeTable` before building, letting a caller
/// supply sentinel names the IR reader didn't already attach.
pub fn get_graph(
    loader: &dyn ModuleLoader,
    blobs: &dyn BlobStore,
    request: &GetGraphRequest,
) -> Result<GraphResponse> {
    validate_scheme(&request.output_uri)?;
    let mut module = load_module(loader, blobs, &request.bitcode_handle)?;
    for code in &request.error_codes {
        module.error_codes.insert(code.name.clone(), code.value);
    }
    let names = NameResolver::resolve(&module);
    let icfg = build(&module, &names);

    let file_cache: FxHashMap<FuncId, Option<String>> = module
        .analyzable_functions()
        .map(|func| (func, file_of_function(&module, func)))
        .collect();

    let edges: Vec<EdgeRecord> = icfg
        .edges
        .iter()
        .filter(|edge| {
            if !request.remove_cross_folder || edge.meta_label != errspec_icfg::MetaLabel::Call {
                return true;
            }
            let Some(caller_file) = edge.source_location.as_ref().map(|l| l.file.as_str()) else {
                return true;
            };
            let target_name = icfg.vertices.name_of(edge.target);
            let Some(callee) = resolve_callee(&module, target_name) else {
                return true;
            };
            match file_cache.get(&callee).and_then(Option::as_deref) {
                Some(callee_file) => !is_cross_folder(caller_file, callee_file),
                None => true,
            }
        })
        .map(|edge| EdgeRecord {
            source: icfg.vertices.name_of(edge.source).to_string(),
            target: icfg.vertices.name_of(edge.target).to_string(),
            meta_label: edge.meta_label.as_str().to_string(),
            source_file: edge.source_location.as_ref().map(|l| l.file.clone()).unwrap_or_default(),
            source_line: edge.source_location.as_ref().map(|l| l.line).unwrap_or(0),
            label_ids: edge.label_ids.iter().map(|id| id.index()).collect(),
        })
        .collect();

    let id_to_label: BTreeMap<u32, String> = icfg
        .labels
        .as_map()
        .into_iter()
        .map(|(id, label)| (id, label.to_string()))
        .collect();

    let response = GraphResponse { edges, id_to_label };
    let bytes = serde_json::to_vec(&response).map_err(|e| Error::Internal(format!("serializing graph response: {e}")))?;
    blobs.put(&request.output_uri, &bytes)?;
    Ok(response)
}

struct VecSentenceRecordWriter(Vec<SentenceRecord>);

impl SentenceWriter for VecSentenceRecordWriter {
    fn write_sentence(&mut self, sentence: Sentence) {
        self.0.push(SentenceRecord {
            start_label: sentence.start_label,
            labels: sentence.labels,
        });
    }
}

/// §6 `RandomWalkRequest` / walker output. Reads a previously-persisted edge-list from
/// `input_uri` (the `GetGraphRequest` output this is normally chained after) and writes
/// newline-delimited, space-separated label text to `output_uri`, matching §6's "or
/// newline-delimited text" output form.
pub fn random_walk(blobs: &dyn BlobStore, request: &RandomWalkRequest) -> Result<()> {
    validate_scheme(&request.input_uri)?;
    validate_scheme(&request.output_uri)?;

    let bytes = blobs.get(&request.input_uri)?;
    let graph: GraphResponse =
        serde_json::from_slice(&bytes).map_err(|e| Error::DataLoss(format!("corrupt edge-list: {e}")))?;

    let lpds = graph_response_to_lpds(&graph)?;

    let config = WalkConfig {
        walks_per_label: request.walks_per_label,
        walk_length: request.walk_length,
    };
    if config.walk_length == 0 {
        warn!(target: "walker", "walk_length is 0, random_walk is a no-op");
    }

    let writer = Mutex::new(VecSentenceRecordWriter(Vec::new()));
    run_random_walk(&lpds, &config, &writer);
    let sentences = writer.into_inner().0;

    let text = sentences
        .iter()
        .map(|s| s.labels.join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    blobs.put(&request.output_uri, text.as_bytes())?;
    Ok(())
}

/// Rebuilds an [`errspec_icfg::Lpds`] from a previously-persisted edge-list, the inverse
/// of [`get_graph`]'s serialization. Grounded on `walker/src/walker.cc`'s
/// `Walker::ReadLegacyIcfg`, and mirrors `errspec_icfg::lpds::ingest`'s ingestion rules
/// exactly (§4.10) since the persisted edge-list carries the same shape the in-process
/// builder output does: callee names are recovered from a call edge's own target name,
/// the same way `ingest` reads them off the freshly-built `Icfg`.
fn graph_response_to_lpds(graph: &GraphResponse) -> Result<errspec_icfg::Lpds> {
    let mut lpds = errspec_icfg::Lpds::new();
    for edge in &graph.edges {
        lpds.add_node(edge.source.clone());
        lpds.add_node(edge.target.clone());
    }

    let mut callees_by_source: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for edge in &graph.edges {
        if edge.meta_label == "call" {
            let list = callees_by_source.entry(edge.source.as_str()).or_default();
            if !list.contains(&edge.target.as_str()) {
                list.push(&edge.target);
            }
        }
    }

    for edge in &graph.edges {
        if edge.source == errspec_icfg::MAIN_ENTRY {
            continue;
        }
        let source = lpds.node_ref(&edge.source).ok_or_else(|| Error::Internal("missing source node".into()))?;
        let target = lpds.node_ref(&edge.target).ok_or_else(|| Error::Internal("missing target node".into()))?;
        let is_call = edge.meta_label == "call";
        let is_may_return = edge.meta_label == "may_ret";

        let mut labels: Vec<String> = edge
            .label_ids
            .iter()
            .filter_map(|id| graph.id_to_label.get(id).cloned())
            .collect();
        let callees: Vec<String> = callees_by_source
            .get(edge.source.as_str())
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        if is_call {
            labels.extend(callees.iter().cloned());
        }

        lpds.add_edge(
            source,
            errspec_icfg::LpdsEdge {
                target,
                is_call,
                is_may_return,
                callees,
                labels,
            },
        );
    }
    Ok(lpds)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use errspec_ir::fixtures;
    use errspec_lattice::SignLatticeElement;

    use super::*;

    #[derive(Default)]
    struct InMemoryBlobStore(StdMutex<FxHashMap<String, Vec<u8>>>);

    impl BlobStore for InMemoryBlobStore {
        fn get(&self, uri: &str) -> Result<Vec<u8>> {
            self.0
                .lock()
                .unwrap()
                .get(uri)
                .cloned()
                .ok_or_else(|| Error::DataLoss(format!("no blob at {uri}")))
        }

        fn put(&self, uri: &str, data: &[u8]) -> Result<()> {
            self.0.lock().unwrap().insert(uri.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// Ignores the fetched bytes and always hands back the same fixture module: the
    /// real IR reader is an external collaborator this crate never implements.
    struct FixedModuleLoader(fn() -> errspec_ir::Module);

    impl ModuleLoader for FixedModuleLoader {
        fn load(&self, _bitcode: &[u8]) -> Result<errspec_ir::Module> {
            Ok((self.0)())
        }
    }

    #[test]
    fn get_violations_reports_both_kinds_for_hello_printf() {
        let blobs = InMemoryBlobStore::default();
        blobs.put("file:///hello.bc", b"irrelevant").unwrap();
        let loader = FixedModuleLoader(fixtures::hello_printf);

        let request = GetViolationsRequest {
            bitcode_handle: "file:///hello.bc".to_string(),
            specifications: vec![SpecificationRequest {
                function: "printf".to_string(),
                lattice_element: SignLatticeElement::LessThanZero,
            }],
            violation_type: None,
        };

        let response = get_violations(&loader, &blobs, &request).unwrap();
        assert_eq!(response.violations.len(), 2);
    }

    #[test]
    fn get_violations_filters_by_requested_violation_type() {
        let blobs = InMemoryBlobStore::default();
        blobs.put("file:///hello.bc", b"irrelevant").unwrap();
        let loader = FixedModuleLoader(fixtures::hello_printf);

        let request = GetViolationsRequest {
            bitcode_handle: "file:///hello.bc".to_string(),
            specifications: vec![SpecificationRequest {
                function: "printf".to_string(),
                lattice_element: SignLatticeElement::LessThanZero,
            }],
            violation_type: Some(errspec_analysis::ViolationKind::UnusedReturnValue),
        };

        let response = get_violations(&loader, &blobs, &request).unwrap();
        assert_eq!(response.violations.len(), 1);
        assert_eq!(response.violations[0].kind, errspec_analysis::ViolationKind::UnusedReturnValue);
    }

    #[test]
    fn missing_bitcode_handle_authority_is_invalid_argument() {
        let blobs = InMemoryBlobStore::default();
        let loader = FixedModuleLoader(fixtures::hello_printf);
        let request = GetViolationsRequest {
            bitcode_handle: String::new(),
            specifications: vec![],
            violation_type: None,
        };
        assert!(matches!(get_violations(&loader, &blobs, &request), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn get_graph_persists_an_edge_list_to_the_output_uri() {
        let blobs = InMemoryBlobStore::default();
        blobs.put("file:///hello.bc", b"irrelevant").unwrap();
        let loader = FixedModuleLoader(fixtures::hello_printf);

        let request = GetGraphRequest {
            bitcode_handle: "file:///hello.bc".to_string(),
            output_uri: "file:///out.graph".to_string(),
            remove_cross_folder: false,
            error_codes: vec![],
        };

        let response = get_graph(&loader, &blobs, &request).unwrap();
        assert!(!response.edges.is_empty());
        assert!(blobs.get("file:///out.graph").is_ok());
    }

    #[test]
    fn get_graph_rejects_an_unsupported_output_scheme() {
        let blobs = InMemoryBlobStore::default();
        let loader = FixedModuleLoader(fixtures::hello_printf);
        let request = GetGraphRequest {
            bitcode_handle: "file:///hello.bc".to_string(),
            output_uri: "http://example.com/out".to_string(),
            remove_cross_folder: false,
            error_codes: vec![],
        };
        assert!(matches!(get_graph(&loader, &blobs, &request), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn random_walk_round_trips_through_a_persisted_graph() {
        let blobs = InMemoryBlobStore::default();
        blobs.put("file:///hello.bc", b"irrelevant").unwrap();
        let loader = FixedModuleLoader(fixtures::hello_printf);

        let graph_request = GetGraphRequest {
            bitcode_handle: "file:///hello.bc".to_string(),
            output_uri: "file:///graph.bin".to_string(),
            remove_cross_folder: false,
            error_codes: vec![],
        };
        get_graph(&loader, &blobs, &graph_request).unwrap();

        let walk_request = RandomWalkRequest {
            input_uri: "file:///graph.bin".to_string(),
            output_uri: "file:///walks.txt".to_string(),
            walks_per_label: 2,
            walk_length: 3,
        };
        random_walk(&blobs, &walk_request).unwrap();

        let output = blobs.get("file:///walks.txt").unwrap();
        assert!(!output.is_empty());
    }

    #[test]
    fn cross_folder_pairs_are_cross_folder_unless_include() {
        assert!(is_cross_folder("lib/a.c", "drivers/b.c"));
        assert!(!is_cross_folder("lib/a.c", "lib/b.c"));
        assert!(!is_cross_folder("lib/a.c", "include/b.h"));
        assert!(!is_cross_folder("a.c", "b.c"));
    }
}
