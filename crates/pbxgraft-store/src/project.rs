//! An editing session over one stored descriptor.
//!
//! `Project::add_target` runs the whole read-modify-write cycle: idempotency
//! guard, plan, consistency check, confirmation, commit into a copy of the
//! graph, serialization, read-back check, atomic replace. The stored document and the
//! in-memory graph only change after every earlier step has succeeded.

use serde::Serialize;

use pbxgraft_core::compose::{AddOutcome, Composer, CreatedTarget, Patch, Plan, TargetSpec};
use pbxgraft_core::config::ComposerConfig;
use pbxgraft_core::ident::IdGenerator;
use pbxgraft_core::model::serialize::to_pbxproj;
use pbxgraft_core::model::validate::{dangling_references, DanglingReference};
use pbxgraft_core::model::ProjectGraph;
use pbxgraft_core::GraftError;

use crate::digest::digest;
use crate::error::{StoreError, StoreResult};
use crate::fs::DocumentStore;

/// What is about to be written, shown to the confirmation collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Preview<'a> {
    pub location: &'a str,
    pub created: &'a CreatedTarget,
    pub patches: &'a [Patch],
}

/// Operator opt-in before an irreversible write.
pub trait Confirm {
    fn confirm(&mut self, preview: &Preview<'_>) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Preview<'_>) -> bool,
{
    fn confirm(&mut self, preview: &Preview<'_>) -> bool {
        self(preview)
    }
}

/// Pre-confirmed, for `--yes` and non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _preview: &Preview<'_>) -> bool {
        true
    }
}

/// Result of an `add_target` session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub result: AddOutcome,
    pub document: String,
    pub digest_before: String,
    pub digest_after: String,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

#[derive(Debug)]
pub struct Project<S: DocumentStore> {
    store: S,
    graph: ProjectGraph,
    digest: String,
}

impl<S: DocumentStore> Project<S> {
    /// Read and parse the stored document.
    pub fn open(store: S) -> StoreResult<Self> {
        let bytes = store.read()?;
        let digest = digest(&bytes);
        let text = String::from_utf8(bytes).map_err(|_| StoreError::Encoding(store.location().into()))?;
        let graph = ProjectGraph::parse(&text)?;
        tracing::debug!(
            document = %store.location(),
            objects = graph.len(),
            %digest,
            "opened project"
        );
        Ok(Self { store, graph, digest })
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Digest of the document as last read or written.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Current graph serialized the way it would be written.
    pub fn render(&self) -> String {
        self.render_graph(&self.graph)
    }

    fn render_graph(&self, graph: &ProjectGraph) -> String {
        to_pbxproj(graph, self.store.project_name().as_deref())
    }

    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        dangling_references(&self.graph)
    }

    /// Compute the edit without writing anything.
    ///
    /// Returns the outcome and the document text that `add_target` would
    /// write (the current text when the target already exists).
    pub fn preview_add(
        &self,
        spec: &TargetSpec,
        cfg: &ComposerConfig,
        ids: &mut IdGenerator,
    ) -> StoreResult<(AddOutcome, String)> {
        let composer = Composer::new(cfg.clone())?;
        let mut next = self.graph.clone();
        let outcome = composer.add_target(&mut next, spec, ids)?;
        let text = self.render_graph(&next);
        Ok((outcome, text))
    }

    /// Add a target and persist the result.
    pub fn add_target(
        &mut self,
        spec: &TargetSpec,
        cfg: &ComposerConfig,
        ids: &mut IdGenerator,
        confirm: &mut impl Confirm,
    ) -> StoreResult<Report> {
        let composer = Composer::new(cfg.clone())?;
        let location = self.store.location();

        let assembly = match composer.plan(&self.graph, spec, ids)? {
            Plan::AlreadyExists { name, target } => {
                return Ok(Report {
                    result: AddOutcome::AlreadyExists { name, target },
                    document: location,
                    digest_before: self.digest.clone(),
                    digest_after: self.digest.clone(),
                    written: false,
                    backup: None,
                });
            }
            Plan::Assemble(assembly) => assembly,
        };

        assembly.check(&self.graph)?;

        let preview = Preview {
            location: &location,
            created: &assembly.created,
            patches: &assembly.patches,
        };
        if !confirm.confirm(&preview) {
            tracing::info!(name = %spec.name, "declined by operator");
            return Err(StoreError::Declined);
        }

        let mut next = self.graph.clone();
        let created = assembly.commit(&mut next)?;
        let text = self.render_graph(&next);
        // The replacement must read back as the graph it was rendered from.
        if ProjectGraph::parse(&text)? != next {
            return Err(GraftError::malformed("rendered document", "does not read back as the edited graph").into());
        }
        self.store.replace(text.as_bytes())?;

        let digest_before = std::mem::replace(&mut self.digest, digest(text.as_bytes()));
        self.graph = next;

        Ok(Report {
            result: AddOutcome::Created(created),
            document: location,
            digest_before,
            digest_after: self.digest.clone(),
            written: true,
            backup: self.store.last_backup().map(|p| p.display().to_string()),
        })
    }
}
