//! Target composition.
//!
//! Adding a target is split into explicit steps so callers can stop between
//! any two of them:
//!
//! 1. idempotency guard: a target with the same name means `AlreadyExists`
//! 2. identifier allocation, one per new node
//! 3. assembly of node records and their cross references (`Assembly`)
//! 4. consistency check against the existing graph (`Assembly::check`)
//! 5. commit into the in-memory graph (`Assembly::commit`)
//!
//! Persisting the graph is the store crate's job. Nothing here touches disk.

use serde::Serialize;

use crate::config::{validate_config, ComposerConfig};
use crate::errors::{GraftError, GraftResult};
use crate::ident::IdGenerator;
use crate::model::{NodeKind, Object, ObjectId, ProjectGraph};
use crate::plist::{Dict, Value};

pub mod assembly;
pub mod spec;

pub use assembly::{Assembly, CreatedTarget, Patch};
pub use spec::{ProductType, TargetSpec};

use spec::{file_name, last_known_file_type, normalize_path};

const BUILD_ACTION_MASK: &str = "2147483647";
/// `dstSubfolderSpec` for the PlugIns folder, where app extensions live.
const DST_PLUGINS: &str = "13";
/// `dstSubfolderSpec` for the Frameworks folder.
const DST_FRAMEWORKS: &str = "10";
pub const EMBED_PHASE_NAME: &str = "Embed Foundation Extensions";

/// Result of `add_target` that is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    Created(CreatedTarget),
    AlreadyExists { name: String, target: ObjectId },
}

impl AddOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// What `Composer::plan` decided to do.
#[derive(Debug, Clone)]
pub enum Plan {
    AlreadyExists { name: String, target: ObjectId },
    Assemble(Assembly),
}

/// Builds and inserts targets according to a `ComposerConfig`.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposerConfig,
}

/// Identifiers for one source or framework: its file reference and the
/// build file placing it in a phase.
struct Member {
    file_ref: ObjectId,
    build_file: ObjectId,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> GraftResult<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    /// Run all steps against an in-memory graph.
    ///
    /// On error the graph is exactly as it was.
    pub fn add_target(
        &self,
        graph: &mut ProjectGraph,
        spec: &TargetSpec,
        ids: &mut IdGenerator,
    ) -> GraftResult<AddOutcome> {
        match self.plan(graph, spec, ids)? {
            Plan::AlreadyExists { name, target } => Ok(AddOutcome::AlreadyExists { name, target }),
            Plan::Assemble(assembly) => assembly.commit(graph).map(AddOutcome::Created),
        }
    }

    /// Steps 1-3: guard, allocate, assemble. The graph is only read.
    pub fn plan(&self, graph: &ProjectGraph, spec: &TargetSpec, ids: &mut IdGenerator) -> GraftResult<Plan> {
        spec.validate()?;

        if let Some((id, _)) = graph.find_target(&spec.name) {
            tracing::info!(name = %spec.name, target_id = %id, "target already exists, nothing to do");
            return Ok(Plan::AlreadyExists {
                name: spec.name.clone(),
                target: id.clone(),
            });
        }

        let host = match &spec.host_target {
            Some(host_name) => {
                let (host_id, host) = graph
                    .find_target(host_name)
                    .ok_or_else(|| GraftError::HostTargetMissing(host_name.clone()))?;
                if graph.project().is_none() {
                    return Err(GraftError::invalid_argument(
                        "embedding in a host target requires a root PBXProject",
                    ));
                }
                Some((host_id.clone(), host))
            }
            None => None,
        };

        // Fail-safe: the generator must know every key of this graph.
        ids.reserve(graph.ids().cloned());

        let target_id = ids.next_id()?;
        let product_id = ids.next_id()?;
        let list_id = ids.next_id()?;
        let debug_id = ids.next_id()?;
        let release_id = ids.next_id()?;
        let sources_phase = ids.next_id()?;
        let frameworks_phase = ids.next_id()?;
        let copy_phase = ids.next_id()?;
        let sources = self.members(spec.sources.len(), ids)?;
        let frameworks = self.members(spec.frameworks.len(), ids)?;
        let entitlements_id = ids.next_id()?;
        let info_plist_id = spec.info_plist.as_ref().map(|_| ids.next_id()).transpose()?;

        let mut nodes = std::collections::BTreeMap::new();
        let mut patches = Vec::new();

        // File references, in caller order.
        for (path, m) in spec.sources.iter().zip(&sources) {
            nodes.insert(m.file_ref.clone(), file_reference(path, None));
            nodes.insert(
                m.build_file.clone(),
                Object::new(NodeKind::BuildFile).with("fileRef", &m.file_ref),
            );
        }
        for (name, m) in spec.frameworks.iter().zip(&frameworks) {
            nodes.insert(m.file_ref.clone(), framework_reference(name));
            nodes.insert(
                m.build_file.clone(),
                Object::new(NodeKind::BuildFile).with("fileRef", &m.file_ref),
            );
        }
        nodes.insert(
            entitlements_id.clone(),
            file_reference(&spec.entitlements, Some("text.plist.entitlements")),
        );
        if let (Some(id), Some(path)) = (&info_plist_id, &spec.info_plist) {
            nodes.insert(id.clone(), file_reference(path, Some("text.plist.xml")));
        }

        nodes.insert(
            product_id.clone(),
            Object::new(NodeKind::FileReference)
                .with("explicitFileType", spec.product_type.explicit_file_type())
                .with("includeInIndex", "0")
                .with("path", spec.product_type.product_file_name(&spec.name))
                .with("sourceTree", "BUILT_PRODUCTS_DIR"),
        );

        // Phases in canonical order: sources, frameworks, copy-files.
        nodes.insert(
            sources_phase.clone(),
            build_phase(NodeKind::SourcesBuildPhase, sources.iter().map(|m| &m.build_file)),
        );
        nodes.insert(
            frameworks_phase.clone(),
            build_phase(NodeKind::FrameworksBuildPhase, frameworks.iter().map(|m| &m.build_file)),
        );
        nodes.insert(
            copy_phase.clone(),
            build_phase(NodeKind::CopyFilesBuildPhase, std::iter::empty())
                .with("dstPath", "")
                .with("dstSubfolderSpec", DST_FRAMEWORKS)
                .with("name", "Embed Frameworks"),
        );
        let phases = vec![sources_phase, frameworks_phase, copy_phase];

        let cfg = &self.config;
        nodes.insert(
            debug_id.clone(),
            Object::new(NodeKind::BuildConfiguration)
                .with("buildSettings", self.build_settings(spec, true))
                .with("name", cfg.debug_name.as_str()),
        );
        nodes.insert(
            release_id.clone(),
            Object::new(NodeKind::BuildConfiguration)
                .with("buildSettings", self.build_settings(spec, false))
                .with("name", cfg.release_name.as_str()),
        );
        let configurations = vec![debug_id, release_id];
        nodes.insert(
            list_id.clone(),
            Object::new(NodeKind::ConfigurationList)
                .with_refs("buildConfigurations", &configurations)
                .with("defaultConfigurationIsVisible", "0")
                .with("defaultConfigurationName", cfg.default_configuration.as_str()),
        );

        nodes.insert(
            target_id.clone(),
            Object::new(NodeKind::NativeTarget)
                .with("buildConfigurationList", &list_id)
                .with_refs("buildPhases", &phases)
                .with("buildRules", Value::empty_array())
                .with("dependencies", Value::empty_array())
                .with("name", spec.name.as_str())
                .with("productName", spec.name.as_str())
                .with("productReference", &product_id)
                .with("productType", spec.product_type.identifier()),
        );

        // Attach to the project when there is one.
        let mut group_id = None;
        if let Some((project_id, project)) = graph.project() {
            patches.push(Patch {
                node: project_id.clone(),
                field: "targets".to_string(),
                append: target_id.clone(),
            });

            if let Some(main_group) = project.ref_field("mainGroup") {
                let id = ids.next_id()?;
                let children: Vec<ObjectId> = sources
                    .iter()
                    .map(|m| m.file_ref.clone())
                    .chain(std::iter::once(entitlements_id.clone()))
                    .chain(info_plist_id.clone())
                    .chain(frameworks.iter().map(|m| m.file_ref.clone()))
                    .collect();
                nodes.insert(
                    id.clone(),
                    Object::new(NodeKind::Group)
                        .with_refs("children", &children)
                        .with("name", spec.name.as_str())
                        .with("sourceTree", "<group>"),
                );
                patches.push(Patch {
                    node: main_group,
                    field: "children".to_string(),
                    append: id.clone(),
                });
                group_id = Some(id);
            }

            if let Some(products) = project.ref_field("productRefGroup") {
                patches.push(Patch {
                    node: products,
                    field: "children".to_string(),
                    append: product_id.clone(),
                });
            }

            if let Some((host_id, host)) = &host {
                self.embed(graph, project_id, host_id, host, spec, &target_id, &product_id, ids, &mut nodes, &mut patches)?;
            }
        }

        let created = CreatedTarget {
            name: spec.name.clone(),
            target: target_id,
            product: product_id,
            configuration_list: list_id,
            configurations,
            build_phases: phases,
            source_files: sources.iter().map(|m| m.file_ref.clone()).collect(),
            entitlements: entitlements_id,
            info_plist: info_plist_id,
            group: group_id,
            embedded_in: spec.host_target.clone(),
            node_count: nodes.len(),
        };

        tracing::debug!(
            name = %spec.name,
            nodes = nodes.len(),
            patches = patches.len(),
            "assembled target"
        );

        Ok(Plan::Assemble(Assembly {
            nodes,
            patches,
            created,
        }))
    }

    fn members(&self, count: usize, ids: &mut IdGenerator) -> GraftResult<Vec<Member>> {
        (0..count)
            .map(|_| {
                Ok(Member {
                    file_ref: ids.next_id()?,
                    build_file: ids.next_id()?,
                })
            })
            .collect()
    }

    /// Dependency + embed copy phase on the host so the extension ships
    /// inside it.
    #[allow(clippy::too_many_arguments)]
    fn embed(
        &self,
        graph: &ProjectGraph,
        project_id: &ObjectId,
        host_id: &ObjectId,
        host: &Object,
        spec: &TargetSpec,
        target_id: &ObjectId,
        product_id: &ObjectId,
        ids: &mut IdGenerator,
        nodes: &mut std::collections::BTreeMap<ObjectId, Object>,
        patches: &mut Vec<Patch>,
    ) -> GraftResult<()> {
        let proxy_id = ids.next_id()?;
        let dependency_id = ids.next_id()?;
        let embed_file_id = ids.next_id()?;

        nodes.insert(
            proxy_id.clone(),
            Object::new(NodeKind::ContainerItemProxy)
                .with("containerPortal", project_id)
                .with("proxyType", "1")
                .with("remoteGlobalIDString", target_id)
                .with("remoteInfo", spec.name.as_str()),
        );
        nodes.insert(
            dependency_id.clone(),
            Object::new(NodeKind::TargetDependency)
                .with("target", target_id)
                .with("targetProxy", &proxy_id),
        );
        patches.push(Patch {
            node: host_id.clone(),
            field: "dependencies".to_string(),
            append: dependency_id,
        });

        let mut settings = Dict::new();
        settings.insert(
            "ATTRIBUTES".to_string(),
            Value::Array(vec![Value::string("RemoveHeadersOnCopy")]),
        );
        nodes.insert(
            embed_file_id.clone(),
            Object::new(NodeKind::BuildFile)
                .with("fileRef", product_id)
                .with("settings", settings),
        );

        let existing = host.ref_list("buildPhases").into_iter().find(|p| {
            graph.get(p).is_some_and(|o| {
                o.kind() == NodeKind::CopyFilesBuildPhase && o.get_str("dstSubfolderSpec") == Some(DST_PLUGINS)
            })
        });
        match existing {
            Some(phase) => patches.push(Patch {
                node: phase,
                field: "files".to_string(),
                append: embed_file_id,
            }),
            None => {
                let phase = ids.next_id()?;
                nodes.insert(
                    phase.clone(),
                    build_phase(NodeKind::CopyFilesBuildPhase, std::iter::once(&embed_file_id))
                        .with("dstPath", "")
                        .with("dstSubfolderSpec", DST_PLUGINS)
                        .with("name", EMBED_PHASE_NAME),
                );
                patches.push(Patch {
                    node: host_id.clone(),
                    field: "buildPhases".to_string(),
                    append: phase,
                });
            }
        }
        Ok(())
    }

    fn build_settings(&self, spec: &TargetSpec, debug: bool) -> Dict {
        let cfg = &self.config;
        let mut s = Dict::new();
        let mut set = |k: &str, v: Value| {
            s.insert(k.to_string(), v);
        };

        set("CODE_SIGN_ENTITLEMENTS", Value::string(normalize_path(&spec.entitlements)));
        set("CODE_SIGN_STYLE", "Automatic".into());
        set("CURRENT_PROJECT_VERSION", "1".into());
        set("MARKETING_VERSION", "1.0".into());
        set("IPHONEOS_DEPLOYMENT_TARGET", cfg.deployment_target.as_str().into());
        set("PRODUCT_BUNDLE_IDENTIFIER", spec.bundle_id.as_str().into());
        set("PRODUCT_NAME", "$(TARGET_NAME)".into());
        set("SDKROOT", "iphoneos".into());
        set("SWIFT_VERSION", cfg.swift_version.as_str().into());
        set("TARGETED_DEVICE_FAMILY", cfg.device_family.as_str().into());

        let mut runpath = vec![Value::string("$(inherited)"), Value::string("@executable_path/Frameworks")];
        if spec.product_type.is_embeddable_extension() {
            runpath.push(Value::string("@executable_path/../../Frameworks"));
            set("APPLICATION_EXTENSION_API_ONLY", "YES".into());
        }
        set("LD_RUNPATH_SEARCH_PATHS", Value::Array(runpath));

        if spec.product_type.skips_install() {
            set("SKIP_INSTALL", "YES".into());
        }

        match &spec.info_plist {
            Some(path) => set("INFOPLIST_FILE", Value::string(normalize_path(path))),
            None => set("GENERATE_INFOPLIST_FILE", "YES".into()),
        }

        if debug {
            set("DEBUG_INFORMATION_FORMAT", "dwarf".into());
            set("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG".into());
            set("SWIFT_OPTIMIZATION_LEVEL", "-Onone".into());
        } else {
            set("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym".into());
            set("SWIFT_COMPILATION_MODE", "wholemodule".into());
            set("SWIFT_OPTIMIZATION_LEVEL", "-O".into());
        }

        for (k, v) in &spec.settings {
            set(k, Value::string(v.clone()));
        }
        s
    }
}

fn build_phase<'a>(kind: NodeKind, files: impl IntoIterator<Item = &'a ObjectId>) -> Object {
    Object::new(kind)
        .with("buildActionMask", BUILD_ACTION_MASK)
        .with_refs("files", files)
        .with("runOnlyForDeploymentPostprocessing", "0")
}

fn file_reference(path: &str, file_type: Option<&'static str>) -> Object {
    let path = normalize_path(path);
    let file_type = file_type.unwrap_or_else(|| last_known_file_type(&path));
    let absolute = path.starts_with('/');
    let mut obj = Object::new(NodeKind::FileReference)
        .with("lastKnownFileType", file_type)
        .with("sourceTree", if absolute { "<absolute>" } else { "SOURCE_ROOT" });
    let name = file_name(&path).to_string();
    if name != path {
        obj = obj.with("name", name);
    }
    obj.with("path", path)
}

fn framework_reference(name: &str) -> Object {
    let name = if name.ends_with(".framework") {
        name.to_string()
    } else {
        format!("{name}.framework")
    };
    Object::new(NodeKind::FileReference)
        .with("lastKnownFileType", "wrapper.framework")
        .with("path", format!("System/Library/Frameworks/{name}"))
        .with("name", name)
        .with("sourceTree", "SDKROOT")
}

/// Add a target with default configuration and random identifiers.
///
/// Convenience for the common one-shot case; see `Composer` for control
/// over configuration and identifier generation.
pub fn add_target(
    graph: &mut ProjectGraph,
    target_name: &str,
    product_type: ProductType,
    bundle_id: &str,
    source_files: &[&str],
    entitlements_path: &str,
) -> GraftResult<AddOutcome> {
    let spec = TargetSpec::new(
        target_name,
        product_type,
        bundle_id,
        source_files.iter().copied(),
        entitlements_path,
    );
    let mut ids = IdGenerator::random();
    Composer::default().add_target(graph, &spec, &mut ids)
}
