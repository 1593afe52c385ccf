//! Follow-up steps that cannot be expressed in the project descriptor.

use pbxgraft_core::compose::{CreatedTarget, ProductType, TargetSpec};

pub fn after_created(spec: &TargetSpec, created: &CreatedTarget) -> Vec<String> {
    let mut steps = Vec::new();
    let host = created.embedded_in.as_deref();

    if spec.product_type.is_embeddable_extension() {
        let host_label = host.unwrap_or("the host app");
        steps.push(format!(
            "Enable the App Groups capability on both {host_label} and {} and add the same group to both entitlements files ({}).",
            spec.name, spec.entitlements
        ));
        if host.is_none() {
            steps.push(format!(
                "Embed {} in the host app (Build Phases > Embed Foundation Extensions), or rerun with --host-target <name>.",
                spec.product_type.product_file_name(&spec.name)
            ));
        }
    }
    if spec.product_type == ProductType::Framework && host.is_none() {
        steps.push(format!(
            "Link and embed {} in the targets that use it.",
            spec.product_type.product_file_name(&spec.name)
        ));
    }
    steps.push(format!(
        "Open the project in Xcode and select a signing team for {} (Signing & Capabilities).",
        spec.name
    ));
    steps
}

pub fn after_existing(name: &str) -> Vec<String> {
    vec![format!(
        "Target {name} is already in the project, nothing was changed. Remove it in Xcode first to recreate it."
    )]
}
