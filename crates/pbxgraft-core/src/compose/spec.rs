//! The caller-facing description of a target to add.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GraftError, GraftResult};

/// Kind of product a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProductType {
    #[default]
    AppExtension,
    Application,
    Framework,
    StaticLibrary,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        Self::AppExtension,
        Self::Application,
        Self::Framework,
        Self::StaticLibrary,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::AppExtension => "app-extension",
            Self::Application => "application",
            Self::Framework => "framework",
            Self::StaticLibrary => "static-library",
        }
    }

    /// The `productType` value written on the target.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::AppExtension => "com.apple.product-type.app-extension",
            Self::Application => "com.apple.product-type.application",
            Self::Framework => "com.apple.product-type.framework",
            Self::StaticLibrary => "com.apple.product-type.library.static",
        }
    }

    /// The `explicitFileType` of the product reference.
    pub fn explicit_file_type(&self) -> &'static str {
        match self {
            Self::AppExtension => "wrapper.app-extension",
            Self::Application => "wrapper.application",
            Self::Framework => "wrapper.framework",
            Self::StaticLibrary => "archive.ar",
        }
    }

    pub fn product_file_name(&self, target_name: &str) -> String {
        match self {
            Self::AppExtension => format!("{target_name}.appex"),
            Self::Application => format!("{target_name}.app"),
            Self::Framework => format!("{target_name}.framework"),
            Self::StaticLibrary => format!("lib{target_name}.a"),
        }
    }

    /// Products that are installed inside another product, not on their own.
    pub fn skips_install(&self) -> bool {
        !matches!(self, Self::Application)
    }

    pub fn is_embeddable_extension(&self) -> bool {
        matches!(self, Self::AppExtension)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ProductType {
    type Err = GraftError;

    fn from_str(s: &str) -> GraftResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.short_name() == s || p.identifier() == s)
            .ok_or_else(|| {
                GraftError::invalid_argument(format!(
                    "unknown product type {s:?} (expected one of: app-extension, application, framework, static-library)"
                ))
            })
    }
}

impl TryFrom<String> for ProductType {
    type Error = GraftError;

    fn try_from(s: String) -> GraftResult<Self> {
        s.parse()
    }
}

impl From<ProductType> for String {
    fn from(p: ProductType) -> Self {
        p.short_name().to_string()
    }
}

/// Everything needed to add one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    pub name: String,
    #[serde(default)]
    pub product_type: ProductType,
    pub bundle_id: String,
    /// Source files, compiled in this order.
    #[serde(default)]
    pub sources: Vec<String>,
    pub entitlements: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_plist: Option<String>,
    /// System frameworks to link, e.g. `ReplayKit.framework`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    /// Existing target that should embed this extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_target: Option<String>,
    /// Extra build settings applied to both configurations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl TargetSpec {
    pub fn new(
        name: impl Into<String>,
        product_type: ProductType,
        bundle_id: impl Into<String>,
        sources: impl IntoIterator<Item = impl Into<String>>,
        entitlements: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            product_type,
            bundle_id: bundle_id.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            entitlements: entitlements.into(),
            info_plist: None,
            frameworks: Vec::new(),
            host_target: None,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_info_plist(mut self, path: impl Into<String>) -> Self {
        self.info_plist = Some(path.into());
        self
    }

    pub fn with_framework(mut self, name: impl Into<String>) -> Self {
        self.frameworks.push(name.into());
        self
    }

    pub fn with_host_target(mut self, name: impl Into<String>) -> Self {
        self.host_target = Some(name.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Parse a spec from JSON.
    pub fn from_json(text: &str) -> GraftResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| GraftError::invalid_argument(format!("invalid target spec: {e}")))
    }

    /// Reject unusable input before any identifier is allocated.
    pub fn validate(&self) -> GraftResult<()> {
        if self.name.trim().is_empty() || self.name.trim() != self.name {
            return Err(GraftError::invalid_argument(
                "target name must be non-empty without surrounding whitespace",
            ));
        }
        if self.name.contains(['/', '"', '\n']) {
            return Err(GraftError::invalid_argument(format!(
                "target name {:?} contains a forbidden character",
                self.name
            )));
        }
        if self.bundle_id.is_empty()
            || !self
                .bundle_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(GraftError::invalid_argument(format!(
                "bundle identifier {:?} must be non-empty and use only [A-Za-z0-9.-]",
                self.bundle_id
            )));
        }
        if self.entitlements.trim().is_empty() {
            return Err(GraftError::invalid_argument("entitlements path must not be empty"));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(GraftError::invalid_argument("source paths must not be empty"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for s in &self.sources {
            if !seen.insert(normalize_path(s)) {
                return Err(GraftError::invalid_argument(format!("duplicate source file {s:?}")));
            }
        }
        if self.host_target.is_some() && !self.product_type.is_embeddable_extension() {
            return Err(GraftError::invalid_argument(format!(
                "only app extensions can be embedded in a host target, not {}",
                self.product_type
            )));
        }
        if self.host_target.as_deref() == Some(self.name.as_str()) {
            return Err(GraftError::invalid_argument("a target cannot embed itself"));
        }
        Ok(())
    }
}

/// Lexically clean a project-relative path (`./a/../b.swift` -> `b.swift`).
pub fn normalize_path(path: &str) -> String {
    path_clean::clean(path).to_string_lossy().replace('\\', "/")
}

/// Last path component.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `lastKnownFileType` inferred from the extension.
pub fn last_known_file_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "swift" => "sourcecode.swift",
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "c" => "sourcecode.c.c",
        "cc" | "cpp" | "cxx" => "sourcecode.cpp.cpp",
        "h" => "sourcecode.c.h",
        "hpp" => "sourcecode.cpp.h",
        "metal" => "sourcecode.metal",
        "plist" => "text.plist.xml",
        "entitlements" => "text.plist.entitlements",
        "strings" => "text.plist.strings",
        "xcassets" => "folder.assetcatalog",
        "storyboard" => "file.storyboard",
        "xib" => "file.xib",
        "framework" => "wrapper.framework",
        "json" => "text.json",
        _ => "text",
    }
}
