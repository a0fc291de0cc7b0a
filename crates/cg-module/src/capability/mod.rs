//! Static capability declaration for a module.
//!
//! A module declares, at build time, which project types it can generate and
//! which client/server library versions it ships for each. The registry is
//! read-only once built and backs both the `info` report and the `create`
//! validation step.

use std::collections::BTreeMap;

use crate::error::DescriptorError;
use crate::protocol::{LibraryVersions, ProjectType};
use crate::version::Version;

/// Mapping from project type to its supported library versions.
///
/// Every present project type has at least one version; versions are kept
/// sorted ascending and de-duplicated.
///
/// # Example
///
/// ```
/// use cg_module::{Capabilities, ProjectType, Version};
///
/// let capabilities = Capabilities::builder()
///     .server([Version::new(0, 2, 0), Version::new(0, 1, 0)])
///     .build()
///     .expect("server versions are non-empty");
///
/// assert_eq!(capabilities.supported_project_types(), vec![ProjectType::Server]);
/// assert_eq!(capabilities.latest(ProjectType::Server), Some(Version::new(0, 2, 0)));
/// assert!(capabilities.versions_for(ProjectType::Client).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    entries: BTreeMap<ProjectType, Vec<Version>>,
}

impl Capabilities {
    /// Starts a capability declaration.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::default()
    }

    /// Returns the declared versions for `project_type`, or `None` when the
    /// project type is unsupported.
    #[must_use]
    pub fn versions_for(&self, project_type: ProjectType) -> Option<&[Version]> {
        self.entries.get(&project_type).map(Vec::as_slice)
    }

    /// Returns `true` when `project_type` is declared.
    #[must_use]
    pub fn supports(&self, project_type: ProjectType) -> bool {
        self.entries.contains_key(&project_type)
    }

    /// Returns the newest declared version for `project_type`.
    #[must_use]
    pub fn latest(&self, project_type: ProjectType) -> Option<Version> {
        self.versions_for(project_type)
            .and_then(|versions| versions.last().copied())
    }

    /// Returns the declared project types in client-then-server order.
    #[must_use]
    pub fn supported_project_types(&self) -> Vec<ProjectType> {
        self.entries.keys().copied().collect()
    }

    /// Projects the registry into the fixed client/server report slots.
    #[must_use]
    pub fn library_versions(&self) -> LibraryVersions {
        let slot = |project_type| self.versions_for(project_type).map(<[Version]>::to_vec);
        LibraryVersions::new(slot(ProjectType::Client), slot(ProjectType::Server))
    }
}

/// Builder for [`Capabilities`].
///
/// Declaring the same project type twice replaces the earlier declaration.
#[derive(Debug, Clone, Default)]
pub struct CapabilitiesBuilder {
    entries: BTreeMap<ProjectType, Vec<Version>>,
}

impl CapabilitiesBuilder {
    /// Declares client library versions.
    #[must_use]
    pub fn client(self, versions: impl IntoIterator<Item = Version>) -> Self {
        self.project_type(ProjectType::Client, versions)
    }

    /// Declares server library versions.
    #[must_use]
    pub fn server(self, versions: impl IntoIterator<Item = Version>) -> Self {
        self.project_type(ProjectType::Server, versions)
    }

    /// Declares library versions for an arbitrary project type.
    #[must_use]
    pub fn project_type(
        mut self,
        project_type: ProjectType,
        versions: impl IntoIterator<Item = Version>,
    ) -> Self {
        self.entries
            .insert(project_type, versions.into_iter().collect());
        self
    }

    /// Validates and freezes the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::EmptyVersionSet`] if a declared project
    /// type has no versions.
    pub fn build(self) -> Result<Capabilities, DescriptorError> {
        let mut entries = BTreeMap::new();
        for (project_type, mut versions) in self.entries {
            if versions.is_empty() {
                return Err(DescriptorError::EmptyVersionSet { project_type });
            }
            versions.sort_unstable();
            versions.dedup();
            entries.insert(project_type, versions);
        }
        Ok(Capabilities { entries })
    }
}

/// Identity and capabilities of a module.
///
/// # Example
///
/// ```
/// use cg_module::{Capabilities, ModuleDescriptor, Version};
///
/// let capabilities = Capabilities::builder()
///     .client([Version::new(0, 9, 0)])
///     .build()
///     .expect("valid capabilities");
/// let descriptor = ModuleDescriptor::new("go", "Go", Version::new(0, 3, 1), capabilities)
///     .expect("valid descriptor");
/// assert_eq!(descriptor.name(), "go");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: String,
    display_name: String,
    version: Version,
    capabilities: Capabilities,
}

impl ModuleDescriptor {
    /// Creates a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::EmptyName`] if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        version: Version,
        capabilities: Capabilities,
    ) -> Result<Self, DescriptorError> {
        let module_name = name.into();
        if module_name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        Ok(Self {
            name: module_name,
            display_name: display_name.into(),
            version,
            capabilities,
        })
    }

    /// Returns the module name, typically the target language identifier.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the human-facing module name.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the module's own version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the capability registry.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}
