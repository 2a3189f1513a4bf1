//! Built-in dependency presets.
//!
//! A preset fills every field of a [`DependencyConfig`] except what the user
//! sets explicitly, so a two-line table is enough for the common cases:
//!
//! ```toml
//! [dependencies.fgputil]
//! preset = "fgputil"
//! version = "v1.2.3"
//! ```

use std::path::PathBuf;

use super::DependencyConfig;
use crate::installer::DestinationKind;

/// Name of the FgpUtil vendor-library preset.
pub const FGPUTIL: &str = "fgputil";

/// Name of the RAML for JAX-RS code-generator preset.
pub const RAML_FOR_JAXRS: &str = "raml-for-jaxrs";

/// All preset names, for error messages.
pub const PRESET_NAMES: [&str; 2] = [FGPUTIL, RAML_FOR_JAXRS];

/// Looks up a preset by name.
#[must_use]
pub fn preset(name: &str) -> Option<DependencyConfig> {
    match name {
        FGPUTIL => Some(DependencyConfig::fgputil()),
        RAML_FOR_JAXRS => Some(DependencyConfig::raml_for_jaxrs()),
        _ => None,
    }
}

impl DependencyConfig {
    /// FgpUtil runtime library jars.
    ///
    /// Full clone of the default branch, then a checkout of the target.
    /// Installed jars all start with `fgputil`.
    #[must_use]
    pub fn fgputil() -> Self {
        Self {
            name: Some("FgpUtil".to_string()),
            url: Some("https://github.com/VEuPathDB/FgpUtil.git".to_string()),
            version: Some("master".to_string()),
            destination: Some(DestinationKind::Vendor),
            artifact_prefix: Some(FGPUTIL.to_string()),
            shallow: Some(false),
            clone_at_branch: Some(false),
            ..Self::default()
        }
    }

    /// The `raml-to-jaxrs` command line generator.
    ///
    /// Shallow clone directly at the target tag, built in the CLI module, and
    /// installed as a single `raml-to-jaxrs.jar` in the bin directory. Tagged
    /// releases still reference `-SNAPSHOT` module versions, so poms are
    /// patched to the target version first.
    #[must_use]
    pub fn raml_for_jaxrs() -> Self {
        Self {
            name: Some("Raml for JAX-RS".to_string()),
            url: Some("https://github.com/mulesoft-labs/raml-for-jax-rs.git".to_string()),
            version: Some("3.0.7".to_string()),
            destination: Some(DestinationKind::Bin),
            artifact_prefix: Some("raml-to-jaxrs".to_string()),
            build_subdir: Some(PathBuf::from("raml-to-jaxrs/raml-to-jaxrs-cli")),
            shallow: Some(true),
            clone_at_branch: Some(true),
            artifact_select: Some("dependencies.jar".to_string()),
            install_name: Some("raml-to-jaxrs.jar".to_string()),
            patch_pom_versions: Some(true),
            ..Self::default()
        }
    }
}
