//! Artifact discovery in a real checkout, selection, renaming and build subdirectories.

use anyhow::Result;
use std::collections::BTreeSet;
use std::fs;

use depforge::build::BuildTool;
use depforge::git::Git;
use depforge::installer::{ArtifactFilter, DependencyInstaller, DestinationKind, InstallOutcome};

use crate::common::{FileAssert, TestProject, list_names, stub_build};

#[tokio::test]
async fn test_find_artifacts_after_build_covers_every_module() -> Result<()> {
    let project = TestProject::new()?;
    let work = project.project_path().join("work");
    fs::create_dir_all(&work)?;
    let repo_dir = Git::new().clone(&project.source.file_url(), &work).await?;

    let tool = stub_build();
    tool.build(&repo_dir).await?;

    let found: BTreeSet<String> = tool
        .find_artifacts(&repo_dir)
        .map(|artifact| artifact.map(|a| a.file_name()))
        .collect::<Result<_>>()?;

    let expected: BTreeSet<String> =
        ["mylib-core-1.3.0.jar", "mylib-extra-1.3.0.jar", "mylib-util-1.3.0.jar"]
            .into_iter()
            .map(String::from)
            .collect();
    assert_eq!(found, expected);
    Ok(())
}

#[tokio::test]
async fn test_selected_artifact_installed_under_fixed_name_in_bin() -> Result<()> {
    let project = TestProject::new()?;
    let bin = project.project_path().join(".bin");
    let spec = project
        .spec_in(&bin, "v1.2.3")
        .destination_kind(DestinationKind::Bin)
        .artifact_select(ArtifactFilter::Suffix("extra-1.2.3.jar".to_string()))
        .install_name("mylib-tool.jar");

    let outcome = DependencyInstaller::new(spec).install().await?;

    match outcome {
        InstallOutcome::Installed {
            artifacts,
            ..
        } => assert_eq!(artifacts, [bin.join("mylib-tool.jar")]),
        other => panic!("expected an install, got {other:?}"),
    }
    assert_eq!(list_names(&bin), ["mylib-tool.jar", "mylib.lock"]);
    FileAssert::equals(bin.join("mylib-tool.jar"), "extra 1.2.3\n");
    Ok(())
}

#[tokio::test]
async fn test_fixed_name_with_ambiguous_selection_fails_without_lock() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    let spec = project
        .spec("v1.2.3")
        .artifact_select(ArtifactFilter::Suffix(".jar".to_string()))
        .install_name("mylib.jar");

    let err = DependencyInstaller::new(spec).install().await.unwrap_err();

    assert!(format!("{err:#}").contains("Expected exactly one artifact"), "{err:#}");
    FileAssert::not_exists(vendor.join("mylib.lock"));
    FileAssert::not_exists(vendor.join("mylib.jar"));
    Ok(())
}

#[tokio::test]
async fn test_build_subdir_limits_build_and_discovery() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    let spec = project
        .spec("v1.2.3")
        .build_subdir("cli")
        .artifact_select(ArtifactFilter::Suffix("dependencies.jar".to_string()));

    let outcome = DependencyInstaller::new(spec).install().await?;

    assert!(matches!(outcome, InstallOutcome::Installed { ref artifacts, .. } if artifacts.len() == 1));
    assert_eq!(list_names(&vendor), ["mylib-cli-dependencies.jar", "mylib.lock"]);
    Ok(())
}

#[tokio::test]
async fn test_custom_output_convention() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    // Same build, but only `.txt` files in `dist/` count as artifacts: none exist.
    let tool =
        BuildTool::new("sh").args(["build.sh"]).output_dir_name("dist").artifact_suffix(".txt");
    let spec = project.spec("v1.2.3").build_tool(tool);

    let outcome = DependencyInstaller::new(spec).install().await?;

    assert!(matches!(outcome, InstallOutcome::Installed { ref artifacts, .. } if artifacts.is_empty()));
    assert_eq!(list_names(&vendor), ["mylib.lock"]);
    Ok(())
}
