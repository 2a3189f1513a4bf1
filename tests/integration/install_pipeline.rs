//! Lock-driven install, update, failure recovery and uninstall.

use anyhow::Result;
use std::fs;

use depforge::build::BuildTool;
use depforge::core::DepforgeError;
use depforge::git::Git;
use depforge::installer::InstallOutcome;

use crate::common::{FileAssert, TestProject, list_names, snapshot};

const JARS_1_2_3: [&str; 3] =
    ["mylib-core-1.2.3.jar", "mylib-extra-1.2.3.jar", "mylib-util-1.2.3.jar"];

fn expected_listing(jars: [&str; 3]) -> Vec<String> {
    let mut names: Vec<String> = jars.iter().map(|s| s.to_string()).collect();
    names.push("mylib.lock".to_string());
    names.sort();
    names
}

#[tokio::test]
async fn test_fresh_install_moves_every_artifact_and_writes_lock() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();

    let outcome = project.installer("v1.2.3").install().await?;

    match outcome {
        InstallOutcome::Installed {
            version,
            previous,
            artifacts,
        } => {
            assert_eq!(version, "v1.2.3");
            assert_eq!(previous, None);
            assert_eq!(artifacts.len(), 3);
            for artifact in &artifacts {
                assert!(artifact.starts_with(&vendor));
                FileAssert::exists(artifact);
            }
        }
        other => panic!("expected a fresh install, got {other:?}"),
    }

    // Only artifacts and the lock file remain; the working clone is gone.
    assert_eq!(list_names(&vendor), expected_listing(JARS_1_2_3));
    FileAssert::equals(vendor.join("mylib.lock"), "v1.2.3");
    FileAssert::equals(vendor.join("mylib-core-1.2.3.jar"), "core 1.2.3\n");
    FileAssert::equals(vendor.join("mylib-extra-1.2.3.jar"), "extra 1.2.3\n");
    Ok(())
}

#[tokio::test]
async fn test_second_run_with_same_version_has_no_side_effects() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    project.installer("v1.2.3").install().await?;

    let before = snapshot(&vendor);
    let lock_modified = fs::metadata(vendor.join("mylib.lock"))?.modified()?;

    // Neither git nor the build can run: any spawn would fail the install.
    let outcome = project
        .installer("v1.2.3")
        .with_git(Git::with_program("depforge-test-missing-git"))
        .with_build_tool(BuildTool::new("depforge-test-missing-build"))
        .install()
        .await?;

    assert_eq!(
        outcome,
        InstallOutcome::UpToDate {
            version: "v1.2.3".to_string()
        }
    );
    assert_eq!(snapshot(&vendor), before);
    assert_eq!(fs::metadata(vendor.join("mylib.lock"))?.modified()?, lock_modified);
    Ok(())
}

#[tokio::test]
async fn test_version_change_reinstalls_and_replaces_artifacts() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    project.installer("v1.2.3").install().await?;

    let outcome = project.installer("v1.3.0").install().await?;

    match outcome {
        InstallOutcome::Installed {
            version,
            previous,
            artifacts,
        } => {
            assert_eq!(version, "v1.3.0");
            assert_eq!(previous.as_deref(), Some("v1.2.3"));
            assert_eq!(artifacts.len(), 3);
        }
        other => panic!("expected an update, got {other:?}"),
    }
    assert_eq!(
        list_names(&vendor),
        expected_listing(["mylib-core-1.3.0.jar", "mylib-extra-1.3.0.jar", "mylib-util-1.3.0.jar"])
    );
    FileAssert::equals(vendor.join("mylib.lock"), "v1.3.0");
    Ok(())
}

#[tokio::test]
async fn test_failed_build_keeps_previous_lock_and_installs_nothing() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    project.installer("v1.2.3").install().await?;

    let err = project
        .installer("v2.0.0-broken")
        .install()
        .await
        .expect_err("broken build must fail the install");

    let exit = err.chain().find_map(|e| e.downcast_ref::<DepforgeError>());
    match exit {
        Some(DepforgeError::NonZeroExit {
            code,
            stderr,
            ..
        }) => {
            assert_eq!(*code, 2);
            assert_eq!(
                stderr.as_deref(),
                Some("compilation failed: module mylib-core does not compile\n")
            );
        }
        other => panic!("expected a non-zero exit, got {other:?}"),
    }
    let rendered = format!("{err:#}");
    assert!(rendered.contains("Failed to install mylib"), "{rendered}");
    assert!(rendered.contains("compilation failed"), "{rendered}");

    FileAssert::equals(vendor.join("mylib.lock"), "v1.2.3");
    let jars: Vec<String> =
        list_names(&vendor).into_iter().filter(|name| name.ends_with(".jar")).collect();
    assert!(jars.is_empty(), "no artifacts expected after a failed build, found {jars:?}");

    let status = project.installer("v2.0.0-broken").status().await?;
    assert!(status.needs_install());
    assert_eq!(status.installed.as_deref(), Some("v1.2.3"));
    Ok(())
}

#[tokio::test]
async fn test_install_recovers_after_failed_build() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    project.installer("v1.2.3").install().await?;
    assert!(project.installer("v2.0.0-broken").install().await.is_err());

    // The failed run left its working clone behind.
    assert!(vendor.join("mylib").is_dir());

    let outcome = project.installer("v1.3.0").install().await?;

    assert!(matches!(
        outcome,
        InstallOutcome::Installed { ref previous, .. } if previous.as_deref() == Some("v1.2.3")
    ));
    assert_eq!(
        list_names(&vendor),
        expected_listing(["mylib-core-1.3.0.jar", "mylib-extra-1.3.0.jar", "mylib-util-1.3.0.jar"])
    );
    Ok(())
}

#[tokio::test]
async fn test_clean_leaves_unrelated_files_alone() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    fs::create_dir_all(&vendor)?;
    fs::write(vendor.join("otherlib-4.0.jar"), "other")?;
    fs::write(vendor.join("mylib-core-0.9.jar"), "stale")?;

    project.installer("v1.2.3").install().await?;

    FileAssert::equals(vendor.join("otherlib-4.0.jar"), "other");
    FileAssert::not_exists(vendor.join("mylib-core-0.9.jar"));
    FileAssert::exists(vendor.join("mylib-core-1.2.3.jar"));
    Ok(())
}

#[tokio::test]
async fn test_destination_that_is_a_file_fails_before_cloning() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    fs::write(&vendor, "not a directory")?;

    let err = project.installer("v1.2.3").install().await.unwrap_err();

    assert!(
        err.chain()
            .any(|e| matches!(e.downcast_ref::<DepforgeError>(), Some(DepforgeError::NotADirectory { .. }))),
        "{err:#}"
    );
    assert!(vendor.is_file());
    Ok(())
}

#[tokio::test]
async fn test_uninstall_removes_artifacts_and_lock_then_reinstall_works() -> Result<()> {
    let project = TestProject::new()?;
    let vendor = project.vendor_dir();
    project.installer("v1.2.3").install().await?;
    fs::write(vendor.join("otherlib-4.0.jar"), "other")?;

    let removed = project.installer("v1.2.3").uninstall().await?;

    assert_eq!(removed.len(), 4);
    assert_eq!(list_names(&vendor), ["otherlib-4.0.jar"]);

    let status = project.installer("v1.2.3").status().await?;
    assert_eq!(status.installed, None);
    assert_eq!(status.describe(), "not installed");

    let outcome = project.installer("v1.2.3").install().await?;
    assert!(matches!(outcome, InstallOutcome::Installed { previous: None, .. }));
    FileAssert::equals(vendor.join("mylib.lock"), "v1.2.3");
    Ok(())
}
