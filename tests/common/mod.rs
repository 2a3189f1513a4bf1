//! Common test utilities and fixtures for depforge integration tests
//!
//! The main fixture is a local git repository named `mylib` whose `build.sh`
//! mimics a multi-module Maven build: it reads `VERSION` and writes one jar
//! into each of three `target/` directories at different depths. A `VERSION`
//! of `broken` makes the build print to stderr and exit with status 2.
//!
//! A second fixture, `pomlib`, is a Maven-shaped repository whose tagged
//! release still references `-SNAPSHOT` versions in its poms.

// Allow dead code because not every test module uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use depforge::build::BuildTool;
use depforge::installer::{DependencyInstaller, DependencySpec};

/// Build script committed into the fixture repository.
pub const BUILD_SCRIPT: &str = r#"#!/bin/sh
set -e
v=$(cat VERSION)
if [ "$v" = "broken" ]; then
    echo "compilation failed: module mylib-core does not compile" >&2
    exit 2
fi
mkdir -p target module-a/target module-b/nested/target
echo "core $v" > "target/mylib-core-$v.jar"
echo "util $v" > "module-a/target/mylib-util-$v.jar"
echo "extra $v" > "module-b/nested/target/mylib-extra-$v.jar"
echo "built mylib $v"
"#;

/// Build script of the `cli` subproject: one jar, independent of `VERSION`.
pub const CLI_BUILD_SCRIPT: &str = r#"#!/bin/sh
mkdir -p target
echo "cli" > target/mylib-cli-dependencies.jar
echo "cli" > target/mylib-cli.jar
"#;

/// Build script of the `pomlib` fixture: fails while the reactor poms still
/// hold a snapshot version, then packages every pom into one jar so the
/// installed artifact shows what the build saw.
pub const POM_BUILD_SCRIPT: &str = r#"#!/bin/sh
if grep -q SNAPSHOT pom.xml module/pom.xml; then
    echo "Could not resolve dependencies: pomlib-module:1.0.0-SNAPSHOT" >&2
    exit 1
fi
mkdir -p target
cat pom.xml module/pom.xml src/pom.xml .hidden/pom.xml > target/pomlib-poms.jar
"#;

/// Git command builder for tests
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    /// Create a new TestGit instance for the given repository path
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Runs git with `args` in the repository, failing on a non-zero exit.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Initialize a new git repository whose default branch is `main`
    pub fn init(&self) -> Result<()> {
        self.run(&["init", "--quiet"])?;
        self.run(&["symbolic-ref", "HEAD", "refs/heads/main"])?;
        Ok(())
    }

    /// Configure git user for tests
    pub fn config_user(&self) -> Result<()> {
        self.run(&["config", "user.email", "test@depforge.example"])?;
        self.run(&["config", "user.name", "Test User"])?;
        self.run(&["config", "commit.gpgsign", "false"])?;
        self.run(&["config", "tag.gpgsign", "false"])?;
        Ok(())
    }

    /// Stage everything and commit
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.run(&["add", "."])?;
        self.run(&["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    /// Create a lightweight tag
    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.run(&["tag", tag_name])?;
        Ok(())
    }
}

/// A source repository fixture
pub struct SourceRepo {
    pub path: PathBuf,
    pub git: TestGit,
}

impl SourceRepo {
    /// Creates the `mylib` fixture under `parent`.
    ///
    /// History on `main`: `v1.2.3`, then `v2.0.0-broken`, then `v1.3.0`
    /// (HEAD). Each is tagged.
    pub fn mylib(parent: &Path) -> Result<Self> {
        let path = parent.join("mylib");
        fs::create_dir_all(&path)?;

        let git = TestGit::new(&path);
        git.init()?;
        git.config_user()?;

        fs::write(path.join("build.sh"), BUILD_SCRIPT)?;
        fs::write(path.join("README"), "mylib test fixture\n")?;
        fs::create_dir_all(path.join("cli"))?;
        fs::write(path.join("cli").join("build.sh"), CLI_BUILD_SCRIPT)?;

        let repo = Self {
            path,
            git,
        };
        repo.release("1.2.3", "v1.2.3")?;
        repo.release("broken", "v2.0.0-broken")?;
        repo.release("1.3.0", "v1.3.0")?;
        Ok(repo)
    }

    /// Creates the `pomlib` fixture under `parent`, tagged `2.1.0`.
    ///
    /// The root and `module/` poms are built; the poms under `src/` and
    /// `.hidden/` are data and must survive patching unchanged.
    pub fn pomlib(parent: &Path) -> Result<Self> {
        let path = parent.join("pomlib");
        let git = TestGit::new(&path);
        fs::create_dir_all(path.join("module"))?;
        fs::create_dir_all(path.join("src"))?;
        fs::create_dir_all(path.join(".hidden"))?;
        git.init()?;
        git.config_user()?;

        fs::write(path.join("build.sh"), POM_BUILD_SCRIPT)?;
        fs::write(path.join("pom.xml"), "<version>1.0.0-SNAPSHOT</version>\n")?;
        fs::write(
            path.join("module").join("pom.xml"),
            "<parent>1.0.0-SNAPSHOT</parent><version>1.0.0-SNAPSHOT</version>\n",
        )?;
        fs::write(path.join("src").join("pom.xml"), "<src>1.0.0-SNAPSHOT</src>\n")?;
        fs::write(path.join(".hidden").join("pom.xml"), "<hidden>1.0.0-SNAPSHOT</hidden>\n")?;
        git.commit_all("Release 2.1.0")?;
        git.tag("2.1.0")?;

        Ok(Self {
            path,
            git,
        })
    }

    /// Writes `VERSION`, commits, and tags the commit.
    pub fn release(&self, version: &str, tag: &str) -> Result<()> {
        fs::write(self.path.join("VERSION"), format!("{version}\n"))?;
        self.git.commit_all(&format!("Release {tag}"))?;
        self.git.tag(tag)?;
        Ok(())
    }

    /// Get the file:// URL for this repository
    pub fn file_url(&self) -> String {
        let path_str = self.path.display().to_string().replace('\\', "/");
        format!("file://{path_str}")
    }
}

/// Test project: a host project directory plus the `mylib` source repository
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    pub source: SourceRepo,
}

impl TestProject {
    /// Create a new test project with the `mylib` fixture
    pub fn new() -> Result<Self> {
        depforge::test_utils::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let sources_dir = temp_dir.path().join("sources");
        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&sources_dir)?;

        let source = SourceRepo::mylib(&sources_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            source,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// The vendor directory of the project
    pub fn vendor_dir(&self) -> PathBuf {
        self.project_dir.join("vendor")
    }

    /// A spec for `mylib` at `version`, built with the fixture's `build.sh`
    pub fn spec(&self, version: &str) -> DependencySpec {
        self.spec_in(&self.vendor_dir(), version)
    }

    /// Like [`TestProject::spec`] with another destination root
    pub fn spec_in(&self, destination: &Path, version: &str) -> DependencySpec {
        DependencySpec::new("mylib", self.source.file_url(), version, destination)
            .build_tool(stub_build())
    }

    /// Creates the `pomlib` fixture next to `mylib`
    pub fn pomlib_source(&self) -> Result<SourceRepo> {
        SourceRepo::pomlib(&self._temp_dir.path().join("sources"))
    }

    /// An installer for [`TestProject::spec`]
    pub fn installer(&self, version: &str) -> DependencyInstaller {
        DependencyInstaller::new(self.spec(version))
    }

    /// Write `depforge.toml` in the project directory
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join("depforge.toml");
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(path)
    }

    /// A `depforge.toml` declaring `mylib` at `version`
    pub fn mylib_config(&self, version: &str) -> String {
        format!(
            r#"[dependencies.mylib]
url = "{}"
version = "{}"
build-command = ["sh", "build.sh"]
"#,
            self.source.file_url(),
            version
        )
    }
}

/// The fixture build: `sh build.sh`
pub fn stub_build() -> BuildTool {
    BuildTool::new("sh").args(["build.sh"])
}

/// Sorted file names directly inside `dir`
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Names and contents of every file directly inside `dir`, sorted by name
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    list_names(dir)
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let content = if path.is_file() { fs::read(&path).unwrap() } else { Vec::new() };
            (name, content)
        })
        .collect()
}

/// Writes an executable git wrapper that appends its argv to `log` before
/// delegating to the real git.
#[cfg(unix)]
pub fn logging_git(dir: &Path, log: &Path) -> Result<PathBuf> {
    let script = dir.join("git-logger.sh");
    depforge::test_utils::write_script(
        &script,
        &format!("echo \"$*\" >> \"{}\"\nexec git \"$@\"\n", log.display()),
    )?;
    Ok(script)
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file has exact content
    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}
