/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Repository Manifest Collection
//!
//! Turns a git source locator into one multi-document manifest string.
//!
//! Source locators have the form
//! `git://github.com/<owner>/<repo>/<branch>/<version>/<root>`, where `root`
//! may itself contain slashes. The repository is walked at `refs/tags/<version>`
//! by a [`RepoWalker`]:
//!
//! - every visited `.yaml`/`.yml` file is appended, preceded by `\n---\n`
//! - every visited directory is handed to a [`ChartToManifestConverter`], whose
//!   output is appended as-is
//!
//! Cloning and chart rendering live behind the two traits.

use crate::errors::{BoxError, ConnectError};
use std::path::Path;
use url::Url;

const DOCUMENT_SEPARATOR: &str = "\n---\n";

/// A parsed `git://` source locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSourceUrl {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub version: String,
    pub root: String,
}

impl GitSourceUrl {
    pub fn parse(source: &str) -> Result<Self, ConnectError> {
        let url = Url::parse(source)
            .map_err(|e| ConnectError::InvalidSourceUrl(format!("{}: {}", source, e)))?;

        let path = url.path().trim_start_matches('/');
        let mut parts = path.splitn(5, '/');
        // Empty segments are kept; only missing ones are an error.
        let mut segment = || parts.next().map(str::to_string);

        match (segment(), segment(), segment(), segment(), segment()) {
            (Some(owner), Some(repo), Some(branch), Some(version), Some(root)) => Ok(Self {
                owner,
                repo,
                branch,
                version,
                root,
            }),
            _ => Err(ConnectError::InvalidSourceUrl(format!(
                "{}: expected git://github.com/<owner>/<repo>/<branch>/<version>/<root>",
                source
            ))),
        }
    }

    /// The git reference the version tag resolves to.
    pub fn reference_name(&self) -> String {
        format!("refs/tags/{}", self.version)
    }

    pub fn walk_request(&self) -> WalkRequest {
        WalkRequest {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            root: self.root.clone(),
            reference_name: self.reference_name(),
        }
    }
}

/// What the walker should visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub root: String,
    pub reference_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub name: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedDir {
    pub name: String,
    pub path: String,
}

/// Receives walk events. An error aborts the walk.
pub trait WalkVisitor {
    fn on_file(&mut self, file: &WalkedFile) -> Result<(), BoxError>;
    fn on_dir(&mut self, dir: &WalkedDir) -> Result<(), BoxError>;
}

/// Checks out a repository reference and visits the entries under `root`.
pub trait RepoWalker {
    fn walk(&self, request: &WalkRequest, visitor: &mut dyn WalkVisitor) -> Result<(), BoxError>;
}

/// Renders the chart found in a directory to Kubernetes manifests.
pub trait ChartToManifestConverter {
    fn convert(&self, dir: &Path, out: &mut String) -> Result<(), BoxError>;
}

struct ManifestCollector<'a, C> {
    converter: &'a C,
    out: String,
}

impl<C: ChartToManifestConverter> WalkVisitor for ManifestCollector<'_, C> {
    fn on_file(&mut self, file: &WalkedFile) -> Result<(), BoxError> {
        let is_manifest = Path::new(&file.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_manifest {
            self.out.push_str(DOCUMENT_SEPARATOR);
            self.out.push_str(&file.content);
        }
        Ok(())
    }

    fn on_dir(&mut self, dir: &WalkedDir) -> Result<(), BoxError> {
        self.converter.convert(Path::new(&dir.path), &mut self.out)
    }
}

/// Walks `source` and returns the aggregated manifests.
///
/// # Errors
/// `InvalidSourceUrl` for a malformed locator; `Collaborator` when the walk or
/// a conversion fails.
pub fn collect_manifests<W, C>(
    walker: &W,
    converter: &C,
    source: &str,
) -> Result<String, ConnectError>
where
    W: RepoWalker,
    C: ChartToManifestConverter,
{
    let source = GitSourceUrl::parse(source)?;
    let mut collector = ManifestCollector {
        converter,
        out: String::new(),
    };
    walker
        .walk(&source.walk_request(), &mut collector)
        .map_err(ConnectError::Collaborator)?;
    Ok(collector.out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    enum Entry {
        File(WalkedFile),
        Dir(WalkedDir),
    }

    /// Replays a fixed list of entries and remembers the request it was given.
    struct FixtureWalker {
        entries: Vec<Entry>,
        seen: RefCell<Option<WalkRequest>>,
    }

    impl FixtureWalker {
        fn new(entries: Vec<Entry>) -> Self {
            Self {
                entries,
                seen: RefCell::new(None),
            }
        }
    }

    impl RepoWalker for FixtureWalker {
        fn walk(
            &self,
            request: &WalkRequest,
            visitor: &mut dyn WalkVisitor,
        ) -> Result<(), BoxError> {
            *self.seen.borrow_mut() = Some(request.clone());
            for entry in &self.entries {
                match entry {
                    Entry::File(f) => visitor.on_file(f)?,
                    Entry::Dir(d) => visitor.on_dir(d)?,
                }
            }
            Ok(())
        }
    }

    struct EchoConverter;

    impl ChartToManifestConverter for EchoConverter {
        fn convert(&self, dir: &Path, out: &mut String) -> Result<(), BoxError> {
            if dir.ends_with("broken") {
                return Err("chart has no Chart.yaml".into());
            }
            out.push_str(&format!("\n---\n# rendered from {}", dir.display()));
            Ok(())
        }
    }

    fn file(name: &str, content: &str) -> Entry {
        Entry::File(WalkedFile {
            name: name.to_string(),
            path: format!("deploy/{}", name),
            content: content.to_string(),
        })
    }

    fn dir(path: &str) -> Entry {
        Entry::Dir(WalkedDir {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
        })
    }

    #[test]
    fn test_parse_source_url() {
        let source =
            GitSourceUrl::parse("git://github.com/meshery/meshery-operator/master/v0.7.0/config/crd/bases")
                .unwrap();

        assert_eq!(source.owner, "meshery");
        assert_eq!(source.repo, "meshery-operator");
        assert_eq!(source.branch, "master");
        assert_eq!(source.version, "v0.7.0");
        assert_eq!(source.root, "config/crd/bases");
        assert_eq!(source.reference_name(), "refs/tags/v0.7.0");
    }

    #[test]
    fn test_parse_accepts_empty_root() {
        let source =
            GitSourceUrl::parse("git://github.com/meshery/meshery-operator/master/v0.7.0/").unwrap();

        assert_eq!(source.version, "v0.7.0");
        assert_eq!(source.root, "");
        assert_eq!(source.walk_request().root, "");
    }

    #[test]
    fn test_parse_rejects_missing_segments() {
        for source in [
            "git://github.com/meshery/meshery-operator/master/v0.7.0",
            "git://github.com/",
            "not a url",
        ] {
            assert!(
                matches!(GitSourceUrl::parse(source), Err(ConnectError::InvalidSourceUrl(_))),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_collects_yaml_files_and_rendered_charts() {
        let walker = FixtureWalker::new(vec![
            file("crd.yaml", "kind: CustomResourceDefinition"),
            file("README.md", "# docs"),
            file("rbac.yml", "kind: ClusterRole"),
            dir("charts/meshery-operator"),
        ]);

        let manifests = collect_manifests(
            &walker,
            &EchoConverter,
            "git://github.com/meshery/meshery-operator/master/v0.7.0/config",
        )
        .unwrap();

        assert_eq!(
            manifests,
            "\n---\nkind: CustomResourceDefinition\n---\nkind: ClusterRole\n---\n# rendered from charts/meshery-operator"
        );
        let request = walker.seen.borrow().clone().unwrap();
        assert_eq!(request.reference_name, "refs/tags/v0.7.0");
        assert_eq!(request.root, "config");
    }

    #[test]
    fn test_converter_failure_aborts_walk() {
        let walker = FixtureWalker::new(vec![dir("charts/broken"), file("crd.yaml", "kind: X")]);

        let err = collect_manifests(
            &walker,
            &EchoConverter,
            "git://github.com/meshery/meshery-operator/master/v0.7.0/config",
        )
        .unwrap_err();
        assert!(matches!(err, ConnectError::Collaborator(_)));
    }

    #[test]
    fn test_invalid_source_never_walks() {
        let walker = FixtureWalker::new(vec![]);
        let result = collect_manifests(&walker, &EchoConverter, "git://github.com/meshery");

        assert!(matches!(result, Err(ConnectError::InvalidSourceUrl(_))));
        assert!(walker.seen.borrow().is_none());
    }
}
