//! Read-only in-memory file tree backing the file tools.
//!
//! Entry names are stored exactly as declared; directory names conventionally
//! carry a trailing `/`. Paths resolve first against a top-level name verbatim
//! (`"src/"`), then segment by segment (`"src/utils/helpers.ts"`), ignoring
//! trailing slashes on both sides.
//!
//! ```rust
//! use ktooling::MockFileSystem;
//!
//! let fs = MockFileSystem::default();
//! assert!(fs.read_file("README.md").is_ok());
//! assert!(fs.read_file("src/").is_err());
//! assert_eq!(fs.read_directory("docs").expect("docs"), "FILE: guide.md\nFILE: api.md");
//! ```

use serde_json::json;

use crate::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsNode {
    File(String),
    Dir(Vec<(String, FsNode)>),
}

impl FsNode {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File(content.into())
    }

    pub fn dir<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, FsNode)>,
        S: Into<String>,
    {
        Self::Dir(
            entries
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    fn tag(&self) -> &'static str {
        if self.is_dir() { "DIR" } else { "FILE" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFileSystem {
    root: Vec<(String, FsNode)>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        let package_json = serde_json::to_string_pretty(&json!({
            "name": "ollama-agent",
            "version": "1.0.0",
        }))
        .unwrap_or_default();

        Self::new([
            (
                "README.md",
                FsNode::file(
                    "# Ollama Agent\n\nThis is a demonstration of tool usage with Ollama models.",
                ),
            ),
            ("package.json", FsNode::file(package_json)),
            (
                "src/",
                FsNode::dir([
                    (
                        "main.ts",
                        FsNode::file("console.log(\"Hello from Ollama Agent\");"),
                    ),
                    (
                        "utils/",
                        FsNode::dir([(
                            "helpers.ts",
                            FsNode::file("export const helper = () => \"Helper function\";"),
                        )]),
                    ),
                ]),
            ),
            (
                "docs/",
                FsNode::dir([
                    (
                        "guide.md",
                        FsNode::file("# User Guide\n\nHow to use the Ollama Agent tools."),
                    ),
                    (
                        "api.md",
                        FsNode::file("# API Reference\n\nTool documentation."),
                    ),
                ]),
            ),
        ])
    }
}

impl MockFileSystem {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, FsNode)>,
        S: Into<String>,
    {
        Self {
            root: entries
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, FsNode)] {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> Option<&FsNode> {
        if let Some((_, node)) = self.root.iter().find(|(name, _)| name == path) {
            return Some(node);
        }

        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let first = segments.next()?;
        let mut current = find_child(&self.root, first)?;

        for segment in segments {
            match current {
                FsNode::Dir(children) => current = find_child(children, segment)?,
                FsNode::File(_) => return None,
            }
        }

        Some(current)
    }

    pub fn read_file(&self, path: &str) -> Result<String, ToolError> {
        match self.resolve(path) {
            None => Err(ToolError::not_found(format!("File not found: {path}"))),
            Some(FsNode::Dir(_)) => Err(ToolError::invalid_arguments(format!(
                "Path is a directory, not a file: {path}"
            ))),
            Some(FsNode::File(content)) => Ok(content.clone()),
        }
    }

    /// Lists immediate children as `DIR: name` / `FILE: name` lines.
    /// `"."` and `"/"` list the root.
    pub fn read_directory(&self, path: &str) -> Result<String, ToolError> {
        let entries = if is_root(path) {
            self.root.as_slice()
        } else {
            match self.resolve(path) {
                None => return Err(ToolError::not_found(format!("Directory not found: {path}"))),
                Some(FsNode::File(_)) => {
                    return Err(ToolError::invalid_arguments(format!(
                        "Path is a file, not a directory: {path}"
                    )));
                }
                Some(FsNode::Dir(children)) => children.as_slice(),
            }
        };

        Ok(entries
            .iter()
            .map(|(name, node)| format!("{}: {name}", node.tag()))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Case-insensitive substring search over entry names beneath `path`.
    /// Never fails: an empty match set, or a `path` that is not a directory,
    /// yields the "No files found" line.
    pub fn search(&self, query: &str, path: &str) -> String {
        let needle = query.to_lowercase();
        let mut matches = Vec::new();

        if is_root(path) {
            collect_matches(&self.root, "", &needle, &mut matches);
        } else if let Some(FsNode::Dir(children)) = self.resolve(path) {
            collect_matches(children, path, &needle, &mut matches);
        }

        if matches.is_empty() {
            format!("No files found matching: {query}")
        } else {
            matches.join("\n")
        }
    }
}

fn is_root(path: &str) -> bool {
    matches!(path, "." | "/" | "")
}

fn find_child<'a>(entries: &'a [(String, FsNode)], segment: &str) -> Option<&'a FsNode> {
    entries
        .iter()
        .find(|(name, _)| name.trim_end_matches('/') == segment)
        .map(|(_, node)| node)
}

fn collect_matches(
    entries: &[(String, FsNode)],
    parent: &str,
    needle: &str,
    matches: &mut Vec<String>,
) {
    for (name, node) in entries {
        let full_path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{}/{name}", parent.trim_end_matches('/'))
        };

        if name.to_lowercase().contains(needle) {
            matches.push(format!("{}: {full_path}", node.tag()));
        }

        if let FsNode::Dir(children) = node {
            collect_matches(children, &full_path, needle, matches);
        }
    }
}
