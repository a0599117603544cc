//! Sample script trees for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::CONFIG_FILE_NAME;
use crate::resolver::source::MemoryScriptSource;

/// A set of script files keyed by root-relative path.
#[derive(Clone, Debug, Default)]
pub struct ScriptFixture {
    pub files: Vec<(String, String)>,
}

impl ScriptFixture {
    /// Empty fixture
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file
    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Add a `scriptdeps.toml` at the fixture root
    #[must_use]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(CONFIG_FILE_NAME, content)
    }

    /// A small page script with widgets, a versioned library and a shared helper.
    ///
    /// Load order for `app.js`:
    /// `lib/jquery-1.10.2.js`, `lib/util.js`, `widgets/core.js`,
    /// `widgets/grid.js`, `app.js`.
    pub fn widget_app() -> Self {
        Self::new()
            .with_file(
                "app.js",
                "/*\n * Application entry point\n * using lib/jquery-{version}\n */\nusing widgets/grid;\n\nstart();\n",
            )
            .with_file(
                "widgets/grid.js",
                "// Grid widget\nusing ../lib/util\nusing core\nusing-options debug\nvar grid = {};\n",
            )
            .with_file("widgets/core.js", "/* using ~/lib/util */\nvar core = {};\n")
            .with_file("lib/util.js", "var util = {};\n")
            .with_file("lib/jquery-1.9.1.js", "/* jquery 1.9.1 */\n")
            .with_file("lib/jquery-1.10.2.js", "/* jquery 1.10.2 */\n")
            .with_file("lib/jquery-1.10.2-rc1.js", "/* jquery 1.10.2-rc1 */\n")
    }

    /// Three files that depend on each other in a loop, plus one outside it.
    pub fn cyclic() -> Self {
        Self::new()
            .with_file("a.js", "using b\na();\n")
            .with_file("b.js", "using c\nb();\n")
            .with_file("c.js", "using a\nusing base\nc();\n")
            .with_file("base.js", "base();\n")
    }

    /// In-memory copy of the script files (the config file is left out)
    pub fn memory_source(&self) -> MemoryScriptSource {
        self.files
            .iter()
            .filter(|(path, _)| path != CONFIG_FILE_NAME)
            .fold(MemoryScriptSource::new(), |source, (path, content)| {
                source.with_file(path, content.as_str())
            })
    }

    /// Write every file below `root`, creating directories as needed
    pub fn write_to(&self, root: &Path) -> Result<()> {
        for (path, content) in &self.files {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, content)
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }
        Ok(())
    }
}
