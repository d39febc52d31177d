//! `.sql` migrations: minijinja templates with optional up/down sections

use super::{read_source, render_template, MigrationLoader};
use crate::error::{CompileError, CompileResult};
use crate::migration::{Migration, MigrationResult};
use sq_core::{MigrationFile, VersionFolder};
use sq_jinja::{JinjaEnvironment, MigrationContext};
use sq_schema::SchemaHandle;
use std::sync::Arc;

const UP_MARKER: &str = "-- migrate:up";
const DOWN_MARKER: &str = "-- migrate:down";

/// Loads `.sql` files.
///
/// Without section markers the whole file is the up procedure. With
/// markers, the text after `-- migrate:up` is `up` and the text after
/// `-- migrate:down` is `down`:
///
/// ```sql
/// -- migrate:up
/// CREATE TABLE {{ schema }}.node(id uuid);
///
/// -- migrate:down
/// DROP TABLE {{ schema }}.node;
/// ```
///
/// Each procedure renders to a single statement.
///
/// Files are templates, so SQL containing `{{`, `{%` or `{#` (nested array
/// literals, for one) must be wrapped in a raw block:
///
/// ```sql
/// INSERT INTO {{ schema }}.grid VALUES ('{% raw %}{{1,2},{3,4}}{% endraw %}');
/// ```
pub struct SqlLoader {
    jinja: Arc<JinjaEnvironment<'static>>,
}

impl SqlLoader {
    pub fn new(jinja: Arc<JinjaEnvironment<'static>>) -> Self {
        Self { jinja }
    }
}

impl MigrationLoader for SqlLoader {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn load(
        &self,
        file: &MigrationFile,
        folder: &VersionFolder,
    ) -> CompileResult<Box<dyn Migration>> {
        let source = read_source(file)?;
        let path = file.path.display().to_string();
        let sections = split_sections(&source).map_err(|message| CompileError::InvalidModule {
            path: path.clone(),
            message,
        })?;

        let up = sections
            .up
            .ok_or_else(|| CompileError::MissingUp { path: path.clone() })?;
        for template in std::iter::once(&up).chain(sections.down.iter()) {
            self.jinja
                .check_syntax(template)
                .map_err(|source| CompileError::Template {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(Box::new(SqlMigration {
            stem: file.stem.clone(),
            version: folder.label.clone(),
            up,
            down: sections.down,
            jinja: self.jinja.clone(),
        }))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Sections {
    pub(crate) up: Option<String>,
    pub(crate) down: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Up,
    Down,
}

/// Split a source file into its up and down text.
///
/// Empty sections come back as `None`.
pub(crate) fn split_sections(source: &str) -> Result<Sections, String> {
    let has_markers = source.lines().any(|line| marker(line).is_some());
    if !has_markers {
        return Ok(Sections {
            up: non_empty(source),
            down: None,
        });
    }

    let mut current = Section::Preamble;
    let mut up: Option<String> = None;
    let mut down: Option<String> = None;
    for line in source.lines() {
        if let Some(section) = marker(line) {
            let seen = match section {
                Section::Up => up.is_some(),
                _ => down.is_some(),
            };
            if seen {
                return Err(format!("duplicate '{}' marker", marker_text(section)));
            }
            match section {
                Section::Up => up = Some(String::new()),
                _ => down = Some(String::new()),
            }
            current = section;
            continue;
        }

        let target = match current {
            Section::Preamble => {
                if line.trim().is_empty() {
                    continue;
                }
                return Err(format!(
                    "content before the first '{UP_MARKER}' or '{DOWN_MARKER}' marker"
                ));
            }
            Section::Up => up.as_mut(),
            Section::Down => down.as_mut(),
        };
        if let Some(text) = target {
            text.push_str(line);
            text.push('\n');
        }
    }

    Ok(Sections {
        up: up.as_deref().and_then(non_empty),
        down: down.as_deref().and_then(non_empty),
    })
}

fn marker(line: &str) -> Option<Section> {
    let line = line.trim();
    if line.eq_ignore_ascii_case(UP_MARKER) {
        Some(Section::Up)
    } else if line.eq_ignore_ascii_case(DOWN_MARKER) {
        Some(Section::Down)
    } else {
        None
    }
}

fn marker_text(section: Section) -> &'static str {
    match section {
        Section::Down => DOWN_MARKER,
        _ => UP_MARKER,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

struct SqlMigration {
    stem: String,
    version: String,
    up: String,
    down: Option<String>,
    jinja: Arc<JinjaEnvironment<'static>>,
}

impl SqlMigration {
    fn run(&self, template: &str, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        let ctx = MigrationContext::new(db.schema(), self.stem.as_str(), self.version.as_str());
        let rendered = render_template(&self.jinja, template, &ctx)?;
        let statement = rendered.trim();
        if statement.is_empty() {
            log::debug!("{} rendered to an empty statement", self.stem);
            return Ok(());
        }
        db.execute(statement)?;
        Ok(())
    }
}

impl Migration for SqlMigration {
    fn up(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        self.run(&self.up, db)
    }

    fn down(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        match &self.down {
            Some(down) => self.run(down, db),
            None => Ok(()),
        }
    }

    fn has_down(&self) -> bool {
        self.down.is_some()
    }
}
