use super::{EmbedContext, EmbedStrategy, EmbeddableUnit};
use crate::scan::ResourceEntry;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path};

pub const RC_FILE: &str = "win.rc";

/// Writes `<output>/src/win.rc`. Nothing is compiled here; the consuming
/// build attaches the script to its target and the resource compiler picks
/// the files up.
pub struct PeStrategy;

/// Path of a resource as seen from `<output>/src`, where `win.rc` lives.
pub fn rc_path(work_dir: &Path, output: &str, resource: &str) -> String {
    let output_path = Path::new(output);
    let relative = !output_path.is_absolute()
        && output_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if relative {
        let depth = output_path
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
            + 1;
        format!("{}{}", "../".repeat(depth), resource)
    } else {
        work_dir
            .join(resource)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

impl EmbedStrategy for PeStrategy {
    fn embed(
        &self,
        ctx: &mut EmbedContext<'_>,
        entries: &[ResourceEntry],
    ) -> Result<Vec<EmbeddableUnit>> {
        let mut units = Vec::with_capacity(entries.len());

        for entry in entries {
            let line = format!(
                "{} RCDATA \"{}\"",
                entry.safe_id,
                rc_path(ctx.work_dir, ctx.output, &entry.path)
            );
            units.push(EmbeddableUnit::Script {
                name: entry.safe_id.clone(),
                line,
            });
            ctx.progress.inc(1);
        }

        let script: String = units
            .iter()
            .filter_map(|unit| match unit {
                EmbeddableUnit::Script { line, .. } => Some(format!("{}\n", line)),
                _ => None,
            })
            .collect();

        let src_dir = ctx.output_dir().join("src");
        fs::create_dir_all(&src_dir)?;
        let rc_file = src_dir.join(RC_FILE);
        fs::write(&rc_file, script)
            .with_context(|| format!("Failed to write {}", rc_file.display()))?;

        Ok(units)
    }
}
