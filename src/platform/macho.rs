use super::{
    EmbedContext, EmbedStrategy, EmbeddableUnit, TEMP_DIR, ToolCommand, object_name,
};
use crate::error::BuildError;
use crate::scan::ResourceEntry;
use anyhow::{Context, Result};
use std::fs;

pub const SEGMENT: &str = "binary";
pub const SECTION_PREFIX: &str = "_res_sec_";
/// Mach-O section names hold 16 bytes; the prefix leaves room for 7 digits.
pub const MAX_SECTIONS: usize = 10_000_000;

/// `ld -r -sectcreate` per resource, on top of one shared empty stub object.
pub struct MachOStrategy;

pub fn section_name(index: usize) -> String {
    format!("{}{}", SECTION_PREFIX, index)
}

impl EmbedStrategy for MachOStrategy {
    fn embed(
        &self,
        ctx: &mut EmbedContext<'_>,
        entries: &[ResourceEntry],
    ) -> Result<Vec<EmbeddableUnit>> {
        if entries.len() > MAX_SECTIONS {
            return Err(BuildError::TooManyResources(entries.len()).into());
        }
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let temp_dir = ctx.output_dir().join(TEMP_DIR);
        fs::create_dir_all(&temp_dir)
            .with_context(|| format!("Failed to create {}", temp_dir.display()))?;
        let stub_src = temp_dir.join("stub.c");
        let stub_obj = temp_dir.join("stub.o");
        fs::write(&stub_src, "").context("Failed to write stub.c")?;

        let compile_stub = ToolCommand::new(&ctx.tools.cc, ctx.work_dir)
            .arg("-c")
            .arg("-o")
            .arg(stub_obj.to_string_lossy())
            .arg(stub_src.to_string_lossy());
        ctx.runner.run(&compile_stub)?;

        let objs_dir = ctx.objs_dir();
        let mut units = Vec::with_capacity(entries.len());

        // section index follows scan order, the generated lookup relies on it
        for (counter, entry) in entries.iter().enumerate() {
            ctx.progress.set_message(entry.path.clone());
            let file_name = object_name(entry);
            let section = section_name(counter);

            let command = ToolCommand::new(&ctx.tools.ld, ctx.work_dir)
                .arg("-r")
                .arg("-o")
                .arg(objs_dir.join(&file_name).to_string_lossy())
                .arg("-sectcreate")
                .arg(SEGMENT)
                .arg(section.as_str())
                .arg(entry.path.as_str())
                .arg(stub_obj.to_string_lossy());
            ctx.runner.run(&command)?;

            units.push(EmbeddableUnit::Section { file_name, section });
            ctx.progress.inc(1);
        }

        Ok(units)
    }
}
