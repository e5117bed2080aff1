use super::{EmbedContext, EmbedStrategy, EmbeddableUnit, ToolCommand, object_name};
use crate::error::BuildError;
use crate::scan::ResourceEntry;
use anyhow::Result;

/// `objcopy -I binary` per resource.
///
/// objcopy derives symbol names from the input path it is given, so the
/// resource is passed relative to the working directory. Sizes are never
/// stored; the generated source subtracts the start symbol from the end one.
pub struct ElfStrategy;

pub fn start_symbol(entry: &ResourceEntry) -> String {
    format!("_binary_{}_start", entry.safe_id)
}

pub fn end_symbol(entry: &ResourceEntry) -> String {
    format!("_binary_{}_end", entry.safe_id)
}

impl EmbedStrategy for ElfStrategy {
    fn embed(
        &self,
        ctx: &mut EmbedContext<'_>,
        entries: &[ResourceEntry],
    ) -> Result<Vec<EmbeddableUnit>> {
        let (target, arch) = ctx.tools.elf_target.clone().ok_or_else(|| {
            BuildError::InvalidManifest(format!(
                "no objcopy target known for architecture '{}'; set tools.elf_target and tools.elf_arch",
                std::env::consts::ARCH
            ))
        })?;
        let objs_dir = ctx.objs_dir();
        let mut units = Vec::with_capacity(entries.len());

        for entry in entries {
            ctx.progress.set_message(entry.path.clone());
            let file_name = object_name(entry);
            let out_file = objs_dir.join(&file_name);

            let command = ToolCommand::new(&ctx.tools.objcopy, ctx.work_dir)
                .arg("-I")
                .arg("binary")
                .arg("-O")
                .arg(target.as_str())
                .arg("-B")
                .arg(arch.as_str())
                .arg(entry.path.as_str())
                .arg(out_file.to_string_lossy());
            ctx.runner.run(&command)?;

            units.push(EmbeddableUnit::Object {
                file_name,
                start_symbol: start_symbol(entry),
                end_symbol: end_symbol(entry),
            });
            ctx.progress.inc(1);
        }

        Ok(units)
    }
}
