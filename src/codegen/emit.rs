use super::model::Item;

const INDENT: &str = "    ";

/// Renders [`Item`]s as C++ text. Output depends only on the items, so the
/// same model always produces byte-identical files.
#[derive(Debug, Default)]
pub struct CppEmitter {
    out: String,
    depth: usize,
}

impl CppEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(items: &[Item]) -> String {
        let mut emitter = Self::new();
        emitter.emit_all(items);
        emitter.out
    }

    fn emit_all(&mut self, items: &[Item]) {
        for item in items {
            self.emit(item);
        }
    }

    fn write_line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, items: &[Item]) {
        self.depth += 1;
        self.emit_all(items);
        self.depth -= 1;
    }

    fn emit(&mut self, item: &Item) {
        match item {
            Item::DocComment(lines) => {
                self.write_line("/**");
                for line in lines {
                    if line.is_empty() {
                        self.write_line(" *");
                    } else {
                        self.write_line(&format!(" * {}", line));
                    }
                }
                self.write_line(" */");
            }
            Item::LineComment(text) => self.write_line(&format!("// {}", text)),
            Item::Include { path, system } => {
                if *system {
                    self.write_line(&format!("#include <{}>", path));
                } else {
                    self.write_line(&format!("#include \"{}\"", path));
                }
            }
            Item::Guard { macro_name, items } => {
                // preprocessor lines are never indented
                let depth = std::mem::take(&mut self.depth);
                self.write_line(&format!("#ifndef {}", macro_name));
                self.write_line(&format!("#define {}", macro_name));
                self.depth = depth;
                self.emit_all(items);
                let depth = std::mem::take(&mut self.depth);
                self.write_line(&format!("#endif // {}", macro_name));
                self.depth = depth;
            }
            Item::Namespace { name, items } if name.is_empty() => {
                self.write_line("namespace {");
                self.emit_all(items);
                self.write_line("} // namespace");
            }
            Item::Namespace { name, items } => {
                let parts: Vec<&str> = name.split("::").collect();
                for part in &parts {
                    self.write_line(&format!("namespace {} {{", part));
                }
                self.emit_all(items);
                for part in parts.iter().rev() {
                    self.write_line(&format!("}} // namespace {}", part));
                }
            }
            Item::ExternC(items) => {
                self.write_line("extern \"C\" {");
                self.nested(items);
                self.write_line("}");
            }
            Item::Enum { name, variants } => {
                self.write_line(&format!("enum class {} {{", name));
                self.depth += 1;
                let last = variants.len().saturating_sub(1);
                for (idx, (variant, value)) in variants.iter().enumerate() {
                    let sep = if idx == last { "" } else { "," };
                    self.write_line(&format!("{} = {}{}", variant, value, sep));
                }
                self.depth -= 1;
                self.write_line("};");
            }
            Item::Initializer { head, values } => {
                if values.is_empty() {
                    self.write_line(&format!("{} = {{}};", head));
                    return;
                }
                self.write_line(&format!("{} = {{", head));
                self.depth += 1;
                for value in values {
                    self.write_line(&format!("{},", value));
                }
                self.depth -= 1;
                self.write_line("};");
            }
            Item::Block { head, body, tail } => {
                self.write_line(&format!("{} {{", head));
                self.nested(body);
                self.write_line(&format!("}}{}", tail));
            }
            Item::Line(text) => self.write_line(text),
            Item::Blank => self.write_line(""),
        }
    }
}
