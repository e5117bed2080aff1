use super::header::include_path;
use super::model::Item;
use crate::config::ResourceManifest;
use crate::platform::macho::SEGMENT;
use crate::platform::{EmbeddableUnit, Platform};
use crate::scan::ResourceEntry;

pub const SOURCE_FILE: &str = "resources.cpp";

const LIST_TYPE: &str = "std::vector<std::pair<std::string, ResId>>";

/// Quote `s` as a C++ string literal.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn source_model(
    manifest: &ResourceManifest,
    platform: Platform,
    entries: &[ResourceEntry],
    units: &[EmbeddableUnit],
) -> Vec<Item> {
    let mut items = vec![
        Item::doc(&["THIS IS AUTOGENERATED FILE, DO NOT MODIFY"]),
        Item::Blank,
        Item::include(include_path(manifest), false),
        Item::Blank,
        Item::include("cstring", true),
        Item::include("memory", true),
    ];

    let mut api = vec![Item::Blank, resource_list(entries), Item::Blank, resource_text()];

    if units.is_empty() {
        api.extend(empty_accessors());
    } else {
        match platform {
            Platform::Elf => {
                items.push(Item::Blank);
                items.push(elf_symbols(units));
                api.extend(elf_accessors(units));
            }
            Platform::MachO => {
                items.push(Item::include("mach-o/getsect.h", true));
                items.push(Item::include("mach-o/ldsyms.h", true));
                items.push(Item::Blank);
                items.push(lazy_table(units, macho_loader()));
                api.extend(table_accessors());
            }
            Platform::Pe => {
                items.push(Item::include("windows.h", true));
                items.push(Item::Blank);
                items.push(lazy_table(units, pe_loader()));
                api.extend(table_accessors());
            }
        }
    }

    api.push(Item::Blank);
    items.push(Item::Blank);
    items.push(Item::Namespace {
        name: manifest.namespace(),
        items: api,
    });
    items
}

fn resource_list(entries: &[ResourceEntry]) -> Item {
    let body = if entries.is_empty() {
        vec![Item::line(format!("return {}();", LIST_TYPE))]
    } else {
        vec![
            Item::Initializer {
                head: format!("static const {} list", LIST_TYPE),
                values: entries
                    .iter()
                    .map(|e| format!("{{{}, ResId::{}}}", string_literal(&e.path), e.enumerator()))
                    .collect(),
            },
            Item::line("return list;"),
        ]
    };
    Item::block(format!("{} get_resource_list()", LIST_TYPE), body)
}

fn resource_text() -> Item {
    Item::block(
        "std::string get_resource_text(ResId id)",
        vec![
            Item::line("const uint8_t *data = get_resource_data(id);"),
            Item::line("uint32_t size = get_resource_size(id);"),
            Item::block("if (!data || size == 0)", vec![Item::line("return std::string();")]),
            Item::LineComment("embedded bytes carry no terminator, copy and add one".to_string()),
            Item::line("std::unique_ptr<char[]> text(new char[size + 1]);"),
            Item::line("std::memcpy(text.get(), data, size);"),
            Item::line("text[size] = '\\0';"),
            Item::line("return std::string(text.get());"),
        ],
    )
}

fn empty_accessors() -> Vec<Item> {
    vec![
        Item::Blank,
        Item::block(
            "const uint8_t *get_resource_data(ResId /*id*/)",
            vec![Item::line("return nullptr;")],
        ),
        Item::Blank,
        Item::block(
            "uint32_t get_resource_size(ResId /*id*/)",
            vec![Item::line("return 0;")],
        ),
    ]
}

fn elf_symbols(units: &[EmbeddableUnit]) -> Item {
    let mut decls = Vec::new();
    for unit in units {
        if let EmbeddableUnit::Object {
            start_symbol,
            end_symbol,
            ..
        } = unit
        {
            decls.push(Item::line(format!("extern const uint8_t {}[];", start_symbol)));
            decls.push(Item::line(format!("extern const uint8_t {}[];", end_symbol)));
        }
    }
    Item::ExternC(decls)
}

fn elf_accessors(units: &[EmbeddableUnit]) -> Vec<Item> {
    let mut starts = Vec::new();
    let mut sizes = Vec::new();
    for unit in units {
        if let EmbeddableUnit::Object {
            start_symbol,
            end_symbol,
            ..
        } = unit
        {
            starts.push(start_symbol.clone());
            sizes.push(format!(
                "static_cast<uint32_t>({} - {})",
                end_symbol, start_symbol
            ));
        }
    }

    vec![
        Item::Blank,
        Item::block(
            "const uint8_t *get_resource_data(ResId id)",
            vec![
                Item::Initializer {
                    head: "static const uint8_t *const starts[]".to_string(),
                    values: starts,
                },
                Item::line("return starts[static_cast<std::size_t>(id)];"),
            ],
        ),
        Item::Blank,
        Item::block(
            "uint32_t get_resource_size(ResId id)",
            vec![
                Item::Initializer {
                    head: "static const uint32_t sizes[]".to_string(),
                    values: sizes,
                },
                Item::line("return sizes[static_cast<std::size_t>(id)];"),
            ],
        ),
    ]
}

fn table_accessors() -> Vec<Item> {
    vec![
        Item::Blank,
        Item::block(
            "const uint8_t *get_resource_data(ResId id)",
            vec![Item::line(
                "return resource_table().starts[static_cast<std::size_t>(id)];",
            )],
        ),
        Item::Blank,
        Item::block(
            "uint32_t get_resource_size(ResId id)",
            vec![Item::line(
                "return resource_table().sizes[static_cast<std::size_t>(id)];",
            )],
        ),
    ]
}

/// Names the lazy table is populated from: section names on Mach-O,
/// resource names on Windows.
fn unit_names(units: &[EmbeddableUnit]) -> Vec<String> {
    units
        .iter()
        .map(|unit| match unit {
            EmbeddableUnit::Script { name, .. } => string_literal(name),
            EmbeddableUnit::Section { section, .. } => string_literal(section),
            EmbeddableUnit::Object { start_symbol, .. } => string_literal(start_symbol),
        })
        .collect()
}

fn macho_loader() -> Vec<Item> {
    vec![
        Item::line("unsigned long size = 0;"),
        Item::line(format!(
            "t.starts[i] = getsectiondata(&_mh_execute_header, \"{}\", resource_names[i], &size);",
            SEGMENT
        )),
        Item::line("t.sizes[i] = static_cast<uint32_t>(size);"),
    ]
}

fn pe_loader() -> Vec<Item> {
    vec![
        Item::LineComment("MAKEINTRESOURCEA(10) is RT_RCDATA".to_string()),
        Item::line("HRSRC info = FindResourceA(nullptr, resource_names[i], MAKEINTRESOURCEA(10));"),
        Item::block("if (!info)", vec![Item::line("continue;")]),
        Item::line("HGLOBAL handle = LoadResource(nullptr, info);"),
        Item::line("t.starts[i] = static_cast<const uint8_t *>(LockResource(handle));"),
        Item::line("t.sizes[i] = static_cast<uint32_t>(SizeofResource(nullptr, info));"),
    ]
}

/// Anonymous-namespace table filled once on first access. Function-local
/// static initialization runs exactly once even with concurrent callers,
/// and the table is immutable afterwards.
fn lazy_table(units: &[EmbeddableUnit], loader: Vec<Item>) -> Item {
    let init = Item::block_with_tail(
        "static const ResourceTable table = []()",
        vec![
            Item::line("ResourceTable t = {};"),
            Item::block("for (std::size_t i = 0; i < RESOURCE_COUNT; ++i)", loader),
            Item::line("return t;"),
        ],
        "();",
    );

    Item::Namespace {
        name: String::new(),
        items: vec![
            Item::Blank,
            Item::line(format!(
                "const std::size_t RESOURCE_COUNT = {};",
                units.len()
            )),
            Item::Blank,
            Item::Initializer {
                head: "const char *const resource_names[RESOURCE_COUNT]".to_string(),
                values: unit_names(units),
            },
            Item::Blank,
            Item::block_with_tail(
                "struct ResourceTable",
                vec![
                    Item::line("const uint8_t *starts[RESOURCE_COUNT];"),
                    Item::line("uint32_t sizes[RESOURCE_COUNT];"),
                ],
                ";",
            ),
            Item::Blank,
            Item::block(
                "const ResourceTable &resource_table()",
                vec![init, Item::line("return table;")],
            ),
            Item::Blank,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::emit::CppEmitter;
    use crate::platform::elf::{end_symbol, start_symbol};
    use crate::platform::macho::section_name;

    fn manifest() -> ResourceManifest {
        ResourceManifest {
            output: "build".to_string(),
            project_name: "badge".to_string(),
            namespace: Some("badge::_assets".to_string()),
            include_dir: Some("badgecpp".to_string()),
            ..Default::default()
        }
    }

    fn entries() -> Vec<ResourceEntry> {
        vec![
            ResourceEntry::new("icons/a.svg", 0),
            ResourceEntry::new("icons/b.svg", 1),
        ]
    }

    fn elf_units(entries: &[ResourceEntry]) -> Vec<EmbeddableUnit> {
        entries
            .iter()
            .map(|e| EmbeddableUnit::Object {
                file_name: format!("{}.o", e.safe_id),
                start_symbol: start_symbol(e),
                end_symbol: end_symbol(e),
            })
            .collect()
    }

    #[test]
    fn test_elf_source_uses_symbol_differences() {
        let entries = entries();
        let text = CppEmitter::render(&source_model(
            &manifest(),
            Platform::Elf,
            &entries,
            &elf_units(&entries),
        ));

        assert!(text.contains("#include \"badgecpp/resources.h\""));
        assert!(text.contains("extern const uint8_t _binary_icons_b_svg_end[];"));
        assert!(text.contains(
            "static_cast<uint32_t>(_binary_icons_b_svg_end - _binary_icons_b_svg_start),"
        ));
        assert!(text.contains("{\"icons/a.svg\", ResId::ICONS_A_SVG},"));
        assert!(text.contains("namespace badge {\nnamespace _assets {"));
        assert!(!text.contains("getsectiondata"));
        assert!(!text.contains("FindResourceA"));
    }

    #[test]
    fn test_macho_source_uses_lazy_section_table() {
        let entries = entries();
        let units: Vec<_> = entries
            .iter()
            .map(|e| EmbeddableUnit::Section {
                file_name: format!("{}.o", e.safe_id),
                section: section_name(e.index),
            })
            .collect();
        let text = CppEmitter::render(&source_model(&manifest(), Platform::MachO, &entries, &units));

        assert!(text.contains("#include <mach-o/getsect.h>"));
        assert!(text.contains("const std::size_t RESOURCE_COUNT = 2;"));
        assert!(text.contains("\"_res_sec_1\","));
        assert!(text.contains("static const ResourceTable table = []() {"));
        assert!(text.contains("getsectiondata(&_mh_execute_header, \"binary\", resource_names[i], &size);"));
    }

    #[test]
    fn test_pe_source_uses_resource_names() {
        let entries = entries();
        let units: Vec<_> = entries
            .iter()
            .map(|e| EmbeddableUnit::Script {
                name: e.safe_id.clone(),
                line: String::new(),
            })
            .collect();
        let text = CppEmitter::render(&source_model(&manifest(), Platform::Pe, &entries, &units));

        assert!(text.contains("#include <windows.h>"));
        assert!(text.contains("\"icons_a_svg\","));
        assert!(text.contains("FindResourceA(nullptr, resource_names[i], MAKEINTRESOURCEA(10));"));
        assert!(text.contains("LockResource(handle)"));
    }

    #[test]
    fn test_empty_source_has_no_arrays() {
        for platform in [Platform::Elf, Platform::MachO, Platform::Pe] {
            let text = CppEmitter::render(&source_model(&manifest(), platform, &[], &[]));
            assert!(text.contains("return nullptr;"));
            assert!(text.contains("return 0;"));
            assert!(!text.contains("starts[]"));
            assert!(!text.contains("RESOURCE_COUNT"));
            assert!(text.contains("return std::vector<std::pair<std::string, ResId>>();"));
        }
    }

    #[test]
    fn test_text_accessor_terminates_copy() {
        let text = CppEmitter::render(&source_model(&manifest(), Platform::Elf, &[], &[]));
        assert!(text.contains("new char[size + 1]"));
        assert!(text.contains("text[size] = '\\0';"));
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
