use super::model::Item;
use crate::config::ResourceManifest;
use crate::scan::ResourceEntry;

pub const HEADER_FILE: &str = "resources.h";

pub fn guard_macro(manifest: &ResourceManifest) -> String {
    format!("{}_RESOURCE_BUILDER_H", manifest.project_name.to_uppercase())
}

/// Include path of the header as seen by consumers.
pub fn include_path(manifest: &ResourceManifest) -> String {
    format!("{}/{}", manifest.include_dir(), HEADER_FILE)
}

pub fn header_model(manifest: &ResourceManifest, entries: &[ResourceEntry]) -> Vec<Item> {
    let variants = entries
        .iter()
        .map(|e| (e.enumerator(), e.index))
        .collect();

    let api = vec![
        Item::Blank,
        Item::Enum {
            name: "ResId".to_string(),
            variants,
        },
        Item::Blank,
        Item::doc(&[
            "Returns list of all resources and their IDs.",
            "@return list of pairs (filename, id)",
        ]),
        Item::line("std::vector<std::pair<std::string, ResId>> get_resource_list();"),
        Item::Blank,
        Item::doc(&[
            "Wraps utf-8 text into string.",
            "Internally calls get_resource_data and get_resource_size.",
            "Allocates a temporary buffer one byte larger than the resource since",
            "the embedded bytes are not guaranteed to end with a null byte.",
            "@param id - resource id",
            "@return string holding resource text",
        ]),
        Item::line("std::string get_resource_text(ResId id);"),
        Item::Blank,
        Item::doc(&[
            "Returns resource data for given ID. Do not free or modify it!",
            "Call get_resource_size to get size of the data.",
            "@param id - resource id",
            "@return pointer to data",
        ]),
        Item::line("const uint8_t *get_resource_data(ResId id);"),
        Item::Blank,
        Item::doc(&[
            "Returns size of resource data for given ID.",
            "Accessing memory past this size is undefined behavior.",
            "@param id - resource id",
            "@return data size in bytes",
        ]),
        Item::line("uint32_t get_resource_size(ResId id);"),
        Item::Blank,
    ];

    vec![
        Item::doc(&["THIS IS AUTOGENERATED HEADER, DO NOT MODIFY"]),
        Item::Blank,
        Item::Guard {
            macro_name: guard_macro(manifest),
            items: vec![
                Item::Blank,
                Item::include("cstdint", true),
                Item::include("string", true),
                Item::include("utility", true),
                Item::include("vector", true),
                Item::Blank,
                Item::Namespace {
                    name: manifest.namespace(),
                    items: api,
                },
                Item::Blank,
            ],
        },
    ]
}
