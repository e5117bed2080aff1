//! `CMakeLists.txt` generation for the resource library.
//!
//! One static library target named after the project. On ELF/Mach-O hosts
//! the objects in `objs/` are private link dependencies; on Windows the
//! resource script is an interface source so it is compiled into whatever
//! links the library.

use crate::platform::{EmbeddableUnit, OBJS_DIR, Platform};
use crate::platform::pe::RC_FILE;

pub const CMAKE_FILE: &str = "CMakeLists.txt";

pub fn generate_cmake(project_name: &str, platform: Platform, units: &[EmbeddableUnit]) -> String {
    let platform_section = match platform {
        Platform::Pe => format!(
            r#"
# Resources are compiled into the consumer through the .rc script
target_sources(${{RES_BUILDER_NAME}} INTERFACE ${{CMAKE_CURRENT_SOURCE_DIR}}/src/{rc})
"#,
            rc = RC_FILE
        ),
        Platform::Elf | Platform::MachO => {
            let mut objs = String::new();
            for obj in units.iter().filter_map(|u| u.object_file()) {
                objs.push_str(&format!(
                    "        ${{CMAKE_CURRENT_SOURCE_DIR}}/{}/{}\n",
                    OBJS_DIR, obj
                ));
            }
            if objs.is_empty() {
                "\n# No resources, nothing to link\n".to_string()
            } else {
                format!(
                    r#"
# Embedded resources are object files linked into the library
target_link_libraries(${{RES_BUILDER_NAME}} PRIVATE
{objs}        )
"#
                )
            }
        }
    };

    format!(
        r#"# THIS IS AUTOGENERATED CMAKE FILE, DO NOT MODIFY
cmake_minimum_required(VERSION 3.1)

set(RES_BUILDER_NAME {name})

project(${{RES_BUILDER_NAME}} VERSION 1.0 LANGUAGES CXX)

add_library(${{RES_BUILDER_NAME}} STATIC src/resources.cpp)
target_compile_features(${{RES_BUILDER_NAME}} PUBLIC cxx_std_11)
target_include_directories(${{RES_BUILDER_NAME}} PUBLIC ${{CMAKE_CURRENT_SOURCE_DIR}}/include)
if(NOT MSVC)
    target_compile_options(${{RES_BUILDER_NAME}} PRIVATE -fPIC)
endif()
{platform_section}
add_library(${{RES_BUILDER_NAME}}::${{RES_BUILDER_NAME}} ALIAS ${{RES_BUILDER_NAME}})
"#,
        name = project_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> EmbeddableUnit {
        EmbeddableUnit::Object {
            file_name: name.to_string(),
            start_symbol: String::new(),
            end_symbol: String::new(),
        }
    }

    #[test]
    fn test_unix_links_objects() {
        let text = generate_cmake(
            "badge",
            Platform::Elf,
            &[object("icons_a_svg.o"), object("icons_b_svg.o")],
        );
        assert!(text.contains("set(RES_BUILDER_NAME badge)"));
        assert!(text.contains("add_library(${RES_BUILDER_NAME} STATIC src/resources.cpp)"));
        assert!(text.contains(
            "target_link_libraries(${RES_BUILDER_NAME} PRIVATE\n        ${CMAKE_CURRENT_SOURCE_DIR}/objs/icons_a_svg.o\n        ${CMAKE_CURRENT_SOURCE_DIR}/objs/icons_b_svg.o\n        )"
        ));
        assert!(!text.contains("win.rc"));
    }

    #[test]
    fn test_windows_uses_interface_rc() {
        let unit = EmbeddableUnit::Script {
            name: "a".to_string(),
            line: String::new(),
        };
        let text = generate_cmake("badge", Platform::Pe, &[unit]);
        assert!(text.contains(
            "target_sources(${RES_BUILDER_NAME} INTERFACE ${CMAKE_CURRENT_SOURCE_DIR}/src/win.rc)"
        ));
        assert!(!text.contains("target_link_libraries"));
    }

    #[test]
    fn test_no_objects() {
        let text = generate_cmake("badge", Platform::MachO, &[]);
        assert!(!text.contains("target_link_libraries"));
        assert!(text.contains("add_library(${RES_BUILDER_NAME}::${RES_BUILDER_NAME} ALIAS"));
    }
}
