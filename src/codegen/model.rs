/// A minimal C++ code model: just enough structure to describe the
/// generated header and source without hand-formatting strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `/** ... */` block, one entry per line
    DocComment(Vec<String>),
    /// `// ...`
    LineComment(String),
    /// `#include <..>` or `#include ".."`
    Include { path: String, system: bool },
    /// `#ifndef` / `#define` / `#endif` around `items`
    Guard { macro_name: String, items: Vec<Item> },
    /// `namespace a::b { .. }`, emitted as nested blocks for C++11
    Namespace { name: String, items: Vec<Item> },
    /// `extern "C" { .. }`
    ExternC(Vec<Item>),
    /// `enum class name { A = 0, B = 1 };`
    Enum {
        name: String,
        variants: Vec<(String, usize)>,
    },
    /// `head = { v0, v1, ... };` with one value per line
    Initializer { head: String, values: Vec<String> },
    /// `head { body }tail`; functions, loops, conditionals, lambdas
    Block {
        head: String,
        body: Vec<Item>,
        tail: String,
    },
    /// A single line, emitted verbatim at the current indentation
    Line(String),
    Blank,
}

impl Item {
    pub fn line(text: impl Into<String>) -> Self {
        Item::Line(text.into())
    }

    pub fn include(path: impl Into<String>, system: bool) -> Self {
        Item::Include {
            path: path.into(),
            system,
        }
    }

    pub fn doc(lines: &[&str]) -> Self {
        Item::DocComment(lines.iter().map(|l| l.to_string()).collect())
    }

    pub fn block(head: impl Into<String>, body: Vec<Item>) -> Self {
        Item::Block {
            head: head.into(),
            body,
            tail: String::new(),
        }
    }

    pub fn block_with_tail(head: impl Into<String>, body: Vec<Item>, tail: &str) -> Self {
        Item::Block {
            head: head.into(),
            body,
            tail: tail.to_string(),
        }
    }
}
