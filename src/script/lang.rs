//! Script languages known to the runner
//!
//! The extension decides the language; the language decides which configured
//! interpreter runs the script and how checkout wraps the case header.

use std::fmt;
use std::path::Path;

/// Extension of language-neutral scripts (run directly, no interpreter lookup)
pub const EXT_ZTF: &str = "ztf";
/// Extension of suite files
pub const EXT_SUITE: &str = "suite";
/// Extensions of result files
pub const EXT_RESULT: &str = "result";
pub const EXT_JSON: &str = "json";
/// Extension of independent expectation files
pub const EXT_EXPECT: &str = "exp";

/// A scripting language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Name used as key in the `[interpreters]` config table
    pub name: &'static str,
    pub ext: &'static str,
    /// First line of a generated script
    pub shebang: &'static str,
    /// Delimiters that keep the case header out of the interpreter's way
    pub comment_start: &'static str,
    pub comment_end: &'static str,
}

impl Language {
    /// Runs natively on Windows-like hosts without an interpreter
    pub fn is_native_on_windows(&self) -> bool {
        self.name == "bat"
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

static LANGUAGES: &[Language] = &[
    Language {
        name: "php",
        ext: "php",
        shebang: "#!/usr/bin/env php",
        comment_start: "<?php\n/**",
        comment_end: "*/",
    },
    Language {
        name: "python",
        ext: "py",
        shebang: "#!/usr/bin/env python3",
        comment_start: "'''",
        comment_end: "'''",
    },
    Language {
        name: "go",
        ext: "go",
        shebang: "",
        comment_start: "/**",
        comment_end: "*/",
    },
    Language {
        name: "shell",
        ext: "sh",
        shebang: "#!/usr/bin/env bash",
        comment_start: ":<<!",
        comment_end: "!",
    },
    Language {
        name: "bat",
        ext: "bat",
        shebang: "@echo off",
        comment_start: "goto start",
        comment_end: ":start",
    },
    Language {
        name: "javascript",
        ext: "js",
        shebang: "#!/usr/bin/env node",
        comment_start: "/**",
        comment_end: "*/",
    },
    Language {
        name: "lua",
        ext: "lua",
        shebang: "#!/usr/bin/env lua",
        comment_start: "--[[",
        comment_end: "]]",
    },
    Language {
        name: "perl",
        ext: "pl",
        shebang: "#!/usr/bin/env perl",
        comment_start: "=pod",
        comment_end: "=cut",
    },
    Language {
        name: "ruby",
        ext: "rb",
        shebang: "#!/usr/bin/env ruby",
        comment_start: "=begin",
        comment_end: "=end",
    },
    Language {
        name: "tcl",
        ext: "tcl",
        shebang: "#!/usr/bin/env tclsh",
        comment_start: "set case {",
        comment_end: "}",
    },
    Language {
        name: "autoit",
        ext: "au3",
        shebang: "",
        comment_start: "#cs",
        comment_end: "#ce",
    },
];

/// All known languages
pub fn all() -> &'static [Language] {
    LANGUAGES
}

pub fn by_ext(ext: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.ext.eq_ignore_ascii_case(ext))
}

pub fn by_name(name: &str) -> Option<&'static Language> {
    LANGUAGES
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(name) || l.ext.eq_ignore_ascii_case(name))
}

/// Extension of a path, without the dot
pub fn ext_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Language of a script by its extension
pub fn language_of(path: &Path) -> Option<&'static Language> {
    by_ext(ext_of(path))
}

/// Whether a path looks like a runnable test script
pub fn is_script(path: &Path) -> bool {
    let ext = ext_of(path);
    ext.eq_ignore_ascii_case(EXT_ZTF) || by_ext(ext).is_some()
}
