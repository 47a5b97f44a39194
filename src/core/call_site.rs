//! Call-site capture and normalization
//!
//! A [`StackCapture`] yields raw frames, newest first. The [`CallSiteResolver`]
//! drops frames that belong to the Rust runtime or to this crate, and turns the
//! rest into portable [`CallSiteFrame`]s with paths relative to the working
//! directory.

use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// File prefixes of frames compiled into the Rust toolchain
const INTERNAL_PATH_PREFIXES: &[&str] = &["/rustc/"];

/// Symbol prefixes of the runtime, the test harness, the `log` facade and the
/// capture machinery
const INTERNAL_SYMBOL_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "test::",
    "backtrace::",
    "log::",
    "__rust",
    "rust_begin_unwind",
];

const CRATE_SYMBOL_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Path fragments that identify third-party sources in Cargo's cache
const DEPENDENCY_DIR_MARKERS: &[&str] = &[".cargo/registry", ".cargo/git"];

/// Whether `path` points into a downloaded dependency
pub fn is_dependency_path(path: &str) -> bool {
    let normalized = path.replace('\\', "/");
    DEPENDENCY_DIR_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

/// One frame as reported by the introspection collaborator.
///
/// Every field may be missing; nothing is defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCallSite {
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
    pub is_constructor: Option<bool>,
    pub function_name: Option<String>,
    pub type_name: Option<String>,
    pub method_name: Option<String>,
    /// Demangled symbol path, without hash
    pub symbol: Option<String>,
}

impl RawCallSite {
    pub fn new(file_name: impl Into<String>, line_number: u32, column_number: u32) -> Self {
        Self {
            file_name: Some(file_name.into()),
            line_number: Some(line_number),
            column_number: Some(column_number),
            ..Self::default()
        }
    }

    /// Location recorded by `#[track_caller]`; carries no function names
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }

    /// Attach a Rust symbol path and derive function, type and method names from it
    #[must_use]
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        let symbol = strip_symbol_hash(symbol.trim());
        if symbol.is_empty() || symbol == "<unknown>" {
            return self;
        }

        let mut path = symbol;
        while let Some(stripped) = path.strip_suffix("::{{closure}}") {
            path = stripped;
        }

        let (type_name, function) = if path.starts_with('<') {
            match path.rsplit_once(">::") {
                Some((qualified, method)) => {
                    let inner = qualified.trim_start_matches('<');
                    let self_type = inner.split(" as ").next().unwrap_or(inner);
                    (last_segment(self_type), method.to_string())
                }
                None => (None, path.to_string()),
            }
        } else {
            let plain = strip_generics(path);
            let segments: Vec<&str> = plain.split("::").collect();
            let function = segments.last().copied().unwrap_or_default().to_string();
            let type_name = segments
                .len()
                .checked_sub(2)
                .map(|index| segments[index])
                .filter(|segment| segment.chars().next().is_some_and(char::is_uppercase))
                .map(str::to_string);
            (type_name, function)
        };

        self.is_constructor = Some(type_name.is_some() && function == "new");
        self.method_name = type_name.as_ref().map(|_| function.clone());
        self.function_name = Some(function);
        self.type_name = type_name;
        self.symbol = Some(symbol.to_string());
        self
    }

    fn apply_location(&mut self, location: &str) {
        match split_numeric_suffix(location) {
            Some((rest, last)) => match split_numeric_suffix(rest) {
                Some((file, line)) => {
                    self.file_name = Some(file.to_string());
                    self.line_number = Some(line);
                    self.column_number = Some(last);
                }
                None => {
                    self.file_name = Some(rest.to_string());
                    self.line_number = Some(last);
                }
            },
            None => self.file_name = Some(location.to_string()),
        }
    }
}

fn split_numeric_suffix(text: &str) -> Option<(&str, u32)> {
    let (rest, tail) = text.rsplit_once(':')?;
    tail.parse().ok().map(|number| (rest, number))
}

fn strip_symbol_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

fn strip_generics(path: &str) -> String {
    let mut depth = 0usize;
    path.chars()
        .filter(|c| match c {
            '<' => {
                depth += 1;
                false
            }
            '>' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn last_segment(path: &str) -> Option<String> {
    strip_generics(path)
        .rsplit("::")
        .next()
        .map(|segment| segment.trim_start_matches(['&', '*']).trim().to_string())
        .filter(|segment| !segment.is_empty())
}

/// Parse the rendering of [`std::backtrace::Backtrace`] into frames, newest first
pub fn parse_backtrace(rendered: &str) -> Vec<RawCallSite> {
    let mut frames: Vec<RawCallSite> = Vec::new();
    for line in rendered.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                frame.apply_location(location);
            }
            continue;
        }
        let symbol = match trimmed.split_once(": ") {
            Some((index, rest)) if index.chars().all(|c| c.is_ascii_digit()) => rest,
            _ => trimmed,
        };
        frames.push(RawCallSite::default().with_symbol(symbol));
    }
    frames
}

/// Source of call stacks for the current execution point
pub trait StackCapture: Send + Sync {
    /// Frames newest first, or `None` when introspection is unavailable
    fn capture(&self) -> Option<Vec<RawCallSite>>;
}

/// Captures stacks with the standard library's backtrace support
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    fn capture(&self) -> Option<Vec<RawCallSite>> {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return None;
        }
        let frames = parse_backtrace(&backtrace.to_string());
        (!frames.is_empty()).then_some(frames)
    }
}

/// Portable description of one stack frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSiteFrame {
    /// Path relative to the working directory
    pub file_path: String,
    pub full_file_path: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_constructor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
}

/// Filters raw stacks and converts frames relative to a working directory
#[derive(Debug, Clone)]
pub struct CallSiteResolver {
    cwd: Option<PathBuf>,
    cwd_segments: Vec<String>,
}

impl CallSiteResolver {
    /// Resolver for the process working directory
    pub fn new() -> Self {
        match std::env::current_dir() {
            Ok(cwd) => Self::with_cwd(cwd),
            Err(_) => Self {
                cwd: None,
                cwd_segments: Vec::new(),
            },
        }
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let rendered = cwd.to_string_lossy().to_string();
        let trimmed = if rendered.len() > 1 {
            rendered.trim_end_matches(MAIN_SEPARATOR)
        } else {
            rendered.as_str()
        };
        let cwd_segments = trimmed.split(MAIN_SEPARATOR).map(str::to_string).collect();
        Self {
            cwd: Some(cwd),
            cwd_segments,
        }
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Drop internal frames. A missing stack is passed through unchanged.
    pub fn clean(&self, stack: Option<Vec<RawCallSite>>) -> Option<Vec<RawCallSite>> {
        stack.map(|frames| {
            frames
                .into_iter()
                .filter(|frame| !Self::is_internal(frame))
                .collect()
        })
    }

    fn is_internal(frame: &RawCallSite) -> bool {
        let file = frame.file_name.as_deref().unwrap_or_default();
        if file.is_empty() || INTERNAL_PATH_PREFIXES.iter().any(|p| file.starts_with(p)) {
            return true;
        }
        let symbol = frame
            .symbol
            .as_deref()
            .unwrap_or_default()
            .trim_start_matches('<');
        symbol.starts_with(CRATE_SYMBOL_PREFIX)
            || INTERNAL_SYMBOL_PREFIXES.iter().any(|p| symbol.starts_with(p))
    }

    /// Remove the leading segments `path` shares with the working directory
    pub fn clean_file_path(&self, path: &str) -> String {
        let segments: Vec<&str> = path.split(MAIN_SEPARATOR).collect();
        let shared = segments
            .iter()
            .zip(&self.cwd_segments)
            .take_while(|(segment, cwd_segment)| **segment == cwd_segment.as_str())
            .count();
        segments[shared..].join(&MAIN_SEPARATOR.to_string())
    }

    fn absolutize(&self, path: &str) -> String {
        if path.is_empty() || Path::new(path).is_absolute() {
            return path.to_string();
        }
        match &self.cwd {
            Some(cwd) => {
                let relative = path
                    .strip_prefix(&format!(".{}", MAIN_SEPARATOR))
                    .unwrap_or(path);
                cwd.join(relative).to_string_lossy().to_string()
            }
            None => path.to_string(),
        }
    }

    pub fn to_frame(&self, raw: &RawCallSite) -> CallSiteFrame {
        let raw_path = raw.file_name.as_deref().unwrap_or_default();
        let raw_path = raw_path.strip_prefix("file://").unwrap_or(raw_path);
        let full_file_path = self.absolutize(raw_path);
        let file_name = Path::new(&full_file_path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        CallSiteFrame {
            file_path: self.clean_file_path(&full_file_path),
            full_file_path,
            file_name,
            line_number: raw.line_number,
            column_number: raw.column_number,
            is_constructor: raw.is_constructor,
            function_name: raw.function_name.clone(),
            type_name: raw.type_name.clone(),
            method_name: raw.method_name.clone(),
        }
    }

    pub fn to_frames(&self, raw: &[RawCallSite]) -> Vec<CallSiteFrame> {
        raw.iter().map(|frame| self.to_frame(frame)).collect()
    }
}

impl Default for CallSiteResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/backtrace.rs:312:9
   1: hierlog::core::call_site::BacktraceCapture::capture
             at ./src/core/call_site.rs:201:25
   2: shop::orders::OrderService::new
             at ./src/orders.rs:42:17
   3: <shop::db::Pool as shop::db::Connect>::connect::{{closure}}
             at ./src/db.rs:9:5
   4: shop::main
             at ./src/main.rs:3:5
   5: <unknown>";

    #[test]
    fn test_parse_backtrace() {
        let frames = parse_backtrace(RENDERED);
        assert_eq!(frames.len(), 6);

        let ctor = &frames[2];
        assert_eq!(ctor.file_name.as_deref(), Some("./src/orders.rs"));
        assert_eq!(ctor.line_number, Some(42));
        assert_eq!(ctor.column_number, Some(17));
        assert_eq!(ctor.type_name.as_deref(), Some("OrderService"));
        assert_eq!(ctor.method_name.as_deref(), Some("new"));
        assert_eq!(ctor.is_constructor, Some(true));

        let trait_method = &frames[3];
        assert_eq!(trait_method.type_name.as_deref(), Some("Pool"));
        assert_eq!(trait_method.function_name.as_deref(), Some("connect"));
        assert_eq!(trait_method.is_constructor, Some(false));

        let free_fn = &frames[4];
        assert_eq!(free_fn.function_name.as_deref(), Some("main"));
        assert_eq!(free_fn.type_name, None);
        assert_eq!(free_fn.method_name, None);

        let unknown = &frames[5];
        assert_eq!(unknown.function_name, None);
        assert_eq!(unknown.file_name, None);
    }

    #[test]
    fn test_symbol_hash_is_stripped() {
        let frame = RawCallSite::default().with_symbol("app::run::h0123456789abcdef");
        assert_eq!(frame.symbol.as_deref(), Some("app::run"));
        assert_eq!(frame.function_name.as_deref(), Some("run"));
    }

    #[test]
    fn test_clean_filters_internal_frames() {
        let resolver = CallSiteResolver::with_cwd("/srv/shop");
        let cleaned = resolver.clean(Some(parse_backtrace(RENDERED))).unwrap();

        let names: Vec<_> = cleaned
            .iter()
            .map(|f| f.function_name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["new", "connect", "main"]);
    }

    #[test]
    fn test_clean_passes_missing_stack_through() {
        let resolver = CallSiteResolver::with_cwd("/srv/shop");
        assert_eq!(resolver.clean(None), None);
        assert_eq!(resolver.clean(Some(Vec::new())), Some(Vec::new()));
    }

    #[test]
    fn test_clean_file_path_relative_to_cwd() {
        let resolver = CallSiteResolver::with_cwd("/a/b");
        assert_eq!(resolver.clean_file_path("/a/b/c/d.js"), "c/d.js");
        assert_eq!(resolver.clean_file_path("/a/x/y.rs"), "x/y.rs");
        assert_eq!(resolver.clean_file_path("/other/z.rs"), "other/z.rs");
    }

    #[test]
    fn test_to_frame_strips_scheme_and_absolutizes() {
        let resolver = CallSiteResolver::with_cwd("/srv/shop");

        let frame = resolver.to_frame(&RawCallSite::new("file:///srv/shop/src/lib.rs", 7, 3));
        assert_eq!(frame.full_file_path, "/srv/shop/src/lib.rs");
        assert_eq!(frame.file_path, "src/lib.rs");
        assert_eq!(frame.file_name, "lib.rs");
        assert_eq!(frame.line_number, Some(7));

        let relative = resolver.to_frame(&RawCallSite::new("./src/main.rs", 1, 1));
        assert_eq!(relative.full_file_path, "/srv/shop/src/main.rs");
        assert_eq!(relative.file_path, "src/main.rs");
    }

    #[test]
    fn test_to_frame_keeps_missing_fields_absent() {
        let resolver = CallSiteResolver::with_cwd("/srv");
        let raw = RawCallSite {
            file_name: Some("/srv/a.rs".to_string()),
            ..RawCallSite::default()
        };
        let frame = resolver.to_frame(&raw);
        assert_eq!(frame.line_number, None);
        assert_eq!(frame.column_number, None);
        assert_eq!(frame.function_name, None);
        assert_eq!(frame.is_constructor, None);
    }

    #[test]
    fn test_dependency_path_detection() {
        assert!(is_dependency_path(
            "/home/u/.cargo/registry/src/index.crates.io-6f17d22bba15001f/serde-1.0.200/src/de.rs"
        ));
        assert!(!is_dependency_path("/home/u/project/src/main.rs"));
    }
}
