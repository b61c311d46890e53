//! Code block highlighting with language auto-detection.
//!
//! Detection parses the code with each candidate grammar and scores the
//! tokens that landed in keyword-like scopes; tokens in `invalid.*` scopes
//! count against a grammar. The best and second-best scores are reported
//! as relevance.

use hyperview_core::{ColorScheme, Highlighted, HighlightRun, LanguageGuess, Rgba};
use once_cell::sync::Lazy;
use syntect::easy::ScopeRangeIterator;
use syntect::highlighting::{Color, Highlighter, Theme, ThemeSet};
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::node::Node;
use crate::utilities::prepare_code;
use crate::{HyperviewError, Result};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const LIGHT_THEME: &str = "InspiredGitHub";
const DARK_THEME: &str = "base16-ocean.dark";

/// Language reported when no grammar scores
pub const PLAINTEXT: &str = "plaintext";

/// Grammar name and the short language id reported for it
const CANDIDATES: &[(&str, &str)] = &[
    ("Rust", "rust"),
    ("Python", "python"),
    ("JavaScript", "javascript"),
    ("C", "c"),
    ("C++", "cpp"),
    ("C#", "csharp"),
    ("Objective-C", "objectivec"),
    ("Go", "go"),
    ("Java", "java"),
    ("Scala", "scala"),
    ("Ruby", "ruby"),
    ("Perl", "perl"),
    ("PHP", "php"),
    ("Bourne Again Shell (bash)", "bash"),
    ("Makefile", "makefile"),
    ("SQL", "sql"),
    ("HTML", "xml"),
    ("CSS", "css"),
    ("JSON", "json"),
    ("YAML", "yaml"),
    ("Haskell", "haskell"),
    ("OCaml", "ocaml"),
    ("Erlang", "erlang"),
    ("Clojure", "clojure"),
    ("Lisp", "lisp"),
    ("Lua", "lua"),
    ("Diff", "diff"),
];

/// Bonus for a grammar recognized from the first line (shebang, modeline)
const FIRST_LINE_BONUS: i64 = 10;

static SCORED_SCOPES: Lazy<Vec<Scope>> = Lazy::new(|| {
    [
        "keyword",
        "storage",
        "entity.name",
        "support.function",
        "variable.language",
        "constant.language",
        "meta.preprocessor",
    ]
    .iter()
    .filter_map(|s| Scope::new(s).ok())
    .collect()
});

static ILLEGAL_SCOPE: Lazy<Option<Scope>> = Lazy::new(|| Scope::new("invalid").ok());

/// Result of language detection
#[derive(Debug, Clone)]
pub struct Detection {
    pub language: String,
    pub relevance: u32,
    pub second_best: Option<LanguageGuess>,
    syntax: &'static SyntaxReference,
}

/// Concatenate the text of a `pre`/`code` subtree, ignoring element boundaries
pub fn code_text(node: &Node) -> String {
    node.text_content()
}

/// Detect the language of a code snippet
pub fn detect_language(code: &str) -> Result<Detection> {
    let syntax_set: &'static SyntaxSet = &SYNTAX_SET;
    let first_line = syntax_set.find_syntax_by_first_line(code);

    let mut scored: Vec<(i64, &'static str, &'static SyntaxReference)> = Vec::new();
    for &(name, id) in CANDIDATES {
        let Some(syntax) = syntax_set.find_syntax_by_name(name) else {
            continue;
        };
        let mut score = score_syntax(syntax, code)?;
        if first_line.is_some_and(|s| s.name == syntax.name) {
            score += FIRST_LINE_BONUS;
        }
        if score > 0 {
            scored.push((score, id, syntax));
        }
    }

    // Stable: ties keep candidate order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ranked = scored.into_iter();
    let Some((relevance, language, syntax)) = ranked.next() else {
        return Ok(Detection {
            language: PLAINTEXT.to_string(),
            relevance: 0,
            second_best: None,
            syntax: syntax_set.find_syntax_plain_text(),
        });
    };

    Ok(Detection {
        language: language.to_string(),
        relevance: relevance as u32,
        second_best: ranked.next().map(|(score, id, _)| LanguageGuess {
            language: id.to_string(),
            relevance: score as u32,
        }),
        syntax,
    })
}

fn score_syntax(syntax: &SyntaxReference, code: &str) -> Result<i64> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut score = 0;

    for line in LinesWithEndings::from(code) {
        let ops = state
            .parse_line(line, &SYNTAX_SET)
            .map_err(|e| HyperviewError::Highlight(e.to_string()))?;
        for (range, op) in ScopeRangeIterator::new(&ops, line) {
            stack
                .apply(op)
                .map_err(|e| HyperviewError::Highlight(format!("{:?}", e)))?;
            if line[range].trim().is_empty() {
                continue;
            }
            score += token_weight(stack.as_slice());
        }
    }

    Ok(score)
}

fn token_weight(scopes: &[Scope]) -> i64 {
    if let Some(illegal) = *ILLEGAL_SCOPE {
        if scopes.iter().any(|s| illegal.is_prefix_of(*s)) {
            return -3;
        }
    }
    let scored = scopes
        .iter()
        .any(|s| SCORED_SCOPES.iter().any(|prefix| prefix.is_prefix_of(*s)));
    i64::from(scored)
}

fn theme_for(scheme: ColorScheme) -> Result<&'static Theme> {
    let name = match scheme {
        ColorScheme::Light => LIGHT_THEME,
        ColorScheme::Dark => DARK_THEME,
    };
    let theme_set: &'static ThemeSet = &THEME_SET;
    theme_set
        .themes
        .get(name)
        .ok_or_else(|| HyperviewError::Highlight(format!("missing theme {}", name)))
}

fn to_rgba(color: Color) -> Rgba {
    Rgba::new(color.r, color.g, color.b, color.a)
}

/// Detect the language of prepared code and turn it into colored runs
pub fn highlight(code: &str, scheme: ColorScheme) -> Result<Highlighted> {
    let detection = detect_language(code)?;
    let theme = theme_for(scheme)?;
    let highlighter = Highlighter::new(theme);
    let runs = tokenize(code, detection.syntax, &highlighter)?;

    Ok(Highlighted {
        language: detection.language,
        relevance: detection.relevance,
        second_best: detection.second_best,
        runs,
    })
}

fn tokenize(
    code: &str,
    syntax: &SyntaxReference,
    highlighter: &Highlighter<'_>,
) -> Result<Vec<HighlightRun>> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut runs: Vec<HighlightRun> = Vec::new();

    for line in LinesWithEndings::from(code) {
        let ops = state
            .parse_line(line, &SYNTAX_SET)
            .map_err(|e| HyperviewError::Highlight(e.to_string()))?;
        for (range, op) in ScopeRangeIterator::new(&ops, line) {
            stack
                .apply(op)
                .map_err(|e| HyperviewError::Highlight(format!("{:?}", e)))?;
            if range.is_empty() {
                continue;
            }
            let text = &line[range];
            let class_path: Vec<String> = stack.as_slice().iter().map(|s| s.to_string()).collect();

            match runs.last_mut() {
                Some(last) if last.class_path == class_path => last.text.push_str(text),
                _ => {
                    let color = to_rgba(highlighter.style_for_stack(stack.as_slice()).foreground);
                    runs.push(HighlightRun {
                        text: text.to_string(),
                        class_path,
                        color,
                    });
                }
            }
        }
    }

    normalize_tail(&mut runs);
    Ok(runs)
}

/// A newline-only tail becomes one space so the block gets no phantom
/// blank line at its end
fn normalize_tail(runs: &mut Vec<HighlightRun>) {
    if let Some(last) = runs.last_mut() {
        let trimmed = last.text.trim_end_matches('\n');
        if trimmed.len() != last.text.len() {
            last.text = format!("{} ", trimmed);
        }
    }
}

/// Highlight the code inside a `pre` node
pub fn highlight_node(node: &Node, scheme: ColorScheme) -> Result<(String, Highlighted)> {
    let code = prepare_code(&code_text(node));
    let highlighted = highlight(&code, scheme)?;
    Ok((code, highlighted))
}

/// Run [`highlight`] on the blocking thread pool
pub async fn highlight_blocking(code: String, scheme: ColorScheme) -> Result<Highlighted> {
    tokio::task::spawn_blocking(move || highlight(&code, scheme))
        .await
        .map_err(|e| HyperviewError::Highlight(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUST: &str = "use std::collections::HashMap;\n\npub struct Counter {\n    counts: HashMap<String, u32>,\n}\n\nimpl Counter {\n    pub fn add(&mut self, key: &str) {\n        let count = self.counts.entry(key.to_string()).or_insert(0);\n        *count += 1;\n    }\n}";

    #[test]
    fn test_detects_rust() {
        let detection = detect_language(RUST).unwrap();
        assert_eq!(detection.language, "rust");
        assert!(detection.relevance > 0);
    }

    #[test]
    fn test_detects_python_shebang() {
        let code = "#!/usr/bin/env python\nimport os\nprint(os.getcwd())";
        let detection = detect_language(code).unwrap();
        assert_eq!(detection.language, "python");
        assert!(detection.relevance >= FIRST_LINE_BONUS as u32);
    }

    #[test]
    fn test_empty_code_is_plaintext() {
        let detection = detect_language("").unwrap();
        assert_eq!(detection.language, PLAINTEXT);
        assert_eq!(detection.relevance, 0);
        assert!(detection.second_best.is_none());
    }

    #[test]
    fn test_runs_cover_the_code() {
        let highlighted = highlight(RUST, ColorScheme::Light).unwrap();
        let text: String = highlighted.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, RUST);
        assert!(highlighted.runs.iter().all(|r| !r.class_path.is_empty()));
        assert!(highlighted
            .runs
            .iter()
            .any(|r| r.class_path.iter().any(|c| c.starts_with("keyword") || c.starts_with("storage"))));
    }

    #[test]
    fn test_scheme_changes_colors() {
        let light = highlight(RUST, ColorScheme::Light).unwrap();
        let dark = highlight(RUST, ColorScheme::Dark).unwrap();
        assert_eq!(light.runs.len(), dark.runs.len());
        assert_ne!(light.runs[0].color, dark.runs[0].color);
    }

    #[test]
    fn test_newline_tail_becomes_space() {
        let mut runs = vec![HighlightRun {
            text: "x\n\n".to_string(),
            class_path: vec!["source.rust".to_string()],
            color: Rgba::opaque(0, 0, 0),
        }];
        normalize_tail(&mut runs);
        assert_eq!(runs[0].text, "x ");
    }

    #[test]
    fn test_highlight_node_strips_indent() {
        let pre = Node::element("pre").with_child(
            Node::element("code").with_child(Node::text("\n    let a = 1;\n    let b = 2;\n")),
        );
        let (code, highlighted) = highlight_node(&pre, ColorScheme::Light).unwrap();
        assert_eq!(code, "let a = 1;\nlet b = 2;");
        let text: String = highlighted.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, code);
    }

    #[tokio::test]
    async fn test_highlight_blocking() {
        let highlighted = highlight_blocking(RUST.to_string(), ColorScheme::Dark)
            .await
            .unwrap();
        assert_eq!(highlighted.language, "rust");
    }
}
