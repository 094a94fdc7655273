//! `Annotate`: appends a human-readable `(...)` description when a line's
//! set of effective codes differs from the previous line's, using a
//! user-supplied dictionary of token and context-variable templates.

use std::collections::HashMap;

use crate::error::Result;
use crate::lexer::Token;
use crate::line::Line;

/// `replacements` maps a token source to context-variable updates;
/// `token_defs` maps a full token or a single letter to a template string
/// with `{var}` placeholders.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AnnotationDictionary {
    #[serde(default)]
    pub replacements: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub token_defs: HashMap<String, String>,
}

impl AnnotationDictionary {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

pub fn annotate(
    lines: impl Iterator<Item = Line>,
    dict: AnnotationDictionary,
) -> impl Iterator<Item = Line> {
    let mut vars: HashMap<String, String> = HashMap::new();
    let mut prev_codes: Vec<String> = Vec::new();
    lines.map(move |mut line| {
        for t in line.tokens() {
            if let Some(updates) = dict.replacements.get(t.source()) {
                for (k, v) in updates {
                    vars.insert(k.clone(), v.clone());
                }
            }
        }
        let codes: Vec<String> = line
            .tokens()
            .iter()
            .filter(|t| t.is_command() || t.kind() == crate::lexer::TokenKind::Code)
            .map(|t| t.source().to_string())
            .collect();

        if codes != prev_codes {
            let mut descriptions = Vec::new();
            for code in &codes {
                if let Some(template) = dict.token_defs.get(code) {
                    descriptions.push(render_template(template, &vars));
                } else if let Some(template) = dict.token_defs.get(&code[..1]) {
                    descriptions.push(render_template(template, &vars));
                }
            }
            if !descriptions.is_empty() {
                line.append(Token::comment(&descriptions.join(", ")));
            }
        }
        prev_codes = codes;
        line
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> AnnotationDictionary {
        AnnotationDictionary::parse(
            r#"{"replacements": {}, "token_defs": {"G0": "rapid move"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn annotates_on_code_change() {
        let input = vec![Line::new("G0 X10")];
        let out: Vec<_> = annotate(input.into_iter(), dict()).collect();
        assert!(out[0].render().contains("rapid move"));
    }

    #[test]
    fn no_annotation_when_codes_unchanged() {
        let input = vec![Line::new("G0 X10"), Line::new("G0 X20")];
        let out: Vec<_> = annotate(input.into_iter(), dict()).collect();
        assert!(!out[1].render().contains("rapid move"));
    }

    #[test]
    fn template_substitutes_context_variables() {
        let dict = AnnotationDictionary::parse(
            r#"{"replacements": {"T1": {"tool": "drill"}}, "token_defs": {"M6": "change to {tool}"}}"#,
        )
        .unwrap();
        let input = vec![Line::new("T1"), Line::new("M6")];
        let out: Vec<_> = annotate(input.into_iter(), dict).collect();
        assert!(out[1].render().contains("change to drill"));
    }
}
