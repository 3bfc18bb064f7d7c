//! Recursive-descent AST compilation of rules text.
//!
//! `compile` splits a line of rules text into sentences and classifies each
//! into modal, conditional, repeat, compound or plain effect nodes. The
//! grammar is small and operates over semi-structured text; every recursive
//! call works on a strictly smaller substring, so recursion terminates.

/// A structural node of the rules-text AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// "Choose one —" with options separated by semicolons.
    Modal { options: Vec<AstNode> },
    /// "If ... then ... [otherwise ...]".
    Conditional {
        condition: String,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
    },
    /// "Repeat this process ..." or "... for each ...".
    Repeat {
        content: String,
        children: Vec<AstNode>,
    },
    /// A plain effect sentence.
    Effect { content: String },
}

fn trace_enabled() -> bool {
    std::env::var("CANTRIP_PARSER_TRACE")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

fn trace(stage: &str, text: &str) {
    if trace_enabled() {
        eprintln!("[parser-flow] stage={stage} text='{}'", text.trim());
    }
}

/// Split on sentence terminators. Semicolons are left alone: they separate
/// modal options, not sentences.
fn split_sentences(text: &str) -> Vec<String> {
    let text = text.replace('\u{2014}', "-");
    text.split(['\n'])
        .flat_map(|line| line.split(". "))
        .map(|segment| segment.trim().trim_end_matches('.').trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn wrap_effect(text: &str) -> AstNode {
    AstNode::Effect {
        content: text.trim().to_string(),
    }
}

/// Extract modal options after "choose one -" into separate branches.
fn parse_modal_options(text: &str) -> Vec<AstNode> {
    let body = text
        .trim_start_matches("choose one -")
        .trim_start_matches("choose one")
        .trim();
    body.split(';')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(wrap_effect)
        .collect()
}

/// The text a repeat node loops over: everything before the repeat marker,
/// or (for a leading "for each") the remainder after the marker's clause.
fn repeat_body(text: &str) -> String {
    if let Some((before, _)) = text.split_once("repeat this process") {
        return before.trim().to_string();
    }
    if let Some((before, after)) = text.split_once("for each") {
        let before = before.trim();
        if !before.is_empty() {
            return before.to_string();
        }
        // Leading "for each player, ..." loops over the clause after the comma.
        if let Some((_, rest)) = after.split_once(',') {
            return rest.trim().to_string();
        }
    }
    String::new()
}

/// Compile rules text into a list of AST nodes.
pub fn compile(text: &str) -> Vec<AstNode> {
    stacker::maybe_grow(64 * 1024, 1024 * 1024, || compile_inner(text))
}

fn compile_inner(text: &str) -> Vec<AstNode> {
    let mut ast = Vec::new();

    for segment in split_sentences(text) {
        let normalized = segment.to_lowercase();
        trace("segment", &normalized);

        if normalized.starts_with("choose one -") {
            ast.push(AstNode::Modal {
                options: parse_modal_options(&normalized),
            });
        } else if let Some((condition_part, consequence)) = normalized
            .split_once("then")
            .filter(|_| normalized.contains("if"))
        {
            let condition = condition_part
                .trim()
                .strip_prefix("if")
                .unwrap_or(condition_part.trim())
                .trim()
                .trim_end_matches(',')
                .to_string();
            if let Some((then_part, else_part)) = consequence.split_once("otherwise") {
                ast.push(AstNode::Conditional {
                    condition,
                    then_branch: compile(then_part.trim()),
                    else_branch: Some(compile(else_part.trim())),
                });
            } else {
                ast.push(AstNode::Conditional {
                    condition,
                    then_branch: compile(consequence.trim()),
                    else_branch: None,
                });
            }
        } else if normalized.contains("repeat this process") || normalized.contains("for each") {
            let body = repeat_body(&normalized);
            ast.push(AstNode::Repeat {
                content: normalized.clone(),
                children: compile(&body),
            });
        } else if normalized.contains(" and ") && !normalized.starts_with("search your library") {
            for part in normalized.split(" and ") {
                let part = part.trim();
                if !part.is_empty() {
                    ast.push(wrap_effect(part));
                }
            }
        } else {
            ast.push(wrap_effect(&normalized));
        }
    }

    ast
}
