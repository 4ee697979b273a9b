//! Request payloads for a generative-text service
//!
//! Only the payloads are built here. Sending them (and the API key that goes
//! with it) is left to the caller.

use crate::parser::patterns::Dialect;
use crate::parser::records::ParsedProgram;
use serde_json::{json, Value};

const VISUALIZE_TASK: &str = "Create a fully functional HTML document that visualizes the execution \
of the provided code using horizontal bars. The visualization should break down the execution into \
individual steps and dynamically represent code operations. Implement the complete solution in HTML, \
CSS, and JavaScript.";

const VISUALIZE_INSTRUCTIONS: &str = "Provide the complete HTML, CSS, and JavaScript code to \
implement the visualization. Include all parts of the code covering initialization, execution, and \
final output display. Ensure each button has its own functionality and the code flow is clearly \
represented on the bars with appropriate color changes.";

const EXPLAIN_TASK: &str = "Explain the following code step by step:";

/// Which artifact to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Step-through HTML visualization driven by the parsed model
    Visualize,
    /// Plain step-by-step explanation of the source
    Explain,
}

impl PromptKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "visualize" | "visualise" | "viz" => Some(PromptKind::Visualize),
            "explain" => Some(PromptKind::Explain),
            _ => None,
        }
    }
}

/// Prompt asking for an HTML visualization of `program`
pub fn visualization_prompt(program: &ParsedProgram, source: &str) -> serde_json::Result<Value> {
    Ok(json!({
        "task": VISUALIZE_TASK,
        "features": {
            "arrayRepresentation": "Use horizontal bars to represent array elements visually. Adjust the height of these bars dynamically based on execution steps.",
            "barsMovement": "Highlight and move the bars to show the current processing step. Reflect changes in code execution visually.",
            "controls": {
                "Next": "Advances the visualization to the next step.",
                "Previous": "Moves the visualization back to the previous step.",
                "Play": "Automatically progresses through all steps.",
                "Stop": "Pauses the automatic progression."
            },
            "colorChange": "Bars should change color to reflect different states, such as the current processing step.",
            "valueLabels": "Display the value of each bar above it.",
            "finalOutputDisplay": "Show the final result in a separate bar chart once the operations are complete.",
            "uiConsistency": "Ensure a consistent user interface style and layout throughout the visualization."
        },
        "instructions": VISUALIZE_INSTRUCTIONS,
        "parsedData": serde_json::to_value(program)?,
        "code": source,
        "fileFormat": "html"
    }))
}

/// Prompt asking for a plain explanation of `source`
pub fn explanation_prompt(source: &str, dialect: Dialect) -> Value {
    json!({
        "task": EXPLAIN_TASK,
        "code": source,
        "language": dialect,
    })
}

/// Wrap a prompt object in a `generateContent` request body.
///
/// The prompt travels as a JSON string inside the single text part.
pub fn request_body(prompt: &Value) -> serde_json::Result<Value> {
    let text = serde_json::to_string(prompt)?;
    Ok(json!({
        "contents": [{ "parts": [{ "text": text }] }]
    }))
}

/// Build the request body for `kind`
pub fn build_request(
    kind: PromptKind,
    program: &ParsedProgram,
    source: &str,
) -> serde_json::Result<Value> {
    let prompt = match kind {
        PromptKind::Visualize => visualization_prompt(program, source)?,
        PromptKind::Explain => explanation_prompt(source, program.language),
    };
    request_body(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::parse;

    #[test]
    fn test_visualization_prompt_embeds_model() {
        let source = "nums = [1, 2, 3]";
        let program = parse(source, Dialect::JavaScript);
        let prompt = visualization_prompt(&program, source).unwrap();

        assert_eq!(prompt["fileFormat"], "html");
        assert_eq!(prompt["code"], source);
        assert_eq!(prompt["parsedData"]["language"], "javascript");
        assert_eq!(prompt["parsedData"]["arrays"][0]["name"], "nums");
        assert_eq!(prompt["parsedData"]["arrays"][0]["size"], 3);
        assert!(prompt["parsedData"].get("history").is_none());
    }

    #[test]
    fn test_request_body_wraps_prompt_as_text() {
        let prompt = explanation_prompt("print(1)", Dialect::Python);
        let body = request_body(&prompt).unwrap();

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        let decoded: Value = serde_json::from_str(text).unwrap();
        assert_eq!(decoded["language"], "python");
        assert_eq!(decoded["task"], EXPLAIN_TASK);
    }

    #[test]
    fn test_prompt_kind_tags() {
        assert_eq!(PromptKind::from_tag("Visualize"), Some(PromptKind::Visualize));
        assert_eq!(PromptKind::from_tag("explain"), Some(PromptKind::Explain));
        assert_eq!(PromptKind::from_tag("summarize"), None);
    }
}
