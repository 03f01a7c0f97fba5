use crate::codegen::LoopCaps;
use crate::parser::types::ShaderType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    #[serde(rename = "type", default = "request_type")]
    pub msg_type: String,
    #[serde(flatten)]
    pub content: MessageContent,
}

fn request_type() -> String {
    "request".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    // Tried first: a request lacks `request_seq` and falls through.
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Request {
        command: String,
        arguments: Option<Value>,
    },
}

/// Arguments of the `instrument` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentArguments {
    pub source: String,
    pub target_line: usize,
    #[serde(default)]
    pub target_line_text: String,
    #[serde(default)]
    pub loop_caps: LoopCaps,
}

/// Arguments of the `snippet` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetArguments {
    pub line_text: String,
    #[serde(default, rename = "type")]
    pub var_type: Option<String>,
}

impl SnippetArguments {
    pub fn shader_type(&self) -> Option<ShaderType> {
        self.var_type.as_deref().map(ShaderType::parse)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceBody {
    pub source: String,
}
