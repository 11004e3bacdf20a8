use serde::{Deserialize, Serialize};

// ─── Request side ─────────────────────────────────────────────────────────

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Backend-neutral generation request.
///
/// Converted to the wire body by [`GenerationRequest::to_wire`]; the caller
/// never builds JSON by hand.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub conversation: Vec<Turn>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            conversation: Vec::new(),
            max_output_tokens: 3000,
            temperature: 0.2,
        }
    }

    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.conversation.push(turn);
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn to_wire(&self) -> WireRequest {
        WireRequest {
            system: vec![WirePart::text(&self.system_instruction)],
            messages: self
                .conversation
                .iter()
                .map(|t| WireMessage {
                    role: t.role,
                    content: vec![WirePart::text(&t.text)],
                })
                .collect(),
            max_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// JSON body POSTed to the model endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest {
    pub system: Vec<WirePart>,
    pub messages: Vec<WireMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: Vec<WirePart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WirePart {
    Text { text: String },
}

impl WirePart {
    fn text(text: &str) -> Self {
        WirePart::Text {
            text: text.to_string(),
        }
    }
}

// ─── Response side ────────────────────────────────────────────────────────

/// Response bodies the client knows how to read text out of.
///
/// Tried in declaration order: the structured message shape first, then the
/// flat `outputText` shape. Anything else fails to deserialize and is
/// reported as unparseable.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { output: MessageOutput },
    Flat {
        #[serde(rename = "outputText")]
        output_text: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageOutput {
    pub message: OutputMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputMessage {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// Content parts within a response message. Non-text parts are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ResponseBody {
    /// Plain text of the response: text parts joined by newlines and trimmed,
    /// or the flat output text as-is.
    pub fn text(&self) -> String {
        match self {
            ResponseBody::Message { output } => output
                .message
                .content
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Other => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
            ResponseBody::Flat { output_text } => output_text.clone(),
        }
    }
}
