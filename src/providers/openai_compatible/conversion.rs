//! Conversion between the provider-agnostic contract and the wire format

use super::types::{
    ChatRequest, ChatResponse, WireContent, WireContentPart, WireFile, WireImageUrl, WireJsonSchema,
    WireMessage, WireResponseFormat, WireToolCall, WireToolFunction,
};
use crate::core_types::{
    AdapterRequest, AdapterResponse, FileAttachment, Message, MessageRole, ToolCallRequest,
    ToolSchema,
};
use crate::extraction::SchemaDescriptor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

/// Build the chat request for `model`
pub fn build_chat_request(model: &str, request: &AdapterRequest) -> ChatRequest {
    let mut messages: Vec<WireMessage> = request
        .messages
        .messages()
        .iter()
        .map(convert_message)
        .collect();

    if let Some(file) = &request.file {
        attach_file(&mut messages, file);
    }

    ChatRequest {
        model: model.to_string(),
        messages,
        tools: (!request.tool_schemas.is_empty()).then(|| convert_tools(&request.tool_schemas)),
        response_format: request.schema.as_ref().map(convert_schema),
    }
}

fn convert_message(message: &Message) -> WireMessage {
    let tool_calls = message.has_tool_calls().then(|| {
        message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                call_type: "function".to_string(),
                function: WireToolFunction {
                    name: call.name.clone(),
                    arguments: call.raw_arguments.clone(),
                },
            })
            .collect()
    });

    WireMessage {
        role: message.role.to_string(),
        content: message.content.clone().map(WireContent::Text),
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
        name: match message.role {
            MessageRole::Tool => message.tool_name.clone(),
            _ => None,
        },
    }
}

/// Put the attachment on the first user message as an extra content part
fn attach_file(messages: &mut [WireMessage], file: &FileAttachment) {
    let Some(first_user) = messages.iter_mut().find(|m| m.role == "user") else {
        return;
    };

    let data_url = format!(
        "data:{};base64,{}",
        file.mime_type(),
        STANDARD.encode(&file.bytes)
    );
    let file_part = if file.is_image() {
        WireContentPart::ImageUrl {
            image_url: WireImageUrl { url: data_url },
        }
    } else {
        WireContentPart::File {
            file: WireFile {
                filename: file.filename.clone(),
                file_data: data_url,
            },
        }
    };

    let mut parts = match first_user.content.take() {
        Some(WireContent::Text(text)) => vec![WireContentPart::Text { text }],
        Some(WireContent::Parts(parts)) => parts,
        None => Vec::new(),
    };
    parts.push(file_part);
    first_user.content = Some(WireContent::Parts(parts));
}

pub fn convert_tools(tools: &[ToolSchema]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters
                }
            })
        })
        .collect()
}

/// Non-strict so providers still answer when the model drifts from the schema
fn convert_schema(schema: &SchemaDescriptor) -> WireResponseFormat {
    WireResponseFormat {
        format_type: "json_schema".to_string(),
        json_schema: WireJsonSchema {
            name: schema.name().to_string(),
            schema: schema.to_json_schema(),
            strict: false,
        },
    }
}

/// Read the first choice back into an [`AdapterResponse`]
pub fn convert_response(response: ChatResponse) -> AdapterResponse {
    let usage = response.usage.map(Into::into);

    let Some(choice) = response.choices.into_iter().next() else {
        return AdapterResponse {
            text: Some("Error: provider returned no choices".to_string()),
            tool_calls: Vec::new(),
            usage,
        };
    };

    let message = choice.message;
    let tool_calls: Vec<ToolCallRequest> = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCallRequest::new(call.id, call.function.name, call.function.arguments))
        .collect();

    let text = message
        .content
        .filter(|content| !content.is_empty())
        .or_else(|| message.refusal.map(|refusal| format!("Refusal: {refusal}")));

    AdapterResponse {
        text,
        tool_calls,
        usage,
    }
}
