// Unit Tests for OpenAI-compatible Wire Conversion
//
// UNIT UNDER TEST: openai_compatible::conversion
//
// BUSINESS RESPONSIBILITY:
//   - Translates the provider-agnostic conversation into chat completion messages
//   - Exposes tool schemas and structured output requests in wire format
//   - Attaches files to the first user message as base64 data URLs
//   - Reads the first choice back, keeping provider failures as text
//
// TEST COVERAGE:
//   - Role mapping and tool call / tool result round trip
//   - Tool and response_format rendering
//   - Image vs document attachment parts
//   - Empty choices, refusals and usage mapping

use crate::core_types::{
    AdapterRequest, Conversation, FileAttachment, Message, TokenUsage, ToolCallRequest,
};
use crate::providers::openai_compatible::conversion::{build_chat_request, convert_response};
use crate::providers::openai_compatible::types::{ChatResponse, WireContent, WireContentPart};
use crate::tests::helpers::{person_schema, sample_registry};
use serde_json::json;

fn request_with(messages: Conversation) -> AdapterRequest {
    AdapterRequest {
        messages,
        tool_schemas: Vec::new(),
        schema: None,
        file: None,
    }
}

#[cfg(test)]
mod request_tests {
    use super::*;

    #[test]
    fn test_conversation_roles_and_tool_linkage() {
        // Arrange
        let call = ToolCallRequest::new("call_1", "calculator", r#"{"expression":"2+2"}"#);
        let mut conversation = Conversation::from_prompt("What is 2+2?");
        conversation.push(Message::assistant(None, vec![call.clone()]));
        conversation.push(Message::tool_result(&call, "4"));

        // Act
        let request = build_chat_request("gpt-4o-mini", &request_with(conversation));

        // Assert
        assert_eq!(request.model, "gpt-4o-mini");
        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool"]);

        let assistant_calls = request.messages[1].tool_calls.as_ref().unwrap();
        assert_eq!(assistant_calls[0].id, "call_1");
        assert_eq!(assistant_calls[0].call_type, "function");
        assert_eq!(
            assistant_calls[0].function.arguments,
            r#"{"expression":"2+2"}"#
        );

        let tool_message = &request.messages[2];
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_message.name.as_deref(), Some("calculator"));
        assert_eq!(
            tool_message.content,
            Some(WireContent::Text("4".to_string()))
        );
    }

    #[test]
    fn test_tools_and_schema_are_rendered() {
        // Arrange
        let mut request = request_with(Conversation::from_prompt("Who is Ada?"));
        request.tool_schemas = sample_registry().schemas_for(&["calculator"]).unwrap();
        request.schema = Some(person_schema());

        // Act
        let chat = build_chat_request("gpt-4o", &request);
        let wire = serde_json::to_value(&chat).unwrap();

        // Assert
        assert_eq!(wire["tools"][0]["type"], "function");
        assert_eq!(wire["tools"][0]["function"]["name"], "calculator");
        assert_eq!(wire["response_format"]["type"], "json_schema");
        assert_eq!(wire["response_format"]["json_schema"]["name"], "person");
        assert_eq!(wire["response_format"]["json_schema"]["strict"], false);
        assert_eq!(
            wire["response_format"]["json_schema"]["schema"]["required"],
            json!(["name", "age"])
        );
    }

    #[test]
    fn test_plain_request_omits_optional_sections() {
        // Arrange
        let request = request_with(Conversation::from_prompt("hello"));

        // Act
        let wire = serde_json::to_value(build_chat_request("gpt-4o", &request)).unwrap();

        // Assert
        assert!(wire.get("tools").is_none());
        assert!(wire.get("response_format").is_none());
        assert_eq!(wire["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_image_attachment_becomes_image_part() {
        // Arrange
        let mut request = request_with(Conversation::from_prompt("Describe this"));
        request.file = Some(FileAttachment::new("chart.png", vec![1, 2, 3]));

        // Act
        let chat = build_chat_request("gpt-4o", &request);

        // Assert
        match &chat.messages[0].content {
            Some(WireContent::Parts(parts)) => {
                assert_eq!(parts.len(), 2);
                assert!(
                    matches!(&parts[0], WireContentPart::Text { text } if text == "Describe this")
                );
                match &parts[1] {
                    WireContentPart::ImageUrl { image_url } => {
                        assert_eq!(image_url.url, "data:image/png;base64,AQID");
                    }
                    other => panic!("Expected image part, got {other:?}"),
                }
            }
            other => panic!("Expected content parts, got {other:?}"),
        }
    }

    #[test]
    fn test_document_attachment_becomes_file_part() {
        // Arrange
        let mut request = request_with(Conversation::from_prompt("Summarise"));
        request.file = Some(FileAttachment::new("invoice.pdf", b"%PDF".to_vec()));

        // Act
        let wire = serde_json::to_value(build_chat_request("gpt-4o", &request)).unwrap();

        // Assert
        let part = &wire["messages"][0]["content"][1];
        assert_eq!(part["type"], "file");
        assert_eq!(part["file"]["filename"], "invoice.pdf");
        assert_eq!(
            part["file"]["file_data"],
            "data:application/pdf;base64,JVBERg=="
        );
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;

    fn parse(body: serde_json::Value) -> ChatResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_text_and_usage_are_read() {
        // Arrange
        let body = parse(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }));

        // Act
        let response = convert_response(body);

        // Assert
        assert_eq!(response.text.as_deref(), Some("Hello!"));
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage, Some(TokenUsage::new(12, 3)));
    }

    #[test]
    fn test_tool_calls_are_read_with_raw_arguments() {
        // Arrange
        let body = parse(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "calculator", "arguments": "{\"expression\":\"2+2\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }));

        // Act
        let response = convert_response(body);

        // Assert
        assert_eq!(response.text, None);
        assert_eq!(
            response.tool_calls,
            vec![ToolCallRequest::new("call_9", "calculator", r#"{"expression":"2+2"}"#)]
        );
        assert_eq!(response.usage, None);
    }

    #[test]
    fn test_empty_choices_become_error_text() {
        // Arrange
        let body = parse(json!({
            "choices": [],
            "usage": {"prompt_tokens": 5, "completion_tokens": 0}
        }));

        // Act
        let response = convert_response(body);

        // Assert
        assert_eq!(
            response.text.as_deref(),
            Some("Error: provider returned no choices")
        );
        assert_eq!(response.usage, Some(TokenUsage::new(5, 0)));
    }

    #[test]
    fn test_refusal_is_kept_as_text() {
        // Arrange
        let body = parse(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "refusal": "I can't help with that"
                }
            }]
        }));

        // Act
        let response = convert_response(body);

        // Assert
        assert_eq!(
            response.text.as_deref(),
            Some("Refusal: I can't help with that")
        );
    }
}
