//! `completion/complete` (§4.F): argument-value suggestions for a prompt or
//! a resource template's URI variables.

use mcp_protocol::types::{CompleteRequest, CompleteResult, CompletionReference, CompletionValues};

use crate::error::{ErrorKind, ServerResult};
use crate::registry::HandlerRegistry;

/// Results are capped at this many values; anything beyond is reported via
/// `total`/`has_more` rather than sent on the wire.
pub const MAX_COMPLETION_VALUES: usize = 100;

/// Resolve a `completion/complete` request against whatever it references.
///
/// Per §4.F/§9, a `ref/resource` reference names a `ResourceTemplate` by
/// **literal string equality** against its `uriTemplate` pattern, not by
/// matching a concrete URI — preserved exactly as flagged rather than
/// "fixed" into a template match.
pub async fn complete(registry: &HandlerRegistry, request: CompleteRequest) -> ServerResult<CompleteResult> {
    let values = match &request.reference {
        CompletionReference::Prompt { name } => {
            let handler = registry
                .get_prompt(name)
                .ok_or_else(|| ErrorKind::PromptNotFound { name: name.clone() })?;
            handler
                .complete(&request.argument.name, &request.argument.value)
                .await?
        }
        CompletionReference::Resource { uri } => {
            let handler = registry
                .get_resource_template(uri)
                .ok_or_else(|| ErrorKind::ResourceNotFound { uri: uri.clone() })?;
            handler
                .complete(&request.argument.name, &request.argument.value)
                .await?
        }
    };

    Ok(CompleteResult {
        completion: cap_values(values),
    })
}

fn cap_values(mut values: Vec<String>) -> CompletionValues {
    let total = values.len();
    let has_more = total > MAX_COMPLETION_VALUES;
    values.truncate(MAX_COMPLETION_VALUES);

    CompletionValues {
        values,
        total: Some(total as u32),
        has_more: Some(has_more),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::utils;
    use mcp_protocol::types::CompletionArgument;

    fn registry_with_prompt() -> HandlerRegistry {
        let registry = HandlerRegistry::new();
        let prompt = utils::prompt("greeting", "Greets someone", |_req, _ctx| async move {
            Ok(mcp_protocol::types::GetPromptResult {
                description: None,
                messages: vec![],
            })
        })
        .with_completion("name", |_arg, value| async move {
            Ok(vec!["Alice", "Alicia", "Alvin"]
                .into_iter()
                .filter(|candidate| candidate.starts_with(&value))
                .map(str::to_string)
                .collect())
        });
        registry.register_prompt(prompt).unwrap();
        registry
    }

    #[tokio::test]
    async fn prompt_completion_filters_by_partial_value() {
        let registry = registry_with_prompt();
        let result = complete(
            &registry,
            CompleteRequest {
                reference: CompletionReference::Prompt {
                    name: "greeting".to_string(),
                },
                argument: CompletionArgument {
                    name: "name".to_string(),
                    value: "Ali".to_string(),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(result.completion.values, vec!["Alice", "Alicia"]);
        assert_eq!(result.completion.total, Some(2));
        assert_eq!(result.completion.has_more, Some(false));
    }

    #[tokio::test]
    async fn unknown_prompt_reference_is_not_found() {
        let registry = HandlerRegistry::new();
        let err = complete(
            &registry,
            CompleteRequest {
                reference: CompletionReference::Prompt {
                    name: "missing".to_string(),
                },
                argument: CompletionArgument {
                    name: "x".to_string(),
                    value: String::new(),
                },
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ErrorKind::PromptNotFound { .. }));
    }

    #[tokio::test]
    async fn resource_template_reference_matches_the_pattern_literally() {
        let registry = HandlerRegistry::new();
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}",
                "user",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap();

        let err = complete(
            &registry,
            CompleteRequest {
                reference: CompletionReference::Resource {
                    uri: "/users/42".to_string(),
                },
                argument: CompletionArgument {
                    name: "id".to_string(),
                    value: String::new(),
                },
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ErrorKind::ResourceNotFound { .. }));

        complete(
            &registry,
            CompleteRequest {
                reference: CompletionReference::Resource {
                    uri: "/users/{id}".to_string(),
                },
                argument: CompletionArgument {
                    name: "id".to_string(),
                    value: String::new(),
                },
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn values_beyond_the_cap_are_truncated_with_has_more() {
        let registry = HandlerRegistry::new();
        let values: Vec<String> = (0..150).map(|n| format!("item-{n}")).collect();
        let prompt = utils::prompt("many", "has lots of completions", |_req, _ctx| async move {
            Ok(mcp_protocol::types::GetPromptResult {
                description: None,
                messages: vec![],
            })
        })
        .with_completion("x", move |_arg, _value| {
            let values = values.clone();
            async move { Ok(values) }
        });
        registry.register_prompt(prompt).unwrap();

        let result = complete(
            &registry,
            CompleteRequest {
                reference: CompletionReference::Prompt {
                    name: "many".to_string(),
                },
                argument: CompletionArgument {
                    name: "x".to_string(),
                    value: String::new(),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(result.completion.values.len(), MAX_COMPLETION_VALUES);
        assert_eq!(result.completion.total, Some(150));
        assert_eq!(result.completion.has_more, Some(true));
    }
}
