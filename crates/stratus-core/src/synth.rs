//! Declaration rendering
//!
//! Renders a [`Stack`](crate::stack::Stack) into a JSON document ready for a
//! provider to plan and apply. Rendering is pure: no timestamps, no random
//! identifiers, and object keys sort lexicographically (`serde_json`'s
//! default map), so the same stack always renders to the same bytes.

use crate::error::Result;
use crate::stack::Stack;
use serde_json::{Map, Value, json};

/// Bumped when the rendered layout changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// Render the declaration document.
pub fn render(stack: &Stack) -> Result<Value> {
    stack.validate()?;

    let mut resources = Map::new();
    for resource in &stack.resources {
        let mut body = match serde_json::to_value(resource)? {
            Value::Object(map) => map,
            other => unreachable!("resource serialized as {other:?}"),
        };
        // The logical id lives in the key.
        body.remove("id");
        resources.insert(resource.key(), Value::Object(body));
    }

    tracing::debug!(
        "Rendering declaration: {} resources, {} outputs",
        stack.resources.len(),
        stack.outputs.len()
    );

    let mut outputs = Map::new();
    for output in &stack.outputs {
        outputs.insert(
            output.name.clone(),
            json!({
                "value": output.value,
                "description": output.description,
            }),
        );
    }

    Ok(json!({
        "format_version": FORMAT_VERSION,
        "stack": {
            "name": stack.name,
            "description": stack.description,
            "tags": stack.tags,
        },
        "resources": resources,
        "outputs": outputs,
    }))
}

/// Render to a pretty-printed JSON string with a trailing newline.
pub fn render_string(stack: &Stack) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(&render(stack)?)?;
    rendered.push('\n');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::website::website_stack;

    #[test]
    fn rendering_is_deterministic() {
        let first = render_string(&website_stack()).unwrap();
        let second = render_string(&website_stack()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resources_are_keyed_by_kind_and_id() {
        let doc = render(&website_stack()).unwrap();
        let resources = doc["resources"].as_object().unwrap();

        assert!(resources.contains_key("bucket:website"));
        assert!(resources.contains_key("access-identity:website"));
        assert!(resources.contains_key("distribution:website"));
        assert!(resources.contains_key("deployment:website"));
    }

    #[test]
    fn format_version_is_rendered() {
        let doc = render(&website_stack()).unwrap();
        assert_eq!(doc["format_version"], json!(FORMAT_VERSION));
    }

    #[test]
    fn logical_id_is_not_duplicated_into_the_body() {
        let doc = render(&website_stack()).unwrap();
        assert!(doc["resources"]["bucket:website"].get("id").is_none());
    }
}
