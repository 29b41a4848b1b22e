use relay_core::{extract_json, extract_json_array};
use serde_json::Value;

fn parse(text: &str) -> anyhow::Result<Value> {
    Ok(serde_json::from_str(&extract_json(text))?)
}

#[test]
fn test_plain_object_is_returned() -> anyhow::Result<()> {
    let value = parse(r#"{"goal": "test"}"#)?;
    assert_eq!(value["goal"], "test");
    Ok(())
}

#[test]
fn test_fenced_block_with_trailing_prose() -> anyhow::Result<()> {
    let value = parse("```json\n{\"goal\": \"test\"}\n```\n\n**Some extra text here**")?;
    assert_eq!(value["goal"], "test");
    Ok(())
}

#[test]
fn test_comments_and_trailing_commas_are_removed() -> anyhow::Result<()> {
    let text = "```json\n{\n  \"items\": [\n    \"one\",  // first\n    \"two\",  // second\n  ]\n}\n```";
    let value = parse(text)?;
    assert_eq!(value["items"], serde_json::json!(["one", "two"]));
    Ok(())
}

#[test]
fn test_url_in_string_survives_comment_stripping() -> anyhow::Result<()> {
    let value = parse("{\"url\": \"http://example.com/path\"} // trailing")?;
    assert_eq!(value["url"], "http://example.com/path");
    Ok(())
}

#[test]
fn test_empty_input_yields_empty_string() {
    assert_eq!(extract_json(""), "");
    assert_eq!(extract_json("no json here"), "");
}

#[test]
fn test_arrays_are_extracted() -> anyhow::Result<()> {
    let text = "Tasks:\n```json\n[\"a\", \"b\",]\n```";
    let value: Value = serde_json::from_str(&extract_json_array(text))?;
    assert_eq!(value, serde_json::json!(["a", "b"]));
    Ok(())
}
