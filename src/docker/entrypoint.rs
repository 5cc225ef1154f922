/// Renders command tokens for the exec form of `ENTRYPOINT`.
///
/// Every token becomes a JSON string literal and tokens are joined with
/// `", "`. An empty slice renders as an empty string; callers omit the
/// directive themselves.
pub fn render_entrypoint<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote(token: &str) -> String {
    // serializing a &str is infallible
    serde_json::to_string(token).unwrap_or_else(|_| format!("\"{}\"", token))
}
