/// Sanitize rich-text HTML authored in the CMS before it is injected with
/// `inner_html`.
///
/// Script, style and event-handler content is dropped; links keep their
/// target but get `rel="noopener noreferrer"`.
pub fn sanitize_rich_text(raw: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(&["class", "id"])
        .clean(raw)
        .to_string()
}
