//! Live-reload script injection.

/// Inject the live-reload client if the body is HTML and live reload is on.
pub(super) fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_hotreload_script(&body),
        _ => body,
    }
}

/// Insert the client tag before the last `</body>`, or append it.
fn inject_hotreload_script(content: &[u8]) -> Vec<u8> {
    let script = crate::embed::serve::hotreload_tag();
    let script = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::serve::hotreload_tag;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_injects_before_body_close() {
        let body = b"<html><body><p>hi</p></BODY></html>".to_vec();
        let out = String::from_utf8(maybe_inject_hotreload(body, HTML, Some(35729))).unwrap();
        assert_eq!(
            out,
            format!("<html><body><p>hi</p>{}</BODY></html>", hotreload_tag())
        );
    }

    #[test]
    fn test_appends_without_body_tag() {
        let out = maybe_inject_hotreload(b"<p>fragment</p>".to_vec(), HTML, Some(1));
        assert!(String::from_utf8(out).unwrap().ends_with(&hotreload_tag()));
    }

    #[test]
    fn test_leaves_other_responses_alone() {
        let css = b"body{color:red}</body>".to_vec();
        assert_eq!(maybe_inject_hotreload(css.clone(), CSS, Some(1)), css);

        let html = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_hotreload(html.clone(), HTML, None), html);
    }
}
