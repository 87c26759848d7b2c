use crate::dom::{Document, DomNode, NodeId};
use scraper::{ElementRef, Html, Node};

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg"];

/// Parse a host page into a mutable [`Document`].
///
/// html5ever always synthesizes `<html>`, `<head>` and `<body>`, so the
/// returned document has a body even for fragments.
pub fn parse_html(html: &str) -> Document {
    let document = Html::parse_document(html);

    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let mut nodes = vec![Document::raw_document()];
    let root = NodeId(0);
    let html_id = convert_element(document.root_element(), &mut nodes);
    Document::link(&mut nodes, root, html_id);

    let body = nodes
        .iter()
        .position(|n| n.tag == "body")
        .map(NodeId)
        .unwrap_or(html_id);

    Document::from_parts(nodes, root, body, title.trim().to_string())
}

fn convert_element(el: ElementRef<'_>, nodes: &mut Vec<DomNode>) -> NodeId {
    let tag = el.value().name.local.as_ref().to_string();
    let mut node = Document::raw_element(&tag);
    for (k, v) in el.value().attrs() {
        if k == "class" {
            node.classes = v.split_whitespace().map(str::to_string).collect();
        } else if k == "style" {
            for decl in v.split(';') {
                if let Some((prop, val)) = decl.split_once(':') {
                    node.style.insert(prop.trim().to_string(), val.trim().to_string());
                }
            }
        } else {
            node.attributes.insert(k.to_string(), v.to_string());
        }
    }
    let id = Document::push_node(nodes, node);

    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return id;
    }

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    let child = convert_element(child_el, nodes);
                    Document::link(nodes, id, child);
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    let child = Document::push_node(nodes, Document::raw_text(&s));
                    Document::link(nodes, id, child);
                }
            }
            _ => {}
        }
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_with_title_container() {
        let html = r#"
        <html>
            <head><title>inque</title></head>
            <body>
                <div id="title-container" class="hero big"><h1>inque</h1></div>
                <p id="home-subtitle">make things</p>
            </body>
        </html>
        "#;

        let doc = parse_html(html);
        assert_eq!(doc.title, "inque");
        let title = doc.get_element_by_id("title-container").expect("title container");
        assert!(doc.has_class(title, "hero"));
        assert!(doc.has_class(title, "big"));
        assert_eq!(doc.parent(title), Some(doc.body()));
        assert!(doc.get_element_by_id("home-subtitle").is_some());
    }

    #[test]
    fn fragment_still_gets_body() {
        let doc = parse_html("<p>hello</p>");
        assert_eq!(doc.node(doc.body()).tag, "body");
        assert!(doc.get_element_by_id("title-container").is_none());
    }

    #[test]
    fn strips_script_children_and_reads_inline_style() {
        let html = r#"<body><div id="a" style="width: 320px; color: red"></div>
            <script>window.profileHubManager = {};</script></body>"#;
        let doc = parse_html(html);
        let a = doc.get_element_by_id("a").expect("div");
        assert_eq!(doc.style(a, "width"), Some("320px"));
        let script_has_text = (0..doc.connected_count())
            .map(NodeId)
            .any(|id| doc.node(id).text.contains("profileHubManager"));
        assert!(!script_has_text);
    }
}
