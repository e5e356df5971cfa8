//! Profile XML extraction

use roxmltree::{Document, Node};

use crate::error::{AppError, AppResult};
use crate::models::StatusSnapshot;

/// Parse a profile document into a snapshot.
///
/// The root element name is not checked: the live feed uses `<profile>`,
/// older captures use `<response>`. Fields may be missing individually, but
/// a document with none of them is rejected.
pub fn parse_profile(xml: &str) -> AppResult<StatusSnapshot> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    ensure_closed(xml, root)?;

    if let Some(error) = child_element(root, "error") {
        let message = collect_content(error);
        return Err(AppError::Profile(message.trim().to_string()));
    }

    let steam_name = field(root, "steamID");
    let online_state = field(root, "onlineState");
    let state_message = field(root, "stateMessage");

    if steam_name.is_none() && online_state.is_none() && state_message.is_none() {
        return Err(AppError::Parse(format!(
            "no profile fields in <{}>",
            root.tag_name().name()
        )));
    }

    Ok(StatusSnapshot {
        steam_name,
        online_state,
        state_message,
    })
}

/// roxmltree accepts elements still open at end of input, so a body cut off
/// mid-transfer has to be caught here.
fn ensure_closed(xml: &str, root: Node) -> AppResult<()> {
    let name = root.tag_name().name();
    let tail = xml.trim_end();
    let closed = tail.ends_with(&format!("</{}>", name))
        || (!root.has_children() && tail.ends_with("/>"));

    if closed {
        Ok(())
    } else {
        Err(AppError::Parse(format!("document truncated before </{}>", name)))
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
}

/// Trimmed, non-empty content of a direct child element
fn field(root: Node, name: &str) -> Option<String> {
    let node = child_element(root, name)?;
    let content = collect_content(node);
    let content = content.trim();
    (!content.is_empty()).then(|| content.to_string())
}

/// Text and CDATA of `node`, with nested elements written back as markup so
/// that `<br/>` survives whether it arrived escaped, in CDATA, or as a child.
fn collect_content(node: Node) -> String {
    let mut out = String::new();
    write_children(node, &mut out);
    out
}

fn write_children(node: Node, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(child.text().unwrap_or_default());
        } else if child.is_element() {
            let name = child.tag_name().name();
            if child.has_children() {
                out.push('<');
                out.push_str(name);
                out.push('>');
                write_children(child, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            } else {
                out.push('<');
                out.push_str(name);
                out.push_str("/>");
            }
        }
    }
}
