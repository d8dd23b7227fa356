use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Renders an HTML fragment as plain text.
///
/// Whitespace runs collapse to one space, block elements and `<br>` start a
/// new line, and scripting elements are dropped. Entities are decoded by the
/// parser. The result is trimmed and carries no blank lines.
pub fn html_to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut ctx = TextContext::default();
    for child in fragment.root_element().children() {
        visit_node(child, &mut ctx);
    }
    ctx.finish()
}

/// Maps empty or whitespace-only text to `None`.
pub fn zerotify(text: impl Into<String>) -> Option<String> {
    let text = text.into();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Description rule shared by cards and characters: an absent or empty raw
/// value, or markup that renders to nothing, is no description at all.
pub fn clean_description(raw: Option<&str>) -> Option<String> {
    raw.filter(|html| !html.is_empty())
        .and_then(|html| zerotify(html_to_plain_text(html)))
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut TextContext) {
    match node.value() {
        Node::Text(text) => ctx.append_text(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, ctx);
            }
        }
    }
}

fn visit_element(element: ElementRef, ctx: &mut TextContext) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "br" => ctx.ensure_newline(),
        "script" | "style" | "noscript" | "iframe" | "template" => {}
        "p" | "div" | "section" | "article" | "header" | "footer" | "blockquote" | "li"
        | "ul" | "ol" | "table" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "hr" => {
            ctx.ensure_newline();
            visit_children(element, ctx);
            ctx.ensure_newline();
        }
        _ => visit_children(element, ctx),
    }
}

fn visit_children(element: ElementRef, ctx: &mut TextContext) {
    for child in element.children() {
        visit_node(child, ctx);
    }
}

#[derive(Default)]
struct TextContext {
    builder: String,
    last_char: Option<char>,
}

impl TextContext {
    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if self.last_char == Some(' ') {
            self.builder.pop();
            self.last_char = self.builder.chars().last();
        }
        if matches!(self.last_char, None | Some('\n')) {
            return;
        }
        self.push_char('\n');
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }

    fn finish(self) -> String {
        self.builder.trim().to_string()
    }
}
