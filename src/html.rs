//! 轻量 HTML 树
//!
//! 只覆盖片段提取需要的能力：容错解析、简单选择器查找、按原样序列化。
//! 不解码实体，文本与属性值原样保留，因此序列化结果可直接写回 innerHTML。

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// 会隐式结束打开中 `<p>` 的开始标签
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

/// 作用域边界：查找被隐式结束的元素时不越过这些元素
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

/// 可省略结束标签的规则：开始标签 `tag` 结束栈中最近的 `targets` 之一，
/// 遇到 `boundaries` 或作用域边界时停止
struct ImpliedEnd {
    tags: &'static [&'static str],
    targets: &'static [&'static str],
    boundaries: &'static [&'static str],
}

const IMPLIED_ENDS: &[ImpliedEnd] = &[
    ImpliedEnd {
        tags: CLOSES_P,
        targets: &["p"],
        boundaries: &["button"],
    },
    ImpliedEnd {
        tags: &["li"],
        targets: &["li"],
        boundaries: &["ol", "ul"],
    },
    ImpliedEnd {
        tags: &["dd", "dt"],
        targets: &["dd", "dt"],
        boundaries: &["dl"],
    },
    ImpliedEnd {
        tags: &["option", "optgroup"],
        targets: &["option"],
        boundaries: &["select", "datalist", "optgroup"],
    },
    ImpliedEnd {
        tags: &["optgroup"],
        targets: &["optgroup"],
        boundaries: &["select"],
    },
    ImpliedEnd {
        tags: &["td", "th"],
        targets: &["td", "th"],
        boundaries: &["tr"],
    },
    ImpliedEnd {
        tags: &["tr"],
        targets: &["tr", "td", "th"],
        boundaries: &["tbody", "thead", "tfoot"],
    },
    ImpliedEnd {
        tags: &["tbody", "thead", "tfoot"],
        targets: &["tbody", "thead", "tfoot", "tr", "td", "th"],
        boundaries: &[],
    },
];

/// 开始标签 `tag` 是否隐式结束了打开栈中的某个元素
fn ends_open_element(tag: &str, open: &[String]) -> bool {
    IMPLIED_ENDS
        .iter()
        .filter(|rule| rule.tags.contains(&tag))
        .any(|rule| {
            for name in open.iter().rev() {
                if rule.targets.contains(&name.as_str()) {
                    return true;
                }
                if rule.boundaries.contains(&name.as_str())
                    || SCOPE_BOUNDARIES.contains(&name.as_str())
                {
                    return false;
                }
            }
            false
        })
}

// =========================================================
// 节点模型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// 保持源顺序；`None` 表示无值的布尔属性
    pub attrs: Vec<(String, Option<String>)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }

    pub fn inner_html(&self) -> String {
        serialize(&self.children)
    }
}

/// 解析后的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let mut parser = Parser { src: html, pos: 0 };
        let nodes = parser.parse_nodes(&mut Vec::new());
        Self { nodes }
    }

    pub fn find(&self, selector: &Selector) -> Option<&Element> {
        find(&self.nodes, selector)
    }

    pub fn body(&self) -> Option<&Element> {
        self.find(&Selector::tag("body"))
    }
}

// =========================================================
// 选择器
// =========================================================

/// 复合简单选择器：`tag.class1.class2#id[attr="value"]` 的子集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attr: Option<(String, String)>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Self::default().and_class(class)
    }

    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn attr(name: &str, value: &str) -> Self {
        Self {
            attr: Some((name.to_ascii_lowercase(), value.to_string())),
            ..Self::default()
        }
    }

    pub fn and_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn matches(&self, el: &Element) -> bool {
        if self.tag.as_ref().is_some_and(|t| *t != el.tag) {
            return false;
        }
        if self.id.as_ref().is_some_and(|id| el.attr("id") != Some(id)) {
            return false;
        }
        if let Some((name, value)) = &self.attr {
            if el.attr(name) != Some(value.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| el.has_class(c))
    }
}

// =========================================================
// 查找与变换
// =========================================================

/// 先序深度优先查找第一个匹配元素
pub fn find<'a>(nodes: &'a [Node], selector: &Selector) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if selector.matches(el) {
                return Some(el);
            }
            if let Some(found) = find(&el.children, selector) {
                return Some(found);
            }
        }
    }
    None
}

/// 查找第一个匹配元素，返回它所在的兄弟列表及下标
pub fn find_with_siblings<'a>(nodes: &'a [Node], selector: &Selector) -> Option<(&'a [Node], usize)> {
    for (i, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            if selector.matches(el) {
                return Some((nodes, i));
            }
            if let Some(found) = find_with_siblings(&el.children, selector) {
                return Some(found);
            }
        }
    }
    None
}

/// 递归删除匹配任一选择器的元素（连同其子树）
pub fn remove_matching(nodes: &mut Vec<Node>, selectors: &[Selector]) {
    nodes.retain(|node| match node {
        Node::Element(el) => !selectors.iter().any(|s| s.matches(el)),
        _ => true,
    });
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            remove_matching(&mut el.children, selectors);
        }
    }
}

// =========================================================
// 序列化
// =========================================================

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(text) => out.push_str(text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push('>');

    if el.is_void() {
        return;
    }

    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

// =========================================================
// 解析器
// =========================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// `open` 是当前打开的元素栈，用于容错地处理未闭合标签
    fn parse_nodes(&mut self, open: &mut Vec<String>) -> Vec<Node> {
        let mut nodes = Vec::new();

        while self.pos < self.src.len() {
            let rest = self.rest();

            if rest.starts_with("</") {
                let (name, len) = closing_tag(rest);
                if open.last() == Some(&name) {
                    self.pos += len;
                    return nodes;
                }
                // 关闭的是祖先元素：当前元素隐式结束，交给祖先消费
                if open.contains(&name) {
                    return nodes;
                }
                // 孤立的关闭标签直接丢弃
                self.pos += len;
                continue;
            }

            if let Some(body) = rest.strip_prefix("<!--") {
                let (text, len) = match body.find("-->") {
                    Some(end) => (&body[..end], end + 7),
                    None => (body, rest.len()),
                };
                nodes.push(Node::Comment(text.to_string()));
                self.pos += len;
                continue;
            }

            // <!DOCTYPE ...> 与处理指令
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos += rest.find('>').map_or(rest.len(), |i| i + 1);
                continue;
            }

            let starts_tag = rest.len() > 1
                && rest.starts_with('<')
                && rest.as_bytes()[1].is_ascii_alphabetic();

            if starts_tag {
                // 可省略的结束标签：当前元素到此结束，交给外层重新处理该开始标签
                if ends_open_element(&start_tag_name(rest), open) {
                    return nodes;
                }
                let el = self.parse_element(open);
                nodes.push(Node::Element(el));
                continue;
            }

            // 文本，至少前进一个字符
            let skip = if rest.starts_with('<') { 1 } else { 0 };
            let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
            push_text(&mut nodes, &rest[..len]);
            self.pos += len;
        }

        nodes
    }

    fn parse_element(&mut self, open: &mut Vec<String>) -> Element {
        let bytes = self.src.as_bytes();
        self.pos += 1; // '<'

        let tag_start = self.pos;
        while self.pos < bytes.len()
            && !bytes[self.pos].is_ascii_whitespace()
            && bytes[self.pos] != b'>'
            && bytes[self.pos] != b'/'
        {
            self.pos += 1;
        }
        let tag = self.src[tag_start..self.pos].to_ascii_lowercase();

        // 引号感知地扫描到 '>' 或 '/>'
        let attrs_start = self.pos;
        let mut in_quote: Option<u8> = None;
        let mut self_closed = false;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            match in_quote {
                Some(q) => {
                    if b == q {
                        in_quote = None;
                    }
                }
                None => {
                    if b == b'"' || b == b'\'' {
                        in_quote = Some(b);
                    } else if b == b'/' && bytes.get(self.pos + 1) == Some(&b'>') {
                        self_closed = true;
                        break;
                    } else if b == b'>' {
                        break;
                    }
                }
            }
            self.pos += 1;
        }
        let attrs = parse_attrs(&self.src[attrs_start..self.pos]);

        if self_closed {
            self.pos += 2;
        } else if self.pos < bytes.len() {
            self.pos += 1;
        }

        let mut el = Element {
            tag,
            attrs,
            children: Vec::new(),
        };

        if self_closed || el.is_void() {
            return el;
        }

        if RAW_TEXT_ELEMENTS.contains(&el.tag.as_str()) {
            let rest = self.rest();
            let needle = format!("</{}", el.tag);
            let end = rest.to_ascii_lowercase().find(&needle).unwrap_or(rest.len());
            if end > 0 {
                el.children.push(Node::Text(rest[..end].to_string()));
            }
            self.pos += end;
            let after = self.rest();
            self.pos += after.find('>').map_or(after.len(), |i| i + 1);
            return el;
        }

        open.push(el.tag.clone());
        el.children = self.parse_nodes(open);
        open.pop();
        el
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn start_tag_name(rest: &str) -> String {
    rest[1..]
        .chars()
        .take_while(|c| !c.is_ascii_whitespace() && *c != '>' && *c != '/')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// 解析关闭标签，返回（小写标签名，占用字节数）
fn closing_tag(rest: &str) -> (String, usize) {
    let name: String = rest[2..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    let len = rest.find('>').map_or(rest.len(), |i| i + 1);
    (name, len)
}

/// 解析属性串，支持 key="v"、key='v'、key=v 与布尔属性
fn parse_attrs(raw: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let key_start = i;
        while i < bytes.len()
            && bytes[i] != b'='
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'>'
            && bytes[i] != b'/'
        {
            i += 1;
        }
        if i == key_start {
            // 无法识别的字符，跳过避免死循环
            i += 1;
            continue;
        }
        let key = raw[key_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let val_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                attrs.push((key, Some(raw[val_start..i].to_string())));
                if i < bytes.len() {
                    i += 1;
                }
            } else {
                let val_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                attrs.push((key, Some(raw[val_start..i].to_string())));
            }
        } else {
            attrs.push((key, None));
        }
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_preserves_markup() {
        let html = r#"<div class="a b" data-x="1"><p>Hello <strong>world</strong></p><img src="x.png" alt=""><!-- note --></div>"#;
        let doc = Document::parse(html);
        assert_eq!(serialize(&doc.nodes), html);
    }

    #[test]
    fn test_doctype_is_dropped_and_tags_lowercased() {
        let doc = Document::parse("<!DOCTYPE html><HTML><Body><P>x</P></Body></HTML>");
        assert_eq!(serialize(&doc.nodes), "<html><body><p>x</p></body></html>");
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_script_content_is_raw_text() {
        let doc = Document::parse("<script>if (a < b) { x = '</div>'; }</script><p>after</p>");
        let script = doc.find(&Selector::tag("script")).unwrap();
        assert_eq!(
            script.children,
            vec![Node::Text("if (a < b) { x = '".to_string())]
        );
        assert!(doc.find(&Selector::tag("p")).is_some());
    }

    #[test]
    fn test_unclosed_child_is_closed_by_ancestor() {
        let doc = Document::parse("<div><p>one<span>two</div><footer>f</footer>");
        let div = doc.find(&Selector::tag("div")).unwrap();
        assert_eq!(div.inner_html(), "<p>one<span>two</span></p>");
        // footer 不应被吞进 div
        assert_eq!(doc.nodes.len(), 2);
    }

    #[test]
    fn test_block_start_tag_ends_open_paragraph() {
        let doc = Document::parse(r#"<div><p>Intro<form class="search"></form><img src="j.png"></div>"#);
        let div = doc.find(&Selector::tag("div")).unwrap();
        assert_eq!(
            div.inner_html(),
            r#"<p>Intro</p><form class="search"></form><img src="j.png">"#
        );

        // 行内元素不结束段落
        let doc = Document::parse("<p>a<span>b</span><p>c");
        assert_eq!(serialize(&doc.nodes), "<p>a<span>b</span></p><p>c</p>");
    }

    #[test]
    fn test_paragraph_inside_button_is_not_closed_from_outside() {
        let doc = Document::parse("<p>x<button><div>y</div></button></p>");
        assert_eq!(serialize(&doc.nodes), "<p>x<button><div>y</div></button></p>");
    }

    #[test]
    fn test_list_items_without_end_tags_are_siblings() {
        let doc = Document::parse("<main><ul><li>a<li>b</ul></main>");
        let main = doc.find(&Selector::tag("main")).unwrap();
        assert_eq!(main.inner_html(), "<ul><li>a</li><li>b</li></ul>");

        // 嵌套列表中的 li 不结束外层 li
        let doc = Document::parse("<ul><li>a<ul><li>b<li>c</ul><li>d</ul>");
        assert_eq!(
            serialize(&doc.nodes),
            "<ul><li>a<ul><li>b</li><li>c</li></ul></li><li>d</li></ul>"
        );
    }

    #[test]
    fn test_definition_option_and_table_siblings() {
        let doc = Document::parse("<dl><dt>k<dd>v<dt>k2</dl>");
        assert_eq!(serialize(&doc.nodes), "<dl><dt>k</dt><dd>v</dd><dt>k2</dt></dl>");

        let doc = Document::parse(r#"<select><option value="1">a<option value="2">b</select>"#);
        assert_eq!(
            serialize(&doc.nodes),
            r#"<select><option value="1">a</option><option value="2">b</option></select>"#
        );

        let doc = Document::parse("<table><tr><td>1<td>2<tr><th>3</table>");
        assert_eq!(
            serialize(&doc.nodes),
            "<table><tr><td>1</td><td>2</td></tr><tr><th>3</th></tr></table>"
        );
    }

    #[test]
    fn test_stray_closing_tag_is_dropped() {
        let doc = Document::parse("<div>a</span>b</div>");
        assert_eq!(serialize(&doc.nodes), "<div>ab</div>");
    }

    #[test]
    fn test_attribute_forms() {
        let doc = Document::parse(r#"<a href='/rss' download target=_blank title='say "hi"'>x</a>"#);
        let a = doc.find(&Selector::tag("a")).unwrap();

        assert_eq!(a.attr("href"), Some("/rss"));
        assert_eq!(a.attr("download"), Some(""));
        assert!(a.has_attr("download"));
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(
            a.outer_html(),
            r#"<a href="/rss" download target="_blank" title="say &quot;hi&quot;">x</a>"#
        );
    }

    #[test]
    fn test_self_closing_syntax() {
        let doc = Document::parse(r#"<div><br/><img src="a.png" /><span/>t</div>"#);
        let div = doc.find(&Selector::tag("div")).unwrap();
        assert_eq!(div.inner_html(), r#"<br><img src="a.png"><span></span>t"#);
    }

    #[test]
    fn test_selector_matching() {
        let doc = Document::parse(
            r#"<section class="section header"></section><section class="section body" id="b" role="main"></section>"#,
        );

        let body = Selector::tag("section").and_class("section").and_class("body");
        assert_eq!(doc.find(&body).and_then(|e| e.attr("id")), Some("b"));
        assert!(doc.find(&Selector::id("b")).is_some());
        assert!(doc.find(&Selector::attr("role", "main")).is_some());
        assert!(doc.find(&Selector::class("footer")).is_none());
    }

    #[test]
    fn test_find_with_siblings_and_remove() {
        let mut doc = Document::parse(r#"<div><nav></nav><i class="m"></i><b></b></div><script>x</script>"#);

        let (siblings, idx) = find_with_siblings(&doc.nodes, &Selector::class("m")).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(siblings.len(), 3);

        remove_matching(&mut doc.nodes, &[Selector::tag("nav"), Selector::tag("script")]);
        assert_eq!(serialize(&doc.nodes), r#"<div><i class="m"></i><b></b></div>"#);
    }

    #[test]
    fn test_text_with_lone_angle_bracket() {
        let doc = Document::parse("<p>1 < 2 and 3 > 2</p>");
        assert_eq!(serialize(&doc.nodes), "<p>1 < 2 and 3 > 2</p>");
    }

    #[test]
    fn test_utf8_content() {
        let html = r#"<p class="ő">Közlöny – évi szám</p>"#;
        let doc = Document::parse(html);
        assert_eq!(serialize(&doc.nodes), html);
    }
}
