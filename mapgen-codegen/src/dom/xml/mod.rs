//! In-memory model of XML mapper documents
//!
//! Rendering is recursive: each element formats itself at the indent level it
//! is given and knows nothing else about the document. Indentation is two
//! spaces per level. Attribute and text values are written as given.

/// Column at which long text content is wrapped
pub const DEFAULT_WRAP_WIDTH: usize = 100;

const XML_INDENT: &str = "  ";

fn indent(level: usize) -> String {
    XML_INDENT.repeat(level)
}

/// A `name="value"` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn formatted_content(&self) -> String {
        format!("{}=\"{}\"", self.name, self.value)
    }
}

/// Character content, wrapped at spaces when it exceeds the wrap width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    pub content: String,
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn formatted_content(&self, indent_level: usize) -> String {
        self.formatted_content_with(indent_level, DEFAULT_WRAP_WIDTH)
    }

    /// Greedy packing of space-separated tokens. Continuation lines are
    /// indented one extra level and a token is never split, so a single token
    /// longer than the width stays on its own line. Text that is wrapped has
    /// runs of spaces collapsed to one; text that fits is written unchanged.
    pub fn formatted_content_with(&self, indent_level: usize, wrap_width: usize) -> String {
        let first_indent = indent(indent_level);
        if first_indent.chars().count() + self.content.chars().count() <= wrap_width
            || !self.content.contains(' ')
        {
            return format!("{}{}", first_indent, self.content);
        }

        let continuation = indent(indent_level + 1);
        let mut lines = Vec::new();
        let mut current = first_indent.clone();
        let mut current_len = first_indent.chars().count();
        let mut line_has_token = false;

        for token in self.content.split(' ').filter(|t| !t.is_empty()) {
            let token_len = token.chars().count();
            if line_has_token && current_len + 1 + token_len > wrap_width {
                lines.push(std::mem::replace(&mut current, continuation.clone()));
                current_len = continuation.chars().count();
                line_has_token = false;
            }
            if line_has_token {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(token);
            current_len += token_len;
            line_has_token = true;
        }
        lines.push(current);
        lines.join("\n")
    }
}

/// Child node of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Xml(XmlElement),
    Text(TextElement),
}

impl Element {
    pub fn formatted_content_with(&self, indent_level: usize, wrap_width: usize) -> String {
        match self {
            Element::Xml(element) => element.formatted_content_with(indent_level, wrap_width),
            Element::Text(text) => text.formatted_content_with(indent_level, wrap_width),
        }
    }
}

impl From<XmlElement> for Element {
    fn from(element: XmlElement) -> Self {
        Element::Xml(element)
    }
}

impl From<TextElement> for Element {
    fn from(text: TextElement) -> Self {
        Element::Text(text)
    }
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    attributes: Vec<Attribute>,
    elements: Vec<Element>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Builder form of [`add_attribute`](Self::add_attribute)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn add_element(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn add_element_at(&mut self, index: usize, element: impl Into<Element>) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element.into());
    }

    pub fn add_text(&mut self, content: impl Into<String>) {
        self.elements.push(Element::Text(TextElement::new(content)));
    }

    pub fn formatted_content(&self, indent_level: usize) -> String {
        self.formatted_content_with(indent_level, DEFAULT_WRAP_WIDTH)
    }

    pub fn formatted_content_with(&self, indent_level: usize, wrap_width: usize) -> String {
        let blocks: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.formatted_content_with(indent_level + 1, wrap_width))
            .collect();
        self.render_with_blocks(indent_level, &blocks)
    }

    /// Render this element around already formatted child blocks
    pub(crate) fn render_with_blocks(&self, indent_level: usize, blocks: &[String]) -> String {
        let mut out = indent(indent_level);
        out.push('<');
        out.push_str(&self.name);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(&attribute.formatted_content());
        }

        if blocks.is_empty() {
            out.push_str(" />");
            return out;
        }

        out.push_str(" >");
        for block in blocks {
            out.push('\n');
            out.push_str(block);
        }
        out.push('\n');
        out.push_str(&indent(indent_level));
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
        out
    }
}

/// A complete XML file: declaration, optional DOCTYPE and root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub root: XmlElement,
}

impl Document {
    pub fn new(root: XmlElement) -> Self {
        Self {
            public_id: None,
            system_id: None,
            root,
        }
    }

    pub fn with_doctype(
        root: XmlElement,
        public_id: impl Into<String>,
        system_id: impl Into<String>,
    ) -> Self {
        Self {
            public_id: Some(public_id.into()),
            system_id: Some(system_id.into()),
            root,
        }
    }

    /// XML declaration and DOCTYPE lines, each ending with a newline
    pub(crate) fn prolog(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        match (&self.public_id, &self.system_id) {
            (Some(public_id), Some(system_id)) => out.push_str(&format!(
                "<!DOCTYPE {} PUBLIC \"{}\" \"{}\">\n",
                self.root.name, public_id, system_id
            )),
            (None, Some(system_id)) => out.push_str(&format!(
                "<!DOCTYPE {} SYSTEM \"{}\">\n",
                self.root.name, system_id
            )),
            _ => {}
        }
        out
    }

    pub fn formatted_content(&self) -> String {
        self.formatted_content_with(DEFAULT_WRAP_WIDTH)
    }

    pub fn formatted_content_with(&self, wrap_width: usize) -> String {
        format!(
            "{}{}\n",
            self.prolog(),
            self.root.formatted_content_with(0, wrap_width)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_element() {
        let root = XmlElement::new("root").with_attribute("name", "x");
        assert_eq!(root.formatted_content(0), "<root name=\"x\" />");
    }

    #[test]
    fn test_element_with_text() {
        let mut root = XmlElement::new("root").with_attribute("name", "x");
        root.add_text("hi");
        assert_eq!(
            root.formatted_content(0),
            "<root name=\"x\" >\n  hi\n</root>"
        );
    }

    #[test]
    fn test_attribute_insertion_order() {
        let root = XmlElement::new("result")
            .with_attribute("column", "id")
            .with_attribute("property", "id")
            .with_attribute("jdbcType", "BIGINT");
        assert_eq!(
            root.formatted_content(1),
            "  <result column=\"id\" property=\"id\" jdbcType=\"BIGINT\" />"
        );
    }

    #[test]
    fn test_nested_indentation() {
        let mut select = XmlElement::new("select").with_attribute("id", "selectAll");
        select.add_text("select id, name from users");
        let mut mapper = XmlElement::new("mapper");
        mapper.add_element(select);
        assert_eq!(
            mapper.formatted_content(0),
            "<mapper >\n  <select id=\"selectAll\" >\n    select id, name from users\n  </select>\n</mapper>"
        );
    }

    #[test]
    fn test_long_text_wraps_at_spaces() {
        let columns: Vec<String> = (0..40).map(|i| format!("column_{},", i)).collect();
        let content = columns.join(" ");
        let text = TextElement::new(content.clone());
        let formatted = text.formatted_content_with(2, 60);

        let lines: Vec<&str> = formatted.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("    column_0,"));
        for line in &lines[1..] {
            assert!(line.starts_with("      "));
        }
        for line in &lines {
            assert!(line.chars().count() <= 60);
        }
        let rejoined: Vec<&str> = lines.iter().map(|l| l.trim_start()).collect();
        assert_eq!(rejoined.join(" "), content);
    }

    #[test]
    fn test_wrapped_text_collapses_space_runs() {
        let content = format!("{}   {}  {}", "a".repeat(12), "b".repeat(12), "c".repeat(12));
        let formatted = TextElement::new(content).formatted_content_with(0, 20);
        assert_eq!(
            formatted,
            format!("{}\n  {}\n  {}", "a".repeat(12), "b".repeat(12), "c".repeat(12))
        );

        let short = TextElement::new("a  b");
        assert_eq!(short.formatted_content_with(0, 20), "a  b");
    }

    #[test]
    fn test_overlong_token_not_split() {
        let token = "x".repeat(50);
        let text = TextElement::new(format!("a {} b", token));
        let formatted = text.formatted_content_with(0, 20);
        assert_eq!(formatted, format!("a\n  {}\n  b", token));
    }

    #[test]
    fn test_document_prolog() {
        let doc = Document::with_doctype(
            XmlElement::new("mapper").with_attribute("namespace", "com.example.UserMapper"),
            "-//mybatis.org//DTD Mapper 3.0//EN",
            "http://mybatis.org/dtd/mybatis-3-mapper.dtd",
        );
        assert_eq!(
            doc.formatted_content(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE mapper PUBLIC \"-//mybatis.org//DTD Mapper 3.0//EN\" \"http://mybatis.org/dtd/mybatis-3-mapper.dtd\">\n\
             <mapper namespace=\"com.example.UserMapper\" />\n"
        );
    }
}
