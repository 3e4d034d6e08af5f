//! Markup export: one `<object>` per record, one `<field>` per attribute.

use chrono::SecondsFormat;

use super::MODEL_LABEL;
use crate::database::models::Item;

const HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Escapes text for element content and attribute values.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

struct ObjectWriter {
    out: String,
}

impl ObjectWriter {
    fn open(model: &str, pk: i64) -> Self {
        Self {
            out: format!(r#"<object model="{}" pk="{}">"#, escape(model), pk),
        }
    }

    /// `None` renders as the explicit null marker `<None></None>`.
    fn field(&mut self, name: &str, kind: &str, value: Option<String>) {
        self.out.push_str(&format!(r#"<field name="{}" type="{}">"#, name, kind));
        match value {
            Some(text) => self.out.push_str(&escape(&text)),
            None => self.out.push_str("<None></None>"),
        }
        self.out.push_str("</field>");
    }

    fn relation(&mut self, name: &str, to: &str, value: Option<i64>) {
        self.out
            .push_str(&format!(r#"<field name="{}" rel="ManyToOneRel" to="{}">"#, name, to));
        match value {
            Some(id) => self.out.push_str(&id.to_string()),
            None => self.out.push_str("<None></None>"),
        }
        self.out.push_str("</field>");
    }

    fn close(mut self) -> String {
        self.out.push_str("</object>");
        self.out
    }
}

fn python_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

fn object(item: &Item) -> String {
    let mut w = ObjectWriter::open(MODEL_LABEL, item.id);
    w.relation("user", "auth.user", item.owner_id());
    w.field("name", "CharField", Some(item.name.clone()));
    w.field("price", "IntegerField", Some(item.price.to_string()));
    w.field("description", "TextField", Some(item.description.clone()));
    w.field("thumbnail", "URLField", Some(item.thumbnail.clone()));
    w.field("category", "CharField", Some(item.category.clone()));
    w.field("is_featured", "BooleanField", Some(python_bool(item.is_featured)));
    w.field("brand", "CharField", item.brand.clone());
    w.field("stock", "IntegerField", Some(item.stock.to_string()));
    w.field("size", "CharField", item.size.clone());
    w.field(
        "created_at",
        "DateTimeField",
        Some(item.created_at.to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    w.field(
        "updated_at",
        "DateTimeField",
        Some(item.updated_at.to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    w.close()
}

/// Serializes `items` into a complete markup document.
pub fn serialize(items: &[Item]) -> String {
    let mut doc = String::from(HEADER);
    doc.push('\n');
    doc.push_str(r#"<django-objects version="1.0">"#);
    for item in items {
        doc.push_str(&object(item));
    }
    doc.push_str("</django-objects>");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::format::tests::sample_item;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#x27;");
    }

    #[test]
    fn document_has_one_object_per_item() {
        let mut second = sample_item();
        second.id = 13;
        second.owner = None;
        let doc = serialize(&[sample_item(), second]);

        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert_eq!(doc.matches("<object ").count(), 2);
        assert!(doc.contains(r#"<object model="main.footballitem" pk="12">"#));
        assert!(doc.contains(r#"<field name="user" rel="ManyToOneRel" to="auth.user">4</field>"#));
        assert!(doc.contains(r#"<field name="user" rel="ManyToOneRel" to="auth.user"><None></None></field>"#));
        assert!(doc.contains(r#"<field name="is_featured" type="BooleanField">True</field>"#));
        assert!(doc.contains(r#"<field name="brand" type="CharField"><None></None></field>"#));
        assert!(doc.contains(r#"<field name="created_at" type="DateTimeField">2024-09-01T10:00:00.123456+00:00</field>"#));
        assert!(doc.ends_with("</django-objects>"));
    }

    #[test]
    fn empty_export_is_still_a_document() {
        assert_eq!(
            serialize(&[]),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<django-objects version=\"1.0\"></django-objects>"
        );
    }

    #[test]
    fn field_text_is_escaped() {
        let mut item = sample_item();
        item.name = "Fish & Chips <FC>".to_string();
        assert!(serialize(&[item]).contains("Fish &amp; Chips &lt;FC&gt;"));
    }
}
